use crate::{
    metadata::tables::{
        AssemblyOsRaw, AssemblyProcessorRaw, AssemblyRaw, AssemblyRefOsRaw,
        AssemblyRefProcessorRaw, AssemblyRefRaw, ClassLayoutRaw, ConstantRaw, CustomAttributeRaw,
        DeclSecurityRaw, EncLogRaw, EncMapRaw, EventMapRaw, EventPtrRaw, EventRaw,
        ExportedTypeRaw, FieldLayoutRaw, FieldMarshalRaw, FieldPtrRaw, FieldRaw, FieldRvaRaw,
        FileRaw, GenericParamConstraintRaw, GenericParamRaw, ImplMapRaw, InterfaceImplRaw,
        ManifestResourceRaw, MemberRefRaw, MetadataTable, MethodDefRaw, MethodImplRaw,
        MethodPtrRaw, MethodSemanticsRaw, MethodSpecRaw, ModuleRaw, ModuleRefRaw, NestedClassRaw,
        ParamPtrRaw, ParamRaw, PropertyMapRaw, PropertyPtrRaw, PropertyRaw, RowDefinition,
        StandAloneSigRaw, TableId, TableInfoRef, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
    },
    Result,
};

/// Typed retrieval of a [`MetadataTable`] out of a [`TableData`] entry.
///
/// Implemented for every `*Raw` row type; pairing the row type with the
/// matching [`TableId`] at the call site is what keeps table access safe
/// without casts.
pub trait TableAccess<'a>: RowDefinition<'a> {
    /// Extract the typed table if `data` holds a table of this row type.
    fn from_data<'b>(data: &'b TableData<'a>) -> Option<&'b MetadataTable<'a, Self>>;
}

macro_rules! define_table_data {
    ($( $variant:ident => $row:ty ),+ $(,)?) => {
        /// One present metadata table, typed by its row.
        ///
        /// The `#~` parser produces one `TableData` per table named in the
        /// valid bitmask; [`crate::metadata::streams::TablesHeader::table`]
        /// recovers the typed [`MetadataTable`] from it.
        pub enum TableData<'a> {
            $(
                #[doc = concat!("The `", stringify!($variant), "` table")]
                $variant(MetadataTable<'a, $row>),
            )+
        }

        impl<'a> TableData<'a> {
            /// Parse the table body for `id` out of `data`.
            ///
            /// ## Arguments
            /// * 'id'   - Which table to parse
            /// * 'data' - Buffer positioned at the first row
            /// * 'rows' - Row count from the stream header
            /// * 'info' - Size information for the row reader
            ///
            /// # Errors
            /// Returns an error if the buffer cannot hold the declared rows.
            pub(crate) fn read(
                id: TableId,
                data: &'a [u8],
                rows: u32,
                info: TableInfoRef,
            ) -> Result<TableData<'a>> {
                Ok(match id {
                    $( TableId::$variant => TableData::$variant(MetadataTable::new(data, rows, info)?), )+
                })
            }

            /// The id of the contained table.
            #[must_use]
            pub fn id(&self) -> TableId {
                match self {
                    $( TableData::$variant(_) => TableId::$variant, )+
                }
            }

            /// Number of rows in the contained table.
            #[must_use]
            pub fn row_count(&self) -> u32 {
                match self {
                    $( TableData::$variant(table) => table.row_count(), )+
                }
            }

            /// Size of one row of the contained table, in bytes.
            #[must_use]
            pub fn row_size(&self) -> u32 {
                match self {
                    $( TableData::$variant(table) => table.row_size(), )+
                }
            }

            /// Total size of the contained table body, in bytes.
            #[must_use]
            pub fn byte_size(&self) -> usize {
                match self {
                    $( TableData::$variant(table) => table.byte_size(), )+
                }
            }
        }

        $(
            impl<'a> TableAccess<'a> for $row {
                fn from_data<'b>(data: &'b TableData<'a>) -> Option<&'b MetadataTable<'a, $row>> {
                    match data {
                        TableData::$variant(table) => Some(table),
                        _ => None,
                    }
                }
            }
        )+
    };
}

define_table_data! {
    Module => ModuleRaw,
    TypeRef => TypeRefRaw,
    TypeDef => TypeDefRaw,
    FieldPtr => FieldPtrRaw,
    Field => FieldRaw,
    MethodPtr => MethodPtrRaw,
    MethodDef => MethodDefRaw,
    ParamPtr => ParamPtrRaw,
    Param => ParamRaw,
    InterfaceImpl => InterfaceImplRaw,
    MemberRef => MemberRefRaw,
    Constant => ConstantRaw,
    CustomAttribute => CustomAttributeRaw,
    FieldMarshal => FieldMarshalRaw,
    DeclSecurity => DeclSecurityRaw,
    ClassLayout => ClassLayoutRaw,
    FieldLayout => FieldLayoutRaw,
    StandAloneSig => StandAloneSigRaw,
    EventMap => EventMapRaw,
    EventPtr => EventPtrRaw,
    Event => EventRaw,
    PropertyMap => PropertyMapRaw,
    PropertyPtr => PropertyPtrRaw,
    Property => PropertyRaw,
    MethodSemantics => MethodSemanticsRaw,
    MethodImpl => MethodImplRaw,
    ModuleRef => ModuleRefRaw,
    TypeSpec => TypeSpecRaw,
    ImplMap => ImplMapRaw,
    FieldRVA => FieldRvaRaw,
    EncLog => EncLogRaw,
    EncMap => EncMapRaw,
    Assembly => AssemblyRaw,
    AssemblyProcessor => AssemblyProcessorRaw,
    AssemblyOS => AssemblyOsRaw,
    AssemblyRef => AssemblyRefRaw,
    AssemblyRefProcessor => AssemblyRefProcessorRaw,
    AssemblyRefOS => AssemblyRefOsRaw,
    File => FileRaw,
    ExportedType => ExportedTypeRaw,
    ManifestResource => ManifestResourceRaw,
    NestedClass => NestedClassRaw,
    GenericParam => GenericParamRaw,
    MethodSpec => MethodSpecRaw,
    GenericParamConstraint => GenericParamConstraintRaw,
}
