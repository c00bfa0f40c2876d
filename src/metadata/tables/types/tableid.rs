use strum::{EnumIter, FromRepr};

/// Identifies a metadata table within the `#~` stream.
///
/// The discriminants are the table indexes of ECMA-335 §II.22; the high byte
/// of a metadata token is exactly this value. All ids through
/// `GenericParamConstraint` (0x2C) are covered, including the `*Ptr` and
/// Edit-and-Continue indirection tables that optimizing compilers omit.
#[derive(Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, EnumIter, FromRepr)]
#[repr(usize)]
pub enum TableId {
    /// Current module information, 0x00
    Module = 0x00,
    /// References to types in other modules, 0x01
    TypeRef = 0x01,
    /// Type definitions in this module, 0x02
    TypeDef = 0x02,
    /// Field indirection table, 0x03
    FieldPtr = 0x03,
    /// Field definitions, 0x04
    Field = 0x04,
    /// Method indirection table, 0x05
    MethodPtr = 0x05,
    /// Method definitions, 0x06
    MethodDef = 0x06,
    /// Parameter indirection table, 0x07
    ParamPtr = 0x07,
    /// Parameter definitions, 0x08
    Param = 0x08,
    /// Interface implementations, 0x09
    InterfaceImpl = 0x09,
    /// References to members of other types, 0x0A
    MemberRef = 0x0A,
    /// Compile-time constant values, 0x0B
    Constant = 0x0B,
    /// Custom attribute attachments, 0x0C
    CustomAttribute = 0x0C,
    /// Marshalling information for interop, 0x0D
    FieldMarshal = 0x0D,
    /// Declarative security attachments, 0x0E
    DeclSecurity = 0x0E,
    /// Explicit class layout, 0x0F
    ClassLayout = 0x0F,
    /// Explicit field offsets, 0x10
    FieldLayout = 0x10,
    /// Standalone signatures, 0x11
    StandAloneSig = 0x11,
    /// Type to event-list mapping, 0x12
    EventMap = 0x12,
    /// Event indirection table, 0x13
    EventPtr = 0x13,
    /// Event definitions, 0x14
    Event = 0x14,
    /// Type to property-list mapping, 0x15
    PropertyMap = 0x15,
    /// Property indirection table, 0x16
    PropertyPtr = 0x16,
    /// Property definitions, 0x17
    Property = 0x17,
    /// Accessor associations for events and properties, 0x18
    MethodSemantics = 0x18,
    /// Explicit method overrides, 0x19
    MethodImpl = 0x19,
    /// References to other modules, 0x1A
    ModuleRef = 0x1A,
    /// Type specifications (signature-described types), 0x1B
    TypeSpec = 0x1B,
    /// P/Invoke mappings, 0x1C
    ImplMap = 0x1C,
    /// Initialized field data locations, 0x1D
    FieldRVA = 0x1D,
    /// Edit-and-Continue log, 0x1E
    EncLog = 0x1E,
    /// Edit-and-Continue map, 0x1F
    EncMap = 0x1F,
    /// Assembly manifest of this image, 0x20
    Assembly = 0x20,
    /// Processor targets of this assembly, 0x21
    AssemblyProcessor = 0x21,
    /// OS targets of this assembly, 0x22
    AssemblyOS = 0x22,
    /// References to external assemblies, 0x23
    AssemblyRef = 0x23,
    /// Processor targets of referenced assemblies, 0x24
    AssemblyRefProcessor = 0x24,
    /// OS targets of referenced assemblies, 0x25
    AssemblyRefOS = 0x25,
    /// Files of a multi-file assembly, 0x26
    File = 0x26,
    /// Types exported from other modules of this assembly, 0x27
    ExportedType = 0x27,
    /// Manifest resources, 0x28
    ManifestResource = 0x28,
    /// Nesting relations between types, 0x29
    NestedClass = 0x29,
    /// Generic parameter definitions, 0x2A
    GenericParam = 0x2A,
    /// Instantiated generic methods, 0x2B
    MethodSpec = 0x2B,
    /// Constraints on generic parameters, 0x2C
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// The number of table ids, used to size per-table arrays.
    pub const COUNT: usize = TableId::GenericParamConstraint as usize + 1;

    /// Build the metadata token for a row of this table.
    ///
    /// ## Arguments
    /// * 'rid' - The 1-based row id
    #[must_use]
    pub fn token(self, rid: u32) -> crate::metadata::token::Token {
        crate::metadata::token::Token::new(((self as u32) << 24) | (rid & 0x00FF_FFFF))
    }

    /// Map a token table byte back to a `TableId`.
    ///
    /// ## Arguments
    /// * 'value' - The table byte of a metadata token
    #[must_use]
    pub fn from_token_table(value: u8) -> Option<TableId> {
        TableId::from_repr(value as usize)
    }
}
