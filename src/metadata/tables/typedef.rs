use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `TypeAttributes`
pub mod TypeAttributes {
    /// Use this mask to retrieve visibility information
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Class has no public scope
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Class has public scope
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Class is nested with public visibility
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Class is nested with private visibility
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Class is nested with family visibility
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Class is nested with assembly visibility
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Class is nested with family and assembly visibility
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Class is nested with family or assembly visibility
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;
    /// Use this mask to retrieve class layout information
    pub const LAYOUT_MASK: u32 = 0x0000_0018;
    /// Class fields are auto-laid out
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;
    /// Class fields are laid out sequentially
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;
    /// Layout is supplied explicitly
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;
    /// Use this mask to retrieve class semantics information
    pub const CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;
    /// Type is a class
    pub const CLASS: u32 = 0x0000_0000;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class cannot be extended
    pub const SEALED: u32 = 0x0000_0100;
    /// Class name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// Name is special to the runtime
    pub const RT_SPECIAL_NAME: u32 = 0x0000_0800;
    /// Class/Interface is imported
    pub const IMPORT: u32 = 0x0000_1000;
    /// Reserved (class is serializable)
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// Use this mask to retrieve string format for native interop
    pub const STRING_FORMAT_MASK: u32 = 0x0003_0000;
    /// LPSTR is interpreted as ANSI
    pub const ANSI_CLASS: u32 = 0x0000_0000;
    /// LPSTR is interpreted as Unicode
    pub const UNICODE_CLASS: u32 = 0x0001_0000;
    /// LPSTR is interpreted automatically
    pub const AUTO_CLASS: u32 = 0x0002_0000;
    /// A non-standard encoding specified by the custom format mask
    pub const CUSTOM_FORMAT_CLASS: u32 = 0x0003_0000;
    /// This type is a forwarder to a type in another assembly
    pub const FORWARDER: u32 = 0x0020_0000;
    /// Initialize the class before first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
    /// Class has security associated with it
    pub const HAS_SECURITY: u32 = 0x0004_0000;
}

#[derive(Clone, Debug)]
/// The `TypeDef` table defines the types (classes, interfaces, value types,
/// enums) of the current module. `TableId` = 0x02
pub struct TypeDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte bitmask of type `TypeAttributes`
    pub flags: u32,
    /// an index into the String heap
    pub type_name: u32,
    /// an index into the String heap
    pub type_namespace: u32,
    /// a `TypeDefOrRef` coded index to the base type
    pub extends: CodedIndex,
    /// an index into the Field table; first of a contiguous run owned by this type
    pub field_list: u32,
    /// an index into the `MethodDef` table; first of a contiguous run owned by this type
    pub method_list: u32,
}

impl<'a> RowDefinition<'a> for TypeDefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */          4 +
            /* type_name */      sizes.str_bytes() +
            /* type_namespace */ sizes.str_bytes() +
            /* extends */        sizes.coded_index_bytes(CodedIndexKind::TypeDefOrRef) +
            /* field_list */     sizes.table_index_bytes(TableId::Field) +
            /* method_list */    sizes.table_index_bytes(TableId::MethodDef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            token: TableId::TypeDef.token(rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: CodedIndex::read(data, offset, sizes, CodedIndexKind::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataTable, TableInfo};
    use std::sync::Arc;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x00, 0x00, 0x00, 0x01, // flags
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
            0x00, 0x02, // extends
            0x00, 0x03, // field_list
            0x00, 0x04, // method_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Field, 1), (TableId::MethodDef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<TypeDefRaw>::new(&data, 1, sizes).unwrap();

        let eval = |row: TypeDefRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0200_0001);
            assert_eq!(row.flags, 0x0100_0000);
            assert_eq!(row.type_name, 0x42);
            assert_eq!(row.type_namespace, 0x43);
            assert_eq!(
                row.extends,
                CodedIndex::new(TableId::TypeDef, 0x80)
            );
            assert_eq!(row.field_list, 0x0300);
            assert_eq!(row.method_list, 0x0400);
        };

        for row in table.iter() {
            eval(row);
        }

        eval(table.get(1).unwrap());
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x00, 0x00, 0x00, 0x01, // flags
            0x00, 0x00, 0x00, 0x02, // type_name
            0x00, 0x00, 0x00, 0x03, // type_namespace
            0x00, 0x00, 0x00, 0x04, // extends
            0x00, 0x00, 0x00, 0x05, // field_list
            0x00, 0x00, 0x00, 0x06, // method_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[
                (TableId::Field, u32::from(u16::MAX) + 2),
                (TableId::MethodDef, u32::from(u16::MAX) + 2),
                (TableId::TypeDef, u32::from(u16::MAX) + 2),
                (TableId::TypeRef, u32::from(u16::MAX) + 2),
                (TableId::TypeSpec, u32::from(u16::MAX) + 2),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<TypeDefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0200_0001);
        assert_eq!(row.type_name, 0x0200_0000);
        assert_eq!(row.type_namespace, 0x0300_0000);
        assert_eq!(
            row.extends,
            CodedIndex::new(TableId::TypeDef, 0x0100_0000)
        );
        assert_eq!(row.field_list, 0x0500_0000);
        assert_eq!(row.method_list, 0x0600_0000);
    }
}
