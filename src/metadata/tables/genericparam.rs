use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `GenericParamAttributes`
pub mod GenericParamAttributes {
    /// Use this mask to retrieve variance information
    pub const VARIANCE_MASK: u32 = 0x0003;
    /// The generic parameter is non-variant
    pub const NONE: u32 = 0x0000;
    /// The generic parameter is covariant
    pub const COVARIANT: u32 = 0x0001;
    /// The generic parameter is contravariant
    pub const CONTRAVARIANT: u32 = 0x0002;
    /// Use this mask to retrieve special constraints
    pub const SPECIAL_CONSTRAINT_MASK: u32 = 0x001C;
    /// The parameter must be a reference type
    pub const REFERENCE_TYPE_CONSTRAINT: u32 = 0x0004;
    /// The parameter must be a non-nullable value type
    pub const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT: u32 = 0x0008;
    /// The parameter must have a default constructor
    pub const DEFAULT_CONSTRUCTOR_CONSTRAINT: u32 = 0x0010;
}

#[derive(Clone, Debug)]
/// The `GenericParam` table defines the generic parameters of generic types
/// and methods. Rows are sorted by the owner coded index. `TableId` = 0x2A
pub struct GenericParamRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte index of the parameter, numbered left-to-right from zero
    pub number: u16,
    /// a 2-byte bitmask of type `GenericParamAttributes`
    pub flags: u16,
    /// a `TypeOrMethodDef` coded index naming the owning type or method
    pub owner: CodedIndex,
    /// an index into the String heap
    pub name: u32,
}

impl<'a> RowDefinition<'a> for GenericParamRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* number */ 2 +
            /* flags */  2 +
            /* owner */  sizes.coded_index_bytes(CodedIndexKind::TypeOrMethodDef) +
            /* name */   sizes.str_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(GenericParamRaw {
            rid,
            token: TableId::GenericParam.token(rid),
            offset: *offset,
            number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            owner: CodedIndex::read(data, offset, sizes, CodedIndexKind::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
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
            0x00, 0x00, // number
            0x04, 0x00, // flags
            0x02, 0x00, // owner (tag 0 = TypeDef, row 1)
            0x42, 0x00, // name
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[
                (TableId::GenericParam, 1),
                (TableId::TypeDef, 10),
                (TableId::MethodDef, 10),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<GenericParamRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x2A00_0001);
        assert_eq!(row.number, 0);
        assert_eq!(row.flags, GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT as u16);
        assert_eq!(row.owner, CodedIndex::new(TableId::TypeDef, 1));
        assert_eq!(row.name, 0x42);
    }

    #[test]
    fn crafted_method_owner() {
        let data = vec![
            0x01, 0x00, // number
            0x00, 0x00, // flags
            0x05, 0x00, // owner (tag 1 = MethodDef, row 2)
            0x42, 0x00, // name
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[
                (TableId::GenericParam, 1),
                (TableId::TypeDef, 10),
                (TableId::MethodDef, 10),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<GenericParamRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.number, 1);
        assert_eq!(row.owner, CodedIndex::new(TableId::MethodDef, 2));
    }
}
