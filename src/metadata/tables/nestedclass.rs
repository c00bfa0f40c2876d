use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `NestedClass` table records which types are nested inside which
/// enclosing types. Rows are sorted by the `nested_class` column.
/// `TableId` = 0x29
pub struct NestedClassRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the `TypeDef` table; the nested type
    pub nested_class: u32,
    /// an index into the `TypeDef` table; the type it is nested in
    pub enclosing_class: u32,
}

impl<'a> RowDefinition<'a> for NestedClassRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* nested_class */    sizes.table_index_bytes(TableId::TypeDef) +
            /* enclosing_class */ sizes.table_index_bytes(TableId::TypeDef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(NestedClassRaw {
            rid,
            token: TableId::NestedClass.token(rid),
            offset: *offset,
            nested_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
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
            0x03, 0x00, // nested_class
            0x02, 0x00, // enclosing_class
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::NestedClass, 1), (TableId::TypeDef, 3)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<NestedClassRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x2900_0001);
        assert_eq!(row.nested_class, 3);
        assert_eq!(row.enclosing_class, 2);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x03, 0x00, 0x00, 0x01, // nested_class
            0x02, 0x00, 0x00, 0x01, // enclosing_class
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[
                (TableId::NestedClass, 1),
                (TableId::TypeDef, u32::from(u16::MAX) + 2),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<NestedClassRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.nested_class, 0x0100_0003);
        assert_eq!(row.enclosing_class, 0x0100_0002);
    }
}
