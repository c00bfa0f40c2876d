use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `FieldLayout` table supplies explicit byte offsets for fields of
/// explicitly laid out types. Rows are sorted by the `field` column.
/// `TableId` = 0x10
pub struct FieldLayoutRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte offset of the field within its type
    pub field_offset: u32,
    /// an index into the Field table
    pub field: u32,
}

impl<'a> RowDefinition<'a> for FieldLayoutRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* field_offset */ 4 +
            /* field */        sizes.table_index_bytes(TableId::Field)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(FieldLayoutRaw {
            rid,
            token: TableId::FieldLayout.token(rid),
            offset: *offset,
            field_offset: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}
