use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `FieldPtr` table indirects field list references in unoptimized
/// images. `TableId` = 0x03
pub struct FieldPtrRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the Field table
    pub field: u32,
}

impl<'a> RowDefinition<'a> for FieldPtrRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.table_index_bytes(TableId::Field))
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(FieldPtrRaw {
            rid,
            token: TableId::FieldPtr.token(rid),
            offset: *offset,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}
