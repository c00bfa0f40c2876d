use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `MethodPtr` table indirects method list references in unoptimized
/// images. `TableId` = 0x05
pub struct MethodPtrRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the `MethodDef` table
    pub method: u32,
}

impl<'a> RowDefinition<'a> for MethodPtrRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.table_index_bytes(TableId::MethodDef))
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(MethodPtrRaw {
            rid,
            token: TableId::MethodPtr.token(rid),
            offset: *offset,
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}
