use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `ParamPtr` table indirects parameter list references in unoptimized
/// images. `TableId` = 0x07
pub struct ParamPtrRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the Param table
    pub param: u32,
}

impl<'a> RowDefinition<'a> for ParamPtrRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.table_index_bytes(TableId::Param))
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ParamPtrRaw {
            rid,
            token: TableId::ParamPtr.token(rid),
            offset: *offset,
            param: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
        })
    }
}
