use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `EncMap` table maps tokens of an Edit-and-Continue delta image.
/// `TableId` = 0x1F
pub struct EncMapRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// the mapped token
    pub mapped_token: u32,
}

impl<'a> RowDefinition<'a> for EncMapRaw {
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        4
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(EncMapRaw {
            rid,
            token: TableId::EncMap.token(rid),
            offset: *offset,
            mapped_token: read_le_at::<u32>(data, offset)?,
        })
    }
}
