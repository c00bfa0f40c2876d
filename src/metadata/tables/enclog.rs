use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `EncLog` table records the edit log of an Edit-and-Continue session.
/// `TableId` = 0x1E
pub struct EncLogRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// the token of the edited row
    pub edited_token: u32,
    /// the edit operation code
    pub func_code: u32,
}

impl<'a> RowDefinition<'a> for EncLogRaw {
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        8
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(EncLogRaw {
            rid,
            token: TableId::EncLog.token(rid),
            offset: *offset,
            edited_token: read_le_at::<u32>(data, offset)?,
            func_code: read_le_at::<u32>(data, offset)?,
        })
    }
}
