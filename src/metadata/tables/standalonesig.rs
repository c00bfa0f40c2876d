use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `StandAloneSig` table stores signatures referenced directly by IL,
/// primarily local variable signatures. `TableId` = 0x11
pub struct StandAloneSigRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the Blob heap holding the signature
    pub signature: u32,
}

impl<'a> RowDefinition<'a> for StandAloneSigRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.blob_bytes())
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(StandAloneSigRaw {
            rid,
            token: TableId::StandAloneSig.token(rid),
            offset: *offset,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
