use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `AssemblyProcessor` table names processor targets of the current
/// assembly. Conforming images leave it empty. `TableId` = 0x21
pub struct AssemblyProcessorRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte processor identifier
    pub processor: u32,
}

impl<'a> RowDefinition<'a> for AssemblyProcessorRaw {
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        4
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(AssemblyProcessorRaw {
            rid,
            token: TableId::AssemblyProcessor.token(rid),
            offset: *offset,
            processor: read_le_at::<u32>(data, offset)?,
        })
    }
}
