use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `EventPtr` table indirects event list references in unoptimized
/// images. `TableId` = 0x13
pub struct EventPtrRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the Event table
    pub event: u32,
}

impl<'a> RowDefinition<'a> for EventPtrRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.table_index_bytes(TableId::Event))
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(EventPtrRaw {
            rid,
            token: TableId::EventPtr.token(rid),
            offset: *offset,
            event: read_le_at_dyn(data, offset, sizes.is_large(TableId::Event))?,
        })
    }
}
