use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `Event` table defines the events of the current module's types.
/// `TableId` = 0x14
pub struct EventRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte bitmask of type `EventAttributes`
    pub event_flags: u16,
    /// an index into the String heap
    pub name: u32,
    /// a `TypeDefOrRef` coded index to the delegate type of the event
    pub event_type: CodedIndex,
}

impl<'a> RowDefinition<'a> for EventRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* event_flags */ 2 +
            /* name */        sizes.str_bytes() +
            /* event_type */  sizes.coded_index_bytes(CodedIndexKind::TypeDefOrRef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(EventRaw {
            rid,
            token: TableId::Event.token(rid),
            offset: *offset,
            event_flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            event_type: CodedIndex::read(data, offset, sizes, CodedIndexKind::TypeDefOrRef)?,
        })
    }
}
