use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `AssemblyRefProcessor` table names processor targets of referenced
/// assemblies. Conforming images leave it empty. `TableId` = 0x24
pub struct AssemblyRefProcessorRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte processor identifier
    pub processor: u32,
    /// an index into the `AssemblyRef` table
    pub assembly_ref: u32,
}

impl<'a> RowDefinition<'a> for AssemblyRefProcessorRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* processor */    4 +
            /* assembly_ref */ sizes.table_index_bytes(TableId::AssemblyRef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(AssemblyRefProcessorRaw {
            rid,
            token: TableId::AssemblyRefProcessor.token(rid),
            offset: *offset,
            processor: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, sizes.is_large(TableId::AssemblyRef))?,
        })
    }
}
