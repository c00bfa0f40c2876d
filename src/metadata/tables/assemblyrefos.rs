use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `AssemblyRefOS` table names operating system targets of referenced
/// assemblies. Conforming images leave it empty. `TableId` = 0x25
pub struct AssemblyRefOsRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte OS platform identifier
    pub os_platform_id: u32,
    /// a 4-byte OS major version
    pub os_major_version: u32,
    /// a 4-byte OS minor version
    pub os_minor_version: u32,
    /// an index into the `AssemblyRef` table
    pub assembly_ref: u32,
}

impl<'a> RowDefinition<'a> for AssemblyRefOsRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* os_platform_id */   4 +
            /* os_major_version */ 4 +
            /* os_minor_version */ 4 +
            /* assembly_ref */     sizes.table_index_bytes(TableId::AssemblyRef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(AssemblyRefOsRaw {
            rid,
            token: TableId::AssemblyRefOS.token(rid),
            offset: *offset,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, sizes.is_large(TableId::AssemblyRef))?,
        })
    }
}
