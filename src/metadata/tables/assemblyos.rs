use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `AssemblyOS` table names operating system targets of the current
/// assembly. Conforming images leave it empty. `TableId` = 0x22
pub struct AssemblyOsRaw {
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
}

impl<'a> RowDefinition<'a> for AssemblyOsRaw {
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        12
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        _sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(AssemblyOsRaw {
            rid,
            token: TableId::AssemblyOS.token(rid),
            offset: *offset,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
        })
    }
}
