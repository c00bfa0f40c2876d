use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `ModuleRef` table references other modules of this assembly, primarily
/// as P/Invoke import scopes. `TableId` = 0x1A
pub struct ModuleRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the String heap
    pub name: u32,
}

impl<'a> RowDefinition<'a> for ModuleRefRaw {
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.str_bytes())
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ModuleRefRaw {
            rid,
            token: TableId::ModuleRef.token(rid),
            offset: *offset,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}
