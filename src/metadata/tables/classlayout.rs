use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `ClassLayout` table supplies explicit size and packing for types.
/// Rows are sorted by the `parent` column. `TableId` = 0x0F
pub struct ClassLayoutRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte packing size (power of two, 0 for default)
    pub packing_size: u16,
    /// a 4-byte class size in bytes
    pub class_size: u32,
    /// an index into the `TypeDef` table
    pub parent: u32,
}

impl<'a> RowDefinition<'a> for ClassLayoutRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* packing_size */ 2 +
            /* class_size */   4 +
            /* parent */       sizes.table_index_bytes(TableId::TypeDef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ClassLayoutRaw {
            rid,
            token: TableId::ClassLayout.token(rid),
            offset: *offset,
            packing_size: read_le_at::<u16>(data, offset)?,
            class_size: read_le_at::<u32>(data, offset)?,
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}
