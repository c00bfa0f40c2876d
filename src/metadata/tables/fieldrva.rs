use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `FieldRVA` table locates the initial data of fields with static
/// initializers. Rows are sorted by the `field` column. `TableId` = 0x1D
pub struct FieldRvaRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// RVA of the field's initial data
    pub rva: u32,
    /// an index into the Field table
    pub field: u32,
}

impl<'a> RowDefinition<'a> for FieldRvaRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */   4 +
            /* field */ sizes.table_index_bytes(TableId::Field)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(FieldRvaRaw {
            rid,
            token: TableId::FieldRVA.token(rid),
            offset: *offset,
            rva: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}
