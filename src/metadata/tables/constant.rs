use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `Constant` table stores compile-time constants for fields, parameters
/// and properties. Rows are sorted by the `parent` column. `TableId` = 0x0B
pub struct ConstantRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 1-byte element type constant per §II.23.1.16
    pub c_type: u8,
    /// a `HasConstant` coded index naming the owner
    pub parent: CodedIndex,
    /// an index into the Blob heap holding the value
    pub value: u32,
}

impl<'a> RowDefinition<'a> for ConstantRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* c_type */  1 +
            /* padding */ 1 +
            /* parent */  sizes.coded_index_bytes(CodedIndexKind::HasConstant) +
            /* value */   sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        let c_type = read_le_at::<u8>(data, offset)?;
        let _padding = read_le_at::<u8>(data, offset)?;

        Ok(ConstantRaw {
            rid,
            token: TableId::Constant.token(rid),
            offset: *offset,
            c_type,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexKind::HasConstant)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
