use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `CustomAttribute` table attaches attribute blobs to metadata members.
/// Rows are sorted by the `parent` column. `TableId` = 0x0C
pub struct CustomAttributeRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a `HasCustomAttribute` coded index naming the attributed member
    pub parent: CodedIndex,
    /// a `CustomAttributeType` coded index naming the attribute constructor
    pub constructor: CodedIndex,
    /// an index into the Blob heap holding the attribute arguments
    pub value: u32,
}

impl<'a> RowDefinition<'a> for CustomAttributeRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */      sizes.coded_index_bytes(CodedIndexKind::HasCustomAttribute) +
            /* constructor */ sizes.coded_index_bytes(CodedIndexKind::CustomAttributeType) +
            /* value */       sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            token: TableId::CustomAttribute.token(rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexKind::HasCustomAttribute)?,
            constructor: CodedIndex::read(
                data,
                offset,
                sizes,
                CodedIndexKind::CustomAttributeType,
            )?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
