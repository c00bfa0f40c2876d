use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `FieldMarshal` table attaches native marshalling descriptors to fields
/// and parameters. Rows are sorted by the `parent` column. `TableId` = 0x0D
pub struct FieldMarshalRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a `HasFieldMarshal` coded index naming the owner
    pub parent: CodedIndex,
    /// an index into the Blob heap holding the native type descriptor
    pub native_type: u32,
}

impl<'a> RowDefinition<'a> for FieldMarshalRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */      sizes.coded_index_bytes(CodedIndexKind::HasFieldMarshal) +
            /* native_type */ sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(FieldMarshalRaw {
            rid,
            token: TableId::FieldMarshal.token(rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexKind::HasFieldMarshal)?,
            native_type: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
