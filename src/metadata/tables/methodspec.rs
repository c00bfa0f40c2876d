use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `MethodSpec` table records instantiations of generic methods.
/// `TableId` = 0x2B
pub struct MethodSpecRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a `MethodDefOrRef` coded index naming the generic method
    pub method: CodedIndex,
    /// an index into the Blob heap holding the instantiation signature
    pub instantiation: u32,
}

impl<'a> RowDefinition<'a> for MethodSpecRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* method */        sizes.coded_index_bytes(CodedIndexKind::MethodDefOrRef) +
            /* instantiation */ sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(MethodSpecRaw {
            rid,
            token: TableId::MethodSpec.token(rid),
            offset: *offset,
            method: CodedIndex::read(data, offset, sizes, CodedIndexKind::MethodDefOrRef)?,
            instantiation: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
