use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `ImplMap` table maps managed members to unmanaged functions imported
/// through P/Invoke. Rows are sorted by the `member_forwarded` column.
/// `TableId` = 0x1C
pub struct ImplMapRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte bitmask of type `PInvokeAttributes`
    pub mapping_flags: u16,
    /// a `MemberForwarded` coded index; always a `MethodDef` in practice
    pub member_forwarded: CodedIndex,
    /// an index into the String heap; the imported function name
    pub import_name: u32,
    /// an index into the `ModuleRef` table; the import scope
    pub import_scope: u32,
}

impl<'a> RowDefinition<'a> for ImplMapRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* mapping_flags */    2 +
            /* member_forwarded */ sizes.coded_index_bytes(CodedIndexKind::MemberForwarded) +
            /* import_name */      sizes.str_bytes() +
            /* import_scope */     sizes.table_index_bytes(TableId::ModuleRef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ImplMapRaw {
            rid,
            token: TableId::ImplMap.token(rid),
            offset: *offset,
            mapping_flags: read_le_at::<u16>(data, offset)?,
            member_forwarded: CodedIndex::read(data, offset, sizes, CodedIndexKind::MemberForwarded)?,
            import_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            import_scope: read_le_at_dyn(data, offset, sizes.is_large(TableId::ModuleRef))?,
        })
    }
}
