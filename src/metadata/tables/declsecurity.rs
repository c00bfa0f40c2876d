use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `DeclSecurity` table attaches declarative security actions to types,
/// methods and assemblies. Rows are sorted by the `parent` column.
/// `TableId` = 0x0E
pub struct DeclSecurityRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte security action code
    pub action: u16,
    /// a `HasDeclSecurity` coded index naming the owner
    pub parent: CodedIndex,
    /// an index into the Blob heap holding the permission set
    pub permission_set: u32,
}

impl<'a> RowDefinition<'a> for DeclSecurityRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* action */         2 +
            /* parent */         sizes.coded_index_bytes(CodedIndexKind::HasDeclSecurity) +
            /* permission_set */ sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(DeclSecurityRaw {
            rid,
            token: TableId::DeclSecurity.token(rid),
            offset: *offset,
            action: read_le_at::<u16>(data, offset)?,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexKind::HasDeclSecurity)?,
            permission_set: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
