use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `MemberRef` table references fields and methods of other types,
/// including members of other modules and assemblies. `TableId` = 0x0A
pub struct MemberRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a `MemberRefParent` coded index naming the owner of the member
    pub class: CodedIndex,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap holding the member signature
    pub signature: u32,
}

impl<'a> RowDefinition<'a> for MemberRefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */     sizes.coded_index_bytes(CodedIndexKind::MemberRefParent) +
            /* name */      sizes.str_bytes() +
            /* signature */ sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            token: TableId::MemberRef.token(rid),
            offset: *offset,
            class: CodedIndex::read(data, offset, sizes, CodedIndexKind::MemberRefParent)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataTable, TableInfo};
    use std::sync::Arc;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x09, 0x00, // class (tag 1 = TypeRef, row 1)
            0x42, 0x00, // name
            0x10, 0x00, // signature
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MemberRef, 1), (TableId::TypeRef, 2)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MemberRefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0A00_0001);
        assert_eq!(row.class, CodedIndex::new(TableId::TypeRef, 1));
        assert_eq!(row.name, 0x42);
        assert_eq!(row.signature, 0x10);
    }
}
