use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `FileAttributes`
pub mod FileAttributes {
    /// The file is a module carrying metadata
    pub const CONTAINS_META_DATA: u32 = 0x0000;
    /// The file is a resource without metadata
    pub const CONTAINS_NO_META_DATA: u32 = 0x0001;
}

#[derive(Clone, Debug)]
/// The `File` table lists the files making up a multi-file assembly.
/// `TableId` = 0x26
pub struct FileRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte bitmask of type `FileAttributes`
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap holding the file hash
    pub hash_value: u32,
}

impl<'a> RowDefinition<'a> for FileRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */      4 +
            /* name */       sizes.str_bytes() +
            /* hash_value */ sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(FileRaw {
            rid,
            token: TableId::File.token(rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
