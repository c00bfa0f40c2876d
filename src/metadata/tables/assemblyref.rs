use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `AssemblyRef` table references external assemblies. Each row carries
/// the full descriptor of the target: name, version, culture and public key
/// or token. `TableId` = 0x23
pub struct AssemblyRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte value specifying the major version
    pub major_version: u16,
    /// a 2-byte value specifying the minor version
    pub minor_version: u16,
    /// a 2-byte value specifying the build number
    pub build_number: u16,
    /// a 2-byte value specifying the revision number
    pub revision_number: u16,
    /// a 4-byte bitmask of type `AssemblyFlags`
    pub flags: u32,
    /// an index into the Blob heap; full key or 8-byte token per the flags
    pub public_key_or_token: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the String heap
    pub culture: u32,
    /// an index into the Blob heap
    pub hash_value: u32,
}

impl<'a> RowDefinition<'a> for AssemblyRefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* major_version */       2 +
            /* minor_version */       2 +
            /* build_number */        2 +
            /* revision_number */     2 +
            /* flags */               4 +
            /* public_key_or_token */ sizes.blob_bytes() +
            /* name */                sizes.str_bytes() +
            /* culture */             sizes.str_bytes() +
            /* hash_value */          sizes.blob_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(AssemblyRefRaw {
            rid,
            token: TableId::AssemblyRef.token(rid),
            offset: *offset,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key_or_token: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
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
            0x04, 0x00, // major
            0x02, 0x00, // minor
            0x01, 0x00, // build
            0x00, 0x00, // revision
            0x01, 0x00, 0x00, 0x00, // flags (PUBLIC_KEY)
            0x10, 0x00, // public_key_or_token
            0x42, 0x00, // name
            0x43, 0x00, // culture
            0x20, 0x00, // hash_value
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::AssemblyRef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<AssemblyRefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x2300_0001);
        assert_eq!(row.major_version, 4);
        assert_eq!(row.minor_version, 2);
        assert_eq!(row.build_number, 1);
        assert_eq!(row.revision_number, 0);
        assert_eq!(row.flags, 1);
        assert_eq!(row.public_key_or_token, 0x10);
        assert_eq!(row.name, 0x42);
        assert_eq!(row.culture, 0x43);
        assert_eq!(row.hash_value, 0x20);
    }
}
