use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible values for `AssemblyHashAlgorithm`
pub mod AssemblyHashAlgorithm {
    /// No hash algorithm
    pub const NONE: u32 = 0x0000;
    /// MD5
    pub const MD5: u32 = 0x8003;
    /// SHA-1
    pub const SHA1: u32 = 0x8004;
}

#[allow(non_snake_case)]
/// All possible flags for `AssemblyFlags`
pub mod AssemblyFlags {
    /// The assembly reference holds the full (unhashed) public key
    pub const PUBLIC_KEY: u32 = 0x0001;
    /// The implementation of this assembly used at runtime is not expected to match the compile-time version
    pub const RETARGETABLE: u32 = 0x0100;
    /// Content type mask; 0x0800 means Windows Runtime
    pub const CONTENT_TYPE_MASK: u32 = 0x0E00;
    /// Reserved: JIT should not generate optimized code
    pub const DISABLE_JIT_COMPILE_OPTIMIZER: u32 = 0x4000;
    /// Reserved: JIT should generate CIL-to-native maps
    pub const ENABLE_JIT_COMPILE_TRACKING: u32 = 0x8000;
}

#[derive(Clone, Debug)]
/// The `Assembly` table holds the manifest of the current assembly: name,
/// version, flags and public key. At most one row exists per image.
/// `TableId` = 0x20
pub struct AssemblyRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte constant of type `AssemblyHashAlgorithm`
    pub hash_alg_id: u32,
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
    /// an index into the Blob heap holding the public key
    pub public_key: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the String heap
    pub culture: u32,
}

impl<'a> RowDefinition<'a> for AssemblyRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* hash_alg_id */     4 +
            /* major_version */   2 +
            /* minor_version */   2 +
            /* build_number */    2 +
            /* revision_number */ 2 +
            /* flags */           4 +
            /* public_key */      sizes.blob_bytes() +
            /* name */            sizes.str_bytes() +
            /* culture */         sizes.str_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(AssemblyRaw {
            rid,
            token: TableId::Assembly.token(rid),
            offset: *offset,
            hash_alg_id: read_le_at::<u32>(data, offset)?,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
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
            0x04, 0x80, 0x00, 0x00, // hash_alg_id (SHA1)
            0x01, 0x00, // major
            0x00, 0x00, // minor
            0x00, 0x00, // build
            0x00, 0x00, // revision
            0x00, 0x00, 0x00, 0x00, // flags
            0x00, 0x00, // public_key
            0x42, 0x00, // name
            0x00, 0x00, // culture
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Assembly, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<AssemblyRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x2000_0001);
        assert_eq!(row.hash_alg_id, AssemblyHashAlgorithm::SHA1);
        assert_eq!(row.major_version, 1);
        assert_eq!(row.minor_version, 0);
        assert_eq!(row.name, 0x42);
        assert_eq!(row.culture, 0);
    }
}
