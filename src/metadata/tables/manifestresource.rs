use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `ManifestResourceAttributes`
pub mod ManifestResourceAttributes {
    /// The resource is exported from the assembly
    pub const PUBLIC: u32 = 0x0001;
    /// The resource is private to the assembly
    pub const PRIVATE: u32 = 0x0002;
}

#[derive(Clone, Debug)]
/// The `ManifestResource` table lists the resources of this assembly.
/// `TableId` = 0x28
pub struct ManifestResourceRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte offset of the resource within the resource data
    pub data_offset: u32,
    /// a 4-byte bitmask of type `ManifestResourceAttributes`
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an `Implementation` coded index; null for resources in this file
    pub implementation: CodedIndex,
}

impl<'a> RowDefinition<'a> for ManifestResourceRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* data_offset */    4 +
            /* flags */          4 +
            /* name */           sizes.str_bytes() +
            /* implementation */ sizes.coded_index_bytes(CodedIndexKind::Implementation)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ManifestResourceRaw {
            rid,
            token: TableId::ManifestResource.token(rid),
            offset: *offset,
            data_offset: read_le_at::<u32>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            implementation: CodedIndex::read(data, offset, sizes, CodedIndexKind::Implementation)?,
        })
    }
}
