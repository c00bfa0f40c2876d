use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `Module` table describes the current module: name, MVID and
/// Edit-and-Continue identifiers. A conforming image has exactly one row.
/// `TableId` = 0x00
pub struct ModuleRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte value, reserved, shall be zero
    pub generation: u16,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Guid heap; the module version identifier
    pub mvid: u32,
    /// an index into the Guid heap; non-zero only for Edit-and-Continue images
    pub encid: u32,
    /// an index into the Guid heap; non-zero only for Edit-and-Continue images
    pub encbaseid: u32,
}

impl<'a> RowDefinition<'a> for ModuleRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* generation */ 2 +
            /* name */       sizes.str_bytes() +
            /* mvid */       sizes.guid_bytes() +
            /* encid */      sizes.guid_bytes() +
            /* encbaseid */  sizes.guid_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ModuleRaw {
            rid,
            token: TableId::Module.token(rid),
            offset: *offset,
            generation: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            mvid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encbaseid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
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
            0x00, 0x00, // generation
            0x42, 0x00, // name
            0x01, 0x00, // mvid
            0x00, 0x00, // encid
            0x00, 0x00, // encbaseid
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Module, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ModuleRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0000_0001);
        assert_eq!(row.generation, 0);
        assert_eq!(row.name, 0x42);
        assert_eq!(row.mvid, 1);
        assert_eq!(row.encid, 0);
        assert_eq!(row.encbaseid, 0);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x00, // generation
            0x01, 0x00, 0x00, 0x01, // name
            0x02, 0x00, 0x00, 0x01, // mvid
            0x03, 0x00, 0x00, 0x01, // encid
            0x04, 0x00, 0x00, 0x01, // encbaseid
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Module, 1)],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<ModuleRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.generation, 1);
        assert_eq!(row.name, 0x0100_0001);
        assert_eq!(row.mvid, 0x0100_0002);
        assert_eq!(row.encid, 0x0100_0003);
        assert_eq!(row.encbaseid, 0x0100_0004);
    }
}
