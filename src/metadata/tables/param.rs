use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `ParamAttributes`
pub mod ParamAttributes {
    /// Parameter is an input parameter
    pub const IN: u32 = 0x0001;
    /// Parameter is an output parameter
    pub const OUT: u32 = 0x0002;
    /// Parameter is optional
    pub const OPTIONAL: u32 = 0x0010;
    /// Parameter has a default value
    pub const HAS_DEFAULT: u32 = 0x1000;
    /// Parameter has field marshalling information
    pub const HAS_FIELD_MARSHAL: u32 = 0x2000;
}

#[derive(Clone, Debug)]
/// The `Param` table carries name and flags for method parameters.
/// `TableId` = 0x08
pub struct ParamRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte bitmask of type `ParamAttributes`
    pub flags: u16,
    /// a 2-byte position of the parameter; 0 is the return value
    pub sequence: u16,
    /// an index into the String heap
    pub name: u32,
}

impl<'a> RowDefinition<'a> for ParamRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */    2 +
            /* sequence */ 2 +
            /* name */     sizes.str_bytes()
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(ParamRaw {
            rid,
            token: TableId::Param.token(rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            sequence: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
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
            0x01, 0x00, // flags
            0x01, 0x00, // sequence
            0x42, 0x00, // name
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Param, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ParamRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0800_0001);
        assert_eq!(row.flags, ParamAttributes::IN as u16);
        assert_eq!(row.sequence, 1);
        assert_eq!(row.name, 0x42);
    }
}
