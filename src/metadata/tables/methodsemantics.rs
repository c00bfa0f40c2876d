use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `MethodSemanticsAttributes`
pub mod MethodSemanticsAttributes {
    /// Setter for a property
    pub const SETTER: u32 = 0x0001;
    /// Getter for a property
    pub const GETTER: u32 = 0x0002;
    /// Other method for a property or event
    pub const OTHER: u32 = 0x0004;
    /// `AddOn` method for an event
    pub const ADD_ON: u32 = 0x0008;
    /// `RemoveOn` method for an event
    pub const REMOVE_ON: u32 = 0x0010;
    /// Fire method for an event
    pub const FIRE: u32 = 0x0020;
}

#[derive(Clone, Debug)]
/// The `MethodSemantics` table associates accessor methods with the events
/// and properties they implement. Rows are sorted by the `association`
/// column. `TableId` = 0x18
pub struct MethodSemanticsRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte bitmask of type `MethodSemanticsAttributes`
    pub semantics: u16,
    /// an index into the `MethodDef` table
    pub method: u32,
    /// a `HasSemantics` coded index naming the event or property
    pub association: CodedIndex,
}

impl<'a> RowDefinition<'a> for MethodSemanticsRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* semantics */   2 +
            /* method */      sizes.table_index_bytes(TableId::MethodDef) +
            /* association */ sizes.coded_index_bytes(CodedIndexKind::HasSemantics)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(MethodSemanticsRaw {
            rid,
            token: TableId::MethodSemantics.token(rid),
            offset: *offset,
            semantics: read_le_at::<u16>(data, offset)?,
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
            association: CodedIndex::read(data, offset, sizes, CodedIndexKind::HasSemantics)?,
        })
    }
}
