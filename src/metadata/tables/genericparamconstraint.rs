use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `GenericParamConstraint` table records the type constraints of
/// generic parameters. Rows are sorted by the `owner` column.
/// `TableId` = 0x2C
pub struct GenericParamConstraintRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the `GenericParam` table
    pub owner: u32,
    /// a `TypeDefOrRef` coded index to the constraining type
    pub constraint: CodedIndex,
}

impl<'a> RowDefinition<'a> for GenericParamConstraintRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* owner */      sizes.table_index_bytes(TableId::GenericParam) +
            /* constraint */ sizes.coded_index_bytes(CodedIndexKind::TypeDefOrRef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(GenericParamConstraintRaw {
            rid,
            token: TableId::GenericParamConstraint.token(rid),
            offset: *offset,
            owner: read_le_at_dyn(data, offset, sizes.is_large(TableId::GenericParam))?,
            constraint: CodedIndex::read(data, offset, sizes, CodedIndexKind::TypeDefOrRef)?,
        })
    }
}
