use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexKind, RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `MethodImpl` table records explicit method overrides. Rows are sorted
/// by the `class` column. `TableId` = 0x19
pub struct MethodImplRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the `TypeDef` table; the type owning the override
    pub class: u32,
    /// a `MethodDefOrRef` coded index; the implementing method body
    pub method_body: CodedIndex,
    /// a `MethodDefOrRef` coded index; the overridden declaration
    pub method_declaration: CodedIndex,
}

impl<'a> RowDefinition<'a> for MethodImplRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */              sizes.table_index_bytes(TableId::TypeDef) +
            /* method_body */        sizes.coded_index_bytes(CodedIndexKind::MethodDefOrRef) +
            /* method_declaration */ sizes.coded_index_bytes(CodedIndexKind::MethodDefOrRef)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(MethodImplRaw {
            rid,
            token: TableId::MethodImpl.token(rid),
            offset: *offset,
            class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            method_body: CodedIndex::read(data, offset, sizes, CodedIndexKind::MethodDefOrRef)?,
            method_declaration: CodedIndex::read(
                data,
                offset,
                sizes,
                CodedIndexKind::MethodDefOrRef,
            )?,
        })
    }
}
