use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowDefinition, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// All possible flags for `MethodAttributes`
pub mod MethodAttributes {
    /// Use this mask to retrieve accessibility information
    pub const MEMBER_ACCESS_MASK: u32 = 0x0007;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0000;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by sub-types only in this assembly
    pub const FAM_AND_ASSEM: u32 = 0x0002;
    /// Accessible by anyone in the assembly
    pub const ASSEM: u32 = 0x0003;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x0004;
    /// Accessible by sub-types anywhere, plus anyone in the assembly
    pub const FAM_OR_ASSEM: u32 = 0x0005;
    /// Accessible by anyone who has visibility to this scope
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Method cannot be overridden
    pub const FINAL: u32 = 0x0020;
    /// Method is virtual
    pub const VIRTUAL: u32 = 0x0040;
    /// Method hides by name and signature, else just by name
    pub const HIDE_BY_SIG: u32 = 0x0080;
    /// Method reuses existing slot in vtable, else always gets a new slot
    pub const NEW_SLOT: u32 = 0x0100;
    /// Method can only be overridden if also accessible
    pub const STRICT: u32 = 0x0200;
    /// Method does not provide an implementation
    pub const ABSTRACT: u32 = 0x0400;
    /// Method is special
    pub const SPECIAL_NAME: u32 = 0x0800;
    /// Implementation is forwarded through PInvoke
    pub const PINVOKE_IMPL: u32 = 0x2000;
    /// Reserved: method name is special to the runtime
    pub const RT_SPECIAL_NAME: u32 = 0x1000;
    /// Method has security associated with it
    pub const HAS_SECURITY: u32 = 0x4000;
    /// Method calls another method containing security code
    pub const REQUIRE_SEC_OBJECT: u32 = 0x8000;
}

#[allow(non_snake_case)]
/// All possible flags for `MethodImplAttributes`
pub mod MethodImplAttributes {
    /// Use this mask to retrieve the code type
    pub const CODE_TYPE_MASK: u32 = 0x0003;
    /// Method implementation is CIL
    pub const IL: u32 = 0x0000;
    /// Method implementation is native
    pub const NATIVE: u32 = 0x0001;
    /// Method implementation is OPTIL
    pub const OPTIL: u32 = 0x0002;
    /// Method implementation is provided by the runtime
    pub const RUNTIME: u32 = 0x0003;
    /// Method is unmanaged, else managed
    pub const UNMANAGED: u32 = 0x0004;
    /// Method cannot be inlined
    pub const NO_INLINING: u32 = 0x0008;
    /// Method is defined; used primarily in merge scenarios
    pub const FORWARD_REF: u32 = 0x0010;
    /// Method is single-threaded through the body
    pub const SYNCHRONIZED: u32 = 0x0020;
    /// Method will not be optimized by the JIT
    pub const NO_OPTIMIZATION: u32 = 0x0040;
    /// Reserved: shall be zero in conforming implementations
    pub const PRESERVE_SIG: u32 = 0x0080;
    /// Reserved: shall be zero in conforming implementations
    pub const INTERNAL_CALL: u32 = 0x1000;
}

#[derive(Clone, Debug)]
/// The `MethodDef` table defines the methods of the current module.
/// `TableId` = 0x06
pub struct MethodDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// RVA of the method body, 0 for abstract and extern methods
    pub rva: u32,
    /// a 2-byte bitmask of type `MethodImplAttributes`
    pub impl_flags: u16,
    /// a 2-byte bitmask of type `MethodAttributes`
    pub flags: u16,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap holding the method signature
    pub signature: u32,
    /// an index into the Param table; first of a contiguous run owned by this method
    pub param_list: u32,
}

impl<'a> RowDefinition<'a> for MethodDefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */        4 +
            /* impl_flags */ 2 +
            /* flags */      2 +
            /* name */       sizes.str_bytes() +
            /* signature */  sizes.blob_bytes() +
            /* param_list */ sizes.table_index_bytes(TableId::Param)
        )
    }

    fn read_row(
        data: &'a [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            token: TableId::MethodDef.token(rid),
            offset: *offset,
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
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
            0x50, 0x20, 0x00, 0x00, // rva
            0x00, 0x00, // impl_flags
            0x96, 0x00, // flags
            0x42, 0x00, // name
            0x10, 0x00, // signature
            0x01, 0x00, // param_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MethodDef, 1), (TableId::Param, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0600_0001);
        assert_eq!(row.rva, 0x2050);
        assert_eq!(row.impl_flags, 0);
        assert_eq!(row.flags, 0x96);
        assert_eq!(row.name, 0x42);
        assert_eq!(row.signature, 0x10);
        assert_eq!(row.param_list, 1);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x00, 0x10, 0x00, 0x00, // rva
            0x01, 0x00, // impl_flags
            0x06, 0x00, // flags
            0x01, 0x00, 0x00, 0x01, // name
            0x02, 0x00, 0x00, 0x01, // signature
            0x03, 0x00, 0x00, 0x01, // param_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[
                (TableId::MethodDef, u32::from(u16::MAX) + 2),
                (TableId::Param, u32::from(u16::MAX) + 2),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rva, 0x1000);
        assert_eq!(row.impl_flags, 1);
        assert_eq!(row.name, 0x0100_0001);
        assert_eq!(row.signature, 0x0100_0002);
        assert_eq!(row.param_list, 0x0100_0003);
    }
}
