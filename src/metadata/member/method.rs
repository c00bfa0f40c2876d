use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        member::{
            Backing, GenericParameter, LazyCell, Member, MemberList, MethodRc, ModuleRc,
            ModuleDefinition, TypeDefinition, TypeRc,
        },
        signatures::{MethodSig, SignatureParser},
        tables::{CodedIndex, CodedIndexKind, GenericParamRaw, MethodDefRaw, TableId, TypeDefRaw},
        token::Token,
        view::MetadataView,
    },
    Error, Result,
};

/// A method defined in a module.
pub struct MethodDefinition {
    token: Token,
    backing: Backing<MethodDefRaw>,
    home: Weak<ModuleDefinition>,
    name: LazyCell<String>,
    attributes: LazyCell<u16>,
    impl_attributes: LazyCell<u16>,
    signature: LazyCell<Arc<MethodSig>>,
    declaring: LazyCell<Option<Weak<TypeDefinition>>>,
    generic_parameters: LazyCell<Arc<MemberList<MethodDefinition, GenericParameter>>>,
    this: Weak<MethodDefinition>,
}

impl MethodDefinition {
    /// Create a new, unattached method.
    ///
    /// ## Arguments
    /// * 'name' - The method name
    #[must_use]
    pub fn new(name: impl Into<String>) -> MethodRc {
        let name = name.into();
        Arc::new_cyclic(|this| MethodDefinition {
            token: TableId::MethodDef.token(0),
            backing: Backing::User,
            home: Weak::new(),
            name: LazyCell::with_value(name),
            attributes: LazyCell::with_value(0),
            impl_attributes: LazyCell::with_value(0),
            signature: LazyCell::new(),
            declaring: LazyCell::with_value(None),
            generic_parameters: LazyCell::new(),
            this: this.clone(),
        })
    }

    pub(crate) fn from_row(
        view: Arc<MetadataView>,
        row: MethodDefRaw,
        home: Weak<ModuleDefinition>,
    ) -> MethodRc {
        Arc::new_cyclic(|this| MethodDefinition {
            token: row.token,
            backing: Backing::Loaded { view, row },
            home,
            name: LazyCell::new(),
            attributes: LazyCell::new(),
            impl_attributes: LazyCell::new(),
            signature: LazyCell::new(),
            declaring: LazyCell::new(),
            generic_parameters: LazyCell::new(),
            this: this.clone(),
        })
    }

    /// The metadata token of this method.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The method name.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn name(&self) -> Result<String> {
        self.name.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.string_at(row.name)?.unwrap_or_default()),
            None => Ok(String::new()),
        })
    }

    /// Override the method name.
    ///
    /// ## Arguments
    /// * 'name' - The new name
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.name.set(name.into())
    }

    /// The `MethodAttributes` bitmask.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn attributes(&self) -> Result<u16> {
        self.attributes.get_or_try_init(|| match self.backing.loaded() {
            Some((_, row)) => Ok(row.flags),
            None => Ok(0),
        })
    }

    /// Override the `MethodAttributes` bitmask.
    ///
    /// ## Arguments
    /// * 'attributes' - The new bitmask
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_attributes(&self, attributes: u16) -> Result<()> {
        self.attributes.set(attributes)
    }

    /// The `MethodImplAttributes` bitmask.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn impl_attributes(&self) -> Result<u16> {
        self.impl_attributes
            .get_or_try_init(|| match self.backing.loaded() {
                Some((_, row)) => Ok(row.impl_flags),
                None => Ok(0),
            })
    }

    /// The RVA of the method body; `None` for hand-built methods.
    #[must_use]
    pub fn rva(&self) -> Option<u32> {
        self.backing.loaded().map(|(_, row)| row.rva)
    }

    /// The parsed method signature.
    ///
    /// # Errors
    /// Reports the blob index and the offset within it when the signature
    /// fails to decode.
    pub fn signature(&self) -> Result<Arc<MethodSig>> {
        self.signature.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => {
                let blob = view.blob_at(row.signature)?;
                let sig = SignatureParser::new(&blob)
                    .parse_method_signature()
                    .map_err(|error| {
                        malformed_error!(
                            "Invalid method signature at blob index {} - {}",
                            row.signature,
                            error
                        )
                    })?;
                Ok(Arc::new(sig))
            }
            None => Ok(Arc::new(MethodSig::default())),
        })
    }

    /// Override the method signature.
    ///
    /// ## Arguments
    /// * 'signature' - The new signature
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_signature(&self, signature: Arc<MethodSig>) -> Result<()> {
        self.signature.set(signature)
    }

    /// The type declaring this method, if any.
    ///
    /// For loaded methods the owner is found by binary-searching the TypeDef
    /// method-list column for the last type whose range starts at or before
    /// this method's rid.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning graph has been released.
    pub fn declaring_type(&self) -> Result<Option<TypeRc>> {
        let declaring = self.declaring.get_or_try_init(|| {
            let Some((view, row)) = self.backing.loaded() else {
                return Ok(None);
            };

            let tables = view.tables_required()?;
            let Some(typedefs) = tables.table::<TypeDefRaw>(TableId::TypeDef) else {
                return Ok(None);
            };

            let Some(owner_rid) = typedefs.find_owner(row.rid, |ty| ty.method_list) else {
                return Ok(None);
            };

            let module = self.home.upgrade().ok_or(Error::Detached)?;
            let owner_token = TableId::TypeDef.token(owner_rid);
            match module.member_at(owner_token)? {
                Member::Type(ty) => Ok(Some(Arc::downgrade(&ty))),
                _ => Err(Error::MemberNotFound(owner_token)),
            }
        })?;

        match declaring {
            Some(weak) => weak.upgrade().map(Some).ok_or(Error::Detached),
            None => Ok(None),
        }
    }

    /// The module this method lives in, if it is attached to one.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning graph has been released.
    pub fn module(&self) -> Result<Option<ModuleRc>> {
        if self.backing.is_loaded() {
            return self.home.upgrade().map(Some).ok_or(Error::Detached);
        }

        match self.declaring_type()? {
            Some(ty) => ty.module(),
            None => Ok(None),
        }
    }

    /// The generic parameters of this method, in declaration order.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn generic_parameters(
        &self,
    ) -> Result<Arc<MemberList<MethodDefinition, GenericParameter>>> {
        self.generic_parameters.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_generic_param,
                detach_generic_param,
            ));

            if let Some((view, row)) = self.backing.loaded() {
                let tables = view.tables_required()?;
                if let Some(params) = tables.table::<GenericParamRaw>(TableId::GenericParam) {
                    let key = CodedIndex::new(TableId::MethodDef, row.rid)
                        .encode(CodedIndexKind::TypeOrMethodDef)?;
                    let column = |param: &GenericParamRaw| {
                        param
                            .owner
                            .encode(CodedIndexKind::TypeOrMethodDef)
                            .unwrap_or(0)
                    };

                    let rids = if tables.is_sorted(TableId::GenericParam) {
                        let (lo, hi) = params.find_range(key, column);
                        (lo..hi).collect::<Vec<u32>>()
                    } else {
                        params.scan_rows(key, column)
                    };

                    let module = self.home.upgrade().ok_or(Error::Detached)?;
                    for rid in rids {
                        if let Member::GenericParam(param) =
                            module.member_at(TableId::GenericParam.token(rid))?
                        {
                            list.push_initial(param)?;
                        }
                    }
                }
            }

            Ok(list)
        })
    }

    pub(crate) fn is_owned(&self) -> Result<bool> {
        match self.declaring.get()? {
            // The slot distinguishes "explicitly unowned" from "not yet
            // resolved"; only the latter consults the tables
            Some(state) => Ok(state.is_some()),
            None => Ok(self.declaring_type()?.is_some()),
        }
    }

    pub(crate) fn set_declaring(&self, owner: Weak<TypeDefinition>) -> Result<()> {
        self.declaring.set(Some(owner))
    }

    pub(crate) fn clear_declaring(&self) -> Result<()> {
        self.declaring.set(None)
    }
}

fn attach_generic_param(param: &GenericParameter, owner: &Weak<MethodDefinition>) -> Result<()> {
    if param.is_owned()? {
        return Err(Error::AlreadyOwned(param.token()));
    }
    param.set_owner_method(owner.clone())
}

fn detach_generic_param(param: &GenericParameter) -> Result<()> {
    param.clear_owner()
}
