use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        member::{
            Backing, GenericParamRc, LazyCell, Member, MethodDefinition, MethodRc,
            ModuleDefinition, TypeDefinition, TypeRc,
        },
        tables::{genericparam::GenericParamAttributes, GenericParamRaw, TableId},
        token::Token,
        view::MetadataView,
    },
    Error, Result,
};

/// The member owning a generic parameter.
#[derive(Clone)]
pub enum GenericParameterOwner {
    /// Owned by a generic type
    Type(TypeRc),
    /// Owned by a generic method
    Method(MethodRc),
}

/// Weak mirror of [`GenericParameterOwner`], stored on the parameter.
#[derive(Clone)]
enum OwnerRef {
    None,
    Type(Weak<TypeDefinition>),
    Method(Weak<MethodDefinition>),
}

/// A generic parameter of a type or method.
pub struct GenericParameter {
    token: Token,
    backing: Backing<GenericParamRaw>,
    home: Weak<ModuleDefinition>,
    number: u16,
    name: LazyCell<String>,
    attributes: LazyCell<u16>,
    owner: LazyCell<OwnerRef>,
}

impl GenericParameter {
    /// Create a new, unattached generic parameter.
    ///
    /// ## Arguments
    /// * 'name'   - The parameter name
    /// * 'number' - Zero-based position among the owner's parameters
    #[must_use]
    pub fn new(name: impl Into<String>, number: u16) -> GenericParamRc {
        Arc::new(GenericParameter {
            token: TableId::GenericParam.token(0),
            backing: Backing::User,
            home: Weak::new(),
            number,
            name: LazyCell::with_value(name.into()),
            attributes: LazyCell::with_value(0),
            owner: LazyCell::with_value(OwnerRef::None),
        })
    }

    pub(crate) fn from_row(
        view: Arc<MetadataView>,
        row: GenericParamRaw,
        home: Weak<ModuleDefinition>,
    ) -> GenericParamRc {
        Arc::new(GenericParameter {
            token: row.token,
            number: row.number,
            backing: Backing::Loaded { view, row },
            home,
            name: LazyCell::new(),
            attributes: LazyCell::new(),
            owner: LazyCell::new(),
        })
    }

    /// The metadata token of this parameter.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Zero-based position among the owner's generic parameters.
    #[must_use]
    pub fn number(&self) -> u16 {
        self.number
    }

    /// The parameter name.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn name(&self) -> Result<String> {
        self.name.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.string_at(row.name)?.unwrap_or_default()),
            None => Ok(String::new()),
        })
    }

    /// Override the parameter name.
    ///
    /// ## Arguments
    /// * 'name' - The new name
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.name.set(name.into())
    }

    /// The `GenericParamAttributes` bitmask.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn attributes(&self) -> Result<u16> {
        self.attributes.get_or_try_init(|| match self.backing.loaded() {
            Some((_, row)) => Ok(row.flags),
            None => Ok(0),
        })
    }

    /// Override the `GenericParamAttributes` bitmask.
    ///
    /// ## Arguments
    /// * 'attributes' - The new bitmask
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_attributes(&self, attributes: u16) -> Result<()> {
        self.attributes.set(attributes)
    }

    /// True if the parameter is declared covariant.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_covariant(&self) -> Result<bool> {
        Ok(u32::from(self.attributes()?) & GenericParamAttributes::VARIANCE_MASK
            == GenericParamAttributes::COVARIANT)
    }

    /// True if the parameter is declared contravariant.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_contravariant(&self) -> Result<bool> {
        Ok(u32::from(self.attributes()?) & GenericParamAttributes::VARIANCE_MASK
            == GenericParamAttributes::CONTRAVARIANT)
    }

    /// The type or method owning this parameter, if any.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning graph has been released, or
    /// an error if the owner coded index is corrupt.
    pub fn owner(&self) -> Result<Option<GenericParameterOwner>> {
        match self.owner_ref()? {
            OwnerRef::None => Ok(None),
            OwnerRef::Type(weak) => weak
                .upgrade()
                .map(|ty| Some(GenericParameterOwner::Type(ty)))
                .ok_or(Error::Detached),
            OwnerRef::Method(weak) => weak
                .upgrade()
                .map(|method| Some(GenericParameterOwner::Method(method)))
                .ok_or(Error::Detached),
        }
    }

    fn owner_ref(&self) -> Result<OwnerRef> {
        self.owner.get_or_try_init(|| {
            let Some((_, row)) = self.backing.loaded() else {
                return Ok(OwnerRef::None);
            };

            if row.owner.is_null() {
                return Ok(OwnerRef::None);
            }

            let module = self.home.upgrade().ok_or(Error::Detached)?;
            match module.member_at(row.owner.token)? {
                Member::Type(ty) => Ok(OwnerRef::Type(Arc::downgrade(&ty))),
                Member::Method(method) => Ok(OwnerRef::Method(Arc::downgrade(&method))),
                _ => Err(Error::MemberNotFound(row.owner.token)),
            }
        })
    }

    pub(crate) fn is_owned(&self) -> Result<bool> {
        Ok(!matches!(self.owner_ref()?, OwnerRef::None))
    }

    pub(crate) fn set_owner_type(&self, owner: Weak<TypeDefinition>) -> Result<()> {
        self.owner.set(OwnerRef::Type(owner))
    }

    pub(crate) fn set_owner_method(&self, owner: Weak<MethodDefinition>) -> Result<()> {
        self.owner.set(OwnerRef::Method(owner))
    }

    pub(crate) fn clear_owner(&self) -> Result<()> {
        self.owner.set(OwnerRef::None)
    }
}
