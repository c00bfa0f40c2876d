use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        identity::PublicKeyIdentity,
        member::{AssemblyRefRc, Backing, LazyCell, ModuleDefinition, ModuleRc, Version},
        resolver::AssemblyDescriptor,
        tables::{AssemblyFlags, AssemblyHashAlgorithm, AssemblyRefRaw, TableId},
        token::Token,
        view::MetadataView,
    },
    Error, Result,
};

/// A reference to an external assembly.
///
/// Carries the full descriptor of the target (name, version, culture, public
/// key or token) and so acts as the input to assembly resolution.
pub struct AssemblyReference {
    token: Token,
    backing: Backing<AssemblyRefRaw>,
    owner: LazyCell<Option<Weak<ModuleDefinition>>>,
    name: LazyCell<String>,
    version: LazyCell<Version>,
    culture: LazyCell<Option<String>>,
    attributes: LazyCell<u32>,
    identity: LazyCell<Option<PublicKeyIdentity>>,
    hash_value: LazyCell<Option<Vec<u8>>>,
}

impl AssemblyReference {
    /// Create a new, unattached assembly reference.
    ///
    /// ## Arguments
    /// * 'name'    - The referenced assembly's name
    /// * 'version' - The referenced assembly's version
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> AssemblyRefRc {
        Arc::new(AssemblyReference {
            token: TableId::AssemblyRef.token(0),
            backing: Backing::User,
            owner: LazyCell::with_value(None),
            name: LazyCell::with_value(name.into()),
            version: LazyCell::with_value(version),
            culture: LazyCell::with_value(None),
            attributes: LazyCell::with_value(0),
            identity: LazyCell::with_value(None),
            hash_value: LazyCell::with_value(None),
        })
    }

    pub(crate) fn from_row(
        view: Arc<MetadataView>,
        row: AssemblyRefRaw,
        home: Weak<ModuleDefinition>,
    ) -> AssemblyRefRc {
        Arc::new(AssemblyReference {
            token: row.token,
            backing: Backing::Loaded { view, row },
            owner: LazyCell::with_value(Some(home)),
            name: LazyCell::new(),
            version: LazyCell::new(),
            culture: LazyCell::new(),
            attributes: LazyCell::new(),
            identity: LazyCell::new(),
            hash_value: LazyCell::new(),
        })
    }

    /// The metadata token of this reference.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The referenced assembly's name.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn name(&self) -> Result<String> {
        self.name.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.string_at(row.name)?.unwrap_or_default()),
            None => Ok(String::new()),
        })
    }

    /// Override the referenced name.
    ///
    /// ## Arguments
    /// * 'name' - The new name
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.name.set(name.into())
    }

    /// The referenced assembly's version.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn version(&self) -> Result<Version> {
        self.version.get_or_try_init(|| match self.backing.loaded() {
            Some((_, row)) => Ok(Version::new(
                row.major_version,
                row.minor_version,
                row.build_number,
                row.revision_number,
            )),
            None => Ok(Version::default()),
        })
    }

    /// Override the referenced version.
    ///
    /// ## Arguments
    /// * 'version' - The new version
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_version(&self, version: Version) -> Result<()> {
        self.version.set(version)
    }

    /// The referenced culture, or `None` for the invariant culture.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn culture(&self) -> Result<Option<String>> {
        self.culture.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => view.string_at(row.culture),
            None => Ok(None),
        })
    }

    /// Override the referenced culture.
    ///
    /// ## Arguments
    /// * 'culture' - The new culture, or `None`
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_culture(&self, culture: Option<String>) -> Result<()> {
        self.culture.set(culture)
    }

    /// The `AssemblyFlags` bitmask.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn attributes(&self) -> Result<u32> {
        self.attributes.get_or_try_init(|| match self.backing.loaded() {
            Some((_, row)) => Ok(row.flags),
            None => Ok(0),
        })
    }

    /// True if the reference carries the full public key rather than a token.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn has_public_key(&self) -> Result<bool> {
        Ok(self.attributes()? & AssemblyFlags::PUBLIC_KEY != 0)
    }

    /// The public key or token of the referenced assembly, if any.
    ///
    /// # Errors
    /// Returns an error if the backing blob entry is invalid.
    pub fn public_key_or_token(&self) -> Result<Option<PublicKeyIdentity>> {
        self.identity.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => {
                if row.public_key_or_token == 0 {
                    return Ok(None);
                }

                let blob = view.blob_at(row.public_key_or_token)?;
                let is_full_key = row.flags & AssemblyFlags::PUBLIC_KEY != 0;
                Ok(Some(PublicKeyIdentity::from_blob(&blob, is_full_key)?))
            }
            None => Ok(None),
        })
    }

    /// Override the public key or token.
    ///
    /// ## Arguments
    /// * 'identity' - The new identity, or `None`
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_public_key_or_token(&self, identity: Option<PublicKeyIdentity>) -> Result<()> {
        self.identity.set(identity)
    }

    /// The declared hash of the referenced assembly, if any.
    ///
    /// # Errors
    /// Returns an error if the backing blob entry is invalid.
    pub fn hash_value(&self) -> Result<Option<Vec<u8>>> {
        self.hash_value.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => {
                if row.hash_value == 0 {
                    Ok(None)
                } else {
                    Ok(Some(view.blob_at(row.hash_value)?))
                }
            }
            None => Ok(None),
        })
    }

    /// The module holding this reference, if it is attached to one.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning graph has been released.
    pub fn module(&self) -> Result<Option<ModuleRc>> {
        match self.owner.get()?.flatten() {
            Some(weak) => weak.upgrade().map(Some).ok_or(Error::Detached),
            None => Ok(None),
        }
    }

    /// The resolution descriptor of this reference.
    ///
    /// A full public key is collapsed to its 8-byte token (SHA-1, the
    /// convention for references) so descriptor equality matches the resolver
    /// cache's contract.
    ///
    /// # Errors
    /// Returns an error if a backing heap entry is invalid.
    pub fn descriptor(&self) -> Result<AssemblyDescriptor> {
        let public_key_token = match self.public_key_or_token()? {
            Some(identity) => Some(identity.token_with(AssemblyHashAlgorithm::SHA1)?),
            None => None,
        };

        Ok(AssemblyDescriptor {
            name: self.name()?,
            version: self.version()?,
            culture: self.culture()?,
            public_key_token,
        })
    }

    pub(crate) fn is_owned(&self) -> Result<bool> {
        Ok(self.owner.get()?.flatten().is_some())
    }

    pub(crate) fn set_owner(&self, owner: Weak<ModuleDefinition>) -> Result<()> {
        self.owner.set(Some(owner))
    }

    pub(crate) fn clear_owner(&self) -> Result<()> {
        self.owner.set(None)
    }
}
