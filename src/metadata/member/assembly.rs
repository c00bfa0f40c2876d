use std::path::Path;
use std::sync::{Arc, OnceLock, Weak};

use crate::{
    metadata::{
        identity::PublicKeyIdentity,
        member::{AssemblyRc, Backing, LazyCell, MemberList, ModuleDefinition, ModuleRc, Version},
        resolver::AssemblyDescriptor,
        tables::{AssemblyHashAlgorithm, AssemblyRaw, TableId},
        token::Token,
        view::MetadataView,
    },
    Error, Result,
};

/// An assembly: a named, versioned unit of deployment owning one or more
/// modules.
///
/// Loading an image yields the assembly manifest (row 1 of the Assembly
/// table) with its manifest module already constructed and linked.
pub struct AssemblyDefinition {
    token: Token,
    backing: Backing<AssemblyRaw>,
    name: LazyCell<String>,
    version: LazyCell<Version>,
    culture: LazyCell<Option<String>>,
    public_key: LazyCell<Option<Vec<u8>>>,
    hash_algorithm: LazyCell<u32>,
    attributes: LazyCell<u32>,
    manifest: OnceLock<ModuleRc>,
    modules: LazyCell<Arc<MemberList<AssemblyDefinition, ModuleDefinition>>>,
    this: Weak<AssemblyDefinition>,
}

impl AssemblyDefinition {
    /// Create a new, empty assembly.
    ///
    /// ## Arguments
    /// * 'name'    - The assembly name
    /// * 'version' - The assembly version
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> AssemblyRc {
        let name = name.into();
        Arc::new_cyclic(|this| AssemblyDefinition {
            token: TableId::Assembly.token(0),
            backing: Backing::User,
            name: LazyCell::with_value(name),
            version: LazyCell::with_value(version),
            culture: LazyCell::with_value(None),
            public_key: LazyCell::with_value(None),
            hash_algorithm: LazyCell::with_value(AssemblyHashAlgorithm::SHA1),
            attributes: LazyCell::with_value(0),
            manifest: OnceLock::new(),
            modules: LazyCell::new(),
            this: this.clone(),
        })
    }

    /// Load the assembly manifest of a PE image on disk.
    ///
    /// ## Arguments
    /// * 'path' - Path to the image
    ///
    /// # Errors
    /// Returns an error if the image is malformed or carries no assembly
    /// manifest.
    pub fn from_file(path: &Path) -> Result<AssemblyRc> {
        Self::from_view(MetadataView::from_file(path)?)
    }

    /// Load the assembly manifest of PE bytes held in memory.
    ///
    /// ## Arguments
    /// * 'data' - The bytes of the image
    ///
    /// # Errors
    /// Returns an error if the image is malformed or carries no assembly
    /// manifest.
    pub fn from_bytes(data: Vec<u8>) -> Result<AssemblyRc> {
        Self::from_view(MetadataView::from_bytes(data)?)
    }

    /// Construct the assembly of an already-parsed metadata view.
    ///
    /// The manifest module is built first; the assembly then wraps it and the
    /// two are linked both ways.
    ///
    /// ## Arguments
    /// * 'view' - The shared metadata view
    ///
    /// # Errors
    /// Returns an error if the Assembly table is absent or empty (as for
    /// netmodules, which have a module but no manifest).
    pub fn from_view(view: Arc<MetadataView>) -> Result<AssemblyRc> {
        let module = ModuleDefinition::from_view(view.clone())?;

        let row = {
            let tables = view.tables_required()?;
            tables
                .table::<AssemblyRaw>(TableId::Assembly)
                .and_then(|table| table.get(1))
                .ok_or_else(|| malformed_error!("Image carries no Assembly manifest"))?
        };

        let assembly = Arc::new_cyclic(|this| AssemblyDefinition {
            token: row.token,
            backing: Backing::Loaded { view, row },
            name: LazyCell::new(),
            version: LazyCell::new(),
            culture: LazyCell::new(),
            public_key: LazyCell::new(),
            hash_algorithm: LazyCell::new(),
            attributes: LazyCell::new(),
            manifest: OnceLock::new(),
            modules: LazyCell::new(),
            this: this.clone(),
        });

        let _ = assembly.manifest.set(module.clone());
        module.set_assembly(&assembly)?;

        Ok(assembly)
    }

    /// The metadata token of this assembly.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The assembly name.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn name(&self) -> Result<String> {
        self.name.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.string_at(row.name)?.unwrap_or_default()),
            None => Ok(String::new()),
        })
    }

    /// Override the assembly name.
    ///
    /// ## Arguments
    /// * 'name' - The new name
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.name.set(name.into())
    }

    /// The assembly version.
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

    /// Override the assembly version.
    ///
    /// ## Arguments
    /// * 'version' - The new version
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_version(&self, version: Version) -> Result<()> {
        self.version.set(version)
    }

    /// The culture, or `None` for the invariant culture.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn culture(&self) -> Result<Option<String>> {
        self.culture.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => view.string_at(row.culture),
            None => Ok(None),
        })
    }

    /// Override the culture.
    ///
    /// ## Arguments
    /// * 'culture' - The new culture, or `None`
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_culture(&self, culture: Option<String>) -> Result<()> {
        self.culture.set(culture)
    }

    /// The full public key, if the assembly declares one.
    ///
    /// # Errors
    /// Returns an error if the backing blob entry is invalid.
    pub fn public_key(&self) -> Result<Option<Vec<u8>>> {
        self.public_key.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => {
                if row.public_key == 0 {
                    Ok(None)
                } else {
                    Ok(Some(view.blob_at(row.public_key)?))
                }
            }
            None => Ok(None),
        })
    }

    /// The declared `AssemblyHashAlgorithm`.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn hash_algorithm(&self) -> Result<u32> {
        self.hash_algorithm
            .get_or_try_init(|| match self.backing.loaded() {
                Some((_, row)) => Ok(row.hash_alg_id),
                None => Ok(AssemblyHashAlgorithm::SHA1),
            })
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

    /// The module carrying this assembly's manifest.
    ///
    /// For loaded assemblies this is the module of the same image; for
    /// hand-built ones, the first module added to [`Self::modules`].
    ///
    /// # Errors
    /// Returns an error if the assembly has no modules.
    pub fn manifest_module(&self) -> Result<ModuleRc> {
        if let Some(module) = self.manifest.get() {
            return Ok(module.clone());
        }

        self.modules()?
            .get(0)?
            .ok_or_else(|| malformed_error!("Assembly has no modules"))
    }

    /// The modules of this assembly, manifest module first.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn modules(
        &self,
    ) -> Result<Arc<MemberList<AssemblyDefinition, ModuleDefinition>>> {
        self.modules.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_module,
                detach_module,
            ));

            if let Some(manifest) = self.manifest.get() {
                list.push_initial(manifest.clone())?;
            }

            Ok(list)
        })
    }

    /// The resolution descriptor of this assembly.
    ///
    /// A declared public key is collapsed to its token under the assembly's
    /// hash algorithm.
    ///
    /// # Errors
    /// Returns an error if a backing heap entry is invalid or the hash
    /// algorithm is unsupported.
    pub fn descriptor(&self) -> Result<AssemblyDescriptor> {
        let public_key_token = match self.public_key()? {
            Some(key) => Some(
                PublicKeyIdentity::Key(key).token_with(self.hash_algorithm()?)?,
            ),
            None => None,
        };

        Ok(AssemblyDescriptor {
            name: self.name()?,
            version: self.version()?,
            culture: self.culture()?,
            public_key_token,
        })
    }
}

fn attach_module(module: &ModuleDefinition, owner: &Weak<AssemblyDefinition>) -> Result<()> {
    if module.has_assembly()? {
        return Err(Error::AlreadyOwned(module.token()));
    }
    module.set_assembly_weak(owner.clone())
}

fn detach_module(module: &ModuleDefinition) -> Result<()> {
    module.clear_assembly()
}
