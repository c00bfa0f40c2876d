//! Assembly resolution.
//!
//! An [`AssemblyDescriptor`] names an assembly (name, version, culture,
//! public-key token); an [`AssemblyResolver`] maps descriptors to loaded
//! [`AssemblyDefinition`]s through a single-flight cache. The bundled
//! [`DirectoryResolver`] probes a configured list of directories in order,
//! trying `dir/culture/Name.dll`, `.exe`, then the `Name/Name.dll` folder
//! layout, and loads the first hit.
//!
//! Resolution is deterministic and idempotent: a descriptor resolves to the
//! identical definition on every call, and "not found" is `None`, never an
//! error.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::metadata::member::{AssemblyDefinition, AssemblyRc, Version};

/// An unresolved reference to an assembly.
///
/// Equality follows resolution semantics: the name is case-sensitive, the
/// version is the full 4-tuple, the culture is case-insensitive with `None`
/// equal to the empty string, and public-key tokens compare byte for byte.
#[derive(Debug, Clone)]
pub struct AssemblyDescriptor {
    /// The assembly name, without extension
    pub name: String,
    /// The full four-part version
    pub version: Version,
    /// The culture, `None` for the invariant culture
    pub culture: Option<String>,
    /// The 8-byte public-key token, if any
    pub public_key_token: Option<u64>,
}

impl AssemblyDescriptor {
    /// Create a descriptor from name and version, with invariant culture and
    /// no public-key token.
    ///
    /// ## Arguments
    /// * 'name'    - The assembly name
    /// * 'version' - The assembly version
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        AssemblyDescriptor {
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    fn culture_key(&self) -> String {
        self.culture
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

impl PartialEq for AssemblyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.culture_key() == other.culture_key()
            && self.public_key_token == other.public_key_token
    }
}

impl Eq for AssemblyDescriptor {}

impl Hash for AssemblyDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.culture_key().hash(state);
        self.public_key_token.hash(state);
    }
}

/// The descriptor-to-definition cache shared by resolver implementations.
///
/// The cache strongly owns every resolved assembly. Concurrent resolution of
/// the same descriptor is single-flight: the entry lock guarantees at most
/// one definition is ever published per key.
#[derive(Default)]
pub struct ResolverCache {
    entries: DashMap<AssemblyDescriptor, AssemblyRc>,
}

impl ResolverCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        ResolverCache {
            entries: DashMap::new(),
        }
    }

    /// The cached definition for a descriptor, if any.
    ///
    /// ## Arguments
    /// * 'descriptor' - The descriptor to look up
    #[must_use]
    pub fn get(&self, descriptor: &AssemblyDescriptor) -> Option<AssemblyRc> {
        self.entries.get(descriptor).map(|hit| hit.value().clone())
    }

    /// Look up a descriptor, running `resolve` on a miss and caching its
    /// result.
    ///
    /// ## Arguments
    /// * 'descriptor' - The descriptor to resolve
    /// * 'resolve'    - Fallback producing the definition; `None` is not cached
    pub fn get_or_resolve<F>(
        &self,
        descriptor: &AssemblyDescriptor,
        resolve: F,
    ) -> Option<AssemblyRc>
    where
        F: FnOnce() -> Option<AssemblyRc>,
    {
        if let Some(hit) = self.entries.get(descriptor) {
            return Some(hit.value().clone());
        }

        // The vacant entry holds its shard lock while the fallback runs, so
        // racing callers for the same key serialize here
        match self.entries.entry(descriptor.clone()) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(slot) => {
                let resolved = resolve()?;
                slot.insert(resolved.clone());
                Some(resolved)
            }
        }
    }

    /// Drop the cached definition for a descriptor.
    ///
    /// ## Arguments
    /// * 'descriptor' - The descriptor to evict
    pub fn remove(&self, descriptor: &AssemblyDescriptor) {
        self.entries.remove(descriptor);
    }

    /// Drop every cached definition.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps assembly descriptors to loaded definitions.
///
/// Implementations provide [`AssemblyResolver::resolve_impl`]; the provided
/// [`AssemblyResolver::resolve`] wraps it with the shared cache contract:
/// cache hit, else resolve, else `None` - and a successful resolution is
/// cached under the descriptor it was asked for.
pub trait AssemblyResolver: Send + Sync {
    /// The cache backing this resolver.
    fn cache(&self) -> &ResolverCache;

    /// Locate and load the assembly for a descriptor, ignoring the cache.
    ///
    /// ## Arguments
    /// * 'descriptor' - The descriptor to resolve
    fn resolve_impl(&self, descriptor: &AssemblyDescriptor) -> Option<AssemblyRc>;

    /// Resolve a descriptor through the cache.
    ///
    /// ## Arguments
    /// * 'descriptor' - The descriptor to resolve
    fn resolve(&self, descriptor: &AssemblyDescriptor) -> Option<AssemblyRc> {
        self.cache()
            .get_or_resolve(descriptor, || self.resolve_impl(descriptor))
    }
}

/// Resolves assemblies by probing a list of search directories in order.
pub struct DirectoryResolver {
    cache: ResolverCache,
    search_directories: RwLock<Vec<PathBuf>>,
}

impl DirectoryResolver {
    /// Create a resolver with no search directories.
    #[must_use]
    pub fn new() -> Self {
        DirectoryResolver {
            cache: ResolverCache::new(),
            search_directories: RwLock::new(Vec::new()),
        }
    }

    /// Create a resolver probing the given directories, in order.
    ///
    /// ## Arguments
    /// * 'directories' - The search directories
    #[must_use]
    pub fn with_directories<I>(directories: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        DirectoryResolver {
            cache: ResolverCache::new(),
            search_directories: RwLock::new(directories.into_iter().collect()),
        }
    }

    /// Append a directory to the probing list.
    ///
    /// ## Arguments
    /// * 'directory' - The directory to append
    pub fn add_search_directory(&self, directory: impl Into<PathBuf>) {
        if let Ok(mut directories) = self.search_directories.write() {
            directories.push(directory.into());
        }
    }

    /// A snapshot of the probing list, in probing order.
    #[must_use]
    pub fn search_directories(&self) -> Vec<PathBuf> {
        self.search_directories
            .read()
            .map(|directories| directories.clone())
            .unwrap_or_default()
    }

    /// Probe the search directories for a descriptor's file.
    ///
    /// Within each directory `D` the candidates are, in order:
    /// `D/culture/Name.dll`, `D/culture/Name.exe`,
    /// `D/culture/Name/Name.dll`, `D/culture/Name/Name.exe` (the culture
    /// segment is dropped when the culture is empty). The first existing file
    /// wins; `None` means every candidate was missing.
    ///
    /// ## Arguments
    /// * 'descriptor' - The descriptor to probe for
    #[must_use]
    pub fn probe_search_directories(&self, descriptor: &AssemblyDescriptor) -> Option<PathBuf> {
        for directory in self.search_directories() {
            if let Some(path) = Self::probe_directory(&directory, descriptor) {
                return Some(path);
            }
        }

        None
    }

    fn probe_directory(directory: &Path, descriptor: &AssemblyDescriptor) -> Option<PathBuf> {
        let base = match descriptor.culture.as_deref() {
            Some(culture) if !culture.is_empty() => directory.join(culture),
            _ => directory.to_path_buf(),
        };

        for extension in [".dll", ".exe"] {
            let candidate = base.join(format!("{}{}", descriptor.name, extension));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let folder = base.join(&descriptor.name);
        for extension in [".dll", ".exe"] {
            let candidate = folder.join(format!("{}{}", descriptor.name, extension));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        None
    }
}

impl Default for DirectoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AssemblyResolver for DirectoryResolver {
    fn cache(&self) -> &ResolverCache {
        &self.cache
    }

    fn resolve_impl(&self, descriptor: &AssemblyDescriptor) -> Option<AssemblyRc> {
        let path = self.probe_search_directories(descriptor)?;
        AssemblyDefinition::from_file(&path).ok()
    }
}
