//! The lazily-materialized member object model.
//!
//! Members are the typed nodes of an assembly graph: [`AssemblyDefinition`],
//! [`ModuleDefinition`], [`TypeDefinition`], [`MethodDefinition`],
//! [`GenericParameter`] and [`AssemblyReference`]. Every member carries its
//! metadata [`Token`] as identity. Members come in two flavors: constructed
//! by user code, or loaded from an image - in which case the member holds a
//! copy of its raw table row plus a shared [`crate::metadata::view::MetadataView`]
//! and materializes names, signatures, child collections and owner links on
//! first access.
//!
//! Parent to child links are strong ([`MemberList`] holds `Arc`s); child to
//! parent links are weak and do not keep the graph alive.

mod assembly;
mod assemblyref;
mod collection;
mod genericparam;
mod lazy;
mod method;
mod module;
mod typedef;

pub use assembly::AssemblyDefinition;
pub use assemblyref::AssemblyReference;
pub use collection::{AttachFn, DetachFn, MemberList};
pub use genericparam::{GenericParameter, GenericParameterOwner};
pub use lazy::LazyCell;
pub use method::MethodDefinition;
pub use module::ModuleDefinition;
pub use typedef::{TypeDefOrRef, TypeDefinition};

use std::fmt;
use std::sync::Arc;

use crate::metadata::{token::Token, view::MetadataView};

/// Shared reference to an [`AssemblyDefinition`].
pub type AssemblyRc = Arc<AssemblyDefinition>;
/// Shared reference to a [`ModuleDefinition`].
pub type ModuleRc = Arc<ModuleDefinition>;
/// Shared reference to a [`TypeDefinition`].
pub type TypeRc = Arc<TypeDefinition>;
/// Shared reference to a [`MethodDefinition`].
pub type MethodRc = Arc<MethodDefinition>;
/// Shared reference to a [`GenericParameter`].
pub type GenericParamRc = Arc<GenericParameter>;
/// Shared reference to an [`AssemblyReference`].
pub type AssemblyRefRc = Arc<AssemblyReference>;

/// A four-part assembly or module version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl Version {
    /// Create a version from its four parts.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Version {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl From<(u16, u16, u16, u16)> for Version {
    fn from(parts: (u16, u16, u16, u16)) -> Self {
        Version::new(parts.0, parts.1, parts.2, parts.3)
    }
}

/// Any token-addressable member, as returned by
/// [`ModuleDefinition::lookup_member`].
#[derive(Clone)]
pub enum Member {
    /// An assembly manifest
    Assembly(AssemblyRc),
    /// A module
    Module(ModuleRc),
    /// A type definition
    Type(TypeRc),
    /// A method definition
    Method(MethodRc),
    /// A generic parameter
    GenericParam(GenericParamRc),
    /// An assembly reference
    AssemblyRef(AssemblyRefRc),
}

impl Member {
    /// The metadata token identifying this member.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            Member::Assembly(member) => member.token(),
            Member::Module(member) => member.token(),
            Member::Type(member) => member.token(),
            Member::Method(member) => member.token(),
            Member::GenericParam(member) => member.token(),
            Member::AssemblyRef(member) => member.token(),
        }
    }
}

/// How a member sources its raw fields.
pub(crate) enum Backing<R> {
    /// Built by user code; raw fields take their defaults
    User,
    /// Loaded from an image; raw fields come from the captured row
    Loaded {
        /// The shared metadata view
        view: Arc<MetadataView>,
        /// The row captured at construction
        row: R,
    },
}

impl<R> Backing<R> {
    pub(crate) fn is_loaded(&self) -> bool {
        matches!(self, Backing::Loaded { .. })
    }

    pub(crate) fn loaded(&self) -> Option<(&Arc<MetadataView>, &R)> {
        match self {
            Backing::Loaded { view, row } => Some((view, row)),
            Backing::User => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_formatting() {
        assert_eq!(Version::new(1, 0, 0, 0).to_string(), "1.0.0.0");
        assert_eq!(Version::new(4, 8, 12, 9000).to_string(), "4.8.12.9000");
    }

    #[test]
    fn version_ordering() {
        assert!(Version::new(1, 2, 3, 4) < Version::new(1, 3, 0, 0));
        assert!(Version::new(2, 0, 0, 0) > Version::new(1, 99, 99, 99));
    }

    #[test]
    fn version_from_tuple() {
        let version: Version = (1, 0, 0, 0).into();
        assert_eq!(version, Version::new(1, 0, 0, 0));
    }
}
