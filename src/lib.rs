#![deny(missing_docs)]

//! # dotmeta
//!
//! A reader and lazily-materialized object model for .NET assembly metadata,
//! built in pure Rust. `dotmeta` parses the CLI metadata directory of a
//! Portable Executable image per ECMA-335 and exposes assemblies, modules,
//! types, methods, generic parameters and assembly references as a navigable
//! object graph, together with a cached, directory-probing assembly resolver.
//!
//! # Architecture
//!
//! - **File layer** ([`crate::file`]): memory-mapped or in-memory PE access,
//!   RVA translation, and the byte-level [`Parser`] used by every decoder.
//! - **Metadata layer** ([`crate::metadata`]): the metadata root, the four
//!   heaps (`#Strings`, `#Blob`, `#GUID`, `#US`), the `#~` tables stream with
//!   all row tables, and the signature blob decoder.
//! - **Object model** ([`crate::metadata::member`]): token-identified members
//!   whose derived fields (names, signatures, child lists, owner links) are
//!   materialized on first access with thread-safe single-initialization.
//! - **Resolution** ([`crate::metadata::resolver`]): descriptor → definition
//!   mapping with a single-flight cache and a well-defined probing order.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dotmeta::AssemblyDefinition;
//!
//! let assembly = AssemblyDefinition::from_file(std::path::Path::new("App.dll"))?;
//! println!("{} v{}", assembly.name()?, assembly.version()?);
//! for ty in assembly.manifest_module()?.top_level_types()?.to_vec()? {
//!     println!("  {}", ty.full_name()?);
//! }
//! # Ok::<(), dotmeta::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All public types are [`Send`] and [`Sync`]. Lazy fields are safe under
//! concurrent first access: an initializer may race benignly, but exactly one
//! result is published and every reader observes the same value. Mutation of
//! the graph (overriding derived fields, editing owned collections) is the
//! caller's responsibility to serialize.
//!
//! # Standards
//!
//! All structures follow the ECMA-335 specification (6th edition), Partition II.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// .NET metadata parsing and the member object model.
pub mod metadata;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

/// `dotmeta` Result type, used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotmeta` Error type.
pub use error::Error;

pub use file::{parser::Parser, ImageFile};
pub use metadata::{
    member::{
        AssemblyDefinition, AssemblyReference, GenericParameter, Member, MethodDefinition,
        ModuleDefinition, TypeDefinition, Version,
    },
    resolver::{AssemblyDescriptor, AssemblyResolver, DirectoryResolver},
    token::Token,
    view::MetadataView,
};
