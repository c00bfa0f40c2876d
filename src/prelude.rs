//! Convenient re-exports of the most commonly used types.
//!
//! ```rust,no_run
//! use dotmeta::prelude::*;
//!
//! let assembly = AssemblyDefinition::from_file(std::path::Path::new("App.dll"))?;
//! println!("{}", assembly.name()?);
//! # Ok::<(), dotmeta::Error>(())
//! ```

pub use crate::{
    metadata::{
        member::{
            AssemblyDefinition, AssemblyRc, AssemblyReference, AssemblyRefRc, GenericParamRc,
            GenericParameter, GenericParameterOwner, Member, MemberList, MethodDefinition,
            MethodRc, ModuleDefinition, ModuleRc, TypeDefOrRef, TypeDefinition, TypeRc, Version,
        },
        resolver::{AssemblyDescriptor, AssemblyResolver, DirectoryResolver, ResolverCache},
        signatures::{MethodSig, SignatureParser, TypeSig},
        tables::TableId,
        token::Token,
        view::MetadataView,
    },
    Error, ImageFile, Parser, Result,
};
