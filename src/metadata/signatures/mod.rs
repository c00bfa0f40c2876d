//! Signature blob decoding.
//!
//! Types, methods, fields, properties and local variables are described in
//! `#Blob` entries using the compact encoding of ECMA-335 §II.23.2. This
//! module models those signatures ([`TypeSig`], [`MethodSig`], [`FieldSig`],
//! [`PropertySig`], [`LocalVariablesSig`]) and decodes them with
//! [`SignatureParser`].
//!
//! # Example
//!
//! ```rust,no_run
//! use dotmeta::metadata::signatures::{SignatureParser, TypeSig};
//!
//! // instance void (string)
//! let blob = &[0x20, 0x01, 0x01, 0x0E];
//! let sig = SignatureParser::new(blob).parse_method_signature()?;
//! assert!(sig.has_this);
//! assert_eq!(sig.params[0].base, TypeSig::String);
//! # Ok::<(), dotmeta::Error>(())
//! ```

mod parser;
mod types;

pub use parser::SignatureParser;
pub use types::{
    ArrayDimension, ArraySig, CallKind, FieldSig, LocalVarSig, LocalVariablesSig, MethodSig,
    ParamSig, PointerSig, PropertySig, SzArraySig, TypeSig, ELEMENT_TYPE,
};
