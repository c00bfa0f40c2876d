use crate::metadata::token::Token;

#[allow(non_snake_case)]
/// The element type constants of ECMA-335 §II.23.1.16
pub mod ELEMENT_TYPE {
    /// Marks end of a list
    pub const END: u8 = 0x00;
    /// void
    pub const VOID: u8 = 0x01;
    /// bool
    pub const BOOLEAN: u8 = 0x02;
    /// char
    pub const CHAR: u8 = 0x03;
    /// signed 8-bit integer
    pub const I1: u8 = 0x04;
    /// unsigned 8-bit integer
    pub const U1: u8 = 0x05;
    /// signed 16-bit integer
    pub const I2: u8 = 0x06;
    /// unsigned 16-bit integer
    pub const U2: u8 = 0x07;
    /// signed 32-bit integer
    pub const I4: u8 = 0x08;
    /// unsigned 32-bit integer
    pub const U4: u8 = 0x09;
    /// signed 64-bit integer
    pub const I8: u8 = 0x0A;
    /// unsigned 64-bit integer
    pub const U8: u8 = 0x0B;
    /// 32-bit floating point
    pub const R4: u8 = 0x0C;
    /// 64-bit floating point
    pub const R8: u8 = 0x0D;
    /// System.String
    pub const STRING: u8 = 0x0E;
    /// Unmanaged pointer, followed by a type
    pub const PTR: u8 = 0x0F;
    /// Managed by-reference, followed by a type
    pub const BYREF: u8 = 0x10;
    /// Value type, followed by a TypeDefOrRefOrSpec encoded token
    pub const VALUETYPE: u8 = 0x11;
    /// Class, followed by a TypeDefOrRefOrSpec encoded token
    pub const CLASS: u8 = 0x12;
    /// Generic parameter of a type, followed by its index
    pub const VAR: u8 = 0x13;
    /// Multi-dimensional array with shape
    pub const ARRAY: u8 = 0x14;
    /// Generic instantiation
    pub const GENERICINST: u8 = 0x15;
    /// Typed reference
    pub const TYPEDBYREF: u8 = 0x16;
    /// Native-sized signed integer
    pub const I: u8 = 0x18;
    /// Native-sized unsigned integer
    pub const U: u8 = 0x19;
    /// Function pointer, followed by a full method signature
    pub const FNPTR: u8 = 0x1B;
    /// System.Object
    pub const OBJECT: u8 = 0x1C;
    /// Single-dimensional zero-based array
    pub const SZARRAY: u8 = 0x1D;
    /// Generic parameter of a method, followed by its index
    pub const MVAR: u8 = 0x1E;
    /// Required custom modifier, followed by a token
    pub const CMOD_REQD: u8 = 0x1F;
    /// Optional custom modifier, followed by a token
    pub const CMOD_OPT: u8 = 0x20;
    /// Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    /// Or'd with following element types
    pub const MODIFIER: u8 = 0x40;
    /// Sentinel splitting fixed and vararg parameters
    pub const SENTINEL: u8 = 0x41;
    /// Pinned local, followed by a type
    pub const PINNED: u8 = 0x45;
}

/// A parsed type from a signature blob.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeSig {
    /// Not defined
    #[default]
    Unknown,
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8-bit integer
    I1,
    /// unsigned 8-bit integer
    U1,
    /// signed 16-bit integer
    I2,
    /// unsigned 16-bit integer
    U2,
    /// signed 32-bit integer
    I4,
    /// unsigned 32-bit integer
    U4,
    /// signed 64-bit integer
    I8,
    /// unsigned 64-bit integer
    U8,
    /// 32-bit floating point
    R4,
    /// 64-bit floating point
    R8,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Native-sized signed integer
    IntPtr,
    /// Native-sized unsigned integer
    UIntPtr,
    /// Typed reference
    TypedByRef,
    /// Unmanaged pointer, with optional custom modifiers
    Ptr(Box<PointerSig>),
    /// Managed by-reference
    ByRef(Box<TypeSig>),
    /// Value type named by a TypeDef, TypeRef or TypeSpec token
    ValueType(Token),
    /// Class named by a TypeDef, TypeRef or TypeSpec token
    Class(Token),
    /// Generic parameter of the enclosing type, by index
    TypeGenericParam(u32),
    /// Generic parameter of the enclosing method, by index
    MethodGenericParam(u32),
    /// Multi-dimensional array with explicit shape
    Array(Box<ArraySig>),
    /// Single-dimensional zero-based array, with optional custom modifiers
    SzArray(Box<SzArraySig>),
    /// Generic instantiation: the open type plus its type arguments
    GenericInst(Box<TypeSig>, Vec<TypeSig>),
    /// Function pointer carrying a full method signature
    FnPtr(Box<MethodSig>),
    /// Required custom modifiers applying to the following type
    ModifierRequired(Vec<Token>),
    /// Optional custom modifiers applying to the following type
    ModifierOptional(Vec<Token>),
    /// Pinned local variable
    Pinned(Box<TypeSig>),
    /// Sentinel splitting fixed and vararg parameters
    Sentinel,
    /// Implemented within the CLI
    Internal,
}

/// An unmanaged pointer with its custom modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerSig {
    /// Custom modifier tokens preceding the pointee
    pub modifiers: Vec<Token>,
    /// The pointee type
    pub base: TypeSig,
}

/// One dimension of a multi-dimensional array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayDimension {
    /// Declared size of the dimension, if present
    pub size: Option<u32>,
    /// Declared lower bound of the dimension, if present
    pub lower_bound: Option<u32>,
}

/// A multi-dimensional array with its shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySig {
    /// The element type
    pub base: TypeSig,
    /// Number of dimensions
    pub rank: u32,
    /// Declared dimensions; may be fewer than `rank`
    pub dimensions: Vec<ArrayDimension>,
}

/// A single-dimensional zero-based array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SzArraySig {
    /// Custom modifier tokens preceding the element type
    pub modifiers: Vec<Token>,
    /// The element type
    pub base: TypeSig,
}

/// A parameter or return type with its custom modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSig {
    /// Custom modifier tokens
    pub modifiers: Vec<Token>,
    /// Passed by reference
    pub by_ref: bool,
    /// The parameter type
    pub base: TypeSig,
}

/// The native or managed calling convention of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallKind {
    /// Managed default
    #[default]
    Default,
    /// Native C
    C,
    /// Native stdcall
    StdCall,
    /// Native thiscall
    ThisCall,
    /// Native fastcall
    FastCall,
    /// Managed vararg
    VarArg,
}

/// A method signature (II.23.2.1): calling convention, generic arity, return
/// type and parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodSig {
    /// The `this` pointer is passed implicitly
    pub has_this: bool,
    /// The `this` pointer is the explicit first parameter
    pub explicit_this: bool,
    /// The calling convention
    pub call_kind: CallKind,
    /// Number of generic parameters; 0 for non-generic methods
    pub generic_param_count: u32,
    /// The return type
    pub return_type: ParamSig,
    /// The fixed parameters
    pub params: Vec<ParamSig>,
    /// The vararg parameters following the sentinel
    pub varargs: Vec<ParamSig>,
}

/// A field signature (II.23.2.4).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSig {
    /// Custom modifier tokens
    pub modifiers: Vec<Token>,
    /// The field type
    pub base: TypeSig,
}

/// A property signature (II.23.2.5).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertySig {
    /// Accessors take a `this` pointer
    pub has_this: bool,
    /// Custom modifier tokens
    pub modifiers: Vec<Token>,
    /// The property type
    pub base: TypeSig,
    /// The indexer parameters
    pub params: Vec<ParamSig>,
}

/// A single local variable of a method body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalVarSig {
    /// Custom modifier tokens
    pub modifiers: Vec<Token>,
    /// Passed by reference
    pub by_ref: bool,
    /// Pinned in place for the duration of the method
    pub is_pinned: bool,
    /// The variable type
    pub base: TypeSig,
}

/// A local variable signature (II.23.2.6).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalVariablesSig {
    /// The local variables, in slot order
    pub locals: Vec<LocalVarSig>,
}
