use crate::{
    file::parser::Parser,
    metadata::signatures::{
        ArrayDimension, ArraySig, CallKind, FieldSig, LocalVarSig, LocalVariablesSig, MethodSig,
        ParamSig, PointerSig, PropertySig, SzArraySig, TypeSig, ELEMENT_TYPE,
    },
    metadata::token::Token,
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth while decoding a type
const MAX_RECURSION_DEPTH: usize = 50;

/// Decoder for the signature blobs of ECMA-335 §II.23.2.
///
/// A parser instance decodes exactly one signature; construct a fresh one per
/// blob. Nesting depth is bounded so hostile blobs cannot overflow the stack.
///
/// # Example
///
/// ```rust,no_run
/// use dotmeta::metadata::signatures::SignatureParser;
/// let blob = &[0x20, 0x01, 0x01, 0x0E];
/// let mut parser = SignatureParser::new(blob);
/// let sig = parser.parse_method_signature()?;
/// assert_eq!(sig.params.len(), 1);
/// # Ok::<(), dotmeta::Error>(())
/// ```
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a `SignatureParser` over a signature blob
    ///
    /// ## Arguments
    /// * 'data' - The blob bytes
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    /// Parse a single type from the blob
    fn parse_type(&mut self) -> Result<TypeSig> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeSig> {
        let element_type = self.parser.read_le::<u8>()?;
        match element_type {
            ELEMENT_TYPE::VOID => Ok(TypeSig::Void),
            ELEMENT_TYPE::BOOLEAN => Ok(TypeSig::Boolean),
            ELEMENT_TYPE::CHAR => Ok(TypeSig::Char),
            ELEMENT_TYPE::I1 => Ok(TypeSig::I1),
            ELEMENT_TYPE::U1 => Ok(TypeSig::U1),
            ELEMENT_TYPE::I2 => Ok(TypeSig::I2),
            ELEMENT_TYPE::U2 => Ok(TypeSig::U2),
            ELEMENT_TYPE::I4 => Ok(TypeSig::I4),
            ELEMENT_TYPE::U4 => Ok(TypeSig::U4),
            ELEMENT_TYPE::I8 => Ok(TypeSig::I8),
            ELEMENT_TYPE::U8 => Ok(TypeSig::U8),
            ELEMENT_TYPE::R4 => Ok(TypeSig::R4),
            ELEMENT_TYPE::R8 => Ok(TypeSig::R8),
            ELEMENT_TYPE::STRING => Ok(TypeSig::String),
            ELEMENT_TYPE::OBJECT => Ok(TypeSig::Object),
            ELEMENT_TYPE::I => Ok(TypeSig::IntPtr),
            ELEMENT_TYPE::U => Ok(TypeSig::UIntPtr),
            ELEMENT_TYPE::TYPEDBYREF => Ok(TypeSig::TypedByRef),
            ELEMENT_TYPE::PTR => Ok(TypeSig::Ptr(Box::new(PointerSig {
                modifiers: self.parse_custom_mods()?,
                base: self.parse_type()?,
            }))),
            ELEMENT_TYPE::BYREF => Ok(TypeSig::ByRef(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSig::ValueType(
                self.parser.read_compressed_type_token()?,
            )),
            ELEMENT_TYPE::CLASS => {
                Ok(TypeSig::Class(self.parser.read_compressed_type_token()?))
            }
            ELEMENT_TYPE::VAR => Ok(TypeSig::TypeGenericParam(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::MVAR => Ok(TypeSig::MethodGenericParam(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::ARRAY => {
                let base = self.parse_type()?;
                let rank = self.parser.read_compressed_uint()?;

                let num_sizes = self.parser.read_compressed_uint()?;
                let mut dimensions: Vec<ArrayDimension> =
                    Vec::with_capacity(num_sizes.min(64) as usize);
                for _ in 0..num_sizes {
                    dimensions.push(ArrayDimension {
                        size: Some(self.parser.read_compressed_uint()?),
                        lower_bound: None,
                    });
                }

                let num_lo_bounds = self.parser.read_compressed_uint()?;
                for i in 0..num_lo_bounds {
                    let lower_bound = self.parser.read_compressed_uint()?;
                    if let Some(dimension) = dimensions.get_mut(i as usize) {
                        dimension.lower_bound = Some(lower_bound);
                    } else {
                        dimensions.push(ArrayDimension {
                            size: None,
                            lower_bound: Some(lower_bound),
                        });
                    }
                }

                Ok(TypeSig::Array(Box::new(ArraySig {
                    base,
                    rank,
                    dimensions,
                })))
            }
            ELEMENT_TYPE::SZARRAY => Ok(TypeSig::SzArray(Box::new(SzArraySig {
                modifiers: self.parse_custom_mods()?,
                base: self.parse_type()?,
            }))),
            ELEMENT_TYPE::GENERICINST => {
                let next = self.parser.peek_byte()?;
                if next != ELEMENT_TYPE::CLASS && next != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST must instantiate a class or value type - {:#04x}",
                        next
                    ));
                }

                let base = self.parse_type()?;
                let arg_count = self.parser.read_compressed_uint()?;

                let mut args = Vec::with_capacity(arg_count.min(64) as usize);
                for _ in 0..arg_count {
                    args.push(self.parse_type()?);
                }

                Ok(TypeSig::GenericInst(Box::new(base), args))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeSig::FnPtr(Box::new(self.parse_method_signature()?))),
            ELEMENT_TYPE::CMOD_REQD => Ok(TypeSig::ModifierRequired(self.parse_custom_mods()?)),
            ELEMENT_TYPE::CMOD_OPT => Ok(TypeSig::ModifierOptional(self.parse_custom_mods()?)),
            ELEMENT_TYPE::PINNED => Ok(TypeSig::Pinned(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::SENTINEL => Ok(TypeSig::Sentinel),
            ELEMENT_TYPE::INTERNAL => Ok(TypeSig::Internal),
            _ => Err(malformed_error!(
                "Unsupported element type - {:#04x} at blob offset {}",
                element_type,
                self.parser.pos().saturating_sub(1)
            )),
        }
    }

    /// Collect leading `CMOD_REQD`/`CMOD_OPT` modifier tokens
    fn parse_custom_mods(&mut self) -> Result<Vec<Token>> {
        let mut mods = Vec::new();

        while self.parser.has_more_data() {
            let next = self.parser.peek_byte()?;
            if next != ELEMENT_TYPE::CMOD_REQD && next != ELEMENT_TYPE::CMOD_OPT {
                break;
            }

            self.parser.advance()?;
            mods.push(self.parser.read_compressed_type_token()?);
        }

        Ok(mods)
    }

    /// Parse one parameter or the return type
    fn parse_param(&mut self) -> Result<ParamSig> {
        let modifiers = self.parse_custom_mods()?;

        let mut by_ref = false;
        if self.parser.peek_byte()? == ELEMENT_TYPE::BYREF {
            self.parser.advance()?;
            by_ref = true;
        }

        Ok(ParamSig {
            modifiers,
            by_ref,
            base: self.parse_type()?,
        })
    }

    /// Parse a method signature: `MethodDefSig`, `MethodRefSig` or
    /// `StandAloneMethodSig` (II.23.2.1-3)
    ///
    /// # Errors
    /// Returns an error on malformed convention bytes, invalid counts, or a
    /// truncated blob.
    pub fn parse_method_signature(&mut self) -> Result<MethodSig> {
        let convention = self.parser.read_le::<u8>()?;

        let call_kind = match convention & 0x0F {
            0x00 => CallKind::Default,
            0x01 => CallKind::C,
            0x02 => CallKind::StdCall,
            0x03 => CallKind::ThisCall,
            0x04 => CallKind::FastCall,
            0x05 => CallKind::VarArg,
            other => {
                return Err(malformed_error!(
                    "Invalid calling convention - {:#04x}",
                    other
                ))
            }
        };

        let generic_param_count = if convention & 0x10 != 0 {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.parser.read_compressed_uint()?;

        let mut method = MethodSig {
            has_this: convention & 0x20 != 0,
            explicit_this: convention & 0x40 != 0,
            call_kind,
            generic_param_count,
            return_type: self.parse_param()?,
            params: Vec::with_capacity(param_count.min(64) as usize),
            varargs: Vec::new(),
        };

        for _ in 0..param_count {
            if self.parser.has_more_data() && self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                self.parser.advance()?;
                break;
            }

            method.params.push(self.parse_param()?);
        }

        if method.call_kind == CallKind::VarArg {
            for _ in method.params.len()..param_count as usize {
                method.varargs.push(self.parse_param()?);
            }
        }

        Ok(method)
    }

    /// Parse a field signature (II.23.2.4)
    ///
    /// # Errors
    /// Returns an error if the magic byte is not 0x06 or the type is invalid.
    pub fn parse_field_signature(&mut self) -> Result<FieldSig> {
        let magic = self.parser.read_le::<u8>()?;
        if magic != 0x06 {
            return Err(malformed_error!(
                "Field signature must start with 0x06 - {:#04x}",
                magic
            ));
        }

        Ok(FieldSig {
            modifiers: self.parse_custom_mods()?,
            base: self.parse_type()?,
        })
    }

    /// Parse a property signature (II.23.2.5)
    ///
    /// # Errors
    /// Returns an error if the magic bits are not 0x08 or a parameter is
    /// invalid.
    pub fn parse_property_signature(&mut self) -> Result<PropertySig> {
        let magic = self.parser.read_le::<u8>()?;
        if magic & 0x08 == 0 {
            return Err(malformed_error!(
                "Property signature must carry 0x08 - {:#04x}",
                magic
            ));
        }

        let param_count = self.parser.read_compressed_uint()?;
        let modifiers = self.parse_custom_mods()?;
        let base = self.parse_type()?;

        let mut params = Vec::with_capacity(param_count.min(64) as usize);
        for _ in 0..param_count {
            params.push(self.parse_param()?);
        }

        Ok(PropertySig {
            has_this: magic & 0x20 != 0,
            modifiers,
            base,
            params,
        })
    }

    /// Parse a local variable signature (II.23.2.6)
    ///
    /// # Errors
    /// Returns an error if the magic byte is not 0x07 or a local is invalid.
    pub fn parse_local_var_signature(&mut self) -> Result<LocalVariablesSig> {
        let magic = self.parser.read_le::<u8>()?;
        if magic != 0x07 {
            return Err(malformed_error!(
                "Local variable signature must start with 0x07 - {:#04x}",
                magic
            ));
        }

        let count = self.parser.read_compressed_uint()?;
        let mut locals = Vec::with_capacity(count.min(256) as usize);

        for _ in 0..count {
            let modifiers = self.parse_custom_mods()?;

            let mut is_pinned = false;
            if self.parser.peek_byte()? == ELEMENT_TYPE::PINNED {
                self.parser.advance()?;
                is_pinned = true;
            }

            let mut by_ref = false;
            if self.parser.peek_byte()? == ELEMENT_TYPE::BYREF {
                self.parser.advance()?;
                by_ref = true;
            }

            locals.push(LocalVarSig {
                modifiers,
                by_ref,
                is_pinned,
                base: self.parse_type()?,
            });
        }

        Ok(LocalVariablesSig { locals })
    }

    /// Parse a type specification signature (II.23.2.14): a bare type
    ///
    /// # Errors
    /// Returns an error if the type is invalid or the blob is truncated.
    pub fn parse_type_spec_signature(&mut self) -> Result<TypeSig> {
        self.parse_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_one_param() {
        // HASTHIS | default, 1 param, returns void, takes string
        let blob = [0x20, 0x01, 0x01, 0x0E];
        let sig = SignatureParser::new(&blob).parse_method_signature().unwrap();

        assert!(sig.has_this);
        assert!(!sig.explicit_this);
        assert_eq!(sig.call_kind, CallKind::Default);
        assert_eq!(sig.return_type.base, TypeSig::Void);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].base, TypeSig::String);
    }

    #[test]
    fn method_generic() {
        // GENERIC, 2 generic params, 1 param, returns !0, takes !!1
        let blob = [0x10, 0x02, 0x01, 0x13, 0x00, 0x1E, 0x01];
        let sig = SignatureParser::new(&blob).parse_method_signature().unwrap();

        assert_eq!(sig.generic_param_count, 2);
        assert_eq!(sig.return_type.base, TypeSig::TypeGenericParam(0));
        assert_eq!(sig.params[0].base, TypeSig::MethodGenericParam(1));
    }

    #[test]
    fn method_vararg_with_sentinel() {
        // VARARG, 3 params, returns void: i4, SENTINEL, then i8 and r8 extras
        let blob = [0x05, 0x03, 0x01, 0x08, 0x41, 0x0A, 0x0D];
        let sig = SignatureParser::new(&blob).parse_method_signature().unwrap();

        assert_eq!(sig.call_kind, CallKind::VarArg);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].base, TypeSig::I4);
        assert_eq!(sig.varargs.len(), 2);
        assert_eq!(sig.varargs[0].base, TypeSig::I8);
        assert_eq!(sig.varargs[1].base, TypeSig::R8);
    }

    #[test]
    fn method_byref_param() {
        let blob = [0x00, 0x01, 0x01, 0x10, 0x08];
        let sig = SignatureParser::new(&blob).parse_method_signature().unwrap();

        assert!(sig.params[0].by_ref);
        assert_eq!(sig.params[0].base, TypeSig::I4);
    }

    #[test]
    fn field_class_type() {
        // FIELD, class (TypeRef row 2: compressed (2 << 2) | 1 = 0x09)
        let blob = [0x06, 0x12, 0x09];
        let sig = SignatureParser::new(&blob).parse_field_signature().unwrap();

        assert_eq!(sig.base, TypeSig::Class(Token::new(0x0100_0002)));
    }

    #[test]
    fn field_bad_magic_rejected() {
        let blob = [0x07, 0x08];
        assert!(SignatureParser::new(&blob).parse_field_signature().is_err());
    }

    #[test]
    fn szarray_of_i4() {
        let blob = [0x06, 0x1D, 0x08];
        let sig = SignatureParser::new(&blob).parse_field_signature().unwrap();

        match sig.base {
            TypeSig::SzArray(array) => assert_eq!(array.base, TypeSig::I4),
            other => panic!("expected SzArray, got {:?}", other),
        }
    }

    #[test]
    fn multi_dimensional_array() {
        // ARRAY i4, rank 2, 2 sizes (3, 4), 1 lower bound (0)
        let blob = [0x06, 0x14, 0x08, 0x02, 0x02, 0x03, 0x04, 0x01, 0x00];
        let sig = SignatureParser::new(&blob).parse_field_signature().unwrap();

        match sig.base {
            TypeSig::Array(array) => {
                assert_eq!(array.base, TypeSig::I4);
                assert_eq!(array.rank, 2);
                assert_eq!(array.dimensions.len(), 2);
                assert_eq!(array.dimensions[0].size, Some(3));
                assert_eq!(array.dimensions[0].lower_bound, Some(0));
                assert_eq!(array.dimensions[1].size, Some(4));
                assert_eq!(array.dimensions[1].lower_bound, None);
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn generic_instantiation() {
        // GENERICINST class TypeRef#3 with 1 arg: i4
        let blob = [0x06, 0x15, 0x12, 0x0D, 0x01, 0x08];
        let sig = SignatureParser::new(&blob).parse_field_signature().unwrap();

        match sig.base {
            TypeSig::GenericInst(base, args) => {
                assert_eq!(*base, TypeSig::Class(Token::new(0x0100_0003)));
                assert_eq!(args, vec![TypeSig::I4]);
            }
            other => panic!("expected GenericInst, got {:?}", other),
        }
    }

    #[test]
    fn generic_instantiation_requires_class_or_valuetype() {
        let blob = [0x06, 0x15, 0x08, 0x01, 0x08];
        assert!(SignatureParser::new(&blob).parse_field_signature().is_err());
    }

    #[test]
    fn locals_with_pinned() {
        // LOCAL_SIG, 2 locals: pinned i4, byref string
        let blob = [0x07, 0x02, 0x45, 0x08, 0x10, 0x0E];
        let sig = SignatureParser::new(&blob)
            .parse_local_var_signature()
            .unwrap();

        assert_eq!(sig.locals.len(), 2);
        assert!(sig.locals[0].is_pinned);
        assert_eq!(sig.locals[0].base, TypeSig::I4);
        assert!(sig.locals[1].by_ref);
        assert_eq!(sig.locals[1].base, TypeSig::String);
    }

    #[test]
    fn property_with_indexer() {
        // PROPERTY | HASTHIS, 1 param, returns string, indexed by i4
        let blob = [0x28, 0x01, 0x0E, 0x08];
        let sig = SignatureParser::new(&blob)
            .parse_property_signature()
            .unwrap();

        assert!(sig.has_this);
        assert_eq!(sig.base, TypeSig::String);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].base, TypeSig::I4);
    }

    #[test]
    fn deep_nesting_bounded() {
        // A long chain of SZARRAY prefixes must not overflow the stack
        let mut blob = vec![0x06];
        blob.extend(std::iter::repeat(0x1D).take(100));
        blob.push(0x08);

        assert!(matches!(
            SignatureParser::new(&blob).parse_field_signature(),
            Err(RecursionLimit(_))
        ));
    }

    #[test]
    fn truncated_blob_rejected() {
        let blob = [0x20, 0x01];
        assert!(SignatureParser::new(&blob).parse_method_signature().is_err());
    }
}
