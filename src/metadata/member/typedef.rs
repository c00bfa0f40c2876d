use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        member::{
            Backing, GenericParameter, LazyCell, Member, MemberList, MethodDefinition, ModuleRc,
            ModuleDefinition, TypeRc,
        },
        tables::{
            typedef::TypeAttributes, CodedIndex, CodedIndexKind, GenericParamRaw, MethodDefRaw,
            NestedClassRaw, TableId, TypeDefRaw,
        },
        token::Token,
        view::MetadataView,
    },
    Error, Result,
};

/// A reference to a base type: a definition in this module, or a token into
/// the TypeRef / TypeSpec tables for types this model does not resolve.
#[derive(Clone)]
pub enum TypeDefOrRef {
    /// A type defined in the same module
    Definition(TypeRc),
    /// A `TypeRef` token; resolution across assemblies is out of scope here
    Reference(Token),
    /// A `TypeSpec` token; the signature lives in the `#Blob` heap
    Specification(Token),
}

/// Who owns a type: nothing yet, a module (top-level) or an enclosing type
/// (nested).
#[derive(Clone)]
pub(crate) enum TypeOwner {
    None,
    Module(Weak<ModuleDefinition>),
    Type(Weak<TypeDefinition>),
}

/// A type defined in a module.
///
/// A type is top-level exactly when its declaring type is null; the two
/// states are kept consistent by the owned collections
/// ([`ModuleDefinition::top_level_types`] and
/// [`TypeDefinition::nested_types`]).
pub struct TypeDefinition {
    token: Token,
    backing: Backing<TypeDefRaw>,
    home: Weak<ModuleDefinition>,
    name: LazyCell<String>,
    namespace: LazyCell<Option<String>>,
    attributes: LazyCell<u32>,
    base_type: LazyCell<Option<TypeDefOrRef>>,
    owner: LazyCell<TypeOwner>,
    nested_types: LazyCell<Arc<MemberList<TypeDefinition, TypeDefinition>>>,
    methods: LazyCell<Arc<MemberList<TypeDefinition, MethodDefinition>>>,
    generic_parameters: LazyCell<Arc<MemberList<TypeDefinition, GenericParameter>>>,
    this: Weak<TypeDefinition>,
}

impl TypeDefinition {
    /// Create a new, unattached type.
    ///
    /// ## Arguments
    /// * 'namespace' - The namespace, or `None`
    /// * 'name'      - The type name
    #[must_use]
    pub fn new(namespace: Option<String>, name: impl Into<String>) -> TypeRc {
        let name = name.into();
        Arc::new_cyclic(|this| TypeDefinition {
            token: TableId::TypeDef.token(0),
            backing: Backing::User,
            home: Weak::new(),
            name: LazyCell::with_value(name),
            namespace: LazyCell::with_value(namespace),
            attributes: LazyCell::with_value(0),
            base_type: LazyCell::with_value(None),
            owner: LazyCell::with_value(TypeOwner::None),
            nested_types: LazyCell::new(),
            methods: LazyCell::new(),
            generic_parameters: LazyCell::new(),
            this: this.clone(),
        })
    }

    pub(crate) fn from_row(
        view: Arc<MetadataView>,
        row: TypeDefRaw,
        home: Weak<ModuleDefinition>,
    ) -> TypeRc {
        Arc::new_cyclic(|this| TypeDefinition {
            token: row.token,
            backing: Backing::Loaded { view, row },
            home,
            name: LazyCell::new(),
            namespace: LazyCell::new(),
            attributes: LazyCell::new(),
            base_type: LazyCell::new(),
            owner: LazyCell::new(),
            nested_types: LazyCell::new(),
            methods: LazyCell::new(),
            generic_parameters: LazyCell::new(),
            this: this.clone(),
        })
    }

    /// The metadata token of this type.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The type name.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn name(&self) -> Result<String> {
        self.name.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.string_at(row.type_name)?.unwrap_or_default()),
            None => Ok(String::new()),
        })
    }

    /// Override the type name.
    ///
    /// ## Arguments
    /// * 'name' - The new name
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.name.set(name.into())
    }

    /// The namespace, or `None` for types without one.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn namespace(&self) -> Result<Option<String>> {
        self.namespace.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => view.string_at(row.type_namespace),
            None => Ok(None),
        })
    }

    /// Override the namespace.
    ///
    /// ## Arguments
    /// * 'namespace' - The new namespace, or `None`
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_namespace(&self, namespace: Option<String>) -> Result<()> {
        self.namespace.set(namespace)
    }

    /// The `TypeAttributes` bitmask.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn attributes(&self) -> Result<u32> {
        self.attributes.get_or_try_init(|| match self.backing.loaded() {
            Some((_, row)) => Ok(row.flags),
            None => Ok(0),
        })
    }

    /// Override the `TypeAttributes` bitmask.
    ///
    /// ## Arguments
    /// * 'attributes' - The new bitmask
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_attributes(&self, attributes: u32) -> Result<()> {
        self.attributes.set(attributes)
    }

    /// True if the type has public visibility.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_public(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::VISIBILITY_MASK == TypeAttributes::PUBLIC)
    }

    /// True if the type has no public scope.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_not_public(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::VISIBILITY_MASK == TypeAttributes::NOT_PUBLIC)
    }

    /// True if the type has any nested visibility.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_nested(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::VISIBILITY_MASK >= TypeAttributes::NESTED_PUBLIC)
    }

    /// True if the type is an interface.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_interface(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::CLASS_SEMANTICS_MASK == TypeAttributes::INTERFACE)
    }

    /// True if the type is a class (not an interface).
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_class(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::CLASS_SEMANTICS_MASK == TypeAttributes::CLASS)
    }

    /// True if the type is sealed.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_sealed(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::SEALED != 0)
    }

    /// True if the type is abstract.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_abstract(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::ABSTRACT != 0)
    }

    /// True if the type name is special.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_special_name(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::SPECIAL_NAME != 0)
    }

    /// True if the type name is special to the runtime.
    ///
    /// Reads `RT_SPECIAL_NAME` (0x0800); distinct from [`Self::is_forwarder`].
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_runtime_special_name(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::RT_SPECIAL_NAME != 0)
    }

    /// True if the type forwards to a definition in another assembly.
    ///
    /// Reads `FORWARDER` (0x00200000); distinct from
    /// [`Self::is_runtime_special_name`].
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_forwarder(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::FORWARDER != 0)
    }

    /// True if the fields of the type are auto-laid out.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_auto_layout(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::LAYOUT_MASK == TypeAttributes::AUTO_LAYOUT)
    }

    /// True if `LPSTR` parameters are interpreted as ANSI for this type.
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn is_ansi_class(&self) -> Result<bool> {
        Ok(self.attributes()? & TypeAttributes::STRING_FORMAT_MASK == TypeAttributes::ANSI_CLASS)
    }

    /// The base type, if any.
    ///
    /// A base in the same module materializes as a
    /// [`TypeDefOrRef::Definition`]; references into other assemblies and
    /// signature-described bases stay tokens.
    ///
    /// # Errors
    /// Returns an error on an invalid coded index or malformed tables.
    pub fn base_type(&self) -> Result<Option<TypeDefOrRef>> {
        self.base_type.get_or_try_init(|| {
            let Some((_, row)) = self.backing.loaded() else {
                return Ok(None);
            };

            if row.extends.is_null() {
                return Ok(None);
            }

            match row.extends.tag {
                TableId::TypeDef => {
                    let module = self.home.upgrade().ok_or(Error::Detached)?;
                    match module.member_at(row.extends.token)? {
                        Member::Type(ty) => Ok(Some(TypeDefOrRef::Definition(ty))),
                        _ => Err(Error::MemberNotFound(row.extends.token)),
                    }
                }
                TableId::TypeRef => Ok(Some(TypeDefOrRef::Reference(row.extends.token))),
                TableId::TypeSpec => Ok(Some(TypeDefOrRef::Specification(row.extends.token))),
                _ => Err(Error::InvalidCodedIndex {
                    value: row.extends.token.value(),
                }),
            }
        })
    }

    /// Override the base type.
    ///
    /// ## Arguments
    /// * 'base' - The new base, or `None`
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_base_type(&self, base: Option<TypeDefOrRef>) -> Result<()> {
        self.base_type.set(base)
    }

    /// The module this type lives in, if it is attached to one.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning graph has been released.
    pub fn module(&self) -> Result<Option<ModuleRc>> {
        if self.backing.is_loaded() {
            return self.home.upgrade().map(Some).ok_or(Error::Detached);
        }

        match self.owner_state()? {
            TypeOwner::Module(weak) => weak.upgrade().map(Some).ok_or(Error::Detached),
            TypeOwner::Type(weak) => weak.upgrade().ok_or(Error::Detached)?.module(),
            TypeOwner::None => Ok(None),
        }
    }

    /// The enclosing type, or `None` for top-level types.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning graph has been released.
    pub fn declaring_type(&self) -> Result<Option<TypeRc>> {
        match self.owner_state()? {
            TypeOwner::Type(weak) => weak.upgrade().map(Some).ok_or(Error::Detached),
            _ => Ok(None),
        }
    }

    /// The full name: namespace-qualified, with `+` separating the declaring
    /// chain of nested types.
    ///
    /// Computed from the current names, so renames anywhere in the chain are
    /// reflected immediately.
    ///
    /// # Errors
    /// Returns an error if a name in the chain cannot be read.
    pub fn full_name(&self) -> Result<String> {
        if let Some(declaring) = self.declaring_type()? {
            return Ok(format!("{}+{}", declaring.full_name()?, self.name()?));
        }

        match self.namespace()? {
            Some(namespace) if !namespace.is_empty() => {
                Ok(format!("{}.{}", namespace, self.name()?))
            }
            _ => self.name(),
        }
    }

    /// The types nested directly inside this one, in NestedClass order.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn nested_types(
        &self,
    ) -> Result<Arc<MemberList<TypeDefinition, TypeDefinition>>> {
        self.nested_types.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_nested,
                detach_nested,
            ));

            if let Some((view, row)) = self.backing.loaded() {
                let tables = view.tables_required()?;
                if let Some(pairs) = tables.table::<NestedClassRaw>(TableId::NestedClass) {
                    let module = self.home.upgrade().ok_or(Error::Detached)?;
                    // Sorted by the nested column, not the enclosing one, so
                    // enumerating children takes the linear path
                    for rid in pairs.scan_rows(row.rid, |pair| pair.enclosing_class) {
                        let Some(pair) = pairs.get(rid) else { continue };
                        if let Member::Type(nested) =
                            module.member_at(TableId::TypeDef.token(pair.nested_class))?
                        {
                            list.push_initial(nested)?;
                        }
                    }
                }
            }

            Ok(list)
        })
    }

    /// The methods of this type, in MethodDef rid order.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn methods(
        &self,
    ) -> Result<Arc<MemberList<TypeDefinition, MethodDefinition>>> {
        self.methods.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_method,
                detach_method,
            ));

            if let Some((view, row)) = self.backing.loaded() {
                let tables = view.tables_required()?;
                if let (Some(typedefs), Some(methods)) = (
                    tables.table::<TypeDefRaw>(TableId::TypeDef),
                    tables.table::<MethodDefRaw>(TableId::MethodDef),
                ) {
                    // This type's methods are [method_list, next type's
                    // method_list); the last type runs to the end of MethodDef
                    let start = row.method_list;
                    let end = match typedefs.get(row.rid + 1) {
                        Some(next) => next.method_list,
                        None => methods.row_count() + 1,
                    };

                    if start >= 1 && start <= end {
                        let module = self.home.upgrade().ok_or(Error::Detached)?;
                        for rid in start..end.min(methods.row_count() + 1) {
                            if let Member::Method(method) =
                                module.member_at(TableId::MethodDef.token(rid))?
                            {
                                list.push_initial(method)?;
                            }
                        }
                    }
                }
            }

            Ok(list)
        })
    }

    /// The generic parameters of this type, in declaration order.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn generic_parameters(
        &self,
    ) -> Result<Arc<MemberList<TypeDefinition, GenericParameter>>> {
        self.generic_parameters.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_generic_param,
                detach_generic_param,
            ));

            if let Some((view, row)) = self.backing.loaded() {
                let tables = view.tables_required()?;
                if let Some(params) = tables.table::<GenericParamRaw>(TableId::GenericParam) {
                    let key = CodedIndex::new(TableId::TypeDef, row.rid)
                        .encode(CodedIndexKind::TypeOrMethodDef)?;
                    let column = |param: &GenericParamRaw| {
                        param
                            .owner
                            .encode(CodedIndexKind::TypeOrMethodDef)
                            .unwrap_or(0)
                    };

                    let rids = if tables.is_sorted(TableId::GenericParam) {
                        let (lo, hi) = params.find_range(key, column);
                        (lo..hi).collect::<Vec<u32>>()
                    } else {
                        params.scan_rows(key, column)
                    };

                    let module = self.home.upgrade().ok_or(Error::Detached)?;
                    for rid in rids {
                        if let Member::GenericParam(param) =
                            module.member_at(TableId::GenericParam.token(rid))?
                        {
                            list.push_initial(param)?;
                        }
                    }
                }
            }

            Ok(list)
        })
    }

    pub(crate) fn owner_state(&self) -> Result<TypeOwner> {
        self.owner.get_or_try_init(|| {
            let Some((view, row)) = self.backing.loaded() else {
                return Ok(TypeOwner::None);
            };

            let tables = view.tables_required()?;
            if let Some(pairs) = tables.table::<NestedClassRaw>(TableId::NestedClass) {
                let rids = if tables.is_sorted(TableId::NestedClass) {
                    let (lo, hi) = pairs.find_range(row.rid, |pair| pair.nested_class);
                    (lo..hi).collect::<Vec<u32>>()
                } else {
                    pairs.scan_rows(row.rid, |pair| pair.nested_class)
                };

                // Lowest rid wins should the image declare duplicates
                if let Some(pair) = rids.first().and_then(|rid| pairs.get(*rid)) {
                    let module = self.home.upgrade().ok_or(Error::Detached)?;
                    let enclosing = TableId::TypeDef.token(pair.enclosing_class);
                    return match module.member_at(enclosing)? {
                        Member::Type(parent) => Ok(TypeOwner::Type(Arc::downgrade(&parent))),
                        _ => Err(Error::MemberNotFound(enclosing)),
                    };
                }
            }

            Ok(TypeOwner::Module(self.home.clone()))
        })
    }

    pub(crate) fn is_owned(&self) -> Result<bool> {
        Ok(!matches!(self.owner_state()?, TypeOwner::None))
    }

    pub(crate) fn set_owner_module(&self, module: Weak<ModuleDefinition>) -> Result<()> {
        self.owner.set(TypeOwner::Module(module))
    }

    pub(crate) fn set_owner_type(&self, parent: Weak<TypeDefinition>) -> Result<()> {
        self.owner.set(TypeOwner::Type(parent))
    }

    pub(crate) fn clear_owner(&self) -> Result<()> {
        self.owner.set(TypeOwner::None)
    }
}

fn attach_nested(ty: &TypeDefinition, owner: &Weak<TypeDefinition>) -> Result<()> {
    if ty.is_owned()? {
        return Err(Error::AlreadyOwned(ty.token()));
    }
    ty.set_owner_type(owner.clone())
}

fn detach_nested(ty: &TypeDefinition) -> Result<()> {
    ty.clear_owner()
}

fn attach_method(method: &MethodDefinition, owner: &Weak<TypeDefinition>) -> Result<()> {
    if method.is_owned()? {
        return Err(Error::AlreadyOwned(method.token()));
    }
    method.set_declaring(owner.clone())
}

fn detach_method(method: &MethodDefinition) -> Result<()> {
    method.clear_declaring()
}

fn attach_generic_param(param: &GenericParameter, owner: &Weak<TypeDefinition>) -> Result<()> {
    if param.is_owned()? {
        return Err(Error::AlreadyOwned(param.token()));
    }
    param.set_owner_type(owner.clone())
}

fn detach_generic_param(param: &GenericParameter) -> Result<()> {
    param.clear_owner()
}
