use crossbeam_skiplist::SkipMap;
use std::path::Path;
use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        member::{
            AssemblyDefinition, AssemblyRc, AssemblyReference, Backing, GenericParameter,
            LazyCell, Member, MemberList, MethodDefinition, ModuleRc, TypeDefinition,
        },
        tables::{
            AssemblyRaw, AssemblyRefRaw, GenericParamRaw, MethodDefRaw, ModuleRaw, NestedClassRaw,
            TableId, TypeDefRaw,
        },
        token::Token,
        view::MetadataView,
    },
    Error, Result,
};

/// A module: the container of types, references and metadata tables.
///
/// A module is either hand-built ([`ModuleDefinition::new`]) or loaded from an
/// image, in which case it holds the shared [`MetadataView`] and a per-module
/// member cache so every token resolves to the identical member instance.
pub struct ModuleDefinition {
    token: Token,
    backing: Backing<ModuleRaw>,
    generation: u16,
    name: LazyCell<String>,
    mvid: LazyCell<uguid::Guid>,
    enc_id: LazyCell<Option<uguid::Guid>>,
    enc_base_id: LazyCell<Option<uguid::Guid>>,
    assembly: LazyCell<Option<Weak<AssemblyDefinition>>>,
    top_level_types: LazyCell<Arc<MemberList<ModuleDefinition, TypeDefinition>>>,
    assembly_references: LazyCell<Arc<MemberList<ModuleDefinition, AssemblyReference>>>,
    members: SkipMap<Token, Member>,
    this: Weak<ModuleDefinition>,
}

impl ModuleDefinition {
    /// Create a new, empty module with the given name.
    ///
    /// ## Arguments
    /// * 'name' - The module name
    #[must_use]
    pub fn new(name: impl Into<String>) -> ModuleRc {
        Arc::new_cyclic(|this| ModuleDefinition {
            token: TableId::Module.token(0),
            backing: Backing::User,
            generation: 0,
            name: LazyCell::with_value(name.into()),
            mvid: LazyCell::new(),
            enc_id: LazyCell::with_value(None),
            enc_base_id: LazyCell::with_value(None),
            assembly: LazyCell::with_value(None),
            top_level_types: LazyCell::new(),
            assembly_references: LazyCell::new(),
            members: SkipMap::new(),
            this: this.clone(),
        })
    }

    /// Load the module of a PE image on disk.
    ///
    /// ## Arguments
    /// * 'path' - Path to the image
    ///
    /// # Errors
    /// Returns an error if the image or its metadata is malformed.
    pub fn from_file(path: &Path) -> Result<ModuleRc> {
        Self::from_view(MetadataView::from_file(path)?)
    }

    /// Load the module of PE bytes held in memory.
    ///
    /// ## Arguments
    /// * 'data' - The bytes of the image
    ///
    /// # Errors
    /// Returns an error if the image or its metadata is malformed.
    pub fn from_bytes(data: Vec<u8>) -> Result<ModuleRc> {
        Self::from_view(MetadataView::from_bytes(data)?)
    }

    /// Construct the module of an already-parsed metadata view.
    ///
    /// Row 1 of the Module table becomes the root of the member graph.
    ///
    /// ## Arguments
    /// * 'view' - The shared metadata view
    ///
    /// # Errors
    /// Returns an error if the Module table is absent or empty.
    pub fn from_view(view: Arc<MetadataView>) -> Result<ModuleRc> {
        let row = {
            let tables = view.tables_required()?;
            tables
                .table::<ModuleRaw>(TableId::Module)
                .and_then(|table| table.get(1))
                .ok_or_else(|| malformed_error!("Image has no Module table row"))?
        };

        Ok(Arc::new_cyclic(|this| ModuleDefinition {
            token: row.token,
            generation: row.generation,
            backing: Backing::Loaded { view, row },
            name: LazyCell::new(),
            mvid: LazyCell::new(),
            enc_id: LazyCell::new(),
            enc_base_id: LazyCell::new(),
            assembly: LazyCell::with_value(None),
            top_level_types: LazyCell::new(),
            assembly_references: LazyCell::new(),
            members: SkipMap::new(),
            this: this.clone(),
        }))
    }

    /// The metadata token of this module.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// True if this module was loaded from an image.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.backing.is_loaded()
    }

    /// The Edit-and-Continue generation, 0 outside EnC scenarios.
    #[must_use]
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// The module name.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn name(&self) -> Result<String> {
        self.name.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.string_at(row.name)?.unwrap_or_default()),
            None => Ok(String::new()),
        })
    }

    /// Override the module name.
    ///
    /// ## Arguments
    /// * 'name' - The new name
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.name.set(name.into())
    }

    /// The module version identifier.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn mvid(&self) -> Result<uguid::Guid> {
        self.mvid.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => Ok(view.guid_at(row.mvid)?.unwrap_or(uguid::Guid::ZERO)),
            None => Ok(uguid::Guid::ZERO),
        })
    }

    /// Override the module version identifier.
    ///
    /// ## Arguments
    /// * 'mvid' - The new identifier
    ///
    /// # Errors
    /// Returns an error if the field lock is poisoned.
    pub fn set_mvid(&self, mvid: uguid::Guid) -> Result<()> {
        self.mvid.set(mvid)
    }

    /// The Edit-and-Continue identifier, if any.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn enc_id(&self) -> Result<Option<uguid::Guid>> {
        self.enc_id.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => view.guid_at(row.encid),
            None => Ok(None),
        })
    }

    /// The Edit-and-Continue base identifier, if any.
    ///
    /// # Errors
    /// Returns an error if the backing heap entry is invalid.
    pub fn enc_base_id(&self) -> Result<Option<uguid::Guid>> {
        self.enc_base_id.get_or_try_init(|| match self.backing.loaded() {
            Some((view, row)) => view.guid_at(row.encbaseid),
            None => Ok(None),
        })
    }

    /// The assembly this module belongs to, if any.
    ///
    /// The link is weak: it does not keep the assembly alive.
    ///
    /// # Errors
    /// Returns [`Error::Detached`] if the owning assembly has been released.
    pub fn assembly(&self) -> Result<Option<AssemblyRc>> {
        match self.assembly.get()?.flatten() {
            Some(weak) => weak.upgrade().map(Some).ok_or(Error::Detached),
            None => Ok(None),
        }
    }

    pub(crate) fn has_assembly(&self) -> Result<bool> {
        Ok(self.assembly.get()?.flatten().is_some())
    }

    pub(crate) fn set_assembly(&self, assembly: &AssemblyRc) -> Result<()> {
        self.assembly.set(Some(Arc::downgrade(assembly)))
    }

    pub(crate) fn set_assembly_weak(&self, assembly: Weak<AssemblyDefinition>) -> Result<()> {
        self.assembly.set(Some(assembly))
    }

    pub(crate) fn clear_assembly(&self) -> Result<()> {
        self.assembly.set(None)
    }

    /// The types declared directly in this module, in TypeDef rid order.
    ///
    /// Nested types are reachable through their enclosing type's
    /// [`TypeDefinition::nested_types`] only; a type appears here exactly when
    /// its declaring type is null.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn top_level_types(
        &self,
    ) -> Result<Arc<MemberList<ModuleDefinition, TypeDefinition>>> {
        self.top_level_types.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_type,
                detach_type,
            ));

            if let Some((view, _)) = self.backing.loaded() {
                let tables = view.tables_required()?;
                if let Some(typedefs) = tables.table::<TypeDefRaw>(TableId::TypeDef) {
                    let mut nested = vec![false; typedefs.row_count() as usize + 1];
                    if let Some(pairs) = tables.table::<NestedClassRaw>(TableId::NestedClass) {
                        for pair in pairs.iter() {
                            if let Some(slot) = nested.get_mut(pair.nested_class as usize) {
                                *slot = true;
                            }
                        }
                    }

                    for rid in 1..=typedefs.row_count() {
                        if nested[rid as usize] {
                            continue;
                        }

                        if let Member::Type(ty) = self.member_at(TableId::TypeDef.token(rid))? {
                            list.push_initial(ty)?;
                        }
                    }
                }
            }

            Ok(list)
        })
    }

    /// The assembly references of this module, in AssemblyRef rid order.
    ///
    /// # Errors
    /// Returns an error if the backing tables are malformed.
    pub fn assembly_references(
        &self,
    ) -> Result<Arc<MemberList<ModuleDefinition, AssemblyReference>>> {
        self.assembly_references.get_or_try_init(|| {
            let list = Arc::new(MemberList::new(
                self.this.clone(),
                attach_assembly_ref,
                detach_assembly_ref,
            ));

            if let Some((view, _)) = self.backing.loaded() {
                let tables = view.tables_required()?;
                if let Some(refs) = tables.table::<AssemblyRefRaw>(TableId::AssemblyRef) {
                    for rid in 1..=refs.row_count() {
                        if let Member::AssemblyRef(reference) =
                            self.member_at(TableId::AssemblyRef.token(rid))?
                        {
                            list.push_initial(reference)?;
                        }
                    }
                }
            }

            Ok(list)
        })
    }

    /// Resolve a metadata token to its member.
    ///
    /// Repeated lookups of the same token return the identical member
    /// instance, courtesy of the per-module member cache.
    ///
    /// ## Arguments
    /// * 'token' - The token to resolve
    ///
    /// # Errors
    /// Returns [`Error::NotSerialized`] on a hand-built module,
    /// [`Error::MemberNotFound`] when the row does not exist, and
    /// [`Error::NotSupported`] for tables outside the member model.
    pub fn lookup_member(&self, token: Token) -> Result<Member> {
        if !self.backing.is_loaded() {
            return Err(Error::NotSerialized);
        }

        self.member_at(token)
    }

    pub(crate) fn member_at(&self, token: Token) -> Result<Member> {
        if let Some(entry) = self.members.get(&token) {
            return Ok(entry.value().clone());
        }

        // Racing constructions are benign; the skip map publishes exactly one
        let member = self.create_member(token)?;
        let entry = self.members.get_or_insert(token, member);
        Ok(entry.value().clone())
    }

    fn create_member(&self, token: Token) -> Result<Member> {
        if token.is_null() {
            return Err(Error::MemberNotFound(token));
        }

        let Some((view, _)) = self.backing.loaded() else {
            return Err(Error::NotSerialized);
        };

        let Some(table_id) = TableId::from_token_table(token.table()) else {
            return Err(Error::MemberNotFound(token));
        };

        let tables = view.tables_required()?;

        match table_id {
            TableId::Module => {
                if token.row() == 1 {
                    let this = self.this.upgrade().ok_or(Error::Detached)?;
                    Ok(Member::Module(this))
                } else {
                    Err(Error::MemberNotFound(token))
                }
            }
            TableId::Assembly => {
                let _ = tables
                    .table::<AssemblyRaw>(TableId::Assembly)
                    .and_then(|table| table.get(token.row()))
                    .ok_or(Error::MemberNotFound(token))?;
                match self.assembly()? {
                    Some(assembly) => Ok(Member::Assembly(assembly)),
                    None => Err(Error::MemberNotFound(token)),
                }
            }
            TableId::TypeDef => {
                let row = tables
                    .table::<TypeDefRaw>(TableId::TypeDef)
                    .and_then(|table| table.get(token.row()))
                    .ok_or(Error::MemberNotFound(token))?;
                Ok(Member::Type(TypeDefinition::from_row(
                    view.clone(),
                    row,
                    self.this.clone(),
                )))
            }
            TableId::MethodDef => {
                let row = tables
                    .table::<MethodDefRaw>(TableId::MethodDef)
                    .and_then(|table| table.get(token.row()))
                    .ok_or(Error::MemberNotFound(token))?;
                Ok(Member::Method(MethodDefinition::from_row(
                    view.clone(),
                    row,
                    self.this.clone(),
                )))
            }
            TableId::GenericParam => {
                let row = tables
                    .table::<GenericParamRaw>(TableId::GenericParam)
                    .and_then(|table| table.get(token.row()))
                    .ok_or(Error::MemberNotFound(token))?;
                Ok(Member::GenericParam(GenericParameter::from_row(
                    view.clone(),
                    row,
                    self.this.clone(),
                )))
            }
            TableId::AssemblyRef => {
                let row = tables
                    .table::<AssemblyRefRaw>(TableId::AssemblyRef)
                    .and_then(|table| table.get(token.row()))
                    .ok_or(Error::MemberNotFound(token))?;
                Ok(Member::AssemblyRef(AssemblyReference::from_row(
                    view.clone(),
                    row,
                    self.this.clone(),
                )))
            }
            _ => Err(Error::NotSupported),
        }
    }
}

fn attach_type(ty: &TypeDefinition, owner: &Weak<ModuleDefinition>) -> Result<()> {
    if ty.is_owned()? {
        return Err(Error::AlreadyOwned(ty.token()));
    }
    ty.set_owner_module(owner.clone())
}

fn detach_type(ty: &TypeDefinition) -> Result<()> {
    ty.clear_owner()
}

fn attach_assembly_ref(reference: &AssemblyReference, owner: &Weak<ModuleDefinition>) -> Result<()> {
    if reference.is_owned()? {
        return Err(Error::AlreadyOwned(reference.token()));
    }
    reference.set_owner(owner.clone())
}

fn detach_assembly_ref(reference: &AssemblyReference) -> Result<()> {
    reference.clear_owner()
}
