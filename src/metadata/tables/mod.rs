//! ECMA-335 metadata tables.
//!
//! One submodule per table, each defining the `*Raw` row type with its exact
//! column layout, plus the shared [`types`] infrastructure (row parsing,
//! typed table access, coded indexes, size computation). Attribute flag
//! constants live beside the tables they describe.

/// The shared types used to parse and access metadata tables
pub mod types;

/// The implementation of the '`Assembly`' table
pub mod assembly;
/// The implementation of the '`AssemblyOS`' table
pub mod assemblyos;
/// The implementation of the '`AssemblyProcessor`' table
pub mod assemblyprocessor;
/// The implementation of the '`AssemblyRef`' table
pub mod assemblyref;
/// The implementation of the '`AssemblyRefOS`' table
pub mod assemblyrefos;
/// The implementation of the '`AssemblyRefProcessor`' table
pub mod assemblyrefprocessor;
/// The implementation of the '`ClassLayout`' table
pub mod classlayout;
/// The implementation of the '`Constant`' table
pub mod constant;
/// The implementation of the '`CustomAttribute`' table
pub mod customattribute;
/// The implementation of the '`DeclSecurity`' table
pub mod declsecurity;
/// The implementation of the '`EncLog`' table
pub mod enclog;
/// The implementation of the '`EncMap`' table
pub mod encmap;
/// The implementation of the '`Event`' table
pub mod event;
/// The implementation of the '`EventMap`' table
pub mod eventmap;
/// The implementation of the '`EventPtr`' table
pub mod eventptr;
/// The implementation of the '`ExportedType`' table
pub mod exportedtype;
/// The implementation of the '`Field`' table
pub mod field;
/// The implementation of the '`FieldLayout`' table
pub mod fieldlayout;
/// The implementation of the '`FieldMarshal`' table
pub mod fieldmarshal;
/// The implementation of the '`FieldPtr`' table
pub mod fieldptr;
/// The implementation of the '`FieldRVA`' table
pub mod fieldrva;
/// The implementation of the '`File`' table
pub mod file;
/// The implementation of the '`GenericParam`' table
pub mod genericparam;
/// The implementation of the '`GenericParamConstraint`' table
pub mod genericparamconstraint;
/// The implementation of the '`ImplMap`' table
pub mod implmap;
/// The implementation of the '`InterfaceImpl`' table
pub mod interfaceimpl;
/// The implementation of the '`ManifestResource`' table
pub mod manifestresource;
/// The implementation of the '`MemberRef`' table
pub mod memberref;
/// The implementation of the '`MethodDef`' table
pub mod methoddef;
/// The implementation of the '`MethodImpl`' table
pub mod methodimpl;
/// The implementation of the '`MethodPtr`' table
pub mod methodptr;
/// The implementation of the '`MethodSemantics`' table
pub mod methodsemantics;
/// The implementation of the '`MethodSpec`' table
pub mod methodspec;
/// The implementation of the '`Module`' table
pub mod module;
/// The implementation of the '`ModuleRef`' table
pub mod moduleref;
/// The implementation of the '`NestedClass`' table
pub mod nestedclass;
/// The implementation of the '`Param`' table
pub mod param;
/// The implementation of the '`ParamPtr`' table
pub mod paramptr;
/// The implementation of the '`Property`' table
pub mod property;
/// The implementation of the '`PropertyMap`' table
pub mod propertymap;
/// The implementation of the '`PropertyPtr`' table
pub mod propertyptr;
/// The implementation of the '`StandAloneSig`' table
pub mod standalonesig;
/// The implementation of the '`TypeDef`' table
pub mod typedef;
/// The implementation of the '`TypeRef`' table
pub mod typeref;
/// The implementation of the '`TypeSpec`' table
pub mod typespec;

pub use assembly::{AssemblyFlags, AssemblyHashAlgorithm, AssemblyRaw};
pub use assemblyos::AssemblyOsRaw;
pub use assemblyprocessor::AssemblyProcessorRaw;
pub use assemblyref::AssemblyRefRaw;
pub use assemblyrefos::AssemblyRefOsRaw;
pub use assemblyrefprocessor::AssemblyRefProcessorRaw;
pub use classlayout::ClassLayoutRaw;
pub use constant::ConstantRaw;
pub use customattribute::CustomAttributeRaw;
pub use declsecurity::DeclSecurityRaw;
pub use enclog::EncLogRaw;
pub use encmap::EncMapRaw;
pub use event::EventRaw;
pub use eventmap::EventMapRaw;
pub use eventptr::EventPtrRaw;
pub use exportedtype::ExportedTypeRaw;
pub use field::{FieldAttributes, FieldRaw};
pub use fieldlayout::FieldLayoutRaw;
pub use fieldmarshal::FieldMarshalRaw;
pub use fieldptr::FieldPtrRaw;
pub use fieldrva::FieldRvaRaw;
pub use file::{FileAttributes, FileRaw};
pub use genericparam::{GenericParamAttributes, GenericParamRaw};
pub use genericparamconstraint::GenericParamConstraintRaw;
pub use implmap::ImplMapRaw;
pub use interfaceimpl::InterfaceImplRaw;
pub use manifestresource::{ManifestResourceAttributes, ManifestResourceRaw};
pub use memberref::MemberRefRaw;
pub use methoddef::{MethodAttributes, MethodDefRaw, MethodImplAttributes};
pub use methodimpl::MethodImplRaw;
pub use methodptr::MethodPtrRaw;
pub use methodsemantics::{MethodSemanticsAttributes, MethodSemanticsRaw};
pub use methodspec::MethodSpecRaw;
pub use module::ModuleRaw;
pub use moduleref::ModuleRefRaw;
pub use nestedclass::NestedClassRaw;
pub use param::{ParamAttributes, ParamRaw};
pub use paramptr::ParamPtrRaw;
pub use property::PropertyRaw;
pub use propertymap::PropertyMapRaw;
pub use propertyptr::PropertyPtrRaw;
pub use standalonesig::StandAloneSigRaw;
pub use typedef::{TypeAttributes, TypeDefRaw};
pub use typeref::TypeRefRaw;
pub use types::{
    CodedIndex, CodedIndexKind, MetadataTable, RowDefinition, TableAccess, TableData, TableId,
    TableInfo, TableInfoRef, TableIterator, TableRowInfo,
};
pub use typespec::TypeSpecRaw;
