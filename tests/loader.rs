//! End-to-end loader scenarios over crafted metadata images.

mod common;

use common::{build_metadata, tables_stream, BlobHeap, RowBytes, StringsHeap};
use dotmeta::{
    AssemblyDefinition, Member, MetadataView, ModuleDefinition, Token, Version,
};
use std::sync::Arc;

const MODULE: usize = 0x00;
const TYPE_DEF: usize = 0x02;
const METHOD_DEF: usize = 0x06;
const ASSEMBLY: usize = 0x20;
const NESTED_CLASS: usize = 0x29;
const GENERIC_PARAM: usize = 0x2A;

/// A single-type, single-method assembly named HelloWorld 1.0.0.0
fn hello_world_image() -> Vec<u8> {
    let mut strings = StringsHeap::new();
    let module_name = strings.add("HelloWorld.exe");
    let module_type = strings.add("<Module>");
    let main_name = strings.add("Main");
    let assembly_name = strings.add("HelloWorld");

    let mut blobs = BlobHeap::new();
    // static void(): default convention, no params, void return
    let main_sig = blobs.add(&[0x00, 0x00, 0x01]);

    let module_row = RowBytes::new()
        .u16(0) // generation
        .idx(module_name)
        .idx(1) // mvid
        .idx(0) // encid
        .idx(0) // encbaseid
        .into_bytes();

    let typedef_row = RowBytes::new()
        .u32(0) // flags
        .idx(module_type)
        .idx(0) // namespace
        .idx(0) // extends (null)
        .idx(1) // field_list
        .idx(1) // method_list
        .into_bytes();

    let method_row = RowBytes::new()
        .u32(0) // rva
        .u16(0) // impl_flags
        .u16(0x0016) // flags
        .idx(main_name)
        .idx(main_sig)
        .idx(1) // param_list
        .into_bytes();

    let assembly_row = RowBytes::new()
        .u32(0x8004) // hash_alg_id: SHA1
        .u16(1) // major
        .u16(0) // minor
        .u16(0) // build
        .u16(0) // revision
        .u32(0) // flags
        .idx(0) // public_key
        .idx(assembly_name)
        .idx(0) // culture
        .into_bytes();

    let tables = tables_stream(
        0,
        &[
            (MODULE, 1, module_row),
            (TYPE_DEF, 1, typedef_row),
            (METHOD_DEF, 1, method_row),
            (ASSEMBLY, 1, assembly_row),
        ],
    );

    build_metadata(&[
        ("#~", tables),
        ("#Strings", strings.into_bytes()),
        ("#GUID", vec![0x11; 16]),
        ("#Blob", blobs.into_bytes()),
    ])
}

/// Three types in namespace N, with Three nested in Two, and One generic
/// over T
fn nested_types_image() -> Vec<u8> {
    let mut strings = StringsHeap::new();
    let module_name = strings.add("Nested.dll");
    let namespace = strings.add("N");
    let one = strings.add("One");
    let two = strings.add("Two");
    let three = strings.add("Three");
    let t_param = strings.add("T");

    let module_row = RowBytes::new()
        .u16(0)
        .idx(module_name)
        .idx(1)
        .idx(0)
        .idx(0)
        .into_bytes();

    let typedef = |name: u32, ns: u32| {
        RowBytes::new()
            .u32(0)
            .idx(name)
            .idx(ns)
            .idx(0)
            .idx(1)
            .idx(1)
            .into_bytes()
    };
    let mut typedef_rows = typedef(one, namespace);
    typedef_rows.extend(typedef(two, namespace));
    typedef_rows.extend(typedef(three, 0));

    let nested_row = RowBytes::new()
        .idx(3) // nested_class
        .idx(2) // enclosing_class
        .into_bytes();

    let generic_row = RowBytes::new()
        .u16(0) // number
        .u16(0) // flags
        .idx(2) // owner: TypeOrMethodDef tag 0 (TypeDef), row 1
        .idx(t_param)
        .into_bytes();

    let tables = tables_stream(
        (1u64 << NESTED_CLASS) | (1u64 << GENERIC_PARAM),
        &[
            (MODULE, 1, module_row),
            (TYPE_DEF, 3, typedef_rows),
            (NESTED_CLASS, 1, nested_row),
            (GENERIC_PARAM, 1, generic_row),
        ],
    );

    build_metadata(&[
        ("#~", tables),
        ("#Strings", strings.into_bytes()),
        ("#GUID", vec![0x22; 16]),
        ("#Blob", vec![0x00]),
    ])
}

#[test]
fn hello_world_assembly_identity() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    let assembly = AssemblyDefinition::from_view(view).unwrap();

    assert_eq!(assembly.name().unwrap(), "HelloWorld");
    assert_eq!(assembly.version().unwrap(), Version::new(1, 0, 0, 0));
    assert_eq!(assembly.culture().unwrap(), None);
    assert_eq!(assembly.token(), Token::new(0x2000_0001));
}

#[test]
fn single_module_wiring() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    let assembly = AssemblyDefinition::from_view(view).unwrap();

    let modules = assembly.modules().unwrap();
    assert_eq!(modules.len().unwrap(), 1);

    let manifest = assembly.manifest_module().unwrap();
    let first = modules.get(0).unwrap().unwrap();
    assert!(Arc::ptr_eq(&manifest, &first));

    let back = manifest.assembly().unwrap().unwrap();
    assert!(Arc::ptr_eq(&back, &assembly));

    assert_eq!(manifest.name().unwrap(), "HelloWorld.exe");
    assert_eq!(manifest.mvid().unwrap().to_bytes(), [0x11; 16]);
    assert_eq!(manifest.enc_id().unwrap(), None);
    assert_eq!(manifest.enc_base_id().unwrap(), None);
    assert_eq!(manifest.generation(), 0);
}

#[test]
fn method_navigation_and_signature() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let types = module.top_level_types().unwrap();
    assert_eq!(types.len().unwrap(), 1);
    let module_type = types.get(0).unwrap().unwrap();
    assert_eq!(module_type.name().unwrap(), "<Module>");
    assert!(module_type.base_type().unwrap().is_none());

    let methods = module_type.methods().unwrap();
    assert_eq!(methods.len().unwrap(), 1);
    let main = methods.get(0).unwrap().unwrap();
    assert_eq!(main.name().unwrap(), "Main");

    let signature = main.signature().unwrap();
    assert!(!signature.has_this);
    assert_eq!(signature.params.len(), 0);
    assert_eq!(
        signature.return_type.base,
        dotmeta::metadata::signatures::TypeSig::Void
    );

    let declaring = main.declaring_type().unwrap().unwrap();
    assert!(Arc::ptr_eq(&declaring, &module_type));
}

#[test]
fn lookup_member_is_identity_stable() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let first = module.lookup_member(Token::new(0x0200_0001)).unwrap();
    let second = module.lookup_member(Token::new(0x0200_0001)).unwrap();
    let (Member::Type(first), Member::Type(second)) = (first, second) else {
        panic!("expected type members");
    };
    assert!(Arc::ptr_eq(&first, &second));

    // the list and the cache agree on identity
    let listed = module.top_level_types().unwrap().get(0).unwrap().unwrap();
    assert!(Arc::ptr_eq(&listed, &first));
}

#[test]
fn lookup_failures_are_typed() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    assert!(matches!(
        module.lookup_member(Token::new(0x0200_0099)),
        Err(dotmeta::Error::MemberNotFound(_))
    ));
    // Param rows exist in the model's tables but not in its member set
    assert!(matches!(
        module.lookup_member(Token::new(0x0800_0001)),
        Err(dotmeta::Error::NotSupported)
    ));

    let hand_built = ModuleDefinition::new("Fresh");
    assert!(matches!(
        hand_built.lookup_member(Token::new(0x0200_0001)),
        Err(dotmeta::Error::NotSerialized)
    ));
}

#[test]
fn nested_types_shape() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let top_level = module.top_level_types().unwrap();
    assert_eq!(top_level.len().unwrap(), 2);

    let one = top_level.get(0).unwrap().unwrap();
    let two = top_level.get(1).unwrap().unwrap();
    assert_eq!(one.name().unwrap(), "One");
    assert_eq!(two.name().unwrap(), "Two");
    assert!(one.declaring_type().unwrap().is_none());
    assert!(two.declaring_type().unwrap().is_none());

    let nested = two.nested_types().unwrap();
    assert_eq!(nested.len().unwrap(), 1);
    let three = nested.get(0).unwrap().unwrap();
    assert_eq!(three.name().unwrap(), "Three");

    let declaring = three.declaring_type().unwrap().unwrap();
    assert!(Arc::ptr_eq(&declaring, &two));

    // declaring chain drives the full name
    assert_eq!(one.full_name().unwrap(), "N.One");
    assert_eq!(three.full_name().unwrap(), "N.Two+Three");

    // one's nested list is empty
    assert!(one.nested_types().unwrap().is_empty().unwrap());
}

#[test]
fn declaring_type_resolves_without_touching_lists() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    // Ask for the nested type directly; its declaring link must resolve from
    // the NestedClass table without anyone enumerating the parents first
    let Member::Type(three) = module.lookup_member(Token::new(0x0200_0003)).unwrap() else {
        panic!("expected a type");
    };

    let declaring = three.declaring_type().unwrap().unwrap();
    assert_eq!(declaring.name().unwrap(), "Two");

    // and it is the same instance the module later hands out
    let Member::Type(two) = module.lookup_member(Token::new(0x0200_0002)).unwrap() else {
        panic!("expected a type");
    };
    assert!(Arc::ptr_eq(&declaring, &two));
}

#[test]
fn generic_parameter_ownership() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let Member::Type(one) = module.lookup_member(Token::new(0x0200_0001)).unwrap() else {
        panic!("expected a type");
    };

    let params = one.generic_parameters().unwrap();
    assert_eq!(params.len().unwrap(), 1);
    let t = params.get(0).unwrap().unwrap();
    assert_eq!(t.name().unwrap(), "T");
    assert_eq!(t.number(), 0);

    match t.owner().unwrap().unwrap() {
        dotmeta::metadata::member::GenericParameterOwner::Type(owner) => {
            assert!(Arc::ptr_eq(&owner, &one));
        }
        _ => panic!("expected a type owner"),
    }

    // the other types have no generic parameters
    let Member::Type(two) = module.lookup_member(Token::new(0x0200_0002)).unwrap() else {
        panic!("expected a type");
    };
    assert!(two.generic_parameters().unwrap().is_empty().unwrap());
}

#[test]
fn renaming_reflects_in_full_name() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let one = module.top_level_types().unwrap().get(0).unwrap().unwrap();
    assert_eq!(one.full_name().unwrap(), "N.One");

    one.set_name("First").unwrap();
    assert_eq!(one.full_name().unwrap(), "N.First");

    one.set_namespace(Some("M".into())).unwrap();
    assert_eq!(one.full_name().unwrap(), "M.First");

    one.set_namespace(None).unwrap();
    assert_eq!(one.full_name().unwrap(), "First");
}

#[test]
fn moving_a_type_between_collections() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let top_level = module.top_level_types().unwrap();
    let two = top_level.get(1).unwrap().unwrap();
    let three = two.nested_types().unwrap().get(0).unwrap().unwrap();

    // while nested, the type cannot join another collection
    assert!(matches!(
        top_level.push(three.clone()),
        Err(dotmeta::Error::AlreadyOwned(_))
    ));

    // detach from the enclosing type, then promote to top level
    assert!(two.nested_types().unwrap().remove_item(&three).unwrap());
    assert!(three.declaring_type().unwrap().is_none());

    top_level.push(three.clone()).unwrap();
    assert_eq!(top_level.len().unwrap(), 3);
    assert!(three.declaring_type().unwrap().is_none());
    assert_eq!(three.full_name().unwrap(), "Three");
}

#[test]
fn user_constructed_graph() {
    let assembly = dotmeta::AssemblyDefinition::new("Fresh", Version::new(2, 1, 0, 0));
    let module = ModuleDefinition::new("Fresh.dll");

    assembly.modules().unwrap().push(module.clone()).unwrap();
    assert!(Arc::ptr_eq(
        &assembly.manifest_module().unwrap(),
        &module
    ));
    assert!(Arc::ptr_eq(
        &module.assembly().unwrap().unwrap(),
        &assembly
    ));

    let ty = dotmeta::TypeDefinition::new(Some("App".into()), "Program");
    module.top_level_types().unwrap().push(ty.clone()).unwrap();
    assert_eq!(ty.full_name().unwrap(), "App.Program");
    assert!(Arc::ptr_eq(
        &ty.module().unwrap().unwrap(),
        &module
    ));

    // a second module cannot claim the same type
    let other = ModuleDefinition::new("Other.dll");
    assert!(matches!(
        other.top_level_types().unwrap().push(ty.clone()),
        Err(dotmeta::Error::AlreadyOwned(_))
    ));
}

#[test]
fn lazy_fields_are_idempotent() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let types_first = module.top_level_types().unwrap();
    let types_second = module.top_level_types().unwrap();
    assert!(Arc::ptr_eq(&types_first, &types_second));

    let ty = types_first.get(0).unwrap().unwrap();
    let method = ty.methods().unwrap().get(0).unwrap().unwrap();
    let sig_first = method.signature().unwrap();
    let sig_second = method.signature().unwrap();
    assert!(Arc::ptr_eq(&sig_first, &sig_second));
}

#[test]
fn concurrent_first_touch_is_consistent() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    let module = ModuleDefinition::from_view(view).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let module = module.clone();
        handles.push(std::thread::spawn(move || {
            let types = module.top_level_types().unwrap();
            let one = types.get(0).unwrap().unwrap();
            (Arc::as_ptr(&types) as usize, Arc::as_ptr(&one) as usize)
        }));
    }

    let results: Vec<(usize, usize)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results {
        assert_eq!(result, &results[0]);
    }
}

#[test]
fn metadata_only_view_has_no_image() {
    let view = MetadataView::from_metadata(hello_world_image()).unwrap();
    assert!(view.cor20().is_none());
    assert!(view.image().is_none());
    assert_eq!(view.root().version, "v4.0.30319");
    assert_eq!(view.tables().unwrap().table_count(), 4);
}

#[test]
fn netmodule_without_manifest_is_rejected_as_assembly() {
    let view = MetadataView::from_metadata(nested_types_image()).unwrap();
    assert!(AssemblyDefinition::from_view(view.clone()).is_err());
    // while the module itself loads fine
    assert!(ModuleDefinition::from_view(view).is_ok());
}
