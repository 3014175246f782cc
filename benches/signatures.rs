//! Benchmarks for signature encoding.
//!
//! Tests encoding performance for the signature kinds written to the blob heap:
//! - Method signatures (simple, instance, generic, on generic type instances)
//! - Field signatures (primitives, arrays, class references, modifiers)
//! - Property signatures
//! - Type specification and generic instantiation signatures

extern crate cilsig;

use cilsig::metadata::{
    module::TypeTokenTable,
    signatures::{
        encode_field_signature, encode_generic_inst_signature, encode_method_signature,
        encode_method_signature_resolved, encode_property_signature, encode_typespec_signature,
        FieldSignatureDescriptor, MethodSignatureDescriptor, ParamDescriptor,
        PropertySignatureDescriptor,
    },
    token::Token,
    typesystem::{NominalType, PrimitiveKind, TypeDescriptor},
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn list() -> TypeDescriptor {
    TypeDescriptor::class("System.Collections.Generic", "List`1")
}

fn dictionary() -> TypeDescriptor {
    TypeDescriptor::class("System.Collections.Generic", "Dictionary`2")
}

fn is_volatile() -> NominalType {
    NominalType::class("System.Runtime.CompilerServices", "IsVolatile")
}

fn module() -> TypeTokenTable {
    let mut module = TypeTokenTable::new();
    module
        .insert_type(
            NominalType::class("System.Collections.Generic", "List`1"),
            Token::new(0x0100_0012),
        )
        .insert_type(
            NominalType::class("System.Collections.Generic", "Dictionary`2"),
            Token::new(0x0100_0013),
        )
        .insert_type(NominalType::class("System", "Uri"), Token::new(0x0200_0002))
        .insert_type(is_volatile(), Token::new(0x0100_0014));
    module
}

/// Benchmark encoding a simple void method with no parameters.
/// Signature: void Method()
fn bench_method_signature_void_no_params(c: &mut Criterion) {
    let module = module();
    let method = MethodSignatureDescriptor::new("Method");

    c.bench_function("sig_method_void_no_params", |b| {
        b.iter(|| {
            let sig = encode_method_signature(&module, black_box(&method)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a method with primitive parameters.
/// Signature: int Method(int a, string b, bool c)
fn bench_method_signature_primitives(c: &mut Criterion) {
    let module = module();
    let method = MethodSignatureDescriptor::new("Method")
        .returns(PrimitiveKind::I4.into())
        .param(PrimitiveKind::I4.into())
        .param(PrimitiveKind::String.into())
        .param(PrimitiveKind::Boolean.into());

    c.bench_function("sig_method_primitives", |b| {
        b.iter(|| {
            let sig = encode_method_signature(&module, black_box(&method)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a generic instance method.
/// Signature: T Method<T>(ref T item)
fn bench_method_signature_generic(c: &mut Criterion) {
    let module = module();
    let method = MethodSignatureDescriptor::new("Method")
        .instance()
        .generic(1)
        .returns(TypeDescriptor::method_param(0))
        .param(TypeDescriptor::by_ref(TypeDescriptor::method_param(0)));

    c.bench_function("sig_method_generic", |b| {
        b.iter(|| {
            let sig = encode_method_signature(&module, black_box(&method)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a method reached through a generic type instance.
/// Signature: instance TOut List<int>.ConvertAll<TOut>(!0)
fn bench_method_signature_resolved(c: &mut Criterion) {
    let mut module = module();
    module
        .insert_definition(
            MethodSignatureDescriptor::new("ConvertAll")
                .declared_on(list())
                .instance()
                .generic(1)
                .returns(TypeDescriptor::method_param(0))
                .param(TypeDescriptor::type_param(0)),
        )
        .unwrap();

    let method = MethodSignatureDescriptor::new("ConvertAll")
        .declared_on(TypeDescriptor::generic_inst(
            list(),
            vec![PrimitiveKind::I4.into()],
        ))
        .instance()
        .generic(1)
        .returns(TypeDescriptor::method_param(0))
        .param(PrimitiveKind::I4.into());

    c.bench_function("sig_method_resolved", |b| {
        b.iter(|| {
            let sig = encode_method_signature_resolved(&module, black_box(&method)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a method with many parameters.
/// Signature: void Method(int, int, int, int, int, int, int, int)
fn bench_method_signature_many_params(c: &mut Criterion) {
    let module = module();
    let mut method = MethodSignatureDescriptor::new("Method");
    for _ in 0..8 {
        method = method.param(PrimitiveKind::I4.into());
    }

    c.bench_function("sig_method_many_params", |b| {
        b.iter(|| {
            let sig = encode_method_signature(&module, black_box(&method)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a simple primitive field.
/// Signature: int field
fn bench_field_signature_primitive(c: &mut Criterion) {
    let module = module();
    let field = FieldSignatureDescriptor::new("field", PrimitiveKind::I4.into());

    c.bench_function("sig_field_primitive", |b| {
        b.iter(|| {
            let sig = encode_field_signature(&module, black_box(&field)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding an array field.
/// Signature: int[][] field
fn bench_field_signature_array(c: &mut Criterion) {
    let module = module();
    let field = FieldSignatureDescriptor::new(
        "field",
        TypeDescriptor::sz_array(TypeDescriptor::sz_array(PrimitiveKind::I4.into())),
    );

    c.bench_function("sig_field_array", |b| {
        b.iter(|| {
            let sig = encode_field_signature(&module, black_box(&field)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a volatile field with a class type reference.
/// Signature: class Uri modreq(IsVolatile) field
fn bench_field_signature_class_modreq(c: &mut Criterion) {
    let module = module();
    let field = FieldSignatureDescriptor::new("field", TypeDescriptor::class("System", "Uri"))
        .modifier(cilsig::metadata::signatures::CustomModifier::required(
            is_volatile(),
        ));

    c.bench_function("sig_field_class_modreq", |b| {
        b.iter(|| {
            let sig = encode_field_signature(&module, black_box(&field)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding an indexer property.
/// Signature: string this[int index] { get; }
fn bench_property_signature_indexer(c: &mut Criterion) {
    let module = module();
    let property = PropertySignatureDescriptor::new("Item", PrimitiveKind::String.into())
        .index(ParamDescriptor::new(PrimitiveKind::I4.into()));

    c.bench_function("sig_property_indexer", |b| {
        b.iter(|| {
            let sig = encode_property_signature(&module, black_box(&property)).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding a generic type with multiple type arguments.
/// Type: Dictionary<string, List<int>>
fn bench_generic_inst_multi_arg(c: &mut Criterion) {
    let module = module();
    let arguments = vec![
        PrimitiveKind::String.into(),
        TypeDescriptor::generic_inst(list(), vec![PrimitiveKind::I4.into()]),
    ];
    let definition = dictionary();

    c.bench_function("sig_generic_inst_multi_arg", |b| {
        b.iter(|| {
            let sig =
                encode_generic_inst_signature(&module, black_box(&definition), &arguments).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding an array type specification.
/// Type: List<int>[]
fn bench_type_spec_array(c: &mut Criterion) {
    let module = module();
    let ty = TypeDescriptor::sz_array(TypeDescriptor::generic_inst(
        list(),
        vec![PrimitiveKind::I4.into()],
    ));

    c.bench_function("sig_typespec_array", |b| {
        b.iter(|| {
            let sig = encode_typespec_signature(&module, black_box(&ty)).unwrap();
            black_box(sig)
        });
    });
}

criterion_group!(
    benches,
    // Method signatures
    bench_method_signature_void_no_params,
    bench_method_signature_primitives,
    bench_method_signature_generic,
    bench_method_signature_resolved,
    bench_method_signature_many_params,
    // Field signatures
    bench_field_signature_primitive,
    bench_field_signature_array,
    bench_field_signature_class_modreq,
    // Property signatures
    bench_property_signature_indexer,
    // Type specification signatures
    bench_generic_inst_multi_arg,
    bench_type_spec_array,
);
criterion_main!(benches);
