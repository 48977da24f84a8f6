//! Type expression parsing: precedence, postfix forms, disambiguation and
//! recovery.

use husk_dts_parser::ast::{Primitive, TypeAnn, TypeAnnKind};
use husk_dts_parser::{parse_type_str, DiagnosticKind};

fn ty(src: &str) -> TypeAnn {
    let (ty, diagnostics) = parse_type_str(src);
    assert!(diagnostics.is_empty(), "{src}: {diagnostics:?}");
    let Some(ty) = ty else {
        panic!("{src}: no type parsed");
    };
    ty
}

fn is_ref(ty: &TypeAnn, name: &str) -> bool {
    matches!(&ty.kind, TypeAnnKind::Reference(r) if r.name.to_string() == name)
}

#[test]
fn test_intersection_binds_tighter_than_union() {
    let TypeAnnKind::Union(members) = ty("A | B & C").kind else {
        panic!("expected union");
    };
    assert_eq!(members.len(), 2);
    assert!(is_ref(&members[0], "A"));
    let TypeAnnKind::Intersection(parts) = &members[1].kind else {
        panic!("expected intersection");
    };
    assert!(is_ref(&parts[0], "B"));
    assert!(is_ref(&parts[1], "C"));
}

#[test]
fn test_union_is_flat() {
    let TypeAnnKind::Union(members) = ty("A | B & C | D").kind else {
        panic!("expected union");
    };
    assert_eq!(members.len(), 3);
    assert!(is_ref(&members[0], "A"));
    assert!(matches!(members[1].kind, TypeAnnKind::Intersection(_)));
    assert!(is_ref(&members[2], "D"));
}

#[test]
fn test_leading_separator_tolerated() {
    let TypeAnnKind::Union(members) = ty("| 'a' | 'b'").kind else {
        panic!("expected union");
    };
    assert_eq!(members.len(), 2);
    let TypeAnnKind::Intersection(parts) = ty("& A & B").kind else {
        panic!("expected intersection");
    };
    assert_eq!(parts.len(), 2);
}

#[test]
fn test_array_postfix() {
    let TypeAnnKind::Array(elem) = ty("string[]").kind else {
        panic!("expected array");
    };
    assert_eq!(elem.kind, TypeAnnKind::Primitive(Primitive::String));
}

#[test]
fn test_indexed_access_postfix() {
    let TypeAnnKind::IndexedAccess { object, index } = ty("T[K]").kind else {
        panic!("expected indexed access");
    };
    assert!(is_ref(&object, "T"));
    assert!(is_ref(&index, "K"));
}

#[test]
fn test_keyof_applies_to_array() {
    let TypeAnnKind::KeyOf(inner) = ty("keyof T[]").kind else {
        panic!("expected keyof");
    };
    let TypeAnnKind::Array(elem) = &inner.kind else {
        panic!("expected keyof (T[])");
    };
    assert!(is_ref(elem, "T"));
}

#[test]
fn test_empty_parens_arrow_is_function_type() {
    for src in ["() => void", "(() => void)", "(a: string, b?: number) => void"] {
        let parsed = ty(src);
        let kind = match &parsed.kind {
            TypeAnnKind::Parenthesized(inner) => &inner.kind,
            other => other,
        };
        assert!(matches!(kind, TypeAnnKind::Function(_)), "{src}: {kind:?}");
    }
}

#[test]
fn test_reparsing_function_type_is_stable() {
    let src = "<T>(value: T) => Promise<T>";
    let first = ty(src);
    let TypeAnnKind::Function(f) = &first.kind else {
        panic!("expected function type");
    };
    assert_eq!(f.type_params.len(), 1);
    let again = ty(&src[first.span.range()]);
    assert_eq!(again.kind, first.kind);
}

#[test]
fn test_parenthesized_type_is_not_a_function() {
    let TypeAnnKind::Array(elem) = ty("(string | number)[]").kind else {
        panic!("expected array");
    };
    assert!(matches!(elem.kind, TypeAnnKind::Parenthesized(_)));
}

#[test]
fn test_conditional_with_infer() {
    let TypeAnnKind::Conditional(cond) = ty("T extends Promise<infer U> ? U : never").kind else {
        panic!("expected conditional");
    };
    assert!(is_ref(&cond.check, "T"));
    assert_eq!(cond.false_type.kind, TypeAnnKind::Primitive(Primitive::Never));
    let TypeAnnKind::Reference(promise) = &cond.extends.kind else {
        panic!("expected reference");
    };
    let Some(args) = &promise.type_args else {
        panic!("expected type args");
    };
    assert!(matches!(args[0].kind, TypeAnnKind::Infer(_)));
}

#[test]
fn test_infer_constraint_inside_extends_clause() {
    let TypeAnnKind::Conditional(cond) =
        ty("T extends [infer H extends string, ...infer R] ? H : never").kind
    else {
        panic!("expected conditional");
    };
    let TypeAnnKind::Tuple(elements) = &cond.extends.kind else {
        panic!("expected tuple");
    };
    let TypeAnnKind::Infer(infer) = &elements[0].ty.kind else {
        panic!("expected infer");
    };
    assert_eq!(infer.param.name, "H");
    assert!(infer.constraint.is_some());
}

#[test]
fn test_mapped_type_modifiers() {
    let TypeAnnKind::Mapped(mapped) = ty("{ -readonly [K in keyof T]?: T[K] }").kind else {
        panic!("expected mapped type");
    };
    assert_eq!(mapped.key.name, "K");
    assert!(matches!(mapped.constraint.kind, TypeAnnKind::KeyOf(_)));
    assert!(mapped.value.is_some());
}

#[test]
fn test_template_literal_type() {
    let TypeAnnKind::TemplateLiteral(parts) = ty("`on${Capitalize<E>}`").kind else {
        panic!("expected template literal");
    };
    assert!(parts.len() >= 2);
}

#[test]
fn test_missing_close_angle_recovers() {
    let (ty, diagnostics) = parse_type_str("Array<string");
    let Some(ty) = ty else {
        panic!("expected a partial type");
    };
    assert!(is_ref(&ty, "Array"));
    assert!(!diagnostics.is_empty());
}

#[test]
fn test_unterminated_object_type_keeps_members() {
    let (ty, diagnostics) = parse_type_str("{ a: string, ");
    let Some(ty) = ty else {
        panic!("expected a partial type");
    };
    let TypeAnnKind::Object(members) = &ty.kind else {
        panic!("expected object type, got {:?}", ty.kind);
    };
    assert_eq!(members.len(), 1);
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::ExpectedToken && d.message.contains('}')));
}

#[test]
fn test_trailing_tokens_reported() {
    let (ty, diagnostics) = parse_type_str("string number");
    assert!(ty.is_some());
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnexpectedToken));
}
