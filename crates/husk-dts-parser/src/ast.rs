//! AST types for TypeScript declaration files.
//!
//! Every node owns its children outright and carries the [`Span`] of the
//! source it was parsed from. Nodes are built once by the parser and never
//! mutated afterwards.

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

pub use husk_dts_lexer::{SourceId, Span};

/// An identifier with its source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A string literal with its span; `value` has quotes removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrLit {
    pub value: String,
    pub span: Span,
}

/// A dotted name: `A`, `A.B.C`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityName {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl EntityName {
    /// The name when it has exactly one segment.
    pub fn as_single(&self) -> Option<&Ident> {
        match self.segments.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn last(&self) -> Option<&Ident> {
        self.segments.last()
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
        }
        Ok(())
    }
}

/// A parsed .d.ts file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub source: SourceId,
    pub statements: Vec<Statement>,
    /// `/// <reference ... />` directives in source order.
    pub references: Vec<Reference>,
    pub span: Span,
}

/// A triple-slash reference directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceKind {
    /// `path="./other.d.ts"`
    Path,
    /// `types="node"`
    Types,
    /// `lib="es2015"`
    Lib,
    /// `no-default-lib="true"`
    NoDefaultLib,
}

/// A top-level or block-level statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    Var(VarDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    /// `namespace A.B { ... }` or `module A { ... }`
    Namespace(NamespaceDecl),
    /// `declare module "name" { ... }`
    AmbientModule(AmbientModuleDecl),
    /// `declare global { ... }`
    Global(GlobalDecl),
    Import(ImportDecl),
    Export(ExportDecl),
    /// The inner declaration followed a `declare` keyword.
    Ambient(Box<Statement>),
}

impl Statement {
    /// Export statements are exports; an ambient wrapper is an export iff
    /// the declaration it wraps is.
    pub fn is_export(&self) -> bool {
        match &self.kind {
            StmtKind::Export(_) => true,
            StmtKind::Ambient(inner) => inner.is_export(),
            _ => false,
        }
    }

    /// The declaration beneath any `declare` wrappers.
    pub fn unwrap_ambient(&self) -> &Statement {
        match &self.kind {
            StmtKind::Ambient(inner) => inner.unwrap_ambient(),
            _ => self,
        }
    }

    /// The name this statement introduces, if it declares exactly one.
    pub fn declared_name(&self) -> Option<&str> {
        match &self.kind {
            StmtKind::Var(v) => match v.declarators.as_slice() {
                [only] => Some(&only.name.name),
                _ => None,
            },
            StmtKind::Function(f) => Some(&f.name.name),
            StmtKind::Class(c) => c.name.as_ref().map(|n| n.name.as_str()),
            StmtKind::Interface(i) => Some(&i.name.name),
            StmtKind::TypeAlias(t) => Some(&t.name.name),
            StmtKind::Enum(e) => Some(&e.name.name),
            StmtKind::Namespace(n) => n.name.last().map(|i| i.name.as_str()),
            StmtKind::AmbientModule(m) => Some(&m.name.value),
            StmtKind::Global(_) | StmtKind::Import(_) => None,
            StmtKind::Export(e) => match &e.kind {
                ExportKind::Declaration(inner) => inner.declared_name(),
                _ => None,
            },
            StmtKind::Ambient(inner) => inner.declared_name(),
        }
    }
}

// ----- Declarations -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

/// `declare const a: A, b: B;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<VarDeclarator>,
}

impl VarDecl {
    /// `const` bindings are read-only.
    pub fn is_readonly(&self) -> bool {
        self.kind == VarKind::Const
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDeclarator {
    pub name: Ident,
    pub ty: Option<TypeAnn>,
    /// Literal initializer, only legal on `const` (`declare const x = 1;`).
    pub init: Option<Literal>,
    pub span: Span,
}

/// A function declaration: `function name<T>(params): ReturnType;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Ident,
    pub signature: Signature,
}

/// Type parameters, parameters and return type shared by functions,
/// methods and call/construct signatures.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Signature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnn>,
}

/// A class declaration: `class Name<T> extends Base implements I { members }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    /// `None` only for `export default class { ... }`.
    pub name: Option<Ident>,
    pub is_abstract: bool,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<ClassMember>,
}

/// An interface declaration: `interface Name<T> extends Base { members }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub members: Vec<InterfaceMember>,
}

/// A type alias: `type Name<T> = Type;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAliasDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeAnn,
}

/// `const enum Name { A = 1, B = "b", C }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub is_const: bool,
    pub name: Ident,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: PropertyKey,
    pub init: Option<Literal>,
    pub span: Span,
}

/// `namespace A.B { ... }`; the body is an ambient context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceDecl {
    pub name: EntityName,
    pub body: Vec<Statement>,
}

/// `declare module "name" { ... }`, or the shorthand `declare module "name";`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbientModuleDecl {
    pub name: StrLit,
    pub body: Option<Vec<Statement>>,
}

/// `declare global { ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalDecl {
    pub body: Vec<Statement>,
}

// ----- Imports and exports -----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDecl {
    /// `import type ...`
    pub type_only: bool,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportKind {
    /// `import "polyfill";`
    SideEffect { source: StrLit },
    /// `import def, { a, b as c } from "m";` / `import * as ns from "m";`
    Clause {
        default: Option<Ident>,
        bindings: Option<ImportBindings>,
        source: StrLit,
    },
    /// `import x = require("m");` / `import x = A.B;`
    Equals { name: Ident, target: ImportTarget },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportBindings {
    Namespace(Ident),
    Named(Vec<ImportSpecifier>),
}

/// `imported as local`; `local` repeats `imported` when there is no alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSpecifier {
    pub imported: Ident,
    pub local: Ident,
    pub type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportTarget {
    Require(StrLit),
    Entity(EntityName),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDecl {
    pub kind: ExportKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExportKind {
    /// `export <declaration>`, including `export declare ...`.
    Declaration(Box<Statement>),
    /// `export default ...`
    Default(DefaultExport),
    /// `export { a, b as c } [from "m"];`
    Named {
        type_only: bool,
        specifiers: Vec<ExportSpecifier>,
        source: Option<StrLit>,
    },
    /// `export * [as ns] from "m";`
    All {
        type_only: bool,
        alias: Option<Ident>,
        source: StrLit,
    },
    /// `export = Name;`
    Assignment(EntityName),
    /// `export as namespace Name;`
    AsNamespace(Ident),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DefaultExport {
    Declaration(Box<Statement>),
    Name(EntityName),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSpecifier {
    pub local: Ident,
    pub exported: Option<Ident>,
    pub type_only: bool,
    pub span: Span,
}

// ----- Supporting structures -----

/// A generic type parameter: `const in out T extends C = D`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeParam {
    pub name: Ident,
    pub constraint: Option<TypeAnn>,
    pub default: Option<TypeAnn>,
    pub is_in: bool,
    pub is_out: bool,
    pub is_const: bool,
    pub span: Span,
}

/// A function/method parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: BindingName,
    pub ty: Option<TypeAnn>,
    pub optional: bool,
    pub rest: bool,
    /// Parameter-property modifiers in constructors.
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BindingName {
    /// Also used for the `this` pseudo-parameter.
    Ident(Ident),
    /// `{ a, b }` or `[a, b]`; only the span is kept.
    Pattern(Span),
}

impl BindingName {
    pub fn span(&self) -> Span {
        match self {
            BindingName::Ident(ident) => ident.span,
            BindingName::Pattern(span) => *span,
        }
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            BindingName::Ident(ident) => Some(ident),
            BindingName::Pattern(_) => None,
        }
    }
}

/// A member or enum member name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyKey {
    Ident(Ident),
    String(StrLit),
    Number { value: String, span: Span },
    Computed { expr: KeyExpr, span: Span },
    /// `#name`
    Private(Ident),
}

impl PropertyKey {
    pub fn span(&self) -> Span {
        match self {
            PropertyKey::Ident(ident) | PropertyKey::Private(ident) => ident.span,
            PropertyKey::String(s) => s.span,
            PropertyKey::Number { span, .. } | PropertyKey::Computed { span, .. } => *span,
        }
    }

    /// The statically known name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            PropertyKey::Ident(ident) | PropertyKey::Private(ident) => Some(&ident.name),
            PropertyKey::String(s) => Some(&s.value),
            PropertyKey::Number { value, .. } => Some(value),
            PropertyKey::Computed { .. } => None,
        }
    }
}

/// The expression inside a computed key: `[Symbol.iterator]`, `["a-b"]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum KeyExpr {
    Name(EntityName),
    String(String),
    Number(String),
}

bitflags! {
    /// Access and mutability modifiers on class members and parameters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const READONLY = 1 << 4;
        const ABSTRACT = 1 << 5;
        const ASYNC = 1 << 6;
        const OVERRIDE = 1 << 7;
        const DECLARE = 1 << 8;
        const ACCESSOR = 1 << 9;
    }
}

impl Modifiers {
    pub fn visibility(self) -> Visibility {
        if self.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

/// Visibility modifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A literal in type, initializer or enum position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    String(String),
    /// Source text, including a leading `-` for negative numbers.
    Number(String),
    /// Digits without the `n` suffix, including a leading `-` if negative.
    BigInt(String),
    Boolean(bool),
}

// ----- Members -----

/// A member of an interface or object type literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceMember {
    pub kind: InterfaceMemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InterfaceMemberKind {
    /// `<T>(params): R`
    Call(Signature),
    /// `new (params): R`
    Construct(Signature),
    Property(PropertySignature),
    Method(MethodSignature),
    Index(IndexSignature),
    Getter(GetAccessor),
    Setter(SetAccessor),
}

/// `readonly name?: Type`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySignature {
    pub key: PropertyKey,
    pub optional: bool,
    pub readonly: bool,
    pub ty: Option<TypeAnn>,
}

/// `name?<T>(params): R`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSignature {
    pub key: PropertyKey,
    pub optional: bool,
    pub signature: Signature,
}

/// `readonly [key: K]: V`. The key type is not restricted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSignature {
    pub readonly: bool,
    pub param: Ident,
    pub key_type: TypeAnn,
    pub ty: TypeAnn,
}

/// `get name(): T`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetAccessor {
    pub key: PropertyKey,
    pub return_type: Option<TypeAnn>,
}

/// `set name(value: T)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetAccessor {
    pub key: PropertyKey,
    pub param: Param,
}

/// A member of a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClassMemberKind {
    /// `constructor(params);`
    Constructor(Signature),
    Property(ClassProperty),
    Method(MethodSignature),
    Index(IndexSignature),
    Getter(GetAccessor),
    Setter(SetAccessor),
}

/// A property in a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProperty {
    pub key: PropertyKey,
    pub optional: bool,
    pub ty: Option<TypeAnn>,
}

// ----- Types -----

/// A type annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAnn {
    pub kind: TypeAnnKind,
    pub span: Span,
}

impl TypeAnn {
    pub fn new(kind: TypeAnnKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeAnnKind {
    /// `string`, `number`, `unique symbol`, `intrinsic`, ...
    Primitive(Primitive),
    /// `"GET"`, `1`, `-1`, `10n`, `true`
    Literal(Literal),
    /// `Promise<T>`, `A.B`
    Reference(TypeRef),
    /// `T[]`
    Array(Box<TypeAnn>),
    /// `[T, name?: U, ...V[]]`
    Tuple(Vec<TupleElement>),
    /// `A | B | C`, flattened
    Union(Vec<TypeAnn>),
    /// `A & B & C`, flattened
    Intersection(Vec<TypeAnn>),
    /// `<T>(a: T) => R`
    Function(Box<FunctionType>),
    /// `abstract new (a: T) => R`
    Constructor(Box<ConstructorType>),
    /// `{ key: Type; method(): void }`
    Object(Vec<InterfaceMember>),
    /// `(T)`
    Parenthesized(Box<TypeAnn>),
    /// `T[K]`
    IndexedAccess {
        object: Box<TypeAnn>,
        index: Box<TypeAnn>,
    },
    /// `T extends U ? X : Y`
    Conditional(Box<ConditionalType>),
    /// `infer T extends C`
    Infer(Box<InferType>),
    /// `{ readonly [K in keyof T as N]-?: T[K] }`
    Mapped(Box<MappedType>),
    /// `` `prefix_${T}` ``
    TemplateLiteral(Vec<TemplatePart>),
    /// `keyof T`
    KeyOf(Box<TypeAnn>),
    /// `typeof x.y<T>`
    TypeOf(Box<TypeQuery>),
    /// `import("m").A<T>`
    Import(Box<ImportType>),
    /// `x is T`, `asserts x`, `asserts this is T`
    Predicate(Box<TypePredicate>),
    /// `this`
    This,
    /// `...T` in tuples
    Rest(Box<TypeAnn>),
    /// `T?` in tuples
    Optional(Box<TypeAnn>),
    /// `readonly T[]`
    Readonly(Box<TypeAnn>),
}

/// A primitive TypeScript type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    UniqueSymbol,
    Void,
    Null,
    Undefined,
    Never,
    Any,
    Unknown,
    Object,
    Intrinsic,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
            Primitive::Symbol => "symbol",
            Primitive::UniqueSymbol => "unique symbol",
            Primitive::Void => "void",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
            Primitive::Never => "never",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Object => "object",
            Primitive::Intrinsic => "intrinsic",
        };
        f.write_str(s)
    }
}

/// A reference to a named type with optional type arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeRef {
    pub name: EntityName,
    pub type_args: Option<Vec<TypeAnn>>,
    pub span: Span,
}

/// A function type: `<T>(params) => ReturnType`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionType {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeAnn,
}

/// A constructor type: `abstract new <T>(params) => ReturnType`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorType {
    pub is_abstract: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeAnn,
}

/// A conditional type: `check extends extends_type ? true_type : false_type`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalType {
    pub check: TypeAnn,
    pub extends: TypeAnn,
    pub true_type: TypeAnn,
    pub false_type: TypeAnn,
}

/// `infer T` with an optional `extends` constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferType {
    pub param: Ident,
    pub constraint: Option<TypeAnn>,
}

/// A mapped type: `{ [K in C as N]: V }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedType {
    pub key: Ident,
    pub constraint: TypeAnn,
    /// Key remapping: `as N`
    pub name_type: Option<TypeAnn>,
    pub readonly: MappedModifier,
    pub optional: MappedModifier,
    pub value: Option<TypeAnn>,
}

/// A `readonly`/`?` modifier in a mapped type: `+`, `-`, or absent.
///
/// A bare `readonly` or `?` is [`MappedModifier::Add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MappedModifier {
    #[default]
    None,
    Add,
    Remove,
}

/// A part of a template literal type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplatePart {
    Text(String),
    Type(TypeAnn),
}

/// The operand of `typeof`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeQuery {
    pub target: TypeQueryTarget,
    pub type_args: Option<Vec<TypeAnn>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeQueryTarget {
    Name(EntityName),
    Import(ImportType),
}

/// `import("specifier").Qualifier<Args>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportType {
    pub specifier: StrLit,
    pub qualifier: Option<EntityName>,
    pub type_args: Option<Vec<TypeAnn>>,
}

/// A type predicate in return position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypePredicate {
    pub asserts: bool,
    pub subject: PredicateSubject,
    /// Absent for `asserts x`.
    pub ty: Option<TypeAnn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PredicateSubject {
    Ident(Ident),
    This(Span),
}

/// An element in a tuple type.
///
/// Labeled elements record `?` and `...` here; unlabeled ones wrap their
/// type in [`TypeAnnKind::Optional`] / [`TypeAnnKind::Rest`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleElement {
    pub label: Option<Ident>,
    pub optional: bool,
    pub rest: bool,
    pub ty: TypeAnn,
    pub span: Span,
}
