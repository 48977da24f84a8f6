//! Sorting a parsed module's top-level statements into registration buckets.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::ast::{ExportKind, Module, Statement, StmtKind};

/// The partition of a module's declarations.
///
/// Statements are borrowed from the module; nothing is cloned.
#[derive(Debug, Default, Serialize)]
pub struct Classification<'a> {
    /// Whether any top-level statement is an export. Decides how ordinary
    /// statements are routed.
    pub has_top_level_exports: bool,
    /// Bodies of `declare module "name"` blocks, keyed by specifier. Repeated
    /// blocks for the same specifier are merged in source order.
    pub named_modules: IndexMap<String, Vec<&'a Statement>>,
    pub global: Vec<&'a Statement>,
    pub package: Vec<&'a Statement>,
}

/// Classify the top-level statements of `module`.
pub fn classify(module: &Module) -> Classification<'_> {
    let mut out = Classification {
        has_top_level_exports: module.statements.iter().any(Statement::is_export),
        ..Classification::default()
    };

    for stmt in &module.statements {
        match &stmt.unwrap_ambient().kind {
            StmtKind::AmbientModule(decl) => {
                let entry = out.named_modules.entry(decl.name.value.clone()).or_default();
                if let Some(body) = &decl.body {
                    entry.extend(body);
                }
            }
            StmtKind::Global(decl) => out.global.extend(&decl.body),
            _ if !out.has_top_level_exports => out.global.push(stmt),
            _ if stmt.is_export() => match expand_export_assignment(module, stmt) {
                Some(body) => out.package.extend(body),
                None => out.package.push(stmt),
            },
            _ => out.global.push(stmt),
        }
    }

    debug!(
        exports = out.has_top_level_exports,
        named_modules = out.named_modules.len(),
        global = out.global.len(),
        package = out.package.len(),
        "classified module"
    );
    out
}

/// For `export = Name`, the merged bodies of every top-level namespace
/// called `Name`. `None` when the statement is something else or no such
/// namespace exists.
fn expand_export_assignment<'a>(
    module: &'a Module,
    stmt: &Statement,
) -> Option<Vec<&'a Statement>> {
    let StmtKind::Export(export) = &stmt.unwrap_ambient().kind else {
        return None;
    };
    let ExportKind::Assignment(target) = &export.kind else {
        return None;
    };
    let name = &target.as_single()?.name;

    let mut body = Vec::new();
    let mut found = false;
    for candidate in &module.statements {
        match &candidate.unwrap_ambient().kind {
            StmtKind::Namespace(ns) if ns.name.as_single().is_some_and(|id| id.name == *name) => {
                found = true;
                body.extend(&ns.body);
            }
            _ => {}
        }
    }
    found.then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, SourceId};

    fn parsed(src: &str) -> Module {
        let out = parse(src, SourceId(0));
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        out.module
    }

    #[test]
    fn test_no_exports_goes_global() {
        let module = parsed("declare var x: string;");
        let c = classify(&module);
        assert!(!c.has_top_level_exports);
        assert_eq!(c.global.len(), 1);
        assert!(c.package.is_empty());
        assert!(c.named_modules.is_empty());
    }

    #[test]
    fn test_exported_interface_goes_to_package() {
        let module = parsed("export interface Foo { x: number }");
        let c = classify(&module);
        assert!(c.has_top_level_exports);
        assert_eq!(c.package.len(), 1);
        assert!(c.global.is_empty());
    }

    #[test]
    fn test_named_module_extracted() {
        let module = parsed(r#"declare module "lodash" { export function map(): void }"#);
        let c = classify(&module);
        assert_eq!(c.named_modules.len(), 1);
        let Some(body) = c.named_modules.get("lodash") else {
            panic!("expected lodash module");
        };
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].declared_name(), Some("map"));
        assert!(c.global.is_empty());
        assert!(c.package.is_empty());
    }

    #[test]
    fn test_export_equals_expands_namespace() {
        let module = parsed("declare namespace Foo { export const bar: number } export = Foo;");
        let c = classify(&module);
        assert!(c.has_top_level_exports);
        assert_eq!(c.package.len(), 1);
        assert_eq!(c.package[0].declared_name(), Some("bar"));
        // the namespace itself is not exported
        assert_eq!(c.global.len(), 1);
        assert_eq!(c.global[0].declared_name(), Some("Foo"));
    }

    #[test]
    fn test_all_buckets_populated() {
        let module = parsed(
            r#"
            declare global { interface Window { foo: string } }
            declare module "pkg" { export const a: number }
            export interface Bar { y: string }
            "#,
        );
        let c = classify(&module);
        assert_eq!(c.global.len(), 1);
        assert_eq!(c.global[0].declared_name(), Some("Window"));
        assert_eq!(c.named_modules["pkg"].len(), 1);
        assert_eq!(c.package.len(), 1);
        assert_eq!(c.package[0].declared_name(), Some("Bar"));
    }

    #[test]
    fn test_repeated_module_blocks_merge() {
        let module = parsed(
            r#"
            declare module "a" { export const x: number; }
            declare module "b" { export const y: number; }
            declare module "a" { export const z: number; }
            declare module "c";
            "#,
        );
        let c = classify(&module);
        let keys: Vec<&str> = c.named_modules.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        let names: Vec<_> = c.named_modules["a"].iter().map(|s| s.declared_name()).collect();
        assert_eq!(names, [Some("x"), Some("z")]);
        assert!(c.named_modules["c"].is_empty());
    }

    #[test]
    fn test_export_equals_merges_namespace_blocks() {
        let module = parsed(
            r#"
            declare namespace Lib { function a(): void; }
            declare function Lib(): void;
            declare namespace Lib { function b(): void; }
            export = Lib;
            "#,
        );
        let c = classify(&module);
        let names: Vec<_> = c.package.iter().map(|s| s.declared_name()).collect();
        assert_eq!(names, [Some("a"), Some("b")]);
    }

    #[test]
    fn test_export_equals_without_namespace_passes_through() {
        let module = parsed("declare const lib: { run(): void }; export = lib;");
        let c = classify(&module);
        assert_eq!(c.package.len(), 1);
        let StmtKind::Export(export) = &c.package[0].kind else {
            panic!("expected export statement");
        };
        assert!(matches!(export.kind, ExportKind::Assignment(_)));
        assert_eq!(c.global.len(), 1);
    }

    #[test]
    fn test_declare_export_counts_as_export() {
        let module = parsed("declare var hidden: number; export declare function shown(): void;");
        let c = classify(&module);
        assert!(c.has_top_level_exports);
        assert_eq!(c.global.len(), 1);
        assert_eq!(c.package.len(), 1);
        assert_eq!(c.package[0].declared_name(), Some("shown"));
    }
}
