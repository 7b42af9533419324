//! Core elaboration conformance: definition registration, top-module
//! selection, instance hierarchy, parameters, and generate expansion.

use veris_common::Interner;
use veris_conformance::*;
use veris_sema::{Compilation, CompilationOptions, SymbolKind};
use veris_source::Span;

#[test]
fn empty_design_elaborates() {
    let interner = Interner::new();
    let t = tree(vec![]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(!outcome.has_errors);
    assert_eq!(outcome.top_count, 0);
}

#[test]
fn single_module_becomes_top() {
    let interner = Interner::new();
    let t = tree(vec![module(&interner, "top", vec![], vec![])]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(!outcome.has_errors);
    assert_eq!(outcome.top_count, 1);
}

#[test]
fn instantiated_module_is_not_top() {
    let interner = Interner::new();
    let t = tree(vec![
        module(&interner, "leaf", vec![], vec![]),
        module(&interner, "top", vec![], vec![instance(&interner, "leaf", "u0")]),
    ]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(!outcome.has_errors);
    assert_eq!(outcome.top_count, 1);
}

#[test]
fn explicit_top_modules_override_inference() {
    let interner = Interner::new();
    let t = tree(vec![
        module(&interner, "a", vec![], vec![]),
        module(&interner, "b", vec![], vec![]),
    ]);
    let options = CompilationOptions {
        top_modules: vec!["a".to_string()],
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(outcome.top_count == 1);
    // `b` is unused but unused warnings are suppressed by default.
    assert!(!outcome.has_errors);
}

#[test]
fn hierarchy_elaborates_through_levels() {
    let interner = Interner::new();
    let t = tree(vec![
        module(&interner, "leaf", vec![], vec![]),
        module(&interner, "mid", vec![], vec![instance(&interner, "leaf", "u_leaf")]),
        module(&interner, "top", vec![], vec![instance(&interner, "mid", "u_mid")]),
    ]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();

    let tops = compilation.symbol(root).scope().unwrap().members.clone();
    assert_eq!(tops.len(), 1);
    let top = tops[0];
    assert!(matches!(compilation.symbol(top).kind, SymbolKind::Instance(_)));

    // The mid instance was created lazily inside top.
    let mid_name = interner.get_or_intern("u_mid");
    let mid = compilation
        .symbol(top)
        .scope()
        .unwrap()
        .find(mid_name)
        .expect("u_mid elaborated");
    let leaf_name = interner.get_or_intern("u_leaf");
    assert!(compilation
        .symbol(mid)
        .scope()
        .unwrap()
        .find(leaf_name)
        .is_some());
}

#[test]
fn unknown_module_is_diagnosed() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![instance(&interner, "missing", "u0")],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E302"));
}

#[test]
fn lint_mode_suppresses_unknown_module() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![instance(&interner, "missing", "u0")],
    )]);
    let options = CompilationOptions {
        lint_mode: true,
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(!outcome.codes.iter().any(|c| c == "E302"));
}

#[test]
fn duplicate_definitions_are_diagnosed_once_each() {
    let interner = Interner::new();
    let t = tree(vec![
        module_at(&interner, "m", vec![], vec![], sp(0)),
        module_at(&interner, "m", vec![], vec![], sp(10)),
    ]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert_eq!(outcome.codes.iter().filter(|c| *c == "E300").count(), 1);
}

#[test]
fn recursive_instantiation_hits_depth_limit() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "spiral",
        vec![],
        vec![instance(&interner, "spiral", "inner")],
    )]);
    let options = CompilationOptions {
        max_instance_depth: 8,
        // `spiral` instantiates itself, so it is never a top module by
        // inference.
        top_modules: vec!["spiral".to_string()],
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(outcome.codes.iter().any(|c| c == "E308"));
}

#[test]
fn parameter_defaults_resolve() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![param(&interner, "WIDTH", Some(num("8")))],
        vec![],
    )]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    match &compilation.symbol(top).kind {
        SymbolKind::Instance(data) => {
            assert_eq!(data.parameters.len(), 1);
            assert_eq!(data.parameters[0].1.to_i64(), Some(8));
        }
        other => panic!("expected instance, got {other:?}"),
    }
}

#[test]
fn parameter_assignment_overrides_default() {
    let interner = Interner::new();
    let t = tree(vec![
        module(
            &interner,
            "leaf",
            vec![param(&interner, "WIDTH", Some(num("8")))],
            vec![],
        ),
        module(
            &interner,
            "top",
            vec![],
            vec![instance_with_params(
                &interner,
                "leaf",
                "u0",
                vec![("WIDTH", num("16"))],
            )],
        ),
    ]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let u0 = compilation.symbol(top).scope().unwrap().members[0];
    match &compilation.symbol(u0).kind {
        SymbolKind::Instance(data) => {
            assert_eq!(data.parameters[0].1.to_i64(), Some(16));
        }
        other => panic!("expected instance, got {other:?}"),
    }
}

#[test]
fn cli_override_applies_to_top_parameters() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![param(&interner, "WIDTH", Some(num("8")))],
        vec![],
    )]);
    let options = CompilationOptions {
        param_overrides: vec!["WIDTH=32".to_string()],
        ..CompilationOptions::default()
    };
    let mut compilation = Compilation::new(&interner, options);
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    match &compilation.symbol(top).kind {
        SymbolKind::Instance(data) => {
            assert_eq!(data.parameters[0].1.to_i64(), Some(32));
        }
        other => panic!("expected instance, got {other:?}"),
    }
}

#[test]
fn malformed_cli_override_is_diagnosed() {
    let interner = Interner::new();
    let t = tree(vec![module(&interner, "top", vec![], vec![])]);
    let options = CompilationOptions {
        param_overrides: vec!["garbage".to_string()],
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(outcome.codes.iter().any(|c| c == "E349"));
}

#[test]
fn generate_if_selects_branch() {
    use veris_syntax::{GenerateConstruct, ModuleItem};
    let interner = Interner::new();
    let construct = ModuleItem::Generate(GenerateConstruct::If {
        cond: num("1"),
        then_items: vec![var(ty_int(), vec![decl(&interner, "chosen", None)])],
        else_items: vec![var(ty_int(), vec![decl(&interner, "other", None)])],
        span: sp(40),
    });
    let t = tree(vec![module(&interner, "top", vec![], vec![construct])]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let block = compilation.symbol(top).scope().unwrap().members[0];
    assert!(matches!(
        compilation.symbol(block).kind,
        SymbolKind::GenerateBlock(_)
    ));
    let chosen = interner.get_or_intern("chosen");
    let other = interner.get_or_intern("other");
    let block_scope = compilation.symbol(block).scope().unwrap();
    assert!(block_scope.find(chosen).is_some());
    assert!(block_scope.find(other).is_none());
}

#[test]
fn generate_for_expands_each_iteration() {
    use veris_syntax::{BinaryOp, Expr, GenerateConstruct, GenvarDecl, ModuleItem};
    let interner = Interner::new();
    let i = interner.get_or_intern("i");
    let lt = Expr::Binary {
        op: BinaryOp::Lt,
        left: Box::new(ident_expr(&interner, "i")),
        right: Box::new(num("3")),
        span: sp(50),
    };
    let step = Expr::Binary {
        op: BinaryOp::Add,
        left: Box::new(ident_expr(&interner, "i")),
        right: Box::new(num("1")),
        span: sp(51),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            ModuleItem::Genvar(GenvarDecl {
                names: vec![i],
                span: sp(52),
            }),
            ModuleItem::Generate(GenerateConstruct::For {
                genvar: i,
                init: num("0"),
                cond: lt,
                step,
                body: vec![var(ty_int(), vec![decl(&interner, "x", None)])],
                label: Some(interner.get_or_intern("gen")),
                span: sp(53),
            }),
        ],
    )]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let scope = compilation.symbol(top).scope().unwrap();
    // genvar + three generate blocks.
    let blocks: Vec<_> = scope
        .members
        .iter()
        .filter(|&&m| matches!(compilation.symbol(m).kind, SymbolKind::GenerateBlock(_)))
        .collect();
    assert_eq!(blocks.len(), 3);
    assert!(scope.find(interner.get_or_intern("gen[0]")).is_some());
    assert!(scope.find(interner.get_or_intern("gen[2]")).is_some());
}

#[test]
fn generate_loop_budget_is_enforced() {
    use veris_syntax::{BinaryOp, Expr, GenerateConstruct, GenvarDecl, ModuleItem};
    let interner = Interner::new();
    let i = interner.get_or_intern("i");
    // i >= 0 never terminates upward.
    let cond = Expr::Binary {
        op: BinaryOp::Ge,
        left: Box::new(ident_expr(&interner, "i")),
        right: Box::new(num("0")),
        span: sp(60),
    };
    let step = Expr::Binary {
        op: BinaryOp::Add,
        left: Box::new(ident_expr(&interner, "i")),
        right: Box::new(num("1")),
        span: sp(61),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            ModuleItem::Genvar(GenvarDecl {
                names: vec![i],
                span: sp(62),
            }),
            ModuleItem::Generate(GenerateConstruct::For {
                genvar: i,
                init: num("0"),
                cond,
                step,
                body: vec![],
                label: None,
                span: sp(63),
            }),
        ],
    )]);
    let options = CompilationOptions {
        max_generate_steps: 16,
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(outcome.codes.iter().any(|c| c == "E309"));
}

#[test]
fn packages_resolve_imports() {
    use veris_syntax::{ImportDecl, Item, ModuleItem, PackageDecl, SourceUnit};
    let interner = Interner::new();
    let pkg = PackageDecl {
        name: interner.get_or_intern("config_pkg"),
        items: vec![ModuleItem::Parameter(param(
            &interner,
            "DEPTH",
            Some(num("4")),
        ))],
        span: sp(70),
    };
    let top = module(
        &interner,
        "top",
        vec![],
        vec![
            ModuleItem::Import(ImportDecl {
                package: interner.get_or_intern("config_pkg"),
                name: None,
                span: sp(71),
            }),
            var(ty_int(), vec![decl(&interner, "d", Some(ident_expr(&interner, "DEPTH")))]),
        ],
    );
    let t = veris_syntax::SyntaxTree::new(SourceUnit {
        items: vec![Item::Package(pkg), Item::Definition(top)],
        span: Span::DUMMY,
    });
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(!outcome.has_errors, "codes: {:?}", outcome.codes);
}
