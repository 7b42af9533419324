//! Determinism, freeze, and idempotence guarantees.

use veris_common::Interner;
use veris_conformance::*;
use veris_sema::{Compilation, CompilationOptions};
use veris_syntax::ModuleItem;

fn messy_design(interner: &Interner) -> veris_syntax::SyntaxTree {
    // A design with several diagnostics and a small hierarchy, so the
    // diagnostic ordering and driver recording actually get exercised.
    let leaf = module(
        interner,
        "leaf",
        vec![param(interner, "W", Some(num("4")))],
        vec![
            var(ty_logic(Some(("3", "0"))), vec![decl(interner, "d", None)]),
            cont_assign_at(
                ident_expr_at(interner, "d", sp(100)),
                num_at("1", sp(101)),
                sp(102),
            ),
            cont_assign_at(
                ident_expr_at(interner, "d", sp(110)),
                num_at("2", sp(111)),
                sp(112),
            ),
        ],
    );
    let top = module(
        interner,
        "top",
        vec![],
        vec![
            instance(interner, "leaf", "u0"),
            instance(interner, "leaf", "u1"),
            var(
                ty_int(),
                vec![decl(
                    interner,
                    "v",
                    Some(ident_expr_at(interner, "missing", sp(120))),
                )],
            ),
        ],
    );
    tree(vec![leaf, top])
}

/// For fixed inputs, two separate compilations produce byte-identical
/// diagnostic sequences.
#[test]
fn diagnostics_are_deterministic_across_runs() {
    let run = || {
        let interner = Interner::new();
        let t = messy_design(&interner);
        let outcome = elaborate_default(&interner, &[&t]);
        outcome
            .diagnostics
            .iter()
            .map(|d| format!("{}:{:?}:{}", d.code, d.primary_span, d.message))
            .collect::<Vec<_>>()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

/// The set of top modules is stable across runs.
#[test]
fn top_modules_are_deterministic() {
    let run = || {
        let interner = Interner::new();
        let t = messy_design(&interner);
        let outcome = elaborate_default(&interner, &[&t]);
        outcome.top_count
    };
    assert_eq!(run(), run());
}

/// Adding a tree after the root has been materialized is a contract
/// violation and leaves observable state unchanged.
#[test]
fn freeze_rejects_late_trees() {
    let interner = Interner::new();
    let t = tree(vec![module(&interner, "top", vec![], vec![])]);
    let late = tree(vec![module(&interner, "late", vec![], vec![])]);

    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let tops_before = compilation.top_instances().len();
    let diags_before = compilation.diagnostics().semantic().len();

    assert!(compilation.add_tree(&late).is_err());
    assert!(compilation.is_finalized());
    assert_eq!(compilation.root().unwrap(), root);
    assert_eq!(compilation.top_instances().len(), tops_before);
    assert_eq!(compilation.diagnostics().semantic().len(), diags_before);
}

/// Requesting the root twice returns the same symbol and re-runs
/// nothing (diagnostic counts stay put).
#[test]
fn force_elaborate_is_idempotent() {
    let interner = Interner::new();
    let t = messy_design(&interner);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();

    let first = compilation.root().unwrap();
    let diags_first = compilation.semantic_diagnostics();
    let second = compilation.root().unwrap();
    let diags_second = compilation.semantic_diagnostics();

    assert_eq!(first, second);
    assert_eq!(diags_first.len(), diags_second.len());
}

/// Evaluating the same bound expression twice produces equal values.
#[test]
fn constant_evaluation_is_pure() {
    use veris_sema::{expr, BindContext, LookupLocation};
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![param(&interner, "P", Some(num("6")))],
        vec![],
    )]);
    let e = veris_syntax::Expr::Binary {
        op: veris_syntax::BinaryOp::Mul,
        left: Box::new(ident_expr(&interner, "P")),
        right: Box::new(num("7")),
        span: sp(130),
    };
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let ctx = BindContext::new(top, LookupLocation::MAX);
    let bound = expr::bind(&mut compilation, &e, &ctx);
    assert!(!bound.bad());

    let a = compilation.try_eval_const_int(&bound);
    let b = compilation.try_eval_const_int(&bound);
    assert_eq!(a, Some(42));
    assert_eq!(a, b);
}

/// Running the defparam resolver to fixed point twice converges to the
/// same values: a second identical compilation agrees with the first.
#[test]
fn defparam_fixed_point_is_stable() {
    let build = |interner: &Interner| {
        let leaf = module(
            interner,
            "leaf",
            vec![param(interner, "P", Some(num("1")))],
            vec![],
        );
        let top = module(
            interner,
            "top",
            vec![],
            vec![
                instance(interner, "leaf", "u0"),
                ModuleItem::Defparam(veris_syntax::Defparam {
                    target: vec![
                        interner.get_or_intern("top"),
                        interner.get_or_intern("u0"),
                        interner.get_or_intern("P"),
                    ],
                    value: num("9"),
                    span: sp(140),
                }),
            ],
        );
        tree(vec![leaf, top])
    };
    let read_p = |interner: &Interner, t: &veris_syntax::SyntaxTree| {
        let mut compilation = Compilation::new(interner, CompilationOptions::default());
        compilation.add_tree(t).unwrap();
        let root = compilation.root().unwrap();
        let top = compilation.symbol(root).scope().unwrap().members[0];
        let u0 = interner.get_or_intern("u0");
        let leaf = compilation.symbol(top).scope().unwrap().find(u0).unwrap();
        match &compilation.symbol(leaf).kind {
            veris_sema::SymbolKind::Instance(data) => data.parameters[0].1.to_i64(),
            _ => None,
        }
    };
    let interner = Interner::new();
    let t = build(&interner);
    let first = read_p(&interner, &t);
    let second = read_p(&interner, &t);
    assert_eq!(first, Some(9), "defparam override applied");
    assert_eq!(first, second);
}

/// Exhausting the error limit short-circuits with a final marker
/// diagnostic instead of flooding.
#[test]
fn error_limit_short_circuits() {
    let interner = Interner::new();
    // Fifty distinct undeclared references at distinct locations.
    let items: Vec<ModuleItem> = (0..50)
        .map(|i| {
            var(
                ty_int(),
                vec![decl_at(
                    &interner,
                    &format!("v{i}"),
                    Some(ident_expr_at(&interner, "missing", sp(1000 + i * 4))),
                    sp(1002 + i * 4),
                )],
            )
        })
        .collect();
    let t = tree(vec![module(&interner, "top", vec![], items)]);
    let options = CompilationOptions {
        error_limit: 10,
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(outcome.codes.iter().any(|c| c == "E339"));
    let undeclared = outcome.codes.iter().filter(|c| *c == "E303").count();
    assert!(undeclared <= 10, "errors were not limited: {undeclared}");
}
