//! Driver and assignability rules across whole designs.

use veris_common::Interner;
use veris_conformance::*;
use veris_sema::{Compilation, CompilationOptions, SymbolKind};
use veris_syntax::{AssignKind, ProceduralKind};

#[test]
fn multiple_continuous_drivers_on_variable_rejected() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            var(ty_int(), vec![decl(&interner, "v", None)]),
            cont_assign_at(ident_expr_at(&interner, "v", sp(10)), num("1"), sp(11)),
            cont_assign_at(ident_expr_at(&interner, "v", sp(20)), num("2"), sp(21)),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E316"));
}

#[test]
fn multiple_continuous_drivers_on_plain_net_allowed() {
    use veris_syntax::{NetDecl, NetKind};
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            veris_syntax::ModuleItem::Net(NetDecl {
                kind: NetKind::Wire,
                ty: ty_logic(None),
                declarators: vec![decl(&interner, "w", None)],
                span: sp(30),
            }),
            cont_assign_at(ident_expr_at(&interner, "w", sp(31)), num("1"), sp(32)),
            cont_assign_at(ident_expr_at(&interner, "w", sp(33)), num("0"), sp(34)),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    // Wire resolution handles multiple drivers; no error.
    assert!(!outcome.codes.iter().any(|c| c == "E316"));
    assert!(!outcome.codes.iter().any(|c| c == "E320"));
}

#[test]
fn uwire_with_two_drivers_rejected() {
    use veris_syntax::{NetDecl, NetKind};
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            veris_syntax::ModuleItem::Net(NetDecl {
                kind: NetKind::Uwire,
                ty: ty_logic(None),
                declarators: vec![decl(&interner, "u", None)],
                span: sp(40),
            }),
            cont_assign_at(ident_expr_at(&interner, "u", sp(41)), num("1"), sp(42)),
            cont_assign_at(ident_expr_at(&interner, "u", sp(43)), num("0"), sp(44)),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E320"));
}

#[test]
fn procedural_assignment_to_net_rejected() {
    use veris_syntax::{NetDecl, NetKind};
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            veris_syntax::ModuleItem::Net(NetDecl {
                kind: NetKind::Wire,
                ty: ty_logic(None),
                declarators: vec![decl(&interner, "w", None)],
                span: sp(50),
            }),
            procedural(
                ProceduralKind::Always,
                assign_stmt(
                    ident_expr_at(&interner, "w", sp(51)),
                    num("1"),
                    AssignKind::Blocking,
                    sp(52),
                ),
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E319"));
}

#[test]
fn always_comb_signal_driven_elsewhere_rejected() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            var(ty_int(), vec![decl(&interner, "v", None)]),
            procedural(
                ProceduralKind::AlwaysComb,
                assign_stmt(
                    ident_expr_at(&interner, "v", sp(60)),
                    num("1"),
                    AssignKind::Blocking,
                    sp(61),
                ),
            ),
            procedural(
                ProceduralKind::Always,
                assign_stmt(
                    ident_expr_at(&interner, "v", sp(62)),
                    num("2"),
                    AssignKind::Blocking,
                    sp(63),
                ),
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E317"));
}

#[test]
fn always_comb_with_initial_gated_by_option() {
    let interner = Interner::new();
    let build = || {
        tree(vec![module(
            &interner,
            "top",
            vec![],
            vec![
                var(ty_int(), vec![decl(&interner, "v", None)]),
                procedural(
                    ProceduralKind::AlwaysComb,
                    assign_stmt(
                        ident_expr_at(&interner, "v", sp(70)),
                        num("1"),
                        AssignKind::Blocking,
                        sp(71),
                    ),
                ),
                procedural(
                    ProceduralKind::Initial,
                    assign_stmt(
                        ident_expr_at(&interner, "v", sp(72)),
                        num("0"),
                        AssignKind::Blocking,
                        sp(73),
                    ),
                ),
            ],
        )])
    };
    let t = build();
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E317"));

    let t = build();
    let options = CompilationOptions {
        allow_dup_initial_drivers: true,
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(!outcome.codes.iter().any(|c| c == "E317"));
}

#[test]
fn two_always_comb_blocks_conflict() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            var(ty_int(), vec![decl(&interner, "v", None)]),
            procedural(
                ProceduralKind::AlwaysComb,
                assign_stmt(
                    ident_expr_at(&interner, "v", sp(80)),
                    num("1"),
                    AssignKind::Blocking,
                    sp(81),
                ),
            ),
            procedural(
                ProceduralKind::AlwaysComb,
                assign_stmt(
                    ident_expr_at(&interner, "v", sp(82)),
                    num("2"),
                    AssignKind::Blocking,
                    sp(83),
                ),
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E317"));
}

#[test]
fn disjoint_element_drivers_are_allowed() {
    use veris_syntax::Expr;
    let interner = Interner::new();
    // assign v[0] = 1; assign v[1] = 0; — different elements, no conflict.
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            var(ty_logic(Some(("3", "0"))), vec![decl(&interner, "v", None)]),
            cont_assign_at(
                Expr::Index {
                    value: Box::new(ident_expr_at(&interner, "v", sp(90))),
                    index: Box::new(num("0")),
                    span: sp(91),
                },
                num("1"),
                sp(92),
            ),
            cont_assign_at(
                Expr::Index {
                    value: Box::new(ident_expr_at(&interner, "v", sp(93))),
                    index: Box::new(num("1")),
                    span: sp(94),
                },
                num("0"),
                sp(95),
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(
        !outcome.codes.iter().any(|c| c == "E316"),
        "disjoint selects conflicted: {:?}",
        outcome.codes
    );
}

#[test]
fn strict_driver_checking_flags_disjoint_elements() {
    use veris_syntax::Expr;
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            var(ty_logic(Some(("3", "0"))), vec![decl(&interner, "v", None)]),
            cont_assign_at(
                Expr::Index {
                    value: Box::new(ident_expr_at(&interner, "v", sp(100))),
                    index: Box::new(num("0")),
                    span: sp(101),
                },
                num("1"),
                sp(102),
            ),
            cont_assign_at(
                Expr::Index {
                    value: Box::new(ident_expr_at(&interner, "v", sp(103))),
                    index: Box::new(num("1")),
                    span: sp(104),
                },
                num("0"),
                sp(105),
            ),
        ],
    )]);
    let options = CompilationOptions {
        strict_driver_checking: true,
        ..CompilationOptions::default()
    };
    let outcome = elaborate(&interner, &[&t], options);
    assert!(outcome.codes.iter().any(|c| c == "E316"));
}

#[test]
fn drivers_record_longest_static_prefix() {
    use veris_syntax::Expr;
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            var(ty_logic(Some(("7", "0"))), vec![decl(&interner, "v", None)]),
            cont_assign_at(
                Expr::Index {
                    value: Box::new(ident_expr_at(&interner, "v", sp(110))),
                    index: Box::new(num("3")),
                    span: sp(111),
                },
                num("1"),
                sp(112),
            ),
        ],
    )]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let v = interner.get_or_intern("v");
    let v_sym = compilation.symbol(top).scope().unwrap().find(v).unwrap();
    match &compilation.symbol(v_sym).kind {
        SymbolKind::Variable(data) => {
            assert_eq!(data.value.drivers.len(), 1);
            let driver = &data.value.drivers[0];
            assert_eq!(
                driver.path,
                vec![veris_sema::drivers::PrefixStep::Index(3)]
            );
            assert_eq!(driver.kind, veris_sema::DriverKind::Continuous);
        }
        other => panic!("expected variable, got {other:?}"),
    }
}

#[test]
fn parameter_is_not_assignable() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![param(&interner, "P", Some(num("1")))],
        vec![cont_assign_at(
            ident_expr_at(&interner, "P", sp(120)),
            num("2"),
            sp(121),
        )],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E315"));
}
