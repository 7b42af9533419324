//! The concrete behavioral scenarios the elaboration engine guarantees:
//! enum typedefs, recursive properties, min:typ:max selection, const
//! variable writes, diagnostic deduplication across instantiations, and
//! hierarchical constants.

use veris_common::Interner;
use veris_conformance::*;
use veris_sema::{
    expr, BindContext, Compilation, CompilationOptions, ExpressionKind, LookupLocation, MinTypMax,
    SymbolKind, TypeKind,
};
use veris_syntax::{AssertionDecl, AssertionPort, CallArg, CallTarget, Expr, ModuleItem};

/// A module declaring `typedef enum int { FOO=1, BAR=2, BAZ=3 } t;`
/// exposes an enum type with exactly those members in order.
#[test]
fn typedef_enum_member_count_and_values() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![typedef(
            &interner,
            ty_enum(
                &interner,
                &[("FOO", Some("1")), ("BAR", Some("2")), ("BAZ", Some("3"))],
            ),
            "t",
        )],
    )]);
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();

    let top = compilation.symbol(root).scope().unwrap().members[0];
    let t_name = interner.get_or_intern("t");
    let alias = compilation
        .symbol(top)
        .scope()
        .unwrap()
        .find(t_name)
        .expect("typedef registered");
    let ty = compilation.resolve_type_alias(alias);
    let canonical = compilation.types.canonical(ty);
    match compilation.types.get(canonical) {
        TypeKind::Enum { members, .. } => {
            assert_eq!(members.len(), 3);
            let values: Vec<i64> = members.iter().map(|m| m.value.to_i64().unwrap()).collect();
            assert_eq!(values, vec![1, 2, 3]);
            let names: Vec<&str> = members
                .iter()
                .map(|m| interner.resolve(m.name))
                .collect();
            assert_eq!(names, vec!["FOO", "BAR", "BAZ"]);
        }
        other => panic!("expected enum, got {other:?}"),
    }
    // The members are also visible as value symbols in the module.
    let foo = interner.get_or_intern("FOO");
    let foo_sym = compilation.symbol(top).scope().unwrap().find(foo).unwrap();
    assert!(matches!(
        compilation.symbol(foo_sym).kind,
        SymbolKind::EnumValue(_)
    ));
}

/// A property that references itself expands its body once; the nested
/// reference becomes a placeholder marked `is_recursive_property`, with
/// no infinite expansion.
#[test]
fn recursive_property_yields_placeholder() {
    let interner = Interner::new();
    let p = interner.get_or_intern("p");
    let decl = AssertionDecl {
        name: p,
        ports: Vec::new(),
        body: Expr::Call {
            target: CallTarget::Name(p),
            args: Vec::new(),
            span: sp(5),
        },
        span: sp(6),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![ModuleItem::Property(decl)],
    )]);
    // The use-site expression must outlive the compilation that binds it.
    let call = Expr::Call {
        target: CallTarget::Name(p),
        args: Vec::new(),
        span: sp(7),
    };
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let p_sym = compilation.symbol(top).scope().unwrap().find(p).unwrap();

    // Instantiate the property at a use site.
    let ctx = BindContext::new(top, LookupLocation::MAX);
    let bound = expr::bind(&mut compilation, &call, &ctx);
    assert!(!bound.bad());
    match &bound.kind {
        ExpressionKind::AssertionInstance(instance) => {
            assert_eq!(instance.symbol, p_sym);
            assert!(!instance.is_recursive_property);
            let body = instance.body.as_ref().expect("outer body expanded");
            match &body.kind {
                ExpressionKind::AssertionInstance(inner) => {
                    assert!(inner.is_recursive_property);
                    assert!(inner.body.is_none());
                }
                other => panic!("expected nested instance, got {other:?}"),
            }
        }
        other => panic!("expected assertion instance, got {other:?}"),
    }
}

/// A recursive sequence is rejected rather than expanded.
#[test]
fn recursive_sequence_is_rejected() {
    let interner = Interner::new();
    let s = interner.get_or_intern("s");
    let decl = AssertionDecl {
        name: s,
        ports: Vec::new(),
        body: Expr::Call {
            target: CallTarget::Name(s),
            args: Vec::new(),
            span: sp(8),
        },
        span: sp(9),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![ModuleItem::Sequence(decl)],
    )]);
    let call = Expr::Call {
        target: CallTarget::Name(s),
        args: Vec::new(),
        span: sp(10),
    };
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let ctx = BindContext::new(top, LookupLocation::MAX);
    let bound = expr::bind(&mut compilation, &call, &ctx);
    assert!(bound.bad());
    let codes: Vec<String> = compilation
        .diagnostics()
        .semantic()
        .iter()
        .map(|d| d.code.to_string())
        .collect();
    assert!(codes.iter().any(|c| c == "E324"));
}

/// Assertion formals map ordered and named actuals, and defaults fill
/// holes.
#[test]
fn assertion_arguments_map_with_defaults() {
    let interner = Interner::new();
    let s = interner.get_or_intern("s");
    let a = interner.get_or_intern("a");
    let b = interner.get_or_intern("b");
    let decl = AssertionDecl {
        name: s,
        ports: vec![
            AssertionPort {
                local_direction: None,
                ty: Some(ty_int()),
                name: a,
                default: None,
                span: sp(11),
            },
            AssertionPort {
                local_direction: None,
                ty: Some(ty_int()),
                name: b,
                default: Some(num("7")),
                span: sp(12),
            },
        ],
        body: Expr::Binary {
            op: veris_syntax::BinaryOp::Add,
            left: Box::new(ident_expr(&interner, "a")),
            right: Box::new(ident_expr(&interner, "b")),
            span: sp(13),
        },
        span: sp(14),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![ModuleItem::Let(decl)],
    )]);
    // s(3) — `b` falls back to its default of 7.
    let ordered_call = Expr::Call {
        target: CallTarget::Name(s),
        args: vec![CallArg {
            name: None,
            expr: Some(num("3")),
            span: sp(15),
        }],
        span: sp(16),
    };
    // Named form with both actuals.
    let named_call = Expr::Call {
        target: CallTarget::Name(s),
        args: vec![
            CallArg {
                name: Some(b),
                expr: Some(num("1")),
                span: sp(17),
            },
            CallArg {
                name: Some(a),
                expr: Some(num("2")),
                span: sp(18),
            },
        ],
        span: sp(19),
    };
    let mut compilation = Compilation::new(&interner, CompilationOptions::default());
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let ctx = BindContext::new(top, LookupLocation::MAX);

    let bound = expr::bind(&mut compilation, &ordered_call, &ctx);
    assert!(!bound.bad());
    assert_eq!(compilation.try_eval_const_int(&bound), Some(10));

    let bound = expr::bind(&mut compilation, &named_call, &ctx);
    assert_eq!(compilation.try_eval_const_int(&bound), Some(3));
}

/// `1:2:3` follows the configured min:typ:max selection.
#[test]
fn min_typ_max_selection() {
    for (selection, expected) in [
        (MinTypMax::Min, 1),
        (MinTypMax::Typ, 2),
        (MinTypMax::Max, 3),
    ] {
        let interner = Interner::new();
        let t = tree(vec![module(&interner, "top", vec![], vec![])]);
        let e = min_typ_max(num("1"), num("2"), num("3"));
        let options = CompilationOptions {
            min_typ_max: selection,
            ..CompilationOptions::default()
        };
        let mut compilation = Compilation::new(&interner, options);
        compilation.add_tree(&t).unwrap();
        let root = compilation.root().unwrap();
        let top = compilation.symbol(root).scope().unwrap().members[0];
        let ctx = BindContext::new(top, LookupLocation::MAX);

        let bound = expr::bind(&mut compilation, &e, &ctx);
        assert!(!bound.bad());
        assert_eq!(compilation.try_eval_const_int(&bound), Some(expected));
    }
}

/// Unselected branches bind but never evaluate: a non-constant
/// reference in a dead branch does not fail evaluation of the live one.
#[test]
fn min_typ_max_dead_branch_not_evaluated() {
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        // A plain variable: constant evaluation of a reference to it
        // would fail.
        vec![var(ty_int(), vec![decl(&interner, "v", None)])],
    )]);
    let e = min_typ_max(ident_expr(&interner, "v"), ident_expr(&interner, "v"), num("3"));
    let options = CompilationOptions {
        min_typ_max: MinTypMax::Max,
        ..CompilationOptions::default()
    };
    let mut compilation = Compilation::new(&interner, options);
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let ctx = BindContext::new(top, LookupLocation::MAX);

    let bound = expr::bind(&mut compilation, &e, &ctx);
    assert!(!bound.bad());
    assert_eq!(compilation.try_eval_const_int(&bound), Some(3));
}

/// Writing a `const` variable outside a constructor is an error; a
/// constructor may initialize an uninitialized const class property.
#[test]
fn const_variable_write_rules() {
    use veris_syntax::AssignKind;
    let interner = Interner::new();
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            const_var(ty_int(), vec![decl(&interner, "x", Some(num("3")))]),
            procedural(
                veris_syntax::ProceduralKind::Initial,
                assign_stmt(
                    ident_expr_at(&interner, "x", sp(30)),
                    num("4"),
                    AssignKind::Blocking,
                    sp(31),
                ),
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E314"));
}

/// The constructor special case: a const class property without an
/// initializer may be written from `function new`.
#[test]
fn const_write_allowed_in_constructor() {
    use veris_syntax::{AssignKind, ClassDecl, ClassItem, Stmt, SubroutineDecl, SubroutineKind};
    let interner = Interner::new();
    let class = ClassDecl {
        name: interner.get_or_intern("packet"),
        items: vec![
            ClassItem::Property(match const_var(ty_int(), vec![decl(&interner, "id", None)]) {
                ModuleItem::Variable(v) => v,
                _ => unreachable!(),
            }),
            ClassItem::Method(SubroutineDecl {
                kind: SubroutineKind::Function,
                lifetime: None,
                class_scope: None,
                name: interner.get_or_intern("new"),
                return_ty: None,
                args: Vec::new(),
                body: vec![Stmt::Assign {
                    lhs: ident_expr_at(&interner, "id", sp(32)),
                    rhs: num("1"),
                    kind: AssignKind::Blocking,
                    span: sp(33),
                }],
                span: sp(34),
            }),
        ],
        span: sp(35),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![ModuleItem::Class(class)],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(
        !outcome.codes.iter().any(|c| c == "E314"),
        "constructor write was rejected: {:?}",
        outcome.codes
    );
    // The declaration itself is also accepted silently (no E333 for
    // class properties).
    assert!(!outcome.codes.iter().any(|c| c == "E333"));
}

/// A module instantiated many times produces its per-module errors only
/// once: same code at the same location deduplicates.
#[test]
fn multi_instantiation_deduplicates_diagnostics() {
    let interner = Interner::new();
    // `leaf` references an undeclared name at a fixed source location.
    let leaf = module(
        &interner,
        "leaf",
        vec![],
        vec![var(
            ty_int(),
            vec![decl(&interner, "v", Some(ident_expr_at(&interner, "nope", sp(90))))],
        )],
    );
    let instances: Vec<ModuleItem> = (0..100)
        .map(|i| instance(&interner, "leaf", &format!("u{i}")))
        .collect();
    let top = module(&interner, "top", vec![], instances);
    let t = tree(vec![leaf, top]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert_eq!(
        outcome.codes.iter().filter(|c| *c == "E303").count(),
        1,
        "expected one deduplicated diagnostic, got {:?}",
        outcome.codes
    );
}

/// Hierarchical names in constant expressions are rejected by default
/// and permitted (resolving through the hierarchy) when
/// `allow_hierarchical_const` is set.
#[test]
fn hierarchical_constant_gating() {
    let interner = Interner::new();
    let build = || {
        let sub = module(
            &interner,
            "sub",
            vec![param(&interner, "P", Some(num("5")))],
            vec![],
        );
        let top = module(
            &interner,
            "top",
            vec![],
            vec![
                instance(&interner, "sub", "u_sub"),
                ModuleItem::Parameter(param(
                    &interner,
                    "Q",
                    Some(hier_expr(&interner, &["top", "u_sub", "P"], sp(95))),
                )),
            ],
        );
        tree(vec![sub, top])
    };

    // Default: hierarchical reference inside a constant is an error.
    let t = build();
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(outcome.codes.iter().any(|c| c == "E313"));

    // Relaxed: the parameter resolves through the hierarchy.
    let t = build();
    let options = CompilationOptions {
        allow_hierarchical_const: true,
        ..CompilationOptions::default()
    };
    let mut compilation = Compilation::new(&interner, options);
    compilation.add_tree(&t).unwrap();
    let root = compilation.root().unwrap();
    let top = compilation.symbol(root).scope().unwrap().members[0];
    let q = interner.get_or_intern("Q");
    let q_sym = compilation.symbol(top).scope().unwrap().find(q).unwrap();
    let value = compilation.parameter_value(q_sym).expect("Q resolves");
    assert_eq!(value.to_i64(), Some(5));
}

/// Tagged union expressions need an assignment target of tagged-union
/// type; void members permit an absent value.
#[test]
fn tagged_union_binding_rules() {
    use veris_syntax::{StructMember, TypeSpec};
    let interner = Interner::new();
    let union_ty = TypeSpec::Union {
        packed: false,
        tagged: true,
        members: vec![
            StructMember {
                ty: ty_int(),
                name: interner.get_or_intern("Valid"),
                span: sp(40),
            },
            StructMember {
                ty: TypeSpec::Keyword {
                    keyword: veris_syntax::TypeKeyword::Void,
                    signed: None,
                    packed_dims: Vec::new(),
                    span: sp(41),
                },
                name: interner.get_or_intern("Invalid"),
                span: sp(42),
            },
        ],
        span: sp(43),
    };
    let t = tree(vec![module(
        &interner,
        "top",
        vec![],
        vec![
            typedef(&interner, union_ty, "vu"),
            var(
                ty_named(&interner, "vu"),
                vec![decl(
                    &interner,
                    "u1",
                    Some(Expr::TaggedUnion {
                        member: interner.get_or_intern("Valid"),
                        value: Some(Box::new(num("3"))),
                        span: sp(44),
                    }),
                )],
            ),
            var(
                ty_named(&interner, "vu"),
                vec![decl(
                    &interner,
                    "u2",
                    Some(Expr::TaggedUnion {
                        member: interner.get_or_intern("Invalid"),
                        value: None,
                        span: sp(45),
                    }),
                )],
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t]);
    assert!(
        !outcome.codes.iter().any(|c| c == "E327"),
        "tagged union forms should bind: {:?}",
        outcome.codes
    );

    // A non-void member without a value is rejected.
    let t2 = tree(vec![module(
        &interner,
        "top2",
        vec![],
        vec![
            typedef(
                &interner,
                TypeSpec::Union {
                    packed: false,
                    tagged: true,
                    members: vec![StructMember {
                        ty: ty_int(),
                        name: interner.get_or_intern("Valid"),
                        span: sp(46),
                    }],
                    span: sp(47),
                },
                "vu2",
            ),
            var(
                ty_named(&interner, "vu2"),
                vec![decl(
                    &interner,
                    "u3",
                    Some(Expr::TaggedUnion {
                        member: interner.get_or_intern("Valid"),
                        value: None,
                        span: sp(48),
                    }),
                )],
            ),
        ],
    )]);
    let outcome = elaborate_default(&interner, &[&t2]);
    assert!(outcome.codes.iter().any(|c| c == "E327"));
}
