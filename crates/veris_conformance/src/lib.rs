//! Builders and helpers for whole-compilation conformance tests.
//!
//! The parser is an external collaborator, so these tests construct
//! syntax trees programmatically. The builders here keep the test
//! bodies close to the shape of the source they stand in for.

#![warn(missing_docs)]

use veris_common::{Ident, Interner};
use veris_diagnostics::Diagnostic;
use veris_sema::{Compilation, CompilationOptions};
use veris_source::{FileId, Span};
use veris_syntax::{
    AssignExpr, AssignKind, ContinuousAssign, Declarator, DefinitionDecl, DefinitionKind,
    Dimension, Expr, InstanceBody, Instantiation, Item, ModuleItem, ParamAssignment, ParamDecl,
    PortConnection, ProceduralBlock, ProceduralKind, SourceUnit, Stmt, SyntaxTree, TypeKeyword,
    TypeSpec, VarDecl,
};

/// A short unique span at byte offset `n`, for tests that need distinct
/// or deliberately colliding locations.
pub fn sp(n: u32) -> Span {
    Span::new(FileId::from_raw(0), n, n + 1)
}

/// An integer literal expression from its source text.
pub fn num(text: &str) -> Expr {
    num_at(text, Span::DUMMY)
}

/// An integer literal at an explicit span.
pub fn num_at(text: &str, span: Span) -> Expr {
    Expr::Number {
        text: text.to_string(),
        span,
    }
}

/// An identifier reference expression.
pub fn ident_expr(interner: &Interner, name: &str) -> Expr {
    ident_expr_at(interner, name, Span::DUMMY)
}

/// An identifier reference at an explicit span.
pub fn ident_expr_at(interner: &Interner, name: &str, span: Span) -> Expr {
    Expr::Ident {
        name: interner.get_or_intern(name),
        span,
    }
}

/// A dotted hierarchical reference.
pub fn hier_expr(interner: &Interner, parts: &[&str], span: Span) -> Expr {
    Expr::Hierarchical {
        parts: parts.iter().map(|p| interner.get_or_intern(p)).collect(),
        span,
    }
}

/// A `min:typ:max` expression.
pub fn min_typ_max(min: Expr, typ: Expr, max: Expr) -> Expr {
    Expr::MinTypMax {
        min: Box::new(min),
        typ: Box::new(typ),
        max: Box::new(max),
        span: Span::DUMMY,
    }
}

/// The `int` type.
pub fn ty_int() -> TypeSpec {
    TypeSpec::Keyword {
        keyword: TypeKeyword::Int,
        signed: None,
        packed_dims: Vec::new(),
        span: Span::DUMMY,
    }
}

/// The `logic` type, optionally with one packed `[msb:lsb]` dimension.
pub fn ty_logic(range: Option<(&str, &str)>) -> TypeSpec {
    let packed_dims = match range {
        Some((msb, lsb)) => vec![Dimension::Range {
            left: num(msb),
            right: num(lsb),
            span: Span::DUMMY,
        }],
        None => Vec::new(),
    };
    TypeSpec::Keyword {
        keyword: TypeKeyword::Logic,
        signed: None,
        packed_dims,
        span: Span::DUMMY,
    }
}

/// A reference to a named (typedef'd) type.
pub fn ty_named(interner: &Interner, name: &str) -> TypeSpec {
    TypeSpec::Named {
        name: interner.get_or_intern(name),
        span: Span::DUMMY,
    }
}

/// An enum type with named members and optional explicit values.
pub fn ty_enum(interner: &Interner, members: &[(&str, Option<&str>)]) -> TypeSpec {
    TypeSpec::Enum {
        base: Some(Box::new(ty_int())),
        members: members
            .iter()
            .map(|(name, value)| veris_syntax::EnumMember {
                name: interner.get_or_intern(name),
                value: value.map(num),
                span: Span::DUMMY,
            })
            .collect(),
        span: Span::DUMMY,
    }
}

/// One declarator with an optional initializer.
pub fn decl(interner: &Interner, name: &str, init: Option<Expr>) -> Declarator {
    decl_at(interner, name, init, Span::DUMMY)
}

/// One declarator at an explicit span.
pub fn decl_at(interner: &Interner, name: &str, init: Option<Expr>, span: Span) -> Declarator {
    Declarator {
        name: interner.get_or_intern(name),
        dims: Vec::new(),
        init,
        span,
    }
}

/// A variable declaration item.
pub fn var(ty: TypeSpec, declarators: Vec<Declarator>) -> ModuleItem {
    ModuleItem::Variable(VarDecl {
        is_const: false,
        lifetime: None,
        ty,
        declarators,
        span: Span::DUMMY,
    })
}

/// A `const` variable declaration item.
pub fn const_var(ty: TypeSpec, declarators: Vec<Declarator>) -> ModuleItem {
    ModuleItem::Variable(VarDecl {
        is_const: true,
        lifetime: None,
        ty,
        declarators,
        span: Span::DUMMY,
    })
}

/// A typedef item.
pub fn typedef(interner: &Interner, ty: TypeSpec, name: &str) -> ModuleItem {
    ModuleItem::Typedef(veris_syntax::TypedefDecl {
        ty,
        name: interner.get_or_intern(name),
        span: Span::DUMMY,
    })
}

/// A parameter declaration for a definition's parameter port list.
pub fn param(interner: &Interner, name: &str, default: Option<Expr>) -> ParamDecl {
    ParamDecl {
        local: false,
        is_type: false,
        ty: None,
        name: interner.get_or_intern(name),
        default,
        span: Span::DUMMY,
    }
}

/// A continuous assignment item.
pub fn cont_assign(lhs: Expr, rhs: Expr) -> ModuleItem {
    cont_assign_at(lhs, rhs, Span::DUMMY)
}

/// A continuous assignment at an explicit span.
pub fn cont_assign_at(lhs: Expr, rhs: Expr, span: Span) -> ModuleItem {
    ModuleItem::ContinuousAssign(ContinuousAssign {
        assignments: vec![AssignExpr { lhs, rhs, span }],
        span,
    })
}

/// A procedural block item.
pub fn procedural(kind: ProceduralKind, body: Stmt) -> ModuleItem {
    ModuleItem::Procedural(ProceduralBlock {
        kind,
        body,
        span: Span::DUMMY,
    })
}

/// A blocking or non-blocking assignment statement.
pub fn assign_stmt(lhs: Expr, rhs: Expr, kind: AssignKind, span: Span) -> Stmt {
    Stmt::Assign {
        lhs,
        rhs,
        kind,
        span,
    }
}

/// An instantiation item with no parameters or connections.
pub fn instance(interner: &Interner, module: &str, name: &str) -> ModuleItem {
    instance_at(interner, module, name, Span::DUMMY)
}

/// An instantiation at an explicit span.
pub fn instance_at(interner: &Interner, module: &str, name: &str, span: Span) -> ModuleItem {
    ModuleItem::Instantiation(Instantiation {
        module: interner.get_or_intern(module),
        param_assignments: Vec::new(),
        instances: vec![InstanceBody {
            name: interner.get_or_intern(name),
            connections: Vec::new(),
            span,
        }],
        span,
    })
}

/// An instantiation with named parameter assignments.
pub fn instance_with_params(
    interner: &Interner,
    module: &str,
    name: &str,
    params: Vec<(&str, Expr)>,
) -> ModuleItem {
    ModuleItem::Instantiation(Instantiation {
        module: interner.get_or_intern(module),
        param_assignments: params
            .into_iter()
            .map(|(n, expr)| ParamAssignment {
                name: Some(interner.get_or_intern(n)),
                expr,
                span: Span::DUMMY,
            })
            .collect(),
        instances: vec![InstanceBody {
            name: interner.get_or_intern(name),
            connections: Vec::new(),
            span: Span::DUMMY,
        }],
        span: Span::DUMMY,
    })
}

/// A module definition.
pub fn module(
    interner: &Interner,
    name: &str,
    params: Vec<ParamDecl>,
    items: Vec<ModuleItem>,
) -> DefinitionDecl {
    module_at(interner, name, params, items, Span::DUMMY)
}

/// A module definition whose name token sits at an explicit span.
pub fn module_at(
    interner: &Interner,
    name: &str,
    params: Vec<ParamDecl>,
    items: Vec<ModuleItem>,
    name_span: Span,
) -> DefinitionDecl {
    DefinitionDecl {
        kind: DefinitionKind::Module,
        name: interner.get_or_intern(name),
        params,
        ports: Vec::new(),
        items,
        span: name_span,
        name_span,
    }
}

/// Wraps definitions into a syntax tree.
pub fn tree(definitions: Vec<DefinitionDecl>) -> SyntaxTree {
    SyntaxTree::new(SourceUnit {
        items: definitions.into_iter().map(Item::Definition).collect(),
        span: Span::DUMMY,
    })
}

/// An empty named port connection list helper for future use.
pub fn connection(interner: &Interner, port: &str, expr: Expr) -> PortConnection {
    PortConnection {
        name: Some(interner.get_or_intern(port)),
        expr: Some(expr),
        span: Span::DUMMY,
    }
}

/// The outcome of elaborating a set of trees.
pub struct ElabOutcome {
    /// The semantic diagnostics, sorted.
    pub diagnostics: Vec<Diagnostic>,
    /// Formatted codes of the diagnostics, in sorted order.
    pub codes: Vec<String>,
    /// Whether any error-severity diagnostic was emitted.
    pub has_errors: bool,
    /// How many top-level instances the root holds.
    pub top_count: usize,
}

/// Runs a full elaboration and collects its outcome.
pub fn elaborate(
    interner: &Interner,
    trees: &[&SyntaxTree],
    options: CompilationOptions,
) -> ElabOutcome {
    let mut compilation = Compilation::new(interner, options);
    for tree in trees {
        compilation.add_tree(tree).expect("tree added before root");
    }
    let diagnostics = compilation.semantic_diagnostics();
    ElabOutcome {
        codes: diagnostics.iter().map(|d| d.code.to_string()).collect(),
        has_errors: diagnostics.iter().any(|d| d.severity().is_error()),
        top_count: compilation.top_instances().len(),
        diagnostics,
    }
}

/// Convenience wrapper with default options.
pub fn elaborate_default(interner: &Interner, trees: &[&SyntaxTree]) -> ElabOutcome {
    elaborate(interner, trees, CompilationOptions::default())
}
