//! Assertion instances: use sites of sequence, property, and let
//! declarations.
//!
//! The three declaration kinds share one instantiation pipeline: formal
//! ports are mapped from ordered and named actuals (with defaults and
//! explicit-empty handling), actuals are kept as syntax plus the binding
//! context captured at the call site, and every reference to a formal
//! inside the body rebinds the stored actual. Recursion is permitted for
//! properties only, producing a placeholder instance instead of
//! re-expanding; recursive sequences and lets are rejected.

use crate::compilation::Compilation;
use crate::drivers::{self, DriverKind, DriverSource};
use crate::errors;
use crate::expr::{self, BindContext, BindFlags, Expression, ExpressionKind};
use crate::lookup::LookupLocation;
use crate::symbols::{AssertionDeclKind, SymbolId, SymbolKind};
use crate::types::TypeDb;
use serde::{Deserialize, Serialize};
use veris_common::Ident;
use veris_source::Span;
use veris_syntax as ast;

/// A bound instance of a sequence, property, or let declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionInstance {
    /// The instantiated declaration symbol.
    pub symbol: SymbolId,
    /// Which flavor of declaration this instantiates.
    pub kind: AssertionDeclKind,
    /// The expanded body; `None` exactly when this is a recursive
    /// property placeholder.
    pub body: Option<Box<Expression>>,
    /// `true` when this instance is a recursive-property placeholder
    /// that was deliberately not re-expanded.
    pub is_recursive_property: bool,
}

/// One actual argument captured at an instantiation site: the syntax and
/// the context to rebind it in.
struct CapturedActual<'s> {
    syntax: Option<&'s ast::Expr>,
    context: BindContext,
}

/// One live expansion frame. While a declaration's body is being bound,
/// references to its formals resolve through this frame.
pub(crate) struct ExpansionFrame<'s> {
    decl: SymbolId,
    actuals: Vec<(Ident, CapturedActual<'s>)>,
}

/// Binds an instance of `decl` with the given argument list.
pub fn bind_instance<'s>(
    comp: &mut Compilation<'s>,
    decl: SymbolId,
    args: &'s [ast::CallArg],
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let (kind, ports, body_syntax, decl_scope) = match &comp.symbol(decl).kind {
        SymbolKind::Sequence(data) | SymbolKind::Property(data) | SymbolKind::Let(data) => (
            data.kind,
            data.ports.clone(),
            &data.syntax.body,
            decl,
        ),
        _ => return Expression::invalid(span),
    };
    let name = comp.symbol_name(decl);

    // Recursion check: a declaration already on the expansion stack may
    // not re-expand. Properties produce a placeholder; sequences and
    // lets are errors.
    if comp.assertion_stack_contains(decl) {
        return match kind {
            AssertionDeclKind::Property => {
                if ctx.flags.contains(BindFlags::PROPERTY_NEGATION) {
                    comp.emit(errors::recursive_property_position(&name, span));
                    return Expression::invalid(span);
                }
                Expression {
                    kind: ExpressionKind::AssertionInstance(AssertionInstance {
                        symbol: decl,
                        kind,
                        body: None,
                        is_recursive_property: true,
                    }),
                    ty: TypeDb::PROPERTY,
                    span,
                }
            }
            AssertionDeclKind::Sequence => {
                comp.emit(errors::recursive_assertion_decl("sequence", &name, span));
                Expression::invalid(span)
            }
            AssertionDeclKind::Let => {
                comp.emit(errors::recursive_assertion_decl("let declaration", &name, span));
                Expression::invalid(span)
            }
        };
    }

    // Map ordered and named actuals onto the formal ports.
    let mut actual_syntax: Vec<Option<Option<&'s ast::Expr>>> = vec![None; ports.len()];
    let mut ordered_pos = 0usize;
    let mut ok = true;
    for arg in args {
        match arg.name {
            Some(formal_name) => {
                match ports
                    .iter()
                    .position(|&p| comp.symbol(p).name == Some(formal_name))
                {
                    Some(pos) => actual_syntax[pos] = Some(arg.expr.as_ref()),
                    None => {
                        let n = comp.interner.resolve(formal_name).to_string();
                        comp.emit(errors::assertion_arg_mismatch(
                            &format!("`{name}` has no formal argument named `{n}`"),
                            arg.span,
                        ));
                        ok = false;
                    }
                }
            }
            None => {
                if ordered_pos >= ports.len() {
                    comp.emit(errors::assertion_arg_mismatch(
                        &format!("too many arguments to `{name}`"),
                        arg.span,
                    ));
                    ok = false;
                } else {
                    actual_syntax[ordered_pos] = Some(arg.expr.as_ref());
                    ordered_pos += 1;
                }
            }
        }
    }
    if !ok {
        return Expression::invalid(span);
    }

    // Resolve each formal to captured syntax: an explicit actual, the
    // declared default, or a diagnosed hole. Explicitly empty actuals
    // (`.a()`) fall back to the default as well.
    let mut captured = Vec::with_capacity(ports.len());
    for (i, &port) in ports.iter().enumerate() {
        let (default, local_direction, port_name) = match &comp.symbol(port).kind {
            SymbolKind::LocalAssertionVar(_) => {
                let d = port_default(comp, decl_scope, port);
                (d, local_direction_of(comp, decl_scope, port), comp.symbol(port).name)
            }
            _ => (
                port_default(comp, decl_scope, port),
                None,
                comp.symbol(port).name,
            ),
        };
        let (chosen, from_default): (Option<&'s ast::Expr>, bool) = match actual_syntax[i] {
            Some(Some(expr)) => (Some(expr), false),
            Some(None) | None => (default, true),
        };
        let Some(port_name) = port_name else { continue };
        match chosen {
            Some(expr) => {
                // Output/inout local-variable formals require the actual
                // to resolve to another local assertion variable; those
                // actuals are recorded as drivers.
                if matches!(
                    local_direction,
                    Some(ast::LocalVarDirection::Output | ast::LocalVarDirection::InOut)
                ) {
                    check_local_var_actual(comp, expr, port_name, ctx, span);
                }
                // Explicit actuals rebind in the call-site context;
                // defaults rebind in the declaration's own context.
                let context = if from_default {
                    BindContext {
                        scope: decl_scope,
                        location: LookupLocation::MAX,
                        flags: ctx.flags,
                        target_type: None,
                        subroutine: ctx.subroutine,
                    }
                } else {
                    *ctx
                };
                captured.push((
                    port_name,
                    CapturedActual {
                        syntax: Some(expr),
                        context,
                    },
                ));
            }
            None => {
                let n = comp.interner.resolve(port_name).to_string();
                comp.emit(errors::assertion_arg_mismatch(
                    &format!("missing actual for formal argument `{n}`"),
                    span,
                ));
                return Expression::invalid(span);
            }
        }
    }

    // Expand the body with the frame pushed so formal references rebind
    // to their captured actuals.
    comp.push_assertion_frame(ExpansionFrame {
        decl,
        actuals: captured,
    });
    let body_ctx = BindContext {
        scope: decl_scope,
        location: LookupLocation::MAX,
        flags: body_flags(kind, ctx),
        target_type: None,
        subroutine: ctx.subroutine,
    };
    let body = expr::bind(comp, body_syntax, &body_ctx);
    comp.pop_assertion_frame();

    if body.bad() {
        return Expression::invalid(span);
    }
    let ty = match kind {
        AssertionDeclKind::Sequence => TypeDb::SEQUENCE,
        AssertionDeclKind::Property => TypeDb::PROPERTY,
        AssertionDeclKind::Let => body.ty,
    };
    Expression {
        kind: ExpressionKind::AssertionInstance(AssertionInstance {
            symbol: decl,
            kind,
            body: Some(Box::new(body)),
            is_recursive_property: false,
        }),
        ty,
        span,
    }
}

fn body_flags(kind: AssertionDeclKind, ctx: &BindContext) -> BindFlags {
    let mut flags = ctx.flags;
    match kind {
        AssertionDeclKind::Sequence | AssertionDeclKind::Property => {
            flags |= BindFlags::ASSERTION_EXPR;
        }
        AssertionDeclKind::Let => {}
    }
    flags
}

/// If `name` refers to a formal of the declaration currently being
/// expanded, rebinds the captured actual in its call-site context.
///
/// The top expansion frame is taken off the stack while the actual
/// binds: actuals live in the caller's world, where this declaration's
/// formals are not visible (otherwise an actual spelled like a formal
/// would expand forever).
pub fn try_expand_formal(
    comp: &mut Compilation<'_>,
    name: Ident,
    _ctx: &BindContext,
) -> Option<Expression> {
    let (syntax, mut context) = comp.current_assertion_actual(name)?;
    let syntax = syntax?;
    let frame = comp.take_assertion_frame()?;
    // The actual is rebound on each reference, in the context captured
    // at the instantiation site.
    context.flags |= BindFlags::ASSERTION_EXPR;
    let bound = expr::bind(comp, syntax, &context.without_target());
    comp.restore_assertion_frame(frame);
    Some(bound)
}

fn port_default<'s>(
    comp: &Compilation<'s>,
    decl: SymbolId,
    port: SymbolId,
) -> Option<&'s ast::Expr> {
    let port_name = comp.symbol(port).name?;
    match &comp.symbol(decl).kind {
        SymbolKind::Sequence(data) | SymbolKind::Property(data) | SymbolKind::Let(data) => data
            .syntax
            .ports
            .iter()
            .find(|p| p.name == port_name)
            .and_then(|p| p.default.as_ref()),
        _ => None,
    }
}

fn local_direction_of(
    comp: &Compilation<'_>,
    decl: SymbolId,
    port: SymbolId,
) -> Option<ast::LocalVarDirection> {
    let port_name = comp.symbol(port).name?;
    match &comp.symbol(decl).kind {
        SymbolKind::Sequence(data) | SymbolKind::Property(data) | SymbolKind::Let(data) => data
            .syntax
            .ports
            .iter()
            .find(|p| p.name == port_name)
            .and_then(|p| p.local_direction),
        _ => None,
    }
}

/// An actual bound to an output/inout local-variable formal must itself
/// resolve to a local assertion variable; the write-through is recorded
/// as a driver on it.
fn check_local_var_actual<'s>(
    comp: &mut Compilation<'s>,
    actual: &'s ast::Expr,
    formal_name: Ident,
    ctx: &BindContext,
    span: Span,
) {
    let bound = expr::bind(comp, actual, &ctx.without_target());
    if bound.bad() {
        return;
    }
    let is_local = bound
        .symbol_ref()
        .map_or(false, |s| matches!(comp.symbol(s).kind, SymbolKind::LocalAssertionVar(_)));
    if !is_local {
        let n = comp.interner.resolve(formal_name).to_string();
        comp.emit(errors::local_formal_needs_local_actual(&n, bound.span));
        return;
    }
    drivers::require_lvalue(
        comp,
        &bound,
        ctx,
        DriverKind::Other,
        DriverSource::AssertionLocalVar,
        false,
        span,
    );
}

impl<'s> ExpansionFrame<'s> {
    pub(crate) fn decl(&self) -> SymbolId {
        self.decl
    }

    pub(crate) fn actual_for(&self, name: Ident) -> Option<(Option<&'s ast::Expr>, BindContext)> {
        self.actuals
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| (a.syntax, a.context))
    }
}
