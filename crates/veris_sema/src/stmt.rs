//! Bound statements for procedural blocks and subroutine bodies.
//!
//! Only the statement forms the elaboration core needs are modeled:
//! assignments (which record drivers), control flow that the constant
//! evaluator interprets, event controls, and block-local declarations.

use crate::compilation::Compilation;
use crate::drivers::DriverSource;
use crate::expr::{self, BindContext, BindFlags, Expression};
use crate::symbols::{SymbolId, SymbolKind, ValueData, VariableData, VariableLifetime};
use serde::{Deserialize, Serialize};
use veris_syntax as ast;

/// A bound statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// A `begin ... end` block.
    Block(Vec<Statement>),
    /// An expression statement, including assignments.
    Expr(Expression),
    /// An `if`/`else` statement.
    If {
        /// The condition.
        cond: Expression,
        /// The then branch.
        then_stmt: Box<Statement>,
        /// The optional else branch.
        else_stmt: Option<Box<Statement>>,
    },
    /// A `while` loop.
    While {
        /// The loop condition.
        cond: Expression,
        /// The loop body.
        body: Box<Statement>,
    },
    /// A statement under an event control.
    Timed {
        /// The bound event.
        event: Expression,
        /// The guarded statement.
        stmt: Box<Statement>,
    },
    /// A block-local variable declaration.
    VarDecl {
        /// The declared variable symbol.
        symbol: SymbolId,
        /// Its bound initializer, if any.
        initializer: Option<Expression>,
    },
    /// A `return` statement.
    Return(Option<Expression>),
    /// A placeholder for a statement that failed to bind.
    Invalid,
}

/// Binds one statement in the given context, recording drivers for
/// assignment targets.
pub fn bind_stmt<'s>(
    comp: &mut Compilation<'s>,
    syntax: &'s ast::Stmt,
    ctx: &BindContext,
    source: DriverSource,
) -> Statement {
    match syntax {
        ast::Stmt::Block { stmts, .. } => Statement::Block(
            stmts
                .iter()
                .map(|s| bind_stmt(comp, s, ctx, source))
                .collect(),
        ),
        ast::Stmt::Assign {
            lhs,
            rhs,
            kind,
            span,
        } => {
            let non_blocking = *kind == ast::AssignKind::NonBlocking;
            let e = expr::bind_assignment(comp, lhs, rhs, ctx, non_blocking, source, *span);
            Statement::Expr(e)
        }
        ast::Stmt::ExprStmt { expr, .. } => {
            Statement::Expr(expr::bind(comp, expr, &ctx.without_target()))
        }
        ast::Stmt::If {
            cond,
            then_stmt,
            else_stmt,
            ..
        } => {
            let cond = expr::bind(comp, cond, &ctx.without_target());
            let then_stmt = Box::new(bind_stmt(comp, then_stmt, ctx, source));
            let else_stmt = else_stmt
                .as_ref()
                .map(|s| Box::new(bind_stmt(comp, s, ctx, source)));
            Statement::If {
                cond,
                then_stmt,
                else_stmt,
            }
        }
        ast::Stmt::While { cond, body, .. } => {
            let cond = expr::bind(comp, cond, &ctx.without_target());
            let body = Box::new(bind_stmt(comp, body, ctx, source));
            Statement::While { cond, body }
        }
        ast::Stmt::Timed {
            edge, event, stmt, ..
        } => {
            let event_ctx = ctx.with_flags(BindFlags::EVENT_EXPRESSION);
            let operand = expr::bind(comp, event, &event_ctx.without_target());
            let span = event.span();
            let event = Expression {
                ty: crate::types::TypeDb::VOID,
                kind: crate::expr::ExpressionKind::ClockingEvent {
                    edge: *edge,
                    operand: Box::new(operand),
                },
                span,
            };
            let stmt = Box::new(bind_stmt(comp, stmt, ctx, source));
            Statement::Timed { event, stmt }
        }
        ast::Stmt::VarDecl(decl) => bind_local_var_decl(comp, decl, ctx),
        ast::Stmt::Return { expr, .. } => {
            let bound = expr.as_ref().map(|e| {
                let target = ctx
                    .subroutine
                    .map(|s| comp.subroutine_return_type(s));
                let inner = match target {
                    Some(t) => ctx.with_target(t),
                    None => ctx.without_target(),
                };
                let e = expr::bind(comp, e, &inner);
                match target {
                    Some(t) if !e.bad() => {
                        let span = e.span;
                        expr::convert_for_assignment(comp, t, e, span)
                    }
                    _ => e,
                }
            });
            Statement::Return(bound)
        }
        ast::Stmt::Error(_) => Statement::Invalid,
    }
}

/// Binds a block-local variable declaration, creating one symbol per
/// declarator in the enclosing procedural scope.
fn bind_local_var_decl<'s>(
    comp: &mut Compilation<'s>,
    decl: &'s ast::VarDecl,
    ctx: &BindContext,
) -> Statement {
    let mut stmts = Vec::new();
    for declarator in &decl.declarators {
        let lifetime = match decl.lifetime {
            Some(ast::Lifetime::Static) => VariableLifetime::Static,
            Some(ast::Lifetime::Automatic) => VariableLifetime::Automatic,
            None => comp.default_lifetime(ctx.scope),
        };
        let mut value = ValueData::new(Some(&decl.ty));
        value.unpacked_dims = &declarator.dims;
        value.initializer = declarator.init.as_ref();
        let sym = comp.add_symbol_to_scope(
            ctx.scope,
            Some(declarator.name),
            declarator.span,
            SymbolKind::Variable(VariableData {
                value,
                lifetime,
                is_const: decl.is_const,
            }),
        );
        let ty = comp.value_type(sym);
        let initializer = declarator.init.as_ref().map(|init| {
            let inner = ctx.with_target(ty);
            let e = expr::bind(comp, init, &inner);
            if e.bad() {
                e
            } else {
                let span = e.span;
                expr::convert_for_assignment(comp, ty, e, span)
            }
        });
        stmts.push(Statement::VarDecl {
            symbol: sym,
            initializer,
        });
    }
    if stmts.len() == 1 {
        stmts.pop().unwrap()
    } else {
        Statement::Block(stmts)
    }
}

/// Binds a whole statement list in order.
pub fn bind_stmt_list<'s>(
    comp: &mut Compilation<'s>,
    stmts: &'s [ast::Stmt],
    ctx: &BindContext,
    source: DriverSource,
) -> Vec<Statement> {
    stmts
        .iter()
        .map(|s| bind_stmt(comp, s, ctx, source))
        .collect()
}
