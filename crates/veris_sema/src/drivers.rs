//! Driver and assignability tracking.
//!
//! Every procedural or continuous assignment records a driver against
//! the longest static prefix of its target — the deepest sub-expression
//! whose selects are all compile-time constants. Immediate rules (const
//! variables, nets in procedural code, clock-variable direction) are
//! checked as drivers are recorded; whole-design rules (multiple
//! continuous drivers, mixed `always_comb` writers) run in a finalize
//! pass once the design is fully elaborated.

use crate::compilation::Compilation;
use crate::errors;
use crate::expr::{BindContext, Expression, ExpressionKind};
use crate::symbols::{SymbolId, SymbolKind, VariableLifetime};
use serde::{Deserialize, Serialize};
use veris_source::Span;
use veris_syntax as ast;

/// The coarse kind of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    /// Driven from a procedural block or subroutine.
    Procedural,
    /// Driven by a continuous assignment or port connection.
    Continuous,
    /// Driven some other way (clock variables, assertion local
    /// variable formals).
    Other,
}

/// Where a driver came from, for the finalize-pass process rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverSource {
    /// An `initial` block.
    Initial,
    /// A `final` block.
    Final,
    /// A plain `always` block.
    Always,
    /// An `always_comb` block.
    AlwaysComb,
    /// An `always_latch` block.
    AlwaysLatch,
    /// An `always_ff` block.
    AlwaysFf,
    /// A continuous assignment.
    Continuous,
    /// A clocking block output.
    ClockVar,
    /// An assertion local-variable formal.
    AssertionLocalVar,
    /// A subroutine body.
    Subroutine,
    /// Anything else.
    Other,
}

/// One step of a static prefix path, used to decide whether two drivers
/// of the same symbol touch overlapping storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixStep {
    /// A constant element select.
    Index(i64),
    /// A constant range select (inclusive bounds, normalized low..high).
    Range(i64, i64),
    /// A struct/union member access.
    Member(u32),
}

impl PrefixStep {
    fn overlaps(&self, other: &PrefixStep) -> bool {
        match (self, other) {
            (PrefixStep::Index(a), PrefixStep::Index(b)) => a == b,
            (PrefixStep::Member(a), PrefixStep::Member(b)) => a == b,
            (PrefixStep::Range(al, ah), PrefixStep::Range(bl, bh)) => al <= bh && bl <= ah,
            (PrefixStep::Index(a), PrefixStep::Range(l, h))
            | (PrefixStep::Range(l, h), PrefixStep::Index(a)) => l <= a && a <= h,
            // A member step against a select step means the shapes
            // disagree; treat as overlapping to stay conservative.
            _ => true,
        }
    }
}

/// A recorded driver: what kind of assignment, from which process, and
/// the longest static prefix of the driven lvalue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    /// Procedural, continuous, or other.
    pub kind: DriverKind,
    /// The originating process flavor.
    pub source: DriverSource,
    /// `true` for non-blocking assignments.
    pub non_blocking: bool,
    /// The longest static prefix of the driven expression.
    pub prefix: Expression,
    /// The prefix as comparable path steps (root symbol excluded).
    pub path: Vec<PrefixStep>,
    /// The scope the assignment was bound in (the procedural block for
    /// procedural drivers); `None` when there is no meaningful context.
    pub context: Option<SymbolId>,
    /// The assignment's source location.
    pub span: Span,
}

/// Checks that a bound expression is a legal assignment target in this
/// context and records a driver against its root symbol.
///
/// Returns `false` (after emitting a diagnostic) when the expression is
/// not assignable here. Concat targets recurse into each element.
pub fn require_lvalue(
    comp: &mut Compilation<'_>,
    lhs: &Expression,
    ctx: &BindContext,
    kind: DriverKind,
    source: DriverSource,
    non_blocking: bool,
    span: Span,
) -> bool {
    if lhs.bad() {
        return false;
    }
    if let ExpressionKind::Concat(parts) = &lhs.kind {
        let mut ok = true;
        for part in parts {
            if let Some(sym) = root_symbol(part) {
                if matches!(comp.symbol(sym).kind, SymbolKind::ClockVar(_)) {
                    comp.emit(errors::clock_var_in_concat(part.span));
                    ok = false;
                    continue;
                }
            }
            ok &= require_lvalue(comp, part, ctx, kind, source, non_blocking, span);
        }
        return ok;
    }

    let Some(root) = root_symbol(lhs) else {
        comp.emit(errors::not_an_lvalue(lhs.span));
        return false;
    };
    let name = comp.symbol_name(root);

    match &comp.symbol(root).kind {
        SymbolKind::Variable(data) => {
            let is_const = data.is_const;
            let lifetime = data.lifetime;
            if is_const && !const_write_allowed(comp, root, ctx) {
                comp.emit(errors::assignment_to_const(&name, span));
                return false;
            }
            let is_class_property = comp
                .symbol(root)
                .parent
                .map_or(false, |p| matches!(comp.symbol(p).kind, SymbolKind::Class(_)));
            if lifetime == VariableLifetime::Automatic && non_blocking && !is_class_property {
                comp.emit(errors::nonblocking_on_automatic(&name, span));
                return false;
            }
        }
        SymbolKind::Net(_) => {
            if kind == DriverKind::Procedural {
                comp.emit(errors::procedural_assign_to_net(&name, span));
                return false;
            }
        }
        SymbolKind::ClockVar(data) => {
            if data.direction == ast::Direction::Input {
                comp.emit(errors::clock_var_input_write(&name, span));
                return false;
            }
            if kind == DriverKind::Procedural && !non_blocking {
                comp.emit(errors::clock_var_blocking(&name, span));
                return false;
            }
        }
        SymbolKind::FormalArgument(_)
        | SymbolKind::LocalAssertionVar(_)
        | SymbolKind::AssertionPort(_)
        | SymbolKind::Genvar(_) => {}
        _ => {
            comp.emit(errors::not_an_lvalue(lhs.span));
            return false;
        }
    }

    let (prefix, path) = longest_static_prefix(comp, lhs);
    let driver = Driver {
        kind,
        source,
        non_blocking,
        prefix: prefix.clone(),
        path,
        context: Some(ctx.scope),
        span,
    };
    if let Some(drivers) = comp.symbol_mut(root).drivers_mut() {
        drivers.push(driver);
    }
    true
}

/// A const variable may be written only from the constructor of its
/// enclosing class, and only when it was declared without an
/// initializer.
fn const_write_allowed(comp: &Compilation<'_>, var: SymbolId, ctx: &BindContext) -> bool {
    let sym = comp.symbol(var);
    let has_initializer = match &sym.kind {
        SymbolKind::Variable(data) => data.value.initializer.is_some(),
        _ => false,
    };
    if has_initializer {
        return false;
    }
    let Some(sub) = ctx.subroutine else {
        return false;
    };
    let is_ctor = matches!(
        &comp.symbol(sub).kind,
        SymbolKind::Subroutine(data) if data.is_constructor
    );
    if !is_ctor {
        return false;
    }
    // The constructor must belong to the same class as the variable.
    sym.parent.is_some() && sym.parent == comp.symbol(sub).parent
}

fn root_symbol(expr: &Expression) -> Option<SymbolId> {
    match &expr.kind {
        ExpressionKind::NamedValue(s) | ExpressionKind::HierarchicalValue(s) => Some(*s),
        ExpressionKind::ElementSelect { value, .. }
        | ExpressionKind::RangeSelect { value, .. }
        | ExpressionKind::MemberAccess { value, .. } => root_symbol(value),
        _ => None,
    }
}

/// Computes the longest static prefix of an lvalue: the deepest
/// sub-expression whose selects are all compile-time constants.
///
/// Returns the prefix expression together with its path steps from the
/// root symbol.
pub fn longest_static_prefix<'a>(
    comp: &mut Compilation<'_>,
    expr: &'a Expression,
) -> (&'a Expression, Vec<PrefixStep>) {
    match &expr.kind {
        ExpressionKind::NamedValue(_) | ExpressionKind::HierarchicalValue(_) => {
            (expr, Vec::new())
        }
        ExpressionKind::ElementSelect { value, index } => {
            let (inner, mut path) = longest_static_prefix(comp, value);
            // If a shallower select was already non-constant, stop there.
            if !std::ptr::eq(inner as *const _, value.as_ref() as *const _) {
                return (inner, path);
            }
            match comp.try_eval_const_int(index) {
                Some(i) => {
                    path.push(PrefixStep::Index(i));
                    (expr, path)
                }
                None => (inner, path),
            }
        }
        ExpressionKind::RangeSelect {
            value, left, right, ..
        } => {
            let (inner, mut path) = longest_static_prefix(comp, value);
            if !std::ptr::eq(inner as *const _, value.as_ref() as *const _) {
                return (inner, path);
            }
            match (comp.try_eval_const_int(left), comp.try_eval_const_int(right)) {
                (Some(l), Some(r)) => {
                    path.push(PrefixStep::Range(l.min(r), l.max(r)));
                    (expr, path)
                }
                _ => (inner, path),
            }
        }
        ExpressionKind::MemberAccess {
            value, field_index, ..
        } => {
            let (inner, mut path) = longest_static_prefix(comp, value);
            if !std::ptr::eq(inner as *const _, value.as_ref() as *const _) {
                return (inner, path);
            }
            path.push(PrefixStep::Member(*field_index));
            (expr, path)
        }
        _ => (expr, Vec::new()),
    }
}

/// Whether two driver paths can touch the same storage. An empty path
/// drives the whole symbol and overlaps everything.
pub fn paths_overlap(a: &[PrefixStep], b: &[PrefixStep]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.overlaps(y))
}

/// The finalize pass: whole-design driver rules that need every driver
/// recorded before they can be judged.
pub fn check_all(comp: &mut Compilation<'_>) {
    let count = comp.symbol_count();
    for raw in 0..count {
        let id = SymbolId::from_raw(raw as u32);
        check_symbol(comp, id);
    }
}

fn check_symbol(comp: &mut Compilation<'_>, id: SymbolId) {
    let sym = comp.symbol(id);
    let Some(all) = sym.drivers() else { return };
    if all.len() < 2 {
        return;
    }
    let is_uwire = matches!(&sym.kind, SymbolKind::Net(n) if n.kind == ast::NetKind::Uwire);
    let is_net = matches!(&sym.kind, SymbolKind::Net(_));
    let drivers: Vec<Driver> = all.clone();
    let name = comp.symbol_name(id);
    let strict = comp.options.strict_driver_checking;
    let allow_dup_initial = comp.options.allow_dup_initial_drivers;

    for (i, a) in drivers.iter().enumerate() {
        for b in drivers.iter().skip(i + 1) {
            let overlap = if strict {
                true
            } else {
                paths_overlap(&a.path, &b.path)
            };
            if !overlap {
                continue;
            }
            if is_uwire {
                comp.emit(errors::uwire_violation(&name, b.span));
                continue;
            }
            let comb = a.source == DriverSource::AlwaysComb || b.source == DriverSource::AlwaysComb;
            let same_process = a.context.is_some() && a.context == b.context;
            if comb && !same_process {
                let initial_pair = matches!(
                    (a.source, b.source),
                    (DriverSource::AlwaysComb, DriverSource::Initial)
                        | (DriverSource::Initial, DriverSource::AlwaysComb)
                );
                if initial_pair && allow_dup_initial {
                    continue;
                }
                comp.emit(errors::mixed_comb_drivers(&name, b.span, a.span));
                continue;
            }
            if !is_net
                && a.kind == DriverKind::Continuous
                && b.kind == DriverKind::Continuous
            {
                comp.emit(errors::multiple_continuous_drivers(&name, b.span, a.span));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_step_overlap() {
        assert!(PrefixStep::Index(3).overlaps(&PrefixStep::Index(3)));
        assert!(!PrefixStep::Index(3).overlaps(&PrefixStep::Index(4)));
        assert!(PrefixStep::Range(0, 7).overlaps(&PrefixStep::Range(7, 9)));
        assert!(!PrefixStep::Range(0, 3).overlaps(&PrefixStep::Range(4, 7)));
        assert!(PrefixStep::Index(5).overlaps(&PrefixStep::Range(0, 7)));
        assert!(!PrefixStep::Index(8).overlaps(&PrefixStep::Range(0, 7)));
        assert!(PrefixStep::Member(1).overlaps(&PrefixStep::Member(1)));
        assert!(!PrefixStep::Member(1).overlaps(&PrefixStep::Member(2)));
    }

    #[test]
    fn whole_symbol_path_overlaps_everything() {
        assert!(paths_overlap(&[], &[PrefixStep::Index(0)]));
        assert!(paths_overlap(&[], &[]));
        assert!(paths_overlap(
            &[PrefixStep::Index(1)],
            &[PrefixStep::Index(1), PrefixStep::Member(0)]
        ));
    }

    #[test]
    fn disjoint_paths_do_not_overlap() {
        assert!(!paths_overlap(
            &[PrefixStep::Index(0)],
            &[PrefixStep::Index(1)]
        ));
        assert!(!paths_overlap(
            &[PrefixStep::Member(0), PrefixStep::Index(2)],
            &[PrefixStep::Member(0), PrefixStep::Index(3)]
        ));
    }
}
