//! Lazy resolution of covergroup members and coverage bins.
//!
//! Bin resolution runs at most once per bin and binds, in order: the
//! `iff` guard, the value and range lists, the transition lists, and the
//! `with` filter. The state machine is the bin's lazy cell:
//! `Unresolved → Resolving → Resolved`. Observing `Resolving` on entry
//! means a bin's expressions refer back to the bin, which is diagnosed
//! as a cycle rather than re-entered.

use crate::compilation::Compilation;
use crate::errors;
use crate::expr::{self, BindContext, BindFlags, Expression};
use crate::lazy::Lazy;
use crate::lookup::LookupLocation;
use crate::symbols::{ResolvedBin, SymbolId, SymbolKind};
use veris_syntax as ast;

/// Resolves everything inside a covergroup symbol: the sampling event,
/// each coverpoint's guard and bins, and each cross's targets.
pub fn resolve_covergroup(comp: &mut Compilation<'_>, covergroup: SymbolId) {
    let (members, event) = match &comp.symbol(covergroup).kind {
        SymbolKind::Covergroup(data) => (data.scope.members.clone(), data.syntax.event.as_ref()),
        _ => return,
    };
    if let Some(event) = event {
        let ctx = coverage_ctx(comp, covergroup);
        let _ = expr::bind(comp, event, &ctx.with_flags(BindFlags::EVENT_EXPRESSION));
    }
    for member in members {
        match &comp.symbol(member).kind {
            SymbolKind::Coverpoint(_) => resolve_coverpoint(comp, member),
            SymbolKind::CoverCross(_) => resolve_cross(comp, member),
            _ => {}
        }
    }
}

fn resolve_coverpoint(comp: &mut Compilation<'_>, coverpoint: SymbolId) {
    let (syntax, bins, already) = match &comp.symbol(coverpoint).kind {
        SymbolKind::Coverpoint(data) => (
            data.syntax,
            data.scope.members.clone(),
            data.iff.is_resolved(),
        ),
        _ => return,
    };
    if !already {
        let ctx = coverage_ctx(comp, coverpoint);
        let iff = syntax.iff.as_ref().map(|e| expr::bind(comp, e, &ctx));
        // The covered expression itself must bind cleanly too.
        let _ = expr::bind(comp, &syntax.expr, &ctx);
        if let SymbolKind::Coverpoint(data) = &mut comp.symbol_mut(coverpoint).kind {
            data.iff = Lazy::Resolved(iff);
        }
    }
    for bin in bins {
        resolve_bin(comp, bin);
    }
}

/// Resolves one coverage bin, running at most once.
pub fn resolve_bin(comp: &mut Compilation<'_>, bin: SymbolId) {
    let syntax = match &comp.symbol(bin).kind {
        SymbolKind::CoverageBin(data) => {
            match &data.resolved {
                Lazy::Resolved(_) => return,
                Lazy::Resolving => {
                    let name = comp.symbol_name(bin);
                    let span = comp.symbol(bin).span;
                    comp.emit(errors::coverage_bin_cycle(&name, span));
                    return;
                }
                Lazy::Unresolved => data.syntax,
            }
        }
        _ => return,
    };
    if let SymbolKind::CoverageBin(data) = &mut comp.symbol_mut(bin).kind {
        data.resolved = Lazy::Resolving;
    }

    let ctx = coverage_ctx(comp, bin);
    let iff = syntax.iff.as_ref().map(|e| expr::bind(comp, e, &ctx));
    let mut values = Vec::new();
    let mut transitions = Vec::new();
    let mut with_filter = None;
    match &syntax.values {
        ast::BinsValues::List(ranges) => {
            bind_ranges(comp, ranges, &ctx, &mut values);
        }
        ast::BinsValues::Transitions(seqs) => {
            for seq in seqs {
                let bound: Vec<Expression> =
                    seq.iter().map(|e| expr::bind(comp, e, &ctx)).collect();
                transitions.push(bound);
            }
        }
        ast::BinsValues::Default => {}
        ast::BinsValues::WithFilter {
            values: ranges,
            filter,
        } => {
            bind_ranges(comp, ranges, &ctx, &mut values);
            with_filter = Some(expr::bind(comp, filter, &ctx));
        }
    }

    if let SymbolKind::CoverageBin(data) = &mut comp.symbol_mut(bin).kind {
        data.resolved = Lazy::Resolved(ResolvedBin {
            iff,
            values,
            transitions,
            with_filter,
        });
    }
}

fn bind_ranges<'s>(
    comp: &mut Compilation<'s>,
    ranges: &'s [ast::ValueRange],
    ctx: &BindContext,
    out: &mut Vec<Expression>,
) {
    for range in ranges {
        out.push(expr::bind(comp, &range.low, ctx));
        if let Some(high) = &range.high {
            out.push(expr::bind(comp, high, ctx));
        }
    }
}

fn resolve_cross(comp: &mut Compilation<'_>, cross: SymbolId) {
    let (syntax, already) = match &comp.symbol(cross).kind {
        SymbolKind::CoverCross(data) => (data.syntax, data.targets.is_resolved()),
        _ => return,
    };
    if already {
        return;
    }
    let parent = comp.symbol(cross).parent;
    let mut resolved = Vec::new();
    for &target in &syntax.targets {
        let found = parent
            .and_then(|p| comp.symbol(p).scope().and_then(|sd| sd.find(target)));
        match found {
            Some(sym) if matches!(comp.symbol(sym).kind, SymbolKind::Coverpoint(_)) => {
                resolved.push(sym);
            }
            _ => {
                let n = comp.interner.resolve(target).to_string();
                comp.emit(errors::undeclared_identifier(&n, syntax.span, None));
            }
        }
    }
    if let SymbolKind::CoverCross(data) = &mut comp.symbol_mut(cross).kind {
        data.targets = Lazy::Resolved(resolved);
    }
}

/// The binding context for coverage expressions: coverpoint references
/// are allowed, and evaluation uses the covergroup relaxations.
fn coverage_ctx(comp: &Compilation<'_>, member: SymbolId) -> BindContext {
    let scope = comp
        .symbol(member)
        .parent
        .and_then(|p| comp.nearest_non_coverage_scope(p))
        .unwrap_or(member);
    BindContext::new(scope, LookupLocation::MAX)
        .with_flags(BindFlags::ALLOW_COVERPOINT | BindFlags::NON_PROCEDURAL)
}
