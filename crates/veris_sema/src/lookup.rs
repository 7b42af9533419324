//! Name lookup: unqualified, package, wildcard-import, and hierarchical
//! resolution with visibility checks and typo correction.

use crate::compilation::Compilation;
use crate::errors;
use crate::symbols::{Symbol, SymbolId, SymbolKind};
use bitflags::bitflags;
use veris_common::Ident;
use veris_source::Span;

bitflags! {
    /// Modifiers for a lookup operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LookupFlags: u32 {
        /// Treat the name as hierarchical even if it has one segment.
        const FORCE_HIERARCHICAL = 1 << 0;
        /// The result may not have selects applied to it.
        const NO_SELECTORS = 1 << 1;
        /// Ignore the lookup location; later declarations are visible.
        const ALLOW_DECLARED_AFTER = 1 << 2;
        /// The name is expected to resolve to a type.
        const TYPE_REFERENCE = 1 << 3;
        /// Skip wildcard imports during resolution.
        const DISALLOW_WILDCARD = 1 << 4;
    }
}

/// A position within a scope bounding which members are visible: only
/// members declared strictly before `index` can be found when the lookup
/// starts in `scope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupLocation {
    /// The scope the index applies to; `None` disables the check.
    pub scope: Option<SymbolId>,
    /// Members with a declaration index below this are visible.
    pub index: u32,
}

impl LookupLocation {
    /// A location that sees everything, everywhere.
    pub const MAX: LookupLocation = LookupLocation {
        scope: None,
        index: u32::MAX,
    };

    /// The location just before `symbol`'s own declaration.
    pub fn before(symbol: &Symbol<'_>) -> Self {
        Self {
            scope: symbol.parent,
            index: symbol.index,
        }
    }

    /// The location just after `symbol`'s declaration.
    pub fn after(symbol: &Symbol<'_>) -> Self {
        Self {
            scope: symbol.parent,
            index: symbol.index + 1,
        }
    }
}

/// Resolves a simple name from `start_scope` without emitting
/// diagnostics.
///
/// Resolution order: members of the starting scope declared before the
/// lookup location, its wildcard imports, then each enclosing scope out
/// to the compilation unit, then all `$unit` scopes.
pub fn unqualified(
    comp: &mut Compilation<'_>,
    start_scope: SymbolId,
    name: Ident,
    location: LookupLocation,
    flags: LookupFlags,
) -> Option<SymbolId> {
    lookup_chain(comp, start_scope, name, location, flags).found
}

/// Resolves a simple name, emitting `E303`/`E304` with a typo suggestion
/// when resolution fails.
pub fn unqualified_or_error(
    comp: &mut Compilation<'_>,
    start_scope: SymbolId,
    name: Ident,
    location: LookupLocation,
    flags: LookupFlags,
    span: Span,
) -> Option<SymbolId> {
    let outcome = lookup_chain(comp, start_scope, name, location, flags);
    if let Some(found) = outcome.found {
        return Some(found);
    }
    let name_str = comp.interner.resolve(name).to_string();
    if let Some(too_late) = outcome.declared_later {
        let decl = comp.symbol(too_late).span;
        comp.emit(errors::used_before_declared(&name_str, span, decl));
        return None;
    }
    let suggestion = typo_correct(comp, start_scope, name);
    let suggestion_parts = suggestion.map(|(candidate, decl_span)| {
        (comp.interner.resolve(candidate).to_string(), decl_span)
    });
    comp.emit(errors::undeclared_identifier(
        &name_str,
        span,
        suggestion_parts.as_ref().map(|(s, sp)| (s.as_str(), *sp)),
    ));
    None
}

struct LookupOutcome {
    found: Option<SymbolId>,
    declared_later: Option<SymbolId>,
}

fn lookup_chain(
    comp: &mut Compilation<'_>,
    start_scope: SymbolId,
    name: Ident,
    location: LookupLocation,
    flags: LookupFlags,
) -> LookupOutcome {
    let mut declared_later = None;
    let mut current = Some(start_scope);
    while let Some(scope_id) = current {
        comp.elaborate_scope(scope_id);
        let scope_sym = comp.symbol(scope_id);
        let parent = scope_sym.parent;
        let mut import_packages = Vec::new();
        let mut candidate = None;
        if let Some(sd) = scope_sym.scope() {
            candidate = sd.find(name);
            if !flags.contains(LookupFlags::DISALLOW_WILDCARD) {
                for &imp in &sd.imports {
                    if let SymbolKind::WildcardImport(data) = &comp.symbol(imp).kind {
                        let imp_index = comp.symbol(imp).index;
                        let visible = location.scope != Some(scope_id)
                            || imp_index < location.index
                            || flags.contains(LookupFlags::ALLOW_DECLARED_AFTER);
                        if visible {
                            import_packages.push(data.package);
                        }
                    }
                }
            }
        }
        if let Some(found) = candidate {
            let fsym = comp.symbol(found);
            let visible = flags.contains(LookupFlags::ALLOW_DECLARED_AFTER)
                || location.scope != Some(scope_id)
                || fsym.index < location.index
                || !order_sensitive(fsym);
            if visible {
                return LookupOutcome {
                    found: deref_import(comp, found),
                    declared_later,
                };
            }
            declared_later = Some(found);
        }
        for package in import_packages {
            if let Some(pkg) = comp.package(package) {
                comp.elaborate_scope(pkg);
                if let Some(member) = comp.symbol(pkg).scope().and_then(|sd| sd.find(name)) {
                    return LookupOutcome {
                        found: Some(member),
                        declared_later,
                    };
                }
            }
        }
        current = parent;
    }
    // Fall back to the compilation units ($unit).
    for unit in comp.units() {
        comp.elaborate_scope(unit);
        if let Some(member) = comp.symbol(unit).scope().and_then(|sd| sd.find(name)) {
            return LookupOutcome {
                found: Some(member),
                declared_later,
            };
        }
    }
    LookupOutcome {
        found: None,
        declared_later,
    }
}

/// An explicit import found in a scope forwards to the imported package
/// member; everything else resolves to itself.
fn deref_import(comp: &mut Compilation<'_>, sym: SymbolId) -> Option<SymbolId> {
    let (package, name) = match &comp.symbol(sym).kind {
        SymbolKind::ExplicitImport(data) => (data.package, data.name?),
        _ => return Some(sym),
    };
    let pkg = comp.package(package)?;
    comp.elaborate_scope(pkg);
    comp.symbol(pkg).scope().and_then(|sd| sd.find(name))
}

/// Declaration order only constrains value-like names; types, packages,
/// subroutines, and design elements are visible throughout their scope.
fn order_sensitive(symbol: &Symbol<'_>) -> bool {
    !matches!(
        symbol.kind,
        SymbolKind::TypeAlias(_)
            | SymbolKind::Subroutine(_)
            | SymbolKind::Class(_)
            | SymbolKind::Sequence(_)
            | SymbolKind::Property(_)
            | SymbolKind::Let(_)
            | SymbolKind::Covergroup(_)
            | SymbolKind::Instance(_)
            | SymbolKind::ClockingBlock(_)
    )
}

/// Resolves a `package::name` reference, emitting diagnostics on
/// failure.
pub fn package_member(
    comp: &mut Compilation<'_>,
    package: Ident,
    name: Ident,
    span: Span,
) -> Option<SymbolId> {
    let Some(pkg) = comp.package(package) else {
        let pkg_str = comp.interner.resolve(package).to_string();
        comp.emit(errors::unknown_package(&pkg_str, span));
        return None;
    };
    comp.elaborate_scope(pkg);
    match comp.symbol(pkg).scope().and_then(|sd| sd.find(name)) {
        Some(member) => Some(member),
        None => {
            let pkg_str = comp.interner.resolve(package).to_string();
            let name_str = comp.interner.resolve(name).to_string();
            comp.emit(errors::unknown_package_member(&pkg_str, &name_str, span));
            None
        }
    }
}

/// Resolves a dotted hierarchical name.
///
/// The first segment resolves with ordinary upward lookup, falling back
/// to the top-level instances in the design root; each further segment
/// steps down into the named member of the previous scope. Failures are
/// diagnosed and return `None`.
pub fn hierarchical(
    comp: &mut Compilation<'_>,
    start_scope: SymbolId,
    parts: &[Ident],
    span: Span,
    flags: LookupFlags,
) -> Option<SymbolId> {
    let first = parts.first()?;
    let mut current = match unqualified(
        comp,
        start_scope,
        *first,
        LookupLocation::MAX,
        flags | LookupFlags::ALLOW_DECLARED_AFTER,
    ) {
        Some(sym) => sym,
        None => {
            // Try the design root's top-level instances.
            let root = comp.root_id()?;
            comp.elaborate_scope(root);
            match comp.symbol(root).scope().and_then(|sd| sd.find(*first)) {
                Some(sym) => sym,
                None => {
                    if !comp.options.lint_mode {
                        let name = comp.interner.resolve(*first).to_string();
                        comp.emit(errors::undeclared_identifier(&name, span, None));
                    }
                    return None;
                }
            }
        }
    };
    for &part in &parts[1..] {
        comp.elaborate_scope(current);
        let next = comp.symbol(current).scope().and_then(|sd| sd.find(part));
        match next {
            Some(sym) => current = sym,
            None => {
                if !comp.options.lint_mode {
                    let name = comp.interner.resolve(part).to_string();
                    comp.emit(errors::undeclared_identifier(&name, span, None));
                }
                return None;
            }
        }
    }
    Some(current)
}

/// Attempts a typo correction for `name` against the visible names in
/// the scope chain, bounded by the compilation-wide correction budget.
fn typo_correct(
    comp: &mut Compilation<'_>,
    start_scope: SymbolId,
    name: Ident,
) -> Option<(Ident, Span)> {
    if !comp.take_typo_budget() {
        return None;
    }
    let target = comp.interner.resolve(name).to_string();
    let threshold = 1 + target.len() / 3;
    let mut best: Option<(usize, String, Ident, Span)> = None;
    let mut current = Some(start_scope);
    while let Some(scope_id) = current {
        let scope_sym = comp.symbol(scope_id);
        if let Some(sd) = scope_sym.scope() {
            for (&cand, &sym) in &sd.name_map {
                let cand_str = comp.interner.resolve(cand);
                let dist = edit_distance(&target, cand_str, threshold + 1);
                if dist <= threshold {
                    let decl_span = comp.symbol(sym).span;
                    // Ties break lexicographically so suggestions do not
                    // depend on hash-map iteration order.
                    let better = best.as_ref().map_or(true, |(d, s, _, _)| {
                        dist < *d || (dist == *d && cand_str < s.as_str())
                    });
                    if better {
                        best = Some((dist, cand_str.to_string(), cand, decl_span));
                    }
                }
            }
        }
        current = scope_sym.parent;
    }
    best.map(|(_, _, cand, span)| (cand, span))
}

/// Bounded Damerau-Levenshtein (optimal string alignment) distance.
/// Returns `cap` when the true distance is at least `cap`.
fn edit_distance(a: &str, b: &str, cap: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) >= cap {
        return cap;
    }
    let mut prev_prev: Vec<usize> = Vec::new();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut row = vec![i];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut d = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d = d.min(prev_prev[j - 2] + 1);
            }
            row.push(d);
        }
        prev_prev = std::mem::replace(&mut prev, row);
    }
    prev[b.len()].min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance_basic() {
        assert_eq!(edit_distance("counter", "counter", 10), 0);
        assert_eq!(edit_distance("cuonter", "counter", 10), 1); // transposition
        assert_eq!(edit_distance("count", "counter", 10), 2);
        assert_eq!(edit_distance("abc", "xyz", 10), 3);
    }

    #[test]
    fn edit_distance_cap() {
        assert_eq!(edit_distance("abcdefgh", "zzzzzzzz", 3), 3);
        assert_eq!(edit_distance("a", "abcdefgh", 3), 3);
    }

    #[test]
    fn lookup_location_constructors() {
        assert_eq!(LookupLocation::MAX.scope, None);
        assert_eq!(LookupLocation::MAX.index, u32::MAX);
    }

    #[test]
    fn flags_are_distinct() {
        let all = LookupFlags::all();
        assert!(all.contains(LookupFlags::FORCE_HIERARCHICAL));
        assert!(all.contains(LookupFlags::TYPE_REFERENCE));
        assert!(!LookupFlags::empty().contains(LookupFlags::NO_SELECTORS));
    }
}
