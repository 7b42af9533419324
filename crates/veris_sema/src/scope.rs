//! Scope member storage: ordered members, name maps, deferred members,
//! and wildcard imports.

use crate::symbols::SymbolId;
use std::collections::HashMap;
use veris_common::Ident;
use veris_syntax::{GenerateConstruct, Instantiation};

/// Syntax whose members cannot be created eagerly because doing so would
/// require binding expressions (which may in turn look up other members
/// of this scope). Recorded in a sideband list and materialized on the
/// first lookup that needs the scope's full member set.
#[derive(Debug, Clone, Copy)]
pub enum DeferredSyntax<'s> {
    /// A module/interface/program instantiation (parameter binding).
    Instantiation(&'s Instantiation),
    /// A generate construct (condition/loop evaluation).
    Generate(&'s GenerateConstruct),
    /// An instantiation injected by a bind directive.
    BindInstantiation(&'s Instantiation),
}

/// A deferred member entry: the syntax plus the member index it was
/// declared at, so materialized members keep declaration order.
#[derive(Debug, Clone, Copy)]
pub struct DeferredMember<'s> {
    /// The syntax to materialize.
    pub syntax: DeferredSyntax<'s>,
    /// The declaration-order index reserved for this member.
    pub index: u32,
}

/// The member storage owned by every scope-kind symbol.
///
/// Members are append-only; each carries the index it was declared at and
/// `members` stays sorted by that index, so iteration order is always
/// declaration order even when deferred members materialize late.
#[derive(Debug, Default)]
pub struct ScopeData<'s> {
    /// Member symbol ids, ordered by declaration index.
    pub members: Vec<SymbolId>,
    /// By-name lookup of named members. First declaration wins; later
    /// duplicates are diagnosed at insertion.
    pub name_map: HashMap<Ident, SymbolId>,
    /// Deferred members not yet materialized.
    pub deferred: Vec<DeferredMember<'s>>,
    /// Wildcard import members of this scope, in declaration order.
    pub imports: Vec<SymbolId>,
    /// Whether declarations here default to a procedural context.
    pub is_procedural: bool,
    /// The next declaration-order index to hand out.
    pub next_index: u32,
}

impl<'s> ScopeData<'s> {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty procedural scope (statement blocks, subroutines).
    pub fn procedural() -> Self {
        Self {
            is_procedural: true,
            ..Self::default()
        }
    }

    /// Reserves the next declaration-order index.
    pub fn reserve_index(&mut self) -> u32 {
        let idx = self.next_index;
        self.next_index += 1;
        idx
    }

    /// Inserts a member at its declaration-order position.
    ///
    /// Returns the previous symbol with the same name, if any, so the
    /// caller can emit a duplicate diagnostic; the original mapping is
    /// kept.
    pub fn insert_member(
        &mut self,
        id: SymbolId,
        index: u32,
        name: Option<Ident>,
        member_indices: impl Fn(SymbolId) -> u32,
    ) -> Option<SymbolId> {
        let pos = self
            .members
            .partition_point(|&m| member_indices(m) <= index);
        self.members.insert(pos, id);
        if let Some(name) = name {
            if let Some(&existing) = self.name_map.get(&name) {
                return Some(existing);
            }
            self.name_map.insert(name, id);
        }
        None
    }

    /// Looks up a member of this scope by name.
    pub fn find(&self, name: Ident) -> Option<SymbolId> {
        self.name_map.get(&name).copied()
    }

    /// Returns `true` if deferred members remain to be materialized.
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Records a deferred member and reserves its index.
    pub fn defer(&mut self, syntax: DeferredSyntax<'s>) {
        let index = self.reserve_index();
        self.deferred.push(DeferredMember { syntax, index });
    }

    /// Takes the pending deferred members for materialization.
    pub fn take_deferred(&mut self) -> Vec<DeferredMember<'s>> {
        std::mem::take(&mut self.deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_common::Interner;

    #[test]
    fn indices_are_sequential() {
        let mut scope = ScopeData::new();
        assert_eq!(scope.reserve_index(), 0);
        assert_eq!(scope.reserve_index(), 1);
        assert_eq!(scope.reserve_index(), 2);
    }

    #[test]
    fn insert_keeps_index_order() {
        let interner = Interner::new();
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");
        let mut scope = ScopeData::new();
        let i0 = scope.reserve_index();
        let i1 = scope.reserve_index();
        // Materialize the later member first; order must still hold.
        let indices = |id: SymbolId| if id == SymbolId::from_raw(11) { i1 } else { i0 };
        scope.insert_member(SymbolId::from_raw(11), i1, Some(b), indices);
        scope.insert_member(SymbolId::from_raw(10), i0, Some(a), indices);
        assert_eq!(
            scope.members,
            vec![SymbolId::from_raw(10), SymbolId::from_raw(11)]
        );
    }

    #[test]
    fn duplicate_name_reports_existing() {
        let interner = Interner::new();
        let n = interner.get_or_intern("x");
        let mut scope = ScopeData::new();
        let first = SymbolId::from_raw(1);
        let dup = SymbolId::from_raw(2);
        assert_eq!(scope.insert_member(first, 0, Some(n), |_| 0), None);
        assert_eq!(scope.insert_member(dup, 1, Some(n), |_| 0), Some(first));
        // First mapping is kept.
        assert_eq!(scope.find(n), Some(first));
    }

    #[test]
    fn unnamed_members_skip_name_map() {
        let mut scope = ScopeData::new();
        assert_eq!(scope.insert_member(SymbolId::from_raw(1), 0, None, |_| 0), None);
        assert_eq!(scope.insert_member(SymbolId::from_raw(2), 1, None, |_| 0), None);
        assert_eq!(scope.members.len(), 2);
        assert!(scope.name_map.is_empty());
    }

    #[test]
    fn deferred_bookkeeping() {
        let mut scope = ScopeData::new();
        assert!(!scope.has_deferred());
        let inst = Instantiation {
            module: Interner::new().get_or_intern("m"),
            param_assignments: Vec::new(),
            instances: Vec::new(),
            span: veris_source::Span::DUMMY,
        };
        scope.defer(DeferredSyntax::Instantiation(&inst));
        assert!(scope.has_deferred());
        let taken = scope.take_deferred();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].index, 0);
        assert!(!scope.has_deferred());
    }
}
