//! Definition blueprints and the maps that key them.
//!
//! A definition is the declarative blueprint of a module, interface, or
//! program; instances are stamped out from it during elaboration.
//! Definitions are keyed by `(name, enclosing scope)`; top-level
//! definitions additionally live in a flat map that records whether any
//! nested scope shadows the name. Built-in gate types get their own map
//! so their keyword-like names never collide with user identifiers.

use crate::symbols::{DefinitionId, SymbolId};
use std::collections::HashMap;
use veris_common::{Ident, Interner};
use veris_source::Span;
use veris_syntax as ast;

/// The blueprint of a module, interface, or program.
#[derive(Debug)]
pub struct Definition<'s> {
    /// This definition's id.
    pub id: DefinitionId,
    /// The definition name.
    pub name: Ident,
    /// Module, interface, or program.
    pub kind: ast::DefinitionKind,
    /// The declaration syntax.
    pub syntax: &'s ast::DefinitionDecl,
    /// The scope the definition was declared in; `None` for top level.
    pub scope: Option<SymbolId>,
    /// The `` `default_nettype `` in effect for the defining tree.
    pub default_net_type: ast::DefaultNetType,
    /// The `` `timescale `` in effect for the defining tree.
    pub time_scale: Option<ast::TimeScale>,
    /// The unconnected-drive policy in effect for the defining tree.
    pub unconnected_drive: ast::UnconnectedDrive,
    /// Whether any instance of this definition has been created.
    pub instantiated: bool,
}

/// All definitions in a compilation, with their lookup maps.
#[derive(Debug, Default)]
pub struct DefinitionMap<'s> {
    defs: Vec<Definition<'s>>,
    by_key: HashMap<(Ident, Option<SymbolId>), DefinitionId>,
    top: HashMap<Ident, (DefinitionId, bool)>,
}

impl<'s> DefinitionMap<'s> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    ///
    /// Returns `Err` with the previous definition's span when the
    /// `(name, scope)` key is already taken; the original is kept.
    pub fn insert(
        &mut self,
        name: Ident,
        kind: ast::DefinitionKind,
        syntax: &'s ast::DefinitionDecl,
        scope: Option<SymbolId>,
        default_net_type: ast::DefaultNetType,
        time_scale: Option<ast::TimeScale>,
        unconnected_drive: ast::UnconnectedDrive,
    ) -> Result<DefinitionId, Span> {
        if let Some(&existing) = self.by_key.get(&(name, scope)) {
            return Err(self.defs[existing.as_raw() as usize].syntax.name_span);
        }
        let id = DefinitionId::from_raw(self.defs.len() as u32);
        self.defs.push(Definition {
            id,
            name,
            kind,
            syntax,
            scope,
            default_net_type,
            time_scale,
            unconnected_drive,
            instantiated: false,
        });
        self.by_key.insert((name, scope), id);
        if scope.is_none() {
            self.top.insert(name, (id, false));
        } else if let Some(entry) = self.top.get_mut(&name) {
            // A nested definition shadows the top-level name somewhere;
            // lookup must disambiguate through the scope key.
            entry.1 = true;
        }
        Ok(id)
    }

    /// Looks up a definition by name within a scope chain: the innermost
    /// scope key wins, then the flat top-level map.
    pub fn lookup(&self, name: Ident, scopes: &[SymbolId]) -> Option<DefinitionId> {
        for &scope in scopes {
            if let Some(&id) = self.by_key.get(&(name, Some(scope))) {
                return Some(id);
            }
        }
        self.top.get(&name).map(|&(id, _)| id)
    }

    /// Looks up a top-level definition and whether nested definitions
    /// shadow its name anywhere.
    pub fn top_level(&self, name: Ident) -> Option<(DefinitionId, bool)> {
        self.top.get(&name).copied()
    }

    /// Returns the definition for an id.
    pub fn get(&self, id: DefinitionId) -> &Definition<'s> {
        &self.defs[id.as_raw() as usize]
    }

    /// Returns the definition for an id mutably.
    pub fn get_mut(&mut self, id: DefinitionId) -> &mut Definition<'s> {
        &mut self.defs[id.as_raw() as usize]
    }

    /// Iterates all registered definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Definition<'s>> {
        self.defs.iter()
    }

    /// The number of registered definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// The built-in gate primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GateKind {
    /// `and`
    And,
    /// `nand`
    Nand,
    /// `or`
    Or,
    /// `nor`
    Nor,
    /// `xor`
    Xor,
    /// `xnor`
    Xnor,
    /// `buf`
    Buf,
    /// `not`
    Not,
    /// `bufif0`
    BufIf0,
    /// `bufif1`
    BufIf1,
    /// `notif0`
    NotIf0,
    /// `notif1`
    NotIf1,
    /// `pullup`
    PullUp,
    /// `pulldown`
    PullDown,
}

/// Interns the built-in gate names into their own namespace map.
pub fn builtin_gates(interner: &Interner) -> HashMap<Ident, GateKind> {
    use GateKind::*;
    [
        ("and", And),
        ("nand", Nand),
        ("or", Or),
        ("nor", Nor),
        ("xor", Xor),
        ("xnor", Xnor),
        ("buf", Buf),
        ("not", Not),
        ("bufif0", BufIf0),
        ("bufif1", BufIf1),
        ("notif0", NotIf0),
        ("notif1", NotIf1),
        ("pullup", PullUp),
        ("pulldown", PullDown),
    ]
    .into_iter()
    .map(|(name, kind)| (interner.get_or_intern(name), kind))
    .collect()
}

/// An out-of-block declaration (a method defined with a `class::` scope
/// outside the class body), waiting to be consumed by its prototype.
#[derive(Debug)]
pub struct OutOfBlockDecl<'s> {
    /// The out-of-block subroutine syntax.
    pub syntax: &'s ast::SubroutineDecl,
    /// Set once the class prototype consumes this entry; entries still
    /// unused at finalization are diagnosed.
    pub used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_source::Span;

    fn decl(name: Ident) -> ast::DefinitionDecl {
        ast::DefinitionDecl {
            kind: ast::DefinitionKind::Module,
            name,
            params: Vec::new(),
            ports: Vec::new(),
            items: Vec::new(),
            span: Span::DUMMY,
            name_span: Span::DUMMY,
        }
    }

    #[test]
    fn insert_and_lookup_top_level() {
        let interner = Interner::new();
        let name = interner.get_or_intern("counter");
        let syntax = decl(name);
        let mut map = DefinitionMap::new();
        let id = map
            .insert(
                name,
                ast::DefinitionKind::Module,
                &syntax,
                None,
                ast::DefaultNetType::Wire,
                None,
                ast::UnconnectedDrive::None,
            )
            .unwrap();
        assert_eq!(map.lookup(name, &[]), Some(id));
        assert_eq!(map.top_level(name), Some((id, false)));
    }

    #[test]
    fn duplicate_definition_rejected() {
        let interner = Interner::new();
        let name = interner.get_or_intern("m");
        let syntax = decl(name);
        let mut map = DefinitionMap::new();
        map.insert(
            name,
            ast::DefinitionKind::Module,
            &syntax,
            None,
            ast::DefaultNetType::Wire,
            None,
            ast::UnconnectedDrive::None,
        )
        .unwrap();
        assert!(map
            .insert(
                name,
                ast::DefinitionKind::Module,
                &syntax,
                None,
                ast::DefaultNetType::Wire,
                None,
                ast::UnconnectedDrive::None,
            )
            .is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn nested_definition_sets_has_nested() {
        let interner = Interner::new();
        let name = interner.get_or_intern("m");
        let syntax = decl(name);
        let scope = SymbolId::from_raw(5);
        let mut map = DefinitionMap::new();
        let top = map
            .insert(
                name,
                ast::DefinitionKind::Module,
                &syntax,
                None,
                ast::DefaultNetType::Wire,
                None,
                ast::UnconnectedDrive::None,
            )
            .unwrap();
        let nested = map
            .insert(
                name,
                ast::DefinitionKind::Module,
                &syntax,
                Some(scope),
                ast::DefaultNetType::Wire,
                None,
                ast::UnconnectedDrive::None,
            )
            .unwrap();
        assert_eq!(map.top_level(name), Some((top, true)));
        // Lookup from inside the scope prefers the nested definition.
        assert_eq!(map.lookup(name, &[scope]), Some(nested));
        // Lookup with no scope chain falls back to the top level.
        assert_eq!(map.lookup(name, &[]), Some(top));
    }

    #[test]
    fn gate_names_live_apart() {
        let interner = Interner::new();
        let gates = builtin_gates(&interner);
        let and = interner.get_or_intern("and");
        assert_eq!(gates.get(&and), Some(&GateKind::And));
        assert_eq!(gates.len(), 14);
    }
}
