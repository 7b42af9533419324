//! The central data structure of the elaboration engine.
//!
//! A [`Compilation`] owns every semantic entity produced from a set of
//! syntax trees: the symbol arena, the type database, the diagnostic
//! store, the definition and package maps, and the elaboration caches.
//! Trees are accepted until the design root is first requested; from
//! that point the compilation is frozen and further mutation is a
//! contract violation, not a diagnostic.

use crate::assertions::ExpansionFrame;
use crate::const_eval::{self, EvalContext};
use crate::const_value::ConstantValue;
use crate::declared_types;
use crate::definitions::{builtin_gates, DefinitionMap, GateKind, OutOfBlockDecl};
use crate::drivers;
use crate::errors;
use crate::expr::{self, BindContext, Expression};
use crate::lazy::Lazy;
use crate::lookup::LookupLocation;
use crate::members;
use crate::options::CompilationOptions;
use crate::overrides::{self, ParamOverrideNode};
use crate::scope::ScopeData;
use crate::stmt::{self, Statement};
use crate::symbols::{
    Attribute, DefinitionId, Symbol, SymbolId, SymbolKind, VariableLifetime,
};
use crate::types::{TypeDb, TypeId};
use std::collections::{HashMap, HashSet};
use veris_common::{Ident, InternalError, Interner, VerisResult};
use veris_diagnostics::{Diagnostic, DiagnosticStore};
use veris_source::Span;
use veris_syntax as ast;
use veris_syntax::SyntaxTree;

/// A defparam directive collected during elaboration, evaluated during
/// the fixed-point loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DefparamRecord<'s> {
    /// The directive syntax.
    pub syntax: &'s ast::Defparam,
    /// The scope the directive appeared in.
    pub scope: SymbolId,
}

/// Process-wide state for one elaboration.
pub struct Compilation<'s> {
    /// The options this compilation was created with.
    pub options: CompilationOptions,
    /// The shared string interner (owned by the caller, shared with the
    /// parser).
    pub interner: &'s Interner,
    /// The type database.
    pub types: TypeDb,
    store: DiagnosticStore,
    symbols: Vec<Symbol<'s>>,
    pub(crate) definitions: DefinitionMap<'s>,
    packages: HashMap<Ident, SymbolId>,
    gates: HashMap<Ident, GateKind>,
    units: Vec<SymbolId>,
    trees: Vec<&'s SyntaxTree>,
    pub(crate) out_of_block: HashMap<(Ident, Ident, SymbolId), OutOfBlockDecl<'s>>,
    attributes: HashMap<SymbolId, Vec<Attribute>>,
    pub(crate) binds_by_target: HashMap<Ident, Vec<&'s ast::BindDirective>>,
    bind_seen: HashSet<Span>,
    pub(crate) dpi_exports: Vec<(&'s ast::DpiExport, SymbolId)>,
    pub(crate) pending_default_clocking: Vec<(SymbolId, &'s ast::DefaultClockingRef)>,
    pub(crate) pending_default_disable: Vec<(SymbolId, &'s ast::DefaultDisableDecl)>,
    default_clocking: HashMap<SymbolId, SymbolId>,
    global_clocking: HashMap<SymbolId, SymbolId>,
    default_disable: HashMap<SymbolId, Expression>,
    processed_defaults: HashSet<(SymbolId, Span)>,
    pub(crate) instantiated_names: HashSet<Ident>,
    pub(crate) defparams: Vec<DefparamRecord<'s>>,
    pub(crate) defparam_overrides: ParamOverrideNode,
    pub(crate) cli_overrides: HashMap<Ident, ConstantValue>,
    default_time_scale: Option<ast::TimeScale>,
    root: Option<SymbolId>,
    finalized: bool,
    finalizing: bool,
    typo_corrections: u32,
    error_limit_hit: bool,
    assertion_stack: Vec<ExpansionFrame<'s>>,
    assertion_active: Vec<SymbolId>,
}

impl<'s> Compilation<'s> {
    /// Creates a new compilation with the given options.
    pub fn new(interner: &'s Interner, options: CompilationOptions) -> Self {
        let gates = builtin_gates(interner);
        let mut comp = Self {
            options,
            interner,
            types: TypeDb::new(),
            store: DiagnosticStore::new(),
            symbols: Vec::new(),
            definitions: DefinitionMap::new(),
            packages: HashMap::new(),
            gates,
            units: Vec::new(),
            trees: Vec::new(),
            out_of_block: HashMap::new(),
            attributes: HashMap::new(),
            binds_by_target: HashMap::new(),
            bind_seen: HashSet::new(),
            dpi_exports: Vec::new(),
            pending_default_clocking: Vec::new(),
            pending_default_disable: Vec::new(),
            default_clocking: HashMap::new(),
            global_clocking: HashMap::new(),
            default_disable: HashMap::new(),
            processed_defaults: HashSet::new(),
            instantiated_names: HashSet::new(),
            defparams: Vec::new(),
            defparam_overrides: ParamOverrideNode::new(),
            cli_overrides: HashMap::new(),
            default_time_scale: None,
            root: None,
            finalized: false,
            finalizing: false,
            typo_corrections: 0,
            error_limit_hit: false,
            assertion_stack: Vec::new(),
            assertion_active: Vec::new(),
        };
        comp.build_std_package();
        comp
    }

    /// The built-in `std` package; currently an empty namespace that
    /// user code can reference without error.
    fn build_std_package(&mut self) {
        let name = self.interner.get_or_intern("std");
        let sym = self.alloc_symbol(
            Some(name),
            Span::DUMMY,
            None,
            0,
            SymbolKind::Package(ScopeData::new()),
        );
        self.packages.insert(name, sym);
    }

    // ------------------------------------------------------------------
    // Tree intake
    // ------------------------------------------------------------------

    /// Sets a fallback `` `timescale `` applied to definitions whose
    /// tree does not carry one. Must be called before the affected trees
    /// are added.
    pub fn set_default_time_scale(&mut self, time_scale: ast::TimeScale) {
        self.default_time_scale = Some(time_scale);
    }

    /// Adds a parsed syntax tree to the compilation.
    ///
    /// Registers its definitions and packages and forwards its parse
    /// diagnostics. Returns an error once the design root has been
    /// materialized.
    pub fn add_tree(&mut self, tree: &'s SyntaxTree) -> VerisResult<()> {
        if self.finalized || self.finalizing {
            return Err(InternalError::new(
                "cannot add a syntax tree after the design root has been materialized",
            ));
        }
        self.trees.push(tree);
        for diag in &tree.parse_diagnostics {
            self.store.forward_parse(diag.clone());
        }

        let unit = self.alloc_symbol(
            None,
            tree.root.span,
            None,
            0,
            SymbolKind::CompilationUnit(ScopeData::new()),
        );
        self.units.push(unit);

        for item in &tree.root.items {
            match item {
                ast::Item::Definition(decl) => {
                    self.register_definition(decl, None, tree);
                }
                ast::Item::Package(decl) => {
                    self.register_package(decl);
                }
                ast::Item::UnitDecl(item) => {
                    members::add_member(self, unit, item);
                }
                ast::Item::Error(_) => {}
            }
        }
        Ok(())
    }

    pub(crate) fn register_definition(
        &mut self,
        decl: &'s ast::DefinitionDecl,
        scope: Option<SymbolId>,
        tree: &'s SyntaxTree,
    ) -> Option<DefinitionId> {
        // Record every instantiation and bind directive now so top-module
        // inference and bind discovery see the whole design.
        self.scan_items(&decl.items);
        match self.definitions.insert(
            decl.name,
            decl.kind,
            decl,
            scope,
            tree.default_net_type,
            tree.time_scale.or(self.default_time_scale),
            tree.unconnected_drive,
        ) {
            Ok(id) => Some(id),
            Err(prev) => {
                let name = self.interner.resolve(decl.name).to_string();
                self.emit(errors::duplicate_definition(&name, decl.name_span, prev));
                None
            }
        }
    }

    fn scan_items(&mut self, items: &'s [ast::ModuleItem]) {
        for item in items {
            match item {
                ast::ModuleItem::Instantiation(inst) => {
                    self.instantiated_names.insert(inst.module);
                }
                ast::ModuleItem::Bind(bind) => {
                    self.instantiated_names.insert(bind.instantiation.module);
                }
                ast::ModuleItem::Generate(gen) => match gen {
                    ast::GenerateConstruct::If {
                        then_items,
                        else_items,
                        ..
                    } => {
                        self.scan_items(then_items);
                        self.scan_items(else_items);
                    }
                    ast::GenerateConstruct::For { body, .. } => self.scan_items(body),
                    ast::GenerateConstruct::Block { items, .. } => self.scan_items(items),
                },
                _ => {}
            }
        }
    }

    fn register_package(&mut self, decl: &'s ast::PackageDecl) {
        if let Some(&existing) = self.packages.get(&decl.name) {
            let name = self.interner.resolve(decl.name).to_string();
            let prev = self.symbol(existing).span;
            self.emit(errors::duplicate_definition(&name, decl.span, prev));
            return;
        }
        let sym = self.alloc_symbol(
            Some(decl.name),
            decl.span,
            None,
            0,
            SymbolKind::Package(ScopeData::new()),
        );
        self.packages.insert(decl.name, sym);
        for item in &decl.items {
            members::add_member(self, sym, item);
        }
    }

    // ------------------------------------------------------------------
    // Symbol arena
    // ------------------------------------------------------------------

    pub(crate) fn alloc_symbol(
        &mut self,
        name: Option<Ident>,
        span: Span,
        parent: Option<SymbolId>,
        index: u32,
        kind: SymbolKind<'s>,
    ) -> SymbolId {
        let id = SymbolId::from_raw(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name,
            span,
            parent,
            index,
            kind,
        });
        id
    }

    /// Returns the symbol with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this compilation.
    pub fn symbol(&self, id: SymbolId) -> &Symbol<'s> {
        &self.symbols[id.as_raw() as usize]
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol<'s> {
        &mut self.symbols[id.as_raw() as usize]
    }

    /// The number of symbols currently in the arena.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// The symbol's name as a string, or a placeholder for unnamed
    /// symbols.
    pub fn symbol_name(&self, id: SymbolId) -> String {
        match self.symbol(id).name {
            Some(name) => self.interner.resolve(name).to_string(),
            None => "<unnamed>".to_string(),
        }
    }

    /// Creates a symbol and inserts it as a member of `scope`,
    /// diagnosing duplicate names.
    pub(crate) fn add_symbol_to_scope(
        &mut self,
        scope: SymbolId,
        name: Option<Ident>,
        span: Span,
        kind: SymbolKind<'s>,
    ) -> SymbolId {
        let index = match self.symbol_mut(scope).scope_mut() {
            Some(sd) => sd.reserve_index(),
            None => 0,
        };
        self.insert_symbol_at(scope, name, span, kind, index)
    }

    pub(crate) fn insert_symbol_at(
        &mut self,
        scope: SymbolId,
        name: Option<Ident>,
        span: Span,
        kind: SymbolKind<'s>,
        index: u32,
    ) -> SymbolId {
        let id = self.alloc_symbol(name, span, Some(scope), index, kind);
        let indices: HashMap<SymbolId, u32> = {
            let sd = self.symbol(scope).scope().expect("member added to non-scope");
            sd.members
                .iter()
                .map(|&m| (m, self.symbol(m).index))
                .collect()
        };
        let duplicate = {
            let sd = self
                .symbol_mut(scope)
                .scope_mut()
                .expect("member added to non-scope");
            sd.insert_member(id, index, name, |m| indices.get(&m).copied().unwrap_or(0))
        };
        if let Some(prev) = duplicate {
            let name_str = self.symbol_name(id);
            let prev_span = self.symbol(prev).span;
            self.emit(errors::duplicate_member(&name_str, span, prev_span));
        }
        id
    }

    /// Walks parent links to test whether `sym` is inside `ancestor`.
    pub fn is_within(&self, sym: SymbolId, ancestor: SymbolId) -> bool {
        let mut cur = Some(sym);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.symbol(id).parent;
        }
        false
    }

    /// Walks up to the nearest enclosing scope that is not part of a
    /// covergroup body.
    pub fn nearest_non_coverage_scope(&self, start: SymbolId) -> Option<SymbolId> {
        let mut cur = Some(start);
        while let Some(id) = cur {
            match self.symbol(id).kind {
                SymbolKind::Covergroup(_)
                | SymbolKind::Coverpoint(_)
                | SymbolKind::CoverCross(_)
                | SymbolKind::CoverageBin(_) => cur = self.symbol(id).parent,
                _ => return Some(id),
            }
        }
        None
    }

    /// Computes how many instance symbols enclose a scope.
    pub(crate) fn instance_depth(&self, scope: SymbolId) -> u32 {
        let mut depth = 0;
        let mut cur = Some(scope);
        while let Some(id) = cur {
            if matches!(self.symbol(id).kind, SymbolKind::Instance(_)) {
                depth += 1;
            }
            cur = self.symbol(id).parent;
        }
        depth
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Emits a diagnostic, honoring the error limit: once the limit is
    /// reached a final `E339` is emitted and further errors are dropped.
    pub fn emit(&mut self, diag: Diagnostic) {
        if self.error_limit_hit && diag.severity().is_error() {
            return;
        }
        let span = diag.primary_span;
        let is_error = diag.severity().is_error();
        self.store.emit(diag);
        if is_error
            && !self.error_limit_hit
            && self.store.error_count() >= self.options.error_limit as usize
        {
            self.error_limit_hit = true;
            self.store
                .emit(errors::error_limit_exceeded(self.options.error_limit, span));
        }
    }

    /// `true` once the error limit has short-circuited elaboration.
    pub fn hit_error_limit(&self) -> bool {
        self.error_limit_hit
    }

    /// The diagnostics the external parser attached to the added trees.
    pub fn parse_diagnostics(&self) -> Vec<Diagnostic> {
        self.store.parse()
    }

    /// The semantic diagnostics; forces elaboration.
    pub fn semantic_diagnostics(&mut self) -> Vec<Diagnostic> {
        let _ = self.root();
        self.store.semantic()
    }

    /// All diagnostics, parse and semantic merged sorted; forces
    /// elaboration.
    pub fn all_diagnostics(&mut self) -> Vec<Diagnostic> {
        let _ = self.root();
        self.store.all()
    }

    /// Read-only access to the diagnostic store.
    pub fn diagnostics(&self) -> &DiagnosticStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Lookup support
    // ------------------------------------------------------------------

    /// The package symbol registered under `name`.
    pub fn package(&self, name: Ident) -> Option<SymbolId> {
        self.packages.get(&name).copied()
    }

    /// All packages, in registration order is not tracked; names are
    /// sorted for determinism.
    pub fn packages(&self) -> Vec<SymbolId> {
        let mut entries: Vec<(Ident, SymbolId)> =
            self.packages.iter().map(|(&n, &s)| (n, s)).collect();
        entries.sort_by_key(|(n, _)| *n);
        entries.into_iter().map(|(_, s)| s).collect()
    }

    /// The compilation-unit scopes, in tree order.
    pub fn units(&self) -> Vec<SymbolId> {
        self.units.clone()
    }

    /// The built-in gate kind registered under `name`, if any.
    pub fn gate(&self, name: Ident) -> Option<GateKind> {
        self.gates.get(&name).copied()
    }

    /// Consumes one unit of the typo-correction budget; returns `false`
    /// once the budget is spent.
    pub fn take_typo_budget(&mut self) -> bool {
        if self.typo_corrections >= self.options.typo_correction_limit {
            return false;
        }
        self.typo_corrections += 1;
        true
    }

    // ------------------------------------------------------------------
    // Assertion expansion stack
    // ------------------------------------------------------------------

    /// Whether a declaration is anywhere on the active expansion path.
    /// Rebinding an actual suspends its frame but the declaration stays
    /// active, so recursion through actuals is still caught.
    pub(crate) fn assertion_stack_contains(&self, decl: SymbolId) -> bool {
        self.assertion_active.contains(&decl)
    }

    pub(crate) fn push_assertion_frame(&mut self, frame: ExpansionFrame<'s>) {
        self.assertion_active.push(frame.decl());
        self.assertion_stack.push(frame);
    }

    pub(crate) fn pop_assertion_frame(&mut self) {
        if let Some(frame) = self.assertion_stack.pop() {
            if let Some(pos) = self
                .assertion_active
                .iter()
                .rposition(|&d| d == frame.decl())
            {
                self.assertion_active.remove(pos);
            }
        }
    }

    /// Suspends the top expansion frame (for actual rebinding) without
    /// deactivating its declaration.
    pub(crate) fn take_assertion_frame(&mut self) -> Option<ExpansionFrame<'s>> {
        self.assertion_stack.pop()
    }

    /// Restores a frame suspended by [`Self::take_assertion_frame`].
    pub(crate) fn restore_assertion_frame(&mut self, frame: ExpansionFrame<'s>) {
        self.assertion_stack.push(frame);
    }

    pub(crate) fn current_assertion_actual(
        &self,
        name: Ident,
    ) -> Option<(Option<&'s ast::Expr>, BindContext)> {
        self.assertion_stack.last()?.actual_for(name)
    }

    // ------------------------------------------------------------------
    // Bind directives / clocking / attributes
    // ------------------------------------------------------------------

    /// Notes a bind directive; returns `true` exactly the first time a
    /// given directive (identified by its span) is seen.
    pub fn note_bind_directive(&mut self, bind: &'s ast::BindDirective) -> bool {
        if !self.bind_seen.insert(bind.span) {
            return false;
        }
        if self.definitions.top_level(bind.target).is_none() && !self.options.lint_mode {
            let name = self.interner.resolve(bind.target).to_string();
            self.emit(errors::bind_unknown_target(&name, bind.span));
        }
        self.binds_by_target
            .entry(bind.target)
            .or_default()
            .push(bind);
        true
    }

    /// Marks a default-clocking/disable declaration as handled; returns
    /// `false` if it was already processed in an earlier pass.
    pub(crate) fn mark_default_processed(&mut self, scope: SymbolId, span: Span) -> bool {
        self.processed_defaults.insert((scope, span))
    }

    pub(crate) fn set_default_clocking(&mut self, scope: SymbolId, clocking: SymbolId, span: Span) {
        if self.default_clocking.contains_key(&scope) {
            let prev = self.symbol(self.default_clocking[&scope]).span;
            self.emit(errors::multiple_defaults("clocking", span, prev));
            return;
        }
        self.default_clocking.insert(scope, clocking);
    }

    /// The default clocking block resolved for a scope, if any.
    pub fn default_clocking(&self, scope: SymbolId) -> Option<SymbolId> {
        self.default_clocking.get(&scope).copied()
    }

    pub(crate) fn set_global_clocking(&mut self, scope: SymbolId, clocking: SymbolId) {
        self.global_clocking.entry(scope).or_insert(clocking);
    }

    /// The global clocking block for a scope, if any.
    pub fn global_clocking(&self, scope: SymbolId) -> Option<SymbolId> {
        self.global_clocking.get(&scope).copied()
    }

    pub(crate) fn set_default_disable(&mut self, scope: SymbolId, expr: Expression, span: Span) {
        if let Some(prev) = self.default_disable.get(&scope) {
            let prev_span = prev.span;
            self.emit(errors::multiple_defaults("disable", span, prev_span));
            return;
        }
        self.default_disable.insert(scope, expr);
    }

    /// The default disable expression for a scope, if any.
    pub fn default_disable(&self, scope: SymbolId) -> Option<&Expression> {
        self.default_disable.get(&scope)
    }

    /// Attaches attributes to a symbol, collapsing duplicate names to
    /// the last occurrence with a warning.
    pub fn set_attributes(&mut self, sym: SymbolId, attrs: Vec<Attribute>) {
        let mut seen: Vec<Attribute> = Vec::new();
        for attr in attrs {
            if let Some(pos) = seen.iter().position(|a| a.name == attr.name) {
                let name = self.interner.resolve(attr.name).to_string();
                self.emit(errors::duplicate_attribute(&name, attr.span));
                seen[pos] = attr;
            } else {
                seen.push(attr);
            }
        }
        self.attributes.insert(sym, seen);
    }

    /// The attributes attached to a symbol.
    pub fn attributes_of(&self, sym: SymbolId) -> &[Attribute] {
        self.attributes.get(&sym).map(Vec::as_slice).unwrap_or(&[])
    }

    // ------------------------------------------------------------------
    // Lazy symbol facets
    // ------------------------------------------------------------------

    /// Forces and returns the declared type of a value symbol.
    pub fn value_type(&mut self, sym: SymbolId) -> TypeId {
        let (state, type_syntax, dims) = {
            let s = self.symbol(sym);
            match &s.kind {
                SymbolKind::Variable(d) | SymbolKind::LocalAssertionVar(d) => (
                    d.value.ty.clone(),
                    d.value.type_syntax,
                    d.value.unpacked_dims,
                ),
                SymbolKind::Net(d) => (d.value.ty.clone(), d.value.type_syntax, d.value.unpacked_dims),
                SymbolKind::FormalArgument(d) => (
                    d.value.ty.clone(),
                    d.value.type_syntax,
                    d.value.unpacked_dims,
                ),
                SymbolKind::AssertionPort(d) => (d.ty.clone(), d.type_syntax, d.unpacked_dims),
                SymbolKind::Parameter(_) => return self.parameter_type(sym),
                SymbolKind::EnumValue(d) => return d.ty,
                SymbolKind::ClockVar(d) => return d.ty.get().copied().unwrap_or(TypeDb::ERROR),
                _ => return TypeDb::ERROR,
            }
        };
        match state {
            Lazy::Resolved(ty) => ty,
            Lazy::Resolving => {
                let name = self.symbol_name(sym);
                let span = self.symbol(sym).span;
                self.emit(errors::typedef_cycle(&name, span));
                TypeDb::ERROR
            }
            Lazy::Unresolved => {
                self.set_value_ty(sym, Lazy::Resolving);
                let scope = self.symbol(sym).parent.unwrap_or(sym);
                let location = LookupLocation::before(self.symbol(sym));
                let base = match type_syntax {
                    Some(spec) => declared_types::resolve_type_spec(self, spec, scope, location),
                    None => TypeDb::UNTYPED,
                };
                let ty = declared_types::apply_unpacked_dims(self, base, dims, scope, location);
                self.set_value_ty(sym, Lazy::Resolved(ty));
                ty
            }
        }
    }

    fn set_value_ty(&mut self, sym: SymbolId, state: Lazy<TypeId>) {
        match &mut self.symbol_mut(sym).kind {
            SymbolKind::Variable(d) | SymbolKind::LocalAssertionVar(d) => d.value.ty = state,
            SymbolKind::Net(d) => d.value.ty = state,
            SymbolKind::FormalArgument(d) => d.value.ty = state,
            SymbolKind::AssertionPort(d) => d.ty = state,
            _ => {}
        }
    }

    /// Forces and returns a parameter's declared (or inferred) type.
    pub fn parameter_type(&mut self, sym: SymbolId) -> TypeId {
        let (ty_state, type_syntax) = match &self.symbol(sym).kind {
            SymbolKind::Parameter(d) => (d.ty.clone(), d.type_syntax),
            _ => return TypeDb::ERROR,
        };
        match ty_state {
            Lazy::Resolved(ty) => ty,
            Lazy::Resolving => TypeDb::ERROR,
            Lazy::Unresolved => {
                if let SymbolKind::Parameter(d) = &mut self.symbol_mut(sym).kind {
                    d.ty = Lazy::Resolving;
                }
                let ty = match type_syntax {
                    Some(spec) => {
                        let scope = self.symbol(sym).parent.unwrap_or(sym);
                        let location = LookupLocation::before(self.symbol(sym));
                        declared_types::resolve_type_spec(self, spec, scope, location)
                    }
                    None => {
                        // No declared type: infer from the value.
                        match self.parameter_value(sym) {
                            Some(ConstantValue::Int(v)) => {
                                self.types.vector(v.width(), v.is_signed(), v.has_unknown())
                            }
                            Some(ConstantValue::Real(_)) => TypeDb::REAL,
                            Some(ConstantValue::Str(_)) => TypeDb::STRING,
                            _ => TypeDb::INT,
                        }
                    }
                };
                if let SymbolKind::Parameter(d) = &mut self.symbol_mut(sym).kind {
                    d.ty = Lazy::Resolved(ty);
                }
                ty
            }
        }
    }

    /// Forces and returns a parameter's value.
    pub fn parameter_value(&mut self, sym: SymbolId) -> Option<ConstantValue> {
        let (state, default, override_value, is_type) = match &self.symbol(sym).kind {
            SymbolKind::Parameter(d) => (
                d.value.clone(),
                d.default,
                d.override_value.clone(),
                d.is_type,
            ),
            _ => return None,
        };
        if is_type {
            return None;
        }
        match state {
            Lazy::Resolved(v) => Some(v),
            Lazy::Resolving => {
                let name = self.symbol_name(sym);
                let span = self.symbol(sym).span;
                self.emit(errors::const_eval_non_const(
                    &format!("parameter `{name}`, which depends on itself"),
                    span,
                ));
                None
            }
            Lazy::Unresolved => {
                if let SymbolKind::Parameter(d) = &mut self.symbol_mut(sym).kind {
                    d.value = Lazy::Resolving;
                }
                let value = match override_value {
                    Some(v) => Some(v),
                    None => match default {
                        Some(expr_syntax) => {
                            let scope = self.symbol(sym).parent.unwrap_or(sym);
                            let location = LookupLocation::before(self.symbol(sym));
                            let ctx = BindContext::new(scope, location);
                            let bound = expr::bind(self, expr_syntax, &ctx);
                            if bound.bad() {
                                None
                            } else {
                                let mut ectx = EvalContext::new();
                                const_eval::eval(self, &bound, &mut ectx)
                            }
                        }
                        None => {
                            let name = self.symbol_name(sym);
                            let span = self.symbol(sym).span;
                            self.emit(errors::const_eval_non_const(
                                &format!("parameter `{name}` with no value"),
                                span,
                            ));
                            None
                        }
                    },
                };
                let final_value = value.unwrap_or(ConstantValue::Null);
                if let SymbolKind::Parameter(d) = &mut self.symbol_mut(sym).kind {
                    d.value = Lazy::Resolved(final_value.clone());
                }
                if final_value.is_null() {
                    None
                } else {
                    Some(final_value)
                }
            }
        }
    }

    /// Forces and returns a type parameter's type value.
    pub fn type_parameter_value(&mut self, sym: SymbolId) -> Option<TypeId> {
        let default = match &self.symbol(sym).kind {
            SymbolKind::Parameter(d) if d.is_type => d.default,
            _ => return None,
        };
        let scope = self.symbol(sym).parent.unwrap_or(sym);
        let location = LookupLocation::before(self.symbol(sym));
        match default {
            Some(ast::Expr::TypeRef { ty, .. }) => {
                Some(declared_types::resolve_type_spec(self, ty, scope, location))
            }
            Some(other) => {
                // A named type actual arrives as a plain identifier.
                if let ast::Expr::Ident { name, span } = other {
                    let found = crate::lookup::unqualified(
                        self,
                        scope,
                        *name,
                        location,
                        crate::lookup::LookupFlags::TYPE_REFERENCE
                            | crate::lookup::LookupFlags::ALLOW_DECLARED_AFTER,
                    )?;
                    Some(declared_types::symbol_as_type(self, found, *span))
                } else {
                    None
                }
            }
            None => None,
        }
    }

    /// Forces and returns a specparam's value.
    pub fn specparam_value(&mut self, sym: SymbolId) -> Option<ConstantValue> {
        let (state, expr_syntax) = match &self.symbol(sym).kind {
            SymbolKind::Specparam(d) => (d.value.clone(), d.expr),
            _ => return None,
        };
        match state {
            Lazy::Resolved(v) => Some(v),
            Lazy::Resolving => None,
            Lazy::Unresolved => {
                if let SymbolKind::Specparam(d) = &mut self.symbol_mut(sym).kind {
                    d.value = Lazy::Resolving;
                }
                let scope = self.symbol(sym).parent.unwrap_or(sym);
                let location = LookupLocation::before(self.symbol(sym));
                let ctx = BindContext::new(scope, location);
                let bound = expr::bind(self, expr_syntax, &ctx);
                let value = if bound.bad() {
                    None
                } else {
                    let mut ectx = EvalContext::with_flags(
                        crate::const_eval::EvalFlags::SPECPARAMS_ALLOWED,
                    );
                    const_eval::eval(self, &bound, &mut ectx)
                };
                let final_value = value.clone().unwrap_or(ConstantValue::Null);
                if let SymbolKind::Specparam(d) = &mut self.symbol_mut(sym).kind {
                    d.value = Lazy::Resolved(final_value);
                }
                value
            }
        }
    }

    /// Forces and returns a subroutine's return type.
    pub fn subroutine_return_type(&mut self, sym: SymbolId) -> TypeId {
        let (state, syntax) = match &self.symbol(sym).kind {
            SymbolKind::Subroutine(d) => (d.return_ty.clone(), d.syntax),
            _ => return TypeDb::ERROR,
        };
        match state {
            Lazy::Resolved(ty) => ty,
            Lazy::Resolving => TypeDb::ERROR,
            Lazy::Unresolved => {
                if let SymbolKind::Subroutine(d) = &mut self.symbol_mut(sym).kind {
                    d.return_ty = Lazy::Resolving;
                }
                let ty = match &syntax.return_ty {
                    Some(spec) => {
                        let location = LookupLocation::before(self.symbol(sym));
                        let scope = self.symbol(sym).parent.unwrap_or(sym);
                        declared_types::resolve_type_spec(self, spec, scope, location)
                    }
                    None => TypeDb::VOID,
                };
                if let SymbolKind::Subroutine(d) = &mut self.symbol_mut(sym).kind {
                    d.return_ty = Lazy::Resolved(ty);
                }
                ty
            }
        }
    }

    /// Binds (once) and returns a subroutine's body statements.
    pub fn bound_subroutine_body(&mut self, sym: SymbolId) -> Option<Vec<Statement>> {
        let (state, body) = match &self.symbol(sym).kind {
            SymbolKind::Subroutine(d) => (d.bound.clone(), &d.syntax.body),
            _ => return None,
        };
        match state {
            Lazy::Resolved(stmts) => Some(stmts),
            Lazy::Resolving => None,
            Lazy::Unresolved => {
                if let SymbolKind::Subroutine(d) = &mut self.symbol_mut(sym).kind {
                    d.bound = Lazy::Resolving;
                }
                let mut ctx = BindContext::new(sym, LookupLocation::MAX);
                ctx.subroutine = Some(sym);
                let bound =
                    stmt::bind_stmt_list(self, body, &ctx, drivers::DriverSource::Subroutine);
                if let SymbolKind::Subroutine(d) = &mut self.symbol_mut(sym).kind {
                    d.bound = Lazy::Resolved(bound.clone());
                }
                Some(bound)
            }
        }
    }

    /// Forces and returns a typedef's aliased type.
    pub fn resolve_type_alias(&mut self, sym: SymbolId) -> TypeId {
        let (state, syntax, name) = match &self.symbol(sym).kind {
            SymbolKind::TypeAlias(d) => (d.ty.clone(), d.syntax, self.symbol(sym).name),
            _ => return TypeDb::ERROR,
        };
        match state {
            Lazy::Resolved(ty) => ty,
            Lazy::Resolving => {
                let n = self.symbol_name(sym);
                let span = self.symbol(sym).span;
                self.emit(errors::typedef_cycle(&n, span));
                TypeDb::ERROR
            }
            Lazy::Unresolved => {
                if let SymbolKind::TypeAlias(d) = &mut self.symbol_mut(sym).kind {
                    d.ty = Lazy::Resolving;
                }
                let scope = self.symbol(sym).parent.unwrap_or(sym);
                let location = LookupLocation::before(self.symbol(sym));
                let target = declared_types::resolve_type_spec(self, syntax, scope, location);
                let ty = match name {
                    Some(name) if !self.types.is_error(target) => {
                        self.types.alias(name, target)
                    }
                    _ => target,
                };
                if let SymbolKind::TypeAlias(d) = &mut self.symbol_mut(sym).kind {
                    d.ty = Lazy::Resolved(ty);
                }
                ty
            }
        }
    }

    /// The default variable lifetime for declarations in a scope.
    pub fn default_lifetime(&self, scope: SymbolId) -> VariableLifetime {
        match &self.symbol(scope).kind {
            SymbolKind::Subroutine(data) => data.lifetime,
            SymbolKind::StatementBlock(_) | SymbolKind::ProceduralBlock(_) => {
                VariableLifetime::Static
            }
            SymbolKind::Class(_) => VariableLifetime::Automatic,
            _ => VariableLifetime::Static,
        }
    }

    // ------------------------------------------------------------------
    // Constant evaluation helpers
    // ------------------------------------------------------------------

    /// Binds and evaluates a syntax expression to an integer, emitting
    /// diagnostics on failure.
    pub fn eval_const_int_syntax(
        &mut self,
        expr_syntax: &'s ast::Expr,
        ctx: &BindContext,
    ) -> Option<i64> {
        let bound = expr::bind(self, expr_syntax, &ctx.without_target());
        if bound.bad() {
            return None;
        }
        let mut ectx = EvalContext::new();
        const_eval::eval(self, &bound, &mut ectx)?.to_i64()
    }

    /// Quietly evaluates an already-bound expression to an integer,
    /// without emitting diagnostics; used to probe for constness.
    pub fn try_eval_const_int(&mut self, bound: &Expression) -> Option<i64> {
        let mut ectx = EvalContext::quiet();
        const_eval::eval(self, bound, &mut ectx)?.to_i64()
    }

    /// Binds a const variable's initializer for evaluation contexts that
    /// are allowed to read it.
    pub fn bind_initializer_for_eval(
        &mut self,
        sym: SymbolId,
        init: &'s ast::Expr,
    ) -> Option<Expression> {
        let scope = self.symbol(sym).parent?;
        let location = LookupLocation::after(self.symbol(sym));
        let ty = self.value_type(sym);
        let ctx = BindContext::new(scope, location).with_target(ty);
        let bound = expr::bind(self, init, &ctx);
        if bound.bad() {
            None
        } else {
            Some(bound)
        }
    }

    // ------------------------------------------------------------------
    // Root materialization
    // ------------------------------------------------------------------

    /// Returns the design root, elaborating the whole design on first
    /// call.
    ///
    /// Reentrant calls (from inside elaboration) are contract violations
    /// and return an error without touching state.
    pub fn root(&mut self) -> VerisResult<SymbolId> {
        if let Some(root) = self.root {
            if self.finalized {
                return Ok(root);
            }
        }
        if self.finalizing {
            return Err(InternalError::new(
                "reentrant call to root() during elaboration",
            ));
        }
        self.finalizing = true;

        self.parse_cli_overrides();
        let tops = self.select_top_modules();

        // Defparam fixed point: rebuild the design until the collected
        // defparam values stop changing (or the budget runs out). Bind
        // directives discovered during a pass also force another pass.
        let mut step = 0u32;
        loop {
            self.defparams.clear();
            let binds_before = self.bind_seen.len();
            let root = self.build_root(&tops);
            self.root = Some(root);
            members::force_elaborate(self);

            let new_overrides = self.collect_defparam_overrides();
            let binds_grew = self.bind_seen.len() != binds_before;
            if new_overrides == self.defparam_overrides && !binds_grew {
                break;
            }
            self.defparam_overrides = new_overrides;
            step += 1;
            if step >= self.options.max_def_param_steps {
                let span = self
                    .defparams
                    .first()
                    .map(|d| d.syntax.span)
                    .unwrap_or(Span::DUMMY);
                self.emit(errors::defparam_no_converge(
                    self.options.max_def_param_steps,
                    span,
                ));
                break;
            }
        }

        members::finalize_checks(self);
        self.finalized = true;
        self.finalizing = false;
        Ok(self.root.expect("root was just built"))
    }

    /// `true` once the design root has been materialized and the
    /// compilation frozen.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The design root, if it has been materialized.
    pub fn root_id(&self) -> Option<SymbolId> {
        self.root
    }

    /// The top-level instances of the design root, in creation order.
    pub fn top_instances(&self) -> Vec<SymbolId> {
        match self.root.map(|r| self.symbol(r)) {
            Some(sym) => sym
                .scope()
                .map(|sd| sd.members.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn parse_cli_overrides(&mut self) {
        let texts = self.options.param_overrides.clone();
        for text in texts {
            match overrides::parse_override(&text, self.interner) {
                Some((name, value)) => {
                    self.cli_overrides.insert(name, value);
                }
                None => {
                    self.emit(errors::bad_param_override(&text, Span::DUMMY));
                }
            }
        }
    }

    fn select_top_modules(&mut self) -> Vec<DefinitionId> {
        if !self.options.top_modules.is_empty() {
            let names = self.options.top_modules.clone();
            let mut tops = Vec::new();
            for name in names {
                match self
                    .interner
                    .get(&name)
                    .and_then(|ident| self.definitions.top_level(ident))
                {
                    Some((id, _)) => tops.push(id),
                    None => {
                        self.emit(errors::unknown_definition(&name, Span::DUMMY));
                    }
                }
            }
            return tops;
        }
        // Inference: top-level module definitions that are never
        // instantiated anywhere and whose parameters all have defaults.
        let mut tops = Vec::new();
        for def in self.definitions.iter() {
            if def.kind != ast::DefinitionKind::Module || def.scope.is_some() {
                continue;
            }
            if self.instantiated_names.contains(&def.name) {
                continue;
            }
            let resolvable = def
                .syntax
                .params
                .iter()
                .all(|p| p.default.is_some() || p.is_type || p.local);
            if resolvable {
                tops.push(def.id);
            }
        }
        tops
    }

    fn build_root(&mut self, tops: &[DefinitionId]) -> SymbolId {
        let root = self.alloc_symbol(
            None,
            Span::DUMMY,
            None,
            0,
            SymbolKind::Root(ScopeData::new()),
        );
        for &def_id in tops {
            let (name, span) = {
                let def = self.definitions.get(def_id);
                (def.name, def.syntax.span)
            };
            members::create_instance(self, def_id, name, root, &[], &[], span);
        }
        root
    }

    fn collect_defparam_overrides(&mut self) -> ParamOverrideNode {
        let records = self.defparams.clone();
        let mut node = ParamOverrideNode::new();
        for record in records {
            let ctx = BindContext::new(record.scope, LookupLocation::MAX);
            let bound = expr::bind(self, &record.syntax.value, &ctx);
            if bound.bad() {
                continue;
            }
            let mut ectx = EvalContext::new();
            let Some(value) = const_eval::eval(self, &bound, &mut ectx) else {
                continue;
            };
            node.insert_path(&record.syntax.target, value);
        }
        node
    }

    /// The override value applying to a parameter of a specific
    /// instance, consulting the defparam tree along the instance path
    /// and (for top-level instances) the command-line overrides.
    pub(crate) fn override_for(
        &self,
        parent_scope: SymbolId,
        instance_name: Ident,
        param: Ident,
    ) -> Option<ConstantValue> {
        // Build the path of instance/generate names from the root.
        let mut path = vec![instance_name];
        let mut cur = Some(parent_scope);
        while let Some(id) = cur {
            let sym = self.symbol(id);
            match &sym.kind {
                SymbolKind::Instance(_) | SymbolKind::GenerateBlock(_) => {
                    if let Some(name) = sym.name {
                        path.push(name);
                    }
                }
                _ => {}
            }
            cur = sym.parent;
        }
        path.reverse();

        let mut node = Some(&self.defparam_overrides);
        for step in &path {
            node = node.and_then(|n| n.child(*step));
            if node.is_none() {
                break;
            }
        }
        if let Some(value) = node.and_then(|n| n.value_for(param)) {
            return Some(value.clone());
        }
        // Command-line overrides apply to top-level instance parameters.
        if path.len() == 1 {
            return self.cli_overrides.get(&param).cloned();
        }
        None
    }

    // ------------------------------------------------------------------
    // Scope elaboration
    // ------------------------------------------------------------------

    /// Materializes any deferred members of a scope (instantiations,
    /// generate constructs, bound instances).
    pub fn elaborate_scope(&mut self, scope: SymbolId) {
        let has = self
            .symbol(scope)
            .scope()
            .map_or(false, ScopeData::has_deferred);
        if !has {
            return;
        }
        let deferred = self
            .symbol_mut(scope)
            .scope_mut()
            .map(ScopeData::take_deferred)
            .unwrap_or_default();
        for member in deferred {
            members::materialize_deferred(self, scope, member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_syntax::SourceUnit;

    fn empty_tree() -> SyntaxTree {
        SyntaxTree::new(SourceUnit {
            items: Vec::new(),
            span: Span::DUMMY,
        })
    }

    #[test]
    fn std_package_is_built_in() {
        let interner = Interner::new();
        let comp = Compilation::new(&interner, CompilationOptions::default());
        let std_name = interner.get_or_intern("std");
        assert!(comp.package(std_name).is_some());
    }

    #[test]
    fn gate_namespace_is_separate() {
        let interner = Interner::new();
        let comp = Compilation::new(&interner, CompilationOptions::default());
        let and = interner.get_or_intern("and");
        assert!(comp.gate(and).is_some());
        // The gate name is not a package or definition.
        assert!(comp.package(and).is_none());
        assert!(comp.definitions.top_level(and).is_none());
    }

    #[test]
    fn root_freezes_the_compilation() {
        let interner = Interner::new();
        let tree = empty_tree();
        let late = empty_tree();
        let mut comp = Compilation::new(&interner, CompilationOptions::default());
        comp.add_tree(&tree).unwrap();
        assert!(!comp.is_finalized());
        let root = comp.root().unwrap();
        assert!(comp.is_finalized());
        assert!(comp.add_tree(&late).is_err());
        // Repeated root requests return the cached symbol.
        assert_eq!(comp.root().unwrap(), root);
    }

    #[test]
    fn typo_budget_is_bounded() {
        let interner = Interner::new();
        let options = CompilationOptions {
            typo_correction_limit: 2,
            ..CompilationOptions::default()
        };
        let mut comp = Compilation::new(&interner, options);
        assert!(comp.take_typo_budget());
        assert!(comp.take_typo_budget());
        assert!(!comp.take_typo_budget());
        assert!(!comp.take_typo_budget());
    }

    #[test]
    fn error_limit_emits_marker_and_stops() {
        let interner = Interner::new();
        let options = CompilationOptions {
            error_limit: 2,
            ..CompilationOptions::default()
        };
        let mut comp = Compilation::new(&interner, options);
        for i in 0..5 {
            let span = Span::new(veris_source::FileId::from_raw(0), i * 4, i * 4 + 1);
            comp.emit(errors::undeclared_identifier("x", span, None));
        }
        assert!(comp.hit_error_limit());
        let codes: Vec<String> = comp
            .diagnostics()
            .semantic()
            .iter()
            .map(|d| d.code.to_string())
            .collect();
        assert_eq!(codes.iter().filter(|c| *c == "E303").count(), 2);
        assert_eq!(codes.iter().filter(|c| *c == "E339").count(), 1);
    }

    #[test]
    fn attributes_collapse_duplicates() {
        let interner = Interner::new();
        let tree = empty_tree();
        let mut comp = Compilation::new(&interner, CompilationOptions::default());
        comp.add_tree(&tree).unwrap();
        let root = comp.root().unwrap();
        let name = interner.get_or_intern("keep_hierarchy");
        comp.set_attributes(
            root,
            vec![
                Attribute {
                    name,
                    value: ConstantValue::int(0),
                    span: Span::DUMMY,
                },
                Attribute {
                    name,
                    value: ConstantValue::int(1),
                    span: Span::DUMMY,
                },
            ],
        );
        let attrs = comp.attributes_of(root);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value.to_i64(), Some(1));
        assert!(comp
            .diagnostics()
            .semantic()
            .iter()
            .any(|d| d.code.to_string() == "W301"));
    }
}
