//! Scope member creation and the elaboration driver.
//!
//! This module turns syntax items into symbols (eagerly where possible,
//! deferred where construction would require expression binding),
//! stamps out instances with parameter resolution and bind-directive
//! injection, expands generate constructs under the step budget, and
//! runs the force-elaboration and finalize passes.

use crate::compilation::{Compilation, DefparamRecord};
use crate::const_eval::{self, EvalContext};
use crate::const_value::ConstantValue;
use crate::coverage;
use crate::drivers::{self, DriverKind, DriverSource};
use crate::errors;
use crate::expr::{self, BindContext, BindFlags};
use crate::lazy::Lazy;
use crate::lookup::{self, LookupFlags, LookupLocation};
use crate::scope::{DeferredMember, DeferredSyntax, ScopeData};
use crate::stmt;
use crate::symbols::{
    AssertionDeclData, AssertionDeclKind, AssignData, ClassData, ClockVarData, ClockingData,
    CoverCrossData, CoverageBinData, CovergroupData, CoverpointData, DefinitionId, FormalArgData,
    GenvarData, ImportData, InstanceData, ParameterData, ProceduralData, SpecparamData,
    SubroutineData, SymbolId, SymbolKind, TypeAliasData, ValueData, VariableData,
    VariableLifetime,
};
use crate::types::TypeDb;
use veris_common::Ident;
use veris_source::Span;
use veris_syntax as ast;

/// Adds one syntax item as a member of a scope.
pub fn add_member<'s>(comp: &mut Compilation<'s>, scope: SymbolId, item: &'s ast::ModuleItem) {
    match item {
        ast::ModuleItem::Parameter(decl) => {
            add_parameter(comp, scope, decl, false);
        }
        ast::ModuleItem::Typedef(decl) => {
            comp.add_symbol_to_scope(
                scope,
                Some(decl.name),
                decl.span,
                SymbolKind::TypeAlias(TypeAliasData {
                    syntax: &decl.ty,
                    ty: Lazy::Unresolved,
                }),
            );
        }
        ast::ModuleItem::Variable(decl) => add_variables(comp, scope, decl),
        ast::ModuleItem::Net(decl) => add_nets(comp, scope, decl),
        ast::ModuleItem::Specparam(decl) => {
            comp.add_symbol_to_scope(
                scope,
                Some(decl.name),
                decl.span,
                SymbolKind::Specparam(SpecparamData {
                    expr: &decl.value,
                    value: Lazy::Unresolved,
                }),
            );
        }
        ast::ModuleItem::Genvar(decl) => {
            for &name in &decl.names {
                comp.add_symbol_to_scope(
                    scope,
                    Some(name),
                    decl.span,
                    SymbolKind::Genvar(GenvarData { value: None }),
                );
            }
        }
        ast::ModuleItem::ContinuousAssign(assign) => {
            comp.add_symbol_to_scope(
                scope,
                None,
                assign.span,
                SymbolKind::ContinuousAssign(AssignData {
                    syntax: assign,
                    bound: Lazy::Unresolved,
                }),
            );
        }
        ast::ModuleItem::Procedural(block) => {
            comp.add_symbol_to_scope(
                scope,
                None,
                block.span,
                SymbolKind::ProceduralBlock(ProceduralData {
                    kind: block.kind,
                    body: &block.body,
                    scope: ScopeData::procedural(),
                    bound: Lazy::Unresolved,
                }),
            );
        }
        ast::ModuleItem::Instantiation(inst) => {
            if let Some(sd) = comp.symbol_mut(scope).scope_mut() {
                sd.defer(DeferredSyntax::Instantiation(inst));
            }
        }
        ast::ModuleItem::Defparam(defparam) => {
            comp.defparams.push(DefparamRecord {
                syntax: defparam,
                scope,
            });
        }
        ast::ModuleItem::Bind(bind) => {
            comp.note_bind_directive(bind);
        }
        ast::ModuleItem::Generate(construct) => {
            if let Some(sd) = comp.symbol_mut(scope).scope_mut() {
                sd.defer(DeferredSyntax::Generate(construct));
            }
        }
        ast::ModuleItem::Import(decl) => add_import(comp, scope, decl),
        ast::ModuleItem::Subroutine(decl) => {
            if let Some(class) = decl.class_scope {
                // Out-of-block declaration; consumed when the class
                // prototype is encountered.
                comp.out_of_block.insert(
                    (class, decl.name, scope),
                    crate::definitions::OutOfBlockDecl {
                        syntax: decl,
                        used: false,
                    },
                );
            } else {
                add_subroutine(comp, scope, decl, false);
            }
        }
        ast::ModuleItem::Class(decl) => add_class(comp, scope, decl),
        ast::ModuleItem::Sequence(decl) => {
            add_assertion_decl(comp, scope, decl, AssertionDeclKind::Sequence);
        }
        ast::ModuleItem::Property(decl) => {
            add_assertion_decl(comp, scope, decl, AssertionDeclKind::Property);
        }
        ast::ModuleItem::Let(decl) => {
            add_assertion_decl(comp, scope, decl, AssertionDeclKind::Let);
        }
        ast::ModuleItem::Covergroup(decl) => add_covergroup(comp, scope, decl),
        ast::ModuleItem::Clocking(decl) => add_clocking(comp, scope, decl),
        ast::ModuleItem::DefaultClocking(decl) => {
            comp.pending_default_clocking.push((scope, decl));
        }
        ast::ModuleItem::DefaultDisable(decl) => {
            comp.pending_default_disable.push((scope, decl));
        }
        ast::ModuleItem::DpiExport(decl) => {
            comp.dpi_exports.push((decl, scope));
        }
        ast::ModuleItem::Error(_) => {}
    }
}

fn add_parameter<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    decl: &'s ast::ParamDecl,
    is_port: bool,
) -> SymbolId {
    comp.add_symbol_to_scope(
        scope,
        Some(decl.name),
        decl.span,
        SymbolKind::Parameter(ParameterData {
            ty: Lazy::Unresolved,
            type_syntax: decl.ty.as_ref(),
            is_local: decl.local,
            is_port,
            is_type: decl.is_type,
            default: decl.default.as_ref(),
            override_value: None,
            value: Lazy::Unresolved,
        }),
    )
}

fn add_variables<'s>(comp: &mut Compilation<'s>, scope: SymbolId, decl: &'s ast::VarDecl) {
    let in_procedural = comp
        .symbol(scope)
        .scope()
        .map_or(false, |sd| sd.is_procedural);
    let explicit = decl.lifetime.is_some();
    let lifetime = match decl.lifetime {
        Some(ast::Lifetime::Automatic) => {
            if !in_procedural {
                comp.emit(errors::automatic_not_allowed(decl.span));
                VariableLifetime::Static
            } else {
                VariableLifetime::Automatic
            }
        }
        Some(ast::Lifetime::Static) => VariableLifetime::Static,
        None => comp.default_lifetime(scope),
    };
    for declarator in &decl.declarators {
        let mut value = ValueData::new(Some(&decl.ty));
        value.unpacked_dims = &declarator.dims;
        value.initializer = declarator.init.as_ref();
        comp.add_symbol_to_scope(
            scope,
            Some(declarator.name),
            declarator.span,
            SymbolKind::Variable(VariableData {
                value,
                lifetime,
                is_const: decl.is_const,
            }),
        );
        if decl.is_const && declarator.init.is_none() {
            let in_class = matches!(comp.symbol(scope).kind, SymbolKind::Class(_));
            // Uninitialized const class properties are the constructor
            // special case, not an error.
            if !in_class {
                let n = comp.interner.resolve(declarator.name).to_string();
                comp.emit(errors::const_var_no_initializer(&n, declarator.span));
            }
        }
        if lifetime == VariableLifetime::Static
            && !explicit
            && in_procedural
            && declarator.init.is_some()
        {
            comp.emit(errors::static_initializer_must_be_explicit(declarator.span));
        }
    }
}

fn add_nets<'s>(comp: &mut Compilation<'s>, scope: SymbolId, decl: &'s ast::NetDecl) {
    let in_package = matches!(comp.symbol(scope).kind, SymbolKind::Package(_));
    for declarator in &decl.declarators {
        if in_package && declarator.init.is_some() {
            comp.emit(errors::package_net_init(declarator.span));
        }
        let mut value = ValueData::new(Some(&decl.ty));
        value.unpacked_dims = &declarator.dims;
        value.initializer = declarator.init.as_ref();
        comp.add_symbol_to_scope(
            scope,
            Some(declarator.name),
            declarator.span,
            SymbolKind::Net(crate::symbols::NetData {
                value,
                kind: decl.kind,
            }),
        );
    }
}

fn add_import<'s>(comp: &mut Compilation<'s>, scope: SymbolId, decl: &'s ast::ImportDecl) {
    let data = ImportData {
        package: decl.package,
        name: decl.name,
    };
    match decl.name {
        None => {
            let sym = comp.add_symbol_to_scope(
                scope,
                None,
                decl.span,
                SymbolKind::WildcardImport(data),
            );
            if let Some(sd) = comp.symbol_mut(scope).scope_mut() {
                sd.imports.push(sym);
            }
        }
        Some(name) => {
            comp.add_symbol_to_scope(scope, Some(name), decl.span, SymbolKind::ExplicitImport(data));
        }
    }
}

fn add_subroutine<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    decl: &'s ast::SubroutineDecl,
    in_class: bool,
) -> SymbolId {
    let lifetime = match decl.lifetime {
        Some(ast::Lifetime::Automatic) => VariableLifetime::Automatic,
        Some(ast::Lifetime::Static) => VariableLifetime::Static,
        None => {
            if in_class {
                VariableLifetime::Automatic
            } else {
                VariableLifetime::Static
            }
        }
    };
    let is_constructor = in_class && comp.interner.resolve(decl.name) == "new";
    let sub = comp.add_symbol_to_scope(
        scope,
        Some(decl.name),
        decl.span,
        SymbolKind::Subroutine(SubroutineData {
            kind: decl.kind,
            lifetime,
            syntax: decl,
            scope: ScopeData::procedural(),
            args: Vec::new(),
            return_ty: Lazy::Unresolved,
            is_constructor,
            bound: Lazy::Unresolved,
        }),
    );
    let mut args = Vec::with_capacity(decl.args.len());
    for arg in &decl.args {
        let mut value = ValueData::new(Some(&arg.ty));
        value.initializer = arg.default.as_ref();
        let arg_sym = comp.add_symbol_to_scope(
            sub,
            Some(arg.name),
            arg.span,
            SymbolKind::FormalArgument(FormalArgData {
                value,
                direction: arg.direction,
                default: arg.default.as_ref(),
            }),
        );
        args.push(arg_sym);
    }
    if let SymbolKind::Subroutine(data) = &mut comp.symbol_mut(sub).kind {
        data.args = args;
    }
    sub
}

fn add_class<'s>(comp: &mut Compilation<'s>, scope: SymbolId, decl: &'s ast::ClassDecl) {
    let ty = comp.types.add_class(decl.name);
    let class = comp.add_symbol_to_scope(
        scope,
        Some(decl.name),
        decl.span,
        SymbolKind::Class(ClassData {
            syntax: decl,
            scope: ScopeData::new(),
            ty,
        }),
    );
    for item in &decl.items {
        match item {
            ast::ClassItem::Property(var) => add_variables(comp, class, var),
            ast::ClassItem::Method(sub) => {
                add_subroutine(comp, class, sub, true);
            }
            ast::ClassItem::MethodPrototype { name, span, .. } => {
                // Consume a matching out-of-block declaration.
                let key = (decl.name, *name, scope);
                let found = match comp.out_of_block.get_mut(&key) {
                    Some(entry) => {
                        entry.used = true;
                        Some(entry.syntax)
                    }
                    None => None,
                };
                match found {
                    Some(body) => {
                        add_subroutine(comp, class, body, true);
                    }
                    None => {
                        let n = comp.interner.resolve(*name).to_string();
                        let c = comp.interner.resolve(decl.name).to_string();
                        comp.emit(errors::call_arg_mismatch(
                            &format!("no out-of-block definition for prototype `{c}::{n}`"),
                            *span,
                        ));
                    }
                }
            }
        }
    }
}

fn add_assertion_decl<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    decl: &'s ast::AssertionDecl,
    kind: AssertionDeclKind,
) {
    let data = AssertionDeclData {
        kind,
        syntax: decl,
        scope: ScopeData::new(),
        ports: Vec::new(),
    };
    let sym_kind = match kind {
        AssertionDeclKind::Sequence => SymbolKind::Sequence(data),
        AssertionDeclKind::Property => SymbolKind::Property(data),
        AssertionDeclKind::Let => SymbolKind::Let(data),
    };
    let sym = comp.add_symbol_to_scope(scope, Some(decl.name), decl.span, sym_kind);

    let mut ports = Vec::with_capacity(decl.ports.len());
    for port in &decl.ports {
        let kind = if port.local_direction.is_some() {
            let mut value = ValueData::new(port.ty.as_ref());
            value.initializer = port.default.as_ref();
            SymbolKind::LocalAssertionVar(VariableData {
                value,
                lifetime: VariableLifetime::Automatic,
                is_const: false,
            })
        } else {
            let mut value = ValueData::new(port.ty.as_ref());
            value.initializer = port.default.as_ref();
            SymbolKind::AssertionPort(value)
        };
        let port_sym = comp.add_symbol_to_scope(sym, Some(port.name), port.span, kind);
        ports.push(port_sym);
    }
    match &mut comp.symbol_mut(sym).kind {
        SymbolKind::Sequence(data) | SymbolKind::Property(data) | SymbolKind::Let(data) => {
            data.ports = ports;
        }
        _ => {}
    }
}

fn add_covergroup<'s>(comp: &mut Compilation<'s>, scope: SymbolId, decl: &'s ast::CovergroupDecl) {
    let ty = comp.types.add_covergroup(decl.name);
    let cg = comp.add_symbol_to_scope(
        scope,
        Some(decl.name),
        decl.span,
        SymbolKind::Covergroup(CovergroupData {
            syntax: decl,
            scope: ScopeData::new(),
            ty,
        }),
    );
    for item in &decl.items {
        match item {
            ast::CovergroupItem::Coverpoint(cp) => {
                let cp_sym = comp.add_symbol_to_scope(
                    cg,
                    cp.label,
                    cp.span,
                    SymbolKind::Coverpoint(CoverpointData {
                        syntax: cp,
                        scope: ScopeData::new(),
                        iff: Lazy::Unresolved,
                    }),
                );
                for bin in &cp.bins {
                    comp.add_symbol_to_scope(
                        cp_sym,
                        Some(bin.name),
                        bin.span,
                        SymbolKind::CoverageBin(CoverageBinData {
                            syntax: bin,
                            resolved: Lazy::Unresolved,
                        }),
                    );
                }
            }
            ast::CovergroupItem::Cross(cross) => {
                comp.add_symbol_to_scope(
                    cg,
                    cross.label,
                    cross.span,
                    SymbolKind::CoverCross(CoverCrossData {
                        syntax: cross,
                        targets: Lazy::Unresolved,
                    }),
                );
            }
        }
    }
}

fn add_clocking<'s>(comp: &mut Compilation<'s>, scope: SymbolId, decl: &'s ast::ClockingDecl) {
    let clocking = comp.add_symbol_to_scope(
        scope,
        Some(decl.name),
        decl.span,
        SymbolKind::ClockingBlock(ClockingData {
            syntax: decl,
            scope: ScopeData::new(),
            is_global: decl.is_global,
            event: Lazy::Unresolved,
        }),
    );
    for item in &decl.items {
        for &name in &item.names {
            comp.add_symbol_to_scope(
                clocking,
                Some(name),
                item.span,
                SymbolKind::ClockVar(ClockVarData {
                    direction: item.direction,
                    ty: Lazy::Unresolved,
                    target: None,
                    drivers: Vec::new(),
                }),
            );
        }
    }
    if decl.is_global {
        comp.set_global_clocking(scope, clocking);
    }
}

// ----------------------------------------------------------------------
// Instances
// ----------------------------------------------------------------------

/// Materializes one deferred member of a scope.
pub fn materialize_deferred<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    member: DeferredMember<'s>,
) {
    match member.syntax {
        DeferredSyntax::Instantiation(inst) | DeferredSyntax::BindInstantiation(inst) => {
            materialize_instantiation(comp, scope, inst, member.index);
        }
        DeferredSyntax::Generate(construct) => {
            expand_generate(comp, scope, construct, member.index);
        }
    }
}

fn materialize_instantiation<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    inst: &'s ast::Instantiation,
    index: u32,
) {
    if comp.gate(inst.module).is_some() {
        // Built-in gate primitives elaborate to nothing in the semantic
        // model; their connections are checked by downstream tools.
        return;
    }
    // Collect the scope chain for nested-definition resolution.
    let mut chain = Vec::new();
    let mut cur = Some(scope);
    while let Some(id) = cur {
        chain.push(id);
        cur = comp.symbol(id).parent;
    }
    let Some(def_id) = comp.definitions.lookup(inst.module, &chain) else {
        if !comp.options.lint_mode {
            let name = comp.interner.resolve(inst.module).to_string();
            comp.emit(errors::unknown_definition(&name, inst.span));
        }
        return;
    };
    for body in &inst.instances {
        create_instance_at(
            comp,
            def_id,
            body.name,
            scope,
            &inst.param_assignments,
            &body.connections,
            body.span,
            Some(index),
        );
    }
}

/// Creates an instance of a definition inside `parent`, resolving
/// parameters and deferring body instantiations.
pub fn create_instance<'s>(
    comp: &mut Compilation<'s>,
    def_id: DefinitionId,
    name: Ident,
    parent: SymbolId,
    param_assignments: &'s [ast::ParamAssignment],
    connections: &'s [ast::PortConnection],
    span: Span,
) -> Option<SymbolId> {
    create_instance_at(
        comp,
        def_id,
        name,
        parent,
        param_assignments,
        connections,
        span,
        None,
    )
}

#[allow(clippy::too_many_arguments)]
fn create_instance_at<'s>(
    comp: &mut Compilation<'s>,
    def_id: DefinitionId,
    name: Ident,
    parent: SymbolId,
    param_assignments: &'s [ast::ParamAssignment],
    connections: &'s [ast::PortConnection],
    span: Span,
    index: Option<u32>,
) -> Option<SymbolId> {
    let depth = comp.instance_depth(parent);
    if depth >= comp.options.max_instance_depth {
        comp.emit(errors::instance_depth_exceeded(
            comp.options.max_instance_depth,
            span,
        ));
        return None;
    }
    let def_syntax = comp.definitions.get(def_id).syntax;
    comp.definitions.get_mut(def_id).instantiated = true;

    let kind = SymbolKind::Instance(InstanceData {
        definition: def_id,
        scope: ScopeData::new(),
        parameters: Vec::new(),
    });
    let instance = match index {
        Some(index) => comp.insert_symbol_at(parent, Some(name), span, kind, index),
        None => comp.add_symbol_to_scope(parent, Some(name), span, kind),
    };

    // Create parameter symbols in declaration order. Overrides
    // (defparam and command line) take precedence, then instantiation
    // assignments (bound in the parent context), then defaults (bound
    // lazily in the instance context once the body exists).
    let mut param_syms = Vec::new();
    let parent_ctx = BindContext::new(parent, LookupLocation::MAX);
    for (pos, param_decl) in def_syntax.params.iter().enumerate() {
        let param_sym = add_parameter(comp, instance, param_decl, true);
        let assignment = find_param_assignment(param_assignments, param_decl.name, pos);
        if param_decl.local && assignment.is_some() {
            let n = comp.interner.resolve(param_decl.name).to_string();
            comp.emit(errors::local_param_override(&n, span));
        }
        let override_value = comp
            .override_for(parent, name, param_decl.name)
            .or_else(|| {
                if param_decl.local {
                    return None;
                }
                assignment.and_then(|a| {
                    let bound = expr::bind(comp, &a.expr, &parent_ctx);
                    if bound.bad() {
                        return None;
                    }
                    let mut ectx = EvalContext::new();
                    const_eval::eval(comp, &bound, &mut ectx)
                })
            });
        if let SymbolKind::Parameter(data) = &mut comp.symbol_mut(param_sym).kind {
            data.override_value = override_value;
        }
        if !param_decl.is_type {
            param_syms.push((param_decl.name, param_sym));
        }
    }

    // Ports become value symbols in the instance scope.
    for port in &def_syntax.ports {
        let mut value = ValueData::new(Some(&port.ty));
        value.unpacked_dims = &port.unpacked_dims;
        let kind = if port.is_net {
            SymbolKind::Net(crate::symbols::NetData {
                value,
                kind: default_net_kind(comp, def_id),
            })
        } else {
            SymbolKind::Variable(VariableData {
                value,
                lifetime: VariableLifetime::Static,
                is_const: false,
            })
        };
        comp.add_symbol_to_scope(instance, Some(port.name), port.span, kind);
    }

    // Body members; instantiations and generates defer.
    for item in &def_syntax.items {
        add_member(comp, instance, item);
    }

    // Bind directives targeting this definition inject their
    // instantiations at the end of every instance body.
    let def_name = comp.definitions.get(def_id).name;
    let injected: Vec<&'s ast::BindDirective> = comp
        .binds_by_target
        .get(&def_name)
        .map(|v| v.clone())
        .unwrap_or_default();
    for bind in injected {
        if let Some(sd) = comp.symbol_mut(instance).scope_mut() {
            sd.defer(DeferredSyntax::BindInstantiation(&bind.instantiation));
        }
    }

    // Force the parameter values now that the body exists; defaults may
    // reach through the instance hierarchy.
    let mut resolved_params = Vec::new();
    for (param_name, param_sym) in param_syms {
        if let Some(value) = comp.parameter_value(param_sym) {
            resolved_params.push((param_name, value));
        }
    }
    if let SymbolKind::Instance(data) = &mut comp.symbol_mut(instance).kind {
        data.parameters = resolved_params;
    }

    // Port connections bind in the parent scope.
    bind_port_connections(comp, instance, def_id, connections, parent);
    Some(instance)
}

fn default_net_kind(comp: &Compilation<'_>, def_id: DefinitionId) -> ast::NetKind {
    match comp.definitions.get(def_id).default_net_type {
        ast::DefaultNetType::Wire | ast::DefaultNetType::None => ast::NetKind::Wire,
        ast::DefaultNetType::Tri => ast::NetKind::Tri,
        ast::DefaultNetType::Uwire => ast::NetKind::Uwire,
        ast::DefaultNetType::Wand => ast::NetKind::Wand,
        ast::DefaultNetType::Wor => ast::NetKind::Wor,
    }
}

fn find_param_assignment<'a>(
    assignments: &'a [ast::ParamAssignment],
    name: Ident,
    position: usize,
) -> Option<&'a ast::ParamAssignment> {
    let named = assignments
        .iter()
        .find(|a| a.name == Some(name));
    if named.is_some() {
        return named;
    }
    let ordered: Vec<&ast::ParamAssignment> =
        assignments.iter().filter(|a| a.name.is_none()).collect();
    ordered.get(position).copied()
}

fn bind_port_connections<'s>(
    comp: &mut Compilation<'s>,
    instance: SymbolId,
    def_id: DefinitionId,
    connections: &'s [ast::PortConnection],
    parent: SymbolId,
) {
    let ports: Vec<(Ident, ast::Direction)> = comp
        .definitions
        .get(def_id)
        .syntax
        .ports
        .iter()
        .map(|p| (p.name, p.direction))
        .collect();
    let ctx = BindContext::new(parent, LookupLocation::MAX)
        .with_flags(BindFlags::NON_PROCEDURAL);

    let mut ordered_pos = 0usize;
    for conn in connections {
        let port = match conn.name {
            Some(name) => ports.iter().find(|(n, _)| *n == name),
            None => {
                let p = ports.get(ordered_pos);
                ordered_pos += 1;
                p
            }
        };
        let Some(&(_, direction)) = port else {
            let msg = match conn.name {
                Some(name) => {
                    let n = comp.interner.resolve(name).to_string();
                    let d = comp.symbol_name(instance);
                    format!("instance `{d}` has no port named `{n}`")
                }
                None => "too many ordered port connections".to_string(),
            };
            comp.emit(errors::port_connection_error(&msg, conn.span));
            continue;
        };
        let Some(expr_syntax) = &conn.expr else {
            continue;
        };
        let bound = expr::bind(comp, expr_syntax, &ctx);
        if bound.bad() {
            continue;
        }
        if direction == ast::Direction::Output || direction == ast::Direction::Inout {
            if direction == ast::Direction::Inout {
                if let Some(root) = bound.symbol_ref() {
                    if matches!(
                        &comp.symbol(root).kind,
                        SymbolKind::Net(n) if n.kind == ast::NetKind::Uwire
                    ) {
                        let n = comp.symbol_name(root);
                        comp.emit(errors::uwire_violation(&n, conn.span));
                        continue;
                    }
                }
            }
            drivers::require_lvalue(
                comp,
                &bound,
                &ctx,
                DriverKind::Continuous,
                DriverSource::Continuous,
                false,
                conn.span,
            );
        }
    }
}

// ----------------------------------------------------------------------
// Generate constructs
// ----------------------------------------------------------------------

fn expand_generate<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    construct: &'s ast::GenerateConstruct,
    index: u32,
) {
    let ctx = BindContext::new(scope, LookupLocation::MAX);
    match construct {
        ast::GenerateConstruct::If {
            cond,
            then_items,
            else_items,
            span,
        } => {
            let Some(value) = comp.eval_const_int_syntax(cond, &ctx) else {
                return;
            };
            let items = if value != 0 { then_items } else { else_items };
            let block = comp.insert_symbol_at(
                scope,
                None,
                *span,
                SymbolKind::GenerateBlock(ScopeData::new()),
                index,
            );
            for item in items {
                add_member(comp, block, item);
            }
        }
        ast::GenerateConstruct::Block { label, items, span } => {
            let block = comp.insert_symbol_at(
                scope,
                *label,
                *span,
                SymbolKind::GenerateBlock(ScopeData::new()),
                index,
            );
            for item in items {
                add_member(comp, block, item);
            }
        }
        ast::GenerateConstruct::For {
            genvar,
            init,
            cond,
            step,
            body,
            label,
            span,
        } => {
            let Some(mut value) = comp.eval_const_int_syntax(init, &ctx) else {
                comp.emit(errors::bad_generate_loop(
                    "generate loop initializer is not constant",
                    init.span(),
                ));
                return;
            };
            let mut steps = 0u32;
            loop {
                steps += 1;
                if steps > comp.options.max_generate_steps {
                    comp.emit(errors::generate_steps_exceeded(
                        comp.options.max_generate_steps,
                        *span,
                    ));
                    return;
                }
                // Evaluate the loop condition with the genvar bound.
                let block_name = generate_block_name(comp, *label, *genvar, value);
                let cond_value = eval_with_genvar(comp, scope, *genvar, value, cond);
                match cond_value {
                    Some(v) if v != 0 => {}
                    Some(_) => break,
                    None => {
                        comp.emit(errors::bad_generate_loop(
                            "generate loop condition is not constant",
                            cond.span(),
                        ));
                        return;
                    }
                }
                let block = comp.insert_symbol_at(
                    scope,
                    Some(block_name),
                    *span,
                    SymbolKind::GenerateBlock(ScopeData::new()),
                    index,
                );
                // The iteration's genvar value becomes a localparam in
                // the block so members can reference it.
                comp.add_symbol_to_scope(
                    block,
                    Some(*genvar),
                    *span,
                    SymbolKind::Parameter(ParameterData {
                        ty: Lazy::Resolved(TypeDb::INT),
                        type_syntax: None,
                        is_local: true,
                        is_port: false,
                        is_type: false,
                        default: None,
                        override_value: Some(ConstantValue::int(value)),
                        value: Lazy::Resolved(ConstantValue::int(value)),
                    }),
                );
                for item in body {
                    add_member(comp, block, item);
                }
                let next = eval_with_genvar(comp, scope, *genvar, value, step);
                match next {
                    Some(v) => value = v,
                    None => {
                        comp.emit(errors::bad_generate_loop(
                            "generate loop step is not constant",
                            step.span(),
                        ));
                        return;
                    }
                }
            }
        }
    }
}

fn generate_block_name(
    comp: &Compilation<'_>,
    label: Option<Ident>,
    genvar: Ident,
    value: i64,
) -> Ident {
    let base = match label {
        Some(l) => comp.interner.resolve(l).to_string(),
        None => format!("genblk_{}", comp.interner.resolve(genvar)),
    };
    comp.interner.get_or_intern(&format!("{base}[{value}]"))
}

/// Evaluates an expression with a genvar temporarily set to a value.
fn eval_with_genvar<'s>(
    comp: &mut Compilation<'s>,
    scope: SymbolId,
    genvar: Ident,
    value: i64,
    expr_syntax: &'s ast::Expr,
) -> Option<i64> {
    let genvar_sym = lookup::unqualified(
        comp,
        scope,
        genvar,
        LookupLocation::MAX,
        LookupFlags::ALLOW_DECLARED_AFTER,
    );
    if let Some(sym) = genvar_sym {
        if let SymbolKind::Genvar(data) = &mut comp.symbol_mut(sym).kind {
            data.value = Some(ConstantValue::int(value));
        }
    }
    let ctx = BindContext::new(scope, LookupLocation::MAX);
    let result = comp.eval_const_int_syntax(expr_syntax, &ctx);
    if let Some(sym) = genvar_sym {
        if let SymbolKind::Genvar(data) = &mut comp.symbol_mut(sym).kind {
            data.value = None;
        }
    }
    result
}

// ----------------------------------------------------------------------
// Force elaboration and finalize
// ----------------------------------------------------------------------

/// Visits every symbol and forces any deferred work: scope
/// materialization, type and value resolution, body binding, coverage
/// resolution. Idempotent after the first complete pass.
pub fn force_elaborate(comp: &mut Compilation<'_>) {
    let mut i = 0;
    while i < comp.symbol_count() {
        let id = SymbolId::from_raw(i as u32);
        comp.elaborate_scope(id);
        force_symbol(comp, id);
        i += 1;
    }
    resolve_pending_clocking(comp);
}

fn force_symbol(comp: &mut Compilation<'_>, id: SymbolId) {
    enum Work<'s> {
        None,
        Value,
        Parameter,
        Assign(&'s ast::ContinuousAssign),
        Procedural(&'s ast::Stmt, ast::ProceduralKind),
        Subroutine,
        Covergroup,
        Clocking,
        TypeAlias,
    }
    let work = match &comp.symbol(id).kind {
        SymbolKind::Variable(_) | SymbolKind::Net(_) => Work::Value,
        SymbolKind::Parameter(_) => Work::Parameter,
        SymbolKind::ContinuousAssign(data) => {
            if data.bound.is_resolved() {
                Work::None
            } else {
                Work::Assign(data.syntax)
            }
        }
        SymbolKind::ProceduralBlock(data) => {
            if data.bound.is_resolved() {
                Work::None
            } else {
                Work::Procedural(data.body, data.kind)
            }
        }
        SymbolKind::Subroutine(_) => Work::Subroutine,
        SymbolKind::Covergroup(_) => Work::Covergroup,
        SymbolKind::ClockingBlock(data) => {
            if data.event.is_resolved() {
                Work::None
            } else {
                Work::Clocking
            }
        }
        SymbolKind::TypeAlias(_) => Work::TypeAlias,
        _ => Work::None,
    };
    match work {
        Work::None => {}
        Work::Value => {
            let ty = comp.value_type(id);
            let initializer = match &comp.symbol(id).kind {
                SymbolKind::Variable(d) => d.value.initializer,
                SymbolKind::Net(d) => d.value.initializer,
                _ => None,
            };
            if let Some(init) = initializer {
                let scope = comp.symbol(id).parent.unwrap_or(id);
                let location = LookupLocation::after(comp.symbol(id));
                let is_static_var = matches!(
                    &comp.symbol(id).kind,
                    SymbolKind::Variable(d) if d.lifetime == VariableLifetime::Static
                );
                let mut ctx = BindContext::new(scope, location).with_target(ty);
                if is_static_var {
                    ctx.flags |= BindFlags::STATIC_INITIALIZER;
                }
                let bound = expr::bind(comp, init, &ctx);
                if !bound.bad() {
                    let span = bound.span;
                    let _ = expr::convert_for_assignment(comp, ty, bound, span);
                }
            }
        }
        Work::Parameter => {
            let _ = comp.parameter_value(id);
        }
        Work::Assign(syntax) => {
            let scope = comp.symbol(id).parent.unwrap_or(id);
            let ctx = BindContext::new(scope, LookupLocation::MAX)
                .with_flags(BindFlags::NON_PROCEDURAL);
            let mut bound = Vec::with_capacity(syntax.assignments.len());
            for assign in &syntax.assignments {
                bound.push(expr::bind_assignment(
                    comp,
                    &assign.lhs,
                    &assign.rhs,
                    &ctx,
                    false,
                    DriverSource::Continuous,
                    assign.span,
                ));
            }
            if let SymbolKind::ContinuousAssign(data) = &mut comp.symbol_mut(id).kind {
                data.bound = Lazy::Resolved(bound);
            }
        }
        Work::Procedural(body, kind) => {
            let source = match kind {
                ast::ProceduralKind::Initial => DriverSource::Initial,
                ast::ProceduralKind::Final => DriverSource::Final,
                ast::ProceduralKind::Always => DriverSource::Always,
                ast::ProceduralKind::AlwaysComb => DriverSource::AlwaysComb,
                ast::ProceduralKind::AlwaysLatch => DriverSource::AlwaysLatch,
                ast::ProceduralKind::AlwaysFf => DriverSource::AlwaysFf,
            };
            let ctx = BindContext::new(id, LookupLocation::MAX);
            let bound = stmt::bind_stmt(comp, body, &ctx, source);
            if let SymbolKind::ProceduralBlock(data) = &mut comp.symbol_mut(id).kind {
                data.bound = Lazy::Resolved(bound);
            }
        }
        Work::Subroutine => {
            let _ = comp.subroutine_return_type(id);
            let _ = comp.bound_subroutine_body(id);
        }
        Work::Covergroup => coverage::resolve_covergroup(comp, id),
        Work::Clocking => resolve_clocking(comp, id),
        Work::TypeAlias => {
            let _ = comp.resolve_type_alias(id);
        }
    }
}

fn resolve_clocking(comp: &mut Compilation<'_>, clocking: SymbolId) {
    let (syntax, members) = match &comp.symbol(clocking).kind {
        SymbolKind::ClockingBlock(data) => (data.syntax, data.scope.members.clone()),
        _ => return,
    };
    // The clocking event and signal lookups happen in the parent of the
    // clocking block; clock variables cannot reference each other.
    let parent = comp.symbol(clocking).parent.unwrap_or(clocking);
    let location = LookupLocation::before(comp.symbol(clocking));
    let ctx = BindContext::new(parent, location).with_flags(BindFlags::NON_PROCEDURAL);
    let event = expr::bind(comp, &syntax.event, &ctx);
    if let SymbolKind::ClockingBlock(data) = &mut comp.symbol_mut(clocking).kind {
        data.event = Lazy::Resolved(event);
    }

    for member in members {
        let (name, direction) = match &comp.symbol(member).kind {
            SymbolKind::ClockVar(data) => match comp.symbol(member).name {
                Some(n) => (n, data.direction),
                None => continue,
            },
            _ => continue,
        };
        let target = lookup::unqualified(comp, parent, name, location, LookupFlags::empty());
        match target {
            Some(sig)
                if matches!(
                    comp.symbol(sig).kind,
                    SymbolKind::Variable(_) | SymbolKind::Net(_)
                ) =>
            {
                let ty = comp.value_type(sig);
                if let SymbolKind::ClockVar(data) = &mut comp.symbol_mut(member).kind {
                    data.ty = Lazy::Resolved(ty);
                    data.target = Some(sig);
                }
                // Output clock variables continuously drive the
                // underlying signal.
                if direction != ast::Direction::Input {
                    let span = comp.symbol(member).span;
                    let sig_expr = expr::symbol_to_expression(
                        comp,
                        sig,
                        span,
                        &ctx,
                        false,
                    );
                    if !sig_expr.bad() {
                        drivers::require_lvalue(
                            comp,
                            &sig_expr,
                            &ctx,
                            DriverKind::Other,
                            DriverSource::ClockVar,
                            true,
                            span,
                        );
                    }
                }
            }
            _ => {
                let n = comp.interner.resolve(name).to_string();
                let span = comp.symbol(member).span;
                comp.emit(errors::undeclared_identifier(&n, span, None));
                if let SymbolKind::ClockVar(data) = &mut comp.symbol_mut(member).kind {
                    data.ty = Lazy::Resolved(TypeDb::ERROR);
                }
            }
        }
    }
}

fn resolve_pending_clocking(comp: &mut Compilation<'_>) {
    // Each pending entry is handled exactly once, even though force
    // elaboration may run several times during defparam resolution.
    let pending = std::mem::take(&mut comp.pending_default_clocking);
    for (scope, decl) in &pending {
        if !comp.mark_default_processed(*scope, decl.span) {
            continue;
        }
        let found = comp
            .symbol(*scope)
            .scope()
            .and_then(|sd| sd.find(decl.name));
        match found {
            Some(sym) if matches!(comp.symbol(sym).kind, SymbolKind::ClockingBlock(_)) => {
                comp.set_default_clocking(*scope, sym, decl.span);
            }
            _ => {
                let n = comp.interner.resolve(decl.name).to_string();
                comp.emit(errors::not_a_clocking_block(&n, decl.span));
            }
        }
    }

    let pending = std::mem::take(&mut comp.pending_default_disable);
    for (scope, decl) in &pending {
        if !comp.mark_default_processed(*scope, decl.span) {
            continue;
        }
        let ctx = BindContext::new(*scope, LookupLocation::MAX);
        let bound = expr::bind(comp, &decl.expr, &ctx);
        if !bound.bad() {
            comp.set_default_disable(*scope, bound, decl.span);
        }
    }
}

/// Whole-design checks that run once, after the defparam fixed point has
/// converged.
pub fn finalize_checks(comp: &mut Compilation<'_>) {
    drivers::check_all(comp);
    check_dpi_exports(comp);
    check_unused_out_of_block(comp);
    check_unused_definitions(comp);
}

fn check_dpi_exports(comp: &mut Compilation<'_>) {
    let exports = comp.dpi_exports.clone();
    // Multiple instances of one module register the same directive; the
    // directive's span identifies it so each is checked once.
    let mut seen_directives: Vec<Span> = Vec::new();
    let mut seen: Vec<(Ident, Span)> = Vec::new();
    for (export, scope) in exports {
        if seen_directives.contains(&export.span) {
            continue;
        }
        seen_directives.push(export.span);
        let target = lookup::unqualified(
            comp,
            scope,
            export.subroutine,
            LookupLocation::MAX,
            LookupFlags::ALLOW_DECLARED_AFTER,
        );
        let is_subroutine =
            target.map_or(false, |s| matches!(comp.symbol(s).kind, SymbolKind::Subroutine(_)));
        if !is_subroutine {
            let n = comp.interner.resolve(export.subroutine).to_string();
            comp.emit(errors::dpi_export_unknown(&n, export.span));
            continue;
        }
        let c_name = export.c_name.unwrap_or(export.subroutine);
        if let Some(&(_, prev)) = seen.iter().find(|(n, _)| *n == c_name) {
            let n = comp.interner.resolve(c_name).to_string();
            comp.emit(errors::dpi_duplicate_c_name(&n, export.span, prev));
            continue;
        }
        seen.push((c_name, export.span));
    }
}

fn check_unused_out_of_block(comp: &mut Compilation<'_>) {
    let unused: Vec<(Ident, Ident, Span)> = comp
        .out_of_block
        .iter()
        .filter(|(_, decl)| !decl.used)
        .map(|((class, member, _), decl)| (*class, *member, decl.syntax.span))
        .collect();
    for (class, member, span) in unused {
        let c = comp.interner.resolve(class).to_string();
        let m = comp.interner.resolve(member).to_string();
        comp.emit(errors::unused_out_of_block(&c, &m, span));
    }
}

fn check_unused_definitions(comp: &mut Compilation<'_>) {
    if comp.options.suppress_unused || comp.options.lint_mode {
        return;
    }
    let unused: Vec<(Ident, Span)> = comp
        .definitions
        .iter()
        .filter(|def| !def.instantiated && def.scope.is_none())
        .map(|def| (def.name, def.syntax.name_span))
        .collect();
    for (name, span) in unused {
        let n = comp.interner.resolve(name).to_string();
        comp.emit(errors::unused_definition(&n, span));
    }
}
