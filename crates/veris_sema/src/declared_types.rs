//! Resolution of declared type syntax into semantic [`TypeId`]s.
//!
//! Packed dimensions and enum member values need constant evaluation, so
//! type resolution runs through the compilation like expression binding
//! does. Typedef cycles are detected through the alias symbol's lazy
//! cell.

use crate::compilation::Compilation;
use crate::errors;
use crate::expr::BindContext;
use crate::lazy::Lazy;
use crate::lookup::{self, LookupFlags, LookupLocation};
use crate::symbols::{EnumValueData, SymbolId, SymbolKind};
use crate::types::{EnumMemberType, FieldType, TypeDb, TypeId};
use veris_common::LogicVec;
use veris_source::Span;
use veris_syntax as ast;

/// Resolves a type as written in source to a [`TypeId`].
pub fn resolve_type_spec<'s>(
    comp: &mut Compilation<'s>,
    spec: &'s ast::TypeSpec,
    scope: SymbolId,
    location: LookupLocation,
) -> TypeId {
    match spec {
        ast::TypeSpec::Implicit {
            signed,
            packed_dims,
            ..
        } => {
            let base = comp.types.vector(1, *signed, true);
            apply_packed_dims(comp, base, packed_dims, scope, location)
        }
        ast::TypeSpec::Keyword {
            keyword,
            signed,
            packed_dims,
            span,
        } => {
            let base = keyword_type(comp, *keyword, *signed);
            if !packed_dims.is_empty() && !comp.types.is_integral(base) {
                comp.emit(errors::packed_dims_non_integral(*span));
                return TypeDb::ERROR;
            }
            apply_packed_dims(comp, base, packed_dims, scope, location)
        }
        ast::TypeSpec::Named { name, span } => {
            let found = lookup::unqualified(
                comp,
                scope,
                *name,
                location,
                LookupFlags::TYPE_REFERENCE | LookupFlags::ALLOW_DECLARED_AFTER,
            );
            match found {
                Some(sym) => symbol_as_type(comp, sym, *span),
                None => {
                    let n = comp.interner.resolve(*name).to_string();
                    comp.emit(errors::not_a_type(&n, *span));
                    TypeDb::ERROR
                }
            }
        }
        ast::TypeSpec::ScopedNamed {
            package,
            name,
            span,
        } => match lookup::package_member(comp, *package, *name, *span) {
            Some(sym) => symbol_as_type(comp, sym, *span),
            None => TypeDb::ERROR,
        },
        ast::TypeSpec::Enum { base, members, .. } => {
            resolve_enum(comp, base.as_deref(), members, scope, location)
        }
        ast::TypeSpec::Struct {
            packed, members, ..
        } => {
            let fields = resolve_fields(comp, members, scope, location);
            comp.types.add_struct(*packed, fields)
        }
        ast::TypeSpec::Union {
            packed,
            tagged,
            members,
            ..
        } => {
            let fields = resolve_fields(comp, members, scope, location);
            comp.types.add_union(*packed, *tagged, fields)
        }
    }
}

/// Resolves a symbol found in type position into a type, diagnosing
/// non-type symbols and typedef cycles.
pub fn symbol_as_type(comp: &mut Compilation<'_>, sym: SymbolId, span: Span) -> TypeId {
    match &comp.symbol(sym).kind {
        SymbolKind::TypeAlias(data) => match &data.ty {
            Lazy::Resolved(ty) => *ty,
            Lazy::Resolving => {
                let n = comp.symbol_name(sym);
                comp.emit(errors::typedef_cycle(&n, span));
                TypeDb::ERROR
            }
            Lazy::Unresolved => comp.resolve_type_alias(sym),
        },
        SymbolKind::Class(data) => data.ty,
        SymbolKind::Parameter(data) if data.is_type => {
            comp.type_parameter_value(sym).unwrap_or(TypeDb::ERROR)
        }
        _ => {
            let n = comp.symbol_name(sym);
            comp.emit(errors::not_a_type(&n, span));
            TypeDb::ERROR
        }
    }
}

fn keyword_type(comp: &mut Compilation<'_>, keyword: ast::TypeKeyword, signed: Option<bool>) -> TypeId {
    use ast::TypeKeyword as K;
    let base = match keyword {
        K::Bit => TypeDb::BIT,
        K::Logic => TypeDb::LOGIC,
        K::Reg => TypeDb::REG,
        K::Byte => TypeDb::BYTE,
        K::ShortInt => TypeDb::SHORT_INT,
        K::Int => TypeDb::INT,
        K::LongInt => TypeDb::LONG_INT,
        K::Integer => TypeDb::INTEGER,
        K::Time => TypeDb::TIME,
        K::Real => TypeDb::REAL,
        K::Shortreal => TypeDb::SHORTREAL,
        K::String => TypeDb::STRING,
        K::Void => TypeDb::VOID,
        K::Chandle => TypeDb::CHANDLE,
        K::Event => TypeDb::EVENT,
    };
    match signed {
        Some(want) if comp.types.is_integral(base) && comp.types.is_signed(base) != want => {
            let width = comp.types.bit_width(base).unwrap_or(1);
            let four_state = comp.types.is_four_state(base);
            comp.types.vector(width, want, four_state)
        }
        _ => base,
    }
}

fn apply_packed_dims<'s>(
    comp: &mut Compilation<'s>,
    base: TypeId,
    dims: &'s [ast::Dimension],
    scope: SymbolId,
    location: LookupLocation,
) -> TypeId {
    let mut ty = base;
    let ctx = BindContext::new(scope, location);
    // Packed dimensions multiply out to one flat vector; the innermost
    // dimension is written last.
    for dim in dims.iter().rev() {
        let ast::Dimension::Range { left, right, span } = dim else {
            comp.emit(errors::packed_dims_non_integral(dim_span(dim)));
            return TypeDb::ERROR;
        };
        let l = comp.eval_const_int_syntax(left, &ctx);
        let r = comp.eval_const_int_syntax(right, &ctx);
        let (Some(l), Some(r)) = (l, r) else {
            return TypeDb::ERROR;
        };
        let dim_width = (l - r).unsigned_abs() as u32 + 1;
        let inner_width = match comp.types.bit_width(ty) {
            Some(w) => w,
            None => {
                comp.emit(errors::packed_dims_non_integral(*span));
                return TypeDb::ERROR;
            }
        };
        let signed = comp.types.is_signed(ty);
        let four_state = comp.types.is_four_state(ty);
        ty = comp.types.vector(inner_width * dim_width, signed, four_state);
    }
    ty
}

/// Applies unpacked dimensions (fixed, dynamic, associative, queue) to
/// an element type, outermost dimension first.
pub fn apply_unpacked_dims<'s>(
    comp: &mut Compilation<'s>,
    element: TypeId,
    dims: &'s [ast::Dimension],
    scope: SymbolId,
    location: LookupLocation,
) -> TypeId {
    let ctx = BindContext::new(scope, location);
    let mut ty = element;
    for dim in dims.iter().rev() {
        ty = match dim {
            ast::Dimension::Range { left, right, .. } => {
                let l = comp.eval_const_int_syntax(left, &ctx);
                let r = comp.eval_const_int_syntax(right, &ctx);
                let (Some(l), Some(r)) = (l, r) else {
                    return TypeDb::ERROR;
                };
                comp.types.fixed_array(ty, l, r)
            }
            ast::Dimension::Dynamic { .. } => comp.types.dynamic_array(ty),
            ast::Dimension::Associative { index, .. } => {
                let index_ty = resolve_type_spec(comp, index, scope, location);
                comp.types.associative_array(ty, index_ty)
            }
            ast::Dimension::Queue { bound, .. } => {
                let bound_val = match bound {
                    Some(b) => match comp.eval_const_int_syntax(b, &ctx) {
                        Some(v) if v >= 0 => Some(v as u32),
                        _ => return TypeDb::ERROR,
                    },
                    None => None,
                };
                comp.types.queue(ty, bound_val)
            }
        };
    }
    ty
}

fn resolve_enum<'s>(
    comp: &mut Compilation<'s>,
    base: Option<&'s ast::TypeSpec>,
    members: &'s [ast::EnumMember],
    scope: SymbolId,
    location: LookupLocation,
) -> TypeId {
    let base_ty = match base {
        Some(spec) => {
            let t = resolve_type_spec(comp, spec, scope, location);
            if !comp.types.is_integral(t) && !comp.types.is_error(t) {
                comp.emit(errors::packed_dims_non_integral(spec.span()));
                return TypeDb::ERROR;
            }
            t
        }
        None => TypeDb::INT,
    };
    let width = comp.types.bit_width(base_ty).unwrap_or(32);
    let signed = comp.types.is_signed(base_ty);
    let ctx = BindContext::new(scope, location);

    let mut member_types = Vec::with_capacity(members.len());
    let mut seen_values: Vec<LogicVec> = Vec::new();
    let mut next = LogicVec::from_u64(0, width).as_signed(signed);
    for member in members {
        let value = match &member.value {
            Some(expr) => match comp.eval_const_int_syntax(expr, &ctx) {
                Some(v) => LogicVec::from_i64(v, width).as_signed(signed),
                None => return TypeDb::ERROR,
            },
            None => next.clone(),
        };
        if seen_values.iter().any(|v| v.case_eq(&value)) {
            let n = comp.interner.resolve(member.name).to_string();
            comp.emit(errors::enum_value_duplicate(&n, member.span));
        }
        seen_values.push(value.clone());
        next = value.add(&LogicVec::from_u64(1, width)).as_signed(signed);
        member_types.push(EnumMemberType {
            name: member.name,
            value,
        });
    }

    // The enum's name comes from a wrapping typedef when present; an
    // anonymous enum takes the first member's name for display.
    let display_name = members
        .first()
        .map(|m| m.name)
        .unwrap_or_else(|| comp.interner.get_or_intern(""));
    let enum_ty = comp.types.add_enum(display_name, base_ty, member_types.clone());

    // Enum members become value symbols in the enclosing scope.
    for (member, mt) in members.iter().zip(member_types) {
        comp.add_symbol_to_scope(
            scope,
            Some(member.name),
            member.span,
            SymbolKind::EnumValue(EnumValueData {
                ty: enum_ty,
                value: crate::const_value::ConstantValue::Int(mt.value),
            }),
        );
    }
    enum_ty
}

fn resolve_fields<'s>(
    comp: &mut Compilation<'s>,
    members: &'s [ast::StructMember],
    scope: SymbolId,
    location: LookupLocation,
) -> Vec<FieldType> {
    members
        .iter()
        .map(|m| FieldType {
            name: m.name,
            ty: resolve_type_spec(comp, &m.ty, scope, location),
        })
        .collect()
}

fn dim_span(dim: &ast::Dimension) -> Span {
    match dim {
        ast::Dimension::Range { span, .. }
        | ast::Dimension::Dynamic { span }
        | ast::Dimension::Associative { span, .. }
        | ast::Dimension::Queue { span, .. } => *span,
    }
}
