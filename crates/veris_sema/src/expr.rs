//! The expression binder: construction of typed expression trees from
//! syntax.
//!
//! Binding follows a three-phase pattern per syntax kind: construct the
//! children, check contracts and types (emitting diagnostics and
//! substituting [`Expression::invalid`] on failure), then set the final
//! result type and source range. Invalid expressions propagate: any
//! expression with an invalid child is itself `bad()`, which keeps one
//! design error from producing a cascade.

use crate::assertions::{self, AssertionInstance};
use crate::compilation::Compilation;
use crate::declared_types;
use crate::drivers::{self, DriverKind, DriverSource};
use crate::errors;
use crate::lookup::{self, LookupFlags, LookupLocation};
use crate::options::MinTypMax;
use crate::symbols::{SymbolId, SymbolKind, VariableLifetime};
use crate::types::{TypeDb, TypeId, TypeKind};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use veris_common::{Ident, Logic, LogicVec};
use veris_source::Span;
use veris_syntax as ast;

bitflags! {
    /// Contextual modifiers threaded through expression binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BindFlags: u32 {
        /// Binding outside any procedural context (continuous assigns,
        /// port connections): automatic variables may not be referenced
        /// and assignments follow net rules.
        const NON_PROCEDURAL = 1 << 0;
        /// Binding a static initializer: automatic variables may not be
        /// referenced.
        const STATIC_INITIALIZER = 1 << 1;
        /// The expression is an assignment target; a driver is recorded.
        const LVALUE = 1 << 2;
        /// Binding inside an assertion expression: chandles are
        /// forbidden, sequence/property contexts are allowed.
        const ASSERTION_EXPR = 1 << 3;
        /// Binding an event expression argument; local assertion
        /// variables may not be referenced.
        const EVENT_EXPRESSION = 1 << 4;
        /// Clocking block references are allowed here.
        const ALLOW_CLOCKING_BLOCK = 1 << 5;
        /// Coverpoint references are allowed here.
        const ALLOW_COVERPOINT = 1 << 6;
        /// The unbounded literal `$` is allowed here.
        const ALLOW_UNBOUNDED_LITERAL = 1 << 7;
        /// Type references are allowed in expression position.
        const ALLOW_TYPE_REFERENCES = 1 << 8;
        /// A data type is an acceptable result (parameter actuals).
        const ALLOW_DATA_TYPE = 1 << 9;
        /// Binding the actual of a recursive property instance.
        const RECURSIVE_PROPERTY_ARG = 1 << 10;
        /// A time-advancing operator has been seen on this path, so a
        /// recursive property reference is in a legal position.
        const PROPERTY_TIME_ADVANCE = 1 << 11;
        /// A negation encloses this path, which makes recursive
        /// property references illegal.
        const PROPERTY_NEGATION = 1 << 12;
        /// Assertion formals referenced here must be int, shortint, or
        /// longint.
        const ASSERTION_DELAY_OR_REPETITION = 1 << 13;
        /// Bind but never evaluate (unselected min:typ:max branches).
        const UNEVALUATED_BRANCH = 1 << 14;
    }
}

/// The context an expression is bound in: where, bounded by what lookup
/// location, under which flags, and (for assignment-like positions) the
/// target type.
#[derive(Debug, Clone, Copy)]
pub struct BindContext {
    /// The scope names resolve in.
    pub scope: SymbolId,
    /// Visibility bound for name lookup.
    pub location: LookupLocation,
    /// Contextual flags.
    pub flags: BindFlags,
    /// The assignment target type, when binding a right-hand side.
    pub target_type: Option<TypeId>,
    /// The enclosing subroutine, when binding inside one.
    pub subroutine: Option<SymbolId>,
}

impl BindContext {
    /// Creates a context with no flags.
    pub fn new(scope: SymbolId, location: LookupLocation) -> Self {
        Self {
            scope,
            location,
            flags: BindFlags::empty(),
            target_type: None,
            subroutine: None,
        }
    }

    /// Returns a copy with additional flags set.
    pub fn with_flags(mut self, flags: BindFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Returns a copy with the assignment target type set.
    pub fn with_target(mut self, ty: TypeId) -> Self {
        self.target_type = Some(ty);
        self
    }
}

/// A unary operator after binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `~`
    BitNot,
    /// `!`
    LogicNot,
    /// `&`
    RedAnd,
    /// `|`
    RedOr,
    /// `^`
    RedXor,
}

/// A binary operator after binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `===`
    CaseEq,
    /// `!==`
    CaseNe,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    LogicAnd,
    /// `||`
    LogicOr,
}

/// One bound item of a dist expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundDistItem {
    /// The low value (or single value).
    pub low: Expression,
    /// The high value for ranges.
    pub high: Option<Expression>,
    /// The weight expression, if given.
    pub weight: Option<Expression>,
    /// `true` for `:/` (per-range) weights.
    pub per_range: bool,
}

/// The kind-specific payload of a bound expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// A placeholder for a binding failure; poisons every parent.
    Invalid,
    /// An integral literal.
    IntegerLiteral(LogicVec),
    /// A real literal.
    RealLiteral(f64),
    /// A string literal.
    StringLiteral(String),
    /// The unbounded literal `$`.
    UnboundedLiteral,
    /// A reference to a symbol found by simple name lookup.
    NamedValue(SymbolId),
    /// A reference to a symbol found through a hierarchical path.
    HierarchicalValue(SymbolId),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOperator,
        /// The operand.
        operand: Box<Expression>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOperator,
        /// The left operand.
        left: Box<Expression>,
        /// The right operand.
        right: Box<Expression>,
    },
    /// A conditional expression.
    Conditional {
        /// The condition.
        cond: Box<Expression>,
        /// The true branch.
        left: Box<Expression>,
        /// The false branch.
        right: Box<Expression>,
    },
    /// A concatenation.
    Concat(Vec<Expression>),
    /// A replication.
    Replication {
        /// The evaluated replication count.
        count: u32,
        /// The replicated expression.
        inner: Box<Expression>,
    },
    /// An element select.
    ElementSelect {
        /// The selected value.
        value: Box<Expression>,
        /// The index.
        index: Box<Expression>,
    },
    /// A range select.
    RangeSelect {
        /// The selected value.
        value: Box<Expression>,
        /// The left bound or base.
        left: Box<Expression>,
        /// The right bound or width.
        right: Box<Expression>,
        /// The select mode.
        mode: ast::RangeSelectMode,
    },
    /// A struct/union member access.
    MemberAccess {
        /// The accessed value.
        value: Box<Expression>,
        /// The member name.
        member: Ident,
        /// The member's declaration index in its type.
        field_index: u32,
    },
    /// An implicit or explicit conversion; the target type is the
    /// expression's own type.
    Conversion {
        /// The converted operand.
        operand: Box<Expression>,
    },
    /// A subroutine call.
    Call {
        /// The called subroutine.
        subroutine: SymbolId,
        /// The bound actuals, one per formal in declaration order.
        args: Vec<Expression>,
    },
    /// A system function call.
    SystemCall {
        /// The function name (including the `$`).
        name: Ident,
        /// The bound arguments.
        args: Vec<Expression>,
    },
    /// An assignment (procedural or continuous).
    Assignment {
        /// The target.
        lhs: Box<Expression>,
        /// The driven value.
        rhs: Box<Expression>,
        /// `true` for non-blocking assignments.
        non_blocking: bool,
    },
    /// A min:typ:max triplet; only the selected branch is live.
    MinTypMax {
        /// The minimum branch.
        min: Box<Expression>,
        /// The typical branch.
        typ: Box<Expression>,
        /// The maximum branch.
        max: Box<Expression>,
        /// Which branch this compilation selected.
        selected: MinTypMax,
    },
    /// A dist expression.
    Dist {
        /// The constrained value.
        value: Box<Expression>,
        /// The weighted items.
        items: Vec<BoundDistItem>,
    },
    /// A tagged union value.
    TaggedUnion {
        /// The active member's declaration index.
        member_index: u32,
        /// The member value, absent only for void members.
        value: Option<Box<Expression>>,
    },
    /// An instance of a sequence, property, or let declaration.
    AssertionInstance(AssertionInstance),
    /// A clocking event (`posedge clk`).
    ClockingEvent {
        /// The edge specifier.
        edge: ast::EdgeKind,
        /// The signal operand.
        operand: Box<Expression>,
    },
    /// A type in expression position.
    TypeReference(TypeId),
}

/// A bound, typed, immutable expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    /// The kind-specific payload.
    pub kind: ExpressionKind,
    /// The result type.
    pub ty: TypeId,
    /// The source range this expression came from.
    pub span: Span,
}

impl Expression {
    /// Creates the invalid placeholder expression.
    pub fn invalid(span: Span) -> Self {
        Self {
            kind: ExpressionKind::Invalid,
            ty: TypeDb::ERROR,
            span,
        }
    }

    /// Returns `true` if this expression or any child failed to bind.
    pub fn bad(&self) -> bool {
        matches!(self.kind, ExpressionKind::Invalid) || self.ty == TypeDb::ERROR
    }

    /// Returns the referenced symbol for named and hierarchical values.
    pub fn symbol_ref(&self) -> Option<SymbolId> {
        match self.kind {
            ExpressionKind::NamedValue(s) | ExpressionKind::HierarchicalValue(s) => Some(s),
            _ => None,
        }
    }
}

/// Binds an expression from syntax in the given context.
pub fn bind<'s>(
    comp: &mut Compilation<'s>,
    syntax: &'s ast::Expr,
    ctx: &BindContext,
) -> Expression {
    let span = syntax.span();
    match syntax {
        ast::Expr::Number { text, span } => bind_integer_literal(comp, text, *span),
        ast::Expr::RealLit { value, span } => Expression {
            kind: ExpressionKind::RealLiteral(*value),
            ty: TypeDb::REAL,
            span: *span,
        },
        ast::Expr::StringLit { value, span } => Expression {
            kind: ExpressionKind::StringLiteral(value.clone()),
            ty: TypeDb::STRING,
            span: *span,
        },
        ast::Expr::Unbounded { span } => {
            if ctx.flags.contains(BindFlags::ALLOW_UNBOUNDED_LITERAL) {
                Expression {
                    kind: ExpressionKind::UnboundedLiteral,
                    ty: TypeDb::UNBOUNDED,
                    span: *span,
                }
            } else {
                comp.emit(errors::unbounded_not_allowed(*span));
                Expression::invalid(*span)
            }
        }
        ast::Expr::Ident { name, span } => bind_name(comp, *name, *span, ctx),
        ast::Expr::Scoped {
            package,
            name,
            span,
        } => match lookup::package_member(comp, *package, *name, *span) {
            Some(sym) => symbol_to_expression(comp, sym, *span, ctx, false),
            None => Expression::invalid(*span),
        },
        ast::Expr::Hierarchical { parts, span } => {
            match lookup::hierarchical(comp, ctx.scope, parts, *span, LookupFlags::empty()) {
                Some(sym) => symbol_to_expression(comp, sym, *span, ctx, true),
                None => Expression::invalid(*span),
            }
        }
        ast::Expr::Unary { op, operand, .. } => bind_unary(comp, *op, operand, span, ctx),
        ast::Expr::Binary {
            op, left, right, ..
        } => bind_binary(comp, *op, left, right, span, ctx),
        ast::Expr::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => {
            let cond = bind(comp, cond, &ctx.without_target());
            let left = bind(comp, then_expr, ctx);
            let right = bind(comp, else_expr, ctx);
            if cond.bad() || left.bad() || right.bad() {
                return Expression::invalid(span);
            }
            let ty = common_type(comp, left.ty, right.ty);
            Expression {
                kind: ExpressionKind::Conditional {
                    cond: Box::new(cond),
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ty,
                span,
            }
        }
        ast::Expr::Concat { elements, .. } => bind_concat(comp, elements, span, ctx),
        ast::Expr::Replication { count, inner, .. } => {
            let inner_bound = bind(comp, inner, &ctx.without_target());
            let Some(n) = comp.eval_const_int_syntax(count, ctx) else {
                return Expression::invalid(span);
            };
            if inner_bound.bad() || n < 0 {
                if n < 0 {
                    comp.emit(errors::select_out_of_range(count.span()));
                }
                return Expression::invalid(span);
            }
            let inner_width = comp.types.bit_width(inner_bound.ty).unwrap_or(1);
            let ty = comp
                .types
                .vector(inner_width * n as u32, false, comp.types.is_four_state(inner_bound.ty));
            Expression {
                kind: ExpressionKind::Replication {
                    count: n as u32,
                    inner: Box::new(inner_bound),
                },
                ty,
                span,
            }
        }
        ast::Expr::Index { value, index, .. } => bind_element_select(comp, value, index, span, ctx),
        ast::Expr::RangeSel {
            value,
            left,
            right,
            mode,
            ..
        } => bind_range_select(comp, value, left, right, *mode, span, ctx),
        ast::Expr::Member { value, name, .. } => bind_member_access(comp, value, *name, span, ctx),
        ast::Expr::Call { target, args, .. } => bind_call(comp, target, args, span, ctx),
        ast::Expr::MinTypMax { min, typ, max, .. } => {
            let selected = comp.options.min_typ_max;
            let unevaluated = ctx.with_flags(BindFlags::UNEVALUATED_BRANCH);
            let pick = |live: bool| if live { *ctx } else { unevaluated };
            let min = bind(comp, min, &pick(selected == MinTypMax::Min));
            let typ = bind(comp, typ, &pick(selected == MinTypMax::Typ));
            let max = bind(comp, max, &pick(selected == MinTypMax::Max));
            let chosen = match selected {
                MinTypMax::Min => &min,
                MinTypMax::Typ => &typ,
                MinTypMax::Max => &max,
            };
            if chosen.bad() {
                return Expression::invalid(span);
            }
            let ty = chosen.ty;
            Expression {
                kind: ExpressionKind::MinTypMax {
                    min: Box::new(min),
                    typ: Box::new(typ),
                    max: Box::new(max),
                    selected,
                },
                ty,
                span,
            }
        }
        ast::Expr::Dist { value, items, .. } => bind_dist(comp, value, items, span, ctx),
        ast::Expr::TaggedUnion { member, value, .. } => {
            bind_tagged_union(comp, *member, value.as_deref(), span, ctx)
        }
        ast::Expr::Cast { ty, operand, .. } => {
            let target = declared_types::resolve_type_spec(comp, ty, ctx.scope, ctx.location);
            let operand = bind(comp, operand, &ctx.without_target());
            if operand.bad() || comp.types.is_error(target) {
                return Expression::invalid(span);
            }
            if !comp.types.cast_compatible(target, operand.ty) {
                let t = comp.types.display(target, comp.interner);
                let s = comp.types.display(operand.ty, comp.interner);
                comp.emit(errors::bad_cast(&t, &s, span));
                return Expression::invalid(span);
            }
            Expression {
                kind: ExpressionKind::Conversion {
                    operand: Box::new(operand),
                },
                ty: target,
                span,
            }
        }
        ast::Expr::TypeRef { ty, span } => {
            if ctx
                .flags
                .intersects(BindFlags::ALLOW_TYPE_REFERENCES | BindFlags::ALLOW_DATA_TYPE)
            {
                let resolved = declared_types::resolve_type_spec(comp, ty, ctx.scope, ctx.location);
                Expression {
                    kind: ExpressionKind::TypeReference(resolved),
                    ty: TypeDb::TYPE_REF,
                    span: *span,
                }
            } else {
                comp.emit(errors::type_ref_not_allowed(*span));
                Expression::invalid(*span)
            }
        }
        ast::Expr::EventExpr { edge, expr, span } => {
            let inner_ctx = ctx.with_flags(BindFlags::EVENT_EXPRESSION);
            let operand = bind(comp, expr, &inner_ctx.without_target());
            if operand.bad() {
                return Expression::invalid(*span);
            }
            Expression {
                kind: ExpressionKind::ClockingEvent {
                    edge: *edge,
                    operand: Box::new(operand),
                },
                ty: TypeDb::VOID,
                span: *span,
            }
        }
        ast::Expr::Paren { inner, .. } => bind(comp, inner, ctx),
        ast::Expr::Error(span) => Expression::invalid(*span),
    }
}

impl BindContext {
    /// Returns a copy with the assignment target type cleared, for
    /// binding children that are not in assignment position.
    pub fn without_target(&self) -> Self {
        Self {
            target_type: None,
            ..*self
        }
    }
}

/// Binds an assignment, recording a driver on the target.
pub fn bind_assignment<'s>(
    comp: &mut Compilation<'s>,
    lhs: &'s ast::Expr,
    rhs: &'s ast::Expr,
    ctx: &BindContext,
    non_blocking: bool,
    source: DriverSource,
    span: Span,
) -> Expression {
    let lvalue_ctx = ctx.with_flags(BindFlags::LVALUE);
    let lhs_bound = bind(comp, lhs, &lvalue_ctx.without_target());
    if lhs_bound.bad() {
        // Still bind the right side for its diagnostics.
        let _ = bind(comp, rhs, &ctx.without_target());
        return Expression::invalid(span);
    }
    let kind = if ctx.flags.contains(BindFlags::NON_PROCEDURAL) {
        DriverKind::Continuous
    } else {
        DriverKind::Procedural
    };
    drivers::require_lvalue(comp, &lhs_bound, ctx, kind, source, non_blocking, span);

    let rhs_ctx = ctx.with_target(lhs_bound.ty);
    let rhs_bound = bind(comp, rhs, &rhs_ctx);
    if rhs_bound.bad() {
        return Expression::invalid(span);
    }
    let rhs_final = convert_for_assignment(comp, lhs_bound.ty, rhs_bound, span);
    if rhs_final.bad() {
        return Expression::invalid(span);
    }
    let ty = lhs_bound.ty;
    Expression {
        kind: ExpressionKind::Assignment {
            lhs: Box::new(lhs_bound),
            rhs: Box::new(rhs_final),
            non_blocking,
        },
        ty,
        span,
    }
}

/// Checks assignment compatibility and wraps the source in a conversion
/// node when the types differ. Emits `E306` on incompatibility and
/// `W303` on integral truncation.
pub fn convert_for_assignment(
    comp: &mut Compilation<'_>,
    target: TypeId,
    source: Expression,
    span: Span,
) -> Expression {
    if comp.types.is_error(target) || source.bad() {
        return source;
    }
    let compatible = comp.types.assignment_compatible(target, source.ty)
        || (comp.options.relax_enum_conversions
            && matches!(
                comp.types.get(comp.types.canonical(target)),
                TypeKind::Enum { .. }
            )
            && comp.types.is_integral(source.ty));
    if !compatible {
        let t = comp.types.display(target, comp.interner);
        let s = comp.types.display(source.ty, comp.interner);
        comp.emit(errors::type_mismatch(&t, &s, span));
        return Expression::invalid(span);
    }
    if comp.types.equivalent(target, source.ty) {
        return source;
    }
    if let (Some(tw), Some(sw)) = (comp.types.bit_width(target), comp.types.bit_width(source.ty)) {
        if tw < sw {
            comp.emit(errors::implicit_truncation(tw, sw, span));
        }
    }
    let span = source.span;
    Expression {
        kind: ExpressionKind::Conversion {
            operand: Box::new(source),
        },
        ty: target,
        span,
    }
}

fn bind_name(comp: &mut Compilation<'_>, name: Ident, span: Span, ctx: &BindContext) -> Expression {
    // Inside an assertion expansion, formals rebind to the actual
    // captured at the instantiation site.
    if let Some(expr) = assertions::try_expand_formal(comp, name, ctx) {
        return expr;
    }
    match lookup::unqualified_or_error(
        comp,
        ctx.scope,
        name,
        ctx.location,
        LookupFlags::empty(),
        span,
    ) {
        Some(sym) => symbol_to_expression(comp, sym, span, ctx, false),
        None => Expression::invalid(span),
    }
}

/// Lowers a resolved symbol into a value expression, enforcing the
/// contextual reference rules.
pub fn symbol_to_expression(
    comp: &mut Compilation<'_>,
    sym: SymbolId,
    span: Span,
    ctx: &BindContext,
    hierarchical: bool,
) -> Expression {
    let name = comp.symbol_name(sym);
    let kind_name = comp.symbol(sym).kind_name();
    let ty = match &comp.symbol(sym).kind {
        SymbolKind::Parameter(data) => {
            if data.is_type {
                match comp.type_parameter_value(sym) {
                    Some(t) => {
                        return Expression {
                            kind: ExpressionKind::TypeReference(t),
                            ty: TypeDb::TYPE_REF,
                            span,
                        }
                    }
                    None => return Expression::invalid(span),
                }
            }
            comp.parameter_type(sym)
        }
        SymbolKind::EnumValue(data) => data.ty,
        SymbolKind::Variable(data) => {
            let lifetime = data.lifetime;
            if lifetime == VariableLifetime::Automatic
                && ctx
                    .flags
                    .intersects(BindFlags::NON_PROCEDURAL | BindFlags::STATIC_INITIALIZER)
            {
                comp.emit(errors::automatic_ref_not_allowed(&name, span));
                return Expression::invalid(span);
            }
            comp.value_type(sym)
        }
        SymbolKind::Net(_) => comp.value_type(sym),
        SymbolKind::FormalArgument(_) | SymbolKind::AssertionPort(_) => {
            let ty = comp.value_type(sym);
            if ctx.flags.contains(BindFlags::ASSERTION_DELAY_OR_REPETITION)
                && ![TypeDb::INT, TypeDb::SHORT_INT, TypeDb::LONG_INT]
                    .iter()
                    .any(|&t| comp.types.equivalent(ty, t))
            {
                comp.emit(errors::assertion_formal_bad_type(&name, span));
                return Expression::invalid(span);
            }
            ty
        }
        SymbolKind::LocalAssertionVar(_) => {
            if ctx.flags.contains(BindFlags::EVENT_EXPRESSION) {
                comp.emit(errors::automatic_ref_not_allowed(&name, span));
                return Expression::invalid(span);
            }
            comp.value_type(sym)
        }
        SymbolKind::Specparam(_) => TypeDb::INT,
        SymbolKind::Genvar(_) => TypeDb::INT,
        SymbolKind::ClockVar(data) => data.ty.get().copied().unwrap_or(TypeDb::ERROR),
        SymbolKind::Coverpoint(_) => {
            if !ctx.flags.contains(BindFlags::ALLOW_COVERPOINT) {
                comp.emit(errors::not_a_value(&name, kind_name, span));
                return Expression::invalid(span);
            }
            TypeDb::INT
        }
        SymbolKind::ClockingBlock(_) => {
            if !ctx.flags.contains(BindFlags::ALLOW_CLOCKING_BLOCK) {
                comp.emit(errors::not_a_value(&name, kind_name, span));
                return Expression::invalid(span);
            }
            TypeDb::VOID
        }
        SymbolKind::Sequence(_) | SymbolKind::Property(_) | SymbolKind::Let(_) => {
            // A bare reference is an instantiation with no arguments.
            return assertions::bind_instance(comp, sym, &[], span, ctx);
        }
        _ => {
            comp.emit(errors::not_a_value(&name, kind_name, span));
            return Expression::invalid(span);
        }
    };
    if ctx.flags.contains(BindFlags::ASSERTION_EXPR)
        && comp.types.canonical(ty) == TypeDb::CHANDLE
    {
        comp.emit(errors::chandle_in_assertion(span));
        return Expression::invalid(span);
    }
    let kind = if hierarchical {
        ExpressionKind::HierarchicalValue(sym)
    } else {
        ExpressionKind::NamedValue(sym)
    };
    Expression { kind, ty, span }
}

fn bind_integer_literal(comp: &mut Compilation<'_>, text: &str, span: Span) -> Expression {
    match parse_integer_literal(text) {
        Some(value) => {
            let ty = comp
                .types
                .vector(value.width(), value.is_signed(), value.has_unknown() || text.contains('\''));
            Expression {
                kind: ExpressionKind::IntegerLiteral(value),
                ty,
                span,
            }
        }
        None => {
            comp.emit(errors::bad_generate_loop("invalid integer literal", span));
            Expression::invalid(span)
        }
    }
}

/// Parses an integer literal from its source text into a four-state
/// value.
///
/// Handles plain decimal (`42`), sized and unsized based literals
/// (`4'b10x0`, `'hFF`), the signed marker (`8'sh7F`), underscore
/// separators, and X/Z/? digits.
pub fn parse_integer_literal(text: &str) -> Option<LogicVec> {
    let text: String = text.chars().filter(|&c| c != '_').collect();
    let Some(tick) = text.find('\'') else {
        // Plain decimal literals are 32-bit signed integers.
        let v: i64 = text.parse().ok()?;
        return Some(LogicVec::from_i64(v, 32));
    };

    let width: Option<u32> = if tick == 0 {
        None
    } else {
        Some(text[..tick].parse().ok()?)
    };
    let mut rest = &text[tick + 1..];
    let signed = rest.starts_with(['s', 'S']);
    if signed {
        rest = &rest[1..];
    }
    let (base_char, digits) = {
        let mut chars = rest.chars();
        (chars.next()?, chars.as_str())
    };
    if digits.is_empty() {
        return None;
    }

    let bits_per_digit = match base_char {
        'b' | 'B' => 1,
        'o' | 'O' => 3,
        'h' | 'H' => 4,
        'd' | 'D' => {
            // Decimal based literals: a plain number, or a lone x/z.
            let width = width.unwrap_or(32);
            if let Some(state) = Logic::from_char(digits.chars().next()?) {
                if state.is_unknown() {
                    if digits.len() != 1 {
                        return None;
                    }
                    return Some(LogicVec::filled(width, state).as_signed(signed));
                }
            }
            let v: u64 = digits.parse().ok()?;
            return Some(LogicVec::from_u64(v, width).as_signed(signed));
        }
        _ => return None,
    };

    let natural_width = (digits.len() as u32) * bits_per_digit;
    let width = width.unwrap_or(natural_width.max(1));
    let mut out = LogicVec::zero(width).as_signed(signed);
    let mut bit = 0u32;
    for c in digits.chars().rev() {
        let states: Vec<Logic> = if let Some(state) = Logic::from_char(c) {
            if state.is_unknown() {
                vec![state; bits_per_digit as usize]
            } else {
                let v = c.to_digit(2)?;
                digit_bits(v, bits_per_digit)
            }
        } else {
            let v = c.to_digit(16)?;
            if v >= (1 << bits_per_digit) {
                return None;
            }
            digit_bits(v, bits_per_digit)
        };
        for state in states {
            if bit < width {
                out.set(bit, state);
            }
            bit += 1;
        }
    }
    Some(out)
}

fn digit_bits(value: u32, count: u32) -> Vec<Logic> {
    (0..count)
        .map(|i| {
            if (value >> i) & 1 != 0 {
                Logic::One
            } else {
                Logic::Zero
            }
        })
        .collect()
}

fn map_unary(op: ast::UnaryOp) -> UnaryOperator {
    match op {
        ast::UnaryOp::Plus => UnaryOperator::Plus,
        ast::UnaryOp::Minus => UnaryOperator::Minus,
        ast::UnaryOp::Not => UnaryOperator::BitNot,
        ast::UnaryOp::LogicNot => UnaryOperator::LogicNot,
        ast::UnaryOp::RedAnd => UnaryOperator::RedAnd,
        ast::UnaryOp::RedOr => UnaryOperator::RedOr,
        ast::UnaryOp::RedXor => UnaryOperator::RedXor,
    }
}

fn map_binary(op: ast::BinaryOp) -> BinaryOperator {
    use ast::BinaryOp as B;
    match op {
        B::Add => BinaryOperator::Add,
        B::Sub => BinaryOperator::Sub,
        B::Mul => BinaryOperator::Mul,
        B::Div => BinaryOperator::Div,
        B::Mod => BinaryOperator::Mod,
        B::Pow => BinaryOperator::Pow,
        B::And => BinaryOperator::And,
        B::Or => BinaryOperator::Or,
        B::Xor => BinaryOperator::Xor,
        B::Shl => BinaryOperator::Shl,
        B::Shr => BinaryOperator::Shr,
        B::Eq => BinaryOperator::Eq,
        B::Ne => BinaryOperator::Ne,
        B::CaseEq => BinaryOperator::CaseEq,
        B::CaseNe => BinaryOperator::CaseNe,
        B::Lt => BinaryOperator::Lt,
        B::Le => BinaryOperator::Le,
        B::Gt => BinaryOperator::Gt,
        B::Ge => BinaryOperator::Ge,
        B::LogicAnd => BinaryOperator::LogicAnd,
        B::LogicOr => BinaryOperator::LogicOr,
    }
}

fn bind_unary<'s>(
    comp: &mut Compilation<'s>,
    op: ast::UnaryOp,
    operand: &'s ast::Expr,
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let operand = bind(comp, operand, &ctx.without_target());
    if operand.bad() {
        return Expression::invalid(span);
    }
    let op = map_unary(op);
    let four_state = comp.types.is_four_state(operand.ty);
    let ty = match op {
        UnaryOperator::Plus | UnaryOperator::Minus | UnaryOperator::BitNot => {
            if comp.types.is_floating(operand.ty) && op != UnaryOperator::BitNot {
                operand.ty
            } else if comp.types.is_integral(operand.ty) {
                operand.ty
            } else {
                let t = comp.types.display(operand.ty, comp.interner);
                comp.emit(errors::type_mismatch("an integral type", &t, span));
                return Expression::invalid(span);
            }
        }
        UnaryOperator::LogicNot => comp.types.vector(1, false, four_state),
        UnaryOperator::RedAnd | UnaryOperator::RedOr | UnaryOperator::RedXor => {
            if !comp.types.is_integral(operand.ty) {
                let t = comp.types.display(operand.ty, comp.interner);
                comp.emit(errors::type_mismatch("an integral type", &t, span));
                return Expression::invalid(span);
            }
            comp.types.vector(1, false, four_state)
        }
    };
    Expression {
        kind: ExpressionKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
        span,
    }
}

fn bind_binary<'s>(
    comp: &mut Compilation<'s>,
    op: ast::BinaryOp,
    left: &'s ast::Expr,
    right: &'s ast::Expr,
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let inner = ctx.without_target();
    let left = bind(comp, left, &inner);
    let right = bind(comp, right, &inner);
    if left.bad() || right.bad() {
        return Expression::invalid(span);
    }
    let op = map_binary(op);
    let four_state = comp.types.is_four_state(left.ty) || comp.types.is_four_state(right.ty);
    use BinaryOperator::*;
    let ty = match op {
        Add | Sub | Mul | Div | Mod | Pow | And | Or | Xor => {
            if comp.types.is_floating(left.ty) || comp.types.is_floating(right.ty) {
                TypeDb::REAL
            } else if comp.types.is_integral(left.ty) && comp.types.is_integral(right.ty) {
                common_type(comp, left.ty, right.ty)
            } else {
                let t = comp.types.display(left.ty, comp.interner);
                comp.emit(errors::type_mismatch("a numeric type", &t, span));
                return Expression::invalid(span);
            }
        }
        Shl | Shr => left.ty,
        Eq | Ne | Lt | Le | Gt | Ge => comp.types.vector(1, false, four_state),
        CaseEq | CaseNe | LogicAnd | LogicOr => TypeDb::BIT,
    };
    Expression {
        kind: ExpressionKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
        span,
    }
}

/// The arithmetic result type of two integral operands: the larger
/// width, signed only when both sides are signed, four-state if either
/// side is.
fn common_type(comp: &mut Compilation<'_>, a: TypeId, b: TypeId) -> TypeId {
    if comp.types.is_floating(a) || comp.types.is_floating(b) {
        return TypeDb::REAL;
    }
    let (Some(wa), Some(wb)) = (comp.types.bit_width(a), comp.types.bit_width(b)) else {
        return a;
    };
    let width = wa.max(wb);
    let signed = comp.types.is_signed(a) && comp.types.is_signed(b);
    let four_state = comp.types.is_four_state(a) || comp.types.is_four_state(b);
    comp.types.vector(width, signed, four_state)
}

fn bind_concat<'s>(
    comp: &mut Compilation<'s>,
    elements: &'s [ast::Expr],
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let inner = ctx.without_target();
    let mut bound = Vec::with_capacity(elements.len());
    let mut width = 0u32;
    let mut four_state = false;
    let mut bad = false;
    for element in elements {
        let e = bind(comp, element, &inner);
        bad |= e.bad();
        if !e.bad() {
            match comp.types.bit_width(e.ty) {
                Some(w) => {
                    width += w;
                    four_state |= comp.types.is_four_state(e.ty);
                }
                None => {
                    let t = comp.types.display(e.ty, comp.interner);
                    comp.emit(errors::type_mismatch("an integral type", &t, e.span));
                    bad = true;
                }
            }
        }
        bound.push(e);
    }
    if bad {
        return Expression::invalid(span);
    }
    let ty = comp.types.vector(width.max(1), false, four_state);
    Expression {
        kind: ExpressionKind::Concat(bound),
        ty,
        span,
    }
}

fn bind_element_select<'s>(
    comp: &mut Compilation<'s>,
    value: &'s ast::Expr,
    index: &'s ast::Expr,
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let value = bind(comp, value, ctx);
    let index = bind(comp, index, &ctx.without_target());
    if value.bad() || index.bad() {
        return Expression::invalid(span);
    }
    let canon = comp.types.canonical(value.ty);
    let ty = match comp.types.get(canon).clone() {
        TypeKind::Integral { four_state, .. } => comp.types.vector(1, false, four_state),
        TypeKind::FixedArray { element, .. }
        | TypeKind::DynamicArray { element }
        | TypeKind::AssociativeArray { element, .. }
        | TypeKind::Queue { element, .. } => element,
        _ => {
            let t = comp.types.display(value.ty, comp.interner);
            comp.emit(errors::type_mismatch("an indexable type", &t, span));
            return Expression::invalid(span);
        }
    };
    Expression {
        kind: ExpressionKind::ElementSelect {
            value: Box::new(value),
            index: Box::new(index),
        },
        ty,
        span,
    }
}

fn bind_range_select<'s>(
    comp: &mut Compilation<'s>,
    value: &'s ast::Expr,
    left: &'s ast::Expr,
    right: &'s ast::Expr,
    mode: ast::RangeSelectMode,
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let value = bind(comp, value, ctx);
    let left_bound = bind(comp, left, &ctx.without_target());
    let right_bound = bind(comp, right, &ctx.without_target());
    if value.bad() || left_bound.bad() || right_bound.bad() {
        return Expression::invalid(span);
    }
    // The width-determining expressions must be compile-time constants.
    let width = match mode {
        ast::RangeSelectMode::Simple => {
            let l = comp.eval_const_int_syntax(left, ctx);
            let r = comp.eval_const_int_syntax(right, ctx);
            match (l, r) {
                (Some(l), Some(r)) => (l - r).unsigned_abs() as u32 + 1,
                _ => return Expression::invalid(span),
            }
        }
        ast::RangeSelectMode::IndexedUp | ast::RangeSelectMode::IndexedDown => {
            match comp.eval_const_int_syntax(right, ctx) {
                Some(w) if w > 0 => w as u32,
                _ => {
                    comp.emit(errors::select_out_of_range(right.span()));
                    return Expression::invalid(span);
                }
            }
        }
    };
    let canon = comp.types.canonical(value.ty);
    let ty = match comp.types.get(canon).clone() {
        TypeKind::Integral { four_state, .. } => comp.types.vector(width, false, four_state),
        TypeKind::FixedArray { element, .. } => {
            let right_b = 0;
            comp.types.fixed_array(element, width as i64 - 1, right_b)
        }
        _ => {
            let t = comp.types.display(value.ty, comp.interner);
            comp.emit(errors::type_mismatch("a packed or array type", &t, span));
            return Expression::invalid(span);
        }
    };
    Expression {
        kind: ExpressionKind::RangeSelect {
            value: Box::new(value),
            left: Box::new(left_bound),
            right: Box::new(right_bound),
            mode,
        },
        ty,
        span,
    }
}

fn bind_member_access<'s>(
    comp: &mut Compilation<'s>,
    value: &'s ast::Expr,
    name: Ident,
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let value = bind(comp, value, ctx);
    if value.bad() {
        return Expression::invalid(span);
    }
    let canon = comp.types.canonical(value.ty);
    let fields = match comp.types.get(canon) {
        TypeKind::Struct { fields, .. } | TypeKind::Union { fields, .. } => fields.clone(),
        _ => {
            let t = comp.types.display(value.ty, comp.interner);
            let n = comp.interner.resolve(name).to_string();
            comp.emit(errors::unknown_member(&n, &t, span));
            return Expression::invalid(span);
        }
    };
    match fields.iter().position(|f| f.name == name) {
        Some(idx) => {
            let ty = fields[idx].ty;
            Expression {
                kind: ExpressionKind::MemberAccess {
                    value: Box::new(value),
                    member: name,
                    field_index: idx as u32,
                },
                ty,
                span,
            }
        }
        None => {
            let t = comp.types.display(value.ty, comp.interner);
            let n = comp.interner.resolve(name).to_string();
            comp.emit(errors::unknown_member(&n, &t, span));
            Expression::invalid(span)
        }
    }
}

fn bind_call<'s>(
    comp: &mut Compilation<'s>,
    target: &'s ast::CallTarget,
    args: &'s [ast::CallArg],
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let sym = match target {
        ast::CallTarget::System(name) => {
            let inner = ctx.without_target();
            let bound: Vec<Expression> = args
                .iter()
                .filter_map(|a| a.expr.as_ref())
                .map(|e| bind(comp, e, &inner))
                .collect();
            if bound.iter().any(Expression::bad) {
                return Expression::invalid(span);
            }
            return Expression {
                kind: ExpressionKind::SystemCall {
                    name: *name,
                    args: bound,
                },
                ty: TypeDb::INT,
                span,
            };
        }
        ast::CallTarget::Name(name) => lookup::unqualified_or_error(
            comp,
            ctx.scope,
            *name,
            ctx.location,
            LookupFlags::ALLOW_DECLARED_AFTER,
            span,
        ),
        ast::CallTarget::Scoped { package, name } => {
            lookup::package_member(comp, *package, *name, span)
        }
    };
    let Some(sym) = sym else {
        return Expression::invalid(span);
    };
    match &comp.symbol(sym).kind {
        SymbolKind::Subroutine(_) => bind_subroutine_call(comp, sym, args, span, ctx),
        SymbolKind::Sequence(_) | SymbolKind::Property(_) | SymbolKind::Let(_) => {
            assertions::bind_instance(comp, sym, args, span, ctx)
        }
        _ => {
            let name = comp.symbol_name(sym);
            let kind = comp.symbol(sym).kind_name();
            comp.emit(errors::not_a_value(&name, kind, span));
            Expression::invalid(span)
        }
    }
}

fn bind_subroutine_call<'s>(
    comp: &mut Compilation<'s>,
    sym: SymbolId,
    args: &'s [ast::CallArg],
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let (formals, return_ty) = match &comp.symbol(sym).kind {
        SymbolKind::Subroutine(data) => (data.args.clone(), data.syntax.return_ty.is_some()),
        _ => unreachable!("checked by caller"),
    };
    // Map ordered and named actuals onto formals, falling back to
    // defaults for holes.
    let mut actual_syntax: Vec<Option<&'s ast::Expr>> = vec![None; formals.len()];
    let mut ordered_pos = 0usize;
    for arg in args {
        match arg.name {
            Some(name) => {
                let pos = formals
                    .iter()
                    .position(|&f| comp.symbol(f).name == Some(name));
                match pos {
                    Some(pos) => actual_syntax[pos] = arg.expr.as_ref(),
                    None => {
                        let n = comp.interner.resolve(name).to_string();
                        comp.emit(errors::call_arg_mismatch(
                            &format!("no formal argument named `{n}`"),
                            arg.span,
                        ));
                        return Expression::invalid(span);
                    }
                }
            }
            None => {
                if ordered_pos >= formals.len() {
                    comp.emit(errors::call_arg_mismatch("too many arguments in call", arg.span));
                    return Expression::invalid(span);
                }
                actual_syntax[ordered_pos] = arg.expr.as_ref();
                ordered_pos += 1;
            }
        }
    }
    let mut bound = Vec::with_capacity(formals.len());
    for (i, &formal) in formals.iter().enumerate() {
        let formal_ty = comp.value_type(formal);
        let default = match &comp.symbol(formal).kind {
            SymbolKind::FormalArgument(data) => data.default,
            _ => None,
        };
        let syntax = actual_syntax[i].or(default);
        match syntax {
            Some(expr) => {
                let arg_ctx = ctx.with_target(formal_ty);
                let e = bind(comp, expr, &arg_ctx);
                if e.bad() {
                    return Expression::invalid(span);
                }
                let e = convert_for_assignment(comp, formal_ty, e, span);
                bound.push(e);
            }
            None => {
                let n = comp.symbol_name(formal);
                comp.emit(errors::call_arg_mismatch(
                    &format!("missing value for argument `{n}`"),
                    span,
                ));
                return Expression::invalid(span);
            }
        }
    }
    let ty = if return_ty {
        let cached = match &comp.symbol(sym).kind {
            SymbolKind::Subroutine(data) => data.return_ty.get().copied(),
            _ => None,
        };
        cached.unwrap_or_else(|| comp.subroutine_return_type(sym))
    } else {
        TypeDb::VOID
    };
    Expression {
        kind: ExpressionKind::Call {
            subroutine: sym,
            args: bound,
        },
        ty,
        span,
    }
}

fn bind_dist<'s>(
    comp: &mut Compilation<'s>,
    value: &'s ast::Expr,
    items: &'s [ast::DistItem],
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let inner = ctx.without_target();
    let value = bind(comp, value, &inner);
    if value.bad() {
        return Expression::invalid(span);
    }
    if !comp.types.is_integral(value.ty) {
        comp.emit(errors::dist_not_integral(value.span));
        return Expression::invalid(span);
    }
    let mut bound_items = Vec::with_capacity(items.len());
    for item in items {
        let low = bind(comp, &item.range.low, &inner);
        let high = item.range.high.as_ref().map(|h| bind(comp, h, &inner));
        let (per_range, weight) = match &item.weight {
            Some((kind, expr)) => (
                *kind == ast::DistWeightKind::PerRange,
                Some(bind(comp, expr, &inner)),
            ),
            None => (false, None),
        };
        if low.bad()
            || high.as_ref().map_or(false, Expression::bad)
            || weight.as_ref().map_or(false, Expression::bad)
        {
            return Expression::invalid(span);
        }
        bound_items.push(BoundDistItem {
            low,
            high,
            weight,
            per_range,
        });
    }
    let ty = TypeDb::BIT;
    Expression {
        kind: ExpressionKind::Dist {
            value: Box::new(value),
            items: bound_items,
        },
        ty,
        span,
    }
}

fn bind_tagged_union<'s>(
    comp: &mut Compilation<'s>,
    member: Ident,
    value: Option<&'s ast::Expr>,
    span: Span,
    ctx: &BindContext,
) -> Expression {
    let Some(target) = ctx.target_type else {
        comp.emit(errors::tagged_union_error(
            "tagged union expression requires an assignment-like context",
            span,
        ));
        return Expression::invalid(span);
    };
    let canon = comp.types.canonical(target);
    let fields = match comp.types.get(canon) {
        TypeKind::Union {
            tagged: true,
            fields,
            ..
        } => fields.clone(),
        _ => {
            let t = comp.types.display(target, comp.interner);
            comp.emit(errors::tagged_union_error(
                &format!("target type {t} is not a tagged union"),
                span,
            ));
            return Expression::invalid(span);
        }
    };
    let Some(idx) = fields.iter().position(|f| f.name == member) else {
        let t = comp.types.display(target, comp.interner);
        let n = comp.interner.resolve(member).to_string();
        comp.emit(errors::unknown_member(&n, &t, span));
        return Expression::invalid(span);
    };
    let member_ty = fields[idx].ty;
    let bound_value = match value {
        Some(expr) => {
            let inner = ctx.with_target(member_ty);
            let e = bind(comp, expr, &inner);
            if e.bad() {
                return Expression::invalid(span);
            }
            Some(Box::new(convert_for_assignment(comp, member_ty, e, span)))
        }
        None => {
            if comp.types.canonical(member_ty) != TypeDb::VOID {
                comp.emit(errors::tagged_union_error(
                    "a member value is required unless the member type is void",
                    span,
                ));
                return Expression::invalid(span);
            }
            None
        }
    };
    Expression {
        kind: ExpressionKind::TaggedUnion {
            member_index: idx as u32,
            value: bound_value,
        },
        ty: target,
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_decimal() {
        let v = parse_integer_literal("42").unwrap();
        assert_eq!(v.width(), 32);
        assert!(v.is_signed());
        assert_eq!(v.to_i64(), Some(42));
    }

    #[test]
    fn parse_sized_binary() {
        let v = parse_integer_literal("4'b1010").unwrap();
        assert_eq!(v.width(), 4);
        assert_eq!(v.to_u64(), Some(0b1010));
    }

    #[test]
    fn parse_sized_hex_and_octal() {
        assert_eq!(parse_integer_literal("8'hFF").unwrap().to_u64(), Some(255));
        assert_eq!(parse_integer_literal("8'o17").unwrap().to_u64(), Some(15));
        assert_eq!(parse_integer_literal("32'd100").unwrap().to_u64(), Some(100));
    }

    #[test]
    fn parse_unsized_based() {
        let v = parse_integer_literal("'hFF").unwrap();
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_u64(), Some(255));
    }

    #[test]
    fn parse_four_state_digits() {
        let v = parse_integer_literal("4'b10x0").unwrap();
        assert!(v.has_unknown());
        assert_eq!(v.get(1), Logic::X);
        assert_eq!(v.get(3), Logic::One);

        let z = parse_integer_literal("8'hzz").unwrap();
        assert_eq!(z.get(0), Logic::Z);
        assert_eq!(z.get(7), Logic::Z);
    }

    #[test]
    fn parse_signed_marker() {
        let v = parse_integer_literal("8'shFF").unwrap();
        assert!(v.is_signed());
        assert_eq!(v.to_i64(), Some(-1));
    }

    #[test]
    fn parse_underscores() {
        assert_eq!(
            parse_integer_literal("1_000").unwrap().to_i64(),
            Some(1000)
        );
        assert_eq!(parse_integer_literal("8'hF_F").unwrap().to_u64(), Some(255));
    }

    #[test]
    fn parse_decimal_x() {
        let v = parse_integer_literal("4'dx").unwrap();
        assert_eq!(v.get(0), Logic::X);
        assert_eq!(v.get(3), Logic::X);
    }

    #[test]
    fn parse_garbage_rejected() {
        assert!(parse_integer_literal("4'q1010").is_none());
        assert!(parse_integer_literal("abc").is_none());
        assert!(parse_integer_literal("8'h").is_none());
        assert!(parse_integer_literal("8'b2").is_none());
    }

    #[test]
    fn invalid_expression_is_bad() {
        let e = Expression::invalid(Span::DUMMY);
        assert!(e.bad());
        assert_eq!(e.symbol_ref(), None);
    }

    #[test]
    fn truncation_width_check() {
        // Width truncation of based literals respects the stated size.
        let v = parse_integer_literal("2'hFF").unwrap();
        assert_eq!(v.width(), 2);
        assert_eq!(v.to_u64(), Some(3));
    }
}
