//! Compile-time evaluation of bound expressions.
//!
//! The evaluator is a recursive interpreter with an explicit frame stack
//! for constant function calls. Two budgets bound progress: a call-depth
//! limit and a step limit; exhausting either emits a diagnostic (with a
//! bounded backtrace for depth) and aborts the evaluation, leaving the
//! compilation consistent. Evaluation never mutates symbols or
//! expressions; function locals live in the frames.

use crate::compilation::Compilation;
use crate::const_value::ConstantValue;
use crate::errors;
use crate::expr::{BinaryOperator, Expression, ExpressionKind, UnaryOperator};
use crate::options::MinTypMax;
use crate::stmt::Statement;
use crate::symbols::{SymbolId, SymbolKind};
use crate::types::{TypeId, TypeKind};
use bitflags::bitflags;
use std::collections::HashMap;
use veris_common::{Logic, LogicVec};
use veris_source::Span;

bitflags! {
    /// Modifiers for one constant evaluation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EvalFlags: u32 {
        /// Scripting/elaboration-tool context: relaxes the
        /// constant-function locality rules.
        const IS_SCRIPT = 1 << 0;
        /// Covergroup option context: permits references to non-ref
        /// formal arguments and const locals.
        const COVERGROUP_EXPR = 1 << 1;
        /// Specparams may be referenced.
        const SPECPARAMS_ALLOWED = 1 << 2;
    }
}

/// One constant-function call frame.
#[derive(Debug)]
pub struct Frame {
    /// The called subroutine.
    pub subroutine: Option<SymbolId>,
    /// Local values, keyed by symbol.
    pub locals: HashMap<SymbolId, ConstantValue>,
    /// The call site, for backtraces.
    pub call_span: Span,
}

/// Mutable state for one evaluation.
#[derive(Debug)]
pub struct EvalContext {
    /// Evaluation flags.
    pub flags: EvalFlags,
    /// When set, no diagnostics are emitted (probing and unevaluated
    /// branches).
    pub quiet: bool,
    steps: u32,
    frames: Vec<Frame>,
    failed: bool,
}

impl EvalContext {
    /// Creates a fresh evaluation context.
    pub fn new() -> Self {
        Self {
            flags: EvalFlags::empty(),
            quiet: false,
            steps: 0,
            frames: Vec::new(),
            failed: false,
        }
    }

    /// Creates a context that swallows diagnostics.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::new()
        }
    }

    /// Creates a context with the given flags.
    pub fn with_flags(flags: EvalFlags) -> Self {
        Self {
            flags,
            ..Self::new()
        }
    }

    fn top_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    fn top_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

enum Flow {
    Next,
    Return(ConstantValue),
    Fail,
}

/// Evaluates a bound expression to a constant value.
///
/// Returns `None` after emitting a diagnostic (unless quiet) when the
/// expression is not constant or a budget is exhausted.
pub fn eval(
    comp: &mut Compilation<'_>,
    expr: &Expression,
    ectx: &mut EvalContext,
) -> Option<ConstantValue> {
    if ectx.failed {
        return None;
    }
    ectx.steps += 1;
    if ectx.steps > comp.options.max_constexpr_steps {
        if !ectx.failed && !ectx.quiet {
            comp.emit(errors::const_eval_steps_exceeded(
                comp.options.max_constexpr_steps,
                expr.span,
            ));
        }
        ectx.failed = true;
        return None;
    }

    match &expr.kind {
        ExpressionKind::Invalid => None,
        ExpressionKind::IntegerLiteral(v) => Some(ConstantValue::Int(v.clone())),
        ExpressionKind::RealLiteral(v) => Some(ConstantValue::Real(*v)),
        ExpressionKind::StringLiteral(s) => Some(ConstantValue::Str(s.clone())),
        ExpressionKind::UnboundedLiteral => Some(ConstantValue::Unbounded),
        ExpressionKind::NamedValue(sym) => eval_symbol(comp, *sym, expr.span, ectx),
        ExpressionKind::HierarchicalValue(sym) => {
            if !comp.options.allow_hierarchical_const {
                if !ectx.quiet {
                    let name = comp.symbol_name(*sym);
                    comp.emit(errors::const_eval_hierarchical(&name, expr.span));
                }
                return None;
            }
            eval_symbol(comp, *sym, expr.span, ectx)
        }
        ExpressionKind::Unary { op, operand } => {
            let value = eval(comp, operand, ectx)?;
            eval_unary(comp, *op, value, expr.span, ectx)
        }
        ExpressionKind::Binary { op, left, right } => {
            eval_binary(comp, *op, left, right, expr.span, ectx)
        }
        ExpressionKind::Conditional { cond, left, right } => {
            let c = eval(comp, cond, ectx)?;
            match c.truthy() {
                Logic::One => eval(comp, left, ectx),
                Logic::Zero => eval(comp, right, ectx),
                _ => {
                    // An unknown condition merges to X of the result width.
                    let width = comp.types.bit_width(expr.ty).unwrap_or(1);
                    Some(ConstantValue::Int(LogicVec::filled(width, Logic::X)))
                }
            }
        }
        ExpressionKind::Concat(parts) => {
            let mut acc: Option<LogicVec> = None;
            for part in parts {
                let v = eval(comp, part, ectx)?;
                let ConstantValue::Int(bits) = v else {
                    return fail_non_const(comp, ectx, "a non-integral value", part.span);
                };
                acc = Some(match acc {
                    Some(high) => high.concat(&bits),
                    None => bits,
                });
            }
            Some(ConstantValue::Int(acc.unwrap_or_else(|| LogicVec::zero(1))))
        }
        ExpressionKind::Replication { count, inner } => {
            let v = eval(comp, inner, ectx)?;
            let ConstantValue::Int(bits) = v else {
                return fail_non_const(comp, ectx, "a non-integral value", inner.span);
            };
            let mut acc = LogicVec::zero(0);
            for _ in 0..*count {
                acc = acc.concat(&bits);
            }
            Some(ConstantValue::Int(acc))
        }
        ExpressionKind::ElementSelect { value, index } => {
            let base = eval(comp, value, ectx)?;
            let idx = eval(comp, index, ectx)?;
            let Some(i) = idx.to_i64() else {
                return fail_non_const(comp, ectx, "an unknown index", index.span);
            };
            match base {
                ConstantValue::Int(bits) => {
                    if i < 0 || i as u32 >= bits.width() {
                        if !ectx.quiet {
                            comp.emit(errors::select_out_of_range(index.span));
                        }
                        return None;
                    }
                    Some(ConstantValue::Int(bits.slice(i as u32, i as u32)))
                }
                ConstantValue::Elements(elems) => {
                    let len = elems.len() as i64;
                    if i < 0 || i >= len {
                        if !ectx.quiet {
                            comp.emit(errors::select_out_of_range(index.span));
                        }
                        return None;
                    }
                    Some(elems[i as usize].clone())
                }
                _ => fail_non_const(comp, ectx, "a non-indexable value", value.span),
            }
        }
        ExpressionKind::RangeSelect {
            value, left, right, ..
        } => {
            let base = eval(comp, value, ectx)?;
            let l = eval(comp, left, ectx)?.to_i64()?;
            let r = eval(comp, right, ectx)?.to_i64()?;
            let (hi, lo) = (l.max(r), l.min(r));
            match base {
                ConstantValue::Int(bits) => {
                    if lo < 0 || hi as u32 >= bits.width() {
                        if !ectx.quiet {
                            comp.emit(errors::select_out_of_range(expr.span));
                        }
                        return None;
                    }
                    Some(ConstantValue::Int(bits.slice(hi as u32, lo as u32)))
                }
                ConstantValue::Elements(elems) => {
                    let len = elems.len() as i64;
                    if lo < 0 || hi >= len {
                        if !ectx.quiet {
                            comp.emit(errors::select_out_of_range(expr.span));
                        }
                        return None;
                    }
                    Some(ConstantValue::Elements(
                        elems[lo as usize..=hi as usize].to_vec(),
                    ))
                }
                _ => fail_non_const(comp, ectx, "a non-indexable value", value.span),
            }
        }
        ExpressionKind::MemberAccess {
            value, field_index, ..
        } => {
            let base = eval(comp, value, ectx)?;
            match base {
                ConstantValue::Struct(fields) => fields.get(*field_index as usize).cloned(),
                ConstantValue::Union { member, value } if member == *field_index => {
                    Some(*value)
                }
                ConstantValue::Int(bits) => {
                    // Packed struct member: slice the packed bits.
                    packed_member_slice(comp, expr, value, &bits, *field_index)
                }
                _ => fail_non_const(comp, ectx, "a non-aggregate value", value.span),
            }
        }
        ExpressionKind::Conversion { operand } => {
            let v = eval(comp, operand, ectx)?;
            Some(convert_value(comp, v, expr.ty))
        }
        ExpressionKind::Call { subroutine, args } => {
            eval_call(comp, *subroutine, args, expr, ectx)
        }
        ExpressionKind::SystemCall { name, args } => {
            eval_system_call(comp, *name, args, expr.span, ectx)
        }
        ExpressionKind::Assignment {
            lhs,
            rhs,
            ..
        } => {
            let value = eval(comp, rhs, ectx)?;
            assign_lvalue(comp, lhs, value.clone(), ectx)?;
            Some(value)
        }
        ExpressionKind::MinTypMax {
            min,
            typ,
            max,
            selected,
        } => {
            // Only the selected branch is live; the others were bound as
            // unevaluated and never execute.
            let chosen = match selected {
                MinTypMax::Min => min,
                MinTypMax::Typ => typ,
                MinTypMax::Max => max,
            };
            eval(comp, chosen, ectx)
        }
        ExpressionKind::TaggedUnion {
            member_index,
            value,
        } => {
            let inner = match value {
                Some(v) => Box::new(eval(comp, v, ectx)?),
                None => Box::new(ConstantValue::Null),
            };
            Some(ConstantValue::Union {
                member: *member_index,
                value: inner,
            })
        }
        ExpressionKind::Dist { .. }
        | ExpressionKind::AssertionInstance(_)
        | ExpressionKind::ClockingEvent { .. } => {
            fail_non_const(comp, ectx, "a non-constant construct", expr.span)
        }
        ExpressionKind::TypeReference(_) => {
            fail_non_const(comp, ectx, "a type reference", expr.span)
        }
    }
}

fn fail_non_const(
    comp: &mut Compilation<'_>,
    ectx: &EvalContext,
    what: &str,
    span: Span,
) -> Option<ConstantValue> {
    if !ectx.quiet {
        comp.emit(errors::const_eval_non_const(what, span));
    }
    None
}

fn eval_symbol(
    comp: &mut Compilation<'_>,
    sym: SymbolId,
    span: Span,
    ectx: &mut EvalContext,
) -> Option<ConstantValue> {
    // Frame locals shadow everything else.
    if let Some(frame) = ectx.top_frame() {
        if let Some(v) = frame.locals.get(&sym) {
            return Some(v.clone());
        }
    }
    match &comp.symbol(sym).kind {
        SymbolKind::Parameter(_) => comp.parameter_value(sym),
        SymbolKind::EnumValue(data) => Some(data.value.clone()),
        SymbolKind::Specparam(_) => {
            if ectx.flags.contains(EvalFlags::SPECPARAMS_ALLOWED) {
                comp.specparam_value(sym)
            } else {
                fail_non_const(comp, ectx, "a specparam", span)
            }
        }
        SymbolKind::Genvar(data) => match &data.value {
            Some(v) => Some(v.clone()),
            None => fail_non_const(comp, ectx, "a genvar outside its loop", span),
        },
        SymbolKind::Variable(data) => {
            let is_const = data.is_const;
            let initializer = data.value.initializer;
            // Inside a constant function, non-parameter identifiers must
            // come from the function's own lexical scope; parameters and
            // enum values (handled above) are exempt.
            if let Some(frame_sub) = ectx.top_frame().and_then(|f| f.subroutine) {
                if !comp.is_within(sym, frame_sub) && !ectx.flags.contains(EvalFlags::IS_SCRIPT) {
                    if !ectx.quiet {
                        let name = comp.symbol_name(sym);
                        comp.emit(errors::const_function_outside_ref(&name, span));
                    }
                    return None;
                }
                // A local declared in the function but not yet assigned.
                return fail_non_const(comp, ectx, "an uninitialized local", span);
            }
            let allow_const_var = is_const
                && (ectx.flags.contains(EvalFlags::COVERGROUP_EXPR)
                    || ectx.flags.contains(EvalFlags::IS_SCRIPT));
            if allow_const_var {
                if let Some(init) = initializer {
                    let bound = comp.bind_initializer_for_eval(sym, init)?;
                    return eval(comp, &bound, ectx);
                }
            }
            let name = comp.symbol_name(sym);
            if !ectx.quiet {
                comp.emit(errors::const_eval_non_const(
                    &format!("variable `{name}`"),
                    span,
                ));
            }
            None
        }
        SymbolKind::FormalArgument(_) => {
            if ectx.flags.contains(EvalFlags::COVERGROUP_EXPR) {
                // Covergroup option expressions may reference non-ref
                // formals; their value is not known at elaboration time,
                // so evaluation stops here without a hard error.
                return None;
            }
            fail_non_const(comp, ectx, "a formal argument", span)
        }
        _ => {
            let kind = comp.symbol(sym).kind_name();
            fail_non_const(comp, ectx, kind, span)
        }
    }
}

fn eval_unary(
    comp: &mut Compilation<'_>,
    op: UnaryOperator,
    value: ConstantValue,
    span: Span,
    ectx: &EvalContext,
) -> Option<ConstantValue> {
    if let ConstantValue::Real(r) = value {
        return match op {
            UnaryOperator::Plus => Some(ConstantValue::Real(r)),
            UnaryOperator::Minus => Some(ConstantValue::Real(-r)),
            UnaryOperator::LogicNot => Some(ConstantValue::Int(LogicVec::from_bool(r == 0.0))),
            _ => fail_non_const(comp, ectx, "a real operand", span),
        };
    }
    let ConstantValue::Int(bits) = value else {
        return fail_non_const(comp, ectx, "a non-integral operand", span);
    };
    let result = match op {
        UnaryOperator::Plus => bits,
        UnaryOperator::Minus => bits.neg(),
        UnaryOperator::BitNot => bits.not(),
        UnaryOperator::LogicNot => {
            let mut out = LogicVec::zero(1);
            out.set(0, !bits.truthy());
            out
        }
        UnaryOperator::RedAnd => LogicVec::from_bool(false).with_bit(bits.reduce_and()),
        UnaryOperator::RedOr => LogicVec::from_bool(false).with_bit(bits.reduce_or()),
        UnaryOperator::RedXor => LogicVec::from_bool(false).with_bit(bits.reduce_xor()),
    };
    Some(ConstantValue::Int(result))
}

trait WithBit {
    fn with_bit(self, bit: Logic) -> LogicVec;
}

impl WithBit for LogicVec {
    fn with_bit(mut self, bit: Logic) -> LogicVec {
        self.set(0, bit);
        self
    }
}

fn eval_binary(
    comp: &mut Compilation<'_>,
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
    span: Span,
    ectx: &mut EvalContext,
) -> Option<ConstantValue> {
    use BinaryOperator::*;
    // Logical operators short-circuit.
    if matches!(op, LogicAnd | LogicOr) {
        let l = eval(comp, left, ectx)?;
        let lt = l.truthy();
        match (op, lt) {
            (LogicAnd, Logic::Zero) => return Some(ConstantValue::Int(LogicVec::from_bool(false))),
            (LogicOr, Logic::One) => return Some(ConstantValue::Int(LogicVec::from_bool(true))),
            _ => {}
        }
        let r = eval(comp, right, ectx)?;
        let rt = r.truthy();
        let out = match op {
            LogicAnd => lt & rt,
            _ => lt | rt,
        };
        return Some(ConstantValue::Int(LogicVec::zero(1).with_bit(out)));
    }

    let l = eval(comp, left, ectx)?;
    let r = eval(comp, right, ectx)?;

    // Real arithmetic when either side is real.
    if let (Some(lf), Some(rf)) = (as_real(&l), as_real(&r)) {
        if matches!(l, ConstantValue::Real(_)) || matches!(r, ConstantValue::Real(_)) {
            return eval_real_binary(comp, op, lf, rf, span, ectx);
        }
    }

    let (ConstantValue::Int(a), ConstantValue::Int(b)) = (&l, &r) else {
        // String comparisons.
        if let (ConstantValue::Str(a), ConstantValue::Str(b)) = (&l, &r) {
            let out = match op {
                Eq | CaseEq => a == b,
                Ne | CaseNe => a != b,
                Lt => a < b,
                Le => a <= b,
                Gt => a > b,
                Ge => a >= b,
                _ => return fail_non_const(comp, ectx, "a string operand", span),
            };
            return Some(ConstantValue::Int(LogicVec::from_bool(out)));
        }
        return fail_non_const(comp, ectx, "a non-integral operand", span);
    };

    let result = match op {
        Add => a.add(b),
        Sub => a.sub(b),
        Mul => a.mul(b),
        Div => {
            if b.to_i64() == Some(0) && !ectx.quiet {
                comp.emit(errors::const_eval_div_by_zero(span));
            }
            a.div(b)
        }
        Mod => {
            if b.to_i64() == Some(0) && !ectx.quiet {
                comp.emit(errors::const_eval_div_by_zero(span));
            }
            a.rem(b)
        }
        Pow => a.pow(b),
        And => a.and(b),
        Or => a.or(b),
        Xor => a.xor(b),
        Shl => a.shl(b),
        Shr => a.shr(b),
        Eq => LogicVec::zero(1).with_bit(a.logic_eq(b)),
        Ne => LogicVec::zero(1).with_bit(!a.logic_eq(b)),
        CaseEq => LogicVec::from_bool(a.case_eq(b)),
        CaseNe => LogicVec::from_bool(!a.case_eq(b)),
        Lt | Le | Gt | Ge => match a.compare(b) {
            Some(ord) => {
                let v = match op {
                    Lt => ord.is_lt(),
                    Le => ord.is_le(),
                    Gt => ord.is_gt(),
                    _ => ord.is_ge(),
                };
                LogicVec::from_bool(v)
            }
            None => LogicVec::filled(1, Logic::X),
        },
        LogicAnd | LogicOr => unreachable!("handled above"),
    };
    Some(ConstantValue::Int(result))
}

fn as_real(v: &ConstantValue) -> Option<f64> {
    match v {
        ConstantValue::Real(r) => Some(*r),
        ConstantValue::Shortreal(r) => Some(*r as f64),
        ConstantValue::Int(bits) => bits.to_i64().map(|i| i as f64),
        _ => None,
    }
}

fn eval_real_binary(
    comp: &mut Compilation<'_>,
    op: BinaryOperator,
    l: f64,
    r: f64,
    span: Span,
    ectx: &EvalContext,
) -> Option<ConstantValue> {
    use BinaryOperator::*;
    let bool_result = |b: bool| Some(ConstantValue::Int(LogicVec::from_bool(b)));
    match op {
        Add => Some(ConstantValue::Real(l + r)),
        Sub => Some(ConstantValue::Real(l - r)),
        Mul => Some(ConstantValue::Real(l * r)),
        Div => Some(ConstantValue::Real(l / r)),
        Pow => Some(ConstantValue::Real(l.powf(r))),
        Eq => bool_result(l == r),
        Ne => bool_result(l != r),
        Lt => bool_result(l < r),
        Le => bool_result(l <= r),
        Gt => bool_result(l > r),
        Ge => bool_result(l >= r),
        _ => fail_non_const(comp, ectx, "a real operand", span),
    }
}

/// Converts a value to a target type (width/sign adjustment, integral to
/// real and back, enum casts).
pub fn convert_value(comp: &Compilation<'_>, value: ConstantValue, target: TypeId) -> ConstantValue {
    let canon = comp.types.canonical(target);
    match comp.types.get(canon) {
        TypeKind::Real => match as_real(&value) {
            Some(r) => ConstantValue::Real(r),
            None => value,
        },
        TypeKind::Shortreal => match as_real(&value) {
            Some(r) => ConstantValue::Shortreal(r as f32),
            None => value,
        },
        _ => {
            let Some(width) = comp.types.bit_width(canon) else {
                return value;
            };
            let signed = comp.types.is_signed(canon);
            match value {
                ConstantValue::Int(bits) => {
                    ConstantValue::Int(bits.resized(width).as_signed(signed))
                }
                ConstantValue::Real(r) => {
                    ConstantValue::Int(LogicVec::from_i64(r as i64, width).as_signed(signed))
                }
                ConstantValue::Shortreal(r) => {
                    ConstantValue::Int(LogicVec::from_i64(r as i64, width).as_signed(signed))
                }
                other => other,
            }
        }
    }
}

fn packed_member_slice(
    comp: &mut Compilation<'_>,
    expr: &Expression,
    value: &Expression,
    bits: &LogicVec,
    field_index: u32,
) -> Option<ConstantValue> {
    let canon = comp.types.canonical(value.ty);
    let TypeKind::Struct { packed: true, fields, .. } = comp.types.get(canon) else {
        return None;
    };
    let fields = fields.clone();
    // Packed struct fields lay out MSB-first in declaration order.
    let mut offset_from_top = 0u32;
    for (i, field) in fields.iter().enumerate() {
        let w = comp.types.bit_width(field.ty)?;
        if i as u32 == field_index {
            let total = bits.width();
            let hi = total - 1 - offset_from_top;
            let lo = hi + 1 - w;
            let _ = expr;
            return Some(ConstantValue::Int(bits.slice(hi, lo)));
        }
        offset_from_top += w;
    }
    None
}

fn eval_call(
    comp: &mut Compilation<'_>,
    subroutine: SymbolId,
    args: &[Expression],
    expr: &Expression,
    ectx: &mut EvalContext,
) -> Option<ConstantValue> {
    if ectx.frames.len() as u32 >= comp.options.max_constexpr_depth {
        if !ectx.quiet {
            let mut diag = errors::const_eval_depth_exceeded(
                comp.options.max_constexpr_depth,
                expr.span,
            );
            // Show a bounded backtrace of the call stack.
            let shown = comp.options.max_constexpr_backtrace as usize;
            for frame in ectx.frames.iter().rev().take(shown) {
                diag = diag.with_note(errors::N005, "during constant evaluation of call", frame.call_span);
            }
            comp.emit(diag);
        }
        ectx.failed = true;
        return None;
    }
    let (formals, is_function) = match &comp.symbol(subroutine).kind {
        SymbolKind::Subroutine(data) => (
            data.args.clone(),
            data.kind == veris_syntax::SubroutineKind::Function,
        ),
        _ => return None,
    };
    if !is_function {
        return fail_non_const(comp, ectx, "a task call", expr.span);
    }

    // Evaluate actuals in the caller's frame before pushing.
    let mut locals = HashMap::new();
    for (formal, actual) in formals.iter().zip(args) {
        let v = eval(comp, actual, ectx)?;
        locals.insert(*formal, v);
    }

    let body = comp.bound_subroutine_body(subroutine)?;
    ectx.frames.push(Frame {
        subroutine: Some(subroutine),
        locals,
        call_span: expr.span,
    });
    let mut result = None;
    for stmt in &body {
        match exec_stmt(comp, stmt, ectx) {
            Flow::Next => continue,
            Flow::Return(v) => {
                result = Some(v);
                break;
            }
            Flow::Fail => {
                ectx.frames.pop();
                return None;
            }
        }
    }
    ectx.frames.pop();
    match result {
        Some(v) => Some(convert_value(comp, v, expr.ty)),
        None => fail_non_const(comp, ectx, "a function that never returns a value", expr.span),
    }
}

fn exec_stmt(comp: &mut Compilation<'_>, stmt: &Statement, ectx: &mut EvalContext) -> Flow {
    ectx.steps += 1;
    if ectx.steps > comp.options.max_constexpr_steps {
        if !ectx.failed && !ectx.quiet {
            comp.emit(errors::const_eval_steps_exceeded(
                comp.options.max_constexpr_steps,
                Span::DUMMY,
            ));
        }
        ectx.failed = true;
        return Flow::Fail;
    }
    match stmt {
        Statement::Block(stmts) => {
            for s in stmts {
                match exec_stmt(comp, s, ectx) {
                    Flow::Next => continue,
                    other => return other,
                }
            }
            Flow::Next
        }
        Statement::Expr(e) => match eval(comp, e, ectx) {
            Some(_) => Flow::Next,
            None => Flow::Fail,
        },
        Statement::If {
            cond,
            then_stmt,
            else_stmt,
        } => {
            let Some(c) = eval(comp, cond, ectx) else {
                return Flow::Fail;
            };
            match c.truthy() {
                Logic::One => exec_stmt(comp, then_stmt, ectx),
                Logic::Zero => match else_stmt {
                    Some(s) => exec_stmt(comp, s, ectx),
                    None => Flow::Next,
                },
                _ => {
                    if !ectx.quiet {
                        comp.emit(errors::const_eval_non_const(
                            "an unknown condition",
                            cond.span,
                        ));
                    }
                    Flow::Fail
                }
            }
        }
        Statement::While { cond, body } => loop {
            let Some(c) = eval(comp, cond, ectx) else {
                return Flow::Fail;
            };
            if ectx.failed {
                return Flow::Fail;
            }
            match c.truthy() {
                Logic::One => match exec_stmt(comp, body, ectx) {
                    Flow::Next => continue,
                    other => return other,
                },
                Logic::Zero => return Flow::Next,
                _ => {
                    if !ectx.quiet {
                        comp.emit(errors::const_eval_non_const(
                            "an unknown condition",
                            cond.span,
                        ));
                    }
                    return Flow::Fail;
                }
            }
        },
        Statement::Timed { event, .. } => {
            if !ectx.quiet {
                comp.emit(errors::const_eval_non_const(
                    "an event control",
                    event.span,
                ));
            }
            Flow::Fail
        }
        Statement::VarDecl {
            symbol,
            initializer,
        } => {
            let value = match initializer {
                Some(init) => match eval(comp, init, ectx) {
                    Some(v) => v,
                    None => return Flow::Fail,
                },
                None => ConstantValue::Null,
            };
            if let Some(frame) = ectx.top_frame_mut() {
                frame.locals.insert(*symbol, value);
            }
            Flow::Next
        }
        Statement::Return(expr) => match expr {
            Some(e) => match eval(comp, e, ectx) {
                Some(v) => Flow::Return(v),
                None => Flow::Fail,
            },
            None => Flow::Return(ConstantValue::Null),
        },
        Statement::Invalid => Flow::Fail,
    }
}

/// Assigns into a frame-local slot, supporting whole-symbol targets and
/// constant element/member paths into aggregate locals.
fn assign_lvalue(
    comp: &mut Compilation<'_>,
    lhs: &Expression,
    value: ConstantValue,
    ectx: &mut EvalContext,
) -> Option<()> {
    match &lhs.kind {
        ExpressionKind::NamedValue(sym) => {
            if ectx.top_frame().is_none() {
                return fail_non_const(comp, ectx, "an assignment outside a function", lhs.span)
                    .map(|_| ());
            }
            let frame = ectx.top_frame_mut().unwrap();
            frame.locals.insert(*sym, value);
            Some(())
        }
        ExpressionKind::ElementSelect {
            value: base, index, ..
        } => {
            let idx = eval(comp, index, ectx)?.to_i64()?;
            let current = eval(comp, base, ectx)?;
            match current {
                ConstantValue::Elements(mut elems) => {
                    if idx < 0 || idx as usize >= elems.len() {
                        if !ectx.quiet {
                            comp.emit(errors::select_out_of_range(index.span));
                        }
                        return None;
                    }
                    elems[idx as usize] = value;
                    assign_lvalue(comp, base, ConstantValue::Elements(elems), ectx)
                }
                ConstantValue::Int(mut bits) => {
                    if idx < 0 || idx as u32 >= bits.width() {
                        if !ectx.quiet {
                            comp.emit(errors::select_out_of_range(index.span));
                        }
                        return None;
                    }
                    let bit = match value {
                        ConstantValue::Int(v) if v.width() >= 1 => v.get(0),
                        _ => Logic::X,
                    };
                    bits.set(idx as u32, bit);
                    assign_lvalue(comp, base, ConstantValue::Int(bits), ectx)
                }
                _ => fail_non_const(comp, ectx, "a non-indexable target", lhs.span).map(|_| ()),
            }
        }
        ExpressionKind::MemberAccess {
            value: base,
            field_index,
            ..
        } => {
            let current = eval(comp, base, ectx)?;
            match current {
                ConstantValue::Struct(mut fields) => {
                    if (*field_index as usize) < fields.len() {
                        fields[*field_index as usize] = value;
                        assign_lvalue(comp, base, ConstantValue::Struct(fields), ectx)
                    } else {
                        None
                    }
                }
                _ => fail_non_const(comp, ectx, "a non-struct target", lhs.span).map(|_| ()),
            }
        }
        _ => fail_non_const(comp, ectx, "an unsupported assignment target", lhs.span).map(|_| ()),
    }
}

fn eval_system_call(
    comp: &mut Compilation<'_>,
    name: veris_common::Ident,
    args: &[Expression],
    span: Span,
    ectx: &mut EvalContext,
) -> Option<ConstantValue> {
    let name_str = comp.interner.resolve(name).to_string();
    match name_str.as_str() {
        "$clog2" => {
            let [arg] = args else {
                if !ectx.quiet {
                    comp.emit(errors::call_arg_mismatch(
                        "$clog2 requires exactly one argument",
                        span,
                    ));
                }
                return None;
            };
            let v = eval(comp, arg, ectx)?.to_i64()?;
            Some(ConstantValue::int(clog2(v)))
        }
        "$bits" => {
            let [arg] = args else {
                if !ectx.quiet {
                    comp.emit(errors::call_arg_mismatch(
                        "$bits requires exactly one argument",
                        span,
                    ));
                }
                return None;
            };
            let ty = match &arg.kind {
                ExpressionKind::TypeReference(t) => *t,
                _ => arg.ty,
            };
            let width = comp.types.bit_width(ty)?;
            Some(ConstantValue::int(width as i64))
        }
        _ => fail_non_const(comp, ectx, &format!("system function `{name_str}`"), span),
    }
}

/// `$clog2` semantics: ceil(log2(n)) with `clog2(0) = clog2(1) = 0`.
fn clog2(n: i64) -> i64 {
    if n <= 1 {
        return 0;
    }
    let mut result = 0i64;
    let mut val = n - 1;
    while val > 0 {
        result += 1;
        val >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clog2_values() {
        assert_eq!(clog2(0), 0);
        assert_eq!(clog2(1), 0);
        assert_eq!(clog2(2), 1);
        assert_eq!(clog2(3), 2);
        assert_eq!(clog2(4), 2);
        assert_eq!(clog2(256), 8);
        assert_eq!(clog2(257), 9);
    }

    #[test]
    fn eval_context_defaults() {
        let ectx = EvalContext::new();
        assert!(!ectx.quiet);
        assert!(ectx.frames.is_empty());
        let q = EvalContext::quiet();
        assert!(q.quiet);
    }
}
