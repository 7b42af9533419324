//! Diagnostic codes and constructor helpers for elaboration.
//!
//! Error codes `E300`--`E359` cover semantic failures; warning codes
//! `W300`--`W309` cover non-fatal issues; note codes `N001`--`N009` are
//! sub-diagnostics attached to other messages. Severity is always
//! derived from the code category.

use veris_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use veris_source::Span;

macro_rules! codes {
    ($($(#[$meta:meta])* $name:ident = ($cat:ident, $num:expr);)*) => {
        $(
            $(#[$meta])*
            pub const $name: DiagnosticCode = DiagnosticCode::new(Category::$cat, $num);
        )*
    };
}

codes! {
    /// Duplicate definition name.
    E300 = (Error, 300);
    /// Duplicate member name within a scope.
    E301 = (Error, 301);
    /// Instantiation of an unknown definition.
    E302 = (Error, 302);
    /// Reference to an undeclared identifier.
    E303 = (Error, 303);
    /// Name used before its declaration.
    E304 = (Error, 304);
    /// Name does not refer to a type.
    E305 = (Error, 305);
    /// Assignment type mismatch.
    E306 = (Error, 306);
    /// Invalid cast.
    E307 = (Error, 307);
    /// Instance depth budget exceeded.
    E308 = (Error, 308);
    /// Generate step budget exceeded.
    E309 = (Error, 309);
    /// Constant evaluation call depth exceeded.
    E310 = (Error, 310);
    /// Constant evaluation step budget exceeded.
    E311 = (Error, 311);
    /// Reference to a non-constant value in a constant expression.
    E312 = (Error, 312);
    /// Hierarchical name in a constant expression.
    E313 = (Error, 313);
    /// Assignment to a const variable.
    E314 = (Error, 314);
    /// Expression is not assignable.
    E315 = (Error, 315);
    /// Multiple continuous drivers on one signal.
    E316 = (Error, 316);
    /// `always_comb` signal driven by another process.
    E317 = (Error, 317);
    /// Non-blocking assignment to an automatic variable.
    E318 = (Error, 318);
    /// Procedural assignment to a net.
    E319 = (Error, 319);
    /// `uwire` driven more than once or connected inout.
    E320 = (Error, 320);
    /// Write to an input clock variable.
    E321 = (Error, 321);
    /// Clock variable in an assignment concatenation.
    E322 = (Error, 322);
    /// Blocking assignment to a clock variable.
    E323 = (Error, 323);
    /// Recursive sequence or let declaration.
    E324 = (Error, 324);
    /// Assertion-instance argument mismatch.
    E325 = (Error, 325);
    /// Local-variable formal requires a local-variable actual.
    E326 = (Error, 326);
    /// Invalid tagged-union expression.
    E327 = (Error, 327);
    /// Defparam resolution did not converge.
    E328 = (Error, 328);
    /// Cycle while resolving a coverage bin.
    E329 = (Error, 329);
    /// Net initializer inside a package.
    E330 = (Error, 330);
    /// `automatic` keyword outside a procedural context.
    E331 = (Error, 331);
    /// Implicitly static variable with an initializer needs `static`.
    E332 = (Error, 332);
    /// Const variable missing its initializer.
    E333 = (Error, 333);
    /// Unknown package.
    E334 = (Error, 334);
    /// Unknown member of a package.
    E335 = (Error, 335);
    /// Unknown definition referenced by a bind directive.
    E336 = (Error, 336);
    /// DPI export names an unknown subroutine.
    E337 = (Error, 337);
    /// Duplicate DPI export C name.
    E338 = (Error, 338);
    /// Error limit exceeded; elaboration short-circuited.
    E339 = (Error, 339);
    /// Override of a local parameter.
    E340 = (Error, 340);
    /// Bad port connection in an instantiation.
    E341 = (Error, 341);
    /// Default clocking does not name a clocking block.
    E342 = (Error, 342);
    /// Multiple default clocking or default disable in one scope.
    E343 = (Error, 343);
    /// Duplicate enum member value.
    E344 = (Error, 344);
    /// Unbounded literal used outside a queue context.
    E345 = (Error, 345);
    /// `dist` applied to a non-integral expression.
    E346 = (Error, 346);
    /// `chandle` value in an assertion expression.
    E347 = (Error, 347);
    /// Recursive property reference in an illegal position.
    E348 = (Error, 348);
    /// Malformed parameter override string.
    E349 = (Error, 349);
    /// Cyclic typedef.
    E350 = (Error, 350);
    /// Constant select out of range.
    E351 = (Error, 351);
    /// Unknown struct or union member.
    E352 = (Error, 352);
    /// Call argument mismatch.
    E353 = (Error, 353);
    /// Constant function references a name outside its body.
    E354 = (Error, 354);
    /// Assertion formal type must be int, shortint, or longint here.
    E355 = (Error, 355);
    /// Reference to an automatic variable in a static context.
    E356 = (Error, 356);
    /// Reentrant coverage-bin resolution.
    E357 = (Error, 357);
    /// Division by zero in a constant expression.
    E358 = (Error, 358);
    /// Invalid genvar or generate loop expression.
    E359 = (Error, 359);
    /// Symbol referenced where a value is required.
    E360 = (Error, 360);

    /// Definition is never instantiated.
    W300 = (Warning, 300);
    /// Duplicate attribute name; last one wins.
    W301 = (Warning, 301);
    /// Out-of-block declaration never matched a prototype.
    W302 = (Warning, 302);
    /// Implicit width truncation in an assignment.
    W303 = (Warning, 303);

    /// "declared here"
    N001 = (Note, 1);
    /// "previous definition here"
    N002 = (Note, 2);
    /// "did you mean ...?"
    N003 = (Note, 3);
    /// "expanded from here"
    N004 = (Note, 4);
    /// "during constant evaluation of call"
    N005 = (Note, 5);
    /// "first driver here"
    N006 = (Note, 6);
}

/// Duplicate definition at `span`, previously defined at `prev`.
pub fn duplicate_definition(name: &str, span: Span, prev: Span) -> Diagnostic {
    Diagnostic::new(E300, format!("duplicate definition `{name}`"), span)
        .with_note(N002, "previous definition here", prev)
}

/// Duplicate member name within one scope.
pub fn duplicate_member(name: &str, span: Span, prev: Span) -> Diagnostic {
    Diagnostic::new(E301, format!("`{name}` is already declared in this scope"), span)
        .with_note(N001, "previously declared here", prev)
}

/// Instantiation of a definition that does not exist.
pub fn unknown_definition(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E302, format!("unknown module `{name}`"), span)
        .with_help("check that the module is declared in one of the compiled files")
}

/// Reference to an undeclared identifier, optionally with a typo
/// suggestion.
pub fn undeclared_identifier(name: &str, span: Span, suggestion: Option<(&str, Span)>) -> Diagnostic {
    let diag = Diagnostic::new(E303, format!("use of undeclared identifier `{name}`"), span);
    match suggestion {
        Some((candidate, decl_span)) => {
            diag.with_note(N003, format!("did you mean `{candidate}`?"), decl_span)
        }
        None => diag,
    }
}

/// Name used lexically before its declaration.
pub fn used_before_declared(name: &str, span: Span, decl: Span) -> Diagnostic {
    Diagnostic::new(E304, format!("`{name}` is used before its declaration"), span)
        .with_note(N001, "declared here", decl)
}

/// A name that should be a type is not one.
pub fn not_a_type(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E305, format!("`{name}` does not name a type"), span)
}

/// Assignment between incompatible types.
pub fn type_mismatch(target: &str, source: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E306,
        format!("cannot assign value of type {source} to target of type {target}"),
        span,
    )
}

/// Cast between incompatible types.
pub fn bad_cast(target: &str, source: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E307, format!("cannot cast {source} to {target}"), span)
}

/// The instance-depth budget was exhausted.
pub fn instance_depth_exceeded(limit: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        E308,
        format!("instance hierarchy exceeds maximum depth of {limit}"),
        span,
    )
    .with_help("check for unbounded recursive instantiation")
}

/// The generate-step budget was exhausted.
pub fn generate_steps_exceeded(limit: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        E309,
        format!("generate expansion exceeds maximum of {limit} steps"),
        span,
    )
}

/// The constant-evaluation depth budget was exhausted.
pub fn const_eval_depth_exceeded(limit: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        E310,
        format!("constant function call depth exceeds maximum of {limit}"),
        span,
    )
}

/// The constant-evaluation step budget was exhausted.
pub fn const_eval_steps_exceeded(limit: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        E311,
        format!("constant expression evaluation exceeds maximum of {limit} steps"),
        span,
    )
}

/// A constant expression referenced something that is not constant.
pub fn const_eval_non_const(what: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E312,
        format!("reference to {what} is not allowed in a constant expression"),
        span,
    )
}

/// A hierarchical name appeared in a constant expression.
pub fn const_eval_hierarchical(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E313,
        format!("hierarchical name `{name}` is not allowed in a constant expression"),
        span,
    )
}

/// Assignment to a const variable outside the constructor special case.
pub fn assignment_to_const(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E314, format!("cannot assign to const variable `{name}`"), span)
}

/// The expression cannot be assigned to.
pub fn not_an_lvalue(span: Span) -> Diagnostic {
    Diagnostic::new(E315, "expression is not assignable", span)
}

/// Two continuous drivers target the same signal.
pub fn multiple_continuous_drivers(name: &str, span: Span, first: Span) -> Diagnostic {
    Diagnostic::new(
        E316,
        format!("cannot have multiple continuous drivers for net or variable `{name}`"),
        span,
    )
    .with_note(N006, "first driver here", first)
}

/// A signal driven by an `always_comb` is also driven elsewhere.
pub fn mixed_comb_drivers(name: &str, span: Span, first: Span) -> Diagnostic {
    Diagnostic::new(
        E317,
        format!("variable `{name}` driven by an always_comb cannot be written by any other process"),
        span,
    )
    .with_note(N006, "always_comb driver here", first)
}

/// Non-blocking assignment to an automatic variable.
pub fn nonblocking_on_automatic(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E318,
        format!("non-blocking assignment to automatic variable `{name}`"),
        span,
    )
}

/// Procedural assignment targeting a net.
pub fn procedural_assign_to_net(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E319,
        format!("net `{name}` cannot be assigned in a procedural context"),
        span,
    )
    .with_help("use a continuous assignment")
}

/// A `uwire` has more than one driver or is connected inout.
pub fn uwire_violation(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E320, format!("uwire `{name}` permits only a single driver"), span)
}

/// Write to an input clock variable.
pub fn clock_var_input_write(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E321,
        format!("clock variable `{name}` is an input and cannot be written"),
        span,
    )
}

/// Clock variable used inside an assignment concatenation.
pub fn clock_var_in_concat(span: Span) -> Diagnostic {
    Diagnostic::new(E322, "clock variables are not allowed in assignment concatenations", span)
}

/// Blocking assignment to a clock variable.
pub fn clock_var_blocking(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E323,
        format!("clock variable `{name}` must be written with a non-blocking assignment"),
        span,
    )
}

/// Recursive sequence or let expansion.
pub fn recursive_assertion_decl(kind: &str, name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E324, format!("recursive {kind} `{name}` is not allowed"), span)
}

/// Assertion-instance argument list problem.
pub fn assertion_arg_mismatch(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E325, msg.to_string(), span)
}

/// Output/inout local formal bound to a non-local actual.
pub fn local_formal_needs_local_actual(formal: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E326,
        format!("actual for local variable formal `{formal}` must be a local variable"),
        span,
    )
}

/// Problems with tagged-union expressions.
pub fn tagged_union_error(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E327, msg.to_string(), span)
}

/// Defparam fixed point did not converge within the budget.
pub fn defparam_no_converge(limit: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        E328,
        format!("defparam resolution did not converge after {limit} iterations"),
        span,
    )
}

/// A coverage bin's resolution depends on itself.
pub fn coverage_bin_cycle(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E329, format!("coverage bin `{name}` depends on itself"), span)
}

/// A net declared inside a package has an initializer.
pub fn package_net_init(span: Span) -> Diagnostic {
    Diagnostic::new(E330, "nets inside packages cannot have initializers", span)
}

/// `automatic` used where only static lifetime is allowed.
pub fn automatic_not_allowed(span: Span) -> Diagnostic {
    Diagnostic::new(E331, "automatic variables are not allowed in this context", span)
}

/// An implicitly static variable with an initializer in procedural code.
pub fn static_initializer_must_be_explicit(span: Span) -> Diagnostic {
    Diagnostic::new(
        E332,
        "initializing an implicitly static variable requires an explicit `static` keyword",
        span,
    )
}

/// A const variable declared without an initializer.
pub fn const_var_no_initializer(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E333, format!("const variable `{name}` requires an initializer"), span)
}

/// Reference to an unknown package.
pub fn unknown_package(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E334, format!("unknown package `{name}`"), span)
}

/// Reference to a name a package does not export.
pub fn unknown_package_member(package: &str, name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E335,
        format!("package `{package}` has no member named `{name}`"),
        span,
    )
}

/// Bind directive targeting an unknown definition.
pub fn bind_unknown_target(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E336, format!("bind directive targets unknown definition `{name}`"), span)
}

/// DPI export of an unknown subroutine.
pub fn dpi_export_unknown(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E337, format!("DPI export names unknown subroutine `{name}`"), span)
}

/// Two DPI exports share a C name.
pub fn dpi_duplicate_c_name(name: &str, span: Span, prev: Span) -> Diagnostic {
    Diagnostic::new(E338, format!("duplicate DPI export C name `{name}`"), span)
        .with_note(N002, "previous export here", prev)
}

/// The error limit was hit; elaboration stopped early.
pub fn error_limit_exceeded(limit: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        E339,
        format!("too many errors emitted, stopping now (limit {limit})"),
        span,
    )
}

/// Attempt to override a localparam.
pub fn local_param_override(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E340, format!("cannot override local parameter `{name}`"), span)
}

/// A bad port connection.
pub fn port_connection_error(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E341, msg.to_string(), span)
}

/// Default clocking reference that is not a clocking block.
pub fn not_a_clocking_block(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E342, format!("`{name}` is not a clocking block"), span)
}

/// More than one default clocking/disable in a scope.
pub fn multiple_defaults(what: &str, span: Span, prev: Span) -> Diagnostic {
    Diagnostic::new(E343, format!("multiple default {what} declarations in this scope"), span)
        .with_note(N002, "previous declaration here", prev)
}

/// Two enum members share a value.
pub fn enum_value_duplicate(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E344, format!("enum member `{name}` duplicates an earlier value"), span)
}

/// `$` outside a queue or assertion bound context.
pub fn unbounded_not_allowed(span: Span) -> Diagnostic {
    Diagnostic::new(E345, "the unbounded literal `$` is not allowed here", span)
}

/// `dist` over a non-integral expression.
pub fn dist_not_integral(span: Span) -> Diagnostic {
    Diagnostic::new(E346, "dist expressions require an integral left-hand side", span)
}

/// `chandle` used in an assertion expression.
pub fn chandle_in_assertion(span: Span) -> Diagnostic {
    Diagnostic::new(E347, "chandle values cannot appear in assertion expressions", span)
}

/// Recursive property instantiation in an illegal position.
pub fn recursive_property_position(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E348,
        format!("recursive reference to property `{name}` is not in a legal position"),
        span,
    )
}

/// A `name=value` override string that does not parse.
pub fn bad_param_override(text: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E349, format!("malformed parameter override `{text}`"), span)
        .with_help("expected the form name=value")
}

/// A typedef that resolves through itself.
pub fn typedef_cycle(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E350, format!("typedef `{name}` depends on itself"), span)
}

/// A constant select index is outside the target's bounds.
pub fn select_out_of_range(span: Span) -> Diagnostic {
    Diagnostic::new(E351, "constant select is out of range", span)
}

/// Struct/union member access that does not exist.
pub fn unknown_member(name: &str, ty: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E352, format!("no member `{name}` in {ty}"), span)
}

/// Call arguments do not match the formals.
pub fn call_arg_mismatch(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E353, msg.to_string(), span)
}

/// A constant function referenced a name outside its lexical body.
pub fn const_function_outside_ref(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E354,
        format!("constant function cannot reference `{name}` declared outside the function"),
        span,
    )
}

/// Assertion formal used in a delay/repetition position has a bad type.
pub fn assertion_formal_bad_type(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E355,
        format!("formal `{name}` must be int, shortint, or longint in this position"),
        span,
    )
}

/// Automatic variable referenced where only static values are allowed.
pub fn automatic_ref_not_allowed(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        E356,
        format!("reference to automatic variable `{name}` is not allowed here"),
        span,
    )
}

/// Division by zero during constant evaluation.
pub fn const_eval_div_by_zero(span: Span) -> Diagnostic {
    Diagnostic::new(E358, "division by zero in constant expression", span)
}

/// A generate loop whose control expressions cannot be evaluated.
pub fn bad_generate_loop(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E359, msg.to_string(), span)
}

/// A symbol that is not a value was referenced in a value position.
pub fn not_a_value(name: &str, kind: &str, span: Span) -> Diagnostic {
    Diagnostic::new(E360, format!("cannot reference {kind} `{name}` as a value"), span)
}

/// Packed dimensions applied to a non-integral base.
pub fn packed_dims_non_integral(span: Span) -> Diagnostic {
    Diagnostic::new(E305, "packed dimensions require an integral element type", span)
}

/// A type reference in a position that does not allow one.
pub fn type_ref_not_allowed(span: Span) -> Diagnostic {
    Diagnostic::new(E305, "a type is not allowed in this position", span)
}

/// A definition that is never instantiated.
pub fn unused_definition(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(W300, format!("definition `{name}` is never instantiated"), span)
}

/// Duplicate attribute name on one node.
pub fn duplicate_attribute(name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(W301, format!("duplicate attribute `{name}`; the last value wins"), span)
}

/// An out-of-block declaration that never matched a prototype.
pub fn unused_out_of_block(class: &str, member: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        W302,
        format!("out-of-block declaration of `{class}::{member}` matches no prototype"),
        span,
    )
}

/// Implicit truncation in an assignment.
pub fn implicit_truncation(target_width: u32, source_width: u32, span: Span) -> Diagnostic {
    Diagnostic::new(
        W303,
        format!("implicit conversion truncates from {source_width} to {target_width} bits"),
        span,
    )
}

/// Attaches a "declared here" label to any diagnostic.
pub fn with_declared_here(diag: Diagnostic, span: Span) -> Diagnostic {
    diag.with_label(Label::secondary(span, "declared here"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veris_diagnostics::Severity;

    #[test]
    fn code_formats() {
        assert_eq!(format!("{E300}"), "E300");
        assert_eq!(format!("{W300}"), "W300");
        assert_eq!(format!("{N003}"), "N003");
    }

    #[test]
    fn severities_follow_category() {
        assert_eq!(E314.severity(), Severity::Error);
        assert_eq!(W301.severity(), Severity::Warning);
        assert_eq!(N001.severity(), Severity::Note);
    }

    #[test]
    fn undeclared_with_suggestion() {
        let d = undeclared_identifier("cuonter", Span::DUMMY, Some(("counter", Span::DUMMY)));
        assert_eq!(d.code, E303);
        assert_eq!(d.notes.len(), 1);
        assert!(d.notes[0].message.contains("counter"));
    }

    #[test]
    fn undeclared_without_suggestion() {
        let d = undeclared_identifier("x", Span::DUMMY, None);
        assert!(d.notes.is_empty());
    }

    #[test]
    fn driver_diagnostics_carry_first_driver_note() {
        let d = multiple_continuous_drivers("w", Span::DUMMY, Span::DUMMY);
        assert_eq!(d.code, E316);
        assert_eq!(d.notes[0].code, N006);
    }

    #[test]
    fn const_messages() {
        assert_eq!(assignment_to_const("x", Span::DUMMY).code, E314);
        assert_eq!(const_var_no_initializer("x", Span::DUMMY).code, E333);
        assert_eq!(const_eval_hierarchical("top.p", Span::DUMMY).code, E313);
    }
}
