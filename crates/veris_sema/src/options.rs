//! Configuration options for a compilation.

use serde::{Deserialize, Serialize};

/// Which branch of a `min:typ:max` expression is live in this
/// compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinTypMax {
    /// The minimum branch.
    Min,
    /// The typical branch.
    Typ,
    /// The maximum branch.
    Max,
}

/// Options controlling elaboration limits and language behavior.
///
/// All numeric limits are budgets: exhausting one produces a diagnostic
/// and cleanly aborts the affected sub-task, leaving the compilation in a
/// consistent, queryable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationOptions {
    /// The deepest allowed chain of nested instances.
    pub max_instance_depth: u32,
    /// The maximum number of steps in one generate expansion.
    pub max_generate_steps: u32,
    /// The deepest allowed constant-function call chain.
    pub max_constexpr_depth: u32,
    /// The maximum number of steps in one constant evaluation.
    pub max_constexpr_steps: u32,
    /// How many frames of the constant call stack diagnostics show.
    pub max_constexpr_backtrace: u32,
    /// How many iterations the defparam resolver may take to converge.
    pub max_def_param_steps: u32,
    /// Elaboration short-circuits after this many distinct errors.
    pub error_limit: u32,
    /// The maximum number of typo-correction suggestions per compilation.
    pub typo_correction_limit: u32,
    /// Which branch of `a:b:c` expressions is live.
    pub min_typ_max: MinTypMax,
    /// Allow hierarchical names inside constant expressions.
    pub allow_hierarchical_const: bool,
    /// Allow implicit integral-to-enum conversions in assignments.
    pub relax_enum_conversions: bool,
    /// Permit an `initial` driver alongside an `always_comb` driver.
    pub allow_dup_initial_drivers: bool,
    /// Treat any two continuous drivers of one symbol as a conflict,
    /// even when their static prefixes select disjoint elements.
    pub strict_driver_checking: bool,
    /// Suppress errors that require a complete design (unknown modules,
    /// unresolved hierarchical paths).
    pub lint_mode: bool,
    /// Silence unused-symbol diagnostics.
    pub suppress_unused: bool,
    /// Explicit top-level module names; inferred when empty.
    pub top_modules: Vec<String>,
    /// `name=value` overrides applied to top-level parameters.
    pub param_overrides: Vec<String>,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_instance_depth: 128,
            max_generate_steps: 131_072,
            max_constexpr_depth: 128,
            max_constexpr_steps: 100_000,
            max_constexpr_backtrace: 10,
            max_def_param_steps: 128,
            error_limit: 64,
            typo_correction_limit: 32,
            min_typ_max: MinTypMax::Typ,
            allow_hierarchical_const: false,
            relax_enum_conversions: false,
            allow_dup_initial_drivers: false,
            strict_driver_checking: false,
            lint_mode: false,
            suppress_unused: true,
            top_modules: Vec::new(),
            param_overrides: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let opts = CompilationOptions::default();
        assert_eq!(opts.max_instance_depth, 128);
        assert_eq!(opts.max_generate_steps, 131_072);
        assert_eq!(opts.max_constexpr_depth, 128);
        assert_eq!(opts.max_constexpr_steps, 100_000);
        assert_eq!(opts.max_constexpr_backtrace, 10);
        assert_eq!(opts.max_def_param_steps, 128);
        assert_eq!(opts.error_limit, 64);
        assert_eq!(opts.typo_correction_limit, 32);
        assert_eq!(opts.min_typ_max, MinTypMax::Typ);
        assert!(!opts.allow_hierarchical_const);
        assert!(opts.suppress_unused);
        assert!(opts.top_modules.is_empty());
    }
}
