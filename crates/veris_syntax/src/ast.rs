//! AST node types produced by the external SystemVerilog parser.
//!
//! Every node carries a `Span`. Numeric literals keep their source text
//! (`4'b10x0`); the elaboration engine parses them into four-state values
//! so that the syntax layer stays free of semantic types.

use serde::{Deserialize, Serialize};
use veris_common::Ident;
use veris_source::Span;

// ============================================================================
// Top-level
// ============================================================================

/// A complete source file: the compilation-unit contribution of one tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// The top-level items in this file.
    pub items: Vec<Item>,
    /// The span covering the entire file.
    pub span: Span,
}

/// A top-level item in a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    /// A module, interface, or program definition.
    Definition(DefinitionDecl),
    /// A package declaration.
    Package(PackageDecl),
    /// A declaration at compilation-unit scope (goes into `$unit`).
    UnitDecl(ModuleItem),
    /// An error node produced during recovery.
    Error(Span),
}

/// Which kind of design element a [`DefinitionDecl`] declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefinitionKind {
    /// `module ... endmodule`
    Module,
    /// `interface ... endinterface`
    Interface,
    /// `program ... endprogram`
    Program,
}

/// A module, interface, or program declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionDecl {
    /// Which kind of definition this is.
    pub kind: DefinitionKind,
    /// The definition name.
    pub name: Ident,
    /// The ANSI parameter port list.
    pub params: Vec<ParamDecl>,
    /// The ANSI port list.
    pub ports: Vec<PortDecl>,
    /// Items declared inside the body.
    pub items: Vec<ModuleItem>,
    /// Source span of the whole definition.
    pub span: Span,
    /// Span of just the name token (used for definition-keyed diagnostics).
    pub name_span: Span,
}

/// A package declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDecl {
    /// The package name.
    pub name: Ident,
    /// Items declared inside the package.
    pub items: Vec<ModuleItem>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Ports and directions
// ============================================================================

/// Port or argument direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
    /// `ref`
    Ref,
}

/// An ANSI port declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port direction.
    pub direction: Direction,
    /// Whether the port is a net (`wire`) rather than a variable.
    pub is_net: bool,
    /// The declared type.
    pub ty: TypeSpec,
    /// The port name.
    pub name: Ident,
    /// Unpacked dimensions after the name.
    pub unpacked_dims: Vec<Dimension>,
    /// Optional default value for unconnected instances.
    pub default: Option<Expr>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Module items
// ============================================================================

/// An item inside a definition, package, generate block, or `$unit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleItem {
    /// A `parameter` or `localparam` declaration.
    Parameter(ParamDecl),
    /// A `typedef` declaration.
    Typedef(TypedefDecl),
    /// A variable declaration.
    Variable(VarDecl),
    /// A net declaration.
    Net(NetDecl),
    /// A `specparam` declaration.
    Specparam(SpecparamDecl),
    /// A genvar declaration.
    Genvar(GenvarDecl),
    /// A continuous `assign`.
    ContinuousAssign(ContinuousAssign),
    /// A procedural block (`always*`, `initial`, `final`).
    Procedural(ProceduralBlock),
    /// A module/interface/program instantiation.
    Instantiation(Instantiation),
    /// A `defparam` override.
    Defparam(Defparam),
    /// A `bind` directive.
    Bind(BindDirective),
    /// A generate `if`/`for`/`begin` construct.
    Generate(GenerateConstruct),
    /// A package import (`import p::*;` or `import p::x;`).
    Import(ImportDecl),
    /// A function or task declaration (possibly out-of-block, declared
    /// with a `class::` scope).
    Subroutine(SubroutineDecl),
    /// A class declaration.
    Class(ClassDecl),
    /// A `sequence` declaration.
    Sequence(AssertionDecl),
    /// A `property` declaration.
    Property(AssertionDecl),
    /// A `let` declaration.
    Let(AssertionDecl),
    /// A `covergroup` declaration.
    Covergroup(CovergroupDecl),
    /// A clocking block declaration.
    Clocking(ClockingDecl),
    /// A `default clocking c;` reference.
    DefaultClocking(DefaultClockingRef),
    /// A `default disable iff (...)` declaration.
    DefaultDisable(DefaultDisableDecl),
    /// An `export "DPI-C"` directive.
    DpiExport(DpiExport),
    /// An error node produced during recovery.
    Error(Span),
}

/// A parameter or localparam declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// `true` for `localparam`.
    pub local: bool,
    /// `true` for `parameter type`.
    pub is_type: bool,
    /// The declared type, if explicit.
    pub ty: Option<TypeSpec>,
    /// The parameter name.
    pub name: Ident,
    /// The default/initial value expression (or a type for type params).
    pub default: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// A typedef declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedefDecl {
    /// The aliased type.
    pub ty: TypeSpec,
    /// The new type name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

/// Variable storage lifetime keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifetime {
    /// `static`
    Static,
    /// `automatic`
    Automatic,
}

/// A variable declaration (one type, one or more declarators).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    /// `true` when declared `const`.
    pub is_const: bool,
    /// Explicit lifetime keyword, if any.
    pub lifetime: Option<Lifetime>,
    /// The declared type.
    pub ty: TypeSpec,
    /// The declared names.
    pub declarators: Vec<Declarator>,
    /// Source span.
    pub span: Span,
}

/// One name within a variable or net declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declarator {
    /// The declared name.
    pub name: Ident,
    /// Unpacked dimensions after the name.
    pub dims: Vec<Dimension>,
    /// Optional initializer.
    pub init: Option<Expr>,
    /// Span of the name token.
    pub span: Span,
}

/// Net type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetKind {
    /// `wire`
    Wire,
    /// `tri`
    Tri,
    /// `wand`
    Wand,
    /// `wor`
    Wor,
    /// `triand`
    TriAnd,
    /// `trior`
    TriOr,
    /// `tri0`
    Tri0,
    /// `tri1`
    Tri1,
    /// `trireg`
    TriReg,
    /// `uwire` — at most one driver.
    Uwire,
    /// `supply0`
    Supply0,
    /// `supply1`
    Supply1,
}

/// A net declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetDecl {
    /// The net type keyword.
    pub kind: NetKind,
    /// The data type portion (packed dimensions, signing).
    pub ty: TypeSpec,
    /// The declared names.
    pub declarators: Vec<Declarator>,
    /// Source span.
    pub span: Span,
}

/// A `specparam` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecparamDecl {
    /// The specparam name.
    pub name: Ident,
    /// The value expression.
    pub value: Expr,
    /// Source span.
    pub span: Span,
}

/// A genvar declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenvarDecl {
    /// The declared genvar names.
    pub names: Vec<Ident>,
    /// Source span.
    pub span: Span,
}

/// One `lhs = rhs` inside a continuous assign item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignExpr {
    /// The assignment target.
    pub lhs: Expr,
    /// The driven value.
    pub rhs: Expr,
    /// Source span.
    pub span: Span,
}

/// A continuous `assign` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// The assignments in this item.
    pub assignments: Vec<AssignExpr>,
    /// Source span.
    pub span: Span,
}

/// The kind of a procedural block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProceduralKind {
    /// `initial`
    Initial,
    /// `final`
    Final,
    /// `always`
    Always,
    /// `always_comb`
    AlwaysComb,
    /// `always_latch`
    AlwaysLatch,
    /// `always_ff`
    AlwaysFf,
}

/// A procedural block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceduralBlock {
    /// The block kind.
    pub kind: ProceduralKind,
    /// The body statement.
    pub body: Stmt,
    /// Source span.
    pub span: Span,
}

/// A parameter assignment in an instantiation (`#(...)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamAssignment {
    /// The parameter name for named assignments; `None` when ordered.
    pub name: Option<Ident>,
    /// The assigned expression.
    pub expr: Expr,
    /// Source span.
    pub span: Span,
}

/// A port connection in an instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConnection {
    /// The port name for named connections; `None` when ordered.
    pub name: Option<Ident>,
    /// The connected expression; `None` for explicitly empty connections.
    pub expr: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// One instance within an instantiation item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceBody {
    /// The instance name.
    pub name: Ident,
    /// The port connections.
    pub connections: Vec<PortConnection>,
    /// Source span.
    pub span: Span,
}

/// An instantiation item: `mod #(...) u1 (...), u2 (...);`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instantiation {
    /// The name of the definition being instantiated.
    pub module: Ident,
    /// Parameter value assignments.
    pub param_assignments: Vec<ParamAssignment>,
    /// The declared instances.
    pub instances: Vec<InstanceBody>,
    /// Source span.
    pub span: Span,
}

/// A `defparam path.to.param = value;` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defparam {
    /// The hierarchical path naming the target parameter.
    pub target: Vec<Ident>,
    /// The override value expression.
    pub value: Expr,
    /// Source span.
    pub span: Span,
}

/// A `bind target_def instantiation;` directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindDirective {
    /// The definition into whose instances the bind injects.
    pub target: Ident,
    /// The instantiation to inject.
    pub instantiation: Instantiation,
    /// Source span (the directive's identity for seen-tracking).
    pub span: Span,
}

/// A generate construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GenerateConstruct {
    /// `if (cond) ... else ...`
    If {
        /// The compile-time condition.
        cond: Expr,
        /// Items instantiated when the condition is true.
        then_items: Vec<ModuleItem>,
        /// Items instantiated when the condition is false.
        else_items: Vec<ModuleItem>,
        /// Source span.
        span: Span,
    },
    /// `for (genvar = init; cond; step) begin : label ... end`
    For {
        /// The loop genvar name.
        genvar: Ident,
        /// The initial value expression.
        init: Expr,
        /// The loop condition.
        cond: Expr,
        /// The per-iteration increment added to the genvar.
        step: Expr,
        /// The loop body items.
        body: Vec<ModuleItem>,
        /// The block label, if any.
        label: Option<Ident>,
        /// Source span.
        span: Span,
    },
    /// A labeled `begin ... end` generate block.
    Block {
        /// The block label, if any.
        label: Option<Ident>,
        /// The block items.
        items: Vec<ModuleItem>,
        /// Source span.
        span: Span,
    },
}

/// A package import item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    /// The imported package.
    pub package: Ident,
    /// The imported name, or `None` for a wildcard (`::*`).
    pub name: Option<Ident>,
    /// Source span.
    pub span: Span,
}

/// Subroutine kind keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubroutineKind {
    /// `function`
    Function,
    /// `task`
    Task,
}

/// A formal argument of a subroutine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubroutineArg {
    /// Argument direction.
    pub direction: Direction,
    /// The declared type.
    pub ty: TypeSpec,
    /// The argument name.
    pub name: Ident,
    /// Optional default value.
    pub default: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// A function or task declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubroutineDecl {
    /// Function or task.
    pub kind: SubroutineKind,
    /// Default lifetime for locals.
    pub lifetime: Option<Lifetime>,
    /// For out-of-block declarations, the class the member belongs to.
    pub class_scope: Option<Ident>,
    /// The subroutine name.
    pub name: Ident,
    /// The return type (functions only; `None` means `void` or task).
    pub return_ty: Option<TypeSpec>,
    /// The formal arguments.
    pub args: Vec<SubroutineArg>,
    /// The body statements.
    pub body: Vec<Stmt>,
    /// Source span.
    pub span: Span,
}

/// A class member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassItem {
    /// A class property (data member).
    Property(VarDecl),
    /// An in-body method.
    Method(SubroutineDecl),
    /// An `extern` method prototype, fleshed out by an out-of-block
    /// declaration elsewhere.
    MethodPrototype {
        /// Function or task.
        kind: SubroutineKind,
        /// The method name.
        name: Ident,
        /// Source span.
        span: Span,
    },
}

/// A class declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    /// The class name.
    pub name: Ident,
    /// The class members.
    pub items: Vec<ClassItem>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Assertion declarations
// ============================================================================

/// Direction of a sequence/property local-variable formal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalVarDirection {
    /// `local input`
    Input,
    /// `local output`
    Output,
    /// `local inout`
    InOut,
}

/// A formal port of a sequence, property, or let declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionPort {
    /// Set when the port is a `local` variable formal.
    pub local_direction: Option<LocalVarDirection>,
    /// The declared type, if explicit (untyped otherwise).
    pub ty: Option<TypeSpec>,
    /// The port name.
    pub name: Ident,
    /// Optional default actual.
    pub default: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// A `sequence`, `property`, or `let` declaration (which of the three is
/// determined by the enclosing [`ModuleItem`] variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionDecl {
    /// The declaration name.
    pub name: Ident,
    /// The formal port list.
    pub ports: Vec<AssertionPort>,
    /// The body expression.
    pub body: Expr,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Coverage
// ============================================================================

/// The kind of a bins declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinsKind {
    /// `bins`
    Bins,
    /// `illegal_bins`
    IllegalBins,
    /// `ignore_bins`
    IgnoreBins,
}

/// An inclusive value range `[low:high]`, or a single value when `high`
/// is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRange {
    /// The low bound (or the single value).
    pub low: Expr,
    /// The high bound, for ranges.
    pub high: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// The value set of a bins declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BinsValues {
    /// An explicit list of values and ranges.
    List(Vec<ValueRange>),
    /// A list of value transitions (`(a => b => c)` sequences).
    Transitions(Vec<Vec<Expr>>),
    /// `default`
    Default,
    /// A value list filtered by a `with (...)` expression.
    WithFilter {
        /// The underlying values.
        values: Vec<ValueRange>,
        /// The filter expression.
        filter: Expr,
    },
}

/// A bins declaration inside a coverpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinsDecl {
    /// Which kind of bins.
    pub kind: BinsKind,
    /// The bins name.
    pub name: Ident,
    /// `true` for array bins (`bins b[] = ...`).
    pub is_array: bool,
    /// The value set.
    pub values: BinsValues,
    /// Optional `iff` guard.
    pub iff: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// A coverpoint declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverpointDecl {
    /// The coverpoint label, if any.
    pub label: Option<Ident>,
    /// The covered expression.
    pub expr: Expr,
    /// Optional `iff` guard.
    pub iff: Option<Expr>,
    /// The bins declarations.
    pub bins: Vec<BinsDecl>,
    /// Source span.
    pub span: Span,
}

/// A cross declaration inside a covergroup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverCrossDecl {
    /// The cross label, if any.
    pub label: Option<Ident>,
    /// The crossed coverpoint names.
    pub targets: Vec<Ident>,
    /// Optional `iff` guard.
    pub iff: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// An item inside a covergroup body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CovergroupItem {
    /// A coverpoint.
    Coverpoint(CoverpointDecl),
    /// A cross.
    Cross(CoverCrossDecl),
}

/// A covergroup declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CovergroupDecl {
    /// The covergroup name.
    pub name: Ident,
    /// Optional sampling event.
    pub event: Option<Expr>,
    /// The body items.
    pub items: Vec<CovergroupItem>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Clocking
// ============================================================================

/// A clock variable declaration line inside a clocking block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockingItem {
    /// The signal direction from the testbench's point of view.
    pub direction: Direction,
    /// The declared clock variable names.
    pub names: Vec<Ident>,
    /// Source span.
    pub span: Span,
}

/// A clocking block declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockingDecl {
    /// The clocking block name.
    pub name: Ident,
    /// `true` for `global clocking`.
    pub is_global: bool,
    /// The clocking event.
    pub event: Expr,
    /// The clock variable items.
    pub items: Vec<ClockingItem>,
    /// Source span.
    pub span: Span,
}

/// A `default clocking c;` reference item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultClockingRef {
    /// The referenced clocking block name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

/// A `default disable iff (expr);` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultDisableDecl {
    /// The disable condition.
    pub expr: Expr,
    /// Source span.
    pub span: Span,
}

/// An `export "DPI-C" [c_name =] function f;` directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpiExport {
    /// The exported C name; defaults to the subroutine name.
    pub c_name: Option<Ident>,
    /// The exported subroutine.
    pub subroutine: Ident,
    /// `true` for `function`, `false` for `task`.
    pub is_function: bool,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

/// The kind of a procedural assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignKind {
    /// Blocking (`=`).
    Blocking,
    /// Non-blocking (`<=`).
    NonBlocking,
}

/// Edge specifier in an event control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// No edge keyword.
    None,
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
}

/// A statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// A `begin ... end` block.
    Block {
        /// The block label, if any.
        label: Option<Ident>,
        /// The contained statements.
        stmts: Vec<Stmt>,
        /// Source span.
        span: Span,
    },
    /// A procedural assignment.
    Assign {
        /// The assignment target.
        lhs: Expr,
        /// The assigned value.
        rhs: Expr,
        /// Blocking or non-blocking.
        kind: AssignKind,
        /// Source span.
        span: Span,
    },
    /// A bare expression statement (e.g. a task call).
    ExprStmt {
        /// The expression.
        expr: Expr,
        /// Source span.
        span: Span,
    },
    /// An `if`/`else` statement.
    If {
        /// The condition.
        cond: Expr,
        /// The then branch.
        then_stmt: Box<Stmt>,
        /// The optional else branch.
        else_stmt: Option<Box<Stmt>>,
        /// Source span.
        span: Span,
    },
    /// A `while` loop.
    While {
        /// The loop condition.
        cond: Expr,
        /// The loop body.
        body: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// A statement guarded by an event control (`@(posedge clk) ...`).
    Timed {
        /// The edge specifier.
        edge: EdgeKind,
        /// The event expression.
        event: Expr,
        /// The guarded statement.
        stmt: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// A block-local variable declaration.
    VarDecl(VarDecl),
    /// A `return` statement.
    Return {
        /// The returned value, if any.
        expr: Option<Expr>,
        /// Source span.
        span: Span,
    },
    /// An error node produced during recovery.
    Error(Span),
}

// ============================================================================
// Types
// ============================================================================

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKeyword {
    /// `bit` — 1-bit two-state.
    Bit,
    /// `logic` — 1-bit four-state.
    Logic,
    /// `reg` — 1-bit four-state (Verilog legacy).
    Reg,
    /// `byte` — 8-bit two-state signed.
    Byte,
    /// `shortint` — 16-bit two-state signed.
    ShortInt,
    /// `int` — 32-bit two-state signed.
    Int,
    /// `longint` — 64-bit two-state signed.
    LongInt,
    /// `integer` — 32-bit four-state signed.
    Integer,
    /// `time` — 64-bit four-state unsigned.
    Time,
    /// `real`
    Real,
    /// `shortreal`
    Shortreal,
    /// `string`
    String,
    /// `void`
    Void,
    /// `chandle`
    Chandle,
    /// `event`
    Event,
}

/// A packed or unpacked dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Dimension {
    /// A `[left:right]` range.
    Range {
        /// The left (usually MSB) bound.
        left: Expr,
        /// The right (usually LSB) bound.
        right: Expr,
        /// Source span.
        span: Span,
    },
    /// A `[]` dynamic-array dimension.
    Dynamic {
        /// Source span.
        span: Span,
    },
    /// A `[index_type]` associative-array dimension.
    Associative {
        /// The index type.
        index: Box<TypeSpec>,
        /// Source span.
        span: Span,
    },
    /// A `[$]` or `[$:bound]` queue dimension.
    Queue {
        /// The optional maximum bound.
        bound: Option<Expr>,
        /// Source span.
        span: Span,
    },
}

/// One member of an enum type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMember {
    /// The member name.
    pub name: Ident,
    /// The explicit value, if any.
    pub value: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// One member of a struct or union type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructMember {
    /// The member type.
    pub ty: TypeSpec,
    /// The member name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

/// A type as written in source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeSpec {
    /// No explicit type keyword, only optional signing and packed
    /// dimensions (`input [7:0] x`).
    Implicit {
        /// `true` when declared `signed`.
        signed: bool,
        /// The packed dimensions.
        packed_dims: Vec<Dimension>,
        /// Source span.
        span: Span,
    },
    /// A built-in type keyword with optional signing override and packed
    /// dimensions.
    Keyword {
        /// The type keyword.
        keyword: TypeKeyword,
        /// Explicit `signed`/`unsigned` override.
        signed: Option<bool>,
        /// The packed dimensions.
        packed_dims: Vec<Dimension>,
        /// Source span.
        span: Span,
    },
    /// A reference to a named (typedef'd or class) type.
    Named {
        /// The type name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A package-qualified named type.
    ScopedNamed {
        /// The package name.
        package: Ident,
        /// The type name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// An enum type definition.
    Enum {
        /// The base type; `int` when absent.
        base: Option<Box<TypeSpec>>,
        /// The members, in declaration order.
        members: Vec<EnumMember>,
        /// Source span.
        span: Span,
    },
    /// A struct type definition.
    Struct {
        /// `true` for `struct packed`.
        packed: bool,
        /// `true` for packed-signed.
        signed: bool,
        /// The members.
        members: Vec<StructMember>,
        /// Source span.
        span: Span,
    },
    /// A union type definition.
    Union {
        /// `true` for `union packed`.
        packed: bool,
        /// `true` for `union tagged`.
        tagged: bool,
        /// The members.
        members: Vec<StructMember>,
        /// Source span.
        span: Span,
    },
}

impl TypeSpec {
    /// Returns the source span of this type.
    pub fn span(&self) -> Span {
        match self {
            TypeSpec::Implicit { span, .. }
            | TypeSpec::Keyword { span, .. }
            | TypeSpec::Named { span, .. }
            | TypeSpec::ScopedNamed { span, .. }
            | TypeSpec::Enum { span, .. }
            | TypeSpec::Struct { span, .. }
            | TypeSpec::Union { span, .. } => *span,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Unary plus (`+`).
    Plus,
    /// Arithmetic negation (`-`).
    Minus,
    /// Bitwise NOT (`~`).
    Not,
    /// Logical NOT (`!`).
    LogicNot,
    /// Reduction AND (`&`).
    RedAnd,
    /// Reduction OR (`|`).
    RedOr,
    /// Reduction XOR (`^`).
    RedXor,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
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

/// The mode of a range select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeSelectMode {
    /// `[left:right]`
    Simple,
    /// `[base +: width]`
    IndexedUp,
    /// `[base -: width]`
    IndexedDown,
}

/// The target of a call expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CallTarget {
    /// A simple subroutine, sequence, property, or let name.
    Name(Ident),
    /// A package-qualified name.
    Scoped {
        /// The package name.
        package: Ident,
        /// The called name.
        name: Ident,
    },
    /// A system function (`$clog2`, ...).
    System(Ident),
}

/// One argument in a call or assertion-instance argument list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallArg {
    /// The formal name for named arguments; `None` when ordered.
    pub name: Option<Ident>,
    /// The actual expression; `None` for explicitly empty arguments
    /// (`f(, x)` or `.a()`).
    pub expr: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// Weight attachment mode in a dist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistWeightKind {
    /// `:=` — the weight applies to every value in the range.
    PerValue,
    /// `:/` — the weight is divided across the range.
    PerRange,
}

/// One item of a `dist` expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistItem {
    /// The value or range.
    pub range: ValueRange,
    /// The optional weight.
    pub weight: Option<(DistWeightKind, Expr)>,
    /// Source span.
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// An integer literal kept as source text (`42`, `8'hFF`, `4'b10x0`).
    Number {
        /// The literal text.
        text: String,
        /// Source span.
        span: Span,
    },
    /// A real literal.
    RealLit {
        /// The value.
        value: f64,
        /// Source span.
        span: Span,
    },
    /// A string literal.
    StringLit {
        /// The string value (without quotes).
        value: String,
        /// Source span.
        span: Span,
    },
    /// The unbounded literal `$`.
    Unbounded {
        /// Source span.
        span: Span,
    },
    /// A simple identifier reference.
    Ident {
        /// The referenced name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A package-qualified reference (`pkg::name`).
    Scoped {
        /// The package name.
        package: Ident,
        /// The referenced name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A dotted hierarchical reference (`top.u1.sig`).
    Hierarchical {
        /// The path segments.
        parts: Vec<Ident>,
        /// Source span.
        span: Span,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        left: Box<Expr>,
        /// The right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A conditional (`cond ? a : b`).
    Ternary {
        /// The condition.
        cond: Box<Expr>,
        /// The true branch.
        then_expr: Box<Expr>,
        /// The false branch.
        else_expr: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A concatenation.
    Concat {
        /// The concatenated elements, MSB first.
        elements: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// A replication (`{count{inner}}`).
    Replication {
        /// The replication count.
        count: Box<Expr>,
        /// The replicated expression.
        inner: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// An element select (`value[index]`).
    Index {
        /// The selected value.
        value: Box<Expr>,
        /// The index expression.
        index: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A range select (`value[left:right]`).
    RangeSel {
        /// The selected value.
        value: Box<Expr>,
        /// The left bound or base.
        left: Box<Expr>,
        /// The right bound or width.
        right: Box<Expr>,
        /// The select mode.
        mode: RangeSelectMode,
        /// Source span.
        span: Span,
    },
    /// A member access (`value.member`).
    Member {
        /// The accessed value.
        value: Box<Expr>,
        /// The member name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A call of a subroutine, sequence, property, let, or system
    /// function.
    Call {
        /// The call target.
        target: CallTarget,
        /// The arguments.
        args: Vec<CallArg>,
        /// Source span.
        span: Span,
    },
    /// A min:typ:max triplet (`min : typ : max`).
    MinTypMax {
        /// The minimum branch.
        min: Box<Expr>,
        /// The typical branch.
        typ: Box<Expr>,
        /// The maximum branch.
        max: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A `dist` constraint expression.
    Dist {
        /// The constrained expression.
        value: Box<Expr>,
        /// The weighted ranges.
        items: Vec<DistItem>,
        /// Source span.
        span: Span,
    },
    /// A tagged union value (`tagged Member [expr]`).
    TaggedUnion {
        /// The selected member name.
        member: Ident,
        /// The member value; required unless the member type is void.
        value: Option<Box<Expr>>,
        /// Source span.
        span: Span,
    },
    /// A cast (`ty'(expr)`).
    Cast {
        /// The target type.
        ty: TypeSpec,
        /// The cast operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A type used in expression position (`type(int)` reference or a
    /// type actual to a parameter).
    TypeRef {
        /// The referenced type.
        ty: TypeSpec,
        /// Source span.
        span: Span,
    },
    /// An event expression (`posedge clk`).
    EventExpr {
        /// The edge specifier.
        edge: EdgeKind,
        /// The signal expression.
        expr: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A parenthesized expression.
    Paren {
        /// The inner expression.
        inner: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// An error node produced during recovery.
    Error(Span),
}

impl Expr {
    /// Returns the source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::RealLit { span, .. }
            | Expr::StringLit { span, .. }
            | Expr::Unbounded { span }
            | Expr::Ident { span, .. }
            | Expr::Scoped { span, .. }
            | Expr::Hierarchical { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Concat { span, .. }
            | Expr::Replication { span, .. }
            | Expr::Index { span, .. }
            | Expr::RangeSel { span, .. }
            | Expr::Member { span, .. }
            | Expr::Call { span, .. }
            | Expr::MinTypMax { span, .. }
            | Expr::Dist { span, .. }
            | Expr::TaggedUnion { span, .. }
            | Expr::Cast { span, .. }
            | Expr::TypeRef { span, .. }
            | Expr::EventExpr { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Error(span) => *span,
        }
    }
}

impl Stmt {
    /// Returns the source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::ExprStmt { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Timed { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Error(span) => *span,
            Stmt::VarDecl(decl) => decl.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expr_span_accessor() {
        let span = Span::new(veris_source::FileId::from_raw(0), 3, 7);
        let e = Expr::Number {
            text: "4'b1010".to_string(),
            span,
        };
        assert_eq!(e.span(), span);
    }

    #[test]
    fn stmt_span_accessor() {
        let span = Span::new(veris_source::FileId::from_raw(0), 0, 5);
        let s = Stmt::Return { expr: None, span };
        assert_eq!(s.span(), span);
    }

    #[test]
    fn type_spec_span_accessor() {
        let span = Span::new(veris_source::FileId::from_raw(0), 1, 4);
        let t = TypeSpec::Keyword {
            keyword: TypeKeyword::Int,
            signed: None,
            packed_dims: Vec::new(),
            span,
        };
        assert_eq!(t.span(), span);
    }

    #[test]
    fn serde_roundtrip_expr() {
        let e = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Number {
                text: "1".to_string(),
                span: Span::DUMMY,
            }),
            right: Box::new(Expr::Number {
                text: "2".to_string(),
                span: Span::DUMMY,
            }),
            span: Span::DUMMY,
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Expr::Binary { op: BinaryOp::Add, .. }));
    }
}
