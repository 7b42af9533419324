//! The symbol graph: every named or unnamed semantic entity in a design.
//!
//! Symbols live in one append-only arena owned by the
//! [`Compilation`](crate::compilation::Compilation); parent/child links
//! are [`SymbolId`]s. Each symbol has a common header (kind, optional
//! name, declaration span, parent link, declaration-order index) plus
//! kind-specific payload.

use crate::const_value::ConstantValue;
use crate::drivers::Driver;
use crate::expr::Expression;
use crate::lazy::Lazy;
use crate::scope::ScopeData;
use crate::stmt::Statement;
use crate::types::TypeId;
use serde::{Deserialize, Serialize};
use veris_common::Ident;
use veris_source::Span;
use veris_syntax as ast;

/// Opaque, copyable ID for a symbol in the compilation's symbol arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Opaque ID for a definition (module/interface/program blueprint).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DefinitionId(u32);

impl DefinitionId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Variable storage lifetime after defaulting rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableLifetime {
    /// Static storage.
    Static,
    /// Automatic (per-activation) storage.
    Automatic,
}

/// Data shared by every symbol that has a declared type and can be
/// assigned to.
#[derive(Debug)]
pub struct ValueData<'s> {
    /// The resolved type; forced lazily from `type_syntax`.
    pub ty: Lazy<TypeId>,
    /// The declared type syntax, if the symbol came from source.
    pub type_syntax: Option<&'s ast::TypeSpec>,
    /// Unpacked dimensions following the declarator name.
    pub unpacked_dims: &'s [ast::Dimension],
    /// The initializer syntax, if any.
    pub initializer: Option<&'s ast::Expr>,
    /// Drivers recorded against this symbol, in elaboration order.
    pub drivers: Vec<Driver>,
}

impl<'s> ValueData<'s> {
    /// Creates value data with everything unresolved.
    pub fn new(type_syntax: Option<&'s ast::TypeSpec>) -> Self {
        Self {
            ty: Lazy::Unresolved,
            type_syntax,
            unpacked_dims: &[],
            initializer: None,
            drivers: Vec::new(),
        }
    }

    /// Creates value data with a known type.
    pub fn typed(ty: TypeId) -> Self {
        Self {
            ty: Lazy::Resolved(ty),
            type_syntax: None,
            unpacked_dims: &[],
            initializer: None,
            drivers: Vec::new(),
        }
    }
}

/// Payload of a variable symbol (also used for class properties and
/// local assertion variables).
#[derive(Debug)]
pub struct VariableData<'s> {
    /// The common value-symbol data.
    pub value: ValueData<'s>,
    /// Storage lifetime after defaulting.
    pub lifetime: VariableLifetime,
    /// `true` when declared `const`.
    pub is_const: bool,
}

/// Payload of a net symbol.
#[derive(Debug)]
pub struct NetData<'s> {
    /// The common value-symbol data.
    pub value: ValueData<'s>,
    /// The net type keyword.
    pub kind: ast::NetKind,
}

/// Payload of a parameter (or localparam) symbol.
#[derive(Debug)]
pub struct ParameterData<'s> {
    /// The resolved declared type.
    pub ty: Lazy<TypeId>,
    /// The declared type syntax, if explicit.
    pub type_syntax: Option<&'s ast::TypeSpec>,
    /// `true` for `localparam`.
    pub is_local: bool,
    /// `true` when declared in the parameter port list.
    pub is_port: bool,
    /// `true` for type parameters.
    pub is_type: bool,
    /// The default value syntax.
    pub default: Option<&'s ast::Expr>,
    /// The override expression bound at the instantiation site, if any.
    pub override_value: Option<ConstantValue>,
    /// The final evaluated value.
    pub value: Lazy<ConstantValue>,
}

/// Payload of an enum value member symbol.
#[derive(Debug)]
pub struct EnumValueData {
    /// The enum type this value belongs to.
    pub ty: TypeId,
    /// The member's value.
    pub value: ConstantValue,
}

/// Payload of a specparam symbol.
#[derive(Debug)]
pub struct SpecparamData<'s> {
    /// The value expression syntax.
    pub expr: &'s ast::Expr,
    /// The evaluated value.
    pub value: Lazy<ConstantValue>,
}

/// Payload of a subroutine formal argument.
#[derive(Debug)]
pub struct FormalArgData<'s> {
    /// The common value-symbol data.
    pub value: ValueData<'s>,
    /// The argument direction.
    pub direction: ast::Direction,
    /// The default value syntax, if any.
    pub default: Option<&'s ast::Expr>,
}

/// Payload of a typedef symbol.
#[derive(Debug)]
pub struct TypeAliasData<'s> {
    /// The aliased type syntax.
    pub syntax: &'s ast::TypeSpec,
    /// The resolved alias type.
    pub ty: Lazy<TypeId>,
}

/// Payload of an instance symbol.
#[derive(Debug)]
pub struct InstanceData<'s> {
    /// The instantiated definition.
    pub definition: DefinitionId,
    /// The instance body scope.
    pub scope: ScopeData<'s>,
    /// The final parameter values, in parameter declaration order.
    pub parameters: Vec<(Ident, ConstantValue)>,
}

/// Payload of a procedural block symbol.
#[derive(Debug)]
pub struct ProceduralData<'s> {
    /// Which flavor of procedural block.
    pub kind: ast::ProceduralKind,
    /// The body syntax.
    pub body: &'s ast::Stmt,
    /// Scope for block-local declarations.
    pub scope: ScopeData<'s>,
    /// The bound body, set by force-elaboration.
    pub bound: Lazy<Statement>,
}

/// Payload of a continuous-assign symbol.
#[derive(Debug)]
pub struct AssignData<'s> {
    /// The assign item syntax.
    pub syntax: &'s ast::ContinuousAssign,
    /// The bound assignment expressions, set by force-elaboration.
    pub bound: Lazy<Vec<Expression>>,
}

/// Payload of a subroutine symbol.
#[derive(Debug)]
pub struct SubroutineData<'s> {
    /// Function or task.
    pub kind: ast::SubroutineKind,
    /// Default lifetime for locals and arguments.
    pub lifetime: VariableLifetime,
    /// The declaration syntax.
    pub syntax: &'s ast::SubroutineDecl,
    /// The subroutine's lexical scope (arguments and locals).
    pub scope: ScopeData<'s>,
    /// The formal argument symbols, in declaration order.
    pub args: Vec<SymbolId>,
    /// The resolved return type.
    pub return_ty: Lazy<TypeId>,
    /// `true` for class constructors (`function new`).
    pub is_constructor: bool,
    /// The bound body statements, bound on first constant call or at
    /// force-elaboration.
    pub bound: Lazy<Vec<Statement>>,
}

/// Payload of a class symbol.
#[derive(Debug)]
pub struct ClassData<'s> {
    /// The declaration syntax.
    pub syntax: &'s ast::ClassDecl,
    /// The class body scope.
    pub scope: ScopeData<'s>,
    /// The class handle type.
    pub ty: TypeId,
}

/// Which flavor of assertion declaration a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionDeclKind {
    /// `sequence`
    Sequence,
    /// `property`
    Property,
    /// `let`
    Let,
}

/// Payload of a sequence, property, or let declaration symbol.
#[derive(Debug)]
pub struct AssertionDeclData<'s> {
    /// Which flavor this is.
    pub kind: AssertionDeclKind,
    /// The declaration syntax.
    pub syntax: &'s ast::AssertionDecl,
    /// Scope holding the formal port symbols.
    pub scope: ScopeData<'s>,
    /// The formal port symbols, in declaration order.
    pub ports: Vec<SymbolId>,
}

/// Payload of a covergroup symbol.
#[derive(Debug)]
pub struct CovergroupData<'s> {
    /// The declaration syntax.
    pub syntax: &'s ast::CovergroupDecl,
    /// The covergroup body scope (coverpoints and crosses).
    pub scope: ScopeData<'s>,
    /// The covergroup instance type.
    pub ty: TypeId,
}

/// Payload of a coverpoint symbol.
#[derive(Debug)]
pub struct CoverpointData<'s> {
    /// The declaration syntax.
    pub syntax: &'s ast::CoverpointDecl,
    /// The coverpoint scope (bins).
    pub scope: ScopeData<'s>,
    /// The bound `iff` guard, if present.
    pub iff: Lazy<Option<Expression>>,
}

/// Payload of a cover cross symbol.
#[derive(Debug)]
pub struct CoverCrossData<'s> {
    /// The declaration syntax.
    pub syntax: &'s ast::CoverCrossDecl,
    /// The resolved coverpoint targets.
    pub targets: Lazy<Vec<SymbolId>>,
}

/// Resolution result of one coverage bin.
#[derive(Debug)]
pub struct ResolvedBin {
    /// The bound `iff` guard, if present.
    pub iff: Option<Expression>,
    /// The bound value/range list.
    pub values: Vec<Expression>,
    /// The bound transition lists.
    pub transitions: Vec<Vec<Expression>>,
    /// The bound `with` filter, if present.
    pub with_filter: Option<Expression>,
}

/// Payload of a coverage bin symbol.
#[derive(Debug)]
pub struct CoverageBinData<'s> {
    /// The declaration syntax.
    pub syntax: &'s ast::BinsDecl,
    /// The resolution cell: `Resolving` while binding the bin's
    /// expressions, observing which indicates a cycle.
    pub resolved: Lazy<ResolvedBin>,
}

/// Payload of a clocking block symbol.
#[derive(Debug)]
pub struct ClockingData<'s> {
    /// The declaration syntax.
    pub syntax: &'s ast::ClockingDecl,
    /// The clocking block scope (clock variables).
    pub scope: ScopeData<'s>,
    /// `true` for `global clocking`.
    pub is_global: bool,
    /// The bound clocking event.
    pub event: Lazy<Expression>,
}

/// Payload of a clock variable symbol.
#[derive(Debug)]
pub struct ClockVarData {
    /// Signal direction from the testbench's point of view.
    pub direction: ast::Direction,
    /// The resolved type (linked from the underlying signal).
    pub ty: Lazy<TypeId>,
    /// The underlying signal in the enclosing scope, when resolved.
    pub target: Option<SymbolId>,
    /// Drivers recorded against this clock variable.
    pub drivers: Vec<Driver>,
}

/// Payload of an import symbol (wildcard or explicit).
#[derive(Debug)]
pub struct ImportData {
    /// The imported package name.
    pub package: Ident,
    /// The imported member name; `None` for wildcard imports.
    pub name: Option<Ident>,
}

/// Payload of a genvar symbol.
#[derive(Debug)]
pub struct GenvarData {
    /// The current loop value while expanding a generate loop.
    pub value: Option<ConstantValue>,
}

/// An attribute value attached to a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name.
    pub name: Ident,
    /// The attribute value; defaults to `1'b1` when the source omits it.
    pub value: ConstantValue,
    /// The attribute's source span.
    pub span: Span,
}

/// The tagged payload of a symbol.
#[derive(Debug)]
pub enum SymbolKind<'s> {
    /// The design root holding all top-level instances.
    Root(ScopeData<'s>),
    /// One syntax tree's compilation-unit scope (`$unit`).
    CompilationUnit(ScopeData<'s>),
    /// A package.
    Package(ScopeData<'s>),
    /// An instance of a definition.
    Instance(InstanceData<'s>),
    /// An expanded generate block.
    GenerateBlock(ScopeData<'s>),
    /// A named statement block.
    StatementBlock(ScopeData<'s>),
    /// A procedural block.
    ProceduralBlock(ProceduralData<'s>),
    /// A continuous assignment item.
    ContinuousAssign(AssignData<'s>),
    /// A function or task.
    Subroutine(SubroutineData<'s>),
    /// A class declaration.
    Class(ClassData<'s>),
    /// A parameter or localparam.
    Parameter(ParameterData<'s>),
    /// An enum member value.
    EnumValue(EnumValueData),
    /// A specparam.
    Specparam(SpecparamData<'s>),
    /// A variable (or class property).
    Variable(VariableData<'s>),
    /// A net.
    Net(NetData<'s>),
    /// A subroutine formal argument.
    FormalArgument(FormalArgData<'s>),
    /// A genvar.
    Genvar(GenvarData),
    /// A typedef.
    TypeAlias(TypeAliasData<'s>),
    /// A sequence declaration.
    Sequence(AssertionDeclData<'s>),
    /// A property declaration.
    Property(AssertionDeclData<'s>),
    /// A let declaration.
    Let(AssertionDeclData<'s>),
    /// An assertion formal port (non-local).
    AssertionPort(ValueData<'s>),
    /// A local assertion variable (or local-var formal port).
    LocalAssertionVar(VariableData<'s>),
    /// A covergroup declaration.
    Covergroup(CovergroupData<'s>),
    /// A coverpoint.
    Coverpoint(CoverpointData<'s>),
    /// A cover cross.
    CoverCross(CoverCrossData<'s>),
    /// A coverage bin.
    CoverageBin(CoverageBinData<'s>),
    /// A clocking block.
    ClockingBlock(ClockingData<'s>),
    /// A clock variable inside a clocking block.
    ClockVar(ClockVarData),
    /// A wildcard package import.
    WildcardImport(ImportData),
    /// An explicit package import.
    ExplicitImport(ImportData),
}

/// A semantic entity: common header plus kind-specific payload.
#[derive(Debug)]
pub struct Symbol<'s> {
    /// This symbol's id in the compilation's arena.
    pub id: SymbolId,
    /// The symbol's name; `None` for unnamed entities (procedural
    /// blocks, continuous assigns, anonymous generate blocks).
    pub name: Option<Ident>,
    /// The declaration location.
    pub span: Span,
    /// The owning scope symbol; `None` only for the root and
    /// compilation units.
    pub parent: Option<SymbolId>,
    /// Declaration-order index within the parent scope.
    pub index: u32,
    /// The kind-specific payload.
    pub kind: SymbolKind<'s>,
}

impl<'s> Symbol<'s> {
    /// Returns this symbol's scope storage, if it is a scope.
    pub fn scope(&self) -> Option<&ScopeData<'s>> {
        match &self.kind {
            SymbolKind::Root(s)
            | SymbolKind::CompilationUnit(s)
            | SymbolKind::Package(s)
            | SymbolKind::GenerateBlock(s)
            | SymbolKind::StatementBlock(s) => Some(s),
            SymbolKind::Instance(data) => Some(&data.scope),
            SymbolKind::ProceduralBlock(data) => Some(&data.scope),
            SymbolKind::Subroutine(data) => Some(&data.scope),
            SymbolKind::Class(data) => Some(&data.scope),
            SymbolKind::Sequence(data)
            | SymbolKind::Property(data)
            | SymbolKind::Let(data) => Some(&data.scope),
            SymbolKind::Covergroup(data) => Some(&data.scope),
            SymbolKind::Coverpoint(data) => Some(&data.scope),
            SymbolKind::ClockingBlock(data) => Some(&data.scope),
            _ => None,
        }
    }

    /// Returns this symbol's scope storage mutably, if it is a scope.
    pub fn scope_mut(&mut self) -> Option<&mut ScopeData<'s>> {
        match &mut self.kind {
            SymbolKind::Root(s)
            | SymbolKind::CompilationUnit(s)
            | SymbolKind::Package(s)
            | SymbolKind::GenerateBlock(s)
            | SymbolKind::StatementBlock(s) => Some(s),
            SymbolKind::Instance(data) => Some(&mut data.scope),
            SymbolKind::ProceduralBlock(data) => Some(&mut data.scope),
            SymbolKind::Subroutine(data) => Some(&mut data.scope),
            SymbolKind::Class(data) => Some(&mut data.scope),
            SymbolKind::Sequence(data)
            | SymbolKind::Property(data)
            | SymbolKind::Let(data) => Some(&mut data.scope),
            SymbolKind::Covergroup(data) => Some(&mut data.scope),
            SymbolKind::Coverpoint(data) => Some(&mut data.scope),
            SymbolKind::ClockingBlock(data) => Some(&mut data.scope),
            _ => None,
        }
    }

    /// Returns `true` if this symbol can be the target of an assignment
    /// or carries a declared type (the "value symbol" family).
    pub fn is_value_symbol(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Variable(_)
                | SymbolKind::Net(_)
                | SymbolKind::Parameter(_)
                | SymbolKind::EnumValue(_)
                | SymbolKind::Specparam(_)
                | SymbolKind::FormalArgument(_)
                | SymbolKind::AssertionPort(_)
                | SymbolKind::LocalAssertionVar(_)
                | SymbolKind::ClockVar(_)
                | SymbolKind::Genvar(_)
        )
    }

    /// Returns the driver list of this symbol, if it can be driven.
    pub fn drivers(&self) -> Option<&Vec<Driver>> {
        match &self.kind {
            SymbolKind::Variable(v) | SymbolKind::LocalAssertionVar(v) => Some(&v.value.drivers),
            SymbolKind::Net(n) => Some(&n.value.drivers),
            SymbolKind::FormalArgument(a) => Some(&a.value.drivers),
            SymbolKind::AssertionPort(v) => Some(&v.drivers),
            SymbolKind::ClockVar(c) => Some(&c.drivers),
            _ => None,
        }
    }

    /// Returns the driver list of this symbol mutably, if it can be
    /// driven.
    pub fn drivers_mut(&mut self) -> Option<&mut Vec<Driver>> {
        match &mut self.kind {
            SymbolKind::Variable(v) | SymbolKind::LocalAssertionVar(v) => {
                Some(&mut v.value.drivers)
            }
            SymbolKind::Net(n) => Some(&mut n.value.drivers),
            SymbolKind::FormalArgument(a) => Some(&mut a.value.drivers),
            SymbolKind::AssertionPort(v) => Some(&mut v.drivers),
            SymbolKind::ClockVar(c) => Some(&mut c.drivers),
            _ => None,
        }
    }

    /// A short human-readable description of the symbol kind for
    /// diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SymbolKind::Root(_) => "design root",
            SymbolKind::CompilationUnit(_) => "compilation unit",
            SymbolKind::Package(_) => "package",
            SymbolKind::Instance(_) => "instance",
            SymbolKind::GenerateBlock(_) => "generate block",
            SymbolKind::StatementBlock(_) => "statement block",
            SymbolKind::ProceduralBlock(_) => "procedural block",
            SymbolKind::ContinuousAssign(_) => "continuous assignment",
            SymbolKind::Subroutine(_) => "subroutine",
            SymbolKind::Class(_) => "class",
            SymbolKind::Parameter(_) => "parameter",
            SymbolKind::EnumValue(_) => "enum value",
            SymbolKind::Specparam(_) => "specparam",
            SymbolKind::Variable(_) => "variable",
            SymbolKind::Net(_) => "net",
            SymbolKind::FormalArgument(_) => "formal argument",
            SymbolKind::Genvar(_) => "genvar",
            SymbolKind::TypeAlias(_) => "typedef",
            SymbolKind::Sequence(_) => "sequence",
            SymbolKind::Property(_) => "property",
            SymbolKind::Let(_) => "let declaration",
            SymbolKind::AssertionPort(_) => "assertion port",
            SymbolKind::LocalAssertionVar(_) => "local variable",
            SymbolKind::Covergroup(_) => "covergroup",
            SymbolKind::Coverpoint(_) => "coverpoint",
            SymbolKind::CoverCross(_) => "cross",
            SymbolKind::CoverageBin(_) => "coverage bin",
            SymbolKind::ClockingBlock(_) => "clocking block",
            SymbolKind::ClockVar(_) => "clock variable",
            SymbolKind::WildcardImport(_) => "wildcard import",
            SymbolKind::ExplicitImport(_) => "import",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(kind: SymbolKind<'_>) -> Symbol<'_> {
        Symbol {
            id: SymbolId::from_raw(0),
            name: None,
            span: Span::DUMMY,
            parent: None,
            index: 0,
            kind,
        }
    }

    #[test]
    fn scope_accessor() {
        let sym = header(SymbolKind::Package(ScopeData::new()));
        assert!(sym.scope().is_some());
        let sym = header(SymbolKind::Genvar(GenvarData { value: None }));
        assert!(sym.scope().is_none());
    }

    #[test]
    fn value_symbol_family() {
        let var = header(SymbolKind::Variable(VariableData {
            value: ValueData::typed(crate::types::TypeDb::INT),
            lifetime: VariableLifetime::Static,
            is_const: false,
        }));
        assert!(var.is_value_symbol());
        assert!(var.drivers().unwrap().is_empty());

        let pkg = header(SymbolKind::Package(ScopeData::new()));
        assert!(!pkg.is_value_symbol());
        assert!(pkg.drivers().is_none());
    }

    #[test]
    fn kind_names() {
        let sym = header(SymbolKind::Root(ScopeData::new()));
        assert_eq!(sym.kind_name(), "design root");
    }
}
