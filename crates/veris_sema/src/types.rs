//! The semantic type system: interned types, built-in singletons, and the
//! compatibility relations.
//!
//! All types live in a [`TypeDb`] owned by the compilation and are
//! referenced by [`TypeId`]. Built-in types are preallocated singletons;
//! packed vector types are cached by their shape so structurally
//! identical integrals share one id. Enum, struct, union, and class types
//! are never merged — each carries a process-unique system id issued by
//! the database.

use crate::lazy::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use veris_common::{Ident, LogicVec};

/// Opaque, copyable ID for an interned type in the [`TypeDb`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// One member of an enum type: name and value in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberType {
    /// The member name.
    pub name: Ident,
    /// The member's value, in the enum's base type.
    pub value: LogicVec,
}

/// One field of a struct or union type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldType {
    /// The field name.
    pub name: Ident,
    /// The field type.
    pub ty: TypeId,
}

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    /// The singleton error type; compatible with everything to stop
    /// cascading diagnostics.
    Error,
    /// `void`
    Void,
    /// The type of the `null` literal.
    Null,
    /// The type of the unbounded literal `$`.
    Unbounded,
    /// The `untyped` formal-argument type; accepts any actual.
    Untyped,
    /// The type of a type reference expression.
    TypeRef,
    /// `string`
    Str,
    /// `chandle`
    Chandle,
    /// `event`
    Event,
    /// `real`
    Real,
    /// `shortreal`
    Shortreal,
    /// The type of a sequence expression.
    Sequence,
    /// The type of a property expression.
    Property,
    /// A packed integral type: scalars, vectors, and the built-in
    /// integer atoms all share this shape.
    Integral {
        /// Total packed bit width.
        width: u32,
        /// Whether arithmetic on this type is signed.
        signed: bool,
        /// `true` for four-state (`logic`), `false` for two-state (`bit`).
        four_state: bool,
        /// `true` for the legacy `reg` keyword flavor.
        is_reg: bool,
    },
    /// An enum type. Canonicalization preserves enum identity.
    Enum {
        /// The declared name (empty ident for anonymous enums is not
        /// produced; typedefs name them).
        name: Ident,
        /// The base integral type.
        base: TypeId,
        /// The members in declaration order.
        members: Vec<EnumMemberType>,
        /// Process-unique identity.
        system_id: u32,
    },
    /// A struct type.
    Struct {
        /// `true` for `struct packed`.
        packed: bool,
        /// The fields in declaration order.
        fields: Vec<FieldType>,
        /// Process-unique identity.
        system_id: u32,
    },
    /// A union type.
    Union {
        /// `true` for `union packed`.
        packed: bool,
        /// `true` for `union tagged`.
        tagged: bool,
        /// The members in declaration order.
        fields: Vec<FieldType>,
        /// Process-unique identity.
        system_id: u32,
    },
    /// A fixed-size unpacked array.
    FixedArray {
        /// The element type.
        element: TypeId,
        /// The declared `[left:right]` bounds.
        left: i64,
        /// Right bound.
        right: i64,
    },
    /// A dynamic array (`[]`).
    DynamicArray {
        /// The element type.
        element: TypeId,
    },
    /// An associative array (`[index_type]`).
    AssociativeArray {
        /// The element type.
        element: TypeId,
        /// The index type.
        index: TypeId,
    },
    /// A queue (`[$]` / `[$:bound]`).
    Queue {
        /// The element type.
        element: TypeId,
        /// The optional maximum bound.
        bound: Option<u32>,
    },
    /// A class handle type.
    Class {
        /// The class name.
        name: Ident,
        /// Process-unique identity.
        system_id: u32,
    },
    /// A covergroup instance type.
    Covergroup {
        /// The covergroup name.
        name: Ident,
        /// Process-unique identity.
        system_id: u32,
    },
    /// A named alias created by a typedef; canonicalization strips it.
    Alias {
        /// The typedef name.
        name: Ident,
        /// The aliased type.
        target: TypeId,
    },
}

/// The central type database.
///
/// Owns every [`TypeKind`] in a compilation. Construction of integral
/// types goes through a cache so repeated shapes intern to one id;
/// aggregate types always mint fresh ids (and system ids) because the
/// language gives them identity semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDb {
    types: Vec<TypeKind>,
    #[serde(skip)]
    vector_cache: HashMap<(u32, bool, bool, bool), TypeId>,
    next_system_id: u32,
}

macro_rules! builtin_ids {
    ($($(#[$meta:meta])* $name:ident = $index:expr;)*) => {
        impl TypeDb {
            $(
                $(#[$meta])*
                pub const $name: TypeId = TypeId($index);
            )*
        }
    };
}

builtin_ids! {
    /// The singleton error type.
    ERROR = 0;
    /// `void`
    VOID = 1;
    /// The type of `null`.
    NULL = 2;
    /// The type of the unbounded literal `$`.
    UNBOUNDED = 3;
    /// The `untyped` formal type.
    UNTYPED = 4;
    /// The type of type references.
    TYPE_REF = 5;
    /// `string`
    STRING = 6;
    /// `chandle`
    CHANDLE = 7;
    /// `event`
    EVENT = 8;
    /// `real`
    REAL = 9;
    /// `shortreal`
    SHORTREAL = 10;
    /// The sequence assertion type.
    SEQUENCE = 11;
    /// The property assertion type.
    PROPERTY = 12;
    /// `bit`
    BIT = 13;
    /// `logic`
    LOGIC = 14;
    /// `reg`
    REG = 15;
    /// `byte`
    BYTE = 16;
    /// `shortint`
    SHORT_INT = 17;
    /// `int`
    INT = 18;
    /// `longint`
    LONG_INT = 19;
    /// `integer`
    INTEGER = 20;
    /// `time`
    TIME = 21;
    /// `int unsigned`
    UINT = 22;
}

impl TypeDb {
    /// Creates a database preloaded with the built-in singletons.
    pub fn new() -> Self {
        let mut db = Self {
            types: Vec::new(),
            vector_cache: HashMap::new(),
            next_system_id: 0,
        };
        // Order here must match the `builtin_ids!` table above.
        db.types.push(TypeKind::Error);
        db.types.push(TypeKind::Void);
        db.types.push(TypeKind::Null);
        db.types.push(TypeKind::Unbounded);
        db.types.push(TypeKind::Untyped);
        db.types.push(TypeKind::TypeRef);
        db.types.push(TypeKind::Str);
        db.types.push(TypeKind::Chandle);
        db.types.push(TypeKind::Event);
        db.types.push(TypeKind::Real);
        db.types.push(TypeKind::Shortreal);
        db.types.push(TypeKind::Sequence);
        db.types.push(TypeKind::Property);
        for (width, signed, four_state, is_reg) in [
            (1, false, false, false),  // bit
            (1, false, true, false),   // logic
            (1, false, true, true),    // reg
            (8, true, false, false),   // byte
            (16, true, false, false),  // shortint
            (32, true, false, false),  // int
            (64, true, false, false),  // longint
            (32, true, true, false),   // integer
            (64, false, true, false),  // time
            (32, false, false, false), // int unsigned
        ] {
            let id = TypeId(db.types.len() as u32);
            db.types.push(TypeKind::Integral {
                width,
                signed,
                four_state,
                is_reg,
            });
            db.vector_cache.insert((width, signed, four_state, is_reg), id);
        }
        db
    }

    /// Returns the kind for a type id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this database.
    pub fn get(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the database holds no types (never the case
    /// after construction).
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    fn issue_system_id(&mut self) -> u32 {
        let id = self.next_system_id;
        self.next_system_id += 1;
        id
    }

    /// Looks up the integral scalar for a `(signed, four_state, reg)`
    /// triple. The two two-state `reg` entries are invalid and return
    /// `None`.
    pub fn scalar(&mut self, signed: bool, four_state: bool, is_reg: bool) -> Option<TypeId> {
        if is_reg && !four_state {
            return None;
        }
        Some(self.integral(1, signed, four_state, is_reg))
    }

    /// Returns the packed vector type with the given shape, interning it
    /// on first use.
    pub fn vector(&mut self, width: u32, signed: bool, four_state: bool) -> TypeId {
        self.integral(width, signed, four_state, false)
    }

    /// Returns the integral type with the given shape from the cache,
    /// creating it if needed.
    pub fn integral(&mut self, width: u32, signed: bool, four_state: bool, is_reg: bool) -> TypeId {
        let key = (width, signed, four_state, is_reg);
        if let Some(&id) = self.vector_cache.get(&key) {
            return id;
        }
        let id = self.push(TypeKind::Integral {
            width,
            signed,
            four_state,
            is_reg,
        });
        self.vector_cache.insert(key, id);
        id
    }

    /// Creates a fresh enum type with a new system id.
    pub fn add_enum(&mut self, name: Ident, base: TypeId, members: Vec<EnumMemberType>) -> TypeId {
        let system_id = self.issue_system_id();
        self.push(TypeKind::Enum {
            name,
            base,
            members,
            system_id,
        })
    }

    /// Creates a fresh struct type with a new system id.
    pub fn add_struct(&mut self, packed: bool, fields: Vec<FieldType>) -> TypeId {
        let system_id = self.issue_system_id();
        self.push(TypeKind::Struct {
            packed,
            fields,
            system_id,
        })
    }

    /// Creates a fresh union type with a new system id.
    pub fn add_union(&mut self, packed: bool, tagged: bool, fields: Vec<FieldType>) -> TypeId {
        let system_id = self.issue_system_id();
        self.push(TypeKind::Union {
            packed,
            tagged,
            fields,
            system_id,
        })
    }

    /// Creates a fresh class handle type with a new system id.
    pub fn add_class(&mut self, name: Ident) -> TypeId {
        let system_id = self.issue_system_id();
        self.push(TypeKind::Class { name, system_id })
    }

    /// Creates a fresh covergroup instance type with a new system id.
    pub fn add_covergroup(&mut self, name: Ident) -> TypeId {
        let system_id = self.issue_system_id();
        self.push(TypeKind::Covergroup { name, system_id })
    }

    /// Creates a fixed-size unpacked array type.
    pub fn fixed_array(&mut self, element: TypeId, left: i64, right: i64) -> TypeId {
        self.push(TypeKind::FixedArray {
            element,
            left,
            right,
        })
    }

    /// Creates a dynamic array type.
    pub fn dynamic_array(&mut self, element: TypeId) -> TypeId {
        self.push(TypeKind::DynamicArray { element })
    }

    /// Creates an associative array type.
    pub fn associative_array(&mut self, element: TypeId, index: TypeId) -> TypeId {
        self.push(TypeKind::AssociativeArray { element, index })
    }

    /// Creates a queue type.
    pub fn queue(&mut self, element: TypeId, bound: Option<u32>) -> TypeId {
        self.push(TypeKind::Queue { element, bound })
    }

    /// Creates a named alias for a typedef.
    pub fn alias(&mut self, name: Ident, target: TypeId) -> TypeId {
        self.push(TypeKind::Alias { name, target })
    }

    /// Strips alias links, preserving enum identity (an enum is its own
    /// canonical type even though it has a base).
    pub fn canonical(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        loop {
            match self.get(cur) {
                TypeKind::Alias { target, .. } => cur = *target,
                _ => return cur,
            }
        }
    }

    /// Returns `true` for types that participate in packed integral
    /// arithmetic: plain integrals, enums, and packed structs/unions.
    pub fn is_integral(&self, id: TypeId) -> bool {
        match self.get(self.canonical(id)) {
            TypeKind::Integral { .. } | TypeKind::Enum { .. } => true,
            TypeKind::Struct { packed, .. } | TypeKind::Union { packed, .. } => *packed,
            _ => false,
        }
    }

    /// Returns `true` for the error singleton.
    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.get(self.canonical(id)), TypeKind::Error)
    }

    /// Returns `true` for `real` and `shortreal`.
    pub fn is_floating(&self, id: TypeId) -> bool {
        matches!(
            self.get(self.canonical(id)),
            TypeKind::Real | TypeKind::Shortreal
        )
    }

    /// The packed bit width of an integral-ish type, if it has one.
    pub fn bit_width(&self, id: TypeId) -> Option<u32> {
        match self.get(self.canonical(id)) {
            TypeKind::Integral { width, .. } => Some(*width),
            TypeKind::Enum { base, .. } => self.bit_width(*base),
            TypeKind::Struct { packed: true, fields, .. } => {
                fields.iter().map(|f| self.bit_width(f.ty)).sum()
            }
            TypeKind::Union { packed: true, fields, .. } => fields
                .iter()
                .map(|f| self.bit_width(f.ty))
                .try_fold(0u32, |acc, w| w.map(|w| acc.max(w))),
            _ => None,
        }
    }

    /// Whether an integral-ish type is signed.
    pub fn is_signed(&self, id: TypeId) -> bool {
        match self.get(self.canonical(id)) {
            TypeKind::Integral { signed, .. } => *signed,
            TypeKind::Enum { base, .. } => self.is_signed(*base),
            _ => false,
        }
    }

    /// Whether an integral-ish type carries X/Z state.
    pub fn is_four_state(&self, id: TypeId) -> bool {
        match self.get(self.canonical(id)) {
            TypeKind::Integral { four_state, .. } => *four_state,
            TypeKind::Enum { base, .. } => self.is_four_state(*base),
            TypeKind::Struct { packed: true, fields, .. }
            | TypeKind::Union { packed: true, fields, .. } => {
                fields.iter().any(|f| self.is_four_state(f.ty))
            }
            _ => false,
        }
    }

    /// Type equivalence: the strictest relation. Integrals are
    /// equivalent when width, signedness, and state-ness all match;
    /// enums, structs, unions, and classes only to themselves.
    pub fn equivalent(&self, a: TypeId, b: TypeId) -> bool {
        let (a, b) = (self.canonical(a), self.canonical(b));
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (TypeKind::Error, _) | (_, TypeKind::Error) => true,
            (
                TypeKind::Integral {
                    width: w1,
                    signed: s1,
                    four_state: f1,
                    ..
                },
                TypeKind::Integral {
                    width: w2,
                    signed: s2,
                    four_state: f2,
                    ..
                },
            ) => w1 == w2 && s1 == s2 && f1 == f2,
            (
                TypeKind::FixedArray {
                    element: e1,
                    left: l1,
                    right: r1,
                },
                TypeKind::FixedArray {
                    element: e2,
                    left: l2,
                    right: r2,
                },
            ) => {
                (l1 - r1).abs() == (l2 - r2).abs() && self.equivalent(*e1, *e2)
            }
            (TypeKind::DynamicArray { element: e1 }, TypeKind::DynamicArray { element: e2 }) => {
                self.equivalent(*e1, *e2)
            }
            (
                TypeKind::Queue { element: e1, .. },
                TypeKind::Queue { element: e2, .. },
            ) => self.equivalent(*e1, *e2),
            (
                TypeKind::AssociativeArray {
                    element: e1,
                    index: i1,
                },
                TypeKind::AssociativeArray {
                    element: e2,
                    index: i2,
                },
            ) => self.equivalent(*e1, *e2) && self.equivalent(*i1, *i2),
            _ => false,
        }
    }

    /// Assignment compatibility: `source` may be implicitly converted to
    /// `target` in an assignment-like context.
    ///
    /// Enum targets only accept the same enum here; the binder layers the
    /// `relax_enum_conversions` option on top of this relation.
    pub fn assignment_compatible(&self, target: TypeId, source: TypeId) -> bool {
        let (t, s) = (self.canonical(target), self.canonical(source));
        if self.equivalent(t, s) {
            return true;
        }
        match self.get(t) {
            TypeKind::Error | TypeKind::Untyped => true,
            TypeKind::Void => false,
            TypeKind::Enum { .. } => false,
            TypeKind::Integral { .. } | TypeKind::Struct { packed: true, .. }
            | TypeKind::Union { packed: true, .. } => {
                self.is_integral(s) || self.is_floating(s)
            }
            TypeKind::Real | TypeKind::Shortreal => self.is_integral(s) || self.is_floating(s),
            TypeKind::Str => matches!(self.get(s), TypeKind::Str),
            TypeKind::Class { system_id, .. } => match self.get(s) {
                TypeKind::Null => true,
                TypeKind::Class {
                    system_id: other, ..
                } => system_id == other,
                _ => false,
            },
            TypeKind::Chandle | TypeKind::Event => matches!(self.get(s), TypeKind::Null)
                || self.equivalent(t, s),
            TypeKind::DynamicArray { element } | TypeKind::Queue { element, .. } => {
                match self.get(s) {
                    TypeKind::FixedArray { element: se, .. }
                    | TypeKind::DynamicArray { element: se }
                    | TypeKind::Queue { element: se, .. } => self.equivalent(*element, *se),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Cast compatibility: `source` may be explicitly cast to `target`.
    /// Strictly wider than assignment compatibility; notably enums can be
    /// cast from any integral and integrals from reals.
    pub fn cast_compatible(&self, target: TypeId, source: TypeId) -> bool {
        let (t, s) = (self.canonical(target), self.canonical(source));
        if self.assignment_compatible(t, s) {
            return true;
        }
        match self.get(t) {
            TypeKind::Enum { .. } => self.is_integral(s) || self.is_floating(s),
            TypeKind::Integral { .. } => self.is_integral(s) || self.is_floating(s)
                || matches!(self.get(s), TypeKind::Str),
            TypeKind::Str => self.is_integral(s),
            _ => false,
        }
    }

    /// A human-readable rendering of a type for diagnostics.
    pub fn display(&self, id: TypeId, interner: &veris_common::Interner) -> String {
        match self.get(id) {
            TypeKind::Error => "<error>".into(),
            TypeKind::Void => "void".into(),
            TypeKind::Null => "null".into(),
            TypeKind::Unbounded => "$".into(),
            TypeKind::Untyped => "untyped".into(),
            TypeKind::TypeRef => "type reference".into(),
            TypeKind::Str => "string".into(),
            TypeKind::Chandle => "chandle".into(),
            TypeKind::Event => "event".into(),
            TypeKind::Real => "real".into(),
            TypeKind::Shortreal => "shortreal".into(),
            TypeKind::Sequence => "sequence".into(),
            TypeKind::Property => "property".into(),
            TypeKind::Integral {
                width,
                signed,
                four_state,
                is_reg,
            } => {
                let base = if *is_reg {
                    "reg"
                } else if *four_state {
                    "logic"
                } else {
                    "bit"
                };
                let sign = if *signed { " signed" } else { "" };
                if *width == 1 {
                    format!("{base}{sign}")
                } else {
                    format!("{base}{sign}[{}:0]", width - 1)
                }
            }
            TypeKind::Enum { name, .. } => format!("enum {}", interner.resolve(*name)),
            TypeKind::Struct { packed, .. } => {
                if *packed {
                    "packed struct".into()
                } else {
                    "struct".into()
                }
            }
            TypeKind::Union { packed, tagged, .. } => match (packed, tagged) {
                (true, _) => "packed union".into(),
                (_, true) => "tagged union".into(),
                _ => "union".into(),
            },
            TypeKind::FixedArray {
                element,
                left,
                right,
            } => format!("{}[{left}:{right}]", self.display(*element, interner)),
            TypeKind::DynamicArray { element } => {
                format!("{}[]", self.display(*element, interner))
            }
            TypeKind::AssociativeArray { element, index } => format!(
                "{}[{}]",
                self.display(*element, interner),
                self.display(*index, interner)
            ),
            TypeKind::Queue { element, .. } => format!("{}[$]", self.display(*element, interner)),
            TypeKind::Class { name, .. } => format!("class {}", interner.resolve(*name)),
            TypeKind::Covergroup { name, .. } => {
                format!("covergroup {}", interner.resolve(*name))
            }
            TypeKind::Alias { name, .. } => interner.resolve(*name).to_string(),
        }
    }
}

impl Default for TypeDb {
    fn default() -> Self {
        Self::new()
    }
}

/// A declared type that may still need resolution against syntax.
pub type LazyType = Lazy<TypeId>;

#[cfg(test)]
mod tests {
    use super::*;
    use veris_common::Interner;

    #[test]
    fn builtins_preallocated() {
        let db = TypeDb::new();
        assert!(matches!(db.get(TypeDb::ERROR), TypeKind::Error));
        assert!(matches!(db.get(TypeDb::VOID), TypeKind::Void));
        assert!(matches!(
            db.get(TypeDb::INT),
            TypeKind::Integral {
                width: 32,
                signed: true,
                four_state: false,
                ..
            }
        ));
        assert!(matches!(
            db.get(TypeDb::INTEGER),
            TypeKind::Integral {
                width: 32,
                signed: true,
                four_state: true,
                ..
            }
        ));
        assert!(matches!(
            db.get(TypeDb::TIME),
            TypeKind::Integral { width: 64, .. }
        ));
    }

    #[test]
    fn scalar_table_invalid_entries() {
        let mut db = TypeDb::new();
        // Two-state reg is the invalid corner of the table.
        assert_eq!(db.scalar(false, false, true), None);
        assert_eq!(db.scalar(true, false, true), None);
        assert!(db.scalar(false, true, true).is_some());
        assert_eq!(db.scalar(false, true, false), Some(TypeDb::LOGIC));
        assert_eq!(db.scalar(false, false, false), Some(TypeDb::BIT));
    }

    #[test]
    fn vector_cache_interns() {
        let mut db = TypeDb::new();
        let a = db.vector(8, false, true);
        let b = db.vector(8, false, true);
        assert_eq!(a, b);
        let c = db.vector(8, true, true);
        assert_ne!(a, c);
    }

    #[test]
    fn builtin_shapes_come_from_cache() {
        let mut db = TypeDb::new();
        assert_eq!(db.vector(1, false, true), TypeDb::LOGIC);
        assert_eq!(db.integral(32, true, false, false), TypeDb::INT);
    }

    #[test]
    fn canonical_strips_aliases_not_enums() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        let name = interner.get_or_intern("word_t");
        let vec16 = db.vector(16, false, true);
        let alias = db.alias(name, vec16);
        let alias2 = db.alias(name, alias);
        assert_eq!(db.canonical(alias2), vec16);

        let ename = interner.get_or_intern("state_t");
        let e = db.add_enum(ename, TypeDb::INT, Vec::new());
        assert_eq!(db.canonical(e), e);
    }

    #[test]
    fn system_ids_are_monotone() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        let n = interner.get_or_intern("x");
        let a = db.add_enum(n, TypeDb::INT, Vec::new());
        let b = db.add_struct(false, Vec::new());
        let c = db.add_union(false, true, Vec::new());
        let ids: Vec<u32> = [a, b, c]
            .iter()
            .map(|&t| match db.get(t) {
                TypeKind::Enum { system_id, .. }
                | TypeKind::Struct { system_id, .. }
                | TypeKind::Union { system_id, .. } => *system_id,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn equivalence_of_integrals() {
        let mut db = TypeDb::new();
        let a = db.vector(32, true, false);
        assert!(db.equivalent(a, TypeDb::INT));
        let b = db.vector(32, false, false);
        assert!(!db.equivalent(a, b));
        let c = db.vector(32, true, true);
        assert!(!db.equivalent(a, c));
    }

    #[test]
    fn two_enums_same_shape_not_equivalent() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        let n = interner.get_or_intern("e");
        let a = db.add_enum(n, TypeDb::INT, Vec::new());
        let b = db.add_enum(n, TypeDb::INT, Vec::new());
        assert!(!db.equivalent(a, b));
        assert!(db.equivalent(a, a));
    }

    #[test]
    fn assignment_compat_integral_widening() {
        let mut db = TypeDb::new();
        let w8 = db.vector(8, false, true);
        let w16 = db.vector(16, false, true);
        assert!(db.assignment_compatible(w16, w8));
        assert!(db.assignment_compatible(w8, w16)); // implicit truncation
        assert!(db.assignment_compatible(TypeDb::REAL, w8));
        assert!(db.assignment_compatible(w8, TypeDb::REAL));
    }

    #[test]
    fn enum_target_requires_same_enum() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        let n = interner.get_or_intern("e");
        let e = db.add_enum(n, TypeDb::INT, Vec::new());
        assert!(!db.assignment_compatible(e, TypeDb::INT));
        assert!(db.assignment_compatible(e, e));
        // The enum converts out implicitly.
        assert!(db.assignment_compatible(TypeDb::INT, e));
        // And in, explicitly.
        assert!(db.cast_compatible(e, TypeDb::INT));
    }

    #[test]
    fn void_is_incompatible() {
        let db = TypeDb::new();
        assert!(!db.assignment_compatible(TypeDb::VOID, TypeDb::INT));
        assert!(!db.assignment_compatible(TypeDb::INT, TypeDb::VOID));
        assert!(db.equivalent(TypeDb::VOID, TypeDb::VOID));
    }

    #[test]
    fn error_type_compatible_with_everything() {
        let db = TypeDb::new();
        assert!(db.assignment_compatible(TypeDb::ERROR, TypeDb::STRING));
        assert!(db.assignment_compatible(TypeDb::INT, TypeDb::ERROR));
        assert!(db.equivalent(TypeDb::ERROR, TypeDb::VOID));
    }

    #[test]
    fn class_compat_by_identity_and_null() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        let n = interner.get_or_intern("C");
        let a = db.add_class(n);
        let b = db.add_class(n);
        assert!(db.assignment_compatible(a, a));
        assert!(!db.assignment_compatible(a, b));
        assert!(db.assignment_compatible(a, TypeDb::NULL));
    }

    #[test]
    fn array_relations() {
        let mut db = TypeDb::new();
        let fixed = db.fixed_array(TypeDb::INT, 3, 0);
        let fixed2 = db.fixed_array(TypeDb::INT, 7, 4);
        let dynamic = db.dynamic_array(TypeDb::INT);
        let queue = db.queue(TypeDb::INT, None);
        // Same element count and element type: equivalent.
        assert!(db.equivalent(fixed, fixed2));
        assert!(db.assignment_compatible(dynamic, fixed));
        assert!(db.assignment_compatible(queue, dynamic));
        let other = db.fixed_array(TypeDb::STRING, 3, 0);
        assert!(!db.assignment_compatible(dynamic, other));
    }

    #[test]
    fn packed_struct_width() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");
        let w8 = db.vector(8, false, true);
        let s = db.add_struct(
            true,
            vec![FieldType { name: a, ty: w8 }, FieldType { name: b, ty: TypeDb::LOGIC }],
        );
        assert_eq!(db.bit_width(s), Some(9));
        assert!(db.is_integral(s));
        assert!(db.is_four_state(s));
    }

    #[test]
    fn display_forms() {
        let mut db = TypeDb::new();
        let interner = Interner::new();
        assert_eq!(db.display(TypeDb::LOGIC, &interner), "logic");
        let v = db.vector(8, false, true);
        assert_eq!(db.display(v, &interner), "logic[7:0]");
        let sv = db.vector(4, true, false);
        assert_eq!(db.display(sv, &interner), "bit signed[3:0]");
        let name = interner.get_or_intern("word_t");
        let alias = db.alias(name, v);
        assert_eq!(db.display(alias, &interner), "word_t");
    }
}
