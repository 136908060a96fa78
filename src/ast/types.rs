//! Type model shared by every pass.
//!
//! - `Kind`: the closed set of semantic types, including the `Void` sentinel
//! - `TypeSpec`: a type as written in a declaration (with array bounds)
//! - `Signature`: a callable's identity for overload resolution

use std::fmt::Display;

/// Semantic type tag of a variable or expression.
///
/// `Void` doubles as the procedure return kind and as the error sentinel:
/// an expression whose kind could not be determined is `Void`, and no
/// diagnostic is issued solely because an operand is `Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    Int,
    Real,
    Bool,
    IntArray,
    RealArray,
    BoolArray,
    #[default]
    Void,
}

impl Kind {
    /// The array kind holding elements of this scalar kind.
    pub fn array_of(self) -> Kind {
        match self {
            Kind::Int => Kind::IntArray,
            Kind::Real => Kind::RealArray,
            Kind::Bool => Kind::BoolArray,
            other => other,
        }
    }

    /// The element kind of an array kind; scalars map to themselves.
    pub fn element(self) -> Kind {
        match self {
            Kind::IntArray => Kind::Int,
            Kind::RealArray => Kind::Real,
            Kind::BoolArray => Kind::Bool,
            other => other,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, Kind::IntArray | Kind::RealArray | Kind::BoolArray)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Real)
    }

    pub fn is_void(self) -> bool {
        self == Kind::Void
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Int => "Int",
            Kind::Real => "Real",
            Kind::Bool => "Bool",
            Kind::IntArray => "IntArray",
            Kind::RealArray => "RealArray",
            Kind::BoolArray => "BoolArray",
            Kind::Void => "Void",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A type as written in a declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeSpec {
    Standard(Kind),
    Array { begin: i64, end: i64, element: Kind },
}

impl TypeSpec {
    /// The kind a variable declared with this type receives.
    pub fn kind(&self) -> Kind {
        match self {
            TypeSpec::Standard(kind) => *kind,
            TypeSpec::Array { element, .. } => element.array_of(),
        }
    }

    /// The kind used when this type appears in a signature.
    pub fn element_kind(&self) -> Kind {
        match self {
            TypeSpec::Standard(kind) => *kind,
            TypeSpec::Array { element, .. } => *element,
        }
    }

    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            TypeSpec::Standard(_) => None,
            TypeSpec::Array { begin, end, .. } => Some((*begin, *end)),
        }
    }

    /// Number of elements of an array type. `None` for scalars and for bounds
    /// whose element count does not fit in an `i64`.
    pub fn element_count(&self) -> Option<i64> {
        let (begin, end) = self.bounds()?;
        end.checked_sub(begin)?.checked_add(1)
    }
}

/// Separates the callable name from its parameter kinds in the canonical key.
/// Identifiers never contain it, so distinct signatures never collide.
pub const SIGNATURE_DELIMITER: char = '@';

/// A function or procedure signature.
///
/// Identity is the name plus the ordered parameter kinds; the return kind is
/// carried along but does not take part in equality.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub param_kinds: Vec<Kind>,
    pub return_kind: Kind,
}

impl Signature {
    pub fn new(name: impl Into<String>, param_kinds: Vec<Kind>, return_kind: Kind) -> Self {
        Signature {
            name: name.into(),
            param_kinds,
            return_kind,
        }
    }

    /// Canonical key, e.g. `max@Int,Int` or `main@`.
    pub fn encode(&self) -> String {
        Signature::encode_parts(&self.name, &self.param_kinds)
    }

    pub fn encode_parts(name: &str, param_kinds: &[Kind]) -> String {
        let kinds = param_kinds
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<&str>>()
            .join(",");
        format!("{}{}{}", name, SIGNATURE_DELIMITER, kinds)
    }

    pub fn param_count(&self) -> usize {
        self.param_kinds.len()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.param_kinds == other.param_kinds
    }
}

impl Eq for Signature {}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}
