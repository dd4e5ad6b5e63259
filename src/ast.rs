//! The abstract syntax tree the executor and validator operate on.
//!
//! The tree is owned and immutable once produced. Nodes are built by the
//! parser bridge in [`crate::parser`]; source positions are advisory and
//! never affect semantics.

use std::{fmt, str::FromStr};

use arcstr::ArcStr;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A line/column pair into the source document. Both are 1-based.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    line: usize,
    column: usize,
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The position used for nodes constructed outside of a source document.
    pub fn new_origin() -> Self {
        Self { line: 0, column: 0 }
    }

    /// The 1-based line of this position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1-based column of this position.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Serialize for SourcePosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("line", &self.line)?;
        map.serialize_entry("column", &self.column)?;
        map.end()
    }
}

/// A syntax node paired with the position it starts at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Spanning<T> {
    /// The wrapped node.
    pub item: T,

    /// Start position of the node in the source document.
    pub start: SourcePosition,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(start: SourcePosition, item: T) -> Self {
        Self { item, start }
    }

    /// Construct a node without a meaningful source position.
    pub fn unlocated(item: T) -> Self {
        Self {
            item,
            start: SourcePosition::new_origin(),
        }
    }

    /// Map the wrapped node, keeping the position.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanning<U> {
        Spanning {
            item: f(self.item),
            start: self.start,
        }
    }
}

/// A type literal, e.g. `Int`, `[String!]` or `Thing!`.
///
/// Carries no semantic information and might refer to types that don't
/// exist. Non-`null` wrapping of an already non-`null` type is not
/// representable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`.
    Named(ArcStr),
    /// A nullable list type, e.g. `[String]`.
    List(Box<Type>),
    /// A non-`null` named type, e.g. `String!`.
    NonNullNamed(ArcStr),
    /// A non-`null` list type, e.g. `[String]!`.
    NonNullList(Box<Type>),
}

impl Type {
    /// A nullable named type literal.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self::Named(name.into())
    }

    /// Wraps a type literal into a nullable list.
    pub fn list(of_type: Type) -> Self {
        Self::List(Box::new(of_type))
    }

    /// Marks this type literal as non-`null`. Idempotent.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::Named(name) => Self::NonNullNamed(name),
            Self::List(inner) => Self::NonNullList(inner),
            t @ (Self::NonNullNamed(_) | Self::NonNullList(_)) => t,
        }
    }

    /// Strips the topmost non-`null` marker, if any.
    #[must_use]
    pub fn into_nullable(self) -> Self {
        match self {
            Self::NonNullNamed(name) => Self::Named(name),
            Self::NonNullList(inner) => Self::List(inner),
            t => t,
        }
    }

    /// The innermost name of this type literal.
    ///
    /// All type literals contain exactly one name.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Whether the topmost level of this type literal is non-`null`.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(_) | Self::NonNullList(_))
    }

    /// Whether this type literal is a list at the topmost level.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_) | Self::NonNullList(_))
    }

    /// The element type, if this type literal is a list.
    pub fn list_contents(&self) -> Option<&Type> {
        match self {
            Self::List(inner) | Self::NonNullList(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix('!') {
            return Ok(Type::from_str(inner)?.non_null());
        }
        if let Some(rest) = s.strip_prefix('[') {
            let inner = rest
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated list type: `{s}`"))?;
            return Ok(Type::list(Type::from_str(inner)?));
        }
        if s.is_empty() || !s.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!("malformed type literal: `{s}`"));
        }
        Ok(Type::named(s))
    }
}

/// A value appearing in a query document or in a raw variable map.
///
/// Unlike [`crate::Value`], it can contain enum literals and variables and
/// has not been coerced against any type.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    /// An explicit `null`.
    Null,
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
    /// A string literal.
    String(String),
    /// A boolean literal.
    Boolean(bool),
    /// An enum literal, e.g. `PUCE`.
    Enum(String),
    /// A variable reference, e.g. `$channel`.
    Variable(String),
    /// A list of input values.
    List(Vec<InputValue>),
    /// An input object, field order as written.
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    /// Does this value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does this value represent a variable reference?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying enum name, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// All variables referenced by this value, recursively.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l.iter().flat_map(Self::referenced_variables).collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Enum(e) => write!(f, "{e}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    v.fmt(f)?;
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Named arguments attached to a field or a directive, in source order.
pub type Arguments = Vec<(Spanning<String>, Spanning<InputValue>)>;

/// A single variable declared by an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    /// The declared type of the variable.
    pub var_type: Spanning<Type>,
    /// The default used when no runtime value is provided.
    pub default_value: Option<Spanning<InputValue>>,
}

/// A directive use site, e.g. `@include(if: $flag)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub name: Spanning<String>,
    pub arguments: Arguments,
}

/// A field selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub alias: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub arguments: Arguments,
    pub directives: Vec<Spanning<Directive>>,
    /// Sub-selections; empty for leaf fields.
    pub selection_set: Vec<Selection>,
}

impl Field {
    /// The key this field's result appears under: the alias if present,
    /// else the field name.
    pub fn response_key(&self) -> &str {
        self.alias
            .as_ref()
            .map_or(self.name.item.as_str(), |a| a.item.as_str())
    }
}

/// A named fragment spread, e.g. `...friendFields`.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    pub name: Spanning<String>,
    pub directives: Vec<Spanning<Directive>>,
}

/// An inline fragment, e.g. `... on Dog { barkVolume }`.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<Spanning<String>>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// Entry in a selection set.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ... on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(Spanning<Field>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

/// The kind of an operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

/// An executable operation definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Spanning<String>>,
    pub variable_definitions: Vec<(Spanning<String>, VariableDefinition)>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// A named fragment definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub name: Spanning<String>,
    pub type_condition: Spanning<String>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// A top-level definition in a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Operation(Spanning<Operation>),
    Fragment(Spanning<Fragment>),
}

/// A parsed query document: an ordered sequence of definitions.
pub type Document = Vec<Definition>;

#[cfg(test)]
mod tests {
    use super::Type;

    #[test]
    fn type_display_round_trips() {
        for src in ["Int", "Int!", "[Int]", "[Int!]", "[Int!]!", "[[Thing]!]"] {
            let t: Type = src.parse().unwrap();
            assert_eq!(t.to_string(), src);
        }
    }

    #[test]
    fn type_from_str_rejects_garbage() {
        assert!("".parse::<Type>().is_err());
        assert!("[Int".parse::<Type>().is_err());
        assert!("In t".parse::<Type>().is_err());
    }

    #[test]
    fn non_null_is_idempotent() {
        let t = Type::named("Int").non_null();
        assert_eq!(t.clone().non_null(), t);
        assert_eq!(t.into_nullable(), Type::named("Int"));

        let l = Type::list(Type::named("Int").non_null()).non_null();
        assert_eq!(l.to_string(), "[Int!]!");
        assert_eq!(l.clone().non_null(), l);
    }

    #[test]
    fn innermost_name_unwraps_lists() {
        let t = Type::list(Type::list(Type::named("Thing").non_null())).non_null();
        assert_eq!(t.innermost_name(), "Thing");
        assert!(t.is_non_null());
        assert!(t.is_list());
    }
}
