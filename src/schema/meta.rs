//! Types used to describe a GraphQL schema.
//!
//! Unlike a schema produced by compile-time machinery, behavior lives in the
//! metadata itself: fields carry their resolver, scalars their parse and
//! serialize functions, abstract types their runtime type resolution hook.

use std::fmt;

use arcstr::ArcStr;

use crate::{
    ast::{InputValue, Type},
    resolve::{Arguments as ResolverArguments, IsTypeOfFn, ResolveInfo, Resolution, ResolveTypeFn, ResolverFn},
    value::Value,
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The item is not deprecated.
    Current,
    /// The item is deprecated, with an optional reason.
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// Shortcut for a function coercing an input value into the execution
/// domain.
pub type ScalarParseFn = fn(&InputValue) -> Result<Value, crate::FieldError>;

/// Shortcut for a function checking a resolved value on its way out.
pub type ScalarSerializeFn = fn(&Value) -> Result<Value, crate::FieldError>;

/// The kind of a type, as introspection reports it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// The spelling introspection uses for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

/// Scalar type metadata.
#[derive(Clone, Debug)]
pub struct ScalarMeta {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub(crate) parse_fn: ScalarParseFn,
    pub(crate) serialize_fn: ScalarSerializeFn,
}

/// Object type metadata.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    /// Declaration-ordered; the order is exposed to introspection.
    pub fields: Vec<Field>,
    pub interface_names: Vec<ArcStr>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

/// Interface type metadata.
#[derive(Clone)]
pub struct InterfaceMeta {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub fields: Vec<Field>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Union type metadata.
#[derive(Clone)]
pub struct UnionMeta {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub of_type_names: Vec<ArcStr>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Enum type metadata.
#[derive(Clone, Debug)]
pub struct EnumMeta {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub values: Vec<EnumValue>,
}

impl EnumMeta {
    /// The declared value for an enum literal name.
    pub fn value_by_name(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Reverse lookup: the name an internal value serializes back to.
    pub fn name_for_value(&self, value: &Value) -> Option<&ArcStr> {
        self.values.iter().find(|v| &v.value == value).map(|v| &v.name)
    }
}

/// Input object metadata.
#[derive(Clone, Debug)]
pub struct InputObjectMeta {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub input_fields: Vec<Argument>,
}

/// Generic type metadata.
#[derive(Clone, Debug)]
pub enum MetaType {
    Scalar(ScalarMeta),
    Object(ObjectMeta),
    Enum(EnumMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    InputObject(InputObjectMeta),
}

/// Metadata for a field.
#[derive(Clone)]
pub struct Field {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    /// Declaration-ordered.
    pub arguments: Vec<Argument>,
    pub field_type: Type,
    pub deprecation_status: DeprecationStatus,
    pub(crate) resolver: Option<ResolverFn>,
}

/// Metadata for an argument to a field, or for an input object field.
#[derive(Clone, Debug)]
pub struct Argument {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub arg_type: Type,
    /// Pre-coerced into the execution value domain; verified against
    /// `arg_type` when the schema is built.
    pub default_value: Option<Value>,
    pub deprecation_status: DeprecationStatus,
}

/// Metadata for a single value in an enum.
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The string literal representation of the value in documents and
    /// responses.
    pub name: ArcStr,
    /// The internal value the name coerces to.
    pub value: Value,
    pub description: Option<ArcStr>,
    pub deprecation_status: DeprecationStatus,
}

impl MetaType {
    /// The name of the type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// The description of the type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
        }
    }

    /// The introspection kind of this type.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Enum(_) => TypeKind::Enum,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Access a field's metadata given its name.
    ///
    /// Only objects and interfaces have fields; `None` for other types.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        match self {
            Self::Object(ObjectMeta { fields, .. })
            | Self::Interface(InterfaceMeta { fields, .. }) => {
                fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Access an input field's metadata given its name.
    ///
    /// Only input objects have input fields; `None` for other types.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Construct a nullable type literal naming this type.
    pub fn as_type(&self) -> Type {
        Type::Named(self.name().clone())
    }

    /// Objects, interfaces, and unions are composite.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    /// Only enums and scalars can occur in leaf positions of queries.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Enum(_) | Self::Scalar(_))
    }

    /// Only interfaces and unions are abstract.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Only scalars, enums, and input objects can occur in input positions,
    /// e.g. arguments or variables.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Whether the type belongs to the introspection system.
    pub fn is_builtin(&self) -> bool {
        self.name().starts_with("__")
    }
}

impl ScalarMeta {
    /// Builds a new scalar type out of its parse and serialize functions.
    pub fn new(
        name: impl Into<ArcStr>,
        parse_fn: ScalarParseFn,
        serialize_fn: ScalarSerializeFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            parse_fn,
            serialize_fn,
        }
    }

    /// Sets the description of this scalar type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wraps this scalar into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

impl ObjectMeta {
    /// Builds a new object type with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            interface_names: Vec::new(),
            is_type_of: None,
        }
    }

    /// Overrides the name of this object type.
    #[must_use]
    pub fn name(mut self, name: impl Into<ArcStr>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description of this object type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field to this object type.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares the interfaces this object type implements.
    #[must_use]
    pub fn interfaces(mut self, interfaces: &[&str]) -> Self {
        self.interface_names = interfaces.iter().map(|&n| ArcStr::from(n)).collect();
        self
    }

    /// Sets the predicate deciding whether a value is an instance of this
    /// type, used to resolve abstract types at runtime.
    #[must_use]
    pub fn is_type_of(mut self, f: IsTypeOfFn) -> Self {
        self.is_type_of = Some(f);
        self
    }

    /// Wraps this object into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }
}

impl InterfaceMeta {
    /// Builds a new interface type with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            resolve_type: None,
        }
    }

    /// Sets the description of this interface type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field to this interface type.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the function resolving a value of this interface into the name
    /// of the concrete object type it represents.
    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&Value) -> Option<ArcStr> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(std::sync::Arc::new(f));
        self
    }

    /// Wraps this interface into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl UnionMeta {
    /// Builds a new union type over the given object type names.
    pub fn new(name: impl Into<ArcStr>, of_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            of_type_names: of_types.iter().map(|&n| ArcStr::from(n)).collect(),
            resolve_type: None,
        }
    }

    /// Sets the description of this union type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the function resolving a value of this union into the name of
    /// the concrete object type it represents.
    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&Value) -> Option<ArcStr> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(std::sync::Arc::new(f));
        self
    }

    /// Wraps this union into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl EnumMeta {
    /// Builds a new enum type with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: Vec::new(),
        }
    }

    /// Sets the description of this enum type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a value to this enum type.
    #[must_use]
    pub fn value(mut self, value: EnumValue) -> Self {
        self.values.push(value);
        self
    }

    /// Wraps this enum into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }
}

impl InputObjectMeta {
    /// Builds a new input object type with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: Vec::new(),
        }
    }

    /// Sets the description of this input object type.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends an input field to this input object type.
    #[must_use]
    pub fn input_field(mut self, field: Argument) -> Self {
        self.input_fields.push(field);
        self
    }

    /// Wraps this input object into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

impl Field {
    /// Builds a new field of the given type.
    pub fn new(name: impl Into<ArcStr>, field_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
        }
    }

    /// Sets the description of this field.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends an argument to this field.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Marks this field as deprecated, with an optional reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }

    /// Sets the resolver of this field.
    ///
    /// A field without a resolver reads its name out of the parent object
    /// value.
    #[must_use]
    pub fn resolver(
        mut self,
        f: impl Fn(&ResolverArguments, &ResolveInfo<'_>) -> Resolution + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(std::sync::Arc::new(f));
        self
    }

    /// Whether the field belongs to the introspection system.
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }
}

impl Argument {
    /// Builds a new argument of the given type.
    pub fn new(name: impl Into<ArcStr>, arg_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the description of this argument.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default of this argument. The value is already in the
    /// execution domain and must satisfy the argument's type.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Marks this argument as deprecated, with an optional reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

impl EnumValue {
    /// Constructs a new enum value; its internal value defaults to the
    /// name itself.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        Self {
            value: Value::String(name.to_string()),
            name,
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the internal value this name coerces to. The reverse mapping
    /// from values back to names must stay unique within the enum.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the description of this enum value.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks this enum value as deprecated, with an optional reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("field_type", &self.field_type)
            .field("deprecation_status", &self.deprecation_status)
            .field("resolver", &self.resolver.as_ref().map(|_| ".."))
            .finish()
    }
}

impl fmt::Debug for InterfaceMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceMeta")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fields", &self.fields)
            .finish()
    }
}

impl fmt::Debug for UnionMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionMeta")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("of_type_names", &self.of_type_names)
            .finish()
    }
}
