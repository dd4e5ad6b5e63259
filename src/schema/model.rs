//! The schema itself: the linked registry of types and directives.

use std::fmt;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use indexmap::IndexMap;

use crate::{
    ast::Type,
    schema::meta::{Argument, EnumMeta, InterfaceMeta, MetaType, ObjectMeta, UnionMeta},
    value::Value,
};

/// A named collection of types and directives with all cross-references
/// resolved.
///
/// Built once by a [`SchemaBuilder`](crate::schema::builder::SchemaBuilder)
/// and immutable afterwards; it is freely shared between concurrent
/// executions.
#[derive(Debug)]
pub struct Schema {
    pub(crate) types: IndexMap<ArcStr, MetaType>,
    pub(crate) directives: IndexMap<ArcStr, DirectiveType>,
    pub(crate) query_type_name: ArcStr,
    pub(crate) mutation_type_name: Option<ArcStr>,
    pub(crate) subscription_type_name: Option<ArcStr>,
}

/// A type literal linked against the schema: concrete type metadata wrapped
/// in the literal's list and non-`null` markers.
pub enum TypeType<'a> {
    Concrete(&'a MetaType),
    NonNull(Box<TypeType<'a>>),
    List(Box<TypeType<'a>>),
}

/// A directive the schema understands.
#[derive(Clone, Debug)]
pub struct DirectiveType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub locations: Vec<DirectiveLocation>,
    pub arguments: Vec<Argument>,
}

/// Places a directive may appear at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
}

/// A defect in a schema, detected while building it.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum SchemaError {
    /// No query root object was defined.
    #[display("Schema does not define a query root")]
    MissingQueryRoot,

    /// Two types were registered under the same name.
    #[display("Duplicate type name `{_0}`")]
    DuplicateType(#[error(not(source))] ArcStr),

    /// Two directives were registered under the same name.
    #[display("Duplicate directive name `{_0}`")]
    DuplicateDirective(#[error(not(source))] ArcStr),

    /// A type reference does not resolve to a registered type.
    #[display("Unknown type `{name}` referenced by `{referenced_by}`")]
    UnknownType {
        name: ArcStr,
        referenced_by: String,
    },

    /// A field's declared type cannot be used in output positions.
    #[display("`{field}` cannot use input object `{type_name}` as its type")]
    NotAnOutputType { field: String, type_name: ArcStr },

    /// An argument or input field declared a non-input type.
    #[display("`{argument}` cannot use composite type `{type_name}` as its type")]
    NotAnInputType { argument: String, type_name: ArcStr },

    /// An object claims an interface but misses one of its fields.
    #[display("Object `{object}` implements `{interface}` but does not define field `{field}`")]
    MissingInterfaceField {
        object: ArcStr,
        interface: ArcStr,
        field: ArcStr,
    },

    /// An object defines an interface field at an incompatible type.
    #[display(
        "Field `{object}.{field}` is of type `{found}`, which is not covariant with `{expected}` declared by interface `{interface}`"
    )]
    NonCovariantField {
        object: ArcStr,
        interface: ArcStr,
        field: ArcStr,
        expected: String,
        found: String,
    },

    /// A union lists a member that is not an object type.
    #[display("Union `{union}` member `{member}` is not an object type")]
    NonObjectUnionMember { union: ArcStr, member: ArcStr },

    /// Two values of an enum share the same internal value, which breaks
    /// serialization back to a name.
    #[display("Enum `{enum_name}` values `{first}` and `{second}` map to the same internal value")]
    AmbiguousEnumValue {
        enum_name: ArcStr,
        first: ArcStr,
        second: ArcStr,
    },

    /// A declared default does not satisfy the declared type.
    #[display("Default value `{value}` of `{argument}` does not satisfy type `{type_name}`")]
    InvalidDefaultValue {
        argument: String,
        value: String,
        type_name: String,
    },
}

impl Schema {
    /// Look a type up by name, wrapped as a [`TypeType`].
    pub fn type_by_name(&self, name: &str) -> Option<TypeType<'_>> {
        self.types.get(name).map(TypeType::Concrete)
    }

    /// Look concrete type metadata up by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// The query root type.
    pub fn concrete_query_type(&self) -> &MetaType {
        self.types
            .get(&self.query_type_name)
            .expect("query root type exists in schema")
    }

    /// The mutation root type, if the schema supports mutations.
    pub fn concrete_mutation_type(&self) -> Option<&MetaType> {
        self.mutation_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("mutation root type exists in schema")
        })
    }

    /// The subscription root type, if the schema supports subscriptions.
    pub fn concrete_subscription_type(&self) -> Option<&MetaType> {
        self.subscription_type_name.as_ref().map(|name| {
            self.concrete_type_by_name(name)
                .expect("subscription root type exists in schema")
        })
    }

    /// Name of the query root type.
    pub fn query_type_name(&self) -> &ArcStr {
        &self.query_type_name
    }

    /// Name of the mutation root type, if any.
    pub fn mutation_type_name(&self) -> Option<&ArcStr> {
        self.mutation_type_name.as_ref()
    }

    /// Name of the subscription root type, if any.
    pub fn subscription_type_name(&self) -> Option<&ArcStr> {
        self.subscription_type_name.as_ref()
    }

    /// All registered types, in registration order.
    pub fn concrete_type_list(&self) -> Vec<&MetaType> {
        self.types.values().collect()
    }

    /// Link a type literal against the registry.
    ///
    /// # Panics
    ///
    /// If the literal names a type the schema does not contain. All
    /// literals reachable from a built schema are verified, so this only
    /// fires on hand-rolled literals.
    pub fn make_type(&self, t: &Type) -> TypeType<'_> {
        match t {
            Type::NonNullNamed(n) => TypeType::NonNull(Box::new(
                self.type_by_name(n).expect("type found in schema"),
            )),
            Type::NonNullList(inner) => TypeType::NonNull(Box::new(TypeType::List(Box::new(
                self.make_type(inner),
            )))),
            Type::Named(n) => self.type_by_name(n).expect("type found in schema"),
            Type::List(inner) => TypeType::List(Box::new(self.make_type(inner))),
        }
    }

    /// All directives the schema understands, in registration order.
    pub fn directive_list(&self) -> Vec<&DirectiveType> {
        self.directives.values().collect()
    }

    /// Look a directive up by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// Whether two composite types can overlap at runtime, i.e. share an
    /// object type.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if std::ptr::eq(t1, t2) {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// The object types an abstract type can resolve into.
    ///
    /// # Panics
    ///
    /// If the given type is not an interface or a union.
    pub fn possible_types(&self, t: &MetaType) -> Vec<&MetaType> {
        match t {
            MetaType::Union(UnionMeta { of_type_names, .. }) => of_type_names
                .iter()
                .filter_map(|t| self.concrete_type_by_name(t))
                .collect(),
            MetaType::Interface(InterfaceMeta { name, .. }) => self
                .types
                .values()
                .filter(|t| match t {
                    MetaType::Object(ObjectMeta {
                        interface_names, ..
                    }) => interface_names.iter().any(|iname| iname == name),
                    _ => false,
                })
                .collect(),
            _ => panic!("can't retrieve possible types of a non-abstract meta type"),
        }
    }

    /// Whether `possible_type` is one of the objects `abstract_type` can
    /// resolve into.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types(abstract_type)
            .into_iter()
            .any(|t| std::ptr::eq(t, possible_type))
    }

    /// Whether a value of type `sub_type` is acceptable where `super_type`
    /// is expected, accounting for wrappers and abstract supertypes.
    pub fn is_subtype(&self, sub_type: &Type, super_type: &Type) -> bool {
        use crate::ast::Type::*;

        if super_type == sub_type {
            return true;
        }

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name))
            | (Named(super_name), NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner))
            | (List(super_inner), NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }

    /// Named-type part of [`Schema::is_subtype`].
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            true
        } else if let (Some(sub_type), Some(super_type)) = (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
        } else {
            false
        }
    }

    /// Whether a pre-coerced value satisfies a declared type. Used to check
    /// defaults at build time and again by coercion idempotence tests.
    pub fn value_satisfies_type(&self, value: &Value, t: &Type) -> bool {
        match t {
            Type::NonNullNamed(_) | Type::NonNullList(_) => {
                !value.is_null() && self.value_satisfies_type(value, &t.clone().into_nullable())
            }
            _ if value.is_null() => true,
            Type::List(inner) => match value {
                Value::List(items) => items.iter().all(|v| self.value_satisfies_type(v, inner)),
                v => self.value_satisfies_type(v, inner),
            },
            Type::Named(name) => match self.concrete_type_by_name(name) {
                Some(MetaType::Scalar(meta)) => (meta.parse_fn)(&value.to_input_value()).is_ok(),
                Some(MetaType::Enum(meta)) => meta.name_for_value(value).is_some(),
                Some(MetaType::InputObject(meta)) => match value.as_object_value() {
                    Some(obj) => obj.iter().all(|(k, v)| {
                        meta.input_fields
                            .iter()
                            .find(|f| f.name == *k)
                            .is_some_and(|f| self.value_satisfies_type(v, &f.arg_type))
                    }),
                    None => false,
                },
                _ => false,
            },
        }
    }
}

impl<'a> TypeType<'a> {
    /// The concrete metadata, if no wrappers are left.
    pub fn to_concrete(&self) -> Option<&'a MetaType> {
        match self {
            TypeType::Concrete(t) => Some(t),
            _ => None,
        }
    }

    /// The innermost concrete metadata.
    pub fn innermost_concrete(&self) -> &'a MetaType {
        match self {
            TypeType::Concrete(t) => t,
            TypeType::NonNull(i) | TypeType::List(i) => i.innermost_concrete(),
        }
    }
}

impl DirectiveType {
    /// Declares a new directive.
    pub fn new(
        name: impl Into<ArcStr>,
        locations: &[DirectiveLocation],
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments,
        }
    }

    pub(crate) fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::named("Boolean").non_null())],
        )
    }

    pub(crate) fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::named("Boolean").non_null())],
        )
    }

    /// Sets the description of this directive.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl DirectiveLocation {
    /// The spelling introspection uses for this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Field => "field",
            Self::FragmentDefinition => "fragment definition",
            Self::FragmentSpread => "fragment spread",
            Self::InlineFragment => "inline fragment",
        })
    }
}

impl fmt::Display for TypeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeType::Concrete(t) => f.write_str(t.name()),
            TypeType::List(i) => write!(f, "[{i}]"),
            TypeType::NonNull(i) => write!(f, "{i}!"),
        }
    }
}

pub(crate) struct TypeReference<'a> {
    pub ty: &'a Type,
    pub referenced_by: String,
    pub must_be_input: bool,
    pub must_be_output: bool,
}

impl Schema {
    /// Verifies the invariants the registry must uphold before execution:
    /// every reference links, interface implementations are covariant, union
    /// members are objects, enum reverse lookup is unambiguous, and
    /// declared defaults satisfy their types.
    pub(crate) fn verify(&self) -> Result<(), SchemaError> {
        for reference in self.collect_references() {
            let name: ArcStr = reference.ty.innermost_name().into();
            let Some(meta) = self.concrete_type_by_name(&name) else {
                return Err(SchemaError::UnknownType {
                    name,
                    referenced_by: reference.referenced_by,
                });
            };
            if reference.must_be_input && !meta.is_input() {
                return Err(SchemaError::NotAnInputType {
                    argument: reference.referenced_by,
                    type_name: name,
                });
            }
            if reference.must_be_output && matches!(meta, MetaType::InputObject(_)) {
                return Err(SchemaError::NotAnOutputType {
                    field: reference.referenced_by,
                    type_name: name,
                });
            }
        }

        for meta in self.types.values() {
            match meta {
                MetaType::Object(obj) => self.verify_object(obj)?,
                MetaType::Union(union) => self.verify_union(union)?,
                MetaType::Enum(enum_meta) => verify_enum(enum_meta)?,
                _ => {}
            }
        }

        self.verify_defaults()
    }

    fn verify_object(&self, obj: &ObjectMeta) -> Result<(), SchemaError> {
        for iface_name in &obj.interface_names {
            let iface = match self.concrete_type_by_name(iface_name) {
                Some(MetaType::Interface(i)) => i,
                _ => {
                    return Err(SchemaError::UnknownType {
                        name: iface_name.clone(),
                        referenced_by: obj.name.to_string(),
                    })
                }
            };
            for iface_field in &iface.fields {
                if iface_field.is_builtin() {
                    continue;
                }
                let Some(obj_field) = obj.fields.iter().find(|f| f.name == iface_field.name)
                else {
                    return Err(SchemaError::MissingInterfaceField {
                        object: obj.name.clone(),
                        interface: iface.name.clone(),
                        field: iface_field.name.clone(),
                    });
                };
                if !self.is_subtype(&obj_field.field_type, &iface_field.field_type) {
                    return Err(SchemaError::NonCovariantField {
                        object: obj.name.clone(),
                        interface: iface.name.clone(),
                        field: iface_field.name.clone(),
                        expected: iface_field.field_type.to_string(),
                        found: obj_field.field_type.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn verify_union(&self, union: &UnionMeta) -> Result<(), SchemaError> {
        for member in &union.of_type_names {
            match self.concrete_type_by_name(member) {
                Some(MetaType::Object(_)) => {}
                Some(_) => {
                    return Err(SchemaError::NonObjectUnionMember {
                        union: union.name.clone(),
                        member: member.clone(),
                    })
                }
                None => {
                    return Err(SchemaError::UnknownType {
                        name: member.clone(),
                        referenced_by: union.name.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    fn verify_defaults(&self) -> Result<(), SchemaError> {
        let mut check = |site: String, arg: &Argument| -> Result<(), SchemaError> {
            if let Some(default) = &arg.default_value {
                if !self.value_satisfies_type(default, &arg.arg_type) {
                    return Err(SchemaError::InvalidDefaultValue {
                        argument: site,
                        value: default.to_string(),
                        type_name: arg.arg_type.to_string(),
                    });
                }
            }
            Ok(())
        };

        for meta in self.types.values() {
            match meta {
                MetaType::Object(ObjectMeta { name, fields, .. })
                | MetaType::Interface(InterfaceMeta { name, fields, .. }) => {
                    for field in fields {
                        for arg in &field.arguments {
                            check(format!("{name}.{}({}:)", field.name, arg.name), arg)?;
                        }
                    }
                }
                MetaType::InputObject(input) => {
                    for field in &input.input_fields {
                        check(format!("{}.{}", input.name, field.name), field)?;
                    }
                }
                _ => {}
            }
        }
        for directive in self.directives.values() {
            for arg in &directive.arguments {
                check(format!("@{}({}:)", directive.name, arg.name), arg)?;
            }
        }
        Ok(())
    }

    fn collect_references(&self) -> Vec<TypeReference<'_>> {
        let mut refs = Vec::new();

        fn argument_ref(site: String, arg: &Argument) -> TypeReference<'_> {
            TypeReference {
                ty: &arg.arg_type,
                referenced_by: site,
                must_be_input: true,
                must_be_output: false,
            }
        }

        for meta in self.types.values() {
            match meta {
                MetaType::Object(ObjectMeta { name, fields, .. })
                | MetaType::Interface(InterfaceMeta { name, fields, .. }) => {
                    for field in fields {
                        refs.push(TypeReference {
                            ty: &field.field_type,
                            referenced_by: format!("{name}.{}", field.name),
                            must_be_input: false,
                            must_be_output: true,
                        });
                        for arg in &field.arguments {
                            refs.push(argument_ref(
                                format!("{name}.{}({}:)", field.name, arg.name),
                                arg,
                            ));
                        }
                    }
                }
                MetaType::InputObject(input) => {
                    for field in &input.input_fields {
                        refs.push(argument_ref(
                            format!("{}.{}", input.name, field.name),
                            field,
                        ));
                    }
                }
                MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::Union(_) => {}
            }
        }
        for directive in self.directives.values() {
            for arg in &directive.arguments {
                refs.push(argument_ref(
                    format!("@{}({}:)", directive.name, arg.name),
                    arg,
                ));
            }
        }

        refs
    }
}

fn verify_enum(meta: &EnumMeta) -> Result<(), SchemaError> {
    for (i, first) in meta.values.iter().enumerate() {
        for second in &meta.values[i + 1..] {
            if first.value == second.value {
                return Err(SchemaError::AmbiguousEnumValue {
                    enum_name: meta.name.clone(),
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
        }
    }
    Ok(())
}
