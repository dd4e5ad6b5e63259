//! Assembling a [`Schema`] out of type definitions.
//!
//! The builder collects type and directive records in registration order,
//! installs the built-in scalars, the introspection meta-types and the
//! built-in directives, and runs the schema verification pass.

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::Type,
    introspection,
    scalars,
    schema::{
        meta::{
            EnumMeta, Field, InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta, ScalarMeta,
            ScalarParseFn, ScalarSerializeFn, UnionMeta,
        },
        model::{DirectiveType, Schema, SchemaError},
    },
    util::to_type_name,
};

/// Collects type definitions and emits a verified [`Schema`].
///
/// Type-level builders seed their type's name from the CamelCased
/// identifier; the root objects default to `RootQueryType`,
/// `RootMutationType` and `RootSubscriptionType`. Either can be overridden
/// with the type builder's `name`.
///
/// ```
/// use wormwood::{meta::Field, Resolution, SchemaBuilder, Type};
///
/// let schema = SchemaBuilder::new()
///     .query(|obj| {
///         obj.field(
///             Field::new("version", Type::named("String"))
///                 .resolver(|_, _| Resolution::ok("0.1")),
///         )
///     })
///     .build()
///     .unwrap();
/// assert_eq!(schema.query_type_name(), "RootQueryType");
/// ```
#[derive(Default)]
pub struct SchemaBuilder {
    types: Vec<MetaType>,
    directives: Vec<DirectiveType>,
    query_type_name: Option<ArcStr>,
    mutation_type_name: Option<ArcStr>,
    subscription_type_name: Option<ArcStr>,
}

impl SchemaBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines the query root object type.
    #[must_use]
    pub fn query(mut self, f: impl FnOnce(ObjectMeta) -> ObjectMeta) -> Self {
        let obj = f(ObjectMeta::new("RootQueryType"));
        self.query_type_name = Some(obj.name.clone());
        self.types.push(obj.into_meta());
        self
    }

    /// Defines the mutation root object type.
    #[must_use]
    pub fn mutation(mut self, f: impl FnOnce(ObjectMeta) -> ObjectMeta) -> Self {
        let obj = f(ObjectMeta::new("RootMutationType"));
        self.mutation_type_name = Some(obj.name.clone());
        self.types.push(obj.into_meta());
        self
    }

    /// Defines the subscription root object type.
    #[must_use]
    pub fn subscription(mut self, f: impl FnOnce(ObjectMeta) -> ObjectMeta) -> Self {
        let obj = f(ObjectMeta::new("RootSubscriptionType"));
        self.subscription_type_name = Some(obj.name.clone());
        self.types.push(obj.into_meta());
        self
    }

    /// Defines an object type.
    #[must_use]
    pub fn object(mut self, identifier: &str, f: impl FnOnce(ObjectMeta) -> ObjectMeta) -> Self {
        self.types
            .push(f(ObjectMeta::new(to_type_name(identifier))).into_meta());
        self
    }

    /// Defines an interface type.
    #[must_use]
    pub fn interface(
        mut self,
        identifier: &str,
        f: impl FnOnce(InterfaceMeta) -> InterfaceMeta,
    ) -> Self {
        self.types
            .push(f(InterfaceMeta::new(to_type_name(identifier))).into_meta());
        self
    }

    /// Defines a union type over the given member object types.
    #[must_use]
    pub fn union(
        mut self,
        identifier: &str,
        members: &[&str],
        f: impl FnOnce(UnionMeta) -> UnionMeta,
    ) -> Self {
        self.types
            .push(f(UnionMeta::new(to_type_name(identifier), members)).into_meta());
        self
    }

    /// Defines an enum type.
    #[must_use]
    pub fn enum_type(mut self, identifier: &str, f: impl FnOnce(EnumMeta) -> EnumMeta) -> Self {
        self.types
            .push(f(EnumMeta::new(to_type_name(identifier))).into_meta());
        self
    }

    /// Defines an input object type.
    #[must_use]
    pub fn input_object(
        mut self,
        identifier: &str,
        f: impl FnOnce(InputObjectMeta) -> InputObjectMeta,
    ) -> Self {
        self.types
            .push(f(InputObjectMeta::new(to_type_name(identifier))).into_meta());
        self
    }

    /// Defines a custom scalar out of its parse and serialize functions.
    #[must_use]
    pub fn scalar(
        mut self,
        identifier: &str,
        parse_fn: ScalarParseFn,
        serialize_fn: ScalarSerializeFn,
    ) -> Self {
        self.types
            .push(ScalarMeta::new(to_type_name(identifier), parse_fn, serialize_fn).into_meta());
        self
    }

    /// Registers an already-assembled type.
    #[must_use]
    pub fn register(mut self, meta: MetaType) -> Self {
        self.types.push(meta);
        self
    }

    /// Registers a directive. `@skip` and `@include` are always present.
    #[must_use]
    pub fn directive(mut self, directive: DirectiveType) -> Self {
        self.directives.push(directive);
        self
    }

    /// Assembles and verifies the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let query_type_name = self.query_type_name.ok_or(SchemaError::MissingQueryRoot)?;

        let mut types: IndexMap<ArcStr, MetaType> = IndexMap::new();
        for meta in builtin_scalars().into_iter().chain(self.types) {
            let name = meta.name().clone();
            if types.insert(name.clone(), meta).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        introspection::install(&mut types, &query_type_name);

        // Every composite type answers `__typename`; the executor resolves
        // it without consulting the field list.
        let typename_field = Field::new("__typename", Type::named("String").non_null());
        for meta in types.values_mut() {
            match meta {
                MetaType::Object(ObjectMeta { fields, .. })
                | MetaType::Interface(InterfaceMeta { fields, .. }) => {
                    if !fields.iter().any(|f| f.name == "__typename") {
                        fields.push(typename_field.clone());
                    }
                }
                _ => {}
            }
        }

        let mut directives: IndexMap<ArcStr, DirectiveType> = IndexMap::new();
        for directive in [DirectiveType::new_skip(), DirectiveType::new_include()]
            .into_iter()
            .chain(self.directives)
        {
            let name = directive.name.clone();
            if directives.insert(name.clone(), directive).is_some() {
                return Err(SchemaError::DuplicateDirective(name));
            }
        }

        let schema = Schema {
            types,
            directives,
            query_type_name,
            mutation_type_name: self.mutation_type_name,
            subscription_type_name: self.subscription_type_name,
        };
        schema.verify()?;
        Ok(schema)
    }
}

fn builtin_scalars() -> Vec<MetaType> {
    vec![
        ScalarMeta::new("Int", scalars::parse_int, scalars::serialize_int).into_meta(),
        ScalarMeta::new("Float", scalars::parse_float, scalars::serialize_float).into_meta(),
        ScalarMeta::new("String", scalars::parse_string, scalars::serialize_string).into_meta(),
        ScalarMeta::new("Boolean", scalars::parse_boolean, scalars::serialize_boolean).into_meta(),
        ScalarMeta::new("ID", scalars::parse_id, scalars::serialize_id).into_meta(),
    ]
}
