//! Resolve a validated document to values.

use std::{cmp::Ordering, sync::RwLock};

use fnv::{FnvHashMap, FnvHashSet};
use futures::{
    future::BoxFuture,
    stream::{FuturesOrdered, StreamExt as _},
    FutureExt as _,
};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    ast::{
        Definition, Directive, Document, Field as FieldNode, Fragment, InputValue, Operation,
        OperationType, Selection, SourcePosition, Spanning, Type,
    },
    resolve::{Arguments, ExecutionContext, FieldError, ResolveInfo, Resolution},
    schema::{
        meta::{Field as MetaField, MetaType, ObjectMeta},
        model::Schema,
    },
    value::{Object, Value},
    variables::{coerce_input_value, coerce_variable_values, deprecated_note, Path, Variables},
    GraphQLError,
};

/// One step of the path from the response root to a field.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// A response key.
    Field(String),
    /// An index into a list value.
    Index(usize),
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(name) => serializer.serialize_str(name),
            Self::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

/// Error that occurred during the execution of an operation.
///
/// Carries the source position of the field that failed and the path of
/// response keys (and list indices) leading to it. Deprecation warnings use
/// the same shape; they are non-fatal entries in the same list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            location,
            path,
            error,
        }
    }

    /// Construct an error occurring at the beginning of the operation.
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            location: SourcePosition::new_origin(),
            path: Vec::new(),
            error,
        }
    }

    /// The underlying field error.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source position of the failing field.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The path from the response root to the failing field.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

impl PartialOrd for ExecutionError {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionError {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.location, &self.path, self.error.message()).cmp(&(
            &other.location,
            &other.path,
            other.error.message(),
        ))
    }
}

impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("message", self.error.message())?;
        map.serialize_entry("locations", &[self.location])?;
        map.serialize_entry("path", &self.path)?;
        map.end()
    }
}

/// Marker for a `null` that must keep propagating towards the nearest
/// nullable ancestor. The error that caused it is already recorded.
struct Bubble;

type CompleteResult = Result<Value, Bubble>;

/// Selects the operation to execute out of a document.
pub(crate) fn get_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<&'a Spanning<Operation>, GraphQLError> {
    let mut operation = None;
    for def in document {
        let Definition::Operation(op) = def else {
            continue;
        };
        match operation_name {
            Some(wanted) => {
                if op.item.name.as_ref().is_some_and(|n| n.item == wanted) {
                    operation = Some(op);
                    break;
                }
            }
            None => {
                if operation.is_some() {
                    return Err(GraphQLError::MultipleOperationsProvided);
                }
                operation = Some(op);
            }
        }
    }
    operation.ok_or(match operation_name {
        Some(_) => GraphQLError::UnknownOperationName,
        None => GraphQLError::NoOperationProvided,
    })
}

/// Executes an operation that already passed validation.
///
/// Mutations resolve their top-level fields strictly in order; all other
/// sibling sets resolve as concurrent futures. The response keys follow the
/// first occurrence of each key in the collected selection either way.
pub(crate) async fn execute_validated_query(
    document: &Document,
    operation: &Spanning<Operation>,
    schema: &Schema,
    variables: &Variables,
    root_value: &Value,
    context: &ExecutionContext,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let mut coercion_warnings = Vec::new();
    let variables =
        coerce_variable_values(schema, &operation.item, variables, &mut coercion_warnings)
            .map_err(GraphQLError::VariableCoercionError)?;

    let mut fragments = FnvHashMap::default();
    for def in document {
        if let Definition::Fragment(f) = def {
            fragments.insert(f.item.name.item.as_str(), &f.item);
        }
    }

    let root_type = match operation.item.operation_type {
        OperationType::Query => schema.concrete_query_type(),
        OperationType::Mutation => schema
            .concrete_mutation_type()
            .ok_or(GraphQLError::UnsupportedOperation(OperationType::Mutation))?,
        OperationType::Subscription => schema.concrete_subscription_type().ok_or(
            GraphQLError::UnsupportedOperation(OperationType::Subscription),
        )?,
    };

    let executor = Executor {
        schema,
        fragments,
        variables,
        root_value,
        context,
        errors: RwLock::new(
            coercion_warnings
                .into_iter()
                .map(|w| ExecutionError::at_origin(FieldError::new(w)))
                .collect(),
        ),
    };

    let serial = operation.item.operation_type == OperationType::Mutation;
    let selections: Vec<&Selection> = operation.item.selection_set.iter().collect();
    let result = executor
        .resolve_selection_set(root_type, root_value, selections, &[], serial)
        .await;

    if context.cancellation().is_cancelled() {
        return Err(GraphQLError::Cancelled);
    }

    let data = match result {
        Ok(v) => v,
        Err(Bubble) => Value::Null,
    };

    let mut errors = executor.errors.into_inner().expect("error sink not poisoned");
    errors.sort();
    Ok((data, errors))
}

/// Per-operation execution state shared by all in-flight fields.
struct Executor<'e> {
    schema: &'e Schema,
    fragments: FnvHashMap<&'e str, &'e Fragment>,
    variables: crate::variables::VariableValues,
    root_value: &'e Value,
    context: &'e ExecutionContext,
    errors: RwLock<Vec<ExecutionError>>,
}

impl<'e> Executor<'e> {
    fn push_error(&self, error: FieldError, location: SourcePosition, path: &[PathSegment]) {
        self.errors
            .write()
            .expect("error sink not poisoned")
            .push(ExecutionError::new(location, path.to_vec(), error));
    }

    /// Resolves one (possibly merged) selection set against an object type.
    fn resolve_selection_set<'a>(
        &'a self,
        object_type: &'a MetaType,
        object_value: &'a Value,
        selections: Vec<&'a Selection>,
        path: &'a [PathSegment],
        serial: bool,
    ) -> BoxFuture<'a, CompleteResult> {
        async move {
            let mut visited_fragments = FnvHashSet::default();
            let grouped = self.collect_fields(object_type, selections, &mut visited_fragments);

            let mut object = Object::with_capacity(grouped.len());
            let mut bubbled = false;

            if serial {
                for (response_key, fields) in grouped {
                    if self.context.cancellation().is_cancelled() {
                        break;
                    }
                    match self
                        .execute_field(object_type, object_value, response_key, &fields, path)
                        .await
                    {
                        Ok(v) => {
                            object.add_field(response_key, v);
                        }
                        Err(Bubble) => bubbled = true,
                    }
                }
            } else {
                let mut futures = grouped
                    .into_iter()
                    .map(|(response_key, fields)| {
                        async move {
                            let result = self
                                .execute_field(
                                    object_type,
                                    object_value,
                                    response_key,
                                    &fields,
                                    path,
                                )
                                .await;
                            (response_key, result)
                        }
                        .boxed()
                    })
                    .collect::<FuturesOrdered<_>>();

                while let Some((response_key, result)) = futures.next().await {
                    match result {
                        Ok(v) => {
                            object.add_field(response_key, v);
                        }
                        Err(Bubble) => bubbled = true,
                    }
                }
            }

            if bubbled {
                Err(Bubble)
            } else {
                Ok(Value::Object(object))
            }
        }
        .boxed()
    }

    /// Groups a selection set by response key, honoring `@skip`/`@include`
    /// and fragment type conditions. Field order is the first occurrence of
    /// each key after fragment expansion.
    fn collect_fields<'a>(
        &'a self,
        object_type: &'a MetaType,
        selections: Vec<&'a Selection>,
        visited_fragments: &mut FnvHashSet<&'a str>,
    ) -> IndexMap<&'a str, Vec<&'a Spanning<FieldNode>>> {
        let mut grouped: IndexMap<&'a str, Vec<&'a Spanning<FieldNode>>> = IndexMap::new();

        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if self.is_excluded(&field.item.directives) {
                        continue;
                    }
                    grouped
                        .entry(field.item.response_key())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    if self.is_excluded(&spread.item.directives) {
                        continue;
                    }
                    let name = spread.item.name.item.as_str();
                    // The same spread appearing twice contributes once.
                    if !visited_fragments.insert(name) {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(name) else {
                        continue;
                    };
                    if !self
                        .does_fragment_type_apply(object_type, &fragment.type_condition.item)
                    {
                        continue;
                    }
                    let inner = self.collect_fields(
                        object_type,
                        fragment.selection_set.iter().collect(),
                        visited_fragments,
                    );
                    for (key, mut fields) in inner {
                        grouped.entry(key).or_default().append(&mut fields);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    if self.is_excluded(&fragment.item.directives) {
                        continue;
                    }
                    if let Some(cond) = &fragment.item.type_condition {
                        if !self.does_fragment_type_apply(object_type, &cond.item) {
                            continue;
                        }
                    }
                    let inner = self.collect_fields(
                        object_type,
                        fragment.item.selection_set.iter().collect(),
                        visited_fragments,
                    );
                    for (key, mut fields) in inner {
                        grouped.entry(key).or_default().append(&mut fields);
                    }
                }
            }
        }

        grouped
    }

    /// Evaluates `@skip`/`@include` against the coerced variable values.
    fn is_excluded(&self, directives: &[Spanning<Directive>]) -> bool {
        for directive in directives {
            let name = directive.item.name.item.as_str();
            if name != "skip" && name != "include" {
                continue;
            }
            let condition = directive
                .item
                .arguments
                .iter()
                .find(|(arg_name, _)| arg_name.item == "if")
                .and_then(|(_, v)| match &v.item {
                    InputValue::Boolean(b) => Some(*b),
                    InputValue::Variable(var) => {
                        self.variables.get(var).and_then(Value::as_boolean_value)
                    }
                    _ => None,
                })
                .unwrap_or(false);

            if (name == "skip" && condition) || (name == "include" && !condition) {
                return true;
            }
        }
        false
    }

    /// Whether a fragment's type condition applies to the object type a
    /// selection currently executes on.
    fn does_fragment_type_apply(&self, object_type: &MetaType, type_condition: &str) -> bool {
        if object_type.name() == type_condition {
            return true;
        }
        match self.schema.concrete_type_by_name(type_condition) {
            Some(MetaType::Interface(_)) => match object_type {
                MetaType::Object(ObjectMeta {
                    interface_names, ..
                }) => interface_names.iter().any(|n| n == type_condition),
                _ => false,
            },
            Some(MetaType::Union(union)) => {
                union.of_type_names.iter().any(|n| n == object_type.name())
            }
            _ => false,
        }
    }

    /// Executes the field nodes grouped under one response key.
    async fn execute_field(
        &self,
        object_type: &MetaType,
        object_value: &Value,
        response_key: &str,
        fields: &[&Spanning<FieldNode>],
        path_prefix: &[PathSegment],
    ) -> CompleteResult {
        let field_node = fields[0];
        let field_name = field_node.item.name.item.as_str();
        let position = field_node.start;

        let mut path = path_prefix.to_vec();
        path.push(PathSegment::Field(response_key.to_owned()));

        if self.context.cancellation().is_cancelled() {
            return Ok(Value::Null);
        }

        if field_name == "__typename" {
            return Ok(Value::String(object_type.name().to_string()));
        }

        let Some(meta_field) = object_type.field_by_name(field_name) else {
            self.push_error(
                FieldError::new(format!(
                    r#"Unknown field "{field_name}" on type "{}""#,
                    object_type.name(),
                )),
                position,
                &path,
            );
            return Ok(Value::Null);
        };

        if meta_field.deprecation_status.is_deprecated() {
            self.push_error(
                FieldError::new(deprecated_note(
                    &format!(r#"Field "{field_name}""#),
                    meta_field.deprecation_status.reason(),
                )),
                position,
                &path,
            );
        }

        let args = match self.coerce_arguments(meta_field, field_node, position, &path) {
            Ok(args) => args,
            Err(e) => {
                self.push_error(e, position, &path);
                return if meta_field.field_type.is_non_null() {
                    Err(Bubble)
                } else {
                    Ok(Value::Null)
                };
            }
        };

        let info = ResolveInfo {
            field_name,
            field_type: &meta_field.field_type,
            parent_type_name: object_type.name(),
            parent_value: object_value,
            root_value: self.root_value,
            schema: self.schema,
            fragments: &self.fragments,
            variables: &self.variables,
            context: self.context,
            path: &path,
        };

        let mut resolution = match &meta_field.resolver {
            Some(resolver) => resolver(&args, &info),
            None => Resolution::Done(Ok(default_resolve(object_value, field_name))),
        };
        let resolved = loop {
            match resolution {
                Resolution::Done(res) => break res,
                Resolution::Pending(fut) => resolution = fut.await,
            }
        };

        match resolved {
            Ok(value) => {
                self.complete_value(&meta_field.field_type, value, fields, position, &path)
                    .await
            }
            Err(e) => {
                self.push_error(e, position, &path);
                if meta_field.field_type.is_non_null() {
                    Err(Bubble)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    /// Coerces the supplied arguments against a field's declared arguments:
    /// the argument node's value if present (variables resolved against the
    /// coerced variable map), else the declared default, else `null`.
    fn coerce_arguments(
        &self,
        meta_field: &MetaField,
        field_node: &Spanning<FieldNode>,
        position: SourcePosition,
        path: &[PathSegment],
    ) -> Result<Arguments, FieldError> {
        let mut warnings = Vec::new();
        let mut args = IndexMap::new();

        for meta_arg in &meta_field.arguments {
            let supplied = field_node
                .item
                .arguments
                .iter()
                .find(|(name, _)| name.item == meta_arg.name)
                .map(|(_, v)| &v.item);

            let value = match supplied {
                Some(raw) => {
                    if meta_arg.deprecation_status.is_deprecated() {
                        warnings.push(deprecated_note(
                            &format!(
                                r#"Argument "{}" of field "{}""#,
                                meta_arg.name, meta_field.name,
                            ),
                            meta_arg.deprecation_status.reason(),
                        ));
                    }
                    coerce_input_value(
                        self.schema,
                        &meta_arg.arg_type,
                        raw,
                        Some(&self.variables),
                        &Path::Root,
                        &mut warnings,
                    )
                    .map_err(|msg| {
                        FieldError::new(format!(
                            r#"Invalid value for argument "{}". {msg}."#,
                            meta_arg.name,
                        ))
                    })?
                }
                None => match &meta_arg.default_value {
                    Some(default) => default.clone(),
                    None => Value::Null,
                },
            };

            if meta_arg.arg_type.is_non_null() && value.is_null() {
                return Err(FieldError::new(format!(
                    r#"Argument "{}" of required type "{}" was not provided"#,
                    meta_arg.name, meta_arg.arg_type,
                )));
            }

            args.insert(meta_arg.name.clone(), value);
        }

        for warning in warnings {
            self.push_error(FieldError::new(warning), position, path);
        }

        Ok(Arguments::new(args))
    }

    /// Completes a resolved value against its declared type.
    ///
    /// At a non-`null` position a `null` result raises a field error and the
    /// propagation marker; at a nullable position the marker is absorbed and
    /// the value becomes `null`.
    fn complete_value<'a>(
        &'a self,
        t: &'a Type,
        value: Value,
        fields: &'a [&'a Spanning<FieldNode>],
        position: SourcePosition,
        path: &'a [PathSegment],
    ) -> BoxFuture<'a, CompleteResult> {
        async move {
            match t {
                Type::NonNullNamed(_) | Type::NonNullList(_) => {
                    let inner = t.clone().into_nullable();
                    match self
                        .complete_concrete(&inner, value, fields, position, path)
                        .await
                    {
                        Ok(Value::Null) => {
                            self.push_error(
                                FieldError::new("Cannot return null for non-nullable field"),
                                position,
                                path,
                            );
                            Err(Bubble)
                        }
                        other => other,
                    }
                }
                _ => match self
                    .complete_concrete(t, value, fields, position, path)
                    .await
                {
                    Err(Bubble) => Ok(Value::Null),
                    other => other,
                },
            }
        }
        .boxed()
    }

    fn complete_concrete<'a>(
        &'a self,
        t: &'a Type,
        value: Value,
        fields: &'a [&'a Spanning<FieldNode>],
        position: SourcePosition,
        path: &'a [PathSegment],
    ) -> BoxFuture<'a, CompleteResult> {
        async move {
            if value.is_null() {
                return Ok(Value::Null);
            }

            match t {
                Type::List(inner) => {
                    let Value::List(items) = value else {
                        self.push_error(
                            FieldError::new(format!(
                                r#"Expected a list value for type "{t}""#
                            )),
                            position,
                            path,
                        );
                        return Err(Bubble);
                    };
                    let mut out = Vec::with_capacity(items.len());
                    for (i, item) in items.into_iter().enumerate() {
                        let mut item_path = path.to_vec();
                        item_path.push(PathSegment::Index(i));
                        out.push(
                            self.complete_value(inner, item, fields, position, &item_path)
                                .await?,
                        );
                    }
                    Ok(Value::List(out))
                }

                Type::Named(name) => {
                    let Some(meta) = self.schema.concrete_type_by_name(name) else {
                        self.push_error(
                            FieldError::new(format!(r#"Unknown type "{name}""#)),
                            position,
                            path,
                        );
                        return Err(Bubble);
                    };
                    match meta {
                        MetaType::Scalar(scalar) => match (scalar.serialize_fn)(&value) {
                            Ok(v) => Ok(v),
                            Err(e) => {
                                self.push_error(e, position, path);
                                Err(Bubble)
                            }
                        },
                        MetaType::Enum(enum_meta) => match enum_meta.name_for_value(&value) {
                            Some(variant) => Ok(Value::Enum(variant.clone())),
                            None => {
                                self.push_error(
                                    FieldError::new(format!(
                                        r#"Cannot serialize value as enum "{name}""#
                                    )),
                                    position,
                                    path,
                                );
                                Err(Bubble)
                            }
                        },
                        MetaType::Object(_) => {
                            self.resolve_selection_set(
                                meta,
                                &value,
                                merged_selections(fields),
                                path,
                                false,
                            )
                            .await
                        }
                        MetaType::Interface(_) | MetaType::Union(_) => {
                            match self.resolve_abstract_type(meta, &value) {
                                Ok(concrete) => {
                                    self.resolve_selection_set(
                                        concrete,
                                        &value,
                                        merged_selections(fields),
                                        path,
                                        false,
                                    )
                                    .await
                                }
                                Err(e) => {
                                    self.push_error(e, position, path);
                                    Err(Bubble)
                                }
                            }
                        }
                        MetaType::InputObject(_) => {
                            self.push_error(
                                FieldError::new(format!(
                                    r#"Type "{name}" is not an output type"#
                                )),
                                position,
                                path,
                            );
                            Err(Bubble)
                        }
                    }
                }

                Type::NonNullNamed(_) | Type::NonNullList(_) => {
                    unreachable!("non-null wrappers are handled by complete_value")
                }
            }
        }
        .boxed()
    }

    /// Picks the concrete object type a value of an abstract type
    /// represents: the type's `resolve_type` hook if present, else the
    /// single possible type whose `is_type_of` accepts the value.
    fn resolve_abstract_type(
        &self,
        abstract_type: &MetaType,
        value: &Value,
    ) -> Result<&MetaType, FieldError> {
        let resolve_type = match abstract_type {
            MetaType::Interface(i) => i.resolve_type.as_ref(),
            MetaType::Union(u) => u.resolve_type.as_ref(),
            _ => None,
        };

        if let Some(resolve_type) = resolve_type {
            let Some(name) = resolve_type(value) else {
                return Err(FieldError::new(format!(
                    r#"Could not resolve value into a member of "{}""#,
                    abstract_type.name(),
                )));
            };
            return match self.schema.concrete_type_by_name(&name) {
                Some(meta @ MetaType::Object(_))
                    if self.schema.is_possible_type(abstract_type, meta) =>
                {
                    Ok(meta)
                }
                _ => Err(FieldError::new(format!(
                    r#""{name}" is not a member of "{}""#,
                    abstract_type.name(),
                ))),
            };
        }

        let candidates: Vec<&MetaType> = self
            .schema
            .possible_types(abstract_type)
            .into_iter()
            .filter(|t| match t {
                MetaType::Object(obj) => obj.is_type_of.is_some_and(|f| f(value)),
                _ => false,
            })
            .collect();

        match candidates.as_slice() {
            [single] => Ok(single),
            [] => Err(FieldError::new(format!(
                r#"Could not resolve value into a member of "{}""#,
                abstract_type.name(),
            ))),
            _ => Err(FieldError::new(format!(
                r#"Value matches multiple members of "{}""#,
                abstract_type.name(),
            ))),
        }
    }
}

/// The implicit resolver: read the field's name out of the parent object
/// value.
fn default_resolve(parent: &Value, field_name: &str) -> Value {
    parent
        .as_object_value()
        .and_then(|obj| obj.get_field_value(field_name))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Merges the sub-selections of all field nodes grouped under one response
/// key into a single selection list.
fn merged_selections<'a>(fields: &'a [&'a Spanning<FieldNode>]) -> Vec<&'a Selection> {
    fields
        .iter()
        .flat_map(|f| f.item.selection_set.iter())
        .collect()
}
