//! Wormwood is a dynamic [GraphQL] server library.
//!
//! Schemas are plain runtime data: type metadata records carrying resolver
//! functions, assembled with a [`SchemaBuilder`] and verified once at build
//! time. One tree-walking execution engine serves user queries, mutations,
//! subscriptions' initial payloads, and schema introspection alike.
//!
//! Parsing is delegated to the [`graphql-parser`] crate; validation,
//! variable coercion and execution live here.
//!
//! ```rust
//! use wormwood::{meta::Field, ExecuteOptions, Resolution, SchemaBuilder, Type};
//!
//! let schema = SchemaBuilder::new()
//!     .query(|obj| {
//!         obj.field(
//!             Field::new("version", Type::named("String"))
//!                 .resolver(|_, _| Resolution::ok("0.1")),
//!         )
//!     })
//!     .build()
//!     .unwrap();
//!
//! let response = wormwood::run_sync(&schema, "{ version }", ExecuteOptions::default());
//! assert!(response.is_ok());
//! assert_eq!(
//!     serde_json::to_string(&response).unwrap(),
//!     r#"{"data":{"version":"0.1"}}"#,
//! );
//! ```
//!
//! [GraphQL]: https://graphql.org
//! [`graphql-parser`]: https://docs.rs/graphql-parser

pub mod ast;
pub mod executor;
#[cfg(test)]
mod executor_tests;
mod introspection;
pub mod parser;
pub mod resolve;
mod scalars;
pub(crate) mod schema;
mod util;
pub mod validation;
mod value;
mod variables;

use derive_more::with_trait::{Display, From};
use itertools::Itertools as _;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    executor::{execute_validated_query, get_operation},
    validation::visit_all_rules,
};

pub use crate::{
    ast::{
        Definition, Document, InputValue, Operation, OperationType, Selection, SourcePosition,
        Spanning, Type,
    },
    executor::{ExecutionError, PathSegment},
    parser::{parse, ParseError},
    resolve::{
        Arguments, Cancellation, ExecutionContext, FieldError, FieldResult, IntoFieldError,
        Resolution, ResolveInfo, ResolverFn,
    },
    schema::{
        builder::SchemaBuilder,
        meta,
        model::{DirectiveLocation, DirectiveType, Schema, SchemaError, TypeType},
    },
    validation::RuleError,
    value::{Object, Value},
    variables::{VariableValues, Variables},
};

/// An error that prevented the execution of an operation.
#[derive(Debug, Display, From)]
pub enum GraphQLError {
    /// The document did not parse.
    ParseError(ParseError),
    /// The document did not pass validation.
    #[display("{}", _0.iter().format("\n"))]
    #[from(ignore)]
    ValidationError(Vec<RuleError>),
    /// The raw variable values did not coerce against the operation's
    /// variable declarations.
    #[display("{}", _0.iter().format("\n"))]
    #[from(ignore)]
    VariableCoercionError(Vec<RuleError>),
    /// An anonymous execution was requested on a document without
    /// operations.
    #[display("No operation provided")]
    NoOperationProvided,
    /// An anonymous execution was requested on a document with more than
    /// one operation.
    #[display("Must provide operation name if query contains multiple operations")]
    MultipleOperationsProvided,
    /// No operation with the requested name exists in the document.
    #[display("Unknown operation")]
    UnknownOperationName,
    /// The schema defines no root for the operation's kind.
    #[display("Schema is not configured for {_0}s")]
    #[from(ignore)]
    UnsupportedOperation(OperationType),
    /// Execution was cancelled through the context's cancellation flag.
    #[display("Execution cancelled")]
    Cancelled,
}

impl From<Vec<RuleError>> for GraphQLError {
    fn from(errors: Vec<RuleError>) -> Self {
        Self::ValidationError(errors)
    }
}

impl From<RuleError> for GraphQLError {
    fn from(error: RuleError) -> Self {
        vec![error].into()
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            Self::ValidationError(errs) | Self::VariableCoercionError(errs) => {
                Some(errs.first()?)
            }
            Self::NoOperationProvided
            | Self::MultipleOperationsProvided
            | Self::UnknownOperationName
            | Self::UnsupportedOperation(_)
            | Self::Cancelled => None,
        }
    }
}

impl Serialize for GraphQLError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct SerializeHelper {
            message: String,
        }

        match self {
            Self::ValidationError(errs) | Self::VariableCoercionError(errs) => {
                errs.serialize(serializer)
            }
            other => [SerializeHelper {
                message: other.to_string(),
            }]
            .serialize(serializer),
        }
    }
}

/// Everything an execution accepts besides the schema and the document.
#[derive(Debug, Default)]
pub struct ExecuteOptions {
    /// Which operation of the document to execute. Required when the
    /// document defines more than one.
    pub operation_name: Option<String>,
    /// The raw variable values.
    pub variables: Variables,
    /// The value execution starts from; handed to root resolvers as their
    /// parent value.
    pub root_value: Value,
    /// Opaque per-operation state handed to every resolver.
    pub context: ExecutionContext,
}

/// The outcome of running an operation, in wire shape.
///
/// Serializes to `{"data": ..}` with an `"errors"` key only when there are
/// errors, and to `{"errors": ..}` alone when a fatal error prevented
/// execution.
pub struct Response(Result<(Value, Vec<ExecutionError>), GraphQLError>);

impl Response {
    /// Whether execution produced data.
    ///
    /// There may still be field errors in an `is_ok` response; partial
    /// results are ordinary in GraphQL.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    /// The data tree, when execution produced one.
    pub fn data(&self) -> Option<&Value> {
        self.0.as_ref().ok().map(|(data, _)| data)
    }

    /// The non-fatal errors collected during execution.
    pub fn errors(&self) -> &[ExecutionError] {
        self.0.as_ref().map(|(_, errs)| errs.as_slice()).unwrap_or(&[])
    }

    /// The underlying result.
    pub fn into_inner(self) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        self.0
    }
}

impl From<Result<(Value, Vec<ExecutionError>), GraphQLError>> for Response {
    fn from(result: Result<(Value, Vec<ExecutionError>), GraphQLError>) -> Self {
        Self(result)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Ok((data, errors)) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("data", data)?;
                if !errors.is_empty() {
                    map.serialize_entry("errors", errors)?;
                }
                map.end()
            }
            Err(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("errors", err)?;
                map.end()
            }
        }
    }
}

/// Runs the static checks against a document.
///
/// A non-empty result means execution must not start; the errors become the
/// `errors` of the response.
pub fn validate(schema: &Schema, document: &Document) -> Vec<RuleError> {
    let mut ctx = validation::ValidatorContext::new(schema, document);
    visit_all_rules(&mut ctx, document);
    ctx.into_errors()
}

/// Executes a parsed (and validated) document against a schema.
pub async fn execute(
    schema: &Schema,
    document: &Document,
    options: &ExecuteOptions,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let operation = get_operation(document, options.operation_name.as_deref())?;
    execute_validated_query(
        document,
        operation,
        schema,
        &options.variables,
        &options.root_value,
        &options.context,
    )
    .await
}

/// Synchronous variant of [`execute`], driving resolver futures on the
/// current thread.
pub fn execute_sync(
    schema: &Schema,
    document: &Document,
    options: &ExecuteOptions,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    futures::executor::block_on(execute(schema, document, options))
}

/// Parses, validates, and executes a source document: the whole pipeline in
/// one call.
pub async fn run(schema: &Schema, source: &str, options: ExecuteOptions) -> Response {
    let document = match parse(source) {
        Ok(document) => document,
        Err(e) => return Response(Err(e.into())),
    };

    let errors = validate(schema, &document);
    if !errors.is_empty() {
        return Response(Err(errors.into()));
    }

    Response(execute(schema, &document, &options).await)
}

/// Synchronous variant of [`run`].
pub fn run_sync(schema: &Schema, source: &str, options: ExecuteOptions) -> Response {
    futures::executor::block_on(run(schema, source, options))
}
