//! The contract between the execution engine and field resolvers.

use std::{
    any::Any,
    fmt,
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::{
    ast::{Fragment, Type},
    executor::PathSegment,
    schema::model::Schema,
    value::Value,
    variables::VariableValues,
};

/// Error produced while resolving or completing a single field.
///
/// Field errors are non-fatal: they are recorded with the failing field's
/// path and the field becomes `null`, subject to non-`null` propagation.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct FieldError {
    message: String,
}

impl FieldError {
    /// Construct a new error with the provided message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Conversion into a [`FieldError`], for resolvers that fail with their own
/// error types.
pub trait IntoFieldError {
    /// Performs the conversion.
    fn into_field_error(self) -> FieldError;
}

impl<T: fmt::Display> IntoFieldError for T {
    fn into_field_error(self) -> FieldError {
        FieldError::new(self.to_string())
    }
}

/// The result of resolving the value of a field.
pub type FieldResult<T = Value> = Result<T, FieldError>;

/// What a resolver hands back to the executor.
///
/// A resolver either produces a value (or error) immediately, or a future
/// the executor awaits before completing the field.
pub enum Resolution {
    /// The field resolved synchronously.
    Done(FieldResult),
    /// The field resolves asynchronously.
    Pending(BoxFuture<'static, Resolution>),
}

impl Resolution {
    /// A successfully resolved value.
    pub fn ok(value: impl Into<Value>) -> Self {
        Self::Done(Ok(value.into()))
    }

    /// A field error.
    pub fn err(error: impl IntoFieldError) -> Self {
        Self::Done(Err(error.into_field_error()))
    }

    /// A resolution that completes later.
    pub fn future(fut: impl Future<Output = Resolution> + Send + 'static) -> Self {
        Self::Pending(Box::pin(fut))
    }
}

impl<T: Into<Value>> From<FieldResult<T>> for Resolution {
    fn from(res: FieldResult<T>) -> Self {
        Self::Done(res.map(Into::into))
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(res) => f.debug_tuple("Done").field(res).finish(),
            Self::Pending(_) => f.debug_tuple("Pending").finish_non_exhaustive(),
        }
    }
}

/// A field resolver.
///
/// Receives the coerced [`Arguments`] of the field and a [`ResolveInfo`]
/// describing the resolution site. A field without a resolver reads the
/// field's name out of the parent object value.
pub type ResolverFn = Arc<dyn Fn(&Arguments, &ResolveInfo<'_>) -> Resolution + Send + Sync>;

/// Decides whether a value is an instance of an object type, used when
/// resolving abstract types without an explicit `resolve_type`.
pub type IsTypeOfFn = fn(&Value) -> bool;

/// Resolves a value of an interface or union into the name of the concrete
/// object type it represents.
pub type ResolveTypeFn = Arc<dyn Fn(&Value) -> Option<ArcStr> + Send + Sync>;

/// Coerced arguments of a single field resolution, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<ArcStr, Value>,
}

impl Arguments {
    #[doc(hidden)]
    pub fn new(args: IndexMap<ArcStr, Value>) -> Self {
        Self { args }
    }

    /// Get an argument's value.
    ///
    /// Declared arguments are always present: defaulted or unsupplied
    /// nullable arguments are bound to [`Value::Null`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Get an argument as a string slice, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_string_value)
    }

    /// Get an argument as an integer, if it is one.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int_value)
    }

    /// Get an argument as a float, if it is numeric.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_float_value)
    }

    /// Get an argument as a boolean, if it is one.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_boolean_value)
    }

    /// Iterate over all argument name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &Value)> {
        self.args.iter()
    }

    /// The number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether the field declares no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A cloneable cancellation flag carried by the [`ExecutionContext`].
///
/// Raising it makes the running operation stop scheduling further fields and
/// fail with a cancellation error; in-flight work is discarded.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Create a fresh, unraised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Opaque per-operation state threaded through to every resolver.
///
/// Carries an optional user-provided data slot (database handles, session
/// information) and the operation's cancellation flag. The executor never
/// inspects the data slot.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    data: Option<Arc<dyn Any + Send + Sync>>,
    cancellation: Cancellation,
}

impl ExecutionContext {
    /// Context carrying the provided user data.
    pub fn new(data: impl Any + Send + Sync) -> Self {
        Self {
            data: Some(Arc::new(data)),
            cancellation: Cancellation::new(),
        }
    }

    /// Replaces the cancellation flag, so the caller can keep a handle to it.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Typed access to the user data slot.
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|data| data.downcast_ref())
    }

    /// The operation's cancellation flag.
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("data", &self.data.as_ref().map(|_| ".."))
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

/// Everything a resolver can know about the site it is resolving.
pub struct ResolveInfo<'a> {
    /// Name of the field being resolved.
    pub field_name: &'a str,
    /// Declared type of the field.
    pub field_type: &'a Type,
    /// Name of the type the field is looked up on.
    pub parent_type_name: &'a str,
    /// The value the parent field resolved to.
    pub parent_value: &'a Value,
    /// The value execution started from.
    pub root_value: &'a Value,
    /// The schema the operation executes against.
    pub schema: &'a Schema,
    /// Fragments of the executing document, by name.
    pub fragments: &'a FnvHashMap<&'a str, &'a Fragment>,
    /// The operation's coerced variable values.
    pub variables: &'a VariableValues,
    /// The per-operation context.
    pub context: &'a ExecutionContext,
    /// Path from the response root to this field.
    pub path: &'a [PathSegment],
}
