mod async_await;
mod enums;
mod executor;
mod introspection;
mod mutations;
mod variables;
