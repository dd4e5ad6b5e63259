//! Static checks run against a document and a schema before execution.

mod context;
mod multi_visitor;
pub mod rules;
#[cfg(test)]
pub(crate) mod test_harness;
mod traits;
mod visitor;

pub use self::{
    context::{RuleError, ValidatorContext},
    multi_visitor::{MultiVisitorCons, MultiVisitorNil},
    rules::visit_all_rules,
    traits::Visitor,
    visitor::visit,
};
