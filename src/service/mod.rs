pub mod analysis;
pub mod evaluator;
pub mod pricing;

pub use evaluator::AuditEvaluator;
