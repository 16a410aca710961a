pub mod evaluate;
pub mod prompts;

pub use evaluate::{Evaluation, EvaluationResult, Intake, evaluate};
