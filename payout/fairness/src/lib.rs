pub mod gini;
pub mod scorer;
pub mod types;

pub use gini::gini_coefficient;
pub use scorer::{assess_distribution, fairness_score, passes_threshold};
pub use types::{FairnessAssessment, FairnessCategory, FairnessFlag};
