pub mod category;
pub mod money;
pub mod types;

pub use category::ContributionCategory;
pub use types::*;
