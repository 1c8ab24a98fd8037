use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recorded contribution, determining its payout weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributionCategory {
    /// Primary implementation work: weight 30.
    Implementation,
    /// Code or design review: weight 20.
    Review,
    /// Design and specification work: weight 15.
    Design,
    /// Test authoring and verification: weight 10.
    Testing,
    /// Documentation: weight 10.
    Documentation,
    /// Issue triage and reproduction: weight 5.
    Triage,
}

impl ContributionCategory {
    /// The fixed payout weight for this category.
    ///
    /// Weights are assigned to a contribution once at creation and never
    /// change afterward, so edits to this table only affect future
    /// contributions.
    pub fn weight(&self) -> u32 {
        match self {
            ContributionCategory::Implementation => 30,
            ContributionCategory::Review => 20,
            ContributionCategory::Design => 15,
            ContributionCategory::Testing => 10,
            ContributionCategory::Documentation => 10,
            ContributionCategory::Triage => 5,
        }
    }

    /// All categories, for iteration in displays and validation.
    pub fn all() -> &'static [ContributionCategory] {
        &[
            ContributionCategory::Implementation,
            ContributionCategory::Review,
            ContributionCategory::Design,
            ContributionCategory::Testing,
            ContributionCategory::Documentation,
            ContributionCategory::Triage,
        ]
    }

    /// Parse a category from a case-insensitive name.
    pub fn parse(name: &str) -> Option<ContributionCategory> {
        match name.to_lowercase().as_str() {
            "implementation" | "impl" | "code" => Some(ContributionCategory::Implementation),
            "review" => Some(ContributionCategory::Review),
            "design" => Some(ContributionCategory::Design),
            "testing" | "test" => Some(ContributionCategory::Testing),
            "documentation" | "docs" => Some(ContributionCategory::Documentation),
            "triage" => Some(ContributionCategory::Triage),
            _ => None,
        }
    }
}

impl fmt::Display for ContributionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContributionCategory::Implementation => write!(f, "Implementation"),
            ContributionCategory::Review => write!(f, "Review"),
            ContributionCategory::Design => write!(f, "Design"),
            ContributionCategory::Testing => write!(f, "Testing"),
            ContributionCategory::Documentation => write!(f, "Documentation"),
            ContributionCategory::Triage => write!(f, "Triage"),
        }
    }
}
