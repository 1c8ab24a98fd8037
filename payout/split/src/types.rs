/// Errors from the split calculator.
///
/// All of these indicate a caller-side sequencing bug (completing before
/// any contribution exists) rather than a transient condition.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("no contributions to distribute")]
    NoContributions,

    #[error("total contribution weight is zero")]
    ZeroTotalWeight,

    #[error("bounty amount is zero")]
    ZeroBounty,
}
