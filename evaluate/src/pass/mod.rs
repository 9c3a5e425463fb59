pub mod activity;
pub mod issues;
pub mod maintainability;
pub mod maturity;

use entity::repository::Model as RepositoryRow;

/// A statistic computed over one numeric column of the snapshot.
pub trait EvaluationPass: Send + Sync {
    /// Value of the column for one row, `None` when the row holds no valid number.
    fn apply(&self, row: &RepositoryRow) -> Option<f64>;
    /// Label of the median in the summary table.
    fn name(&self) -> &'static str;
}
