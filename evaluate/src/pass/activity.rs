use crate::pass::{EvaluationPass, RepositoryRow};

/// Merged pull requests per month of age.
pub struct PullRequestVelocity;

impl EvaluationPass for PullRequestVelocity {
    fn apply(&self, row: &RepositoryRow) -> Option<f64> {
        row.prs_per_month
    }

    fn name(&self) -> &'static str {
        "RQ02_PRsMes_mediana"
    }
}

/// Releases per month of age.
pub struct ReleaseVelocity;

impl EvaluationPass for ReleaseVelocity {
    fn apply(&self, row: &RepositoryRow) -> Option<f64> {
        row.releases_per_month
    }

    fn name(&self) -> &'static str {
        "RQ03_ReleasesMes_mediana"
    }
}
