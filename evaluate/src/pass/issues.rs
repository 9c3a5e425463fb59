use crate::pass::{EvaluationPass, RepositoryRow};

/// Share of issues that are closed, in percent.
pub struct IssueClosure;

impl EvaluationPass for IssueClosure {
    fn apply(&self, row: &RepositoryRow) -> Option<f64> {
        row.percent_closed
    }

    fn name(&self) -> &'static str {
        "RQ06_PctIssuesFechadas_mediana"
    }
}
