use crate::pass::{EvaluationPass, RepositoryRow};

/// Repository age in months.
pub struct Maturity;

impl EvaluationPass for Maturity {
    fn apply(&self, row: &RepositoryRow) -> Option<f64> {
        row.age_months
    }

    fn name(&self) -> &'static str {
        "RQ01_IdadeMeses_mediana"
    }
}
