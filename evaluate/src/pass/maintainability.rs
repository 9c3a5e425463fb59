use crate::pass::{EvaluationPass, RepositoryRow};

/// Days since the last update.
pub struct Maintainability;

impl EvaluationPass for Maintainability {
    fn apply(&self, row: &RepositoryRow) -> Option<f64> {
        row.days_since_update
    }

    fn name(&self) -> &'static str {
        "RQ04_DiasDesdeAtualizacao_mediana"
    }
}
