use serde::{Deserialize, Serialize};

/// A labelled median over one column. `median` is `None` when no row carried
/// a valid number for the column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub label: String,
    pub median: Option<f64>,
}

pub const HEADERS: [&str; 2] = ["Métrica", "Mediana"];
