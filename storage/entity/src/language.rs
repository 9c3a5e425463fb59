use serde::{Deserialize, Serialize};

/// Per-language medians for one of the most common languages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub language: String,
    pub repos: usize,
    pub prs_per_month_median: Option<f64>,
    pub releases_per_month_median: Option<f64>,
    pub days_since_update_median: Option<f64>,
}

pub const HEADERS: [&str; 5] = [
    "Linguagem",
    "Repos",
    "PRsMes_mediana",
    "ReleasesMes_mediana",
    "DiasDesdeAtualizacao_mediana",
];

/// How many repositories use a language as their primary one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub language: String,
    pub repos: usize,
}

pub const COUNT_HEADERS: [&str; 2] = ["Linguagem", "Repos"];
