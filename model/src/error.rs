use thiserror::Error;

/// A single repository record that cannot be turned into metrics.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed repository node: {0}")]
    Node(#[from] serde_json::Error),

    #[error("invalid timestamp in `{field}`: {value:?}")]
    Timestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("negative count in `{field}`: {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("closed issues ({closed}) exceed total issues ({total})")]
    InconsistentIssues { closed: i64, total: i64 },
}
