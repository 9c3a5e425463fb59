use thiserror::Error;

/// A page could not be fetched. Always retried by the collector.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed GraphQL response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("giving up on page after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}
