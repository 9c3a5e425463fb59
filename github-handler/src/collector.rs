use futures::stream::{self, Stream, TryStreamExt};
use model::github::{GraphQLResponse, SearchResult};
use model::RawRepository;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{query, CollectError, GraphQlTransport, RetryPolicy, TransportError};

/// Walks the search results page by page until `target` repositories have been
/// gathered or the server runs out of pages.
pub struct Collector<T> {
    transport: T,
    page_size: usize,
    politeness_delay: Duration,
    retry: RetryPolicy,
}

struct PageState {
    cursor: Option<String>,
    remaining: usize,
    page: usize,
    done: bool,
}

impl<T: GraphQlTransport> Collector<T> {
    pub fn new(transport: T, page_size: usize, politeness_delay: Duration, retry: RetryPolicy) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
            politeness_delay,
            retry,
        }
    }

    /// Lazily yields at most `target` repositories. Pages are only requested
    /// as the stream is polled; the cursor lives inside the stream, so a
    /// dropped stream cannot be resumed.
    pub fn stream(
        &self,
        target: usize,
    ) -> impl Stream<Item = Result<RawRepository, CollectError>> + '_ {
        let state = PageState {
            cursor: None,
            remaining: target,
            page: 0,
            done: target == 0,
        };
        stream::try_unfold(state, move |mut state| async move {
            if state.done {
                return Ok::<_, CollectError>(None);
            }
            if state.page > 0 {
                sleep(self.politeness_delay).await;
            }
            state.page += 1;

            let first = self.page_size.min(state.remaining);
            let result = self.fetch_page(state.cursor.as_deref(), first).await?;
            let node_count = result.nodes.len();
            let repos: Vec<RawRepository> = decode_nodes(result.nodes)
                .into_iter()
                .take(state.remaining)
                .collect();
            state.remaining -= repos.len();
            info!(
                "Page {}: {} repositories ({} still wanted)",
                state.page,
                repos.len(),
                state.remaining
            );

            let page_info = result.page_info;
            match (page_info.has_next_page, page_info.end_cursor) {
                _ if state.remaining == 0 => state.done = true,
                _ if node_count == 0 => {
                    warn!("Server returned an empty page, stopping");
                    state.done = true;
                }
                (true, Some(cursor)) => state.cursor = Some(cursor),
                (true, None) => {
                    warn!("Server reported another page without a cursor, stopping");
                    state.done = true;
                }
                (false, _) => {
                    debug!("No further pages");
                    state.done = true;
                }
            }
            Ok::<_, CollectError>(Some((repos, state)))
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok)))
        .try_flatten()
    }

    pub async fn collect(&self, target: usize) -> Result<Vec<RawRepository>, CollectError> {
        self.stream(target).try_collect().await
    }

    async fn fetch_page(
        &self,
        cursor: Option<&str>,
        first: usize,
    ) -> Result<SearchResult, CollectError> {
        let variables = query::variables(first, cursor);
        let attempts = self.retry.attempts();
        let mut attempt = 1;
        loop {
            let outcome = match self
                .transport
                .execute(query::SEARCH_REPOSITORIES, variables.clone())
                .await
            {
                Ok(body) => decode_page(body),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(page) => return Ok(page),
                Err(source) if attempt >= attempts => {
                    return Err(CollectError::RetriesExhausted {
                        attempts: attempt,
                        source,
                    })
                }
                Err(e) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Page fetch failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt, attempts, e, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Unpacks the GraphQL envelope. A body without `data` is a failed page even
/// when the HTTP status was fine.
fn decode_page(body: Value) -> Result<SearchResult, TransportError> {
    let response: GraphQLResponse =
        serde_json::from_value(body).map_err(|e| TransportError::Malformed(e.to_string()))?;
    let messages = response
        .errors
        .map(|errors| {
            errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|m| !m.is_empty());
    match response.data {
        Some(data) => {
            if let Some(messages) = messages {
                warn!("Partial GraphQL response: {}", messages);
            }
            Ok(data.search)
        }
        None => Err(TransportError::Malformed(
            messages.unwrap_or_else(|| "response carries no data".to_owned()),
        )),
    }
}

fn decode_nodes(nodes: Vec<Value>) -> Vec<RawRepository> {
    nodes
        .into_iter()
        .filter_map(|node| match RawRepository::from_node(node) {
            Ok(repo) => Some(repo),
            Err(e) => {
                warn!("Skipping search node: {}", e);
                None
            }
        })
        .collect()
}
