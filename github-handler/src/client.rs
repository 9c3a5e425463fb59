use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::TransportError;

const USER_AGENT: &str = concat!("repo-metrics/", env!("CARGO_PKG_VERSION"));

/// Executes one GraphQL query and hands back the decoded JSON body.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: GraphQlTransport + ?Sized> GraphQlTransport for &T {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        (**self).execute(query, variables).await
    }
}

#[derive(Clone)]
pub struct GithubGraphQlClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GithubGraphQlClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl GraphQlTransport for GithubGraphQlClient {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        debug!("POST {} variables={}", self.endpoint, variables);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> GithubGraphQlClient {
        GithubGraphQlClient::new(
            format!("{}/graphql", server.url()),
            "secret-token",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_execute_posts_query_with_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer secret-token")
            .match_body(Matcher::PartialJson(json!({"variables": {"first": 3}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"ok": true}}"#)
            .create_async()
            .await;

        let body = client(&server)
            .execute("query { ok }", json!({"first": 3}))
            .await
            .unwrap();
        assert_eq!(body, json!({"data": {"ok": true}}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = client(&server)
            .execute("query { ok }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Status { status: 502, ref body } if body == "bad gateway"
        ));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let err = client(&server)
            .execute("query { ok }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }
}
