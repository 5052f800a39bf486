use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::config::settings::Credentials;
use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::public_key::{PublicKey, SealedSecret};
use crate::core::traits::remote::{RemoteError, RemoteService};

/// Default GitHub API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Per-request timeout; the pipeline has no timeout of its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION: &str = "2022-11-28";

/// GitHub REST client for Actions secrets, variables and environments.
///
/// Variable creation is completed as an update when the variable already
/// exists, so re-running an apply never trips on `409 Conflict`.
pub struct GitHubClient {
    client: Client,
    owner: String,
    token: String,
    api_base: Url,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

#[derive(Serialize)]
struct SecretBody<'a> {
    encrypted_value: &'a str,
    key_id: &'a str,
}

#[derive(Serialize)]
struct VariableBody<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

impl GitHubClient {
    /// Build a client acting on behalf of `credentials.owner`.
    pub fn new(credentials: &Credentials, api_url: &str) -> Result<Self> {
        let api_base = Url::parse(api_url).map_err(|e| invalid_api_url(api_url, &e.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(invalid_api_url(api_url, "not a base URL"));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("envsync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EnvsyncError::Remote {
                step: "Creating HTTP client".into(),
                target: api_url.to_string(),
                source: RemoteError::Network(e.to_string()),
            })?;

        Ok(Self {
            client,
            owner: credentials.owner.clone(),
            token: credentials.token.clone(),
            api_base,
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/{rest...}` with every segment escaped.
    fn repo_url(&self, repo: &str, rest: &[&str]) -> std::result::Result<Url, RemoteError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::Network(format!("invalid API base {}", self.api_base)))?;
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), repo])
                .extend(rest);
        }
        Ok(url)
    }

    fn headers(&self) -> std::result::Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| RemoteError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    async fn execute(&self, request: RequestBuilder) -> std::result::Result<Response, RemoteError> {
        request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))
    }

    /// Send a request and turn any non-2xx answer into an error.
    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, RemoteError> {
        let response = self.execute(request).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn public_key(&self, url: Url) -> std::result::Result<PublicKey, RemoteError> {
        let response = self.send(self.client.get(url)).await?;
        response
            .json::<PublicKey>()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("public key: {e}")))
    }

    async fn put_secret(&self, url: Url, secret: &SealedSecret) -> std::result::Result<(), RemoteError> {
        let body = SecretBody {
            encrypted_value: &secret.encrypted_value,
            key_id: &secret.key_id,
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    /// POST a new variable; on conflict PATCH the existing one.
    async fn create_variable(
        &self,
        collection: Url,
        name: &str,
        value: &str,
    ) -> std::result::Result<(), RemoteError> {
        let body = VariableBody { name, value };
        let response = self
            .execute(self.client.post(collection.clone()).json(&body))
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => {
                let mut item = collection;
                if let Ok(mut segments) = item.path_segments_mut() {
                    segments.push(name);
                }
                self.send(self.client.patch(item).json(&body)).await?;
                Ok(())
            }
            _ => Err(error_from_response(response).await),
        }
    }
}

fn invalid_api_url(api_url: &str, detail: &str) -> EnvsyncError {
    EnvsyncError::Remote {
        step: "Parsing API URL".into(),
        target: api_url.to_string(),
        source: RemoteError::Network(detail.to_string()),
    }
}

/// Map an error response to a `RemoteError`.
async fn error_from_response(response: Response) -> RemoteError {
    let status = response.status();
    let rate_limit_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");

    let message = match response.json::<GitHubErrorResponse>().await {
        Ok(err) => err.message,
        Err(_) => "Unknown error".to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED => RemoteError::AuthFailed("Invalid or expired token".into()),
        StatusCode::FORBIDDEN if rate_limit_exhausted => RemoteError::RateLimited,
        StatusCode::FORBIDDEN => RemoteError::AuthFailed(format!("Permission denied: {message}")),
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
        _ if status.is_server_error() => RemoteError::Api {
            status: status.as_u16(),
            message: format!("GitHub server error: {message}"),
        },
        _ => RemoteError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl RemoteService for GitHubClient {
    async fn upsert_environment(
        &self,
        repo: &str,
        environment: &str,
    ) -> std::result::Result<(), RemoteError> {
        let url = self.repo_url(repo, &["environments", environment])?;
        self.send(self.client.put(url).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    async fn environment_public_key(
        &self,
        repo: &str,
        environment: &str,
    ) -> std::result::Result<PublicKey, RemoteError> {
        let url = self.repo_url(repo, &["environments", environment, "secrets", "public-key"])?;
        self.public_key(url).await
    }

    async fn repository_public_key(&self, repo: &str) -> std::result::Result<PublicKey, RemoteError> {
        let url = self.repo_url(repo, &["actions", "secrets", "public-key"])?;
        self.public_key(url).await
    }

    async fn put_environment_secret(
        &self,
        repo: &str,
        environment: &str,
        secret: &SealedSecret,
    ) -> std::result::Result<(), RemoteError> {
        let url = self.repo_url(repo, &["environments", environment, "secrets", secret.name.as_str()])?;
        self.put_secret(url, secret).await
    }

    async fn put_repository_secret(
        &self,
        repo: &str,
        secret: &SealedSecret,
    ) -> std::result::Result<(), RemoteError> {
        let url = self.repo_url(repo, &["actions", "secrets", secret.name.as_str()])?;
        self.put_secret(url, secret).await
    }

    async fn create_environment_variable(
        &self,
        repo: &str,
        environment: &str,
        name: &str,
        value: &str,
    ) -> std::result::Result<(), RemoteError> {
        let url = self.repo_url(repo, &["environments", environment, "variables"])?;
        self.create_variable(url, name, value).await
    }

    async fn create_repository_variable(
        &self,
        repo: &str,
        name: &str,
        value: &str,
    ) -> std::result::Result<(), RemoteError> {
        let url = self.repo_url(repo, &["actions", "variables"])?;
        self.create_variable(url, name, value).await
    }
}
