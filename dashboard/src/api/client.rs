use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cancellation::CancellationToken;

use super::error::ApiError;
use super::models::{
    AccessToken, NewUser, RedirectHistory, ShortUrl, ShortenRequest, UserProfile,
};

/// Talks to the URL-shortening backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_owned()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    /// Creates an account. The response body is not used.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint(&["register"])).json(&NewUser {
            username,
            password,
            full_name,
        });
        self.send(request).await?;
        Ok(())
    }

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["login"]))
            .form(&[("username", username), ("password", password)]);
        let token: AccessToken = decode(&self.send(request).await?)?;
        debug!(
            token_type = token.token_type.as_deref().unwrap_or("bearer"),
            "Obtained access token"
        );
        Ok(token.access_token)
    }

    pub async fn profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        let request = self.authorized(self.http.get(self.endpoint(&["me"])), token);
        decode(&self.send(request).await?)
    }

    pub async fn list_urls(&self, token: &str) -> Result<Vec<ShortUrl>, ApiError> {
        let request = self.authorized(self.http.get(self.endpoint(&["me", "urls"])), token);
        decode(&self.send(request).await?)
    }

    pub async fn shorten(&self, token: &str, url: &str) -> Result<ShortUrl, ApiError> {
        let request = self
            .authorized(self.http.post(self.endpoint(&["me", "urls"])), token)
            .json(&ShortenRequest { url });
        decode(&self.send(request).await?)
    }

    /// Fetches every recorded redirect of `short`.
    ///
    /// Resolves to [`ApiError::Superseded`] as soon as `cancel` fires, and
    /// also when it fired while the body was being read, so a late response
    /// is never handed to the caller. A body that is not an array yields an
    /// empty history.
    pub async fn fetch_redirects(
        &self,
        token: &str,
        short: &str,
        cancel: &mut CancellationToken,
    ) -> Result<RedirectHistory, ApiError> {
        let request = self.authorized(
            self.http
                .get(self.endpoint(&["me", "links", short, "redirects"])),
            token,
        );

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(ApiError::Superseded),
            body = self.send(request) => body?,
        };
        if cancel.is_cancelled() {
            return Err(ApiError::Superseded);
        }

        let value: Value = decode(&body)?;
        let history = RedirectHistory::from_json(&value);
        if history.malformed {
            warn!(short, "Redirect data is not an array, treating as empty");
        }
        if history.dropped > 0 {
            warn!(
                short,
                dropped = history.dropped,
                "Skipped unreadable redirect timestamps"
            );
        }
        Ok(history)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Sends the request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "Backend responded");

        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::Status {
                status,
                detail: error_detail(&body),
            })
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Pulls a human-readable message out of an error body (`{"detail": ...}` or
/// `{"message": ...}`). Structured validation details are not shown.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| value.get(key)?.as_str().map(str::to_owned))
}
