//! HTTP client for the Apollo people/organization API.

pub mod types;

use std::env;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::contact::SearchQuery;
use types::{
    EnrichRequest, EnrichResponse, ErrorBody, Organization, OrganizationResponse, Person,
    SearchResponse,
};

const API_BASE: &str = "https://api.apollo.io/api/v1";

#[derive(Debug, thiserror::Error)]
pub enum ApolloError {
    #[error("APOLLO_API_KEY not set. Create one under Settings > Integrations > API in Apollo")]
    ApiKeyNotSet,

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Apollo API rejected the API key. Check APOLLO_API_KEY.")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Apollo API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Apollo API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for the people search, people enrichment and organization endpoints.
///
/// Configuration via environment variables:
/// - `APOLLO_API_KEY`: required
/// - `APOLLO_BASE_URL`: optional override of `https://api.apollo.io/api/v1`
#[derive(Clone, Debug)]
pub struct ApolloClient {
    http: Client,
    api_key: ApiKey,
    base_url: Url,
}

impl ApolloClient {
    pub fn from_env(http: Client) -> Result<Self, ApolloError> {
        let api_key = env::var("APOLLO_API_KEY").map_err(|_| ApolloError::ApiKeyNotSet)?;
        let base_url = env::var("APOLLO_BASE_URL")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| API_BASE.to_string());
        Self::new(http, &api_key, &base_url)
    }

    pub fn new(http: Client, api_key: &str, base_url: &str) -> Result<Self, ApolloError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ApolloError::ApiKeyNotSet);
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| ApolloError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApolloError::InvalidBaseUrl(base_url.to_string()));
        }
        if base_url.scheme() != "https" {
            warn!(url = %base_url, "API key will be sent without TLS");
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.to_string()),
            base_url,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: Url::parse(base_url).unwrap(),
        }
    }

    /// Build an endpoint URL below the base. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Api-Key", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
    }

    /// Run a single-page people search for the query.
    pub async fn search_people(&self, query: &SearchQuery) -> Result<Vec<Person>, ApolloError> {
        let mut url = self.endpoint(&["mixed_people", "search"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q_organization_domains_list[]", &query.domain)
                .append_pair("person_titles[]", &query.designation)
                .append_pair("include_similar_titles", "true")
                .append_pair("page", "1")
                .append_pair("per_page", &query.limit.to_string());
            if let Some(location) = &query.location {
                pairs
                    .append_pair("person_locations[]", location)
                    .append_pair("organization_locations[]", location);
            }
        }

        let response = self
            .request(Method::POST, url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let body: SearchResponse = read_json(check_status(response).await?).await?;
        debug!(people = body.people.len(), "people search complete");
        Ok(body.people)
    }

    /// Look up a single person. Any status other than 200 means "no match"
    /// and yields `None`; transport failures and undecodable bodies are errors.
    pub async fn enrich_person(
        &self,
        request: &EnrichRequest,
    ) -> Result<Option<Person>, ApolloError> {
        let url = self.endpoint(&["people", "enrich"]);
        let response = self.request(Method::POST, url).json(request).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(strategy = request.strategy(), status = %status, "enrichment returned no result");
            return Ok(None);
        }

        let body: EnrichResponse = read_json(response).await?;
        Ok(body.person)
    }

    pub async fn get_organization(&self, id: &str) -> Result<Option<Organization>, ApolloError> {
        let url = self.endpoint(&["organizations", id]);
        let response = self.request(Method::GET, url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(org_id = id, status = %status, "organization lookup returned no result");
            return Ok(None);
        }

        let body: OrganizationResponse = read_json(response).await?;
        Ok(body.organization)
    }
}

async fn check_status(response: Response) -> Result<Response, ApolloError> {
    let status = response.status();
    match status.as_u16() {
        200..=299 => Ok(response),
        401 => Err(ApolloError::Unauthorized),
        429 => {
            warn!("Apollo API rate limited");
            Err(ApolloError::RateLimited)
        }
        403 => {
            let message = extract_error_message(&response.text().await.unwrap_or_default());
            Err(ApolloError::Forbidden(message))
        }
        code => {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                extract_error_message(&text)
            };
            warn!(status = %status, "Apollo API error");
            Err(ApolloError::Api { code, message })
        }
    }
}

/// Read the whole body, then parse it. Keeps transport failures (`Network`)
/// apart from bodies that are not the expected JSON (`Decode`).
async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApolloError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_error_message_prefers_error_field() {
        assert_eq!(
            extract_error_message(r#"{"error": "invalid api key", "message": "other"}"#),
            "invalid api key"
        );
        assert_eq!(
            extract_error_message(r#"{"message": "insufficient credits"}"#),
            "insufficient credits"
        );
    }

    #[test]
    fn extract_error_message_truncates_plain_bodies() {
        let body = "x".repeat(500);
        assert_eq!(extract_error_message(&body).len(), 200);
    }

    #[test]
    fn new_rejects_blank_key() {
        let err = ApolloClient::new(Client::new(), "   ", API_BASE).unwrap_err();
        assert!(matches!(err, ApolloError::ApiKeyNotSet));
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        let err = ApolloClient::new(Client::new(), "key", "not a url").unwrap_err();
        assert!(matches!(err, ApolloError::InvalidBaseUrl(_)));
    }

    #[test]
    fn endpoint_appends_below_base_path() {
        let client = ApolloClient::new(Client::new(), "key", API_BASE).unwrap();
        assert_eq!(
            client.endpoint(&["people", "enrich"]).as_str(),
            "https://api.apollo.io/api/v1/people/enrich"
        );

        let client =
            ApolloClient::new(Client::new(), "key", "https://staging.example/v1/").unwrap();
        assert_eq!(
            client.endpoint(&["organizations", "5f2a/b c"]).as_str(),
            "https://staging.example/v1/organizations/5f2a%2Fb%20c"
        );
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let client = ApolloClient::new(Client::new(), "secret-key", API_BASE).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
