use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::auth::AuthSession;
use crate::models::{ErrorEnvelope, Favorite, ListResponse, Property, SingleResponse, Taxonomy};
use crate::query::{user_favorites_query, ListingQuery};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    /// A non-2xx response. `message` is the server's `error.message`.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Content API operations used by the listing, detail, map and favorites
/// views.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_properties(&self, query: &ListingQuery) -> Result<ListResponse<Property>, ApiClientError>;

    /// `None` when no property has that document id.
    async fn get_property(&self, document_id: &str) -> Result<Option<Property>, ApiClientError>;

    async fn list_categories(&self) -> Result<Vec<Taxonomy>, ApiClientError>;

    async fn list_locations(&self) -> Result<Vec<Taxonomy>, ApiClientError>;

    /// Every favorite of the session's user, property populated.
    async fn list_favorites(&self, session: &AuthSession) -> Result<Vec<Favorite>, ApiClientError>;

    async fn create_favorite(&self, session: &AuthSession, property_id: i32) -> Result<Favorite, ApiClientError>;

    async fn delete_favorite(&self, session: &AuthSession, property_id: i32) -> Result<Favorite, ApiClientError>;
}

pub struct HttpContentApi {
    client: Client,
    base_url: String,
}

impl HttpContentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// `{base}/api/properties/{document_id}` with the id as one encoded segment.
    fn property_url(&self, document_id: &str) -> Result<Url, ApiClientError> {
        let mut url = Url::parse(&self.url("properties")).map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiClientError::InvalidUrl(self.base_url.clone()))?
            .push(document_id);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let error = server_error(status, &body);
            log::warn!("Content API returned {}: {}", status, error);
            return Err(error);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn server_error(status: StatusCode, body: &[u8]) -> ApiClientError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_string());
    ApiClientError::Server {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn list_properties(&self, query: &ListingQuery) -> Result<ListResponse<Property>, ApiClientError> {
        log::debug!("Fetching properties: {}", query.to_query_string());
        self.send(self.client.get(self.url("properties")).query(query.pairs()))
            .await
    }

    async fn get_property(&self, document_id: &str) -> Result<Option<Property>, ApiClientError> {
        let request = self
            .client
            .get(self.property_url(document_id)?)
            .query(&[("populate", "*")]);
        match self.send::<SingleResponse<Property>>(request).await {
            Ok(response) => Ok(response.data),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Taxonomy>, ApiClientError> {
        let response: ListResponse<Taxonomy> = self.send(self.client.get(self.url("categories"))).await?;
        Ok(response.data)
    }

    async fn list_locations(&self) -> Result<Vec<Taxonomy>, ApiClientError> {
        let response: ListResponse<Taxonomy> = self.send(self.client.get(self.url("locations"))).await?;
        Ok(response.data)
    }

    async fn list_favorites(&self, session: &AuthSession) -> Result<Vec<Favorite>, ApiClientError> {
        let query = user_favorites_query(session.user.id);
        let request = self
            .client
            .get(self.url("favorites"))
            .bearer_auth(&session.jwt)
            .query(query.pairs());
        let response: ListResponse<Favorite> = self.send(request).await?;
        Ok(response.data)
    }

    async fn create_favorite(&self, session: &AuthSession, property_id: i32) -> Result<Favorite, ApiClientError> {
        let request = self
            .client
            .post(self.url("favorites"))
            .bearer_auth(&session.jwt)
            .json(&json!({ "data": { "property": property_id } }));
        let response: SingleResponse<Favorite> = self.send(request).await?;
        response.data.ok_or_else(|| ApiClientError::Server {
            status: 500,
            message: "Favorite response had no data".to_string(),
        })
    }

    async fn delete_favorite(&self, session: &AuthSession, property_id: i32) -> Result<Favorite, ApiClientError> {
        let request = self
            .client
            .delete(self.url(&format!("favorites/property/{}", property_id)))
            .bearer_auth(&session.jwt);
        let response: SingleResponse<Favorite> = self.send(request).await?;
        response.data.ok_or_else(|| ApiClientError::Server {
            status: 500,
            message: "Favorite response had no data".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_surfaces_envelope_message() {
        let body = br#"{"data":null,"error":{"status":404,"name":"NotFoundError","message":"Favorite not found for this property and user."}}"#;
        let err = server_error(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Favorite not found for this property and user.");
    }

    #[test]
    fn server_error_without_envelope_uses_reason() {
        let err = server_error(StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn urls_are_rooted_at_api() {
        let api = HttpContentApi::new("http://localhost:1337/");
        assert_eq!(api.url("favorites"), "http://localhost:1337/api/favorites");
    }

    #[test]
    fn document_id_stays_one_path_segment() {
        let api = HttpContentApi::new("http://localhost:1337");
        assert_eq!(
            api.property_url("abc123").unwrap().as_str(),
            "http://localhost:1337/api/properties/abc123"
        );
        let url = api.property_url("a/b?c#d").unwrap();
        assert_eq!(url.as_str(), "http://localhost:1337/api/properties/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }
}
