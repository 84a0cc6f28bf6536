//! Content catalog client implementation

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::time::Duration as StdDuration;
use tracing::{debug, error, instrument, trace, warn};

use crate::catalog::models::{Book, BookStatus};

const LOG_TARGET: &str = "summarist_player::catalog";

/// Default base URL of the book catalog API.
pub const DEFAULT_CATALOG_URL: &str = "https://us-central1-summaristt.cloudfunctions.net";

/// Error types for catalog API operations
#[derive(Debug)]
pub enum CatalogError {
    Network(ReqwestError),
    NotFound(String),
    InvalidResponse(String),
}

// --- Error Implementations ---

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Network(e) => write!(f, "Network error: {}", e),
            CatalogError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CatalogError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReqwestError> for CatalogError {
    fn from(err: ReqwestError) -> Self {
        CatalogError::Network(err)
    }
}

/// Operations the player needs from the catalog.
#[async_trait]
pub trait CatalogApiContract: Send + Sync {
    async fn get_book_by_id(&self, id: &str) -> Result<Book, CatalogError>;

    async fn get_books_by_status(&self, status: BookStatus) -> Result<Vec<Book>, CatalogError>;
}

/// HTTP client for the book catalog.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new catalog client for `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, StdDuration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: StdDuration) -> Self {
        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(target: LOG_TARGET, "Error creating HTTP client with timeout: {:?}. Falling back to default.", e);
                Client::new()
            }
        };

        let normalized_url = base_url.trim_end_matches('/').to_string();
        debug!(target: LOG_TARGET, "Created CatalogClient for {}", normalized_url);

        CatalogClient {
            client,
            base_url: normalized_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for fetching a single book.
    pub fn book_url(&self, id: &str) -> String {
        format!("{}/getBook?id={}", self.base_url, urlencoding::encode(id))
    }

    /// Builds the URL for fetching a curated list.
    pub fn books_url(&self, status: BookStatus) -> String {
        format!("{}/getBooks?status={}", self.base_url, status.as_query_value())
    }

    /// The featured book of the day.
    pub async fn get_selected_book(&self) -> Result<Book, CatalogError> {
        self.get_json(&self.books_url(BookStatus::Selected)).await
    }

    pub async fn get_recommended_books(&self) -> Result<Vec<Book>, CatalogError> {
        self.get_json(&self.books_url(BookStatus::Recommended)).await
    }

    pub async fn get_suggested_books(&self) -> Result<Vec<Book>, CatalogError> {
        self.get_json(&self.books_url(BookStatus::Suggested)).await
    }

    // --- Private Helper Methods ---

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!(target: LOG_TARGET, "Sending GET request to: {}", url);
        let response = self.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    /// Handles response status checking and JSON deserialization.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
        let status = response.status();
        trace!(target: LOG_TARGET, "Response status: {}", status);

        if status.is_success() {
            let response_text = response.text().await?;
            parse_body(&response_text)
        } else {
            let error_text = response.text().await.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(target: LOG_TARGET, "Request failed. Status: {}, Body: {}", status, error_text);
            match status {
                StatusCode::NOT_FOUND => Err(CatalogError::NotFound(format!("Resource not found ({}): {}", status, error_text))),
                _ => Err(CatalogError::InvalidResponse(format!("Request failed with status {}: {}", status, error_text))),
            }
        }
    }
}

/// Deserializes a successful response body. The catalog answers unknown ids with
/// an empty body or `{}`, which is reported as not found.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return Err(CatalogError::NotFound("catalog returned an empty record".to_string()));
    }
    serde_json::from_str::<T>(trimmed).map_err(|e| {
        error!(target: LOG_TARGET, "JSON parsing error: {}. Response length: {} bytes", e, trimmed.len());
        CatalogError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
    })
}

#[async_trait]
impl CatalogApiContract for CatalogClient {
    #[instrument(skip(self))]
    async fn get_book_by_id(&self, id: &str) -> Result<Book, CatalogError> {
        if id.trim().is_empty() {
            return Err(CatalogError::NotFound("book id is empty".to_string()));
        }
        self.get_json(&self.book_url(id)).await
    }

    #[instrument(skip(self))]
    async fn get_books_by_status(&self, status: BookStatus) -> Result<Vec<Book>, CatalogError> {
        match status {
            BookStatus::Selected => Ok(vec![self.get_selected_book().await?]),
            BookStatus::Recommended => self.get_recommended_books().await,
            BookStatus::Suggested => self.get_suggested_books().await,
        }
    }
}
