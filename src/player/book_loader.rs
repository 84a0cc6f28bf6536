// src/player/book_loader.rs
use crate::catalog::{Book, CatalogApiContract, CatalogError};
use crate::player::PLAYER_LOG_TARGET;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shown when the catalog request fails.
pub const BOOK_LOAD_FAILED_MESSAGE: &str = "Failed to load book. Please try again later.";
/// Shown when the book exists but has no audio summary.
pub const BOOK_UNAVAILABLE_MESSAGE: &str = "The book you are looking for is not available for playback.";

/// Fetches a book record from the catalog.
/// Errors are returned to the caller to handle (e.g., broadcasting an update).
#[instrument(skip(catalog))]
pub async fn fetch_book(catalog: Arc<dyn CatalogApiContract>, book_id: &str) -> Result<Book, CatalogError> {
    info!(target: PLAYER_LOG_TARGET, "Fetching book {} from catalog...", book_id);
    match catalog.get_book_by_id(book_id).await {
        Ok(book) => {
            info!(target: PLAYER_LOG_TARGET, "Fetched \"{}\" by {}.", book.title, book.author);
            Ok(book)
        }
        Err(e) => {
            error!(target: PLAYER_LOG_TARGET, "Failed to fetch book {}: {}", book_id, e);
            Err(e)
        }
    }
}
