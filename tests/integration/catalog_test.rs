//! Integration tests for the catalog client
//!
//! Offline tests run against a local HTTP stub that answers the catalog
//! endpoints. The live tests talk to the public catalog and are ignored by
//! default; run them with `cargo test -- --ignored`.

use crate::test_utils::constants::UNREACHABLE_CATALOG_URL;
use std::time::Duration as StdDuration;
use summarist_player::catalog::{BookStatus, CatalogApiContract, CatalogClient, CatalogError, DEFAULT_CATALOG_URL};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[cfg(test)]
mod catalog_integration_tests {
    use super::*;

    const BOOK_JSON: &str = r#"{"id": "b1", "author": "Simon Sinek", "title": "Start with Why", "audioLink": "https://cdn.example.com/b1.mp3", "status": "selected"}"#;
    const LIST_JSON: &str = r#"[
        {"id": "r1", "author": "Author One", "title": "First", "audioLink": "https://cdn.example.com/r1.mp3"},
        {"id": "r2", "author": "Author Two", "title": "Second", "audioLink": ""}
    ]"#;

    /// Canned answers keyed by request target.
    fn route(target: &str) -> (&'static str, &'static str) {
        match target {
            "/getBook?id=b1" => ("200 OK", BOOK_JSON),
            "/getBook?id=missing" => ("200 OK", "{}"),
            "/getBook?id=gone" => ("404 Not Found", "no such book"),
            "/getBook?id=broken" => ("500 Internal Server Error", "boom"),
            "/getBook?id=garbled" => ("200 OK", "<html>not json</html>"),
            "/getBooks?status=selected" => ("200 OK", BOOK_JSON),
            "/getBooks?status=recommended" => ("200 OK", LIST_JSON),
            "/getBooks?status=suggested" => ("500 Internal Server Error", "unavailable"),
            _ => ("404 Not Found", ""),
        }
    }

    /// Starts a one-request-per-connection HTTP stub and returns its base URL.
    async fn start_catalog_stub() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub catalog");
        let address = listener.local_addr().expect("stub address");

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buffer = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buffer).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buffer[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&request);
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, body) = route(&target);
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_book_by_id() {
        let client = CatalogClient::new(&start_catalog_stub().await);
        let book = client.get_book_by_id("b1").await.expect("book should load");
        assert_eq!(book.title, "Start with Why");
        assert_eq!(book.audio_url(), Some("https://cdn.example.com/b1.mp3"));
    }

    #[tokio::test]
    async fn test_empty_record_is_not_found() {
        let client = CatalogClient::new(&start_catalog_stub().await);
        assert!(matches!(client.get_book_by_id("missing").await, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_http_errors_are_mapped() {
        let client = CatalogClient::new(&start_catalog_stub().await);
        match client.get_book_by_id("gone").await {
            Err(CatalogError::NotFound(message)) => assert!(message.contains("404")),
            other => panic!("expected NotFound, got {:?}", other.map(|book| book.id)),
        }
        match client.get_book_by_id("broken").await {
            Err(CatalogError::InvalidResponse(message)) => assert!(message.contains("500")),
            other => panic!("expected InvalidResponse, got {:?}", other.map(|book| book.id)),
        }
        assert!(matches!(
            client.get_book_by_id("garbled").await,
            Err(CatalogError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_selected_list_wraps_single_book() {
        let client = CatalogClient::new(&start_catalog_stub().await);
        let books = client.get_books_by_status(BookStatus::Selected).await.expect("selected should load");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, "b1");
        assert_eq!(books[0].status, Some(BookStatus::Selected));
    }

    #[tokio::test]
    async fn test_recommended_list() {
        let client = CatalogClient::new(&start_catalog_stub().await);
        let books = client.get_books_by_status(BookStatus::Recommended).await.expect("list should load");
        let ids: Vec<&str> = books.iter().map(|book| book.id.as_str()).collect();
        assert_eq!(ids, ["r1", "r2"]);
        assert!(books[1].audio_url().is_none());
    }

    #[tokio::test]
    async fn test_failed_list_is_invalid_response() {
        let client = CatalogClient::new(&start_catalog_stub().await);
        assert!(matches!(
            client.get_books_by_status(BookStatus::Suggested).await,
            Err(CatalogError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_a_network_error() {
        let client = CatalogClient::with_timeout(UNREACHABLE_CATALOG_URL, StdDuration::from_secs(2));
        match client.get_book_by_id("f9gy1gpai8").await {
            Err(CatalogError::Network(_)) => {}
            other => panic!("expected a network error, got {:?}", other.map(|book| book.id)),
        }
    }

    #[tokio::test]
    async fn test_empty_id_is_not_found_without_a_request() {
        let client = CatalogClient::new(UNREACHABLE_CATALOG_URL);
        assert!(matches!(client.get_book_by_id("  ").await, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_selected_book_has_audio() {
        let client = CatalogClient::new(DEFAULT_CATALOG_URL);
        let books = client.get_books_by_status(BookStatus::Selected).await.expect("catalog request failed");
        assert_eq!(books.len(), 1);
        assert!(books[0].audio_url().is_some());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_recommended_books_resolve_by_id() {
        let client = CatalogClient::new(DEFAULT_CATALOG_URL);
        let books = client.get_recommended_books().await.expect("catalog request failed");
        let first = books.first().expect("no recommended books");
        let fetched = client.get_book_by_id(&first.id).await.expect("book lookup failed");
        assert_eq!(fetched.title, first.title);
    }
}
