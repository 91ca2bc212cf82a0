//! Query/filter engine and reading progress tracker tests.

use librarium::db;
use librarium::domain::DomainError;
use librarium::models::book::NewBook;
use librarium::models::publisher::NewPublisher;
use librarium::services::{book_service, catalog_service, reading_service, BookFilter};
use sea_orm::DatabaseConnection;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_publisher(db: &DatabaseConnection) -> i32 {
    catalog_service::create_publisher(
        db,
        NewPublisher {
            name: "Test House".to_string(),
            country: None,
        },
    )
    .await
    .expect("Failed to create publisher")
    .id
}

async fn create_book(
    db: &DatabaseConnection,
    title: &str,
    publisher_id: i32,
    status: &str,
    pages: Option<i32>,
) -> i32 {
    book_service::create_book(
        db,
        NewBook {
            title: title.to_string(),
            reading_status: Some(status.to_string()),
            pages,
            publisher_id,
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create book")
    .id
}

#[tokio::test]
async fn test_search_matches_title_substring_only() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    create_book(&db, "Dune Messiah", publisher_id, "unread", None).await;
    create_book(&db, "Foundation", publisher_id, "unread", None).await;

    let results = book_service::search_books(
        &db,
        BookFilter {
            text: Some("Dune".to_string()),
            status: None,
        },
    )
    .await
    .expect("Search failed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Dune Messiah");
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    create_book(&db, "The Left Hand of Darkness", publisher_id, "unread", None).await;

    let results = book_service::search_books(
        &db,
        BookFilter {
            text: Some("left HAND".to_string()),
            status: None,
        },
    )
    .await
    .expect("Search failed");

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_search_by_status_in_insertion_order() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    create_book(&db, "First", publisher_id, "reading", None).await;
    create_book(&db, "Second", publisher_id, "completed", None).await;
    create_book(&db, "Third", publisher_id, "reading", None).await;

    let results = book_service::search_books(
        &db,
        BookFilter {
            text: None,
            status: Some("reading".to_string()),
        },
    )
    .await
    .expect("Search failed");

    let titles: Vec<&str> = results.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Third"]);
}

#[tokio::test]
async fn test_search_filters_are_anded() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    create_book(&db, "Dune", publisher_id, "completed", None).await;
    create_book(&db, "Dune Messiah", publisher_id, "unread", None).await;

    let results = book_service::search_books(
        &db,
        BookFilter {
            text: Some("dune".to_string()),
            status: Some("unread".to_string()),
        },
    )
    .await
    .expect("Search failed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Dune Messiah");
}

#[tokio::test]
async fn test_empty_filters_return_everything() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    create_book(&db, "A", publisher_id, "unread", None).await;
    create_book(&db, "B", publisher_id, "completed", None).await;

    let all = book_service::search_books(
        &db,
        BookFilter {
            text: Some(String::new()),
            status: Some(String::new()),
        },
    )
    .await
    .expect("Search failed");

    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_set_status_is_idempotent() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    let id = create_book(&db, "Loop", publisher_id, "unread", None).await;

    let first = reading_service::set_status(&db, id, "reading")
        .await
        .expect("First status change failed");
    let second = reading_service::set_status(&db, id, "reading")
        .await
        .expect("Second status change failed");

    assert_eq!(first.reading_status, "reading");
    assert_eq!(second.reading_status, "reading");

    let book = book_service::get_book(&db, id).await.unwrap();
    assert_eq!(book.reading_status, "reading");
}

#[tokio::test]
async fn test_any_status_transition_is_allowed() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    let id = create_book(&db, "Wanderer", publisher_id, "completed", None).await;

    for status in ["abandoned", "unread", "reading", "completed", "unread"] {
        let book = reading_service::set_status(&db, id, status)
            .await
            .expect("Status change failed");
        assert_eq!(book.reading_status, status);
    }
}

#[tokio::test]
async fn test_set_status_rejects_unknown_value() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    let id = create_book(&db, "Strict", publisher_id, "unread", None).await;

    let err = reading_service::set_status(&db, id, "paused")
        .await
        .expect_err("Unknown status should fail");
    assert!(matches!(err, DomainError::Validation(_)));

    let book = book_service::get_book(&db, id).await.unwrap();
    assert_eq!(book.reading_status, "unread");
}

#[tokio::test]
async fn test_set_status_unknown_book_is_not_found() {
    let db = setup_test_db().await;

    let err = reading_service::set_status(&db, 42, "reading")
        .await
        .expect_err("Unknown book should fail");
    assert!(matches!(err, DomainError::NotFound));
}

#[tokio::test]
async fn test_set_progress_bounded_by_pages() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    let id = create_book(&db, "Bounded", publisher_id, "reading", Some(300)).await;

    let book = reading_service::set_progress(&db, id, 150)
        .await
        .expect("Progress within bounds should succeed");
    assert_eq!(book.current_page, 150);

    let err = reading_service::set_progress(&db, id, 301)
        .await
        .expect_err("Progress past the end should fail");
    assert!(matches!(err, DomainError::Validation(_)));

    let err = reading_service::set_progress(&db, id, -1)
        .await
        .expect_err("Negative progress should fail");
    assert!(matches!(err, DomainError::Validation(_)));

    // Failed updates leave the stored value alone.
    let book = book_service::get_book(&db, id).await.unwrap();
    assert_eq!(book.current_page, 150);
}

#[tokio::test]
async fn test_set_progress_without_page_count() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    let id = create_book(&db, "Endless", publisher_id, "reading", None).await;

    let book = reading_service::set_progress(&db, id, 10_000)
        .await
        .expect("Unknown page count accepts any non-negative progress");
    assert_eq!(book.current_page, 10_000);
}

#[tokio::test]
async fn test_completed_keeps_current_page() {
    let db = setup_test_db().await;
    let publisher_id = create_publisher(&db).await;
    let id = create_book(&db, "Done", publisher_id, "reading", Some(300)).await;

    reading_service::set_progress(&db, id, 300).await.unwrap();
    reading_service::set_status(&db, id, "completed").await.unwrap();

    let book = book_service::get_book(&db, id).await.unwrap();
    assert_eq!(book.reading_status, "completed");
    assert_eq!(book.current_page, 300);
}
