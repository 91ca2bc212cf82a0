//! Reading progress tracker.
//!
//! Status changes are unrestricted (any status may follow any other);
//! progress is bounded by the book's page count when that is known.
//! Both operations are idempotent: repeating a call with the same value
//! leaves the record untouched.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::DomainError;
use crate::models::book::{ActiveModel as BookActiveModel, Book, Entity as BookEntity, ReadingStatus};
use crate::services::book_service;

/// Set a book's reading status.
pub async fn set_status(
    db: &DatabaseConnection,
    book_id: i32,
    status: &str,
) -> Result<Book, DomainError> {
    let parsed = ReadingStatus::parse(status)
        .ok_or_else(|| DomainError::Validation(format!("unknown reading status '{}'", status)))?;

    let model = BookEntity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    if model.reading_status == parsed.as_str() {
        return book_service::hydrate(db, model).await;
    }

    tracing::info!(
        "Book {} status: {} -> {}",
        book_id,
        model.reading_status,
        parsed
    );

    let mut active: BookActiveModel = model.into();
    active.reading_status = Set(parsed.to_string());
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let model = active.update(db).await?;

    book_service::hydrate(db, model).await
}

/// Set a book's current page. The value is stored regardless of status;
/// consumers only render a percentage while the book is `reading`.
pub async fn set_progress(
    db: &DatabaseConnection,
    book_id: i32,
    current_page: i32,
) -> Result<Book, DomainError> {
    let model = BookEntity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    book_service::validate_progress(current_page, model.pages)?;

    if model.current_page == current_page {
        return book_service::hydrate(db, model).await;
    }

    let mut active: BookActiveModel = model.into();
    active.current_page = Set(current_page);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let model = active.update(db).await?;

    book_service::hydrate(db, model).await
}
