//! Book service - catalog CRUD plus search over hydrated records.
//!
//! Every multi-statement mutation (create/update/delete with attachment
//! sets) runs in a transaction so it applies fully or not at all.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;

use crate::domain::DomainError;
use crate::models::book::{
    self, ActiveModel as BookActiveModel, Book, BookPatch, Entity as BookEntity, NamedRef,
    NewBook, ReadingStatus,
};
use crate::models::{author, book_authors, book_genres, category, genre, publisher, series};

/// Filter parameters for searching books. Both filters are ANDed;
/// absent or empty values impose no constraint.
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Case-insensitive substring match against the title only.
    pub text: Option<String>,
    /// Exact reading-status match.
    pub status: Option<String>,
}

/// List all books, hydrated, in insertion order.
pub async fn list_books(db: &DatabaseConnection) -> Result<Vec<Book>, DomainError> {
    search_books(db, BookFilter::default()).await
}

/// Search books with optional title/status filters.
pub async fn search_books(
    db: &DatabaseConnection,
    filter: BookFilter,
) -> Result<Vec<Book>, DomainError> {
    tracing::info!(
        "Search books - filters: text={:?}, status={:?}",
        filter.text,
        filter.status
    );

    let mut query = BookEntity::find();

    if let Some(status) = &filter.status
        && !status.is_empty()
    {
        query = query.filter(book::Column::ReadingStatus.eq(status.as_str()));
    }

    let models = query.order_by_asc(book::Column::Id).all(db).await?;

    let needle = filter
        .text
        .as_deref()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty());

    let mut books = Vec::new();
    for model in models {
        if let Some(needle) = &needle
            && !model.title.to_lowercase().contains(needle)
        {
            continue;
        }
        books.push(hydrate(db, model).await?);
    }

    tracing::info!("Returning {} books after filters", books.len());
    Ok(books)
}

/// Get a single book by ID, hydrated.
pub async fn get_book(db: &DatabaseConnection, id: i32) -> Result<Book, DomainError> {
    let model = BookEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    hydrate(db, model).await
}

/// Create a new book with its author/genre attachment sets.
pub async fn create_book(db: &DatabaseConnection, input: NewBook) -> Result<Book, DomainError> {
    let status = match &input.reading_status {
        Some(s) => parse_status(s)?,
        None => ReadingStatus::Unread,
    };
    validate_title(&input.title)?;
    validate_pages(input.pages)?;
    validate_rating(input.rating)?;
    let current_page = input.current_page.unwrap_or(0);
    validate_progress(current_page, input.pages)?;

    let author_ids = dedup(input.author_ids);
    let genre_ids = dedup(input.genre_ids);

    let txn = db.begin().await?;

    ensure_publisher_exists(&txn, input.publisher_id).await?;
    if let Some(series_id) = input.series_id {
        ensure_series_exists(&txn, series_id).await?;
    }
    if let Some(category_id) = input.category_id {
        ensure_category_exists(&txn, category_id).await?;
    }
    ensure_authors_exist(&txn, &author_ids).await?;
    ensure_genres_exist(&txn, &genre_ids).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let new_book = BookActiveModel {
        title: Set(input.title),
        isbn: Set(input.isbn),
        publication_year: Set(input.publication_year),
        pages: Set(input.pages),
        language: Set(input.language),
        description: Set(input.description),
        reading_status: Set(status.to_string()),
        current_page: Set(current_page),
        rating: Set(input.rating),
        notes: Set(input.notes),
        series_position: Set(input.series_position),
        date_started: Set(input.date_started),
        date_completed: Set(input.date_completed),
        publisher_id: Set(input.publisher_id),
        series_id: Set(input.series_id),
        category_id: Set(input.category_id),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_book.insert(&txn).await?;
    replace_author_links(&txn, model.id, &author_ids).await?;
    replace_genre_links(&txn, model.id, &genre_ids).await?;

    let hydrated = hydrate(&txn, model).await?;
    txn.commit().await?;

    tracing::info!("Created book {} '{}'", hydrated.id, hydrated.title);
    Ok(hydrated)
}

/// Update an existing book. Fields left `None` keep their prior value;
/// `author_ids`/`genre_ids`, when present, replace the attachment set.
pub async fn update_book(
    db: &DatabaseConnection,
    id: i32,
    patch: BookPatch,
) -> Result<Book, DomainError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(pages) = &patch.pages {
        validate_pages(*pages)?;
    }
    if let Some(rating) = &patch.rating {
        validate_rating(*rating)?;
    }
    let status = match &patch.reading_status {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };

    let txn = db.begin().await?;

    let model = BookEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    // Progress bounds are checked against the record as it will be
    // after the patch applies.
    let effective_pages = match &patch.pages {
        Some(pages) => *pages,
        None => model.pages,
    };
    let effective_page = patch.current_page.unwrap_or(model.current_page);
    validate_progress(effective_page, effective_pages)?;

    if let Some(publisher_id) = patch.publisher_id {
        ensure_publisher_exists(&txn, publisher_id).await?;
    }
    if let Some(Some(series_id)) = patch.series_id {
        ensure_series_exists(&txn, series_id).await?;
    }
    if let Some(Some(category_id)) = patch.category_id {
        ensure_category_exists(&txn, category_id).await?;
    }

    let author_ids = patch.author_ids.map(dedup);
    let genre_ids = patch.genre_ids.map(dedup);
    if let Some(ids) = &author_ids {
        ensure_authors_exist(&txn, ids).await?;
    }
    if let Some(ids) = &genre_ids {
        ensure_genres_exist(&txn, ids).await?;
    }

    let mut active: BookActiveModel = model.into();
    if let Some(title) = patch.title {
        active.title = Set(title);
    }
    if let Some(isbn) = patch.isbn {
        active.isbn = Set(isbn);
    }
    if let Some(year) = patch.publication_year {
        active.publication_year = Set(year);
    }
    if let Some(pages) = patch.pages {
        active.pages = Set(pages);
    }
    if let Some(language) = patch.language {
        active.language = Set(language);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(status) = status {
        active.reading_status = Set(status.to_string());
    }
    if let Some(page) = patch.current_page {
        active.current_page = Set(page);
    }
    if let Some(rating) = patch.rating {
        active.rating = Set(rating);
    }
    if let Some(notes) = patch.notes {
        active.notes = Set(notes);
    }
    if let Some(position) = patch.series_position {
        active.series_position = Set(position);
    }
    if let Some(date_started) = patch.date_started {
        active.date_started = Set(date_started);
    }
    if let Some(date_completed) = patch.date_completed {
        active.date_completed = Set(date_completed);
    }
    if let Some(publisher_id) = patch.publisher_id {
        active.publisher_id = Set(publisher_id);
    }
    if let Some(series_id) = patch.series_id {
        active.series_id = Set(series_id);
    }
    if let Some(category_id) = patch.category_id {
        active.category_id = Set(category_id);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let model = active.update(&txn).await?;

    if let Some(ids) = &author_ids {
        replace_author_links(&txn, model.id, ids).await?;
    }
    if let Some(ids) = &genre_ids {
        replace_genre_links(&txn, model.id, ids).await?;
    }

    let hydrated = hydrate(&txn, model).await?;
    txn.commit().await?;

    Ok(hydrated)
}

/// Delete a book and its attachment rows.
pub async fn delete_book(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let model = BookEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    book_authors::Entity::delete_many()
        .filter(book_authors::Column::BookId.eq(id))
        .exec(&txn)
        .await?;
    book_genres::Entity::delete_many()
        .filter(book_genres::Column::BookId.eq(id))
        .exec(&txn)
        .await?;
    model.delete(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted book {}", id);
    Ok(())
}

/// Load every book, hydrated, in insertion order. Callers wanting a
/// point-in-time snapshot pass a transaction as the connection.
pub(crate) async fn all_books_hydrated<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<Book>, DomainError> {
    let models = BookEntity::find()
        .order_by_asc(book::Column::Id)
        .all(conn)
        .await?;

    let mut books = Vec::with_capacity(models.len());
    for model in models {
        books.push(hydrate(conn, model).await?);
    }
    Ok(books)
}

/// Resolve a book's foreign keys into display-ready references.
pub(crate) async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    model: book::Model,
) -> Result<Book, DomainError> {
    let publisher = publisher::Entity::find_by_id(model.publisher_id)
        .one(conn)
        .await?
        .map(|p| NamedRef {
            id: p.id,
            name: p.name,
        })
        .ok_or_else(|| {
            DomainError::Database(format!(
                "book {} references missing publisher {}",
                model.id, model.publisher_id
            ))
        })?;

    let authors = model
        .find_related(author::Entity)
        .order_by_asc(author::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|a| NamedRef {
            id: a.id,
            name: a.full_name(),
        })
        .collect();

    let genres = model
        .find_related(genre::Entity)
        .order_by_asc(genre::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|g| NamedRef {
            id: g.id,
            name: g.name,
        })
        .collect();

    let series_ref = match model.series_id {
        Some(series_id) => series::Entity::find_by_id(series_id)
            .one(conn)
            .await?
            .map(|s| NamedRef {
                id: s.id,
                name: s.name,
            }),
        None => None,
    };

    let category_ref = match model.category_id {
        Some(category_id) => category::Entity::find_by_id(category_id)
            .one(conn)
            .await?
            .map(|c| NamedRef {
                id: c.id,
                name: c.name,
            }),
        None => None,
    };

    Ok(Book {
        id: model.id,
        title: model.title,
        isbn: model.isbn,
        publication_year: model.publication_year,
        pages: model.pages,
        language: model.language,
        description: model.description,
        reading_status: model.reading_status,
        current_page: model.current_page,
        rating: model.rating,
        notes: model.notes,
        series_position: model.series_position,
        date_started: model.date_started,
        date_completed: model.date_completed,
        publisher_id: model.publisher_id,
        series_id: model.series_id,
        category_id: model.category_id,
        publisher,
        authors,
        genres,
        series: series_ref,
        category: category_ref,
    })
}

// Attachment sets are replaced wholesale, never merged.
async fn replace_author_links<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    author_ids: &[i32],
) -> Result<(), DomainError> {
    book_authors::Entity::delete_many()
        .filter(book_authors::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;

    for author_id in author_ids {
        let link = book_authors::ActiveModel {
            book_id: Set(book_id),
            author_id: Set(*author_id),
        };
        link.insert(conn).await?;
    }
    Ok(())
}

async fn replace_genre_links<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    genre_ids: &[i32],
) -> Result<(), DomainError> {
    book_genres::Entity::delete_many()
        .filter(book_genres::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;

    for genre_id in genre_ids {
        let link = book_genres::ActiveModel {
            book_id: Set(book_id),
            genre_id: Set(*genre_id),
        };
        link.insert(conn).await?;
    }
    Ok(())
}

fn parse_status(s: &str) -> Result<ReadingStatus, DomainError> {
    ReadingStatus::parse(s)
        .ok_or_else(|| DomainError::Validation(format!("unknown reading status '{}'", s)))
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}

fn validate_pages(pages: Option<i32>) -> Result<(), DomainError> {
    if let Some(pages) = pages
        && pages <= 0
    {
        return Err(DomainError::Validation(format!(
            "pages must be positive, got {}",
            pages
        )));
    }
    Ok(())
}

fn validate_rating(rating: Option<i32>) -> Result<(), DomainError> {
    if let Some(rating) = rating
        && !(1..=5).contains(&rating)
    {
        return Err(DomainError::Validation(format!(
            "rating must be between 1 and 5, got {}",
            rating
        )));
    }
    Ok(())
}

pub(crate) fn validate_progress(current_page: i32, pages: Option<i32>) -> Result<(), DomainError> {
    if current_page < 0 {
        return Err(DomainError::Validation(format!(
            "current_page must not be negative, got {}",
            current_page
        )));
    }
    if let Some(pages) = pages
        && current_page > pages
    {
        return Err(DomainError::Validation(format!(
            "current_page {} exceeds pages {}",
            current_page, pages
        )));
    }
    Ok(())
}

// Preserves first-encounter order while dropping duplicate ids.
fn dedup(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

async fn ensure_publisher_exists<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<(), DomainError> {
    if publisher::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(DomainError::Validation(format!(
            "publisher {} does not exist",
            id
        )));
    }
    Ok(())
}

async fn ensure_series_exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), DomainError> {
    if series::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(DomainError::Validation(format!(
            "series {} does not exist",
            id
        )));
    }
    Ok(())
}

async fn ensure_category_exists<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), DomainError> {
    if category::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(DomainError::Validation(format!(
            "category {} does not exist",
            id
        )));
    }
    Ok(())
}

async fn ensure_authors_exist<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<(), DomainError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = author::Entity::find()
        .filter(author::Column::Id.is_in(ids.to_vec()))
        .count(conn)
        .await?;
    if found != ids.len() as u64 {
        return Err(DomainError::Validation(
            "author_ids references a nonexistent author".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_genres_exist<C: ConnectionTrait>(conn: &C, ids: &[i32]) -> Result<(), DomainError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = genre::Entity::find()
        .filter(genre::Column::Id.is_in(ids.to_vec()))
        .count(conn)
        .await?;
    if found != ids.len() as u64 {
        return Err(DomainError::Validation(
            "genre_ids references a nonexistent genre".to_string(),
        ));
    }
    Ok(())
}
