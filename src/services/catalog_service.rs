//! Catalog reference entities: authors, publishers, genres, categories,
//! series, topics.
//!
//! Delete rules differ by kind: publishers are load-bearing (delete is
//! rejected while referenced), series/categories cascade to null on the
//! books that point at them, authors/genres detach from books.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, Value,
};

use crate::domain::DomainError;
use crate::models::author::{self, Author, AuthorPatch, NewAuthor};
use crate::models::category::{self, Category, CategoryPatch, NewCategory};
use crate::models::genre::{self, Genre, GenrePatch, NewGenre};
use crate::models::publisher::{self, NewPublisher, Publisher, PublisherPatch};
use crate::models::series::{self, NewSeries, Series, SeriesPatch};
use crate::models::topic::{self, NewTopic, Topic, TopicPatch};
use crate::models::{book, book_authors, book_genres, series_authors};

// ---------------------------------------------------------------------------
// Authors

pub async fn list_authors(db: &DatabaseConnection) -> Result<Vec<Author>, DomainError> {
    let authors = author::Entity::find()
        .order_by_asc(author::Column::Id)
        .all(db)
        .await?;
    Ok(authors.into_iter().map(Author::from).collect())
}

pub async fn get_author(db: &DatabaseConnection, id: i32) -> Result<Author, DomainError> {
    author::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Author::from)
        .ok_or(DomainError::NotFound)
}

pub async fn create_author(
    db: &DatabaseConnection,
    input: NewAuthor,
) -> Result<Author, DomainError> {
    validate_name(&input.first_name, "first_name")?;
    validate_name(&input.last_name, "last_name")?;

    let now = chrono::Utc::now().to_rfc3339();
    let model = author::ActiveModel {
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        biography: Set(input.biography),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Author::from(model))
}

pub async fn update_author(
    db: &DatabaseConnection,
    id: i32,
    patch: AuthorPatch,
) -> Result<Author, DomainError> {
    if let Some(first_name) = &patch.first_name {
        validate_name(first_name, "first_name")?;
    }
    if let Some(last_name) = &patch.last_name {
        validate_name(last_name, "last_name")?;
    }

    let model = author::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: author::ActiveModel = model.into();
    if let Some(first_name) = patch.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = patch.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(biography) = patch.biography {
        active.biography = Set(biography);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(Author::from(active.update(db).await?))
}

/// Delete an author, detaching it from every book and series first.
/// The books themselves are untouched.
pub async fn delete_author(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let model = author::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    book_authors::Entity::delete_many()
        .filter(book_authors::Column::AuthorId.eq(id))
        .exec(&txn)
        .await?;
    series_authors::Entity::delete_many()
        .filter(series_authors::Column::AuthorId.eq(id))
        .exec(&txn)
        .await?;
    author::Entity::delete_by_id(model.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted author {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Publishers

pub async fn list_publishers(db: &DatabaseConnection) -> Result<Vec<Publisher>, DomainError> {
    let publishers = publisher::Entity::find()
        .order_by_asc(publisher::Column::Id)
        .all(db)
        .await?;
    Ok(publishers.into_iter().map(Publisher::from).collect())
}

pub async fn get_publisher(db: &DatabaseConnection, id: i32) -> Result<Publisher, DomainError> {
    publisher::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Publisher::from)
        .ok_or(DomainError::NotFound)
}

pub async fn create_publisher(
    db: &DatabaseConnection,
    input: NewPublisher,
) -> Result<Publisher, DomainError> {
    validate_name(&input.name, "name")?;

    let now = chrono::Utc::now().to_rfc3339();
    let model = publisher::ActiveModel {
        name: Set(input.name),
        country: Set(input.country),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Publisher::from(model))
}

pub async fn update_publisher(
    db: &DatabaseConnection,
    id: i32,
    patch: PublisherPatch,
) -> Result<Publisher, DomainError> {
    if let Some(name) = &patch.name {
        validate_name(name, "name")?;
    }

    let model = publisher::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: publisher::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(country) = patch.country {
        active.country = Set(country);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(Publisher::from(active.update(db).await?))
}

/// Delete a publisher. Rejected while any book references it; every
/// book requires exactly one publisher, so there is nothing to null.
pub async fn delete_publisher(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let model = publisher::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    let dependents = book::Entity::find()
        .filter(book::Column::PublisherId.eq(id))
        .count(&txn)
        .await?;
    if dependents > 0 {
        return Err(DomainError::ReferentialIntegrity {
            entity: "publisher",
            dependents,
        });
    }

    publisher::Entity::delete_by_id(model.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!("Deleted publisher {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Genres

pub async fn list_genres(db: &DatabaseConnection) -> Result<Vec<Genre>, DomainError> {
    let genres = genre::Entity::find()
        .order_by_asc(genre::Column::Id)
        .all(db)
        .await?;
    Ok(genres.into_iter().map(Genre::from).collect())
}

pub async fn get_genre(db: &DatabaseConnection, id: i32) -> Result<Genre, DomainError> {
    genre::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Genre::from)
        .ok_or(DomainError::NotFound)
}

pub async fn create_genre(db: &DatabaseConnection, input: NewGenre) -> Result<Genre, DomainError> {
    validate_name(&input.name, "name")?;

    let now = chrono::Utc::now().to_rfc3339();
    let model = genre::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Genre::from(model))
}

pub async fn update_genre(
    db: &DatabaseConnection,
    id: i32,
    patch: GenrePatch,
) -> Result<Genre, DomainError> {
    if let Some(name) = &patch.name {
        validate_name(name, "name")?;
    }

    let model = genre::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: genre::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(Genre::from(active.update(db).await?))
}

/// Delete a genre, detaching it from every book first.
pub async fn delete_genre(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let model = genre::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    book_genres::Entity::delete_many()
        .filter(book_genres::Column::GenreId.eq(id))
        .exec(&txn)
        .await?;
    genre::Entity::delete_by_id(model.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted genre {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<Category>, DomainError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?;
    Ok(categories.into_iter().map(Category::from).collect())
}

pub async fn get_category(db: &DatabaseConnection, id: i32) -> Result<Category, DomainError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Category::from)
        .ok_or(DomainError::NotFound)
}

pub async fn create_category(
    db: &DatabaseConnection,
    input: NewCategory,
) -> Result<Category, DomainError> {
    validate_name(&input.name, "name")?;

    let now = chrono::Utc::now().to_rfc3339();
    let model = category::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Category::from(model))
}

pub async fn update_category(
    db: &DatabaseConnection,
    id: i32,
    patch: CategoryPatch,
) -> Result<Category, DomainError> {
    if let Some(name) = &patch.name {
        validate_name(name, "name")?;
    }

    let model = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: category::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(Category::from(active.update(db).await?))
}

/// Delete a category. Books that referenced it keep existing with the
/// reference nulled out.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let model = category::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    book::Entity::update_many()
        .col_expr(book::Column::CategoryId, Expr::value(Value::Int(None)))
        .filter(book::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    category::Entity::delete_by_id(model.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted category {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Series

pub async fn list_series(db: &DatabaseConnection) -> Result<Vec<Series>, DomainError> {
    let series = series::Entity::find()
        .order_by_asc(series::Column::Id)
        .all(db)
        .await?;
    Ok(series.into_iter().map(Series::from).collect())
}

pub async fn get_series(db: &DatabaseConnection, id: i32) -> Result<Series, DomainError> {
    series::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Series::from)
        .ok_or(DomainError::NotFound)
}

pub async fn create_series(
    db: &DatabaseConnection,
    input: NewSeries,
) -> Result<Series, DomainError> {
    validate_name(&input.name, "name")?;

    let author_ids = dedup(input.author_ids);

    let txn = db.begin().await?;

    ensure_authors_exist(&txn, &author_ids).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let model = series::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        total_books: Set(input.total_books),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    replace_series_author_links(&txn, model.id, &author_ids).await?;

    let series = Series::from(model);
    txn.commit().await?;
    Ok(series)
}

pub async fn update_series(
    db: &DatabaseConnection,
    id: i32,
    patch: SeriesPatch,
) -> Result<Series, DomainError> {
    if let Some(name) = &patch.name {
        validate_name(name, "name")?;
    }

    let author_ids = patch.author_ids.map(dedup);

    let txn = db.begin().await?;

    let model = series::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    if let Some(ids) = &author_ids {
        ensure_authors_exist(&txn, ids).await?;
    }

    let mut active: series::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(total_books) = patch.total_books {
        active.total_books = Set(total_books);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let model = active.update(&txn).await?;

    if let Some(ids) = &author_ids {
        replace_series_author_links(&txn, model.id, ids).await?;
    }

    let series = Series::from(model);
    txn.commit().await?;
    Ok(series)
}

/// Delete a series. Books that referenced it keep existing with the
/// reference (and their position within the series) nulled out.
pub async fn delete_series(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let model = series::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    book::Entity::update_many()
        .col_expr(book::Column::SeriesId, Expr::value(Value::Int(None)))
        .col_expr(book::Column::SeriesPosition, Expr::value(Value::Int(None)))
        .filter(book::Column::SeriesId.eq(id))
        .exec(&txn)
        .await?;
    series_authors::Entity::delete_many()
        .filter(series_authors::Column::SeriesId.eq(id))
        .exec(&txn)
        .await?;
    series::Entity::delete_by_id(model.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted series {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Topics

pub async fn list_topics(db: &DatabaseConnection) -> Result<Vec<Topic>, DomainError> {
    let topics = topic::Entity::find()
        .order_by_asc(topic::Column::Id)
        .all(db)
        .await?;
    Ok(topics.into_iter().map(Topic::from).collect())
}

pub async fn get_topic(db: &DatabaseConnection, id: i32) -> Result<Topic, DomainError> {
    topic::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Topic::from)
        .ok_or(DomainError::NotFound)
}

pub async fn create_topic(db: &DatabaseConnection, input: NewTopic) -> Result<Topic, DomainError> {
    validate_name(&input.name, "name")?;

    let now = chrono::Utc::now().to_rfc3339();
    let model = topic::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Topic::from(model))
}

pub async fn update_topic(
    db: &DatabaseConnection,
    id: i32,
    patch: TopicPatch,
) -> Result<Topic, DomainError> {
    if let Some(name) = &patch.name {
        validate_name(name, "name")?;
    }

    let model = topic::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: topic::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(Topic::from(active.update(db).await?))
}

/// Topics are never referenced, so deletion is unconditional.
pub async fn delete_topic(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = topic::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}

// ---------------------------------------------------------------------------

// Preserves first-encounter order while dropping duplicate ids.
fn dedup(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn validate_name(value: &str, field: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!(
            "{} must not be empty",
            field
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

async fn replace_series_author_links<C: ConnectionTrait>(
    conn: &C,
    series_id: i32,
    author_ids: &[i32],
) -> Result<(), DomainError> {
    series_authors::Entity::delete_many()
        .filter(series_authors::Column::SeriesId.eq(series_id))
        .exec(conn)
        .await?;

    for author_id in author_ids {
        let link = series_authors::ActiveModel {
            series_id: Set(series_id),
            author_id: Set(*author_id),
        };
        link.insert(conn).await?;
    }
    Ok(())
}
