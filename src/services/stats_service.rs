//! Library statistics for dashboard consumption.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::DomainError;
use crate::models::book::{self, Entity as BookEntity};
use crate::models::{author, publisher};

const RECENT_BOOK_LIMIT: u64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct RecentBook {
    pub id: i32,
    pub title: String,
    pub authors: Vec<String>,
}

/// Summary counts over the current catalog snapshot. Statuses with no
/// books are omitted from `reading_status`; a missing key means zero.
#[derive(Debug, Serialize)]
pub struct LibraryStats {
    pub total_books: u64,
    pub total_authors: u64,
    pub total_publishers: u64,
    pub reading_status: HashMap<String, u64>,
    pub recent_books: Vec<RecentBook>,
}

pub async fn stats(db: &DatabaseConnection) -> Result<LibraryStats, DomainError> {
    let txn = db.begin().await?;

    let books = BookEntity::find().all(&txn).await?;
    let total_books = books.len() as u64;

    let mut reading_status: HashMap<String, u64> = HashMap::new();
    for model in &books {
        *reading_status.entry(model.reading_status.clone()).or_insert(0) += 1;
    }

    let total_authors = author::Entity::find().count(&txn).await?;
    let total_publishers = publisher::Entity::find().count(&txn).await?;

    let recent_books = recent_books(&txn).await?;

    txn.commit().await?;

    Ok(LibraryStats {
        total_books,
        total_authors,
        total_publishers,
        reading_status,
        recent_books,
    })
}

async fn recent_books<C: ConnectionTrait>(conn: &C) -> Result<Vec<RecentBook>, DomainError> {
    let models = BookEntity::find()
        .order_by_desc(book::Column::CreatedAt)
        .order_by_desc(book::Column::Id)
        .limit(RECENT_BOOK_LIMIT)
        .all(conn)
        .await?;

    let mut recent = Vec::with_capacity(models.len());
    for model in models {
        let authors = model
            .find_related(author::Entity)
            .order_by_asc(author::Column::Id)
            .all(conn)
            .await?
            .into_iter()
            .map(|a| a.full_name())
            .collect();
        recent.push(RecentBook {
            id: model.id,
            title: model.title,
            authors,
        });
    }
    Ok(recent)
}
