//! Full-catalog export for the external export collaborator.
//!
//! Both formats draw every book from one snapshot transaction, so an
//! export never mixes pre- and post-mutation rows.

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::domain::DomainError;
use crate::models::book::Book;
use crate::services::book_service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<ExportFormat> {
        match s {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Serialize the full catalog in the requested format.
pub async fn export(db: &DatabaseConnection, format: ExportFormat) -> Result<Vec<u8>, DomainError> {
    let txn = db.begin().await?;
    let books = book_service::all_books_hydrated(&txn).await?;
    txn.commit().await?;

    tracing::info!("Exporting {} books as {:?}", books.len(), format);
    match format {
        ExportFormat::Csv => to_csv(&books),
        ExportFormat::Json => to_json(&books),
    }
}

fn to_csv(books: &[Book]) -> Result<Vec<u8>, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "ID", "Title", "ISBN", "Year", "Pages", "Authors", "Publisher", "Status", "Rating",
        ])
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    for book in books {
        writer
            .write_record([
                book.id.to_string(),
                book.title.clone(),
                book.isbn.clone().unwrap_or_default(),
                book.publication_year.map(|y| y.to_string()).unwrap_or_default(),
                book.pages.map(|p| p.to_string()).unwrap_or_default(),
                joined_authors(book),
                book.publisher.name.clone(),
                book.reading_status.clone(),
                book.rating.map(|r| r.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| DomainError::Internal(e.to_string()))
}

fn to_json(books: &[Book]) -> Result<Vec<u8>, DomainError> {
    let data = serde_json::json!({
        "export_date": chrono::Utc::now().to_rfc3339(),
        "total": books.len(),
        "books": books
            .iter()
            .map(|book| {
                serde_json::json!({
                    "title": book.title,
                    "isbn": book.isbn,
                    "year": book.publication_year,
                    "pages": book.pages,
                    "authors": book.authors.iter().map(|a| a.name.clone()).collect::<Vec<_>>(),
                    "publisher": book.publisher.name,
                    "status": book.reading_status,
                    "rating": book.rating,
                })
            })
            .collect::<Vec<_>>(),
    });

    serde_json::to_vec_pretty(&data).map_err(|e| DomainError::Internal(e.to_string()))
}

fn joined_authors(book: &Book) -> String {
    book.authors
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
