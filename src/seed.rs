//! Demo catalog for fresh installations.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::domain::DomainError;
use crate::models::author::NewAuthor;
use crate::models::book::{Entity as BookEntity, NewBook};
use crate::models::category::NewCategory;
use crate::models::genre::NewGenre;
use crate::models::publisher::NewPublisher;
use crate::models::series::NewSeries;
use crate::services::{book_service, catalog_service};

/// Populate an empty catalog with a small demo library. Does nothing if
/// any book already exists.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    if BookEntity::find().count(db).await? > 0 {
        tracing::info!("Catalog not empty, skipping demo seed");
        return Ok(());
    }

    let penguin = catalog_service::create_publisher(
        db,
        NewPublisher {
            name: "Penguin Random House".to_string(),
            country: Some("USA".to_string()),
        },
    )
    .await?;
    let harpercollins = catalog_service::create_publisher(
        db,
        NewPublisher {
            name: "HarperCollins".to_string(),
            country: Some("USA".to_string()),
        },
    )
    .await?;

    let orwell = catalog_service::create_author(
        db,
        NewAuthor {
            first_name: "George".to_string(),
            last_name: "Orwell".to_string(),
            biography: Some("English novelist and essayist".to_string()),
        },
    )
    .await?;
    let austen = catalog_service::create_author(
        db,
        NewAuthor {
            first_name: "Jane".to_string(),
            last_name: "Austen".to_string(),
            biography: Some("English novelist".to_string()),
        },
    )
    .await?;
    let king = catalog_service::create_author(
        db,
        NewAuthor {
            first_name: "Stephen".to_string(),
            last_name: "King".to_string(),
            biography: Some("American author of horror fiction".to_string()),
        },
    )
    .await?;

    let fiction = catalog_service::create_genre(
        db,
        NewGenre {
            name: "Fiction".to_string(),
            description: Some("Literary fiction".to_string()),
        },
    )
    .await?;
    let classic = catalog_service::create_genre(
        db,
        NewGenre {
            name: "Classic".to_string(),
            description: Some("Classic literature".to_string()),
        },
    )
    .await?;
    let horror = catalog_service::create_genre(
        db,
        NewGenre {
            name: "Horror".to_string(),
            description: Some("Horror fiction".to_string()),
        },
    )
    .await?;
    let romance = catalog_service::create_genre(
        db,
        NewGenre {
            name: "Romance".to_string(),
            description: Some("Romantic fiction".to_string()),
        },
    )
    .await?;

    let favorites = catalog_service::create_category(
        db,
        NewCategory {
            name: "Favorites".to_string(),
            description: Some("My favorite books".to_string()),
        },
    )
    .await?;

    let dark_tower = catalog_service::create_series(
        db,
        NewSeries {
            name: "The Dark Tower".to_string(),
            description: None,
            total_books: Some(8),
            author_ids: vec![king.id],
        },
    )
    .await?;

    book_service::create_book(
        db,
        NewBook {
            title: "1984".to_string(),
            isbn: Some("9780451524935".to_string()),
            publication_year: Some(1949),
            pages: Some(328),
            language: Some("English".to_string()),
            reading_status: Some("completed".to_string()),
            rating: Some(5),
            publisher_id: penguin.id,
            category_id: Some(favorites.id),
            author_ids: vec![orwell.id],
            genre_ids: vec![fiction.id, classic.id],
            ..Default::default()
        },
    )
    .await?;

    book_service::create_book(
        db,
        NewBook {
            title: "Pride and Prejudice".to_string(),
            isbn: Some("9780141439518".to_string()),
            publication_year: Some(1813),
            pages: Some(432),
            language: Some("English".to_string()),
            reading_status: Some("reading".to_string()),
            current_page: Some(150),
            publisher_id: penguin.id,
            author_ids: vec![austen.id],
            genre_ids: vec![classic.id, romance.id],
            ..Default::default()
        },
    )
    .await?;

    book_service::create_book(
        db,
        NewBook {
            title: "The Gunslinger".to_string(),
            isbn: Some("9781501143519".to_string()),
            publication_year: Some(1982),
            pages: Some(231),
            language: Some("English".to_string()),
            reading_status: Some("unread".to_string()),
            publisher_id: harpercollins.id,
            series_id: Some(dark_tower.id),
            series_position: Some(1),
            author_ids: vec![king.id],
            genre_ids: vec![fiction.id, horror.id],
            ..Default::default()
        },
    )
    .await?;

    tracing::info!("Demo data seeded");
    Ok(())
}
