use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub description: Option<String>,
    #[sea_orm(default_value = "unread")]
    pub reading_status: String,
    pub current_page: i32,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub series_position: Option<i32>,
    pub date_started: Option<String>,
    pub date_completed: Option<String>,
    pub publisher_id: i32,
    pub series_id: Option<i32>,
    pub category_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::publisher::Entity",
        from = "Column::PublisherId",
        to = "super::publisher::Column::Id"
    )]
    Publisher,
    #[sea_orm(
        belongs_to = "super::series::Entity",
        from = "Column::SeriesId",
        to = "super::series::Column::Id"
    )]
    Series,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::publisher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Publisher.def()
    }
}

impl Related<super::series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Series.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_genres::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_genres::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Reading lifecycle of a book. Any status may follow any other;
/// the classification is free-form, not a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Unread,
    Reading,
    Completed,
    Abandoned,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 4] = [
        ReadingStatus::Unread,
        ReadingStatus::Reading,
        ReadingStatus::Completed,
        ReadingStatus::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Unread => "unread",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Completed => "completed",
            ReadingStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<ReadingStatus> {
        Self::ALL.iter().copied().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved foreign-key reference (id plus display name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

/// Hydrated book for API responses: foreign keys resolved to display
/// names so consumers render without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub reading_status: String,
    pub current_page: i32,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub series_position: Option<i32>,
    pub date_started: Option<String>,
    pub date_completed: Option<String>,
    pub publisher_id: i32,
    pub series_id: Option<i32>,
    pub category_id: Option<i32>,
    pub publisher: NamedRef,
    pub authors: Vec<NamedRef>,
    pub genres: Vec<NamedRef>,
    pub series: Option<NamedRef>,
    pub category: Option<NamedRef>,
}

/// Input for creating a book. `author_ids`/`genre_ids` become the
/// book's full attachment sets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub reading_status: Option<String>,
    pub current_page: Option<i32>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub series_position: Option<i32>,
    pub date_started: Option<String>,
    pub date_completed: Option<String>,
    pub publisher_id: i32,
    pub series_id: Option<i32>,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub author_ids: Vec<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Partial update for a book. Outer `None` leaves a field unchanged;
/// `Some(None)` clears a nullable field. `author_ids`/`genre_ids`, when
/// present, replace the attachment set wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn: Option<Option<String>>,
    pub publication_year: Option<Option<i32>>,
    pub pages: Option<Option<i32>>,
    pub language: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub reading_status: Option<String>,
    pub current_page: Option<i32>,
    pub rating: Option<Option<i32>>,
    pub notes: Option<Option<String>>,
    pub series_position: Option<Option<i32>>,
    pub date_started: Option<Option<String>>,
    pub date_completed: Option<Option<String>>,
    pub publisher_id: Option<i32>,
    pub series_id: Option<Option<i32>>,
    pub category_id: Option<Option<i32>>,
    pub author_ids: Option<Vec<i32>>,
    pub genre_ids: Option<Vec<i32>>,
}
