use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "series")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub total_books: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book::Entity")]
    Book,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::series_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::series_authors::Relation::Series.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub total_books: Option<i32>,
}

impl From<Model> for Series {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            total_books: model.total_books,
        }
    }
}

/// Input for creating a series. `author_ids` becomes the series'
/// full author attachment set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSeries {
    pub name: String,
    pub description: Option<String>,
    pub total_books: Option<i32>,
    #[serde(default)]
    pub author_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub total_books: Option<Option<i32>>,
    pub author_ids: Option<Vec<i32>>,
}
