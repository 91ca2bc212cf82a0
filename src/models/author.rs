use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Book.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Author.def().rev())
    }
}

impl Related<super::series::Entity> for Entity {
    fn to() -> RelationDef {
        super::series_authors::Relation::Series.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::series_authors::Relation::Author.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub biography: Option<String>,
}

impl From<Model> for Author {
    fn from(model: Model) -> Self {
        let full_name = model.full_name();
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            full_name,
            biography: model.biography,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub biography: Option<Option<String>>,
}
