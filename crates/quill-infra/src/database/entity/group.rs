//! Group entity for SeaORM. The slug is the primary key.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for quill_core::domain::Group {
    fn from(model: Model) -> Self {
        Self {
            slug: model.slug,
            title: model.title,
            description: model.description,
        }
    }
}

impl From<quill_core::domain::Group> for ActiveModel {
    fn from(group: quill_core::domain::Group) -> Self {
        Self {
            slug: Set(group.slug),
            title: Set(group.title),
            description: Set(group.description),
        }
    }
}
