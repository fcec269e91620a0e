use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Null only for rows written before accounts existed.
    pub owner_id: Option<i32>,

    pub external_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub genre: String,
    pub rating: i32,
    pub comment: String,
    pub watched: bool,
    pub favorite: bool,
    pub poster_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_watched_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
