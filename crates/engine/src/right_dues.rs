//! Right ↔ due links: holding the right entails owing the due.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "right_dues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub right_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub due_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rights::Entity",
        from = "Column::RightId",
        to = "super::rights::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Rights,
    #[sea_orm(
        belongs_to = "super::dues::Entity",
        from = "Column::DueId",
        to = "super::dues::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Dues,
}

impl Related<super::rights::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rights.def()
    }
}

impl Related<super::dues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
