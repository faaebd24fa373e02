//! Rights: membership entitlement categories (e.g. "resident").

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, util::{normalize_key, parse_uuid}};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Right {
    pub id: Uuid,
    pub name: String,
    /// Disabled rights keep their data but cannot be newly assigned.
    pub active: bool,
}

impl Right {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            active: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub name_norm: String,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::right_dues::Entity")]
    RightDues,
    #[sea_orm(has_many = "super::member_rights::Entity")]
    MemberRights,
}

impl Related<super::right_dues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RightDues.def()
    }
}

impl Related<super::member_rights::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberRights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Right> for ActiveModel {
    fn from(right: &Right) -> Self {
        Self {
            id: ActiveValue::Set(right.id.to_string()),
            name: ActiveValue::Set(right.name.clone()),
            name_norm: ActiveValue::Set(normalize_key(&right.name)),
            active: ActiveValue::Set(right.active),
        }
    }
}

impl TryFrom<Model> for Right {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "right")?,
            name: model.name,
            active: model.active,
        })
    }
}
