//! Due templates: a fixed amount owed by a limit date.
//!
//! A due is independent of any member until it is linked to a right or
//! obligated to a member.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, util::{normalize_key, parse_uuid}};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Due {
    pub id: Uuid,
    pub description: String,
    pub amount: Money,
    pub limit_date: NaiveDate,
}

impl Due {
    pub fn new(description: String, amount: Money, limit_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            amount,
            limit_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    #[sea_orm(unique)]
    pub description_norm: String,
    pub amount_minor: i64,
    pub limit_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::right_dues::Entity")]
    RightDues,
    #[sea_orm(has_many = "super::obligations::Entity")]
    Obligations,
}

impl Related<super::right_dues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RightDues.def()
    }
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Due> for ActiveModel {
    fn from(due: &Due) -> Self {
        Self {
            id: ActiveValue::Set(due.id.to_string()),
            description: ActiveValue::Set(due.description.clone()),
            description_norm: ActiveValue::Set(normalize_key(&due.description)),
            amount_minor: ActiveValue::Set(due.amount.cents()),
            limit_date: ActiveValue::Set(due.limit_date),
        }
    }
}

impl TryFrom<Model> for Due {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "due")?,
            description: model.description,
            amount: Money::new(model.amount_minor),
            limit_date: model.limit_date,
        })
    }
}
