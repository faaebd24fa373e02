//! Expense entries. Leaves of the ledger: nothing references them.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseEntry {
    pub id: Uuid,
    pub spent_on: NaiveDate,
    pub amount: Money,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub spent_on: Date,
    pub amount_minor: i64,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseEntry> for ActiveModel {
    fn from(entry: &ExpenseEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            spent_on: ActiveValue::Set(entry.spent_on),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            description: ActiveValue::Set(entry.description.clone()),
        }
    }
}

impl TryFrom<Model> for ExpenseEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            spent_on: model.spent_on,
            amount: Money::new(model.amount_minor),
            description: model.description,
        })
    }
}
