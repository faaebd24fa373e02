//! Income entries.
//!
//! Entries generated by a payment carry `payment_id`; manual income never
//! does.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeEntry {
    pub id: Uuid,
    pub received_on: NaiveDate,
    pub amount: Money,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub payment_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "income_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub received_on: Date,
    pub amount_minor: i64,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub payment_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Payments,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&IncomeEntry> for ActiveModel {
    fn from(entry: &IncomeEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            received_on: ActiveValue::Set(entry.received_on),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            source: ActiveValue::Set(entry.source.clone()),
            notes: ActiveValue::Set(entry.notes.clone()),
            payment_id: ActiveValue::Set(entry.payment_id.map(|id| id.to_string())),
        }
    }
}

impl TryFrom<Model> for IncomeEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "income")?,
            received_on: model.received_on,
            amount: Money::new(model.amount_minor),
            source: model.source,
            notes: model.notes,
            payment_id: model
                .payment_id
                .as_deref()
                .map(|id| parse_uuid(id, "payment"))
                .transpose()?,
        })
    }
}
