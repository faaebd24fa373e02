//! Payments against a member's due obligation.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

/// Stored on every payment. Informational only: the authoritative state of
/// an obligation is derived from the paid total.
pub const PAYMENT_REGISTERED: &str = "registered";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub due_id: Uuid,
    pub paid_on: NaiveDate,
    pub amount: Money,
    pub status: String,
}

impl Payment {
    pub fn new(member_id: Uuid, due_id: Uuid, paid_on: NaiveDate, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            due_id,
            paid_on,
            amount,
            status: PAYMENT_REGISTERED.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub due_id: String,
    pub paid_on: Date,
    pub amount_minor: i64,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incomes::Entity")]
    Incomes,
}

impl Related<super::incomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            member_id: ActiveValue::Set(payment.member_id.to_string()),
            due_id: ActiveValue::Set(payment.due_id.to_string()),
            paid_on: ActiveValue::Set(payment.paid_on),
            amount_minor: ActiveValue::Set(payment.amount.cents()),
            status: ActiveValue::Set(payment.status.clone()),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            member_id: parse_uuid(&model.member_id, "member")?,
            due_id: parse_uuid(&model.due_id, "due")?,
            paid_on: model.paid_on,
            amount: Money::new(model.amount_minor),
            status: model.status,
        })
    }
}
