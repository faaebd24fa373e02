//! Due obligations: "this member owes this due".
//!
//! `status` is a denormalized cache of [`ObligationStatus::derive`] over the
//! obligation's payments. Only the engine writes it, always in the same DB
//! transaction as the payment change that moved the paid total.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ObligationStatus, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obligation {
    pub member_id: Uuid,
    pub due_id: Uuid,
    pub assigned_on: NaiveDate,
    pub status: ObligationStatus,
    /// Right whose assignment generated this obligation; `None` when it was
    /// assigned directly.
    pub origin_right_id: Option<Uuid>,
}

impl Obligation {
    pub fn pending(
        member_id: Uuid,
        due_id: Uuid,
        assigned_on: NaiveDate,
        origin_right_id: Option<Uuid>,
    ) -> Self {
        Self {
            member_id,
            due_id,
            assigned_on,
            status: ObligationStatus::Pending,
            origin_right_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "due_obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub due_id: String,
    pub assigned_on: Date,
    pub status: String,
    pub origin_right_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::dues::Entity",
        from = "Column::DueId",
        to = "super::dues::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Dues,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::dues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Obligation> for ActiveModel {
    fn from(obligation: &Obligation) -> Self {
        Self {
            member_id: ActiveValue::Set(obligation.member_id.to_string()),
            due_id: ActiveValue::Set(obligation.due_id.to_string()),
            assigned_on: ActiveValue::Set(obligation.assigned_on),
            status: ActiveValue::Set(obligation.status.as_str().to_string()),
            origin_right_id: ActiveValue::Set(obligation.origin_right_id.map(|id| id.to_string())),
        }
    }
}

impl TryFrom<Model> for Obligation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            member_id: parse_uuid(&model.member_id, "member")?,
            due_id: parse_uuid(&model.due_id, "due")?,
            assigned_on: model.assigned_on,
            status: ObligationStatus::try_from(model.status.as_str())?,
            origin_right_id: model
                .origin_right_id
                .as_deref()
                .map(|id| parse_uuid(id, "right"))
                .transpose()?,
        })
    }
}
