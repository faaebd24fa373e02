//! Assignments of rights to members over `[start_date, end_date]`.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A member holding a right. `end_date == None` means open-ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRight {
    pub member_id: Uuid,
    pub right_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "member_rights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub right_id: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
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
        belongs_to = "super::rights::Entity",
        from = "Column::RightId",
        to = "super::rights::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Rights,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::rights::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MemberRight> for ActiveModel {
    fn from(assignment: &MemberRight) -> Self {
        Self {
            member_id: ActiveValue::Set(assignment.member_id.to_string()),
            right_id: ActiveValue::Set(assignment.right_id.to_string()),
            start_date: ActiveValue::Set(assignment.start_date),
            end_date: ActiveValue::Set(assignment.end_date),
        }
    }
}

impl TryFrom<Model> for MemberRight {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            member_id: parse_uuid(&model.member_id, "member")?,
            right_id: parse_uuid(&model.right_id, "right")?,
            start_date: model.start_date,
            end_date: model.end_date,
        })
    }
}
