//! Members of the organization.
//!
//! A member is never deleted: deactivation flips the status and frees the
//! organizational role so the history of rights, dues and payments stays
//! attached to the record.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for MemberStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(EngineError::InvalidField(format!(
                "status must be active or inactive, got {other}"
            ))),
        }
    }
}

/// Board position. Each role is held by at most one member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    President,
    VicePresident,
    Secretary,
    Treasurer,
    VocalI,
    VocalII,
    VocalIII,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::President => "president",
            Self::VicePresident => "vice_president",
            Self::Secretary => "secretary",
            Self::Treasurer => "treasurer",
            Self::VocalI => "vocal_i",
            Self::VocalII => "vocal_ii",
            Self::VocalIII => "vocal_iii",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "president" => Ok(Self::President),
            "vice_president" => Ok(Self::VicePresident),
            "secretary" => Ok(Self::Secretary),
            "treasurer" => Ok(Self::Treasurer),
            "vocal_i" => Ok(Self::VocalI),
            "vocal_ii" => Ok(Self::VocalII),
            "vocal_iii" => Ok(Self::VocalIII),
            other => Err(EngineError::InvalidField(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    /// National identity document number (13 digits).
    pub national_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: MemberStatus,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub national_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::member_rights::Entity")]
    MemberRights,
    #[sea_orm(has_many = "super::obligations::Entity")]
    Obligations,
}

impl Related<super::member_rights::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberRights.def()
    }
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            national_id: ActiveValue::Set(member.national_id.clone()),
            name: ActiveValue::Set(member.name.clone()),
            address: ActiveValue::Set(member.address.clone()),
            phone: ActiveValue::Set(member.phone.clone()),
            email: ActiveValue::Set(member.email.clone()),
            role: ActiveValue::Set(member.role.map(|r| r.as_str().to_string())),
            status: ActiveValue::Set(member.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "member")?,
            national_id: model.national_id,
            name: model.name,
            address: model.address,
            phone: model.phone,
            email: model.email,
            role: model.role.as_deref().map(Role::try_from).transpose()?,
            status: MemberStatus::try_from(model.status.as_str())?,
        })
    }
}
