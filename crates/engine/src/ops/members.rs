use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    EngineError, Member, MemberNew, MemberStatus, MemberUpdate, ResultEngine, Role, Violations,
    members,
    util::{normalize_display, normalize_optional_text},
};

use super::{Engine, with_tx};

const NATIONAL_ID_DIGITS: usize = 13;

fn validate_national_id(value: &str) -> Result<String, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField("national id is required".to_string()));
    }
    if trimmed.len() != NATIONAL_ID_DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::InvalidField(format!(
            "national id must be exactly {NATIONAL_ID_DIGITS} digits"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_name(value: &str) -> Result<String, EngineError> {
    let name = normalize_display(value);
    if name.is_empty() {
        return Err(EngineError::MissingField("name is required".to_string()));
    }
    Ok(name)
}

fn validate_email(value: Option<&str>) -> Result<Option<String>, EngineError> {
    match normalize_optional_text(value) {
        Some(email) if !(email.contains('@') && email.contains('.')) => Err(
            EngineError::InvalidField("email must contain '@' and '.'".to_string()),
        ),
        other => Ok(other),
    }
}

fn validate_phone(value: Option<&str>) -> Result<Option<String>, EngineError> {
    match normalize_optional_text(value) {
        Some(phone)
            if !(7..=15).contains(&phone.len()) || !phone.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Err(EngineError::InvalidField(
                "phone must be 7 to 15 digits".to_string(),
            ))
        }
        other => Ok(other),
    }
}

fn parse_role(value: Option<&str>) -> Result<Option<Role>, EngineError> {
    normalize_optional_text(value)
        .map(|role| Role::try_from(role.as_str()))
        .transpose()
}

impl Engine {
    /// Register a new, active member.
    ///
    /// Every field is validated and all violations are reported together.
    pub async fn register_member(&self, cmd: MemberNew) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let national_id = violations.take(validate_national_id(&cmd.national_id));
            let name = violations.take(validate_name(&cmd.name));
            let email = violations.take(validate_email(cmd.email.as_deref()));
            let phone = violations.take(validate_phone(cmd.phone.as_deref()));
            let role = violations.take(parse_role(cmd.role.as_deref()));

            if let Some(national_id) = &national_id {
                let taken = self
                    .national_id_taken(&db_tx, national_id, None)
                    .await?;
                violations.check(taken, || {
                    EngineError::DuplicateEntry(format!("national id {national_id}"))
                });
            }
            if let Some(Some(role)) = role {
                let taken = self.role_taken(&db_tx, role, None).await?;
                violations.check(taken, || {
                    EngineError::DuplicateEntry(format!("role {} is already held", role.as_str()))
                });
            }

            let parts = national_id
                .zip(name)
                .zip(email)
                .zip(phone)
                .zip(role);
            let ((((national_id, name), email), phone), role) =
                violations.finish(parts).inspect_err(|err| {
                    warn!(error = %err, "member registration rejected");
                })?;

            let member = Member {
                id: Uuid::new_v4(),
                national_id,
                name,
                address: normalize_optional_text(cmd.address.as_deref()),
                phone,
                email,
                role,
                status: MemberStatus::Active,
            };
            members::ActiveModel::from(&member).insert(&db_tx).await?;
            info!(member_id = %member.id, "member registered");
            Ok(member)
        })
    }

    /// Apply a partial update to a member.
    pub async fn update_member(&self, member_id: Uuid, cmd: MemberUpdate) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let model = self.require_member(&db_tx, member_id).await?;
            let mut member = Member::try_from(model)?;
            let mut violations = Violations::new();

            if let Some(value) = cmd.national_id.as_deref() {
                if let Some(national_id) = violations.take(validate_national_id(value)) {
                    let taken = self
                        .national_id_taken(&db_tx, &national_id, Some(member_id))
                        .await?;
                    violations.check(taken, || {
                        EngineError::DuplicateEntry(format!("national id {national_id}"))
                    });
                    member.national_id = national_id;
                }
            }
            if let Some(value) = cmd.name.as_deref() {
                if let Some(name) = violations.take(validate_name(value)) {
                    member.name = name;
                }
            }
            if let Some(value) = cmd.address.as_deref() {
                member.address = normalize_optional_text(Some(value));
            }
            if let Some(value) = cmd.phone.as_deref() {
                if let Some(phone) = violations.take(validate_phone(Some(value))) {
                    member.phone = phone;
                }
            }
            if let Some(value) = cmd.email.as_deref() {
                if let Some(email) = violations.take(validate_email(Some(value))) {
                    member.email = email;
                }
            }
            if let Some(value) = cmd.role.as_deref() {
                if let Some(role) = violations.take(parse_role(Some(value))) {
                    if let Some(role) = role {
                        violations.check(!member.is_active(), || {
                            EngineError::Inactive("an inactive member cannot hold a role".to_string())
                        });
                        let taken = self.role_taken(&db_tx, role, Some(member_id)).await?;
                        violations.check(taken, || {
                            EngineError::DuplicateEntry(format!(
                                "role {} is already held",
                                role.as_str()
                            ))
                        });
                    }
                    member.role = role;
                }
            }

            violations.into_result().inspect_err(|err| {
                warn!(%member_id, error = %err, "member update rejected");
            })?;

            members::ActiveModel::from(&member).update(&db_tx).await?;
            info!(%member_id, "member updated");
            Ok(member)
        })
    }

    /// Deactivate a member: the status flips and the role is released. The
    /// record and its history are kept.
    pub async fn deactivate_member(&self, member_id: Uuid) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let model = self.require_member(&db_tx, member_id).await?;
            let mut member = Member::try_from(model)?;
            member.status = MemberStatus::Inactive;
            member.role = None;
            members::ActiveModel::from(&member).update(&db_tx).await?;
            info!(%member_id, "member deactivated");
            Ok(member)
        })
    }

    /// Return a member.
    pub async fn member(&self, member_id: Uuid) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let model = self.require_member(&db_tx, member_id).await?;
            Member::try_from(model)
        })
    }

    /// List members ordered by name.
    pub async fn members(&self) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            members::Entity::find()
                .order_by_asc(members::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Member::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    async fn national_id_taken(
        &self,
        db_tx: &DatabaseTransaction,
        national_id: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query =
            members::Entity::find().filter(members::Column::NationalId.eq(national_id));
        if let Some(id) = except {
            query = query.filter(members::Column::Id.ne(id.to_string()));
        }
        Ok(query.one(db_tx).await?.is_some())
    }

    async fn role_taken(
        &self,
        db_tx: &DatabaseTransaction,
        role: Role,
        except: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query = members::Entity::find().filter(members::Column::Role.eq(role.as_str()));
        if let Some(id) = except {
            query = query.filter(members::Column::Id.ne(id.to_string()));
        }
        Ok(query.one(db_tx).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_id_is_thirteen_digits() {
        assert_eq!(
            validate_national_id(" 1234567890123 ").unwrap(),
            "1234567890123"
        );
        assert!(matches!(
            validate_national_id("123"),
            Err(EngineError::InvalidField(_))
        ));
        assert!(matches!(
            validate_national_id("12345678901ab"),
            Err(EngineError::InvalidField(_))
        ));
        assert!(matches!(
            validate_national_id(""),
            Err(EngineError::MissingField(_))
        ));
    }

    #[test]
    fn contact_fields() {
        assert_eq!(validate_email(Some("")).unwrap(), None);
        assert!(validate_email(Some("ana@example.org")).is_ok());
        assert!(validate_email(Some("ana.example.org")).is_err());
        assert!(validate_phone(Some("55512345")).is_ok());
        assert!(validate_phone(Some("555")).is_err());
        assert!(validate_phone(Some("5551-2345")).is_err());
    }

    #[test]
    fn roles_parse_from_snake_case() {
        assert_eq!(parse_role(Some("treasurer")).unwrap(), Some(Role::Treasurer));
        assert_eq!(parse_role(Some(" ")).unwrap(), None);
        assert!(parse_role(Some("king")).is_err());
    }
}
