use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AssignRightCmd, EngineError, MemberRight, MemberStatus, Obligation, ObligationStatus, ResultEngine,
    Violations, member_rights, members, obligations,
    util::{parse_date, parse_optional_date, parse_uuid},
};

use super::{Engine, catalog::linked_dues, find_obligation, with_tx};

/// Outcome of [`Engine::assign_right`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub assignment: MemberRight,
    /// Dues obligated by this assignment.
    pub created: Vec<Uuid>,
    /// Dues skipped because the member already owed them.
    pub skipped: Vec<Uuid>,
}

/// `start <= end` when an end is given.
fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), EngineError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(EngineError::InvalidRange(format!(
            "start date {start} is after end date {end}"
        ))),
        _ => Ok(()),
    }
}

fn ensure_active_member(member: &members::Model) -> Result<(), EngineError> {
    if member.status != MemberStatus::Active.as_str() {
        return Err(EngineError::Inactive(format!(
            "member {} is inactive",
            member.name
        )));
    }
    Ok(())
}

impl Engine {
    /// Assign a right to a member and obligate them to every due the right
    /// entails.
    ///
    /// Dues the member already owes are skipped and reported in
    /// [`Assignment::skipped`]. The assignment and its obligations are
    /// written in one DB transaction: either all of them exist afterwards or
    /// none does.
    pub async fn assign_right(&self, cmd: AssignRightCmd) -> ResultEngine<Assignment> {
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let member = violations.take(self.require_member(&db_tx, cmd.member_id).await);
            let right = violations.take(self.require_right(&db_tx, cmd.right_id).await);
            if let Some(member) = &member {
                violations.take(ensure_active_member(member));
            }
            if let Some(right) = &right {
                violations.check(!right.active, || {
                    EngineError::Inactive(format!("right {} is disabled", right.name))
                });
            }
            let start = violations.take(parse_date(&cmd.start_date, "start date"));
            let end = violations.take(parse_optional_date(cmd.end_date.as_deref(), "end date"));
            violations.take(check_range(start, end.flatten()));
            if member.is_some() && right.is_some() {
                let exists = find_assignment(&db_tx, cmd.member_id, cmd.right_id)
                    .await?
                    .is_some();
                violations.check(exists, || {
                    EngineError::DuplicateEntry("member already holds the right".to_string())
                });
            }

            let (start_date, end_date) = violations
                .finish(start.zip(end))
                .inspect_err(|err| {
                    warn!(member_id = %cmd.member_id, right_id = %cmd.right_id, error = %err,
                        "right assignment rejected");
                })?;

            let assignment = MemberRight {
                member_id: cmd.member_id,
                right_id: cmd.right_id,
                start_date,
                end_date,
            };
            member_rights::ActiveModel::from(&assignment)
                .insert(&db_tx)
                .await?;

            let mut created = Vec::new();
            let mut skipped = Vec::new();
            for due in linked_dues(&db_tx, cmd.right_id).await? {
                let due_id = parse_uuid(&due.id, "due")?;
                if find_obligation(&db_tx, cmd.member_id, due_id).await?.is_some() {
                    skipped.push(due_id);
                    continue;
                }
                let obligation =
                    Obligation::pending(cmd.member_id, due_id, start_date, Some(cmd.right_id));
                obligations::ActiveModel::from(&obligation)
                    .insert(&db_tx)
                    .await?;
                created.push(due_id);
            }

            info!(
                member_id = %cmd.member_id,
                right_id = %cmd.right_id,
                created = created.len(),
                skipped = skipped.len(),
                "right assigned"
            );
            Ok(Assignment {
                assignment,
                created,
                skipped,
            })
        })
    }

    /// Change the date range of an existing assignment.
    pub async fn update_assignment(&self, cmd: AssignRightCmd) -> ResultEngine<MemberRight> {
        with_tx!(self, |db_tx| {
            let model = find_assignment(&db_tx, cmd.member_id, cmd.right_id)
                .await?
                .ok_or_else(|| EngineError::NotFound("assignment".to_string()))?;
            let mut violations = Violations::new();
            let start = violations.take(parse_date(&cmd.start_date, "start date"));
            let end = violations.take(parse_optional_date(cmd.end_date.as_deref(), "end date"));
            violations.take(check_range(start, end.flatten()));
            let (start_date, end_date) = violations.finish(start.zip(end))?;

            let mut active: member_rights::ActiveModel = model.into();
            active.start_date = ActiveValue::Set(start_date);
            active.end_date = ActiveValue::Set(end_date);
            let assignment = MemberRight::try_from(active.update(&db_tx).await?)?;
            info!(member_id = %cmd.member_id, right_id = %cmd.right_id, "assignment updated");
            Ok(assignment)
        })
    }

    /// Remove a right from a member.
    ///
    /// Obligations are left standing: the debt survives the entitlement.
    /// Returns the still pending obligations on the dues of the right.
    pub async fn revoke_right(
        &self,
        member_id: Uuid,
        right_id: Uuid,
    ) -> ResultEngine<Vec<Obligation>> {
        with_tx!(self, |db_tx| {
            let model = find_assignment(&db_tx, member_id, right_id)
                .await?
                .ok_or_else(|| EngineError::NotFound("assignment".to_string()))?;
            model.delete(&db_tx).await?;

            let mut outstanding = Vec::new();
            for due in linked_dues(&db_tx, right_id).await? {
                let due_id = parse_uuid(&due.id, "due")?;
                if let Some(obligation) = find_obligation(&db_tx, member_id, due_id).await? {
                    let obligation = Obligation::try_from(obligation)?;
                    if obligation.status == ObligationStatus::Pending {
                        outstanding.push(obligation);
                    }
                }
            }
            info!(%member_id, %right_id, outstanding = outstanding.len(), "right revoked");
            Ok(outstanding)
        })
    }

    /// Obligate a member to a due directly, outside any right.
    pub async fn assign_due(
        &self,
        member_id: Uuid,
        due_id: Uuid,
        assigned_on: &str,
    ) -> ResultEngine<Obligation> {
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let member = violations.take(self.require_member(&db_tx, member_id).await);
            let due = violations.take(self.require_due(&db_tx, due_id).await);
            if let Some(member) = &member {
                violations.take(ensure_active_member(member));
            }
            let assigned_on = violations.take(parse_date(assigned_on, "date"));
            if member.is_some() && due.is_some() {
                let exists = find_obligation(&db_tx, member_id, due_id).await?.is_some();
                violations.check(exists, || {
                    EngineError::DuplicateEntry("member already owes the due".to_string())
                });
            }
            let assigned_on = violations.finish(assigned_on).inspect_err(|err| {
                warn!(%member_id, %due_id, error = %err, "due assignment rejected");
            })?;

            let obligation = Obligation::pending(member_id, due_id, assigned_on, None);
            obligations::ActiveModel::from(&obligation)
                .insert(&db_tx)
                .await?;
            info!(%member_id, %due_id, "due assigned");
            Ok(obligation)
        })
    }

    /// Rights held by a member.
    pub async fn assignments_of_member(&self, member_id: Uuid) -> ResultEngine<Vec<MemberRight>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, member_id).await?;
            member_rights::Entity::find()
                .filter(member_rights::Column::MemberId.eq(member_id.to_string()))
                .order_by_asc(member_rights::Column::StartDate)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(MemberRight::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Dues owed by a member, paid or not.
    pub async fn obligations_of_member(&self, member_id: Uuid) -> ResultEngine<Vec<Obligation>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, member_id).await?;
            obligations::Entity::find()
                .filter(obligations::Column::MemberId.eq(member_id.to_string()))
                .order_by_asc(obligations::Column::AssignedOn)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Obligation::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}

async fn find_assignment(
    db_tx: &DatabaseTransaction,
    member_id: Uuid,
    right_id: Uuid,
) -> ResultEngine<Option<member_rights::Model>> {
    Ok(
        member_rights::Entity::find_by_id((member_id.to_string(), right_id.to_string()))
            .one(db_tx)
            .await?,
    )
}
