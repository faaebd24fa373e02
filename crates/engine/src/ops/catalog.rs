use std::collections::HashSet;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    CascadeIndex, Due, DueNew, DueUpdate, EngineError, Money, ObligationFact, ResultEngine, Right,
    Violations, dues, member_rights, obligations, payments, plan_right_removal, right_dues,
    rights,
    util::{normalize_display, normalize_key, parse_date, parse_positive_amount, parse_uuid},
};

use super::{Engine, payment_amounts, sync_obligation_status, with_tx};

/// What [`Engine::delete_right`] removed or preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RightRemoval {
    pub right_id: Uuid,
    pub links_removed: usize,
    pub assignments_removed: usize,
    pub obligations_removed: usize,
    /// Obligations now attributed to another right the member still holds.
    pub obligations_reattributed: usize,
    /// Obligations left standing because they already received payments.
    pub obligations_kept: usize,
}

fn validate_right_name(value: &str) -> ResultEngine<String> {
    let name = normalize_display(value);
    if name.is_empty() {
        return Err(EngineError::MissingField("right name is required".to_string()));
    }
    Ok(name)
}

fn validate_description(value: &str) -> ResultEngine<String> {
    let description = normalize_display(value);
    if description.is_empty() {
        return Err(EngineError::MissingField(
            "due description is required".to_string(),
        ));
    }
    Ok(description)
}

impl Engine {
    /// Create a right. Names are unique ignoring case and accents.
    pub async fn create_right(&self, name: &str) -> ResultEngine<Right> {
        let name = validate_right_name(name)?;
        with_tx!(self, |db_tx| {
            if self.right_name_taken(&db_tx, &name, None).await? {
                return Err(EngineError::DuplicateEntry(format!("right {name}")));
            }
            let right = Right::new(name);
            rights::ActiveModel::from(&right).insert(&db_tx).await?;
            info!(right_id = %right.id, name = %right.name, "right created");
            Ok(right)
        })
    }

    /// Rename a right.
    pub async fn rename_right(&self, right_id: Uuid, name: &str) -> ResultEngine<Right> {
        let name = validate_right_name(name)?;
        with_tx!(self, |db_tx| {
            let mut right = Right::try_from(self.require_right(&db_tx, right_id).await?)?;
            if self.right_name_taken(&db_tx, &name, Some(right_id)).await? {
                return Err(EngineError::DuplicateEntry(format!("right {name}")));
            }
            right.name = name;
            rights::ActiveModel::from(&right).update(&db_tx).await?;
            info!(%right_id, "right renamed");
            Ok(right)
        })
    }

    /// Enable or disable a right. A disabled right keeps its links and
    /// assignments but cannot be assigned again.
    pub async fn set_right_active(&self, right_id: Uuid, active: bool) -> ResultEngine<Right> {
        with_tx!(self, |db_tx| {
            let mut right = Right::try_from(self.require_right(&db_tx, right_id).await?)?;
            right.active = active;
            rights::ActiveModel::from(&right).update(&db_tx).await?;
            info!(%right_id, active, "right availability changed");
            Ok(right)
        })
    }

    pub async fn right(&self, right_id: Uuid) -> ResultEngine<Right> {
        with_tx!(self, |db_tx| {
            Right::try_from(self.require_right(&db_tx, right_id).await?)
        })
    }

    pub async fn rights(&self) -> ResultEngine<Vec<Right>> {
        with_tx!(self, |db_tx| {
            rights::Entity::find()
                .order_by_asc(rights::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Right::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Delete a right with its due links and assignments.
    ///
    /// Obligations generated by the right are removed too, unless another
    /// right the member holds still entails the due (the obligation is
    /// re-attributed) or payments were already made on it (the obligation
    /// stays as a manual one). See [`plan_right_removal`].
    pub async fn delete_right(&self, right_id: Uuid) -> ResultEngine<RightRemoval> {
        with_tx!(self, |db_tx| {
            self.require_right(&db_tx, right_id).await?;
            let index = cascade_index(&db_tx, right_id).await?;
            let plan = plan_right_removal(right_id, &index);

            for (member_id, due_id) in &plan.obligations {
                obligations::Entity::delete_by_id((member_id.to_string(), due_id.to_string()))
                    .exec(&db_tx)
                    .await?;
            }
            for (member_id, due_id, other_right) in &plan.reattributed {
                set_origin(&db_tx, *member_id, *due_id, Some(*other_right)).await?;
            }
            for (member_id, due_id) in &plan.kept_with_payments {
                set_origin(&db_tx, *member_id, *due_id, None).await?;
            }
            member_rights::Entity::delete_many()
                .filter(member_rights::Column::RightId.eq(right_id.to_string()))
                .exec(&db_tx)
                .await?;
            right_dues::Entity::delete_many()
                .filter(right_dues::Column::RightId.eq(right_id.to_string()))
                .exec(&db_tx)
                .await?;
            rights::Entity::delete_by_id(right_id.to_string())
                .exec(&db_tx)
                .await?;

            let removal = RightRemoval {
                right_id,
                links_removed: plan.links.len(),
                assignments_removed: plan.assignments.len(),
                obligations_removed: plan.obligations.len(),
                obligations_reattributed: plan.reattributed.len(),
                obligations_kept: plan.kept_with_payments.len(),
            };
            info!(
                %right_id,
                links = removal.links_removed,
                assignments = removal.assignments_removed,
                obligations = removal.obligations_removed,
                kept = removal.obligations_kept,
                "right deleted"
            );
            Ok(removal)
        })
    }

    /// Create a due template.
    pub async fn create_due(&self, cmd: DueNew) -> ResultEngine<Due> {
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let description = violations.take(validate_description(&cmd.description));
            let amount = violations.take(parse_positive_amount(&cmd.amount, "amount"));
            let limit_date = violations.take(parse_date(&cmd.limit_date, "limit date"));
            if let Some(description) = &description {
                let taken = self.due_description_taken(&db_tx, description, None).await?;
                violations.check(taken, || {
                    EngineError::DuplicateEntry(format!("due {description}"))
                });
            }
            let ((description, amount), limit_date) = violations
                .finish(description.zip(amount).zip(limit_date))
                .inspect_err(|err| warn!(error = %err, "due creation rejected"))?;

            let due = Due::new(description, amount, limit_date);
            dues::ActiveModel::from(&due).insert(&db_tx).await?;
            info!(due_id = %due.id, amount = %due.amount, "due created");
            Ok(due)
        })
    }

    /// Update a due template.
    ///
    /// A new amount may not fall below what was already paid on any of its
    /// obligations; every obligation status is re-derived against it.
    pub async fn update_due(&self, due_id: Uuid, cmd: DueUpdate) -> ResultEngine<Due> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let mut due = Due::try_from(self.require_due(&db_tx, due_id).await?)?;
            let mut violations = Violations::new();

            if let Some(value) = cmd.description.as_deref() {
                if let Some(description) = violations.take(validate_description(value)) {
                    let taken = self
                        .due_description_taken(&db_tx, &description, Some(due_id))
                        .await?;
                    violations.check(taken, || {
                        EngineError::DuplicateEntry(format!("due {description}"))
                    });
                    due.description = description;
                }
            }
            if let Some(value) = cmd.limit_date.as_deref() {
                if let Some(limit_date) = violations.take(parse_date(value, "limit date")) {
                    due.limit_date = limit_date;
                }
            }
            let mut amount_changed = false;
            if let Some(value) = cmd.amount.as_deref() {
                if let Some(amount) = violations.take(parse_positive_amount(value, "amount")) {
                    let largest_paid = largest_paid_on_due(&db_tx, due_id).await?;
                    violations.check(amount < largest_paid, || {
                        EngineError::InvalidAmount(format!(
                            "amount is below the {largest_paid} already paid on an obligation"
                        ))
                    });
                    amount_changed = amount != due.amount;
                    due.amount = amount;
                }
            }

            violations
                .into_result()
                .inspect_err(|err| warn!(%due_id, error = %err, "due update rejected"))?;

            dues::ActiveModel::from(&due).update(&db_tx).await?;
            if amount_changed {
                let affected = obligations::Entity::find()
                    .filter(obligations::Column::DueId.eq(due_id.to_string()))
                    .all(&db_tx)
                    .await?;
                for obligation in affected {
                    sync_obligation_status(&db_tx, obligation, due.amount).await?;
                }
            }
            info!(%due_id, "due updated");
            Ok(due)
        })
    }

    /// Delete a due template that nobody owes or paid yet; its right links
    /// go with it.
    pub async fn delete_due(&self, due_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_due(&db_tx, due_id).await?;
            let id = due_id.to_string();
            let obligated = obligations::Entity::find()
                .filter(obligations::Column::DueId.eq(id.clone()))
                .count(&db_tx)
                .await?;
            let paid = payments::Entity::find()
                .filter(payments::Column::DueId.eq(id.clone()))
                .count(&db_tx)
                .await?;
            if obligated > 0 || paid > 0 {
                warn!(%due_id, obligated, paid, "due deletion rejected");
                return Err(EngineError::InUse(format!(
                    "due has {obligated} obligations and {paid} payments"
                )));
            }
            right_dues::Entity::delete_many()
                .filter(right_dues::Column::DueId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            dues::Entity::delete_by_id(id).exec(&db_tx).await?;
            info!(%due_id, "due deleted");
            Ok(())
        })
    }

    pub async fn due(&self, due_id: Uuid) -> ResultEngine<Due> {
        with_tx!(self, |db_tx| Due::try_from(self.require_due(&db_tx, due_id).await?))
    }

    /// List dues ordered by limit date.
    pub async fn dues(&self) -> ResultEngine<Vec<Due>> {
        with_tx!(self, |db_tx| {
            dues::Entity::find()
                .order_by_asc(dues::Column::LimitDate)
                .order_by_asc(dues::Column::Description)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Due::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Declare that holding `right_id` entails owing `due_id`.
    ///
    /// Existing holders of the right are not obligated retroactively.
    pub async fn link(&self, right_id: Uuid, due_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let right = violations.take(self.require_right(&db_tx, right_id).await);
            let due = violations.take(self.require_due(&db_tx, due_id).await);
            if right.is_some() && due.is_some() {
                let exists = find_link(&db_tx, right_id, due_id).await?.is_some();
                violations.check(exists, || {
                    EngineError::DuplicateLink("due is already linked to the right".to_string())
                });
            }
            violations.into_result()?;

            right_dues::ActiveModel {
                right_id: ActiveValue::Set(right_id.to_string()),
                due_id: ActiveValue::Set(due_id.to_string()),
            }
            .insert(&db_tx)
            .await?;
            info!(%right_id, %due_id, "due linked to right");
            Ok(())
        })
    }

    /// Remove a right ↔ due link. Obligations already generated stay.
    pub async fn unlink(&self, right_id: Uuid, due_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let link = find_link(&db_tx, right_id, due_id)
                .await?
                .ok_or_else(|| EngineError::NotFound("link".to_string()))?;
            link.delete(&db_tx).await?;
            info!(%right_id, %due_id, "due unlinked from right");
            Ok(())
        })
    }

    /// Dues entailed by a right.
    pub async fn dues_of_right(&self, right_id: Uuid) -> ResultEngine<Vec<Due>> {
        with_tx!(self, |db_tx| {
            self.require_right(&db_tx, right_id).await?;
            linked_dues(&db_tx, right_id)
                .await?
                .into_iter()
                .map(Due::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    async fn right_name_taken(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query =
            rights::Entity::find().filter(rights::Column::NameNorm.eq(normalize_key(name)));
        if let Some(id) = except {
            query = query.filter(rights::Column::Id.ne(id.to_string()));
        }
        Ok(query.one(db_tx).await?.is_some())
    }

    async fn due_description_taken(
        &self,
        db_tx: &DatabaseTransaction,
        description: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query = dues::Entity::find()
            .filter(dues::Column::DescriptionNorm.eq(normalize_key(description)));
        if let Some(id) = except {
            query = query.filter(dues::Column::Id.ne(id.to_string()));
        }
        Ok(query.one(db_tx).await?.is_some())
    }
}

async fn find_link(
    db_tx: &DatabaseTransaction,
    right_id: Uuid,
    due_id: Uuid,
) -> ResultEngine<Option<right_dues::Model>> {
    Ok(
        right_dues::Entity::find_by_id((right_id.to_string(), due_id.to_string()))
            .one(db_tx)
            .await?,
    )
}

/// Due templates linked to `right_id`.
pub(super) async fn linked_dues(
    db_tx: &DatabaseTransaction,
    right_id: Uuid,
) -> ResultEngine<Vec<dues::Model>> {
    Ok(dues::Entity::find()
        .inner_join(right_dues::Entity)
        .filter(right_dues::Column::RightId.eq(right_id.to_string()))
        .order_by_asc(dues::Column::LimitDate)
        .all(db_tx)
        .await?)
}

/// Largest paid total across the obligations of a due.
async fn largest_paid_on_due(db_tx: &DatabaseTransaction, due_id: Uuid) -> ResultEngine<Money> {
    let due_id = due_id.to_string();
    let members: Vec<String> = obligations::Entity::find()
        .select_only()
        .column(obligations::Column::MemberId)
        .filter(obligations::Column::DueId.eq(due_id.clone()))
        .into_tuple()
        .all(db_tx)
        .await?;
    let mut largest = Money::ZERO;
    for member_id in members {
        let paid: Money = payment_amounts(db_tx, &member_id, &due_id)
            .await?
            .iter()
            .sum();
        largest = largest.max(paid);
    }
    Ok(largest)
}

async fn set_origin(
    db_tx: &DatabaseTransaction,
    member_id: Uuid,
    due_id: Uuid,
    origin: Option<Uuid>,
) -> ResultEngine<()> {
    obligations::ActiveModel {
        member_id: ActiveValue::Unchanged(member_id.to_string()),
        due_id: ActiveValue::Unchanged(due_id.to_string()),
        origin_right_id: ActiveValue::Set(origin.map(|id| id.to_string())),
        ..Default::default()
    }
    .update(db_tx)
    .await?;
    Ok(())
}

/// Rows a removal of `right_id` may touch: every link and assignment (so
/// other entailing rights can be found) and the obligations the right
/// generated.
async fn cascade_index(db_tx: &DatabaseTransaction, right_id: Uuid) -> ResultEngine<CascadeIndex> {
    let mut index = CascadeIndex::new();
    for link in right_dues::Entity::find().all(db_tx).await? {
        index.link(
            parse_uuid(&link.right_id, "right")?,
            parse_uuid(&link.due_id, "due")?,
        );
    }
    for assignment in member_rights::Entity::find().all(db_tx).await? {
        index.assignment(
            parse_uuid(&assignment.member_id, "member")?,
            parse_uuid(&assignment.right_id, "right")?,
        );
    }

    let paid: HashSet<(String, String)> = payments::Entity::find()
        .select_only()
        .column(payments::Column::MemberId)
        .column(payments::Column::DueId)
        .into_tuple::<(String, String)>()
        .all(db_tx)
        .await?
        .into_iter()
        .collect();
    let generated = obligations::Entity::find()
        .filter(obligations::Column::OriginRightId.eq(right_id.to_string()))
        .all(db_tx)
        .await?;
    for obligation in generated {
        let has_payments =
            paid.contains(&(obligation.member_id.clone(), obligation.due_id.clone()));
        index.obligation(ObligationFact {
            member_id: parse_uuid(&obligation.member_id, "member")?,
            due_id: parse_uuid(&obligation.due_id, "due")?,
            origin_right_id: Some(right_id),
            has_payments,
        });
    }
    Ok(index)
}
