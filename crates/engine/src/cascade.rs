//! Planning of the right-removal cascade.
//!
//! Deleting a right removes its due links, every assignment of the right and
//! the obligations those assignments generated. The plan is computed here
//! over in-memory indices and applied by
//! [`Engine::delete_right`](crate::Engine::delete_right) in a single DB
//! transaction, children first.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

/// A generated obligation as seen by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObligationFact {
    pub member_id: Uuid,
    pub due_id: Uuid,
    /// Right whose assignment generated the obligation, `None` if assigned
    /// manually.
    pub origin_right_id: Option<Uuid>,
    pub has_payments: bool,
}

/// In-memory view of the rows a right removal may touch.
#[derive(Debug, Default)]
pub struct CascadeIndex {
    dues_by_right: BTreeMap<Uuid, BTreeSet<Uuid>>,
    rights_by_member: BTreeMap<Uuid, BTreeSet<Uuid>>,
    obligations: Vec<ObligationFact>,
}

impl CascadeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&mut self, right_id: Uuid, due_id: Uuid) -> &mut Self {
        self.dues_by_right.entry(right_id).or_default().insert(due_id);
        self
    }

    pub fn assignment(&mut self, member_id: Uuid, right_id: Uuid) -> &mut Self {
        self.rights_by_member
            .entry(member_id)
            .or_default()
            .insert(right_id);
        self
    }

    pub fn obligation(&mut self, fact: ObligationFact) -> &mut Self {
        self.obligations.push(fact);
        self
    }

    fn members_of(&self, right_id: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.rights_by_member
            .iter()
            .filter(move |(_, rights)| rights.contains(&right_id))
            .map(|(member_id, _)| *member_id)
    }

    /// Another right still held by `member_id` that entails `due_id`.
    fn other_entailing_right(&self, member_id: Uuid, due_id: Uuid, removed: Uuid) -> Option<Uuid> {
        self.rights_by_member
            .get(&member_id)?
            .iter()
            .copied()
            .filter(|right_id| *right_id != removed)
            .find(|right_id| {
                self.dues_by_right
                    .get(right_id)
                    .is_some_and(|dues| dues.contains(&due_id))
            })
    }
}

/// Rows to delete or re-attribute when a right is removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RightRemovalPlan {
    pub right_id: Uuid,
    /// `(right, due)` links to delete.
    pub links: Vec<(Uuid, Uuid)>,
    /// `(member, right)` assignments to delete.
    pub assignments: Vec<(Uuid, Uuid)>,
    /// `(member, due)` unpaid obligations to delete.
    pub obligations: Vec<(Uuid, Uuid)>,
    /// `(member, due, right)` obligations still entailed by another held
    /// right; their origin moves to that right.
    pub reattributed: Vec<(Uuid, Uuid, Uuid)>,
    /// `(member, due)` obligations kept because they already have payments.
    pub kept_with_payments: Vec<(Uuid, Uuid)>,
}

/// Computes the cascade for removing `right_id`.
pub fn plan_right_removal(right_id: Uuid, index: &CascadeIndex) -> RightRemovalPlan {
    let links = index
        .dues_by_right
        .get(&right_id)
        .map(|dues| dues.iter().map(|due_id| (right_id, *due_id)).collect())
        .unwrap_or_default();

    let assignments = index
        .members_of(right_id)
        .map(|member_id| (member_id, right_id))
        .collect();

    let mut plan = RightRemovalPlan {
        right_id,
        links,
        assignments,
        ..Default::default()
    };

    for fact in index
        .obligations
        .iter()
        .filter(|f| f.origin_right_id == Some(right_id))
    {
        let key = (fact.member_id, fact.due_id);
        if let Some(other) = index.other_entailing_right(fact.member_id, fact.due_id, right_id) {
            plan.reattributed.push((fact.member_id, fact.due_id, other));
        } else if fact.has_payments {
            plan.kept_with_payments.push(key);
        } else {
            plan.obligations.push(key);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<const N: usize>() -> [Uuid; N] {
        std::array::from_fn(|_| Uuid::new_v4())
    }

    fn generated(member_id: Uuid, due_id: Uuid, right_id: Uuid, has_payments: bool) -> ObligationFact {
        ObligationFact {
            member_id,
            due_id,
            origin_right_id: Some(right_id),
            has_payments,
        }
    }

    #[test]
    fn removes_links_assignments_and_unpaid_obligations() {
        let [right, due, member] = ids();
        let mut index = CascadeIndex::new();
        index
            .link(right, due)
            .assignment(member, right)
            .obligation(generated(member, due, right, false));

        let plan = plan_right_removal(right, &index);
        assert_eq!(plan.links, vec![(right, due)]);
        assert_eq!(plan.assignments, vec![(member, right)]);
        assert_eq!(plan.obligations, vec![(member, due)]);
        assert!(plan.kept_with_payments.is_empty());
    }

    #[test]
    fn keeps_obligations_with_payments() {
        let [right, due, member] = ids();
        let mut index = CascadeIndex::new();
        index
            .link(right, due)
            .assignment(member, right)
            .obligation(generated(member, due, right, true));

        let plan = plan_right_removal(right, &index);
        assert!(plan.obligations.is_empty());
        assert_eq!(plan.kept_with_payments, vec![(member, due)]);
    }

    #[test]
    fn reattributes_obligation_entailed_by_another_right() {
        let [right, other, due, member] = ids();
        let mut index = CascadeIndex::new();
        index
            .link(right, due)
            .link(other, due)
            .assignment(member, right)
            .assignment(member, other)
            .obligation(generated(member, due, right, false));

        let plan = plan_right_removal(right, &index);
        assert!(plan.obligations.is_empty());
        assert_eq!(plan.reattributed, vec![(member, due, other)]);
        assert_eq!(plan.assignments, vec![(member, right)]);
    }

    #[test]
    fn leaves_manual_and_foreign_obligations_alone() {
        let [right, other, due, member] = ids();
        let mut index = CascadeIndex::new();
        index
            .link(right, due)
            .assignment(member, right)
            .obligation(ObligationFact {
                member_id: member,
                due_id: due,
                origin_right_id: None,
                has_payments: false,
            })
            .obligation(generated(member, due, other, false));

        let plan = plan_right_removal(right, &index);
        assert!(plan.obligations.is_empty());
        assert!(plan.reattributed.is_empty());
    }
}
