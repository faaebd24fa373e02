mod common;

use engine::{
    AssignRightCmd, DueNew, DueUpdate, EngineError, ErrorKind, ObligationStatus, PaymentCmd,
};
use uuid::Uuid;

use common::{date, due, engine_with_db, member, q, resident_with_maintenance};

#[tokio::test]
async fn right_names_are_unique_ignoring_case_and_accents() {
    let (engine, _db) = engine_with_db().await;

    let right = engine.create_right("Agua Potable").await.unwrap();
    let err = engine.create_right("  agua   potáble ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);

    let other = engine.create_right("Drenaje").await.unwrap();
    let err = engine.rename_right(other.id, "AGUA POTABLE").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);

    let renamed = engine.rename_right(right.id, "Agua potable").await.unwrap();
    assert_eq!(renamed.name, "Agua potable");
    assert_eq!(engine.rights().await.unwrap().len(), 2);
}

#[tokio::test]
async fn due_creation_reports_every_violation() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_due(DueNew::new(" ", "0", "31/12/2025"))
        .await
        .unwrap_err();
    assert!(err.contains(ErrorKind::MissingField));
    assert!(err.contains(ErrorKind::InvalidAmount));
    assert!(err.contains(ErrorKind::InvalidField));
    assert_eq!(err.messages().len(), 3);

    let due = engine
        .create_due(DueNew::new("Maintenance", "50", "2025-12-31"))
        .await
        .unwrap();
    assert_eq!(due.amount, q("50.00"));
    assert_eq!(due.limit_date, date("2025-12-31"));

    let err = engine
        .create_due(DueNew::new("maintenance", "10", "2025-12-31"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
}

#[tokio::test]
async fn link_checks_both_sides_and_duplicates() {
    let (engine, _db) = engine_with_db().await;
    let (right, due) = resident_with_maintenance(&engine).await;

    let err = engine.link(right.id, due.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateLink);

    let err = engine.link(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Rejected(vec![
            EngineError::NotFound("right".to_string()),
            EngineError::NotFound("due".to_string()),
        ])
    );

    assert_eq!(engine.dues_of_right(right.id).await.unwrap(), vec![due.clone()]);
    engine.unlink(right.id, due.id).await.unwrap();
    assert!(engine.dues_of_right(right.id).await.unwrap().is_empty());

    let err = engine.unlink(right.id, due.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn due_amount_cannot_drop_below_paid_total() {
    let (engine, _db) = engine_with_db().await;
    let (right, due) = resident_with_maintenance(&engine).await;
    let ana = member(&engine, 1, "Ana").await;
    engine
        .assign_right(AssignRightCmd::new(ana.id, right.id, "2025-01-01"))
        .await
        .unwrap();
    engine
        .record_payment(PaymentCmd::new(ana.id, due.id, "2025-02-01", "50.00"))
        .await
        .unwrap();

    let err = engine
        .update_due(due.id, DueUpdate::new().amount("40.00"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);

    // Raising the amount reopens the settled obligation.
    engine
        .update_due(due.id, DueUpdate::new().amount("60.00"))
        .await
        .unwrap();
    let balance = engine.obligation_status(ana.id, due.id).await.unwrap();
    assert_eq!(balance.status, ObligationStatus::Pending);
    assert_eq!(balance.amount_remaining, q("10.00"));
    let cached = engine.obligations_of_member(ana.id).await.unwrap();
    assert_eq!(cached[0].status, ObligationStatus::Pending);
}

#[tokio::test]
async fn due_in_use_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let (right, maintenance) = resident_with_maintenance(&engine).await;
    let ana = member(&engine, 1, "Ana").await;
    engine
        .assign_right(AssignRightCmd::new(ana.id, right.id, "2025-01-01"))
        .await
        .unwrap();

    let err = engine.delete_due(maintenance.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InUse);

    let water = due(&engine, "Water", "15.00").await;
    engine.link(right.id, water.id).await.unwrap();
    engine.delete_due(water.id).await.unwrap();
    assert_eq!(engine.dues_of_right(right.id).await.unwrap(), vec![maintenance]);
    assert_eq!(
        engine.due(water.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn disabled_right_cannot_be_assigned() {
    let (engine, _db) = engine_with_db().await;
    let (right, _) = resident_with_maintenance(&engine).await;
    let ana = member(&engine, 1, "Ana").await;

    let right = engine.set_right_active(right.id, false).await.unwrap();
    assert!(!right.active);
    let err = engine
        .assign_right(AssignRightCmd::new(ana.id, right.id, "2025-01-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inactive);

    engine.set_right_active(right.id, true).await.unwrap();
    engine
        .assign_right(AssignRightCmd::new(ana.id, right.id, "2025-01-01"))
        .await
        .unwrap();
}

#[tokio::test]
async fn deleting_a_right_cascades_explicitly() {
    let (engine, _db) = engine_with_db().await;
    let (resident, maintenance) = resident_with_maintenance(&engine).await;
    let water = due(&engine, "Water", "15.00").await;
    engine.link(resident.id, water.id).await.unwrap();

    let owner = engine.create_right("Owner").await.unwrap();
    engine.link(owner.id, maintenance.id).await.unwrap();

    let ana = member(&engine, 1, "Ana").await;
    let luis = member(&engine, 2, "Luis").await;
    engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-01-01"))
        .await
        .unwrap();
    engine
        .assign_right(AssignRightCmd::new(luis.id, resident.id, "2025-01-01"))
        .await
        .unwrap();
    // Luis already owes maintenance through Resident: Owner only adds the
    // assignment.
    let owner_assignment = engine
        .assign_right(AssignRightCmd::new(luis.id, owner.id, "2025-01-01"))
        .await
        .unwrap();
    assert_eq!(owner_assignment.skipped, vec![maintenance.id]);

    engine
        .record_payment(PaymentCmd::new(ana.id, water.id, "2025-01-10", "5.00"))
        .await
        .unwrap();

    let removal = engine.delete_right(resident.id).await.unwrap();
    assert_eq!(removal.links_removed, 2);
    assert_eq!(removal.assignments_removed, 2);
    // Ana: maintenance (unpaid). Luis: water (unpaid).
    assert_eq!(removal.obligations_removed, 2);
    // Luis: maintenance, still entailed by Owner.
    assert_eq!(removal.obligations_reattributed, 1);
    // Ana: water, partially paid.
    assert_eq!(removal.obligations_kept, 1);

    let ana_owes = engine.obligations_of_member(ana.id).await.unwrap();
    assert_eq!(ana_owes.len(), 1);
    assert_eq!(ana_owes[0].due_id, water.id);
    assert_eq!(ana_owes[0].origin_right_id, None);

    let luis_owes = engine.obligations_of_member(luis.id).await.unwrap();
    assert_eq!(luis_owes.len(), 1);
    assert_eq!(luis_owes[0].due_id, maintenance.id);
    assert_eq!(luis_owes[0].origin_right_id, Some(owner.id));

    assert!(engine.assignments_of_member(ana.id).await.unwrap().is_empty());
    assert_eq!(engine.right(resident.id).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(engine.payments().await.unwrap().len(), 1);
}
