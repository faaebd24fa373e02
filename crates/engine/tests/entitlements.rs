mod common;

use engine::{AssignRightCmd, EngineError, ErrorKind, ObligationStatus, PaymentCmd};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use common::{date, due, engine_with_db, member, resident_with_maintenance};

#[tokio::test]
async fn assigning_a_right_obligates_its_dues() {
    let (engine, _db) = engine_with_db().await;
    let (resident, maintenance) = resident_with_maintenance(&engine).await;
    let ana = member(&engine, 1, "Ana").await;

    let assignment = engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-01-01"))
        .await
        .unwrap();
    assert_eq!(assignment.created, vec![maintenance.id]);
    assert!(assignment.skipped.is_empty());
    assert_eq!(assignment.assignment.start_date, date("2025-01-01"));
    assert_eq!(assignment.assignment.end_date, None);

    let owed = engine.obligations_of_member(ana.id).await.unwrap();
    assert_eq!(owed.len(), 1);
    assert_eq!(owed[0].due_id, maintenance.id);
    assert_eq!(owed[0].assigned_on, date("2025-01-01"));
    assert_eq!(owed[0].status, ObligationStatus::Pending);
    assert_eq!(owed[0].origin_right_id, Some(resident.id));
}

#[tokio::test]
async fn fan_out_never_duplicates_obligations() {
    let (engine, _db) = engine_with_db().await;
    let (resident, maintenance) = resident_with_maintenance(&engine).await;
    let owner = engine.create_right("Owner").await.unwrap();
    engine.link(owner.id, maintenance.id).await.unwrap();
    let ana = member(&engine, 1, "Ana").await;

    engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-01-01"))
        .await
        .unwrap();
    let err = engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-03-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);

    let overlapping = engine
        .assign_right(AssignRightCmd::new(ana.id, owner.id, "2025-02-01"))
        .await
        .unwrap();
    assert!(overlapping.created.is_empty());
    assert_eq!(overlapping.skipped, vec![maintenance.id]);

    let owed = engine.obligations_of_member(ana.id).await.unwrap();
    assert_eq!(owed.len(), 1);
    assert_eq!(owed[0].assigned_on, date("2025-01-01"));
    assert_eq!(engine.assignments_of_member(ana.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn assignment_range_is_validated() {
    let (engine, _db) = engine_with_db().await;
    let (resident, _) = resident_with_maintenance(&engine).await;
    let ana = member(&engine, 1, "Ana").await;

    let err = engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-02-01").end_date("2025-01-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert!(engine.obligations_of_member(ana.id).await.unwrap().is_empty());

    engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-01-01").end_date("2025-01-01"))
        .await
        .unwrap();
    let updated = engine
        .update_assignment(
            AssignRightCmd::new(ana.id, resident.id, "2025-01-01").end_date("2025-12-31"),
        )
        .await
        .unwrap();
    assert_eq!(updated.end_date, Some(date("2025-12-31")));

    let err = engine
        .update_assignment(
            AssignRightCmd::new(ana.id, resident.id, "2026-01-01").end_date("2025-12-31"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
}

#[tokio::test]
async fn missing_member_and_right_are_both_reported() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .assign_right(AssignRightCmd::new(Uuid::new_v4(), Uuid::new_v4(), "2025-01-01"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Rejected(vec![
            EngineError::NotFound("member".to_string()),
            EngineError::NotFound("right".to_string()),
        ])
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn revoked_right_leaves_standing_debt() {
    let (engine, _db) = engine_with_db().await;
    let (resident, maintenance) = resident_with_maintenance(&engine).await;
    let water = due(&engine, "Water", "15.00").await;
    engine.link(resident.id, water.id).await.unwrap();
    let ana = member(&engine, 1, "Ana").await;

    engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-01-01"))
        .await
        .unwrap();
    engine
        .record_payment(PaymentCmd::new(ana.id, water.id, "2025-01-05", "15.00"))
        .await
        .unwrap();

    let outstanding = engine.revoke_right(ana.id, resident.id).await.unwrap();
    assert_eq!(outstanding.len(), 1);
    assert_eq!(outstanding[0].due_id, maintenance.id);

    assert!(engine.assignments_of_member(ana.id).await.unwrap().is_empty());
    assert_eq!(engine.obligations_of_member(ana.id).await.unwrap().len(), 2);

    let err = engine.revoke_right(ana.id, resident.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn dues_can_be_assigned_directly() {
    let (engine, _db) = engine_with_db().await;
    let fine = due(&engine, "Late fee", "5.00").await;
    let ana = member(&engine, 1, "Ana").await;

    let obligation = engine.assign_due(ana.id, fine.id, "2025-04-01").await.unwrap();
    assert_eq!(obligation.origin_right_id, None);
    assert_eq!(obligation.status, ObligationStatus::Pending);

    let err = engine.assign_due(ana.id, fine.id, "2025-04-02").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);

    let err = engine.assign_due(ana.id, Uuid::new_v4(), "2025-04-02").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine.assign_due(ana.id, fine.id, "April").await.unwrap_err();
    assert!(err.contains(ErrorKind::InvalidField));
}

#[tokio::test]
async fn failed_fan_out_leaves_nothing_behind() {
    let (engine, db) = engine_with_db().await;
    let (resident, _) = resident_with_maintenance(&engine).await;
    let water = due(&engine, "Water", "15.00").await;
    engine.link(resident.id, water.id).await.unwrap();
    let ana = member(&engine, 1, "Ana").await;

    // The second obligation of a member aborts the statement.
    db.execute_unprepared(
        "CREATE TRIGGER fail_second_obligation BEFORE INSERT ON due_obligations \
         WHEN (SELECT COUNT(*) FROM due_obligations WHERE member_id = NEW.member_id) >= 1 \
         BEGIN SELECT RAISE(ABORT, 'boom'); END",
    )
    .await
    .unwrap();

    let err = engine
        .assign_right(AssignRightCmd::new(ana.id, resident.id, "2025-01-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);

    assert!(engine.obligations_of_member(ana.id).await.unwrap().is_empty());
    assert!(engine.assignments_of_member(ana.id).await.unwrap().is_empty());
}
