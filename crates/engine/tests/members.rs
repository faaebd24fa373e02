mod common;

use engine::{AssignRightCmd, EngineError, ErrorKind, MemberNew, MemberStatus, MemberUpdate, Role};

use common::{engine_with_db, member};

#[tokio::test]
async fn register_normalizes_fields() {
    let (engine, _db) = engine_with_db().await;

    let ana = engine
        .register_member(
            MemberNew::new(" 1234567890123 ", "  Ana   López ")
                .email("ana@example.org")
                .phone("55512345")
                .role("treasurer"),
        )
        .await
        .unwrap();

    assert_eq!(ana.national_id, "1234567890123");
    assert_eq!(ana.name, "Ana López");
    assert_eq!(ana.role, Some(Role::Treasurer));
    assert_eq!(ana.status, MemberStatus::Active);
    assert_eq!(engine.member(ana.id).await.unwrap(), ana);
}

#[tokio::test]
async fn register_reports_every_violation() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .register_member(
            MemberNew::new("123", " ")
                .email("nope")
                .phone("12")
                .role("king"),
        )
        .await
        .unwrap_err();

    let EngineError::Rejected(errors) = &err else {
        panic!("expected several violations, got {err:?}");
    };
    assert_eq!(errors.len(), 5);
    assert!(err.contains(ErrorKind::InvalidField));
    assert!(err.contains(ErrorKind::MissingField));
    assert!(engine.members().await.unwrap().is_empty());
}

#[tokio::test]
async fn national_id_is_unique() {
    let (engine, _db) = engine_with_db().await;

    engine
        .register_member(MemberNew::new("1234567890123", "Ana"))
        .await
        .unwrap();
    let err = engine
        .register_member(MemberNew::new("1234567890123", "Luis"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
}

#[tokio::test]
async fn roles_are_held_by_one_member() {
    let (engine, _db) = engine_with_db().await;

    let ana = engine
        .register_member(MemberNew::new("1234567890123", "Ana").role("president"))
        .await
        .unwrap();
    let luis = member(&engine, 2, "Luis").await;

    let err = engine
        .update_member(luis.id, MemberUpdate::new().role("president"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);

    // Keeping one's own role is not a conflict.
    engine
        .update_member(ana.id, MemberUpdate::new().role("president").name("Ana María"))
        .await
        .unwrap();

    engine.deactivate_member(ana.id).await.unwrap();
    let luis = engine
        .update_member(luis.id, MemberUpdate::new().role("president"))
        .await
        .unwrap();
    assert_eq!(luis.role, Some(Role::President));
}

#[tokio::test]
async fn update_clears_optional_fields_with_blank() {
    let (engine, _db) = engine_with_db().await;

    let ana = engine
        .register_member(MemberNew::new("1234567890123", "Ana").phone("55512345"))
        .await
        .unwrap();
    let ana = engine
        .update_member(ana.id, MemberUpdate::new().phone("").address("Zona 1"))
        .await
        .unwrap();
    assert_eq!(ana.phone, None);
    assert_eq!(ana.address.as_deref(), Some("Zona 1"));

    let err = engine
        .update_member(ana.id, MemberUpdate::new().email("ana"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);
    assert_eq!(engine.member(ana.id).await.unwrap().email, None);
}

#[tokio::test]
async fn deactivation_keeps_the_record() {
    let (engine, _db) = engine_with_db().await;

    let ana = engine
        .register_member(MemberNew::new("1234567890123", "Ana").role("secretary"))
        .await
        .unwrap();
    let ana = engine.deactivate_member(ana.id).await.unwrap();
    assert_eq!(ana.status, MemberStatus::Inactive);
    assert_eq!(ana.role, None);
    assert_eq!(engine.members().await.unwrap(), vec![ana.clone()]);

    let right = engine.create_right("Resident").await.unwrap();
    let err = engine
        .assign_right(AssignRightCmd::new(ana.id, right.id, "2025-01-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inactive);
}

#[tokio::test]
async fn unknown_member_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.member(uuid::Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("member".to_string()));
}
