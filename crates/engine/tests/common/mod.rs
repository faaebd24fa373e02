#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{DueNew, Engine, IncomeCmd, Member, MemberNew, Money, Right, Due};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db, path)
}

pub fn q(value: &str) -> Money {
    value.parse().unwrap()
}

pub fn date(value: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Registers a member with a national id derived from `n`.
pub async fn member(engine: &Engine, n: u32, name: &str) -> Member {
    engine
        .register_member(MemberNew::new(format!("{:013}", 1_000_000_000_000u64 + u64::from(n)), name))
        .await
        .unwrap()
}

pub async fn due(engine: &Engine, description: &str, amount: &str) -> Due {
    engine
        .create_due(DueNew::new(description, amount, "2025-12-31"))
        .await
        .unwrap()
}

/// Right "Resident" entailing due "Maintenance" of Q50.00.
pub async fn resident_with_maintenance(engine: &Engine) -> (Right, Due) {
    let right = engine.create_right("Resident").await.unwrap();
    let due = due(engine, "Maintenance", "50.00").await;
    engine.link(right.id, due.id).await.unwrap();
    (right, due)
}

pub async fn fund(engine: &Engine, amount: &str) {
    engine
        .record_income(IncomeCmd::new("2025-01-01", amount, "donation"))
        .await
        .unwrap();
}
