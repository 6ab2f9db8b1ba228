//! Inventory ledger tests
//!
//! These run against a database file with a multi-connection pool so that
//! concurrent transactions really compete for the write lock.

use std::sync::Arc;

use tempfile::TempDir;

use lab_inventory_server::{
    config::{AppConfig, DatabaseConfig},
    models::{
        equipment::{CreateEquipment, EquipmentStatus},
        issue::CreateIssue,
    },
    repository,
    services::Services,
    AppError, AppState,
};

async fn file_backed_services(dir: &TempDir) -> Arc<Services> {
    let mut config = AppConfig::default();
    config.database = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("inventory.db").display()),
        max_connections: 8,
        min_connections: 1,
        busy_timeout_ms: 30_000,
    };
    config.auth.password_hash_memory_kib = 1024;
    config.auth.password_hash_iterations = 1;

    let pool = repository::connect(&config.database)
        .await
        .expect("Failed to open database file");
    repository::migrate(&pool).await.expect("Failed to run migrations");

    AppState::new(config, pool)
        .expect("Failed to build state")
        .services
}

fn equipment(code: &str, total_qty: i64) -> CreateEquipment {
    CreateEquipment {
        name: "Breadboard".to_string(),
        code: code.to_string(),
        category: None,
        lab: None,
        total_qty,
        available_qty: None,
        status: EquipmentStatus::Available,
    }
}

fn issue(equipment_id: i64, borrower: usize) -> CreateIssue {
    CreateIssue {
        equipment_id,
        issued_to: format!("Student {}", borrower),
        issued_lab: "Electronics Lab".to_string(),
        quantity: 1,
        issue_date: None,
        return_date: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_all_succeed() {
    let dir = TempDir::new().unwrap();
    let services = file_backed_services(&dir).await;
    let item = services.equipment.upsert_by_code(equipment("BB1", 200)).await.unwrap();
    let equipment_id = item.id;

    let handles: Vec<_> = (0..100)
        .map(|n| {
            let services = services.clone();
            tokio::spawn(async move { services.issues.reserve(issue(equipment_id, n)).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "reservation failed: {:?}", result.err());
    }

    let item = services.equipment.get(item.id).await.unwrap();
    assert_eq!(item.available_qty, 100);
    assert_eq!(services.issues.list().await.unwrap().len(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_never_oversell() {
    let dir = TempDir::new().unwrap();
    let services = file_backed_services(&dir).await;
    let item = services.equipment.upsert_by_code(equipment("BB2", 10)).await.unwrap();
    let equipment_id = item.id;

    let handles: Vec<_> = (0..40)
        .map(|n| {
            let services = services.clone();
            tokio::spawn(async move { services.issues.reserve(issue(equipment_id, n)).await })
        })
        .collect();

    let (mut reserved, mut refused) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => reserved += 1,
            Err(AppError::InsufficientStock { requested: 1, .. }) => refused += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(reserved, 10);
    assert_eq!(refused, 30);
    assert_eq!(services.equipment.get(item.id).await.unwrap().available_qty, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_returns_and_deletes_release_stock() {
    let dir = TempDir::new().unwrap();
    let services = file_backed_services(&dir).await;
    let item = services.equipment.upsert_by_code(equipment("BB3", 20)).await.unwrap();

    let mut ids = Vec::new();
    for n in 0..20 {
        ids.push(services.issues.reserve(issue(item.id, n)).await.unwrap().id);
    }
    assert_eq!(services.equipment.get(item.id).await.unwrap().available_qty, 0);

    let handles: Vec<_> = ids
        .into_iter()
        .enumerate()
        .map(|(n, id)| {
            let services = services.clone();
            tokio::spawn(async move {
                if n % 2 == 0 {
                    services.issues.return_issue(id, None).await.map(|_| ())
                } else {
                    services.issues.delete(id).await
                }
            })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "release failed: {:?}", result.err());
    }

    assert_eq!(services.equipment.get(item.id).await.unwrap().available_qty, 20);
    assert_eq!(services.issues.list().await.unwrap().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_merge_into_one_record() {
    let dir = TempDir::new().unwrap();
    let services = file_backed_services(&dir).await;

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let services = services.clone();
            tokio::spawn(async move { services.equipment.upsert_by_code(equipment("R100", 5)).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "upsert failed: {:?}", result.err());
    }

    let items = services.equipment.list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total_qty, 100);
    assert_eq!(items[0].available_qty, 100);
}

#[tokio::test]
async fn test_merge_past_quantity_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let services = file_backed_services(&dir).await;
    let item = services
        .equipment
        .upsert_by_code(equipment("R100", i64::MAX))
        .await
        .unwrap();

    let result = services.equipment.upsert_by_code(equipment("R100", 1)).await;
    assert!(matches!(result, Err(AppError::Validation(_))), "{:?}", result);

    let item = services.equipment.get(item.id).await.unwrap();
    assert_eq!(item.total_qty, i64::MAX);
    assert_eq!(item.available_qty, i64::MAX);
}
