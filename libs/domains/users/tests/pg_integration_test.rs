//! PostgreSQL repository integration tests
//!
//! Each test spins up its own Postgres container with migrations applied.
//! Run with `cargo test -- --ignored` on a machine with Docker available.

use domain_users::{
    CreateUser, PgUserRepository, UpdateUser, UserError, UserRepository, UserService,
};
use test_utils::{TestDataBuilder, TestDatabase};

fn input(name: &str, email: &str, age: i32) -> CreateUser {
    CreateUser {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        age: Some(age),
    }
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_create_and_fetch_roundtrip() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_create_and_fetch_roundtrip");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let email = builder.email("main");
    let created = service.create_user(input("John Doe", &email, 25)).await.unwrap();

    let by_id = service.get_user(created.id).await.unwrap();
    assert_eq!(by_id, created);

    let by_email = service.get_user_by_email(&email).await.unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_unique_index_rejects_duplicate_email() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_unique_index_rejects_duplicate_email");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let email = builder.email("dup");
    service.create_user(input("First", &email, 20)).await.unwrap();

    let result = service.create_user(input("Second", &email, 40)).await;
    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

    assert_eq!(service.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_concurrent_creates_admit_exactly_one() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_concurrent_creates_admit_exactly_one");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let email = builder.email("race");
    let attempts = (0..4).map(|i| {
        let service = service.clone();
        let email = email.clone();
        async move { service.create_user(input(&format!("Racer {i}"), &email, 30)).await }
    });

    let results = futures::future::join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(UserError::DuplicateEmail(_))))
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_partial_update_persists_merged_record() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_partial_update_persists_merged_record");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let email = builder.email("main");
    let created = service.create_user(input("Ann", &email, 30)).await.unwrap();

    let updated = service
        .update_user(
            created.id,
            UpdateUser {
                age: Some(31),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.age, 31);
    assert_eq!(updated.email, email);
    assert_eq!(updated.created_at, created.created_at);

    // The merge survived the round trip to storage
    let reloaded = service.get_user(created.id).await.unwrap();
    assert_eq!(reloaded, updated);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_update_to_taken_email_rolls_back() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_update_to_taken_email_rolls_back");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let first_email = builder.email("first");
    let second_email = builder.email("second");
    service.create_user(input("First", &first_email, 20)).await.unwrap();
    let second = service.create_user(input("Second", &second_email, 40)).await.unwrap();

    let result = service
        .update_user(
            second.id,
            UpdateUser {
                email: Some(first_email),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    assert_eq!(service.get_user(second.id).await.unwrap().email, second_email);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_delete_removes_row_and_frees_email() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_delete_removes_row_and_frees_email");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let email = builder.email("main");
    let created = service.create_user(input("Ann", &email, 30)).await.unwrap();

    service.delete_user(created.id).await.unwrap();

    assert!(matches!(
        service.get_user(created.id).await,
        Err(UserError::NotFound(_))
    ));

    let recreated = service.create_user(input("Ann", &email, 30)).await.unwrap();
    assert_ne!(recreated.id, created.id);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_list_orders_by_creation_time() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_list_orders_by_creation_time");
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let first = service
        .create_user(input("First", &builder.email("a"), 20))
        .await
        .unwrap();
    let second = service
        .create_user(input("Second", &builder.email("b"), 30))
        .await
        .unwrap();

    let all = service.list_users().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first.id);
    assert_eq!(all[1].id, second.id);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_email_exists_excludes_own_record() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("test_email_exists_excludes_own_record");
    let repo = PgUserRepository::new(db.connection());
    let service = UserService::new(PgUserRepository::new(db.connection()));

    let email = builder.email("main");
    let created = service.create_user(input("Ann", &email, 30)).await.unwrap();

    assert!(repo.email_exists(&email, None).await.unwrap());
    assert!(!repo.email_exists(&email, Some(created.id)).await.unwrap());
}
