use assert_matches::assert_matches;

use auth_cell::services::AccountService;
use auth_cell::{LoginRequest, RegisterRequest};
use reseed_cell::ReseedEngine;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::test_utils::TestDatabase;

async fn service() -> (TestDatabase, AccountService) {
    let db = TestDatabase::fixture().await;
    ReseedEngine::new(&db.state).reset_demo().await.unwrap();
    let service = AccountService::new(&db.state.pool);
    (db, service)
}

fn pharmacist_request() -> RegisterRequest {
    RegisterRequest {
        username: "  priya  ".to_string(),
        password: "compounding".to_string(),
        role: Role::Pharmacist,
        entity_id: Some(1),
    }
}

#[tokio::test]
async fn register_trims_username_and_links_entity() {
    let (_db, service) = service().await;

    let registered = service.register(pharmacist_request()).await.unwrap();
    assert_eq!(registered.username, "priya");
    assert_eq!(registered.entity_id, Some(1));

    let user = service
        .authenticate(&LoginRequest {
            username: "priya".to_string(),
            password: "compounding".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.id, registered.id);
    assert_eq!(user.role, Role::Pharmacist);
    assert_eq!(user.entity_id, Some(1));
}

#[tokio::test]
async fn register_errors_map_to_app_errors() {
    let (_db, service) = service().await;
    service.register(pharmacist_request()).await.unwrap();

    let duplicate = service.register(pharmacist_request()).await.unwrap_err();
    assert_matches!(duplicate, AppError::Conflict(msg) if msg.contains("priya"));

    let missing = service
        .register(RegisterRequest {
            username: "nobody".to_string(),
            password: "compounding".to_string(),
            role: Role::Doctor,
            entity_id: Some(99),
        })
        .await
        .unwrap_err();
    assert_matches!(missing, AppError::NotFound(_));

    let negative = service
        .register(RegisterRequest {
            entity_id: Some(-1),
            ..pharmacist_request()
        })
        .await
        .unwrap_err();
    assert_matches!(negative, AppError::ValidationError(_));
}

#[tokio::test]
async fn accounts_do_not_survive_a_reset() {
    let (db, service) = service().await;
    service.register(pharmacist_request()).await.unwrap();

    ReseedEngine::new(&db.state).reset_demo().await.unwrap();

    let err = service
        .authenticate(&LoginRequest {
            username: "priya".to_string(),
            password: "compounding".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Auth(_));
}

#[tokio::test]
async fn concurrent_logins_are_checked_independently() {
    let (_db, service) = service().await;
    service.register(pharmacist_request()).await.unwrap();

    let login = |password: &str| LoginRequest {
        username: "priya".to_string(),
        password: password.to_string(),
    };
    let (right, wrong) = (login("compounding"), login("not-compounding"));
    let (good, bad, again) = tokio::join!(
        service.authenticate(&right),
        service.authenticate(&wrong),
        service.authenticate(&right),
    );

    assert_eq!(good.unwrap().username, "priya");
    assert_matches!(bad, Err(AppError::Auth(_)));
    assert_eq!(again.unwrap().role, Role::Pharmacist);
}
