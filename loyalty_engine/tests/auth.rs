mod support;

use loyalty_engine::{traits::AuthApiError, AuthApi};
use support::{prepare_test_env, random_db_url};

#[tokio::test]
async fn register_and_verify_round_trip() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = AuthApi::new(db.clone());

    let alice = api.register("alice", "hunter2").await.unwrap();
    assert_eq!(alice.login, "alice");
    // The stored credential is a salted hash, never the password itself.
    assert_ne!(alice.password_hash, "hunter2");

    let verified = api.verify("alice", "hunter2").await.unwrap();
    assert_eq!(verified.id, alice.id);
    assert_eq!(api.user_by_id(alice.id).await.unwrap().unwrap().login, "alice");
}

#[tokio::test]
async fn duplicate_logins_are_rejected() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = AuthApi::new(db.clone());

    api.register("alice", "hunter2").await.unwrap();
    let err = api.register("alice", "something-else").await.unwrap_err();
    assert!(matches!(err, AuthApiError::LoginTaken));
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let db = prepare_test_env(&random_db_url()).await;
    let api = AuthApi::new(db.clone());
    api.register("alice", "hunter2").await.unwrap();

    let wrong_password = api.verify("alice", "hunter3").await.unwrap_err();
    let unknown_login = api.verify("mallory", "hunter2").await.unwrap_err();
    assert!(matches!(wrong_password, AuthApiError::InvalidCredentials));
    assert!(matches!(unknown_login, AuthApiError::InvalidCredentials));
}
