use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_verify_password() {
    let mut app = helper::setup_test_app().await;

    helper::claim_box(&mut app, 4, "abcd").await;

    let (status_code, error) = helper::maybe_verify_password(&mut app, 4, "abcd").await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(error.is_none());

    let (status_code, error) = helper::maybe_verify_password(&mut app, 4, "abce").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!("Invalid password", error.unwrap().error);
}

#[tokio::test]
async fn test_verify_unused_box() {
    let mut app = helper::setup_test_app().await;

    // an unused box has no password, not even an empty one
    let (status_code, error) = helper::maybe_verify_password(&mut app, 1, "").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!("Invalid password", error.unwrap().error);

    let (status_code, _) = helper::maybe_verify_password(&mut app, 1, "abcd").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}

#[tokio::test]
async fn test_verify_unknown_box() {
    let mut app = helper::setup_test_app().await;

    let (status_code, error) = helper::maybe_verify_password(&mut app, 42, "abcd").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Box not found", error.unwrap().error);
}
