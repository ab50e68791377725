use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_reset_box() {
    let mut app = helper::setup_test_app().await;

    let claimed = helper::claim_box(&mut app, 5, "abcd").await;

    let (status_code, key_box, _) = helper::maybe_reset_box(&mut app, "boxNumber=5").await;
    assert_eq!(StatusCode::OK, status_code);
    let key_box = key_box.unwrap();
    assert_eq!(claimed.id, key_box.id);
    assert!(!key_box.is_used);
    assert_eq!("", key_box.title);
    assert_eq!("", key_box.content);

    // the old password is gone
    let (status_code, _) = helper::maybe_verify_password(&mut app, 5, "abcd").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    // resetting an unused box is fine
    let (status_code, _, _) = helper::maybe_reset_box(&mut app, "boxNumber=5").await;
    assert_eq!(StatusCode::OK, status_code);

    // and it can be claimed again
    let key_box = helper::claim_box(&mut app, 5, "efgh").await;
    assert!(key_box.is_used);
}

#[tokio::test]
async fn test_reset_invalid_box() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) = helper::maybe_reset_box(&mut app, "boxNumber=6").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Box not found", error.unwrap().error);

    let (status_code, _, error) = helper::maybe_reset_box(&mut app, "").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid query parameter", error.unwrap().error);

    let (status_code, _, error) = helper::maybe_reset_box(&mut app, "boxNumber=one").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid query parameter", error.unwrap().error);

    let (status_code, boxes) = helper::list_boxes(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(5, boxes.unwrap().len());
}
