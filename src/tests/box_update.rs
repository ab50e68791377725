use axum::http::StatusCode;
use serde_json::Map;
use serde_json::Value;

use crate::tests::helper;

#[tokio::test]
async fn test_claim_and_update() {
    let mut app = helper::setup_test_app().await;

    let key_box = helper::claim_box(&mut app, 1, "abcd").await;
    assert_eq!(1, key_box.box_number);
    assert!(key_box.is_used);
    assert_eq!("", key_box.title);

    // update without a password keeps the current one
    let mut payload = Map::new();
    payload.insert("boxNumber".to_string(), Value::from(1));
    payload.insert("title".to_string(), Value::String("wifi".to_string()));
    payload.insert("content".to_string(), Value::String("hunter2".to_string()));
    payload.insert("isUsed".to_string(), Value::Bool(true));

    let (status_code, key_box, _) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    let key_box = key_box.unwrap();
    assert_eq!("wifi", key_box.title);
    assert_eq!("hunter2", key_box.content);

    let (status_code, _) = helper::maybe_verify_password(&mut app, 1, "abcd").await;
    assert_eq!(StatusCode::OK, status_code);

    // listed with the new values, other boxes untouched
    let listed = helper::single_box(&mut app, 1).await;
    assert_eq!(key_box, listed);

    let other = helper::single_box(&mut app, 2).await;
    assert!(!other.is_used);
}

#[tokio::test]
async fn test_empty_password_keeps_current_one() {
    let mut app = helper::setup_test_app().await;

    helper::claim_box(&mut app, 3, "abcd").await;

    let mut payload = Map::new();
    payload.insert("boxNumber".to_string(), Value::from(3));
    payload.insert("title".to_string(), Value::String("bank".to_string()));
    payload.insert("password".to_string(), Value::String(String::new()));

    let (status_code, key_box, _) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("bank", key_box.unwrap().title);

    let (status_code, _) = helper::maybe_verify_password(&mut app, 3, "abcd").await;
    assert_eq!(StatusCode::OK, status_code);
}

#[tokio::test]
async fn test_update_without_password_keeps_stored_hash() {
    let (mut app, storage) = helper::setup_test_app_with_storage();

    let (status_code, _) = helper::list_boxes(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);

    helper::claim_box(&mut app, 1, "abcd").await;

    let hashed_password = helper::stored_hashed_password(&storage, 1).await;
    assert!(!hashed_password.is_empty());

    // left out, empty and null all keep the hash as is
    for password in [None, Some(Value::String(String::new())), Some(Value::Null)] {
        let mut payload = Map::new();
        payload.insert("boxNumber".to_string(), Value::from(1));
        payload.insert("title".to_string(), Value::String("wifi".to_string()));
        payload.insert("content".to_string(), Value::String("hunter2".to_string()));
        if let Some(password) = password {
            payload.insert("password".to_string(), password);
        }

        let (status_code, key_box, _) = helper::maybe_update_box(&mut app, &payload).await;
        assert_eq!(StatusCode::OK, status_code);
        assert!(key_box.unwrap().is_used);

        assert_eq!(
            hashed_password,
            helper::stored_hashed_password(&storage, 1).await
        );
    }
}

#[tokio::test]
async fn test_change_password() {
    let mut app = helper::setup_test_app().await;

    helper::claim_box(&mut app, 2, "abcd").await;

    let mut payload = Map::new();
    payload.insert("boxNumber".to_string(), Value::from(2));
    payload.insert("password".to_string(), Value::String("efgh".to_string()));

    let (status_code, _, _) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, _) = helper::maybe_verify_password(&mut app, 2, "abcd").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    let (status_code, _) = helper::maybe_verify_password(&mut app, 2, "efgh").await;
    assert_eq!(StatusCode::OK, status_code);
}

#[tokio::test]
async fn test_update_validation() {
    let mut app = helper::setup_test_app().await;

    // unknown box
    let mut payload = Map::new();
    payload.insert("boxNumber".to_string(), Value::from(99));
    payload.insert("password".to_string(), Value::String("abcd".to_string()));

    let (status_code, _, error) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Box not found", error.unwrap().error);

    // claiming needs a password
    let mut payload = Map::new();
    payload.insert("boxNumber".to_string(), Value::from(1));
    payload.insert("title".to_string(), Value::String("wifi".to_string()));

    let (status_code, _, error) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Password required to claim a box", error.unwrap().error);

    // password too short
    payload.insert("password".to_string(), Value::String("abc".to_string()));

    let (status_code, _, error) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        helper::Error {
            error: "Password is too short".to_string(),
            description: Some("At least 4 characters".to_string()),
        },
        error.unwrap()
    );

    // title too long
    payload.insert("password".to_string(), Value::String("abcd".to_string()));
    payload.insert("title".to_string(), Value::String("t".repeat(101)));

    let (status_code, _, error) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Title is too long", error.unwrap().error);

    // releasing is done with a reset
    payload.insert("title".to_string(), Value::String("wifi".to_string()));
    payload.insert("isUsed".to_string(), Value::Bool(false));

    let (status_code, _, error) = helper::maybe_update_box(&mut app, &payload).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Use a reset to release a box", error.unwrap().error);

    // nothing was stored along the way
    let key_box = helper::single_box(&mut app, 1).await;
    assert!(!key_box.is_used);
    assert_eq!("", key_box.title);
}
