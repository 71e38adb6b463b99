use std::collections::HashSet;

use jiff::{Timestamp, ToSpan};

use redis_lite::key_value_store::{DataType, Value};

use crate::test_utils::{command, error_response, TestEnv};

#[tokio::test]
async fn test_get_missing_key() {
    let env = TestEnv::new_master_server();

    let response = env.dispatch_single(command(&["GET", "grape"])).await;

    assert_eq!(response, b"$-1\r\n".to_vec());
}

#[tokio::test]
async fn test_get_existing_key() {
    let env = TestEnv::new_master_server();

    env.store.lock().await.set(
        b"grape".to_vec(),
        Value {
            data: DataType::String(b"mango".to_vec()),
            expiration: None,
        },
    );

    let response = env.dispatch_single(command(&["GET", "grape"])).await;

    assert_eq!(response, b"$5\r\nmango\r\n".to_vec());
}

#[tokio::test]
async fn test_get_expired_key_is_absent_and_removed() {
    let env = TestEnv::new_master_server();

    env.store.lock().await.set(
        b"grape".to_vec(),
        Value {
            data: DataType::String(b"mango".to_vec()),
            expiration: Some(Timestamp::now() - 1.second()),
        },
    );

    let response = env.dispatch_single(command(&["GET", "grape"])).await;

    assert_eq!(response, b"$-1\r\n".to_vec());
    assert_eq!(env.store.lock().await.size(), 0);
}

#[tokio::test]
async fn test_get_non_string_value() {
    let env = TestEnv::new_master_server();

    // Values with these shapes only enter the keyspace through a snapshot.
    env.store.lock().await.set(
        b"colors".to_vec(),
        Value {
            data: DataType::Set(HashSet::from([b"red".to_vec()])),
            expiration: None,
        },
    );

    let response = env.dispatch_single(command(&["GET", "colors"])).await;

    assert_eq!(response, error_response("unsupported data type"));
}

#[tokio::test]
async fn test_get_without_argument() {
    let env = TestEnv::new_master_server();

    let response = env.dispatch_single(command(&["GET"])).await;

    assert_eq!(
        response,
        error_response("\"GET\" command requires at least 1 argument")
    );
}
