use redis_lite::resp::RespValue;

use crate::test_utils::{command, error_response, TestEnv};

#[tokio::test]
async fn test_batch_emits_one_response_per_command() {
    let env = TestEnv::new_master_server();

    let responses = env
        .dispatch(command(&["SET", "grape", "mango", "GET", "grape", "PING"]))
        .await;

    assert_eq!(
        responses,
        vec![
            b"+OK\r\n".to_vec(),
            b"$5\r\nmango\r\n".to_vec(),
            b"+PONG\r\n".to_vec(),
        ]
    );
}

#[tokio::test]
async fn test_batch_with_px_option_consumes_expiry_value() {
    let env = TestEnv::new_master_server();

    let responses = env
        .dispatch(command(&[
            "SET", "grape", "mango", "PX", "60000", "GET", "grape",
        ]))
        .await;

    assert_eq!(
        responses,
        vec![b"+OK\r\n".to_vec(), b"$5\r\nmango\r\n".to_vec()]
    );
}

#[tokio::test]
async fn test_batch_continues_after_command_error() {
    let env = TestEnv::new_master_server();

    // The ECHO owns one following element even though it is not a bulk
    // string, so the walk resynchronizes on the PING.
    let request = RespValue::Array(vec![
        RespValue::BulkString(b"ECHO".to_vec()),
        RespValue::Integer(42),
        RespValue::BulkString(b"PING".to_vec()),
    ]);

    let responses = env.dispatch(request).await;

    assert_eq!(
        responses,
        vec![
            error_response("\"ECHO\" command argument must be a string"),
            b"+PONG\r\n".to_vec(),
        ]
    );
}

#[tokio::test]
async fn test_batch_terminates_on_unknown_command() {
    let env = TestEnv::new_master_server();

    // An unknown command has no arity to resynchronize on; the batch ends
    // after its error.
    let responses = env.dispatch(command(&["BOGUS", "PING"])).await;

    assert_eq!(
        responses,
        vec![error_response("unsupported command \"BOGUS\"")]
    );
}

#[tokio::test]
async fn test_batch_terminates_on_non_bulk_command_name() {
    let env = TestEnv::new_master_server();

    let request = RespValue::Array(vec![
        RespValue::BulkString(b"PING".to_vec()),
        RespValue::Integer(42),
        RespValue::BulkString(b"PING".to_vec()),
    ]);

    let responses = env.dispatch(request).await;

    assert_eq!(
        responses,
        vec![
            b"+PONG\r\n".to_vec(),
            error_response("command must be encoded as a bulk string"),
        ]
    );
}

#[tokio::test]
async fn test_config_get_consumes_all_remaining_elements() {
    let env = TestEnv::with_args(&["--dir", "/tmp/redis-files"]);

    // Everything after CONFIG GET is a parameter, never a new command.
    let responses = env
        .dispatch(command(&["CONFIG", "GET", "dir", "PING"]))
        .await;

    assert_eq!(responses.len(), 1);
    assert_eq!(
        responses[0],
        b"*4\r\n$3\r\ndir\r\n$16\r\n/tmp/redis-files\r\n$4\r\nPING\r\n$-1\r\n".to_vec()
    );
}

#[tokio::test]
async fn test_non_array_non_string_request_is_rejected() {
    let env = TestEnv::new_master_server();

    let response = env.dispatch_single(RespValue::Integer(42)).await;

    assert_eq!(
        response,
        error_response("commands must be encoded as a list of bulk strings")
    );
}

#[tokio::test]
async fn test_dispatch_is_case_insensitive_for_every_command() {
    let env = TestEnv::new_master_server();

    let upper = env
        .dispatch(command(&["set", "grape", "mango", "get", "grape"]))
        .await;
    let mixed = env
        .dispatch(command(&["SeT", "grape", "mango", "gEt", "grape"]))
        .await;

    assert_eq!(upper, mixed);
    assert_eq!(upper[1], b"$5\r\nmango\r\n".to_vec());
}
