use crate::test_utils::{command, TestEnv};

#[tokio::test]
async fn test_psync_replies_fullresync_and_snapshot_prelude() {
    let env = TestEnv::new_master_server();

    let response = env
        .dispatch_single(command(&["PSYNC", "?", "-1"]))
        .await;

    let header = format!("+FULLRESYNC {} 0\r\n", env.server.repl_id).into_bytes();

    assert!(
        response.starts_with(&header),
        "unexpected response start {:?}",
        String::from_utf8_lossy(&response[..header.len().min(response.len())])
    );

    let remainder = &response[header.len()..];
    let payload = hex::decode(
        "524544495330303131fa0972656469732d76657205372e322e30fa0a72656469732d62697473c040fa056374696d65c26d08bc65fa08757365642d6d656dc2b0c41000fa08616f662d62617365c000fff06e3bfec0ff5aa2",
    )
    .unwrap();

    let mut expected_remainder = format!("${}\r\n", payload.len()).into_bytes();
    expected_remainder.extend_from_slice(&payload);

    // The snapshot prelude carries no trailing terminator.
    assert_eq!(remainder, expected_remainder.as_slice());

    // The embedded payload is itself a well-formed empty snapshot.
    assert!(payload.starts_with(b"REDIS0011"));
}
