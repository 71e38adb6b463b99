use crate::test_utils::{command, TestEnv};

#[tokio::test]
async fn test_info_replication_as_master() {
    let env = TestEnv::new_master_server();

    let response = env
        .dispatch_single(command(&["INFO", "replication"]))
        .await;

    let expected_content = format!(
        "role:master\nmaster_replid:{}\nnmaster_repl_offset:0",
        env.server.repl_id
    );
    let expected = format!("${}\r\n{}\r\n", expected_content.len(), expected_content);

    assert_eq!(response, expected.into_bytes());
    assert_eq!(env.server.repl_id.len(), 40);
    assert!(env.server.repl_id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_info_replication_as_replica() {
    let env = TestEnv::with_args(&["--replicaof", "127.0.0.1 6380"]);

    let response = env
        .dispatch_single(command(&["INFO", "replication"]))
        .await;

    let content = String::from_utf8_lossy(&response).into_owned();

    assert!(
        content.contains("role:slave"),
        "unexpected response {}",
        content
    );
}

#[tokio::test]
async fn test_info_section_is_lowercased() {
    let env = TestEnv::new_master_server();

    let response = env
        .dispatch_single(command(&["INFO", "REPLICATION"]))
        .await;

    assert!(String::from_utf8_lossy(&response).contains("role:master"));
}

#[tokio::test]
async fn test_info_with_other_or_missing_section() {
    let env = TestEnv::new_master_server();

    let response = env.dispatch_single(command(&["INFO", "memory"])).await;
    assert_eq!(response, b"$-1\r\n".to_vec());

    let response = env.dispatch_single(command(&["INFO"])).await;
    assert_eq!(response, b"$-1\r\n".to_vec());
}
