use crate::test_utils::{command, TestEnv};

#[tokio::test]
async fn test_replconf_always_replies_ok() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        command(&["REPLCONF", "listening-port", "6380"]),
        command(&["REPLCONF", "capa", "psync2"]),
        command(&["REPLCONF"]),
    ];

    for request in test_cases {
        let response = env.dispatch_single(request).await;

        assert_eq!(response, b"+OK\r\n".to_vec());
    }
}
