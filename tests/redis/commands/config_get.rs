use crate::test_utils::{command, error_response, TestEnv};

#[tokio::test]
async fn test_config_get_returns_configured_values() {
    let env = TestEnv::with_args(&["--dir", "/tmp/redis-files", "--dbfilename", "dump.rdb"]);

    let response = env.dispatch_single(command(&["CONFIG", "GET", "dir"])).await;

    assert_eq!(
        response,
        b"*2\r\n$3\r\ndir\r\n$16\r\n/tmp/redis-files\r\n".to_vec()
    );

    let response = env
        .dispatch_single(command(&["CONFIG", "GET", "dbfilename"]))
        .await;

    assert_eq!(
        response,
        b"*2\r\n$10\r\ndbfilename\r\n$8\r\ndump.rdb\r\n".to_vec()
    );
}

#[tokio::test]
async fn test_config_get_multiple_parameters_in_one_array() {
    let env = TestEnv::with_args(&["--dir", "/tmp/redis-files", "--dbfilename", "dump.rdb"]);

    let response = env
        .dispatch_single(command(&["CONFIG", "GET", "dir", "dbfilename"]))
        .await;

    assert_eq!(
        response,
        b"*4\r\n$3\r\ndir\r\n$16\r\n/tmp/redis-files\r\n$10\r\ndbfilename\r\n$8\r\ndump.rdb\r\n"
            .to_vec()
    );
}

#[tokio::test]
async fn test_config_get_unset_parameter_replies_null() {
    let env = TestEnv::new_master_server();

    let response = env
        .dispatch_single(command(&["CONFIG", "GET", "maxmemory"]))
        .await;

    assert_eq!(response, b"*2\r\n$9\r\nmaxmemory\r\n$-1\r\n".to_vec());

    // Flags that were not provided are also unset.
    let response = env.dispatch_single(command(&["CONFIG", "GET", "dir"])).await;

    assert_eq!(response, b"*2\r\n$3\r\ndir\r\n$-1\r\n".to_vec());
}

#[tokio::test]
async fn test_config_get_subcommand_is_case_insensitive() {
    let env = TestEnv::with_args(&["--dir", "/tmp/redis-files"]);

    let response = env.dispatch_single(command(&["config", "get", "dir"])).await;

    assert_eq!(
        response,
        b"*2\r\n$3\r\ndir\r\n$16\r\n/tmp/redis-files\r\n".to_vec()
    );
}

#[tokio::test]
async fn test_config_command_subcommand_errors() {
    let env = TestEnv::new_master_server();

    let expected = error_response(
        "\"CONFIG\" command must be followed by one of the following subcommands \"GET\", \"HELP\", \"RESETSTAT\", \"REWRITE\" or \"SET\"",
    );

    let response = env.dispatch_single(command(&["CONFIG"])).await;
    assert_eq!(response, expected);

    let response = env.dispatch_single(command(&["CONFIG", "REWRITE"])).await;
    assert_eq!(response, expected);
}

#[tokio::test]
async fn test_config_get_without_parameters() {
    let env = TestEnv::new_master_server();

    let response = env.dispatch_single(command(&["CONFIG", "GET"])).await;

    assert_eq!(
        response,
        error_response("\"CONFIG GET\" command requires at least one argument")
    );
}
