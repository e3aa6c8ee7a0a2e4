// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use yare::parameterized;

// Helper to parse CLI args
fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_add_with_data() {
    let cli = parse(&[
        "pocket",
        "add",
        "create",
        "transaction",
        "tx-1",
        "-d",
        r#"{"amount": 12}"#,
    ])
    .unwrap();
    match cli.command {
        Command::Add {
            operation,
            entity,
            entity_id,
            data,
            output,
        } => {
            assert_eq!(operation, Operation::Create);
            assert_eq!(entity, EntityType::Transaction);
            assert_eq!(entity_id, "tx-1");
            assert_eq!(data.as_deref(), Some(r#"{"amount": 12}"#));
            assert_eq!(output, OutputFormat::Text);
        }
        _ => panic!("expected Add"),
    }
}

#[parameterized(
    upper = { "DELETE", Operation::Delete },
    lower = { "update", Operation::Update },
)]
fn test_add_operation_is_case_insensitive(arg: &str, expected: Operation) {
    let cli = parse(&["pocket", "add", arg, "category", "c-1"]).unwrap();
    match cli.command {
        Command::Add { operation, .. } => assert_eq!(operation, expected),
        _ => panic!("expected Add"),
    }
}

#[parameterized(
    bad_operation = { &["pocket", "add", "upsert", "transaction", "tx-1"] },
    bad_entity = { &["pocket", "add", "create", "account", "a-1"] },
    empty_id = { &["pocket", "add", "delete", "transaction", "  "] },
)]
fn test_add_rejects_bad_arguments(args: &[&str]) {
    assert!(parse(args).is_err());
}

#[test]
fn test_list_with_status_and_json() {
    let cli = parse(&["pocket", "list", "--status", "failed", "-o", "json"]).unwrap();
    match cli.command {
        Command::List { status, output } => {
            assert_eq!(status, Some(QueueStatus::Failed));
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("expected List"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["pocket", "status", "--state-dir", "/tmp/s", "-vv"]).unwrap();
    assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/s")));
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Command::Status { .. }));
}

#[test]
fn test_sync_retry_failed_flag() {
    let cli = parse(&["pocket", "sync", "--retry-failed"]).unwrap();
    match cli.command {
        Command::Sync { retry_failed, .. } => assert!(retry_failed),
        _ => panic!("expected Sync"),
    }
}

#[test]
fn test_clear_synced_flag() {
    let cli = parse(&["pocket", "clear", "--synced"]).unwrap();
    assert!(matches!(cli.command, Command::Clear { synced: true }));
    let cli = parse(&["pocket", "clear"]).unwrap();
    assert!(matches!(cli.command, Command::Clear { synced: false }));
}
