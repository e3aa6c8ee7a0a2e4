// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the pk-remote server binary.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Helper to spawn a server process and clean it up on drop.
struct ServerProcess {
    child: Child,
    port: u16,
    _temp_dir: tempfile::TempDir,
}

impl ServerProcess {
    fn spawn() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");

        // Ask the OS for a free port, then hand it to the server
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("pick free port")
            .port();

        let child = Command::new(env!("CARGO_BIN_EXE_pk-remote"))
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .arg("--db")
            .arg(temp_dir.path().join("ledger.db"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn server process");

        ServerProcess {
            child,
            port,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[tokio::test]
async fn test_server_lifecycle() {
    let server = ServerProcess::spawn();
    let client = reqwest::Client::new();

    // CI runners can be slow, so retry for a while
    let mut healthy = false;
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{}/health", server.url())).send().await {
            healthy = resp.status().is_success();
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(healthy, "server should answer health checks");

    let body = serde_json::json!({
        "operations": [{
            "id": "op-1",
            "operation": "DELETE",
            "entityType": "transaction",
            "entityId": "tx-1",
            "payload": null,
            "clientTimestamp": "2026-01-01T00:00:00Z"
        }]
    });
    let resp = client
        .post(format!("{}/api/transactions/sync", server.url()))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["results"][0]["operationId"], "op-1");
    assert_eq!(json["results"][0]["status"], "SUCCESS");
    assert!(json["serverTimestamp"].is_string());
}
