// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use acprobe::config::RunConfig;
use acprobe::session::{Scheme, Session, SessionOptions};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{MockServer, ResponseTemplate};

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn host_of(server: &MockServer) -> String {
    server.address().to_string()
}

/// Runnable configuration against `server`: plain HTTP, no delays, no
/// progress output.
pub fn test_config(server: &MockServer) -> RunConfig {
    RunConfig {
        host: Some(host_of(server)),
        users: Some(PathBuf::from("users.csv")),
        urls: Some(PathBuf::from("urls.txt")),
        disable_https: true,
        wait: 0,
        timeout: 2,
        quiet: true,
        ..RunConfig::default()
    }
}

pub fn session_options(server: &MockServer) -> SessionOptions {
    SessionOptions {
        host: host_of(server),
        scheme: Scheme::Http,
        proxy: None,
        timeout: Duration::from_secs(2),
        allow_redirect: false,
        json_body: false,
    }
}

pub fn session_for(server: &MockServer) -> Session {
    Session::new(session_options(server)).unwrap()
}

pub fn login_ok(cookie: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string("<h1>Welcome back</h1>")
        .append_header("set-cookie", format!("session={}; Path=/", cookie))
}

pub fn login_page(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            r#"<!DOCTYPE html>
<html>
<body>
    <form method="post" action="/login">
        <input type="hidden" name="csrf" value="{}">
        <input type="text" name="email">
        <input type="password" name="password">
    </form>
</body>
</html>"#,
            token
        ))
        .append_header("content-type", "text/html")
}

/// Writes roster and URL files into a fresh temp dir and returns their paths.
pub fn write_inputs(roster: &str, urls: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let users_path = dir.path().join("users.csv");
    let urls_path = dir.path().join("urls.txt");
    fs::write(&users_path, roster).unwrap();
    fs::write(&urls_path, urls).unwrap();
    (dir, users_path, urls_path)
}
