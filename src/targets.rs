// File: targets.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::errors::{ProbeError, ProbeResult};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File};
use std::path::Path;
use url::{Position, Url};

pub const UNAUTHENTICATED: &str = "Unauth. user";

pub const USER_FIELD: &str = "username";
pub const PWD_FIELD: &str = "password";
pub const DESC_FIELD: &str = "role";

static LOGOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)log[-_]?out|sign[-_]?out|log[-_]?off").unwrap());

/// One tested principal. The unauthenticated pseudo-identity carries no
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub label: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Identity {
    pub fn new(label: &str, username: &str, password: &str) -> Self {
        Identity {
            label: label.to_string(),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    pub fn unauthenticated() -> Self {
        Identity {
            label: UNAUTHENTICATED.to_string(),
            username: None,
            password: None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }

    /// Credentials pair, if any.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pwd)) => Some((user.as_str(), pwd.as_str())),
            _ => None,
        }
    }
}

/// Reads a `;` separated roster whose header names at least `username`,
/// `password` and `role`.
pub fn load_users(path: &Path) -> ProbeResult<Vec<Identity>> {
    let file = File::open(path).map_err(|e| ProbeError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let user_col = column(USER_FIELD);
    let pwd_col = column(PWD_FIELD);
    let desc_col = column(DESC_FIELD);

    let mut users = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |col: Option<usize>, name: &str| -> ProbeResult<String> {
            col.and_then(|c| record.get(c))
                .map(str::to_string)
                .ok_or_else(|| ProbeError::MalformedRecord {
                    line,
                    field: name.to_string(),
                })
        };

        let username = field(user_col, USER_FIELD)?;
        let password = field(pwd_col, PWD_FIELD)?;
        let label = field(desc_col, DESC_FIELD)?;
        users.push(Identity {
            label,
            username: Some(username),
            password: Some(password),
        });
    }
    Ok(users)
}

/// Reads one URL or path per line and keeps only path and query. Blank lines
/// are dropped, order and duplicates are kept.
pub fn load_urls(path: &Path) -> ProbeResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
    let mut urls = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let target = normalize_target(line)?;
        if LOGOUT_PATTERN.is_match(&target) {
            warn!(
                "{} looks like a logout endpoint, sessions probed after it may be invalidated",
                target
            );
        }
        urls.push(target);
    }
    Ok(urls)
}

/// Strips scheme and authority from an absolute URL. Relative inputs are
/// kept verbatim apart from the fragment.
pub fn normalize_target(raw: &str) -> ProbeResult<String> {
    if is_absolute(raw) {
        let url = Url::parse(raw).map_err(|_| ProbeError::InvalidUrl(raw.to_string()))?;
        return Ok(url[Position::BeforePath..Position::AfterQuery].to_string());
    }

    let without_fragment = raw.split('#').next().unwrap_or_default();
    if without_fragment.starts_with('/') {
        Ok(without_fragment.to_string())
    } else {
        Ok(format!("/{}", without_fragment))
    }
}

/// `scheme://` before the first path or query separator. A URL inside a
/// query string does not make the line absolute.
fn is_absolute(raw: &str) -> bool {
    let end = raw.find(|c| c == '/' || c == '?').unwrap_or(raw.len());
    raw[..end].ends_with(':') && raw[end..].starts_with("//")
}

/// Applies the optional `limit` to a loaded list.
pub fn truncate<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
