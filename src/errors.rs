// File: errors.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ProbeError {
    Config(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    MalformedRecord {
        line: u64,
        field: String,
    },
    InvalidUrl(String),
    TokenNotFound(String),
    Timeout(String),
    Request(reqwest::Error),
    Serialization(serde_json::Error),
    Csv(csv::Error),
}

impl ProbeError {
    /// Configuration and input-file problems abort the run before any
    /// request is sent. Everything else only costs a single identity or URL.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Io { .. }
                | Self::MalformedRecord { .. }
                | Self::InvalidUrl(_)
                | Self::Csv(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Io { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
            Self::MalformedRecord { line, field } => {
                write!(f, "Malformed record on line {}: missing field '{}'", line, field)
            }
            Self::InvalidUrl(url) => write!(f, "Invalid target URL: {}", url),
            Self::TokenNotFound(name) => write!(f, "CSRF token '{}' not found in login page", name),
            Self::Timeout(url) => write!(f, "Request to {} timed out", url),
            Self::Request(e) => write!(f, "Request failed: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Request(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Config(_)
            | Self::MalformedRecord { .. }
            | Self::InvalidUrl(_)
            | Self::TokenNotFound(_)
            | Self::Timeout(_) => None,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            let url = error
                .url()
                .map_or_else(|| "unknown URL".to_string(), |u| u.to_string());
            Self::Timeout(url)
        } else {
            Self::Request(error)
        }
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}

impl From<csv::Error> for ProbeError {
    fn from(error: csv::Error) -> Self {
        Self::Csv(error)
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
