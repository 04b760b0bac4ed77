// File: decorator.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::digest::{make_cnonce, DigestChallenge};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, PROXY_AUTHORIZATION};

/// Credentials that have to travel with every request because the scheme is
/// not cookie based. The session applies it to each outgoing request.
#[derive(Debug, Clone)]
pub enum RequestDecorator {
    Basic {
        username: String,
        password: String,
    },
    Digest {
        username: String,
        password: String,
        challenge: DigestChallenge,
        nonce_count: u32,
    },
    ProxyBasic {
        username: String,
        password: String,
    },
}

impl RequestDecorator {
    pub fn basic(username: &str, password: &str) -> Self {
        Self::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn digest(username: &str, password: &str, challenge: DigestChallenge) -> Self {
        Self::Digest {
            username: username.to_string(),
            password: password.to_string(),
            challenge,
            nonce_count: 0,
        }
    }

    pub fn proxy_basic(username: &str, password: &str) -> Self {
        Self::ProxyBasic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Header to attach to a `method` request for `uri` (path plus query).
    /// Digest bumps its nonce count on every call.
    pub fn header(&mut self, method: &str, uri: &str) -> Option<(HeaderName, HeaderValue)> {
        let (name, value) = match self {
            Self::Basic { username, password } => (AUTHORIZATION, basic_credentials(username, password)),
            Self::ProxyBasic { username, password } => {
                (PROXY_AUTHORIZATION, basic_credentials(username, password))
            }
            Self::Digest {
                username,
                password,
                challenge,
                nonce_count,
            } => {
                *nonce_count += 1;
                let cnonce = make_cnonce(&challenge.nonce, *nonce_count);
                let value =
                    challenge.authorization(username, password, method, uri, *nonce_count, &cnonce);
                (AUTHORIZATION, value)
            }
        };
        let mut value = HeaderValue::from_str(&value).ok()?;
        value.set_sensitive(true);
        Some((name, value))
    }
}

fn basic_credentials(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}
