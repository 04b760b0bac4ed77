// File: digest.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

//! HTTP Digest access authentication (RFC 7616), client side only.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest as _, Sha256};

static PARAM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9_-]*)\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^,\s]+))"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "MD5" => Some(Self::Md5),
            "SHA-256" => Some(Self::Sha256),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA-256",
        }
    }

    fn hash(&self, input: &str) -> String {
        match self {
            Self::Md5 => format!("{:x}", md5::compute(input.as_bytes())),
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(input.as_bytes());
                format!("{:x}", hasher.finalize())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub qop_auth: bool,
    pub algorithm: DigestAlgorithm,
}

impl DigestChallenge {
    /// Extracts the Digest challenge from a `WWW-Authenticate` value. Returns
    /// `None` when the header carries no Digest scheme, lacks a nonce, or asks
    /// for an algorithm we cannot compute.
    pub fn parse(header: &str) -> Option<Self> {
        let start = header.to_ascii_lowercase().find("digest ")?;
        let params = &header[start + "digest ".len()..];

        let mut realm = String::new();
        let mut nonce = None;
        let mut opaque = None;
        let mut qop_auth = false;
        let mut algorithm = DigestAlgorithm::Md5;

        for cap in PARAM_PATTERN.captures_iter(params) {
            let key = cap[1].to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .map_or("", |m| m.as_str())
                .to_string();

            match key.as_str() {
                "realm" => realm = value,
                "nonce" => nonce = Some(value),
                "opaque" => opaque = Some(value),
                "qop" => qop_auth = value.split(',').any(|q| q.trim().eq_ignore_ascii_case("auth")),
                "algorithm" => algorithm = DigestAlgorithm::parse(&value)?,
                _ => {}
            }
        }

        Some(Self {
            realm,
            nonce: nonce?,
            opaque,
            qop_auth,
            algorithm,
        })
    }

    pub fn authorization(
        &self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        nonce_count: u32,
        cnonce: &str,
    ) -> String {
        let alg = self.algorithm;
        let ha1 = alg.hash(&format!("{}:{}:{}", username, self.realm, password));
        let ha2 = alg.hash(&format!("{}:{}", method, uri));
        let nc = format!("{:08x}", nonce_count);

        let response = if self.qop_auth {
            alg.hash(&format!(
                "{}:{}:{}:{}:auth:{}",
                ha1, self.nonce, nc, cnonce, ha2
            ))
        } else {
            alg.hash(&format!("{}:{}:{}", ha1, self.nonce, ha2))
        };

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", algorithm={}, response="{}""#,
            username,
            self.realm,
            self.nonce,
            uri,
            alg.name(),
            response
        );
        if self.qop_auth {
            header.push_str(&format!(r#", qop=auth, nc={}, cnonce="{}""#, nc, cnonce));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{}""#, opaque));
        }
        header
    }
}

/// Client nonce derived from the server nonce, the request counter and the
/// current time.
pub fn make_cnonce(nonce: &str, nonce_count: u32) -> String {
    let seed = format!(
        "{}:{}:{}",
        nonce,
        nonce_count,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
