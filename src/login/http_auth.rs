// File: http_auth.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::LoginAttempt;
use crate::decorator::RequestDecorator;
use crate::digest::DigestChallenge;
use crate::errors::ProbeResult;
use crate::session::Session;
use log::debug;
use reqwest::header::WWW_AUTHENTICATE;

pub const VALID_STATUS_CODE: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpAuthScheme {
    Basic,
    Digest,
    Proxy,
}

/// Header based authentication checked against any path that requires it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpAuthLogin {
    pub protected_path: String,
    pub scheme: HttpAuthScheme,
}

impl HttpAuthLogin {
    pub fn new(protected_path: &str, scheme: HttpAuthScheme) -> Self {
        Self {
            protected_path: protected_path.to_string(),
            scheme,
        }
    }

    pub async fn send_login_request(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ProbeResult<LoginAttempt> {
        let mut decorator = match self.scheme {
            HttpAuthScheme::Basic => RequestDecorator::basic(username, password),
            HttpAuthScheme::Proxy => RequestDecorator::proxy_basic(username, password),
            HttpAuthScheme::Digest => {
                let first = session.get(&self.protected_path).await?;
                if first.status() != 401 {
                    debug!(
                        "{} answered {} without a Digest challenge",
                        self.protected_path,
                        first.status()
                    );
                    return Ok(LoginAttempt {
                        response: first,
                        decorator: None,
                    });
                }
                let challenge = first
                    .header(WWW_AUTHENTICATE.as_str())
                    .and_then(DigestChallenge::parse);
                match challenge {
                    Some(challenge) => RequestDecorator::digest(username, password, challenge),
                    None => {
                        debug!("No usable Digest challenge on {}", self.protected_path);
                        return Ok(LoginAttempt {
                            response: first,
                            decorator: None,
                        });
                    }
                }
            }
        };

        let response = session.get_with(&self.protected_path, &mut decorator).await?;
        Ok(LoginAttempt {
            response,
            decorator: Some(decorator),
        })
    }

    /// Binds the credentials to the session on success, drops them otherwise.
    pub fn parse_login_response(&self, session: &mut Session, attempt: LoginAttempt) -> bool {
        if attempt.response.status() == VALID_STATUS_CODE {
            if let Some(decorator) = attempt.decorator {
                session.set_decorator(decorator);
            }
            true
        } else {
            session.clear_decorator();
            false
        }
    }
}
