// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

pub mod csrf;
pub mod form;
pub mod http_auth;

use crate::config::{LoginMethod, RunConfig};
use crate::decorator::RequestDecorator;
use crate::errors::ProbeResult;
use crate::response::ProbeResponse;
use crate::session::Session;
use csrf::CsrfLogin;
use form::FormLogin;
use http_auth::{HttpAuthLogin, HttpAuthScheme};
use log::debug;

/// What a login request produced, before it is judged.
#[derive(Debug)]
pub struct LoginAttempt {
    pub response: ProbeResponse,
    /// Credentials to bind to the session if the attempt is accepted
    pub decorator: Option<RequestDecorator>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginStrategy {
    FormPost(FormLogin),
    CsrfFormPost(CsrfLogin),
    Basic(HttpAuthLogin),
    Digest(HttpAuthLogin),
    ProxyAuth(HttpAuthLogin),
}

impl LoginStrategy {
    pub fn from_config(config: &RunConfig) -> Self {
        let form = FormLogin {
            login_path: config.login_path.clone(),
            id_field: config.id_field.clone(),
            pwd_field: config.pwd_field.clone(),
            check: config.login_check(),
        };
        let path = config.login_path.as_str();

        match config.login_method {
            LoginMethod::Form => LoginStrategy::FormPost(form),
            LoginMethod::Csrf => LoginStrategy::CsrfFormPost(CsrfLogin {
                form,
                element: config.csrf_class.clone(),
                token_name: config.csrf_name.clone(),
            }),
            LoginMethod::Basic => {
                LoginStrategy::Basic(HttpAuthLogin::new(path, HttpAuthScheme::Basic))
            }
            LoginMethod::Digest => {
                LoginStrategy::Digest(HttpAuthLogin::new(path, HttpAuthScheme::Digest))
            }
            LoginMethod::Proxy => {
                LoginStrategy::ProxyAuth(HttpAuthLogin::new(path, HttpAuthScheme::Proxy))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoginStrategy::FormPost(_) => "form",
            LoginStrategy::CsrfFormPost(_) => "csrf",
            LoginStrategy::Basic(_) => "basic",
            LoginStrategy::Digest(_) => "digest",
            LoginStrategy::ProxyAuth(_) => "proxy",
        }
    }

    pub async fn send_login_request(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ProbeResult<LoginAttempt> {
        match self {
            LoginStrategy::FormPost(form) => form.send_login_request(session, username, password).await,
            LoginStrategy::CsrfFormPost(csrf) => {
                csrf.send_login_request(session, username, password).await
            }
            LoginStrategy::Basic(auth) | LoginStrategy::Digest(auth) | LoginStrategy::ProxyAuth(auth) => {
                auth.send_login_request(session, username, password).await
            }
        }
    }

    pub fn parse_login_response(&self, session: &mut Session, attempt: LoginAttempt) -> bool {
        let accepted = match self {
            LoginStrategy::FormPost(form) => form.parse_login_response(&attempt),
            LoginStrategy::CsrfFormPost(csrf) => csrf.parse_login_response(&attempt),
            LoginStrategy::Basic(auth) | LoginStrategy::Digest(auth) | LoginStrategy::ProxyAuth(auth) => {
                auth.parse_login_response(session, attempt)
            }
        };
        session.set_authenticated(accepted);
        accepted
    }

    /// Runs both halves of the login. A rejected attempt resets the session so
    /// no half-established state survives.
    pub async fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ProbeResult<bool> {
        let attempt = match self.send_login_request(session, username, password).await {
            Ok(attempt) => attempt,
            Err(e) => {
                session.reset()?;
                return Err(e);
            }
        };
        debug!(
            "{} login for {} answered {}",
            self.name(),
            username,
            attempt.response.status()
        );

        if self.parse_login_response(session, attempt) {
            Ok(true)
        } else {
            session.reset()?;
            Ok(false)
        }
    }
}
