// File: csrf.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::form::FormLogin;
use super::LoginAttempt;
use crate::errors::{ProbeError, ProbeResult};
use crate::session::Session;
use log::debug;
use scraper::{Html, Selector};

/// Form login that first scrapes an anti-CSRF token from the login page.
///
/// Fetching the token and submitting the form are two separate requests. A
/// server that rotates tokens in between will reject the login, which is
/// reported as an ordinary failed login.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrfLogin {
    pub form: FormLogin,
    /// Tag holding the token, usually `input` or `meta`
    pub element: String,
    /// Value of the element's `name` attribute, reused as the POST field name
    pub token_name: String,
}

impl CsrfLogin {
    pub async fn fetch_token(&self, session: &mut Session) -> ProbeResult<String> {
        let page = session.get(&self.form.login_path).await?;
        extract_token(page.body(), &self.element, &self.token_name)
            .ok_or_else(|| ProbeError::TokenNotFound(self.token_name.clone()))
    }

    pub async fn send_login_request(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ProbeResult<LoginAttempt> {
        let token = self.fetch_token(session).await?;
        debug!("Found CSRF token {}={}", self.token_name, token);

        let mut fields = self.form.fields(username, password);
        fields.insert(self.token_name.clone(), token);
        self.form.submit(session, &fields).await
    }

    pub fn parse_login_response(&self, attempt: &LoginAttempt) -> bool {
        self.form.parse_login_response(attempt)
    }
}

/// Returns the `value` (or, for meta tags, `content`) attribute of the first
/// `element` whose `name` attribute equals `name`.
pub fn extract_token(body: &str, element: &str, name: &str) -> Option<String> {
    let query = format!(r#"{}[name="{}"]"#, element, name.replace('"', "\\\""));
    let selector = Selector::parse(&query).ok()?;
    let document = Html::parse_document(body);

    document.select(&selector).find_map(|el| {
        el.value()
            .attr("value")
            .or_else(|| el.value().attr("content"))
            .map(str::to_string)
    })
}
