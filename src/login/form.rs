// File: form.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use super::LoginAttempt;
use crate::config::LoginCheck;
use crate::errors::ProbeResult;
use crate::session::{FormFields, Session};

/// Credentials POSTed to the login path. The application keeps its own
/// state in cookies, so nothing is bound to the session on success.
#[derive(Debug, Clone, PartialEq)]
pub struct FormLogin {
    pub login_path: String,
    pub id_field: String,
    pub pwd_field: String,
    pub check: LoginCheck,
}

impl FormLogin {
    pub fn fields(&self, username: &str, password: &str) -> FormFields {
        let mut fields = FormFields::new();
        fields.insert(self.id_field.clone(), username.to_string());
        fields.insert(self.pwd_field.clone(), password.to_string());
        fields
    }

    pub async fn submit(&self, session: &mut Session, fields: &FormFields) -> ProbeResult<LoginAttempt> {
        let response = session.post(&self.login_path, fields).await?;
        Ok(LoginAttempt {
            response,
            decorator: None,
        })
    }

    pub async fn send_login_request(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ProbeResult<LoginAttempt> {
        let fields = self.fields(username, password);
        self.submit(session, &fields).await
    }

    pub fn parse_login_response(&self, attempt: &LoginAttempt) -> bool {
        self.check
            .matches(attempt.response.status(), attempt.response.body())
    }
}
