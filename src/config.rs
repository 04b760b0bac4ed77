// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::errors::{ProbeError, ProbeResult};
use crate::session::{Scheme, SessionOptions};
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROXY: &str = "127.0.0.1:8080";
pub const DEFAULT_LOGIN_CODE: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// Credentials POSTed to the login path
    Form,
    /// Same as `form`, with a CSRF token scraped from the login page first
    Csrf,
    /// HTTP Basic authentication against a protected path
    Basic,
    /// HTTP Digest authentication against a protected path
    Digest,
    /// Proxy-Authorization (Basic) against a protected path
    Proxy,
}

/// How a login response is recognised as successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCheck {
    Status(u16),
    Text(String),
}

impl LoginCheck {
    pub fn matches(&self, status: u16, body: &str) -> bool {
        match self {
            LoginCheck::Status(expected) => status == *expected,
            LoginCheck::Text(needle) => body.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub host: Option<String>,
    pub users: Option<PathBuf>,
    pub urls: Option<PathBuf>,
    pub login_path: String,
    pub id_field: String,
    pub pwd_field: String,
    pub login_code: Option<u16>,
    pub login_text: Option<String>,
    pub login_method: LoginMethod,
    pub csrf_class: String,
    pub csrf_name: String,
    pub json_body: bool,
    pub out: Option<PathBuf>,
    pub wait: u64,
    pub limit_users: Option<usize>,
    pub limit_urls: Option<usize>,
    pub timeout: u64,
    pub max_retries: u32,
    pub proxy: bool,
    pub proxy_addr: String,
    pub json: bool,
    pub allow_redirect: bool,
    pub disable_unauth: bool,
    pub disable_https: bool,
    pub verbose: bool,
    pub debug: bool,
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            host: None,
            users: None,
            urls: None,
            login_path: "/login".to_string(),
            id_field: "email".to_string(),
            pwd_field: "password".to_string(),
            login_code: None,
            login_text: None,
            login_method: LoginMethod::Form,
            csrf_class: "input".to_string(),
            csrf_name: "csrf".to_string(),
            json_body: false,
            out: None,
            wait: 1,
            limit_users: None,
            limit_urls: None,
            timeout: 5,
            max_retries: 3,
            proxy: false,
            proxy_addr: DEFAULT_PROXY.to_string(),
            json: false,
            allow_redirect: false,
            disable_unauth: false,
            disable_https: false,
            verbose: false,
            debug: false,
            quiet: false,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays the JSON document at `path`. Values from the file win over
    /// whatever was set on the command line.
    pub fn merge_file(&mut self, path: &Path) -> ProbeResult<()> {
        let raw = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
        let file: ConfigFile = serde_json::from_str(&raw).map_err(|e| {
            ProbeError::Config(format!("{} is not a valid configuration file: {}", path.display(), e))
        })?;
        file.apply_to(self);
        Ok(())
    }

    pub fn validate(&self) -> ProbeResult<()> {
        if self.host.as_deref().map_or(true, |h| h.trim().is_empty())
            || self.users.is_none()
            || self.urls.is_none()
        {
            return Err(ProbeError::Config(
                "host, users and urls are required when no configuration file provides them"
                    .to_string(),
            ));
        }
        if self.login_code.is_some() && self.login_text.is_some() {
            return Err(ProbeError::Config(
                "login_code and login_text are mutually exclusive".to_string(),
            ));
        }
        if self.login_text.as_deref() == Some("") {
            return Err(ProbeError::Config("login_text must not be empty".to_string()));
        }
        if !self.login_path.starts_with('/') {
            return Err(ProbeError::Config(format!(
                "login_path must start with '/': {}",
                self.login_path
            )));
        }
        if self.timeout == 0 {
            return Err(ProbeError::Config("timeout must be at least 1 second".to_string()));
        }
        if self.proxy && self.proxy_addr.trim().is_empty() {
            return Err(ProbeError::Config("proxy enabled without an address".to_string()));
        }
        if self.login_method == LoginMethod::Csrf && self.csrf_name.is_empty() {
            return Err(ProbeError::Config("csrf_name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn login_check(&self) -> LoginCheck {
        match &self.login_text {
            Some(text) => LoginCheck::Text(text.clone()),
            None => LoginCheck::Status(self.login_code.unwrap_or(DEFAULT_LOGIN_CODE)),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        }
    }

    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            host: self.host.clone().unwrap_or_default(),
            scheme: if self.disable_https {
                Scheme::Http
            } else {
                Scheme::Https
            },
            proxy: self.proxy.then(|| self.proxy_addr.clone()),
            timeout: Duration::from_secs(self.timeout),
            allow_redirect: self.allow_redirect,
            json_body: self.json_body,
        }
    }
}

/// Mirror of the long option names, every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    host: Option<String>,
    users: Option<PathBuf>,
    urls: Option<PathBuf>,
    login_path: Option<String>,
    id_field: Option<String>,
    pwd_field: Option<String>,
    login_code: Option<u16>,
    login_text: Option<String>,
    login_method: Option<LoginMethod>,
    csrf: Option<bool>,
    csrf_class: Option<String>,
    csrf_name: Option<String>,
    json_body: Option<bool>,
    out: Option<PathBuf>,
    wait: Option<u64>,
    limit_users: Option<usize>,
    limit_urls: Option<usize>,
    timeout: Option<u64>,
    max_retries: Option<u32>,
    proxy: Option<bool>,
    proxy_addr: Option<String>,
    json: Option<bool>,
    allow_redirect: Option<bool>,
    disable_unauth: Option<bool>,
    disable_https: Option<bool>,
    verbose: Option<bool>,
    debug: Option<bool>,
    quiet: Option<bool>,
    #[serde(flatten)]
    unknown: HashMap<String, serde_json::Value>,
}

macro_rules! overlay {
    (opt $file:ident, $cfg:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $file.$field.take() {
                $cfg.$field = Some(value);
            }
        )+
    };
    ($file:ident, $cfg:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $file.$field.take() {
                $cfg.$field = value;
            }
        )+
    };
}

impl ConfigFile {
    fn apply_to(mut self, cfg: &mut RunConfig) {
        for key in self.unknown.keys() {
            debug!("Ignoring unknown configuration key: {}", key);
        }

        overlay!(opt self, cfg, host, users, urls, login_code, login_text, out, limit_users, limit_urls);
        overlay!(
            self,
            cfg,
            login_path,
            id_field,
            pwd_field,
            login_method,
            csrf_class,
            csrf_name,
            json_body,
            wait,
            timeout,
            max_retries,
            proxy,
            proxy_addr,
            json,
            allow_redirect,
            disable_unauth,
            disable_https,
            verbose,
            debug,
            quiet,
        );

        if self.csrf == Some(true) {
            cfg.login_method = LoginMethod::Csrf;
        }
    }
}
