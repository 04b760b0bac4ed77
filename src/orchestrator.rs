// File: orchestrator.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::RunConfig;
use crate::errors::{ProbeError, ProbeResult};
use crate::login::LoginStrategy;
use crate::report::{Outcome, ResultTable};
use crate::session::{Session, SessionOptions};
use crate::stats::RunStats;
use crate::targets::{self, Identity};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use log::{debug, info, warn};
use std::fmt::Write;
use std::time::Duration;

pub const UPSTREAM_UNAVAILABLE: u16 = 502;

/// Loads roster and URL list and applies the configured limits. Nothing is
/// sent over the network here.
pub fn load_inputs(config: &RunConfig) -> ProbeResult<(Vec<Identity>, Vec<String>)> {
    let users_path = config
        .users
        .as_deref()
        .ok_or_else(|| ProbeError::Config("users file is required".to_string()))?;
    let urls_path = config
        .urls
        .as_deref()
        .ok_or_else(|| ProbeError::Config("urls file is required".to_string()))?;

    info!("Load users file: {}", users_path.display());
    let users = targets::load_users(users_path)?;
    info!("Load target URLs file: {}", urls_path.display());
    warn!("Ensure /logout or equivalent is not in the URLs list, or only at its end");
    let urls = targets::load_urls(urls_path)?;

    Ok((
        targets::truncate(users, config.limit_users),
        targets::truncate(urls, config.limit_urls),
    ))
}

/// Drives one sequential pass: every identity logs in on its own session and
/// requests every URL.
pub struct AccessControl {
    options: SessionOptions,
    strategy: LoginStrategy,
    wait: Duration,
    max_retries: u32,
    test_unauthenticated: bool,
    show_progress: bool,
    stats: RunStats,
    skipped: Vec<String>,
}

impl AccessControl {
    pub fn new(config: &RunConfig) -> ProbeResult<Self> {
        config.validate()?;
        let options = config.session_options();
        // Surfaces proxy and TLS setup problems before the first identity.
        Session::new(options.clone())?;

        Ok(AccessControl {
            options,
            strategy: LoginStrategy::from_config(config),
            wait: config.wait_duration(),
            max_retries: config.max_retries,
            test_unauthenticated: !config.disable_unauth,
            show_progress: !config.quiet,
            stats: RunStats::new(),
            skipped: Vec::new(),
        })
    }

    pub fn strategy(&self) -> &LoginStrategy {
        &self.strategy
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Labels of named identities whose login was rejected.
    pub fn skipped_identities(&self) -> &[String] {
        &self.skipped
    }

    pub async fn run(&mut self, identities: Vec<Identity>, urls: &[String]) -> ResultTable {
        info!("Host: {}", self.options.host);
        if let Some(proxy) = &self.options.proxy {
            info!("HTTP and HTTPS proxy: {}", proxy);
        }

        let mut identities = identities;
        if self.test_unauthenticated {
            identities.insert(0, Identity::unauthenticated());
        }

        self.stats.start();
        let mut table = ResultTable::with_targets(urls);
        let total = identities.len();

        for (index, identity) in identities.iter().enumerate() {
            info!(
                "Testing {} URLs for user: {}, role: {}",
                urls.len(),
                identity.username.as_deref().unwrap_or("-"),
                identity.label
            );

            let Some(mut session) = self.open_session(identity).await else {
                continue;
            };
            tokio::time::sleep(self.wait).await;
            self.probe(&mut session, identity, urls, &mut table).await;
            self.stats.add_tested();

            if index + 1 < total {
                tokio::time::sleep(self.wait * 3).await;
            }
        }

        self.stats.finish();
        table
    }

    /// Fresh session for `identity`, logged in unless it is the
    /// unauthenticated pseudo-identity. `None` means the identity is skipped.
    async fn open_session(&mut self, identity: &Identity) -> Option<Session> {
        let mut session = match Session::new(self.options.clone()) {
            Ok(session) => session,
            Err(e) => {
                warn!("Skipping user {}: {}", identity.label, e);
                self.skip(identity);
                return None;
            }
        };

        let (username, password) = match identity.credentials() {
            Some(credentials) => credentials,
            None => return Some(session),
        };

        match self.strategy.login(&mut session, username, password).await {
            Ok(true) => {
                debug!("Logged in as {} ({})", username, identity.label);
                Some(session)
            }
            Ok(false) => {
                warn!("Skipping user {}: can't log in", username);
                self.skip(identity);
                None
            }
            Err(e) => {
                warn!("Skipping user {}: {}", username, e);
                self.skip(identity);
                None
            }
        }
    }

    fn skip(&mut self, identity: &Identity) {
        self.stats.add_skipped();
        self.skipped.push(identity.label.clone());
    }

    async fn probe(
        &mut self,
        session: &mut Session,
        identity: &Identity,
        urls: &[String],
        table: &mut ResultTable,
    ) {
        let pb = self.progress_bar(urls.len() as u64, &identity.label);

        for url in urls {
            let outcome = self.fetch(session, url).await;
            table.record(url, &identity.label, outcome);
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    /// GET with bounded retries on 502.
    pub async fn fetch(&mut self, session: &mut Session, url: &str) -> Outcome {
        let mut retries = 0;
        loop {
            self.stats.add_request();
            match session.get(url).await {
                Ok(resp) if resp.status() == UPSTREAM_UNAVAILABLE && retries < self.max_retries => {
                    debug!("Got 502 when trying to access {}, retrying", url);
                    retries += 1;
                    self.stats.add_retry();
                    tokio::time::sleep(self.wait).await;
                }
                Ok(resp) => return Outcome::Status(resp.status()),
                Err(e) if e.is_timeout() => {
                    debug!("Request to {} timeout", url);
                    self.stats.add_timeout();
                    return Outcome::Timeout;
                }
                Err(e) => {
                    warn!("{}", e);
                    self.stats.add_failure();
                    return Outcome::Failed;
                }
            }
        }
    }

    fn progress_bar(&self, len: u64, label: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            pb.set_style(
                style
                    .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                        let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                    })
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
        }
        pb.set_message(label.to_string());
        pb
    }
}
