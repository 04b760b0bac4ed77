// File: stats.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    requests: u64,
    retries: u64,
    timeouts: u64,
    failures: u64,
    identities_tested: usize,
    identities_skipped: usize,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl RunStats {
    pub fn new() -> RunStats {
        RunStats::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Utc::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    pub fn add_request(&mut self) {
        self.requests += 1;
    }

    pub fn add_retry(&mut self) {
        self.retries += 1;
    }

    pub fn add_timeout(&mut self) {
        self.timeouts += 1;
    }

    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    pub fn add_tested(&mut self) {
        self.identities_tested += 1;
    }

    pub fn add_skipped(&mut self) {
        self.identities_skipped += 1;
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn retries(&self) -> u64 {
        self.retries
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn identities_tested(&self) -> usize {
        self.identities_tested
    }

    pub fn identities_skipped(&self) -> usize {
        self.identities_skipped
    }

    pub fn elapsed_ms(&self) -> i64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            _ => 0,
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests ({} retries, {} timeouts, {} errors). {} identities tested, {} skipped. {} ms.",
            self.requests,
            self.retries,
            self.timeouts,
            self.failures,
            self.identities_tested,
            self.identities_skipped,
            self.elapsed_ms()
        )?;
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            write!(
                f,
                " Started at {} / Ended at {}.",
                start.format("%Y-%m-%d %H:%M:%S"),
                end.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        Ok(())
    }
}
