// File: report.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::OutputFormat;
use crate::errors::{ProbeError, ProbeResult};
use indexmap::IndexMap;
use log::warn;
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub const TIMEOUT_MARKER: &str = "Timeout";
pub const ERROR_MARKER: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status(u16),
    Timeout,
    /// Transport failure other than a timeout
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Status(code) => write!(f, "{}", code),
            Outcome::Timeout => f.write_str(TIMEOUT_MARKER),
            Outcome::Failed => f.write_str(ERROR_MARKER),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Status(code) => serializer.serialize_u16(*code),
            Outcome::Timeout => serializer.serialize_str(TIMEOUT_MARKER),
            Outcome::Failed => serializer.serialize_str(ERROR_MARKER),
        }
    }
}

/// URL x identity matrix. Rows and columns keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: IndexMap<String, IndexMap<String, Outcome>>,
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with one empty row per target, so URLs nobody could reach still
    /// show up.
    pub fn with_targets(urls: &[String]) -> Self {
        let mut table = Self::new();
        for url in urls {
            table.rows.entry(url.clone()).or_default();
        }
        table
    }

    pub fn record(&mut self, url: &str, identity: &str, outcome: Outcome) {
        self.rows
            .entry(url.to_string())
            .or_default()
            .insert(identity.to_string(), outcome);
    }

    pub fn get(&self, url: &str, identity: &str) -> Option<Outcome> {
        self.rows.get(url).and_then(|row| row.get(identity)).copied()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Identity columns, taken from the first row.
    pub fn identities(&self) -> Vec<&str> {
        self.rows
            .values()
            .next()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn render(table: &ResultTable, format: OutputFormat) -> ProbeResult<String> {
    match format {
        OutputFormat::Table => Ok(render_table(table)),
        OutputFormat::Json => render_json(table),
    }
}

/// Left-justified fixed-width table. Each column is as wide as its longest
/// label plus one, cells are separated by a single space.
pub fn render_table(table: &ResultTable) -> String {
    let identities = table.identities();
    let url_width = table
        .urls()
        .map(|u| u.chars().count())
        .max()
        .unwrap_or(0)
        .max("URLs".len())
        + 1;
    let col_width = identities.iter().map(|i| i.chars().count()).max().unwrap_or(0) + 1;

    let format_line = |first: &str, cells: Vec<String>| -> String {
        let mut line = format!("{:<width$}", first, width = url_width);
        for cell in cells {
            line.push(' ');
            line.push_str(&format!("{:<width$}", cell, width = col_width));
        }
        line.trim_end().to_string()
    };

    let header = format_line(
        "URLs",
        identities.iter().map(|i| i.to_string()).collect(),
    );
    let mut output = String::new();
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"-".repeat(header.chars().count()));
    output.push('\n');

    for (url, row) in &table.rows {
        let cells = identities
            .iter()
            .map(|id| row.get(*id).map_or_else(|| "-".to_string(), Outcome::to_string))
            .collect();
        output.push_str(&format_line(url, cells));
        output.push('\n');
    }
    output
}

pub fn render_json(table: &ResultTable) -> ProbeResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    table.serialize(&mut serializer)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| ProbeError::Config(format!("Non UTF-8 output: {}", e)))
}

/// Writes to `destination`, or to stdout when none is given or the file
/// cannot be created.
pub fn write_output(content: &str, destination: Option<&Path>) -> ProbeResult<()> {
    if let Some(path) = destination {
        match File::create(path) {
            Ok(mut file) => {
                return file
                    .write_all(content.as_bytes())
                    .map_err(|e| ProbeError::io(path, e));
            }
            Err(e) => warn!(
                "Can't open output file {} ({}), writing to stdout",
                path.display(),
                e
            ),
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .and_then(|_| handle.flush())
        .map_err(|e| ProbeError::io("<stdout>", e))
}
