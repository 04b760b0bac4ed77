// File: response.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use reqwest::header::HeaderMap;

/// Fully buffered response. The body is read eagerly so that login checks
/// and CSRF scraping never hold a connection open.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    body: String,
    headers: HeaderMap,
    status: u16,
    url: String,
}

impl ProbeResponse {
    pub fn new(headers: HeaderMap, body: String, status: u16, url: String) -> Self {
        ProbeResponse {
            body,
            headers,
            status,
            url,
        }
    }

    pub(crate) async fn from_reqwest(resp: reqwest::Response) -> reqwest::Result<Self> {
        let url = resp.url().to_string();
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await?;
        Ok(Self::new(headers, body, status, url))
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
