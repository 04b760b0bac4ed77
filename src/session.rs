// File: session.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::decorator::RequestDecorator;
use crate::errors::{ProbeError, ProbeResult};
use crate::response::ProbeResponse;
use indexmap::IndexMap;
use log::{debug, trace};
use reqwest::{redirect, Client, Method, Proxy};
use std::fmt;
use std::time::Duration;

pub type FormFields = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub host: String,
    pub scheme: Scheme,
    /// `host:port` used for both http and https traffic
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub allow_redirect: bool,
    pub json_body: bool,
}

/// One identity's connection context: cookie jar, optional per-request
/// credentials and the authenticated flag. Never shared between identities.
pub struct Session {
    options: SessionOptions,
    client: Client,
    decorator: Option<RequestDecorator>,
    authenticated: bool,
}

impl Session {
    pub fn new(options: SessionOptions) -> ProbeResult<Self> {
        let client = build_client(&options)?;
        Ok(Session {
            options,
            client,
            decorator: None,
            authenticated: false,
        })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.options.scheme, self.options.host, path)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    pub fn decorator(&self) -> Option<&RequestDecorator> {
        self.decorator.as_ref()
    }

    pub fn set_decorator(&mut self, decorator: RequestDecorator) {
        self.decorator = Some(decorator);
    }

    pub fn clear_decorator(&mut self) {
        self.decorator = None;
    }

    pub async fn get(&mut self, path: &str) -> ProbeResult<ProbeResponse> {
        let mut decorator = self.decorator.take();
        let result = self.send(Method::GET, path, None, decorator.as_mut()).await;
        self.decorator = decorator;
        result
    }

    /// GET with an explicit decorator instead of the bound one. Used while a
    /// login attempt is still unconfirmed.
    pub async fn get_with(
        &self,
        path: &str,
        decorator: &mut RequestDecorator,
    ) -> ProbeResult<ProbeResponse> {
        self.send(Method::GET, path, None, Some(decorator)).await
    }

    pub async fn post(&mut self, path: &str, fields: &FormFields) -> ProbeResult<ProbeResponse> {
        let mut decorator = self.decorator.take();
        let result = self
            .send(Method::POST, path, Some(fields), decorator.as_mut())
            .await;
        self.decorator = decorator;
        result
    }

    /// Drops cookies, bound credentials and the authenticated flag by
    /// replacing the client. Proxy, timeout and redirect settings survive.
    pub fn reset(&mut self) -> ProbeResult<()> {
        debug!("Resetting session for {}", self.options.host);
        self.client = build_client(&self.options)?;
        self.decorator = None;
        self.authenticated = false;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        fields: Option<&FormFields>,
        decorator: Option<&mut RequestDecorator>,
    ) -> ProbeResult<ProbeResponse> {
        let url = self.url(path);
        trace!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(fields) = fields {
            request = if self.options.json_body {
                request.json(fields)
            } else {
                request.form(fields)
            };
        }
        if let Some(decorator) = decorator {
            if let Some((name, value)) = decorator.header(method.as_str(), path) {
                request = request.header(name, value);
            }
        }

        let response = request.send().await?;
        let response = ProbeResponse::from_reqwest(response).await?;
        trace!("{} {} -> {}", method, url, response.status());
        Ok(response)
    }
}

fn build_client(options: &SessionOptions) -> ProbeResult<Client> {
    let policy = if options.allow_redirect {
        redirect::Policy::limited(10)
    } else {
        redirect::Policy::none()
    };

    let mut builder = Client::builder()
        .cookie_store(true)
        .timeout(options.timeout)
        .redirect(policy);

    if let Some(addr) = &options.proxy {
        let proxy_url = if addr.contains("://") {
            addr.clone()
        } else {
            format!("http://{}", addr)
        };
        let proxy = Proxy::all(&proxy_url)
            .map_err(|e| ProbeError::Config(format!("Invalid proxy {}: {}", addr, e)))?;
        builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| ProbeError::Config(format!("Failed to build HTTP client: {}", e)))
}
