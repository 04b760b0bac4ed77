// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::config::{LoginMethod, RunConfig, DEFAULT_PROXY};

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = "With a list of users, a list of URLs and a target host, request every URL \
                  as every user and print the status codes as a table or as JSON. Arguments \
                  can also come from a JSON configuration file, whose values win.",
    group(ArgGroup::new("login_check").args(["login_code", "login_text"]))
)]
pub struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        help = "JSON configuration file, overrides command line arguments"
    )]
    pub config: Option<PathBuf>,

    #[arg(help = "Target host, optionally with port")]
    pub host: Option<String>,

    #[arg(help = "File containing the list of users (';' separated: username;password;role)")]
    pub users: Option<PathBuf>,

    #[arg(help = "File containing the list of URLs, one per line")]
    pub urls: Option<PathBuf>,

    #[arg(long = "login-path", default_value = "/login")]
    pub login_path: String,

    #[arg(long = "id-field", default_value = "email", help = "Name of the id field in the login request")]
    pub id_field: String,

    #[arg(long = "pwd-field", default_value = "password", help = "Name of the password field in the login request")]
    pub pwd_field: String,

    #[arg(long = "login-code", help = "Status code of a valid login response [default: 200]")]
    pub login_code: Option<u16>,

    #[arg(long = "login-text", help = "Text present in the page after a valid login")]
    pub login_text: Option<String>,

    #[arg(long = "login-method", value_enum, default_value_t = LoginMethod::Form)]
    pub login_method: LoginMethod,

    #[arg(long = "csrf", help = "Fetch a CSRF token from the login page first")]
    pub csrf: bool,

    #[arg(long = "csrf-class", default_value = "input", help = "Tag of the CSRF token element")]
    pub csrf_class: String,

    #[arg(long = "csrf-name", default_value = "csrf", help = "Name of the CSRF token element")]
    pub csrf_name: String,

    #[arg(long = "json-body", help = "Send login credentials as JSON instead of a form")]
    pub json_body: bool,

    #[arg(short = 'o', long = "out", help = "Store the output in this file")]
    pub out: Option<PathBuf>,

    #[arg(
        short = 'w',
        long = "wait",
        default_value_t = 1,
        help = "Seconds to wait between requests to limit the rate"
    )]
    pub wait: u64,

    #[arg(long = "limit-users", help = "Test at most this many users")]
    pub limit_users: Option<usize>,

    #[arg(long = "limit-urls", help = "Test at most this many URLs")]
    pub limit_urls: Option<usize>,

    #[arg(
        short = 't',
        long = "timeout",
        default_value_t = 5,
        help = "HTTP request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        short = 'm',
        long = "max-retries",
        default_value_t = 3,
        help = "Retries for a request answered with 502"
    )]
    pub max_retries: u32,

    #[arg(short = 'p', long = "proxy", help = "Send traffic through the proxy")]
    pub proxy: bool,

    #[arg(long = "proxy-addr", default_value = DEFAULT_PROXY)]
    pub proxy_addr: String,

    #[arg(short = 'v', long = "verbose", help = "Show info and warning messages")]
    pub verbose: bool,

    #[arg(short = 'd', long = "debug", help = "Show debug messages")]
    pub debug: bool,

    #[arg(short = 'q', long = "quiet", help = "Only errors, no progress or summary")]
    pub quiet: bool,

    #[arg(short = 'j', long = "json", help = "Write results as JSON")]
    pub json: bool,

    #[arg(long = "allow-redirect", help = "Follow redirections")]
    pub allow_redirect: bool,

    #[arg(long = "disable-unauth", help = "Skip the unauthenticated pass")]
    pub disable_unauth: bool,

    #[arg(long = "disable-https", help = "Use plain HTTP")]
    pub disable_https: bool,

    #[arg(long = "no-color", help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            host: self.host.clone(),
            users: self.users.clone(),
            urls: self.urls.clone(),
            login_path: self.login_path.clone(),
            id_field: self.id_field.clone(),
            pwd_field: self.pwd_field.clone(),
            login_code: self.login_code,
            login_text: self.login_text.clone(),
            login_method: if self.csrf {
                LoginMethod::Csrf
            } else {
                self.login_method
            },
            csrf_class: self.csrf_class.clone(),
            csrf_name: self.csrf_name.clone(),
            json_body: self.json_body,
            out: self.out.clone(),
            wait: self.wait,
            limit_users: self.limit_users,
            limit_urls: self.limit_urls,
            timeout: self.timeout,
            max_retries: self.max_retries,
            proxy: self.proxy,
            proxy_addr: self.proxy_addr.clone(),
            json: self.json,
            allow_redirect: self.allow_redirect,
            disable_unauth: self.disable_unauth,
            disable_https: self.disable_https,
            verbose: self.verbose,
            debug: self.debug,
            quiet: self.quiet,
        }
    }

    /// Nothing to work with: no configuration file and not every positional.
    pub fn missing_required(&self) -> bool {
        self.config.is_none() && (self.host.is_none() || self.users.is_none() || self.urls.is_none())
    }
}
