// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]
#![allow(clippy::bool_assert_comparison)]

pub mod cli;
pub mod config;
pub mod decorator;
pub mod digest;
pub mod errors;
pub mod login;
pub mod orchestrator;
pub mod report;
pub mod response;
pub mod session;
pub mod stats;
pub mod targets;
