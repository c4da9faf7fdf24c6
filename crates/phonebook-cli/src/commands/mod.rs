//! Command handlers

pub mod config;
pub mod insert;
pub mod list;
pub mod search;
pub mod status;
pub mod update;

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse a raw `--doc` payload
///
/// Only checks that it is JSON; whether it is a mapping of strings is up to
/// the table.
pub fn parse_payload(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("--doc is not valid JSON")
}
