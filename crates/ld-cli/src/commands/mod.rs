//! Command handler modules for ld-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod fill;
pub mod ownership;
pub mod sweep;
pub mod tam;
pub mod waterfall;

use std::str::FromStr;

/// Splits a comma-separated `--title-keywords`/`--locations`/`--keywords`
/// style flag value into a trimmed, non-empty `Vec<String>`.
pub fn split_csv(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_channel(raw: &str) -> anyhow::Result<ld_schemas::Channel> {
    ld_schemas::Channel::from_str(raw).map_err(|e| anyhow::anyhow!(e))
}
