//! # zkt-cli: Command-Line Tool for zkthreads
//!
//! ## Subcommands
//!
//! - `zkt demo`: run the reference discussion with mock identities and
//!   print every event as a JSON line.
//! - `zkt replay LOG`: apply a JSON transaction log to a fresh core.
//! - `zkt inspect STATE`: summarize a snapshot file.
//!
//! ```bash
//! zkt demo --write-log demo.json
//! zkt replay demo.json --state-out state.json
//! zkt inspect state.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; protocol logic lives in `zkt-protocol`.
//! - Events and rejections go to stdout as JSON lines. Logs go to stderr.

pub mod demo;
pub mod inspect;
pub mod replay;
pub mod tx;

use std::path::Path;

use anyhow::{Context, Result};

use zkt_protocol::ProtocolConfig;

/// Owner used when no config file is given.
pub const DEFAULT_OWNER: &str = "0xowner";

/// Load a YAML config, or the defaults owned by [`DEFAULT_OWNER`].
pub fn load_config(path: Option<&Path>) -> Result<ProtocolConfig> {
    let Some(path) = path else {
        return Ok(ProtocolConfig::new(DEFAULT_OWNER));
    };
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ProtocolConfig::from_yaml_str(&yaml)
        .with_context(|| format!("invalid config {}", path.display()))
}
