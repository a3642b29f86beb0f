//! Routes file: which message ids exist and which masks select them.
//!
//! ```json
//! { "messages": [ { "id": "Heartbeat", "masks": ["0000aa", "0000ab"] } ] }
//! ```

use std::convert;
use std::fs;
use std::path::Path;

use bytes::Bytes;
use mculink_router::{ProtocolMask, RouterBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::cmd::decode_hex;
use crate::exit::{io_error, router_error, CliError, CliResult, DATA_INVALID};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesFile {
    pub messages: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    pub id: String,
    #[serde(default)]
    pub masks: Vec<String>,
}

impl RoutesFile {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        let routes = Self::parse(&text)
            .map_err(|err| CliError::new(err.code, format!("{}: {}", path.display(), err)))?;
        debug!(path = %path.display(), messages = routes.messages.len(), "routes loaded");
        Ok(routes)
    }

    pub fn parse(text: &str) -> CliResult<Self> {
        serde_json::from_str(text)
            .map_err(|err| CliError::new(DATA_INVALID, format!("invalid routes file: {err}")))
    }

    /// Register every entry; matched messages carry the whole frame.
    pub fn builder<C>(&self) -> CliResult<RouterBuilder<Bytes, C>> {
        let mut builder = RouterBuilder::new();
        for entry in &self.messages {
            let masks = entry
                .masks
                .iter()
                .map(|mask| {
                    decode_hex(mask).map(ProtocolMask::from).map_err(|err| {
                        CliError::new(
                            DATA_INVALID,
                            format!("message {}: invalid mask {mask:?}: {err}", entry.id),
                        )
                    })
                })
                .collect::<CliResult<Vec<_>>>()?;
            builder
                .register(&entry.id, masks, convert::identity)
                .map_err(|err| router_error("invalid routes", err))?;
        }
        Ok(builder)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|entry| entry.id.as_str())
    }
}
