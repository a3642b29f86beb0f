use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mculink_router::{Envelope, MessageId};
use serde::Serialize;

/// A routed frame as the `listen` printer receives it; the context is the peer address.
pub type Routed = Envelope<Bytes, std::sync::Arc<str>>;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RoutedOutput<'a> {
    id: &'a str,
    peer: &'a str,
    size: usize,
    frame: String,
    timestamp: String,
}

pub fn print_routed(routed: &Routed, format: OutputFormat) {
    let frame = routed.message.as_ref();
    match format {
        OutputFormat::Json => {
            let out = RoutedOutput {
                id: routed.id.as_str(),
                peer: &routed.context,
                size: frame.len(),
                frame: hex::encode(frame),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "SIZE", "PEER", "FRAME"])
                .add_row(vec![
                    routed.id.to_string(),
                    frame.len().to_string(),
                    routed.context.to_string(),
                    hex_preview(frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} size={} peer={} frame={}",
                routed.id,
                frame.len(),
                routed.context,
                hex_preview(frame)
            );
        }
        OutputFormat::Raw => print_raw(frame),
    }
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    frame: String,
    matches: Vec<&'a str>,
    dispatched: usize,
}

pub fn print_matches(frame: &[u8], ids: &[MessageId], dispatched: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MatchOutput {
                frame: hex::encode(frame),
                matches: ids.iter().map(MessageId::as_str).collect(),
                dispatched,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["MESSAGE", "FRAME"]);
            for id in ids {
                table.add_row(vec![id.to_string(), hex_preview(frame)]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if ids.is_empty() {
                println!("no match for {}", hex_preview(frame));
            } else {
                let names: Vec<&str> = ids.iter().map(MessageId::as_str).collect();
                println!("{} ({dispatched} dispatched)", names.join(", "));
            }
        }
        OutputFormat::Raw => {
            for id in ids {
                println!("{id}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Space-separated uppercase hex, cut after 32 bytes.
fn hex_preview(frame: &[u8]) -> String {
    const PREVIEW_LEN: usize = 32;
    let shown = &frame[..frame.len().min(PREVIEW_LEN)];
    let mut text = shown
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    if frame.len() > PREVIEW_LEN {
        text.push_str(&format!(" .. (+{} bytes)", frame.len() - PREVIEW_LEN));
    }
    text
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
