use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use mculink_frame::{
    ByteOrder, FrameConfig, DEFAULT_LENGTH_FIELD_SIZE, DEFAULT_MAX_PAYLOAD, DEFAULT_MIN_PAYLOAD,
};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod listen;
pub mod matches;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept device connections and print routed frames.
    Listen(ListenArgs),
    /// Send one already-shaped frame.
    Send(SendArgs),
    /// Classify a frame against a routes file without a connection.
    #[command(name = "match")]
    Match(MatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Match(args) => matches::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Length-field layout shared by `listen` and `send`.
#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Bytes in front of the length field.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Length field width in bytes (1, 2 or 4).
    #[arg(long, default_value_t = DEFAULT_LENGTH_FIELD_SIZE, value_parser = parse_field_size)]
    pub size: usize,
    /// Smallest accepted length value.
    #[arg(long, default_value_t = DEFAULT_MIN_PAYLOAD)]
    pub min_len: u32,
    /// Largest accepted length value.
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_len: u32,
    /// Length field is little-endian (default big-endian).
    #[arg(long)]
    pub little_endian: bool,
}

impl FrameArgs {
    pub fn to_config(&self) -> FrameConfig {
        let byte_order = if self.little_endian {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        let mut config = FrameConfig::default();
        config.configure(self.offset, self.size, self.min_len, self.max_len, byte_order);
        config
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind, e.g. 0.0.0.0:7000.
    pub addr: String,
    /// Routes file (JSON) naming each message and its masks.
    #[arg(long, value_name = "FILE")]
    pub routes: PathBuf,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Drop a connection that stays silent this long (e.g. 30s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub idle_timeout: Option<String>,
    /// Exit after printing N routed messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to.
    pub addr: String,
    /// Frame parts as hex, concatenated in order.
    #[arg(long = "hex", value_name = "HEX", required = true, num_args = 1..)]
    pub parts: Vec<String>,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Write timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Routes file (JSON) naming each message and its masks.
    #[arg(long, value_name = "FILE")]
    pub routes: PathBuf,
    /// Frame bytes as hex, header included.
    #[arg(long = "hex", value_name = "HEX")]
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_field_size(input: &str) -> Result<usize, String> {
    match input.parse::<usize>() {
        Ok(size @ (1 | 2 | 4)) => Ok(size),
        _ => Err(format!("length field size must be 1, 2 or 4, got {input}")),
    }
}

/// Decode a hex argument. Accepts an optional `0x` prefix and ignores
/// spaces, `:` and `_` between digits.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let cleaned: String = digits
        .chars()
        .filter(|c| !matches!(c, ' ' | ':' | '_'))
        .collect();
    hex::decode(cleaned)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
