mod cmd;
mod exit;
mod logging;
mod output;
mod routes;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "mculink", version, about = "MCU telemetry framing and routing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listen_with_frame_layout() {
        let cli = Cli::try_parse_from([
            "mculink",
            "listen",
            "127.0.0.1:7000",
            "--routes",
            "routes.json",
            "--offset",
            "2",
            "--size",
            "1",
            "--little-endian",
            "--count",
            "3",
        ])
        .expect("listen args should parse");

        let Command::Listen(args) = cli.command else {
            panic!("expected listen");
        };
        assert_eq!(args.frame.offset, 2);
        assert_eq!(args.frame.size, 1);
        assert!(args.frame.little_endian);
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn parses_send_with_multiple_parts() {
        let cli = Cli::try_parse_from([
            "mculink", "send", "127.0.0.1:7000", "--hex", "0003", "aabbcc",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.parts, vec!["0003", "aabbcc"]);
        assert_eq!(args.frame.size, 2);
    }

    #[test]
    fn send_requires_hex() {
        let err = Cli::try_parse_from(["mculink", "send", "127.0.0.1:7000"])
            .expect_err("missing --hex should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unsupported_field_size() {
        let err = Cli::try_parse_from([
            "mculink", "listen", "127.0.0.1:0", "--routes", "r.json", "--size", "3",
        ])
        .expect_err("size 3 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_match_subcommand() {
        let cli = Cli::try_parse_from([
            "mculink", "--format", "raw", "match", "--routes", "r.json", "--hex", "0003aa",
        ])
        .expect("match args should parse");
        assert!(matches!(cli.command, Command::Match(_)));
        assert_eq!(cli.format, Some(OutputFormat::Raw));
    }
}
