use mculink_frame::FrameWriter;
use mculink_transport::TcpLink;
use tracing::info;

use crate::cmd::{decode_hex, parse_duration, SendArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let parts = decode_parts(&args.parts)?;
    let mut config = args.frame.to_config();
    config.write_timeout = Some(parse_duration(&args.timeout)?);

    // Reject out-of-bounds frames before dialing.
    let total: usize = parts.iter().map(Vec::len).sum();
    config
        .check_len(total as u64)
        .map_err(|err| frame_error("frame rejected", err))?;

    let stream = TcpLink::connect(args.addr.as_str())
        .map_err(|err| transport_error("connect failed", err))?;
    stream
        .set_nodelay(true)
        .map_err(|err| transport_error("connect failed", err))?;
    let mut writer = FrameWriter::with_config_link(stream, config)
        .map_err(|err| frame_error("connect failed", err))?;

    let slices: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
    writer
        .write_frame(&slices)
        .map_err(|err| frame_error("send failed", err))?;

    info!(addr = %args.addr, len = total, parts = slices.len(), "frame sent");
    Ok(SUCCESS)
}

fn decode_parts(parts: &[String]) -> CliResult<Vec<Vec<u8>>> {
    parts
        .iter()
        .map(|part| {
            decode_hex(part).map_err(|err| {
                CliError::new(USAGE, format!("--hex {part:?} is not valid hex: {err}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_parts_keeps_order() {
        let parts = vec!["0003".to_string(), "aa bb".to_string(), "cc".to_string()];
        assert_eq!(
            decode_parts(&parts).unwrap(),
            vec![vec![0x00, 0x03], vec![0xAA, 0xBB], vec![0xCC]]
        );
    }

    #[test]
    fn decode_parts_reports_bad_part() {
        let parts = vec!["00".to_string(), "xyz".to_string()];
        let err = decode_parts(&parts).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("xyz"));
    }
}
