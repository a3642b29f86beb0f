use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use mculink_frame::{FrameConfig, FrameError, FrameReader};
use mculink_router::MaskRouter;
use mculink_transport::{LinkStream, TcpLink};
use tracing::{debug, info, trace, warn};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{io_error, router_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_routed, OutputFormat, Routed};
use crate::routes::RoutesFile;

type SharedRouter = Arc<MaskRouter<Bytes, Arc<str>>>;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let routes = RoutesFile::load(&args.routes)?;
    let mut config = args.frame.to_config();
    if let Some(idle) = &args.idle_timeout {
        config.read_timeout = Some(parse_duration(idle)?);
    }

    let (tx, rx) = mpsc::channel::<Routed>();
    let mut builder = routes.builder()?;
    for id in routes.ids() {
        builder
            .bind_router(id, tx.clone())
            .map_err(|err| router_error("bind failed", err))?;
    }
    drop(tx);
    let router: SharedRouter = Arc::new(builder.build());

    let listener = TcpLink::bind(&args.addr).map_err(|err| transport_error("bind failed", err))?;
    info!(
        addr = %listener.local_addr(),
        transport = listener.transport_name(),
        offset = config.length_field_offset(),
        size = config.length_field_size(),
        "routing device frames"
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let acceptor = thread::Builder::new()
        .name("accept".to_string())
        .spawn(move || accept_loop(listener, config, router))
        .map_err(|err| io_error("failed to start accept thread", err))?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let routed = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(routed) => routed,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        print_routed(&routed, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    if acceptor.is_finished() {
        return match acceptor.join() {
            Ok(result) => result.map(|()| SUCCESS),
            Err(_) => Err(CliError::new(INTERNAL, "accept thread panicked")),
        };
    }
    Ok(SUCCESS)
}

fn accept_loop(listener: TcpLink, config: FrameConfig, router: SharedRouter) -> CliResult<()> {
    loop {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let peer: Arc<str> = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
            .into();

        let config = config.clone();
        let router = Arc::clone(&router);
        let spawned = thread::Builder::new()
            .name(peer.to_string())
            .spawn(move || serve_connection(stream, peer, config, router));
        if let Err(err) = spawned {
            warn!(error = %err, "failed to start connection thread");
        }
    }
}

/// Read and route frames until the peer leaves or the stream desyncs.
fn serve_connection(
    stream: LinkStream,
    peer: Arc<str>,
    config: FrameConfig,
    router: SharedRouter,
) {
    let mut reader = match FrameReader::with_config_link(stream, config) {
        Ok(reader) => reader,
        Err(err) => {
            warn!(%peer, error = %err, "failed to configure connection");
            return;
        }
    };
    debug!(%peer, "connection opened");

    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => {
                debug!(%peer, "connection closed");
                return;
            }
            Err(err) => {
                warn!(%peer, error = %err, "closing connection after framing error");
                return;
            }
        };

        let len = frame.len();
        match router.route(frame, Arc::clone(&peer)) {
            Ok(0) => trace!(%peer, len, "frame matched no message"),
            Ok(dispatched) => trace!(%peer, len, dispatched, "frame routed"),
            Err(err) => warn!(%peer, error = %err, "frame not routed"),
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
