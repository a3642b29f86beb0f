use std::sync::mpsc;

use bytes::Bytes;
use mculink_router::{Envelope, RouterBuilder};

use crate::cmd::{decode_hex, MatchArgs};
use crate::exit::{router_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_matches, OutputFormat};
use crate::routes::RoutesFile;

/// Classify one frame. Exits with `FAILURE` when no message matches.
pub fn run(args: MatchArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = decode_hex(&args.frame)
        .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")))?;
    let routes = RoutesFile::load(&args.routes)?;

    let (tx, _rx) = mpsc::channel::<Envelope<Bytes, ()>>();
    let mut builder: RouterBuilder<Bytes, ()> = routes.builder()?;
    for id in routes.ids() {
        builder
            .bind_router(id, tx.clone())
            .map_err(|err| router_error("bind failed", err))?;
    }
    let router = builder.build();

    let dispatched = router
        .route(frame.clone(), ())
        .map_err(|err| router_error("match failed", err))?;
    let ids = router.matches(&frame);

    print_matches(&frame, &ids, dispatched, format);
    Ok(if ids.is_empty() { FAILURE } else { SUCCESS })
}
