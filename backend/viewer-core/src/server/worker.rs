//! Accept loop run on the dedicated server thread.
//!
//! Connections are served one at a time: the loop does not accept the next connection until
//! the current one is finished. Keep-alive is disabled so every connection carries exactly
//! one request, and a connection that has not delivered its request head within
//! [`HEADER_READ_TIMEOUT`] is dropped, so an idle preconnect socket cannot pin the worker.

use crate::server::context::ServerContext;
use crate::server::router;

use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Duration;

use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep as TokioSleep;
use tokio_util::sync::CancellationToken;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) async fn accept_loop(
    listener: StdTcpListener,
    context: Arc<ServerContext>,
    cancel: CancellationToken,
) {
    let listener = match TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to register listener with the runtime: {e}");
            return;
        }
    };

    if let Ok(address) = listener.local_addr() {
        info!("File server accepting on http://{address}/");
    }

    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(_) if cancel.is_cancelled() => break,
            Err(e) => {
                warn!("Accept failed: {e}");
                TokioSleep(ACCEPT_ERROR_BACKOFF).await;
                continue;
            }
        };

        if !peer.ip().is_loopback() {
            warn!("Rejected non-loopback connection from {peer}");
            continue;
        }

        serve_connection(stream, peer, &context, &cancel).await;
    }

    debug!("Accept loop exited, closing listener");
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    context: &Arc<ServerContext>,
    cancel: &CancellationToken,
) {
    let context = Arc::clone(context);
    let service = service_fn(move |request: Request<Incoming>| {
        let response = router::handle(&context, request.method(), request.uri());
        async move { Ok::<_, Infallible>(response) }
    });

    let connection = http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(HEADER_READ_TIMEOUT)
        .keep_alive(false)
        .serve_connection(TokioIo::new(stream), service);

    tokio::select! {
        result = connection => {
            if let Err(e) = result {
                debug!("Connection from {peer} ended with error: {e}");
            }
        }
        _ = cancel.cancelled() => debug!("Dropping connection from {peer} for shutdown"),
    }
}
