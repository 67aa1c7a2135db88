//! The HTTP scrape endpoint.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1::Builder as HyperHttpBuilder;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::warn;
use vitals::Controller;

use crate::formatting::{render, CONTENT_TYPE as TEXT_CONTENT_TYPE};

/// Errors that can occur while setting up the scrape listener.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Binding or configuring the listen socket failed.
    #[error("failed to create HTTP listener: {0}")]
    FailedToCreateHttpListener(String),
}

/// Error produced by a running scrape listener.
#[derive(Debug)]
pub enum HttpListeningError {
    /// The HTTP server failed.
    Hyper(hyper::Error),
}

/// Convenience type for the future driving the scrape endpoint.
pub type ExporterFuture =
    Pin<Box<dyn Future<Output = Result<(), HttpListeningError>> + Send + 'static>>;

struct HttpListeningExporter {
    controller: Controller,
    listener: TcpListener,
}

impl HttpListeningExporter {
    async fn serve(&self) -> Result<(), hyper::Error> {
        loop {
            let stream = match self.listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = ?e, "Error accepting connection. Ignoring request.");
                    continue;
                }
            };
            self.process_stream(stream);
        }
    }

    fn process_stream(&self, stream: TcpStream) {
        let controller = self.controller.clone();
        let service = service_fn(move |req: Request<Incoming>| {
            let controller = controller.clone();
            async move { Ok::<_, hyper::Error>(handle_http_request(&controller, &req)) }
        });

        tokio::spawn(async move {
            if let Err(err) =
                HyperHttpBuilder::new().serve_connection(TokioIo::new(stream), service).await
            {
                warn!(error = ?err, "Error serving connection.");
            }
        });
    }
}

fn handle_http_request(
    controller: &Controller,
    _req: &Request<Incoming>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::from(render(&controller.snapshot())));
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    response
}

/// Creates a future that serves the Prometheus text exposition for `controller` on
/// `listen_address`, answering GET requests on any path.
///
/// Must be called from within a Tokio runtime. The returned future runs until dropped.
///
/// # Errors
///
/// Returns an error if the listen address cannot be bound.
pub fn new_http_listener(
    controller: Controller,
    listen_address: SocketAddr,
) -> Result<ExporterFuture, BuildError> {
    let listener = std::net::TcpListener::bind(listen_address)
        .and_then(|listener| {
            listener.set_nonblocking(true)?;
            Ok(listener)
        })
        .map_err(|e| BuildError::FailedToCreateHttpListener(e.to_string()))?;
    let listener = TcpListener::from_std(listener)
        .map_err(|e| BuildError::FailedToCreateHttpListener(e.to_string()))?;

    let exporter = HttpListeningExporter { controller, listener };

    Ok(Box::pin(async move { exporter.serve().await.map_err(HttpListeningError::Hyper) }))
}
