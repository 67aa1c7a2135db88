//! A Prometheus scrape surface for [`vitals`] registries.
//!
//! This crate consumes the stable snapshots produced by a [`vitals::Controller`] and exposes them
//! two ways: [`render`] turns a snapshot into the text exposition format, byte-compatible with
//! the official Prometheus clients, and [`new_http_listener`] serves that rendering over HTTP
//! with the standard `text/plain; version=0.0.4` content type.
//!
//! # Example
//!
//! ```no_run
//! use vitals::{Opts, Registry};
//! use vitals_exporter_prometheus::new_http_listener;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (root, controller) = Registry::new();
//! root.new_counter(Opts::new("requests_total", "Total requests served"))?.inc();
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
//! let _guard = runtime.enter();
//! let exporter = new_http_listener(controller, ([127, 0, 0, 1], 9090).into())?;
//! let _ = runtime.block_on(exporter);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]
#![cfg_attr(docsrs, deny(rustdoc::broken_intra_doc_links))]

mod formatting;
mod http;

pub use self::formatting::{render, CONTENT_TYPE};
pub use self::http::{new_http_listener, BuildError, ExporterFuture, HttpListeningError};
