//! In-process metrics with a Prometheus-compatible scrape surface and periodic push reporting.
//!
//! `vitals` lets application code declare counters, gauges, and histograms -- optionally
//! parameterized by variable label dimensions -- record observations on them at high frequency,
//! and expose the accumulated state to two kinds of consumers: scrape-style readers that project
//! the whole registry on demand, and a background push loop that periodically emits values into a
//! pluggable [`Sink`].
//!
//! # Overview
//!
//! Everything starts at a [`Registry`]. [`Registry::new`] returns the registry alongside its
//! [`Controller`]; the registry is where metrics are created, and the controller is where
//! consumers read them back out. [`Registry::labeled`] derives views that stamp constant labels
//! onto every metric registered through them, which is the usual way to attach service-wide
//! labels once instead of at every call site.
//!
//! ## Identity
//!
//! The registry enforces global identity rules across everything ever registered through it.
//! Names and labels are scrubbed into the Prometheus character set before comparison, so
//! `foo&bar` and `foo_bar` are the same metric. A metric's identity is its scrubbed name plus its
//! label-name sets; help text and label values are excluded. A name fixes its kind and label-name
//! schema on first use: re-registering with added or removed dimensions fails, while registering
//! the same name and dimensions with different constant label values succeeds (the documented,
//! deliberately inefficient alternative to vectors).
//!
//! ## Scalars and vectors
//!
//! [`Counter`], [`Gauge`], and [`Histogram`] are scalar handles: cheap to clone, lock-free to
//! update, and infallible after registration. [`CounterVector`], [`GaugeVector`], and
//! [`HistogramVector`] materialize families of scalars keyed by variable label values; children
//! are created lazily on first lookup and never evicted. A vector owns its dimensions: scalars
//! that would collide with the series space of a vector are rejected, and vice versa.
//!
//! ## Consumption
//!
//! [`Controller::snapshot`] produces a stable, ordered [`Snapshot`] for serializers (the
//! `vitals-exporter-prometheus` crate renders it in the text exposition format).
//! [`Controller::push`] starts a single background loop that projects all pushable metrics into a
//! [`Sink`] at a fixed interval; at most one loop may run per registry at a time.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use vitals::{HistogramOpts, Labels, Opts, Registry};
//!
//! # fn main() -> Result<(), vitals::Error> {
//! let (root, controller) = Registry::new();
//! let registry = root.labeled(Labels::from([("service".to_string(), "users".to_string())]));
//!
//! let requests = registry.new_counter(Opts::new("requests_total", "Total requests served"))?;
//! requests.inc();
//!
//! let latency = registry.new_histogram(HistogramOpts::new(
//!     Opts::new("request_latency", "Request latency in milliseconds"),
//!     Duration::from_millis(1),
//!     vec![25, 100, 1000],
//! ))?;
//! latency.observe(3);
//!
//! let responses = registry.new_counter_vector(
//!     Opts::new("responses_total", "Responses by status code").variable_labels(["status"]),
//! )?;
//! responses.get(&[("status", "200")])?.inc();
//!
//! let snapshot = controller.snapshot();
//! assert_eq!(snapshot.families.len(), 3);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]
#![cfg_attr(docsrs, deny(rustdoc::broken_intra_doc_links))]

mod digest;
mod error;
mod handles;
mod kind;
mod metadata;
mod opts;
mod push;
mod registry;
mod scrub;
mod snapshot;
mod vector;

pub use self::error::Error;
pub use self::handles::{Counter, Gauge, Histogram};
pub use self::kind::MetricKind;
pub use self::opts::{HistogramOpts, Labels, Opts};
pub use self::push::{Controller, PushHandle, Sink};
pub use self::registry::Registry;
pub use self::scrub::{scrub_label_value, scrub_name};
pub use self::snapshot::{HistogramSnapshot, MetricFamily, Sample, SampleValue, Snapshot};
pub use self::vector::{CounterVector, GaugeVector, HistogramVector};
