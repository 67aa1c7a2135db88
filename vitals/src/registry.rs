use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::digest::series_digest;
use crate::error::Error;
use crate::handles::{Counter, Gauge, Histogram};
use crate::kind::MetricKind;
use crate::metadata::{HistogramShape, Metadata};
use crate::opts::{HistogramOpts, Labels, Opts};
use crate::push::Controller;
use crate::scrub::{scrub_label_value, scrub_name};
use crate::vector::{CounterVector, GaugeVector, HistogramVector};

/// The root of a metric hierarchy.
///
/// A registry owns every metric created through it and enforces the identity rules: no two
/// registrations may share a scrubbed name and full label set, a name fixes its label-name schema
/// and kind on first use, and the series space claimed by a vector is off limits to scalars (and
/// vice versa).
///
/// Registration is serialized behind a single lock and is the only fallible path; once a handle is
/// returned, observations on it are lock-free and cannot fail. Registries are cheap to clone and
/// clones share state; [`Registry::labeled`] derives views that stamp inherited constant labels
/// onto everything registered through them.
#[derive(Clone, Debug)]
pub struct Registry {
    shared: Arc<Shared>,
    /// Scrubbed constant labels inherited by every registration through this view.
    constant_labels: Vec<(String, String)>,
}

impl Registry {
    /// Creates a fresh registry and the controller that drains it.
    ///
    /// The two share state by construction: the controller projects snapshots of, and pushes,
    /// exactly the metrics registered through the returned registry (or any view derived from
    /// it).
    pub fn new() -> (Registry, Controller) {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            pushing: AtomicBool::new(false),
        });
        let registry = Registry { shared: Arc::clone(&shared), constant_labels: Vec::new() };
        (registry, Controller::new(shared))
    }

    /// Returns a view of this registry that adds `labels` to every metric registered through it.
    ///
    /// Labels are scrubbed immediately. A key that collides (after scrubbing) with a label already
    /// on this view replaces it, so narrower scopes win; a collision with a registration's own
    /// `opts.labels` is reported as an error by the registration itself.
    pub fn labeled(&self, labels: Labels) -> Registry {
        let mut constant_labels = self.constant_labels.clone();
        for (label, value) in &labels {
            let scrubbed = scrub_name(label);
            let value = scrub_label_value(value);
            match constant_labels.iter().position(|(existing, _)| *existing == scrubbed) {
                Some(idx) => constant_labels[idx].1 = value,
                None => constant_labels.push((scrubbed, value)),
            }
        }
        Registry { shared: Arc::clone(&self.shared), constant_labels }
    }

    /// Creates and registers a counter.
    pub fn new_counter(&self, opts: Opts) -> Result<Counter, Error> {
        let metadata = self.scalar_metadata(opts)?;
        let counter = Counter::new(metadata, Vec::new());
        self.shared.register(MetricKind::Counter, AnyMetric::Counter(counter.clone()))?;
        Ok(counter)
    }

    /// Creates and registers a gauge.
    pub fn new_gauge(&self, opts: Opts) -> Result<Gauge, Error> {
        let metadata = self.scalar_metadata(opts)?;
        let gauge = Gauge::new(metadata, Vec::new());
        self.shared.register(MetricKind::Gauge, AnyMetric::Gauge(gauge.clone()))?;
        Ok(gauge)
    }

    /// Creates and registers a histogram.
    pub fn new_histogram(&self, opts: HistogramOpts) -> Result<Histogram, Error> {
        let HistogramOpts { opts, unit, buckets } = opts;
        let metadata = self.scalar_metadata(opts)?;
        let shape = Arc::new(HistogramShape::new(&metadata.name, unit, buckets)?);
        let histogram = Histogram::new(metadata, shape, Vec::new());
        self.shared.register(MetricKind::Histogram, AnyMetric::Histogram(histogram.clone()))?;
        Ok(histogram)
    }

    /// Creates and registers a counter vector. `opts.variable_labels` must be non-empty.
    pub fn new_counter_vector(&self, opts: Opts) -> Result<CounterVector, Error> {
        let metadata = self.vector_metadata(opts)?;
        let vector = CounterVector::new(metadata);
        self.shared.register(MetricKind::Counter, AnyMetric::CounterVector(vector.clone()))?;
        Ok(vector)
    }

    /// Creates and registers a gauge vector. `opts.variable_labels` must be non-empty.
    pub fn new_gauge_vector(&self, opts: Opts) -> Result<GaugeVector, Error> {
        let metadata = self.vector_metadata(opts)?;
        let vector = GaugeVector::new(metadata);
        self.shared.register(MetricKind::Gauge, AnyMetric::GaugeVector(vector.clone()))?;
        Ok(vector)
    }

    /// Creates and registers a histogram vector. `opts.variable_labels` must be non-empty.
    pub fn new_histogram_vector(&self, opts: HistogramOpts) -> Result<HistogramVector, Error> {
        let HistogramOpts { opts, unit, buckets } = opts;
        let metadata = self.vector_metadata(opts)?;
        let shape = Arc::new(HistogramShape::new(&metadata.name, unit, buckets)?);
        let vector = HistogramVector::new(metadata, shape);
        self.shared.register(MetricKind::Histogram, AnyMetric::HistogramVector(vector.clone()))?;
        Ok(vector)
    }

    fn scalar_metadata(&self, opts: Opts) -> Result<Arc<Metadata>, Error> {
        if !opts.variable_labels.is_empty() {
            return Err(Error::VariableLabelsForbidden { metric: scrub_name(&opts.name) });
        }
        Ok(Arc::new(Metadata::from_opts(opts, &self.constant_labels)?))
    }

    fn vector_metadata(&self, opts: Opts) -> Result<Arc<Metadata>, Error> {
        if opts.variable_labels.is_empty() {
            return Err(Error::VariableLabelsMissing { metric: scrub_name(&opts.name) });
        }
        Ok(Arc::new(Metadata::from_opts(opts, &self.constant_labels)?))
    }
}

/// State shared between a registry (and all of its views) and its controller.
#[derive(Debug)]
pub(crate) struct Shared {
    /// The registration lock. Contention here is rare and never on the observation hot path.
    state: Mutex<State>,
    /// Single-flight guard for the push loop.
    pub(crate) pushing: AtomicBool,
}

#[derive(Debug, Default)]
struct State {
    /// Identity bookkeeping per scrubbed metric name.
    names: HashMap<String, NameEntry>,
    /// Every registered metric, in registration order.
    metrics: Vec<AnyMetric>,
}

#[derive(Debug)]
struct NameEntry {
    /// The kind bound to this name. A Prometheus family never mixes types.
    kind: MetricKind,
    /// Sorted union of constant and variable label names; fixed on first registration.
    schema: Vec<String>,
    /// Registered series, indexed by identity digest. The digest is a hint; membership is always
    /// reconfirmed by comparing the stored series fields.
    series: HashMap<u64, Vec<SeriesInfo>>,
}

/// The identity-relevant remainder of a registration once name, kind, and schema agree.
#[derive(Debug, PartialEq)]
struct SeriesInfo {
    /// Scrubbed constant labels, sorted by name.
    constant_labels: Vec<(String, String)>,
    /// Scrubbed variable label names in sorted order; empty for scalars.
    variable_labels: Vec<String>,
}

impl SeriesInfo {
    fn is_scalar(&self) -> bool {
        self.variable_labels.is_empty()
    }

    /// Whether the series spaces of `self` and `other` intersect, assuming both are registered
    /// under the same name and schema. Any label name constant on both sides must then agree on
    /// its value; names constant on only one side are variable on the other and match anything.
    fn overlaps(&self, other: &SeriesInfo) -> bool {
        self.constant_labels.iter().all(|(label, value)| {
            other
                .constant_labels
                .iter()
                .find(|(other_label, _)| other_label == label)
                .map_or(true, |(_, other_value)| other_value == value)
        })
    }
}

impl Shared {
    fn register(&self, kind: MetricKind, metric: AnyMetric) -> Result<(), Error> {
        let metadata = Arc::clone(metric.metadata());
        let schema = metadata.schema();
        let series = SeriesInfo {
            constant_labels: metadata.constant_labels.clone(),
            variable_labels: metadata.sorted_variable_labels(),
        };
        let digest = series_digest(&metadata.name, &series.constant_labels, &series.variable_labels);

        let mut state = self.state.lock();
        if let Some(entry) = state.names.get_mut(&metadata.name) {
            if entry.schema != schema {
                return Err(Error::DimensionMismatch { metric: metadata.name.clone() });
            }
            if entry.kind != kind {
                return Err(Error::IdentityConflict { metric: metadata.name.clone() });
            }
            if let Some(existing) = entry.series.get(&digest) {
                if existing.contains(&series) {
                    return Err(Error::IdentityConflict { metric: metadata.name.clone() });
                }
            }
            // Vectors own dimensions: a new series may not intersect the space of any existing
            // series unless both are scalars (equal scalars were already rejected above).
            for existing in entry.series.values().flatten() {
                let both_scalar = existing.is_scalar() && series.is_scalar();
                if !both_scalar && existing.overlaps(&series) {
                    return Err(Error::VectorOwnership { metric: metadata.name.clone() });
                }
            }
            entry.series.entry(digest).or_default().push(series);
        } else {
            let mut by_digest = HashMap::new();
            by_digest.insert(digest, vec![series]);
            state
                .names
                .insert(metadata.name.clone(), NameEntry { kind, schema, series: by_digest });
        }
        state.metrics.push(metric);
        Ok(())
    }

    /// Clones out the metric list. Handles are `Arc`-backed, so this is cheap and the lock is
    /// never held while metric values are read.
    pub(crate) fn metrics(&self) -> Vec<AnyMetric> {
        self.state.lock().metrics.clone()
    }
}

/// A registered metric of any kind, as stored by the registry and walked by snapshots.
#[derive(Clone, Debug)]
pub(crate) enum AnyMetric {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
    CounterVector(CounterVector),
    GaugeVector(GaugeVector),
    HistogramVector(HistogramVector),
}

impl AnyMetric {
    pub(crate) fn metadata(&self) -> &Arc<Metadata> {
        match self {
            AnyMetric::Counter(metric) => metric.metadata(),
            AnyMetric::Gauge(metric) => metric.metadata(),
            AnyMetric::Histogram(metric) => metric.metadata(),
            AnyMetric::CounterVector(metric) => metric.metadata(),
            AnyMetric::GaugeVector(metric) => metric.metadata(),
            AnyMetric::HistogramVector(metric) => metric.metadata(),
        }
    }

    pub(crate) fn kind(&self) -> MetricKind {
        match self {
            AnyMetric::Counter(_) | AnyMetric::CounterVector(_) => MetricKind::Counter,
            AnyMetric::Gauge(_) | AnyMetric::GaugeVector(_) => MetricKind::Gauge,
            AnyMetric::Histogram(_) | AnyMetric::HistogramVector(_) => MetricKind::Histogram,
        }
    }
}
