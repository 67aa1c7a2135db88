use std::time::Duration;

use indexmap::IndexMap;

/// Constant labels supplied at registration time, keyed by label name.
///
/// Both names and values are scrubbed before registration; insertion order is irrelevant to a
/// metric's identity (labels are sorted once scrubbed).
pub type Labels = IndexMap<String, String>;

/// Options common to every metric constructor.
///
/// `name` and `help` are mandatory. Everything else defaults to empty/off. These are the only
/// recognized configuration fields; there is no open-ended option bag.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Metric name. Scrubbed into the Prometheus name grammar; must be non-empty after scrubbing.
    pub name: String,
    /// Human-readable description. Mandatory, but not part of the metric's identity.
    pub help: String,
    /// Constant labels baked into every sample of this metric.
    pub labels: Labels,
    /// Ordered variable label names. Only vector constructors accept these; the order defines the
    /// positional meaning of child value tuples.
    pub variable_labels: Vec<String>,
    /// If true, the metric is visible to scrapes but skipped by the push loop.
    pub disable_push: bool,
}

impl Opts {
    /// Creates options with the given name and help text.
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Opts { name: name.into(), help: help.into(), ..Opts::default() }
    }

    /// Adds a constant label.
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Sets the variable label names for a vector registration.
    pub fn variable_labels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variable_labels = names.into_iter().map(Into::into).collect();
        self
    }

    /// Hides the metric from the push loop.
    pub fn disable_push(mut self) -> Self {
        self.disable_push = true;
        self
    }
}

/// Options for histogram constructors.
#[derive(Clone, Debug)]
pub struct HistogramOpts {
    /// The common options.
    pub opts: Opts,
    /// The unit of observed values, expressed as a duration. Observations are recorded as raw
    /// integers in this unit; the scale factor is forwarded to push sinks that want wall-clock
    /// quantities.
    pub unit: Duration,
    /// Bucket upper bounds in `unit`, strictly increasing. An implicit `+Inf` bucket always
    /// follows the last bound.
    pub buckets: Vec<i64>,
}

impl HistogramOpts {
    /// Creates histogram options from common options, a unit, and bucket upper bounds.
    pub fn new(opts: Opts, unit: Duration, buckets: impl Into<Vec<i64>>) -> Self {
        HistogramOpts { opts, unit, buckets: buckets.into() }
    }
}
