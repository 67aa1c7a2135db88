use thiserror::Error;

/// Errors surfaced by metric registration, vector lookups, and push startup.
///
/// Registration is the only fallible phase of a metric's life: once a handle exists, observations
/// on it cannot fail. All variants are returned as values; the library never panics on user input
/// except through the explicitly fail-fast `must_get` vector accessors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The metric name was empty after scrubbing.
    #[error("invalid metric name {name:?}: names must be non-empty")]
    InvalidName {
        /// The name as supplied, before scrubbing.
        name: String,
    },

    /// A label name was empty after scrubbing.
    #[error("invalid label name {label:?} on metric {metric:?}: label names must be non-empty")]
    InvalidLabel {
        /// Scrubbed name of the metric carrying the label.
        metric: String,
        /// The label name as supplied, before scrubbing.
        label: String,
    },

    /// The help text was empty. Help is mandatory even though it is not part of a metric's
    /// identity.
    #[error("metric {metric:?} must have help text")]
    InvalidHelp {
        /// Scrubbed name of the metric.
        metric: String,
    },

    /// Two label names within a single registration collided after scrubbing, e.g. `b_r` and
    /// `b&r`.
    #[error("labels on metric {metric:?} collide on {label:?} after scrubbing")]
    DuplicateLabelAfterScrub {
        /// Scrubbed name of the metric.
        metric: String,
        /// The scrubbed label name that appeared more than once.
        label: String,
    },

    /// The metric name is already registered with a different set of label names. A name fixes its
    /// label-name schema on first registration; later registrations may vary label values but
    /// never add or remove dimensions.
    #[error("metric {metric:?} is already registered with different label names")]
    DimensionMismatch {
        /// Scrubbed name of the metric.
        metric: String,
    },

    /// A metric with this identity and these label values already exists.
    #[error("metric {metric:?} is already registered with the same labels")]
    IdentityConflict {
        /// Scrubbed name of the metric.
        metric: String,
    },

    /// The registration collides with the series space owned by a vector (or, for a vector
    /// registration, with an existing series it would cover). For any given set of dimensions,
    /// callers must use either a vector or a la carte scalars, never both.
    #[error("metric {metric:?} collides with a vector that owns those dimensions")]
    VectorOwnership {
        /// Scrubbed name of the metric.
        metric: String,
    },

    /// Histogram bucket bounds must be non-empty and strictly increasing.
    #[error("histogram {metric:?} buckets must be non-empty and strictly increasing")]
    BucketsNotMonotonic {
        /// Scrubbed name of the histogram.
        metric: String,
    },

    /// A vector constructor was called without variable labels.
    #[error("vector metric {metric:?} must declare at least one variable label")]
    VariableLabelsMissing {
        /// Scrubbed name of the metric.
        metric: String,
    },

    /// A scalar constructor was called with variable labels.
    #[error("scalar metric {metric:?} may not declare variable labels")]
    VariableLabelsForbidden {
        /// Scrubbed name of the metric.
        metric: String,
    },

    /// A vector lookup supplied label names that do not match the vector's declared variable
    /// labels.
    #[error("labels {got:?} do not match the variable labels {want:?} of metric {metric:?}")]
    LookupMismatch {
        /// Scrubbed name of the vector.
        metric: String,
        /// The declared variable label names, in declaration order.
        want: Vec<String>,
        /// The scrubbed label names supplied to the lookup.
        got: Vec<String>,
    },

    /// A push loop is already running for this registry. Stop it before starting another.
    #[error("a push reporter is already running for this registry")]
    PushAlreadyRunning,

    /// The push loop's backing thread could not be spawned.
    #[error("failed to start push loop: {reason}")]
    PushStartFailed {
        /// Operating system error description.
        reason: String,
    },
}
