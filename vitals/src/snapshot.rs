use std::collections::BTreeMap;
use std::time::Duration;

use crate::handles::{Counter, Gauge, Histogram};
use crate::kind::MetricKind;
use crate::registry::AnyMetric;

/// A point-in-time projection of every metric in a registry.
///
/// Ordering is stable for identical state: families are sorted by scrubbed metric name, and
/// samples within a family by their full label set. Each sample is read from its own atomics, so
/// the snapshot is per-metric consistent but not atomic across metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Metric families, sorted by name.
    pub families: Vec<MetricFamily>,
}

/// All samples sharing one metric name, along with the name's metadata.
///
/// Scalars registered under one name with differing label values fold into a single family; the
/// help text of the earliest registration wins.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricFamily {
    /// Scrubbed metric name.
    pub name: String,
    /// Help text.
    pub help: String,
    /// The kind shared by every sample of this family.
    pub kind: MetricKind,
    /// Samples sorted by label set.
    pub samples: Vec<Sample>,
}

/// One series: a full label set and its current value.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Constant and variable labels merged, sorted by label name.
    pub labels: Vec<(String, String)>,
    /// The current value.
    pub value: SampleValue,
}

/// The value of a single series, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleValue {
    /// Counter value.
    Counter(u64),
    /// Gauge value.
    Gauge(i64),
    /// Histogram state.
    Histogram(HistogramSnapshot),
}

/// Histogram state as captured by a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramSnapshot {
    /// Scale of observed values.
    pub unit: Duration,
    /// Per-bucket `(upper bound, count)` pairs in increasing bound order. Counts are raw, not
    /// cumulative; the exposition serializer accumulates them when it needs to.
    pub buckets: Vec<(i64, u64)>,
    /// Observations that exceeded every declared bound (the implicit `+Inf` bucket).
    pub overflow: u64,
    /// Sum of all observed values.
    pub sum: i64,
    /// Total number of observations.
    pub count: u64,
}

/// Projects the given metrics into a snapshot. With `for_push` set, metrics registered with
/// `disable_push` are skipped.
pub(crate) fn collect(metrics: &[AnyMetric], for_push: bool) -> Snapshot {
    let mut families: BTreeMap<String, MetricFamily> = BTreeMap::new();
    for metric in metrics {
        let metadata = metric.metadata();
        if for_push && metadata.disable_push {
            continue;
        }

        let samples: Vec<Sample> = match metric {
            AnyMetric::Counter(counter) => vec![counter_sample(counter)],
            AnyMetric::Gauge(gauge) => vec![gauge_sample(gauge)],
            AnyMetric::Histogram(histogram) => vec![histogram_sample(histogram)],
            AnyMetric::CounterVector(vector) => {
                vector.children().iter().map(counter_sample).collect()
            }
            AnyMetric::GaugeVector(vector) => vector.children().iter().map(gauge_sample).collect(),
            AnyMetric::HistogramVector(vector) => {
                vector.children().iter().map(histogram_sample).collect()
            }
        };
        // A vector with no children yet contributes nothing; a family only exists once it has at
        // least one sample, matching what a canonical Prometheus gatherer emits.
        if samples.is_empty() {
            continue;
        }

        families
            .entry(metadata.name.clone())
            .or_insert_with(|| MetricFamily {
                name: metadata.name.clone(),
                help: metadata.help.clone(),
                kind: metric.kind(),
                samples: Vec::new(),
            })
            .samples
            .extend(samples);
    }

    let mut families: Vec<MetricFamily> = families.into_values().collect();
    for family in &mut families {
        family.samples.sort_by(|a, b| a.labels.cmp(&b.labels));
    }
    Snapshot { families }
}

fn counter_sample(counter: &Counter) -> Sample {
    Sample {
        labels: counter.metadata().full_labels(counter.variable_values()),
        value: SampleValue::Counter(counter.load()),
    }
}

fn gauge_sample(gauge: &Gauge) -> Sample {
    Sample {
        labels: gauge.metadata().full_labels(gauge.variable_values()),
        value: SampleValue::Gauge(gauge.load()),
    }
}

fn histogram_sample(histogram: &Histogram) -> Sample {
    let (buckets, overflow, sum, count) = histogram.read();
    Sample {
        labels: histogram.metadata().full_labels(histogram.variable_values()),
        value: SampleValue::Histogram(HistogramSnapshot {
            unit: histogram.shape().unit,
            buckets,
            overflow,
            sum,
            count,
        }),
    }
}
