use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::metadata::{HistogramShape, Metadata};

/// A monotonically increasing counter.
///
/// Handles are cheap to clone and share one underlying atomic; all mutation is lock-free. A
/// counter obtained from a vector carries the variable label values it was created with.
#[derive(Clone, Debug)]
pub struct Counter {
    inner: Arc<CounterInner>,
}

#[derive(Debug)]
struct CounterInner {
    metadata: Arc<Metadata>,
    variable_values: Vec<String>,
    value: AtomicU64,
}

impl Counter {
    pub(crate) fn new(metadata: Arc<Metadata>, variable_values: Vec<String>) -> Self {
        Counter {
            inner: Arc::new(CounterInner { metadata, variable_values, value: AtomicU64::new(0) }),
        }
    }

    /// Increments the counter by one.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Adds `amount` to the counter. Counters only go up; the unsigned argument makes a negative
    /// delta unrepresentable.
    pub fn add(&self, amount: u64) {
        self.inner.value.fetch_add(amount, Ordering::Release);
    }

    /// The current value.
    pub fn load(&self) -> u64 {
        self.inner.value.load(Ordering::Acquire)
    }

    pub(crate) fn metadata(&self) -> &Arc<Metadata> {
        &self.inner.metadata
    }

    pub(crate) fn variable_values(&self) -> &[String] {
        &self.inner.variable_values
    }
}

/// A gauge holding a signed 64-bit value.
#[derive(Clone, Debug)]
pub struct Gauge {
    inner: Arc<GaugeInner>,
}

#[derive(Debug)]
struct GaugeInner {
    metadata: Arc<Metadata>,
    variable_values: Vec<String>,
    value: AtomicI64,
}

impl Gauge {
    pub(crate) fn new(metadata: Arc<Metadata>, variable_values: Vec<String>) -> Self {
        Gauge {
            inner: Arc::new(GaugeInner { metadata, variable_values, value: AtomicI64::new(0) }),
        }
    }

    /// Sets the gauge to `value`.
    pub fn store(&self, value: i64) {
        self.inner.value.store(value, Ordering::Release);
    }

    /// Adds `delta` to the gauge.
    pub fn add(&self, delta: i64) {
        self.inner.value.fetch_add(delta, Ordering::Release);
    }

    /// Subtracts `delta` from the gauge.
    pub fn sub(&self, delta: i64) {
        self.inner.value.fetch_sub(delta, Ordering::Release);
    }

    /// Increments the gauge by one.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Decrements the gauge by one.
    pub fn dec(&self) {
        self.sub(1);
    }

    /// The current value.
    pub fn load(&self) -> i64 {
        self.inner.value.load(Ordering::Acquire)
    }

    pub(crate) fn metadata(&self) -> &Arc<Metadata> {
        &self.inner.metadata
    }

    pub(crate) fn variable_values(&self) -> &[String] {
        &self.inner.variable_values
    }
}

/// A histogram with pre-declared buckets.
///
/// Observations are raw integers in the histogram's declared unit. Each observation increments
/// exactly one bucket counter: the lowest bucket whose upper bound is at least the observed value,
/// or the implicit `+Inf` overflow bucket when the value exceeds every bound.
#[derive(Clone, Debug)]
pub struct Histogram {
    inner: Arc<HistogramInner>,
}

#[derive(Debug)]
struct HistogramInner {
    metadata: Arc<Metadata>,
    shape: Arc<HistogramShape>,
    variable_values: Vec<String>,
    /// One counter per declared bound, with a trailing slot for `+Inf`.
    buckets: Box<[AtomicU64]>,
    sum: AtomicI64,
    count: AtomicU64,
}

impl Histogram {
    pub(crate) fn new(
        metadata: Arc<Metadata>,
        shape: Arc<HistogramShape>,
        variable_values: Vec<String>,
    ) -> Self {
        let buckets =
            (0..shape.upper_bounds.len() + 1).map(|_| AtomicU64::new(0)).collect::<Box<[_]>>();
        Histogram {
            inner: Arc::new(HistogramInner {
                metadata,
                shape,
                variable_values,
                buckets,
                sum: AtomicI64::new(0),
                count: AtomicU64::new(0),
            }),
        }
    }

    /// Records one observation, expressed in the histogram's unit.
    pub fn observe(&self, value: i64) {
        let idx = self.inner.shape.upper_bounds.partition_point(|&bound| bound < value);
        self.inner.buckets[idx].fetch_add(1, Ordering::Release);
        self.inner.sum.fetch_add(value, Ordering::Release);
        self.inner.count.fetch_add(1, Ordering::Release);
    }

    /// Records an elapsed duration, converted into the histogram's unit with truncating division.
    pub fn observe_duration(&self, elapsed: Duration) {
        let unit = self.inner.shape.unit.as_nanos().max(1);
        self.observe((elapsed.as_nanos() / unit) as i64);
    }

    pub(crate) fn metadata(&self) -> &Arc<Metadata> {
        &self.inner.metadata
    }

    pub(crate) fn variable_values(&self) -> &[String] {
        &self.inner.variable_values
    }

    pub(crate) fn shape(&self) -> &Arc<HistogramShape> {
        &self.inner.shape
    }

    /// Reads the per-bucket counts paired with their bounds, the overflow count, and the running
    /// sum and count. Each load is individually consistent; the set is not atomic as a whole.
    pub(crate) fn read(&self) -> (Vec<(i64, u64)>, u64, i64, u64) {
        let bounds = &self.inner.shape.upper_bounds;
        let buckets = bounds
            .iter()
            .zip(self.inner.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Acquire)))
            .collect();
        let overflow = self.inner.buckets[bounds.len()].load(Ordering::Acquire);
        let sum = self.inner.sum.load(Ordering::Acquire);
        let count = self.inner.count.load(Ordering::Acquire);
        (buckets, overflow, sum, count)
    }
}
