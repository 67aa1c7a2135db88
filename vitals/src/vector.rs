use std::sync::Arc;

use dashmap::DashMap;

use crate::error::Error;
use crate::handles::{Counter, Gauge, Histogram};
use crate::metadata::{HistogramShape, Metadata};
use crate::scrub::{scrub_label_value, scrub_name};

/// Shared machinery for the three vector kinds: a metadata block plus a concurrent map from
/// variable-label value tuples to child handles.
///
/// The hit path is a read-only map lookup; the miss path goes through the map's entry API, which
/// re-checks under a per-shard write lock before constructing the child. Children are never
/// evicted.
#[derive(Debug)]
struct VectorInner<T> {
    metadata: Arc<Metadata>,
    children: DashMap<Vec<String>, T>,
}

impl<T: Clone> VectorInner<T> {
    fn new(metadata: Arc<Metadata>) -> Self {
        VectorInner { metadata, children: DashMap::new() }
    }

    fn get_or_create(
        &self,
        labels: &[(&str, &str)],
        make: impl FnOnce(Arc<Metadata>, Vec<String>) -> T,
    ) -> Result<T, Error> {
        let values = self.match_values(labels)?;
        if let Some(child) = self.children.get(&values) {
            return Ok(child.value().clone());
        }
        let child = self
            .children
            .entry(values.clone())
            .or_insert_with(|| make(self.metadata.clone(), values));
        Ok(child.value().clone())
    }

    /// Scrubs the supplied pairs, checks the names against the declared variable labels, and
    /// returns the scrubbed values reordered into declaration order.
    fn match_values(&self, labels: &[(&str, &str)]) -> Result<Vec<String>, Error> {
        let declared = &self.metadata.variable_labels;
        let mut values: Vec<Option<String>> = vec![None; declared.len()];
        let mut matched = 0;
        if labels.len() == declared.len() {
            for (label, value) in labels {
                let scrubbed = scrub_name(label);
                let Some(idx) = declared.iter().position(|d| *d == scrubbed) else {
                    break;
                };
                if values[idx].is_some() {
                    break;
                }
                values[idx] = Some(scrub_label_value(value));
                matched += 1;
            }
        }
        if matched != declared.len() {
            return Err(Error::LookupMismatch {
                metric: self.metadata.name.clone(),
                want: declared.clone(),
                got: labels.iter().map(|(label, _)| scrub_name(label)).collect(),
            });
        }
        Ok(values.into_iter().flatten().collect())
    }

    fn children(&self) -> Vec<T> {
        self.children.iter().map(|entry| entry.value().clone()).collect()
    }
}

macro_rules! vector_common {
    ($vector:ident, $handle:ident) => {
        impl $vector {
            /// Returns the child identified by the given variable label pairs, creating it on
            /// first use.
            ///
            /// The supplied label names must equal the declared variable labels (in any order,
            /// compared after scrubbing); values are scrubbed before keying the child map. Two
            /// lookups with the same scrubbed values return handles to the same underlying state.
            pub fn get(&self, labels: &[(&str, &str)]) -> Result<$handle, Error> {
                self.inner.get_or_create(labels, |metadata, values| self.make(metadata, values))
            }

            /// Like [`get`](Self::get), but panics on a lookup mismatch. Intended for callers
            /// whose label names are static and known to match.
            pub fn must_get(&self, labels: &[(&str, &str)]) -> $handle {
                match self.get(labels) {
                    Ok(handle) => handle,
                    Err(err) => panic!("{err}"),
                }
            }

            pub(crate) fn metadata(&self) -> &Arc<Metadata> {
                &self.inner.metadata
            }

            pub(crate) fn children(&self) -> Vec<$handle> {
                self.inner.children()
            }
        }
    };
}

/// A family of counters sharing one name and label schema, differing only in variable label
/// values.
#[derive(Clone, Debug)]
pub struct CounterVector {
    inner: Arc<VectorInner<Counter>>,
}

impl CounterVector {
    pub(crate) fn new(metadata: Arc<Metadata>) -> Self {
        CounterVector { inner: Arc::new(VectorInner::new(metadata)) }
    }

    fn make(&self, metadata: Arc<Metadata>, values: Vec<String>) -> Counter {
        Counter::new(metadata, values)
    }
}

vector_common!(CounterVector, Counter);

/// A family of gauges sharing one name and label schema.
#[derive(Clone, Debug)]
pub struct GaugeVector {
    inner: Arc<VectorInner<Gauge>>,
}

impl GaugeVector {
    pub(crate) fn new(metadata: Arc<Metadata>) -> Self {
        GaugeVector { inner: Arc::new(VectorInner::new(metadata)) }
    }

    fn make(&self, metadata: Arc<Metadata>, values: Vec<String>) -> Gauge {
        Gauge::new(metadata, values)
    }
}

vector_common!(GaugeVector, Gauge);

/// A family of histograms sharing one name, label schema, unit, and bucket layout.
#[derive(Clone, Debug)]
pub struct HistogramVector {
    inner: Arc<VectorInner<Histogram>>,
    shape: Arc<HistogramShape>,
}

impl HistogramVector {
    pub(crate) fn new(metadata: Arc<Metadata>, shape: Arc<HistogramShape>) -> Self {
        HistogramVector { inner: Arc::new(VectorInner::new(metadata)), shape }
    }

    fn make(&self, metadata: Arc<Metadata>, values: Vec<String>) -> Histogram {
        Histogram::new(metadata, self.shape.clone(), values)
    }
}

vector_common!(HistogramVector, Histogram);
