use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};
use parking_lot::Mutex;

use crate::error::Error;
use crate::registry::Shared;
use crate::snapshot::{collect, SampleValue, Snapshot};

/// An emission target for the push loop.
///
/// Every tick, the push loop walks each pushable metric and hands the sink its current absolute
/// state; the sink decides how to translate that into its own model (a Tally-style scope, for
/// instance, tracks the previous counter value and reports deltas). Sinks own their retry and
/// backoff behavior; the loop never re-queues a tick and never observes sink failures.
pub trait Sink: Send + 'static {
    /// Reports the current absolute value of a counter series.
    fn emit_counter(&mut self, name: &str, labels: &[(String, String)], value: i64);

    /// Reports the current value of a gauge series.
    fn emit_gauge(&mut self, name: &str, labels: &[(String, String)], value: i64);

    /// Reports the state of a histogram series: per-bucket counts keyed by upper bound, with
    /// `f64::INFINITY` standing in for the overflow bucket. Counts are raw, not cumulative.
    /// `unit` is the scale of the bucket bounds for sinks that want wall-clock quantities.
    fn emit_histogram(
        &mut self,
        name: &str,
        labels: &[(String, String)],
        unit: Duration,
        buckets: &[(f64, u64)],
    );
}

/// Drains a registry on behalf of its consumers.
///
/// A controller is created alongside its [`Registry`](crate::Registry) and shares state with it:
/// [`snapshot`](Controller::snapshot) serves scrape-style readers, and [`push`](Controller::push)
/// runs the periodic emission loop. Controllers are cheap to clone.
#[derive(Clone, Debug)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Controller { shared }
    }

    /// Takes a stable snapshot of every metric in the registry, including metrics registered with
    /// `disable_push`. This is the projection consumed by the Prometheus text serializer.
    pub fn snapshot(&self) -> Snapshot {
        collect(&self.shared.metrics(), false)
    }

    /// Starts a background loop that projects all pushable metrics into `sink` every `interval`.
    ///
    /// At most one push loop may run per registry: while one is active, further calls return
    /// [`Error::PushAlreadyRunning`] without side effects. Stopping the returned handle ends the
    /// loop and makes the registry pushable again. The single-flight guard is an atomic flag, so
    /// starting a new loop never contends with a stop in progress.
    pub fn push<S: Sink>(&self, sink: S, interval: Duration) -> Result<PushHandle, Error> {
        if self
            .shared
            .pushing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::PushAlreadyRunning);
        }

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new().name("vitals-push".to_string()).spawn(move || {
            let mut sink = sink;
            let ticker = tick(interval);
            loop {
                select! {
                    // Dropping the handle's sender disconnects the channel, which wakes this arm
                    // even mid-sleep.
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => emit(&collect(&shared.metrics(), true), &mut sink),
                }
            }
        });

        match spawned {
            Ok(handle) => Ok(PushHandle {
                inner: Mutex::new(Some((stop_tx, handle))),
                shared: Arc::clone(&self.shared),
            }),
            Err(err) => {
                self.shared.pushing.store(false, Ordering::Release);
                Err(Error::PushStartFailed { reason: err.to_string() })
            }
        }
    }
}

/// Stops a running push loop.
///
/// Stopping is idempotent and returns only once the loop has observably ceased emitting: the
/// backing thread is joined, bounded by at most one outstanding tick. Dropping the handle stops
/// the loop too.
#[derive(Debug)]
pub struct PushHandle {
    inner: Mutex<Option<(Sender<()>, JoinHandle<()>)>>,
    shared: Arc<Shared>,
}

impl PushHandle {
    /// Stops the push loop and waits for it to finish.
    pub fn stop(&self) {
        let taken = self.inner.lock().take();
        if let Some((stop, thread)) = taken {
            drop(stop);
            let _ = thread.join();
            // Clear the single-flight flag only after the loop has fully exited, so a replacement
            // pusher can never run concurrently with a stopping one.
            self.shared.pushing.store(false, Ordering::Release);
        }
    }
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn emit(snapshot: &Snapshot, sink: &mut dyn Sink) {
    for family in &snapshot.families {
        for sample in &family.samples {
            match &sample.value {
                SampleValue::Counter(value) => {
                    sink.emit_counter(&family.name, &sample.labels, *value as i64);
                }
                SampleValue::Gauge(value) => {
                    sink.emit_gauge(&family.name, &sample.labels, *value);
                }
                SampleValue::Histogram(histogram) => {
                    let mut buckets: Vec<(f64, u64)> = histogram
                        .buckets
                        .iter()
                        .map(|&(bound, count)| (bound as f64, count))
                        .collect();
                    buckets.push((f64::INFINITY, histogram.overflow));
                    sink.emit_histogram(&family.name, &sample.labels, histogram.unit, &buckets);
                }
            }
        }
    }
}
