//! Rendering of registry snapshots in the Prometheus text exposition format.

use std::fmt::Display;

use vitals::{HistogramSnapshot, MetricFamily, Sample, SampleValue, Snapshot};

/// The Content-Type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Renders a snapshot as Prometheus text exposition.
///
/// The output is byte-compatible with what the official Prometheus clients produce for the same
/// state: each family gets a `# HELP` and `# TYPE` line followed by one line per sample, families
/// and samples appear in the snapshot's stable order, histogram bucket counts are cumulative with
/// `le="+Inf"` always emitted, and the `le` label goes last on bucket lines.
pub fn render(snapshot: &Snapshot) -> String {
    let mut output = String::new();
    for family in &snapshot.families {
        write_help_line(&mut output, &family.name, &family.help);
        write_type_line(&mut output, &family.name, family.kind.as_str());
        for sample in &family.samples {
            write_sample(&mut output, family, sample);
        }
    }
    output
}

fn write_sample(buffer: &mut String, family: &MetricFamily, sample: &Sample) {
    match &sample.value {
        SampleValue::Counter(value) => {
            write_metric_line::<&str, _>(buffer, &family.name, None, &sample.labels, None, value);
        }
        SampleValue::Gauge(value) => {
            write_metric_line::<&str, _>(buffer, &family.name, None, &sample.labels, None, value);
        }
        SampleValue::Histogram(histogram) => {
            write_histogram_lines(buffer, &family.name, &sample.labels, histogram);
        }
    }
}

fn write_histogram_lines(
    buffer: &mut String,
    name: &str,
    labels: &[(String, String)],
    histogram: &HistogramSnapshot,
) {
    let mut cumulative = 0;
    for (bound, count) in &histogram.buckets {
        cumulative += count;
        write_metric_line(buffer, name, Some("bucket"), labels, Some(("le", bound)), cumulative);
    }
    cumulative += histogram.overflow;
    write_metric_line(buffer, name, Some("bucket"), labels, Some(("le", "+Inf")), cumulative);
    write_metric_line::<&str, _>(buffer, name, Some("sum"), labels, None, histogram.sum);
    write_metric_line::<&str, _>(buffer, name, Some("count"), labels, None, histogram.count);
}

fn write_help_line(buffer: &mut String, name: &str, help: &str) {
    buffer.push_str("# HELP ");
    buffer.push_str(name);
    buffer.push(' ');
    buffer.push_str(&escape_help(help));
    buffer.push('\n');
}

fn write_type_line(buffer: &mut String, name: &str, metric_type: &str) {
    buffer.push_str("# TYPE ");
    buffer.push_str(name);
    buffer.push(' ');
    buffer.push_str(metric_type);
    buffer.push('\n');
}

/// Writes one sample line. `suffix` carries the `_bucket`/`_sum`/`_count` histogram suffixes, and
/// `additional_label` the trailing `le` pair, which the canonical encoders append after the
/// sample's own (already sorted) labels. Label values arrive pre-scrubbed from the registry, so
/// they never need escaping here.
fn write_metric_line<T, V>(
    buffer: &mut String,
    name: &str,
    suffix: Option<&'static str>,
    labels: &[(String, String)],
    additional_label: Option<(&'static str, T)>,
    value: V,
) where
    T: Display,
    V: Display,
{
    buffer.push_str(name);
    if let Some(suffix) = suffix {
        buffer.push('_');
        buffer.push_str(suffix);
    }

    if !labels.is_empty() || additional_label.is_some() {
        buffer.push('{');

        let mut first = true;
        for (label, label_value) in labels {
            if first {
                first = false;
            } else {
                buffer.push(',');
            }
            buffer.push_str(label);
            buffer.push_str("=\"");
            buffer.push_str(label_value);
            buffer.push('"');
        }

        if let Some((label, label_value)) = additional_label {
            if !first {
                buffer.push(',');
            }
            buffer.push_str(label);
            buffer.push_str("=\"");
            buffer.push_str(label_value.to_string().as_str());
            buffer.push('"');
        }

        buffer.push('}');
    }

    buffer.push(' ');
    buffer.push_str(value.to_string().as_str());
    buffer.push('\n');
}

/// Escapes help text the way the canonical text encoder does: backslashes and line feeds only.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
