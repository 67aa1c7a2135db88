use std::time::Duration;

use crate::error::Error;
use crate::opts::Opts;
use crate::scrub::{scrub_label_value, scrub_name};

/// Immutable identity and presentation data shared by a metric and, for vectors, every child.
///
/// Built from user-supplied [`Opts`] by [`Metadata::from_opts`], which owns all scrubbing and
/// validation. After construction nothing here changes; handles share it behind an `Arc`.
#[derive(Debug)]
pub(crate) struct Metadata {
    /// Scrubbed metric name.
    pub(crate) name: String,
    /// Help text, verbatim. Not part of the metric's identity.
    pub(crate) help: String,
    /// Scrubbed constant labels, sorted by label name.
    pub(crate) constant_labels: Vec<(String, String)>,
    /// Scrubbed variable label names in declaration order. The order defines the positional
    /// meaning of child value tuples; it is empty for scalars.
    pub(crate) variable_labels: Vec<String>,
    /// Skip this metric when projecting for the push loop.
    pub(crate) disable_push: bool,
}

impl Metadata {
    /// Scrubs and validates `opts`, merging in constant labels inherited from a labeled registry
    /// view. Inherited labels are already scrubbed and deduplicated.
    pub(crate) fn from_opts(opts: Opts, inherited: &[(String, String)]) -> Result<Metadata, Error> {
        let name = scrub_name(&opts.name);
        if name.is_empty() {
            return Err(Error::InvalidName { name: opts.name });
        }
        if opts.help.is_empty() {
            return Err(Error::InvalidHelp { metric: name });
        }

        let mut constant_labels: Vec<(String, String)> = inherited.to_vec();
        if let Some((label, _)) = constant_labels.iter().find(|(label, _)| label.is_empty()) {
            return Err(Error::InvalidLabel { metric: name, label: label.clone() });
        }
        for (label, value) in &opts.labels {
            let scrubbed = scrub_name(label);
            if scrubbed.is_empty() {
                return Err(Error::InvalidLabel { metric: name, label: label.clone() });
            }
            if constant_labels.iter().any(|(existing, _)| *existing == scrubbed) {
                return Err(Error::DuplicateLabelAfterScrub { metric: name, label: scrubbed });
            }
            constant_labels.push((scrubbed, scrub_label_value(value)));
        }
        constant_labels.sort();

        let mut variable_labels = Vec::with_capacity(opts.variable_labels.len());
        for label in &opts.variable_labels {
            let scrubbed = scrub_name(label);
            if scrubbed.is_empty() {
                return Err(Error::InvalidLabel { metric: name, label: label.clone() });
            }
            let duplicate = variable_labels.contains(&scrubbed)
                || constant_labels.iter().any(|(existing, _)| *existing == scrubbed);
            if duplicate {
                return Err(Error::DuplicateLabelAfterScrub { metric: name, label: scrubbed });
            }
            variable_labels.push(scrubbed);
        }

        Ok(Metadata {
            name,
            help: opts.help,
            constant_labels,
            variable_labels,
            disable_push: opts.disable_push,
        })
    }

    /// The sorted union of constant and variable label names. Every registration under one metric
    /// name must produce the same schema.
    pub(crate) fn schema(&self) -> Vec<String> {
        let mut schema: Vec<String> = self
            .constant_labels
            .iter()
            .map(|(label, _)| label.clone())
            .chain(self.variable_labels.iter().cloned())
            .collect();
        schema.sort();
        schema
    }

    /// The variable label names in sorted order, as used for identity comparison.
    pub(crate) fn sorted_variable_labels(&self) -> Vec<String> {
        let mut sorted = self.variable_labels.clone();
        sorted.sort();
        sorted
    }

    /// The full label set of the series keyed by `values` (one value per variable label, in
    /// declaration order), sorted by label name.
    pub(crate) fn full_labels(&self, values: &[String]) -> Vec<(String, String)> {
        let mut labels = self.constant_labels.clone();
        labels.extend(self.variable_labels.iter().cloned().zip(values.iter().cloned()));
        labels.sort();
        labels
    }
}

/// The bucket layout of a histogram, shared by a histogram vector and all of its children.
#[derive(Debug)]
pub(crate) struct HistogramShape {
    /// Scale of observed values.
    pub(crate) unit: Duration,
    /// Strictly increasing bucket upper bounds. The implicit `+Inf` bucket is not stored.
    pub(crate) upper_bounds: Vec<i64>,
}

impl HistogramShape {
    /// Validates bucket bounds: non-empty and strictly increasing.
    pub(crate) fn new(metric: &str, unit: Duration, upper_bounds: Vec<i64>) -> Result<Self, Error> {
        let monotonic = upper_bounds.windows(2).all(|pair| pair[0] < pair[1]);
        if upper_bounds.is_empty() || !monotonic {
            return Err(Error::BucketsNotMonotonic { metric: metric.to_string() });
        }
        Ok(HistogramShape { unit, upper_bounds })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{HistogramShape, Metadata};
    use crate::error::Error;
    use crate::opts::Opts;

    #[test]
    fn test_scrubs_and_sorts_labels() {
        let meta = Metadata::from_opts(
            Opts::new("foo&bar", "help").label("zig", "with spaces").label("b&r", "baz"),
            &[],
        )
        .expect("registration options should be valid");

        assert_eq!(meta.name, "foo_bar");
        assert_eq!(
            meta.constant_labels,
            vec![
                ("b_r".to_string(), "baz".to_string()),
                ("zig".to_string(), "with_spaces".to_string()),
            ],
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Metadata::from_opts(Opts::new("", "help"), &[]).unwrap_err();
        assert_eq!(err, Error::InvalidName { name: String::new() });
    }

    #[test]
    fn test_missing_help_rejected() {
        let err = Metadata::from_opts(Opts::new("foo", ""), &[]).unwrap_err();
        assert_eq!(err, Error::InvalidHelp { metric: "foo".to_string() });
    }

    #[test]
    fn test_scrub_collision_within_one_registration() {
        let err = Metadata::from_opts(
            Opts::new("foo", "help").label("b_r", "baz").label("b&r", "baz"),
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateLabelAfterScrub { metric: "foo".to_string(), label: "b_r".to_string() },
        );
    }

    #[test]
    fn test_scrub_collision_with_inherited_labels() {
        let inherited = vec![("service".to_string(), "users".to_string())];
        let err = Metadata::from_opts(Opts::new("foo", "help").label("service", "other"), &inherited)
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateLabelAfterScrub {
                metric: "foo".to_string(),
                label: "service".to_string(),
            },
        );
    }

    #[test]
    fn test_variable_label_collisions() {
        let err = Metadata::from_opts(
            Opts::new("foo", "help").variable_labels(["f__", "f&&"]),
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateLabelAfterScrub { metric: "foo".to_string(), label: "f__".to_string() },
        );

        let err = Metadata::from_opts(
            Opts::new("foo", "help").label("bar", "baz").variable_labels(["bar"]),
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateLabelAfterScrub { metric: "foo".to_string(), label: "bar".to_string() },
        );
    }

    #[test]
    fn test_schema_unions_constant_and_variable_names() {
        let meta = Metadata::from_opts(
            Opts::new("foo", "help").label("service", "users").variable_labels(["baz", "app"]),
            &[],
        )
        .expect("registration options should be valid");
        assert_eq!(meta.schema(), vec!["app", "baz", "service"]);
        assert_eq!(meta.sorted_variable_labels(), vec!["app", "baz"]);
        // Declaration order is preserved for positional lookups.
        assert_eq!(meta.variable_labels, vec!["baz", "app"]);
    }

    #[test]
    fn test_full_labels_interleaves_sorted() {
        let meta = Metadata::from_opts(
            Opts::new("foo", "help").label("service", "users").variable_labels(["quux", "baz"]),
            &[],
        )
        .expect("registration options should be valid");
        let labels = meta.full_labels(&["quuxval".to_string(), "bazval".to_string()]);
        assert_eq!(
            labels,
            vec![
                ("baz".to_string(), "bazval".to_string()),
                ("quux".to_string(), "quuxval".to_string()),
                ("service".to_string(), "users".to_string()),
            ],
        );
    }

    #[test]
    fn test_buckets_must_be_monotonic() {
        let unit = Duration::from_millis(1);
        assert!(HistogramShape::new("h", unit, vec![1000, 60000]).is_ok());

        let err = HistogramShape::new("h", unit, vec![]).unwrap_err();
        assert_eq!(err, Error::BucketsNotMonotonic { metric: "h".to_string() });

        let err = HistogramShape::new("h", unit, vec![1000, 1000]).unwrap_err();
        assert_eq!(err, Error::BucketsNotMonotonic { metric: "h".to_string() });

        let err = HistogramShape::new("h", unit, vec![60000, 1000]).unwrap_err();
        assert_eq!(err, Error::BucketsNotMonotonic { metric: "h".to_string() });
    }
}
