//! Registration rules: identity uniqueness, dimension schemas, scrub collisions, and vector
//! ownership, for scalar and vector metrics alike.

use std::time::Duration;

use vitals::{Error, HistogramOpts, Labels, Opts, Registry};

fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs.iter().map(|(label, value)| (label.to_string(), value.to_string())).collect()
}

#[test]
fn scalar_same_options_conflict() {
    let (root, _controller) = Registry::new();
    let opts = Opts::new("foo", "help");
    root.new_counter(opts.clone()).expect("first registration should succeed");

    // Re-using options with the same metric type fails.
    let err = root.new_counter(opts.clone()).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });

    // Changing the metric type doesn't make the metadata re-usable.
    let err = root.new_gauge(opts).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });

    // Neither does changing the help string; help is not part of identity.
    let err = root.new_counter(Opts::new("foo", "different help")).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });
}

#[test]
fn scalar_added_dimensions_rejected() {
    let (root, _controller) = Registry::new();
    root.new_counter(Opts::new("foo", "help")).expect("first registration should succeed");

    let err = root
        .new_counter(Opts::new("foo", "help").label("bar", "baz"))
        .unwrap_err();
    assert_eq!(err, Error::DimensionMismatch { metric: "foo".to_string() });
}

#[test]
fn scalar_different_dimensions_rejected() {
    let (root, _controller) = Registry::new();
    // Even with the same number of dimensions, metrics sharing a name must share label names.
    root.new_counter(Opts::new("dimensions", "help").label("bar", "baz"))
        .expect("first registration should succeed");

    let err = root
        .new_counter(Opts::new("dimensions", "help").label("bing", "quux"))
        .unwrap_err();
    assert_eq!(err, Error::DimensionMismatch { metric: "dimensions".to_string() });
}

#[test]
fn scalar_same_dimensions_different_values_allowed() {
    let (root, _controller) = Registry::new();
    root.new_counter(Opts::new("dimensions", "help").label("bar", "baz"))
        .expect("first registration should succeed");

    // Same name and dimensions with different label values is allowed: an inefficient,
    // hand-rolled vector.
    root.new_counter(Opts::new("dimensions", "help").label("bar", "quux"))
        .expect("same dimensions with new values should register");
}

#[test]
fn scalar_uniqueness_applies_to_scrubbed_name() {
    let (root, _controller) = Registry::new();
    root.new_counter(Opts::new("scrubbed_name", "help"))
        .expect("first registration should succeed");

    let err = root.new_counter(Opts::new("scrubbed&name", "help")).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "scrubbed_name".to_string() });
}

#[test]
fn scalar_uniqueness_applies_to_scrubbed_dimensions() {
    let (root, _controller) = Registry::new();
    root.new_counter(Opts::new("scrubbed_dimensions", "help").label("b_r", "baz"))
        .expect("first registration should succeed");

    let err = root
        .new_counter(Opts::new("scrubbed_dimensions", "help").label("b&r", "baz"))
        .unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "scrubbed_dimensions".to_string() });
}

#[test]
fn scalar_constant_label_specified_twice() {
    let (root, _controller) = Registry::new();
    // Within a single set of labels, scrubbing may not introduce duplicates.
    let err = root
        .new_counter(Opts {
            name: "user_error_constant_labels".to_string(),
            help: "help".to_string(),
            labels: labels(&[("b_r", "baz"), ("b&r", "baz")]),
            ..Opts::default()
        })
        .unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateLabelAfterScrub {
            metric: "user_error_constant_labels".to_string(),
            label: "b_r".to_string(),
        },
    );
}

#[test]
fn scalar_empty_name_rejected() {
    let (root, _controller) = Registry::new();
    let err = root.new_counter(Opts::new("", "help")).unwrap_err();
    assert_eq!(err, Error::InvalidName { name: String::new() });
}

#[test]
fn scalar_variable_labels_forbidden() {
    let (root, _controller) = Registry::new();
    let err = root
        .new_counter(Opts::new("foo", "help").variable_labels(["bar"]))
        .unwrap_err();
    assert_eq!(err, Error::VariableLabelsForbidden { metric: "foo".to_string() });
}

#[test]
fn vector_same_options_conflict() {
    let (root, _controller) = Registry::new();
    let opts = Opts::new("foo", "help").variable_labels(["foo"]);
    root.new_counter_vector(opts.clone()).expect("first registration should succeed");

    let err = root.new_counter_vector(opts.clone()).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });

    let err = root.new_gauge_vector(opts).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });

    let err = root
        .new_counter_vector(Opts::new("foo", "different help").variable_labels(["foo"]))
        .unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });
}

#[test]
fn vector_added_dimensions_rejected() {
    let (root, _controller) = Registry::new();
    root.new_counter_vector(Opts::new("foo", "help").variable_labels(["foo"]))
        .expect("first registration should succeed");

    // Adding constant labels changes the schema.
    let err = root
        .new_counter_vector(Opts::new("foo", "help").label("bar", "baz").variable_labels(["foo"]))
        .unwrap_err();
    assert_eq!(err, Error::DimensionMismatch { metric: "foo".to_string() });

    // So does adding variable labels.
    let err = root
        .new_counter_vector(Opts::new("foo", "help").variable_labels(["foo", "bar"]))
        .unwrap_err();
    assert_eq!(err, Error::DimensionMismatch { metric: "foo".to_string() });
}

#[test]
fn vector_different_dimensions_rejected() {
    let (root, _controller) = Registry::new();
    root.new_counter_vector(Opts::new("foo", "help").variable_labels(["foo"]))
        .expect("first registration should succeed");

    let err = root
        .new_counter_vector(Opts::new("foo", "help").variable_labels(["bar"]))
        .unwrap_err();
    assert_eq!(err, Error::DimensionMismatch { metric: "foo".to_string() });
}

#[test]
fn vector_same_dimensions_different_values_allowed() {
    let (root, _controller) = Registry::new();
    root.new_counter_vector(
        Opts::new("dimensions", "help").label("bar", "baz").variable_labels(["foo"]),
    )
    .expect("first registration should succeed");

    root.new_counter_vector(
        Opts::new("dimensions", "help").label("bar", "quux").variable_labels(["foo"]),
    )
    .expect("same dimensions with new values should register");
}

#[test]
fn vectors_own_dimensions() {
    let (root, _controller) = Registry::new();
    // dims: foo, baz
    root.new_counter_vector(
        Opts::new("ownership", "help").label("foo", "bar").variable_labels(["baz"]),
    )
    .expect("first registration should succeed");

    // A scalar with the same dimensions falls inside the vector's series space.
    let err = root
        .new_counter(Opts::new("ownership", "help").label("foo", "bar").label("baz", "quux"))
        .unwrap_err();
    assert_eq!(err, Error::VectorOwnership { metric: "ownership".to_string() });
}

#[test]
fn vectors_own_dimensions_against_existing_scalars() {
    let (root, _controller) = Registry::new();
    root.new_counter(Opts::new("ownership", "help").label("foo", "bar").label("baz", "quux"))
        .expect("first registration should succeed");

    // The mirror image: a vector may not cover a series that already exists a la carte.
    let err = root
        .new_counter_vector(
            Opts::new("ownership", "help").label("foo", "bar").variable_labels(["baz"]),
        )
        .unwrap_err();
    assert_eq!(err, Error::VectorOwnership { metric: "ownership".to_string() });
}

#[test]
fn vector_uniqueness_applies_to_scrubbed_name() {
    let (root, _controller) = Registry::new();
    root.new_counter_vector(Opts::new("scrubbed_name", "help").variable_labels(["bar"]))
        .expect("first registration should succeed");

    let err = root
        .new_counter_vector(Opts::new("scrubbed&name", "help").variable_labels(["bar"]))
        .unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "scrubbed_name".to_string() });
}

#[test]
fn vector_uniqueness_applies_to_scrubbed_dimensions() {
    let (root, _controller) = Registry::new();
    root.new_counter_vector(
        Opts::new("scrubbed_dimensions", "help").label("b_r", "baz").variable_labels(["q__x"]),
    )
    .expect("first registration should succeed");

    let err = root
        .new_counter_vector(
            Opts::new("scrubbed_dimensions", "help").label("b&r", "baz").variable_labels(["q&&x"]),
        )
        .unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "scrubbed_dimensions".to_string() });
}

#[test]
fn vector_constant_label_specified_twice() {
    let (root, _controller) = Registry::new();
    let err = root
        .new_counter_vector(Opts {
            name: "user_error_constant_labels".to_string(),
            help: "help".to_string(),
            labels: labels(&[("b_r", "baz"), ("b&r", "baz")]),
            variable_labels: vec!["quux".to_string()],
            ..Opts::default()
        })
        .unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateLabelAfterScrub {
            metric: "user_error_constant_labels".to_string(),
            label: "b_r".to_string(),
        },
    );
}

#[test]
fn vector_variable_label_specified_twice() {
    let (root, _controller) = Registry::new();
    let err = root
        .new_counter_vector(
            Opts::new("user_error_variable_labels", "help").variable_labels(["f__", "f&&"]),
        )
        .unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateLabelAfterScrub {
            metric: "user_error_variable_labels".to_string(),
            label: "f__".to_string(),
        },
    );
}

#[test]
fn vector_variable_labels_required() {
    let (root, _controller) = Registry::new();
    let err = root.new_counter_vector(Opts::new("foo", "help")).unwrap_err();
    assert_eq!(err, Error::VariableLabelsMissing { metric: "foo".to_string() });
}

#[test]
fn histogram_buckets_must_increase() {
    let (root, _controller) = Registry::new();
    let unit = Duration::from_millis(1);

    root.new_histogram(HistogramOpts::new(Opts::new("ok", "help"), unit, vec![1000, 60000]))
        .expect("monotonic buckets should register");

    let err = root
        .new_histogram(HistogramOpts::new(Opts::new("bad", "help"), unit, vec![60000, 1000]))
        .unwrap_err();
    assert_eq!(err, Error::BucketsNotMonotonic { metric: "bad".to_string() });

    let err = root
        .new_histogram(HistogramOpts::new(Opts::new("empty", "help"), unit, vec![]))
        .unwrap_err();
    assert_eq!(err, Error::BucketsNotMonotonic { metric: "empty".to_string() });
}

#[test]
fn histogram_vector_follows_the_same_rules() {
    let (root, _controller) = Registry::new();
    let unit = Duration::from_millis(1);
    let opts = || Opts::new("latency", "help").variable_labels(["endpoint"]);

    root.new_histogram_vector(HistogramOpts::new(opts(), unit, vec![10, 100]))
        .expect("first registration should succeed");

    let err = root
        .new_histogram_vector(HistogramOpts::new(opts(), unit, vec![10, 100]))
        .unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "latency".to_string() });
}

#[test]
fn labeled_views_contribute_identity() {
    let (root, _controller) = Registry::new();
    let view = root.labeled(labels(&[("service", "users")]));

    view.new_counter(Opts::new("foo", "help").label("foo", "counter"))
        .expect("first registration should succeed");

    // The same registration through the same view collides.
    let err = view.new_counter(Opts::new("foo", "help").label("foo", "counter")).unwrap_err();
    assert_eq!(err, Error::IdentityConflict { metric: "foo".to_string() });

    // A label that collides with an inherited one is a scrub-duplicate error.
    let err = view.new_counter(Opts::new("bar", "help").label("service", "other")).unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateLabelAfterScrub { metric: "bar".to_string(), label: "service".to_string() },
    );
}
