use druid_query::prelude::*;
use druid_query::query::WeightStep;
use std::sync::atomic::{AtomicUsize, Ordering};

fn interval(s: &str) -> Interval {
    s.parse().unwrap()
}

/// Slicer returning a fixed count and recording how often it was asked.
struct FixedSlicer {
    slices: u64,
    calls: AtomicUsize,
}

impl FixedSlicer {
    fn new(slices: u64) -> Self {
        Self {
            slices,
            calls: AtomicUsize::new(0),
        }
    }
}

impl IntervalSlicer for FixedSlicer {
    fn count_sliced_intervals(&self, _: &[Interval], _: Granularity) -> QueryResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.slices)
    }
}

fn group_by(dimensions: Vec<Dimension>, aggregations: Vec<Aggregation>) -> GroupByQuery {
    GroupByQuery::builder(DataSource::table("events"), Granularity::Day)
        .dimensions(dimensions)
        .aggregations(aggregations)
        .intervals([interval("2024-01-01T00:00:00Z/2024-01-04T00:00:00Z")])
        .build()
}

#[test]
fn test_end_to_end_weight() {
    let query = group_by(
        vec![Dimension::new("dimA", 100), Dimension::unknown("dimB")],
        vec![
            Aggregation::theta_sketch("sketchAgg1", "a"),
            Aggregation::theta_sketch("sketchAgg2", "b"),
        ],
    );

    assert_eq!(query.cardinality_weight().unwrap(), 100);
    assert_eq!(query.sketch_weight().unwrap(), 2);
    assert_eq!(query.period_weight(&GrainSlicer).unwrap(), 3);
    assert_eq!(query.compute_weight(&GrainSlicer).unwrap(), 600);
}

#[test]
fn test_same_day_intervals_weigh_one_period() {
    let query = group_by(
        vec![Dimension::new("country", 100)],
        vec![Aggregation::theta_sketch("users", "user_sketch")],
    )
    .with_intervals([
        interval("2024-01-01T01:00:00Z/2024-01-01T02:00:00Z"),
        interval("2024-01-01T05:00:00Z/2024-01-01T06:00:00Z"),
    ]);

    assert_eq!(query.period_weight(&GrainSlicer).unwrap(), 1);
    assert_eq!(query.compute_weight(&GrainSlicer).unwrap(), 100);
}

#[test]
fn test_cardinality_product_excludes_unknowns() {
    let query = group_by(
        vec![
            Dimension::new("a", -1),
            Dimension::new("b", 5),
            Dimension::new("c", 0),
            Dimension::new("d", 10),
        ],
        vec![Aggregation::theta_sketch("users", "user_sketch")],
    );
    assert_eq!(query.cardinality_weight().unwrap(), 50);
}

#[test]
fn test_no_dimensions_weighs_one() {
    let query = group_by(vec![], vec![Aggregation::theta_sketch("users", "u")]);
    assert_eq!(query.cardinality_weight().unwrap(), 1);
}

#[test]
fn test_zero_sketch_short_circuits() {
    // The cardinality product alone would overflow.
    let query = group_by(
        vec![Dimension::new("a", i64::MAX), Dimension::new("b", i64::MAX)],
        vec![Aggregation::long_sum("clicks", "clicks")],
    );
    let slicer = FixedSlicer::new(u64::MAX);

    assert_eq!(query.compute_weight(&slicer).unwrap(), 0);
    assert_eq!(slicer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cardinality_overflow_is_reported() {
    let query = group_by(
        vec![Dimension::new("a", i64::MAX), Dimension::new("b", 2)],
        vec![Aggregation::theta_sketch("users", "u")],
    );
    assert_eq!(
        query.compute_weight(&GrainSlicer),
        Err(QueryError::WeightOverflow {
            step: WeightStep::Cardinality
        })
    );
}

#[test]
fn test_period_overflow_is_reported() {
    let query = group_by(vec![], vec![Aggregation::theta_sketch("users", "u")]);
    assert_eq!(
        query.compute_weight(&FixedSlicer::new(u64::MAX)),
        Err(QueryError::WeightOverflow {
            step: WeightStep::Period
        })
    );
}

#[test]
fn test_combined_overflow_is_reported() {
    let query = group_by(
        vec![Dimension::new("a", 1 << 40)],
        vec![
            Aggregation::theta_sketch("a", "a"),
            Aggregation::theta_sketch("b", "b"),
        ],
    );
    // 2^40 * 2 * 2^22 = 2^63, one past i64::MAX.
    assert_eq!(
        query.compute_weight(&FixedSlicer::new(1 << 22)),
        Err(QueryError::WeightOverflow {
            step: WeightStep::Combine
        })
    );

    // One slice fewer fits.
    let weight = query.compute_weight(&FixedSlicer::new((1 << 22) - 1)).unwrap();
    assert_eq!(weight, (1i64 << 41) * ((1 << 22) - 1));
}

#[test]
fn test_filtered_sketch_counts_as_sketch() {
    let query = group_by(
        vec![Dimension::new("country", 10)],
        vec![Aggregation::filtered(
            Filter::selector(Dimension::unknown("device"), "ios"),
            Aggregation::theta_sketch("ios_users", "user_sketch"),
        )],
    );
    assert_eq!(query.compute_weight(&GrainSlicer).unwrap(), 10 * 3);
}

#[test]
fn test_weight_through_trait_object() {
    let queries: Vec<Box<dyn AggregationQuery>> = vec![
        Box::new(group_by(
            vec![Dimension::new("country", 10)],
            vec![Aggregation::theta_sketch("users", "u")],
        )),
        Box::new(
            TopNQuery::builder(
                DataSource::table("events"),
                Granularity::Day,
                Dimension::new("page", 10_000),
                "users",
                50,
            )
            .aggregations([Aggregation::theta_sketch("users", "u")])
            .intervals([interval("2024-01-01T00:00:00Z/2024-01-04T00:00:00Z")])
            .build(),
        ),
        Box::new(
            TimeseriesQuery::builder(DataSource::table("events"), Granularity::Day)
                .aggregations([Aggregation::theta_sketch("users", "u")])
                .intervals([interval("2024-01-01T00:00:00Z/2024-01-04T00:00:00Z")])
                .build(),
        ),
    ];

    let weights: Vec<i64> = queries
        .iter()
        .map(|query| query.compute_weight(&GrainSlicer).unwrap())
        .collect();
    assert_eq!(weights, vec![30, 150, 3]);
}
