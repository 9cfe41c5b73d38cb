use druid_query::prelude::*;
use druid_query::query::WEIGHT_COUNT_FIELD;

fn week() -> Interval {
    "2024-01-01T00:00:00Z/2024-01-08T00:00:00Z".parse().unwrap()
}

fn heavy_query() -> GroupByQuery {
    GroupByQuery::builder(DataSource::table("events"), Granularity::Day)
        .dimensions([
            Dimension::new("country", 200),
            Dimension::new("page", 100_000),
        ])
        .filter(Filter::selector(Dimension::unknown("site"), "home"))
        .aggregations([
            Aggregation::theta_sketch("users", "user_sketch"),
            Aggregation::long_sum("clicks", "click_count"),
        ])
        .post_aggregations([PostAggregation::sketch_estimate(
            "user_estimate",
            PostAggregation::field_access("users", "users"),
        )])
        .intervals([week()])
        .context(QueryContext::with_base_id("request"))
        .build()
}

fn light_query() -> GroupByQuery {
    heavy_query().with_dimensions([Dimension::new("country", 200)])
}

#[test]
fn test_evaluation_query_shape() {
    let query = heavy_query();
    let evaluation = query.build_weight_evaluation_query().unwrap();

    assert_eq!(evaluation.query_type(), &DefaultQueryType::GroupBy);
    assert_eq!(evaluation.granularity(), Granularity::All);
    assert!(evaluation.dimensions().is_empty());
    assert_eq!(evaluation.intervals(), query.intervals());
    assert_eq!(
        evaluation.aggregations().into_iter().collect::<Vec<_>>(),
        vec![Aggregation::long_sum(WEIGHT_COUNT_FIELD, WEIGHT_COUNT_FIELD)]
    );

    let inner = evaluation.data_source().inner_query().unwrap();
    assert_eq!(inner.data_source(), query.data_source());
    assert_eq!(inner.granularity(), Granularity::Day);
    assert_eq!(inner.dimensions(), query.dimensions());
    assert_eq!(inner.filter(), query.filter());
    assert!(inner.post_aggregations().is_empty());
    assert_eq!(
        inner.aggregations().into_iter().collect::<Vec<_>>(),
        vec![
            Aggregation::theta_sketch("users", "user_sketch"),
            Aggregation::count(WEIGHT_COUNT_FIELD),
        ]
    );
}

#[test]
fn test_evaluation_contexts_are_forked() {
    let query = heavy_query();
    let evaluation = query.build_weight_evaluation_query().unwrap();
    let inner = evaluation.data_source().inner_query().unwrap();

    assert_eq!(evaluation.context().base_id(), "request");
    assert_eq!(inner.context().base_id(), "request");
    assert!(evaluation.context().sequence() > query.context().sequence());
    assert!(inner.context().sequence() > query.context().sequence());
    assert_ne!(inner.context().sequence(), evaluation.context().sequence());
}

#[test]
fn test_evaluation_reads_innermost_query() {
    let nested = heavy_query()
        .wrap()
        .dimensions([Dimension::new("country", 200)])
        .aggregations([Aggregation::long_sum("clicks", "clicks")])
        .build();

    let evaluation = nested.build_weight_evaluation_query().unwrap();
    let inner = evaluation.data_source().inner_query().unwrap();

    assert_eq!(inner.data_source(), &DataSource::table("events"));
    assert_eq!(nested.data_source().names(), vec!["events"]);
    assert_eq!(evaluation.data_source().names(), vec!["events"]);
    assert_eq!(inner.dimensions(), heavy_query().dimensions());
}

#[test]
fn test_admission_accepts_light_query() {
    let settings = WeightSettings::default();
    let decision = check_weight(&light_query(), &settings, &GrainSlicer).unwrap();
    assert_eq!(decision, WeightDecision::Accept { weight: 1_400 });
    assert!(decision.is_accepted());
}

#[test]
fn test_admission_threshold_is_inclusive() {
    let settings = WeightSettings {
        weight_check_threshold: 1_400,
        ..WeightSettings::default()
    };
    assert!(check_weight(&light_query(), &settings, &GrainSlicer)
        .unwrap()
        .is_accepted());

    let settings = WeightSettings {
        weight_check_threshold: 1_399,
        ..WeightSettings::default()
    };
    assert!(!check_weight(&light_query(), &settings, &GrainSlicer)
        .unwrap()
        .is_accepted());
}

#[test]
fn test_admission_evaluates_heavy_query() {
    let settings = WeightSettings {
        weight_check_threshold: 100_000,
        evaluation_sketch_size: 1_024,
    };
    match check_weight(&heavy_query(), &settings, &GrainSlicer).unwrap() {
        WeightDecision::Evaluate {
            weight,
            evaluation_query,
        } => {
            assert_eq!(weight, Some(200 * 100_000 * 7));
            let inner = evaluation_query.data_source().inner_query().unwrap();
            assert!(inner
                .aggregations()
                .contains(&Aggregation::theta_sketch("users", "user_sketch").with_sketch_size(1_024)));
        }
        other => panic!("expected evaluation, got {:?}", other),
    }
}

#[test]
fn test_admission_treats_overflow_as_heaviest() {
    let query = heavy_query().with_dimensions([
        Dimension::new("a", i64::MAX),
        Dimension::new("b", i64::MAX),
    ]);
    match check_weight(&query, &WeightSettings::default(), &GrainSlicer).unwrap() {
        WeightDecision::Evaluate { weight, .. } => assert_eq!(weight, None),
        other => panic!("expected evaluation, got {:?}", other),
    }
}

#[test]
fn test_admission_rejects_query_without_aggregations() {
    let query = heavy_query().with_aggregations([]);
    assert_eq!(
        check_weight(&query, &WeightSettings::default(), &GrainSlicer),
        Err(QueryError::MissingAggregations)
    );
}
