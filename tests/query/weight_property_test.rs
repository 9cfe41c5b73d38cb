use druid_query::prelude::*;
use proptest::prelude::*;

fn arb_dimension() -> impl Strategy<Value = Dimension> {
    ("[a-z]{1,6}", -5i64..1_000).prop_map(|(name, cardinality)| Dimension::new(name, cardinality))
}

fn arb_plain_aggregation() -> impl Strategy<Value = Aggregation> {
    ("[a-z]{1,6}", "[a-z]{1,6}").prop_flat_map(|(name, field)| {
        prop_oneof![
            Just(Aggregation::count(name.clone())),
            Just(Aggregation::long_sum(name.clone(), field.clone())),
            Just(Aggregation::double_sum(name, field)),
        ]
    })
}

fn query(dimensions: Vec<Dimension>, aggregations: Vec<Aggregation>, days: u32) -> GroupByQuery {
    let interval = format!("2024-01-01T00:00:00Z/2024-01-{:02}T00:00:00Z", 1 + days)
        .parse::<Interval>()
        .unwrap();
    GroupByQuery::builder(DataSource::table("events"), Granularity::Day)
        .dimensions(dimensions)
        .aggregations(aggregations)
        .intervals([interval])
        .build()
}

proptest! {
    #[test]
    fn prop_no_sketches_weighs_zero(
        dimensions in prop::collection::vec(arb_dimension(), 0..6),
        aggregations in prop::collection::vec(arb_plain_aggregation(), 1..6),
        days in 0u32..28,
    ) {
        let q = query(dimensions, aggregations, days);
        prop_assert_eq!(q.compute_weight(&GrainSlicer), Ok(0));
    }

    #[test]
    fn prop_cardinality_ignores_unknowns(
        dimensions in prop::collection::vec(arb_dimension(), 0..5),
    ) {
        let expected: i64 = {
            let mut seen = std::collections::HashSet::new();
            dimensions
                .iter()
                .filter(|d| seen.insert(d.api_name().to_string()))
                .map(|d| d.cardinality())
                .filter(|c| *c > 0)
                .product()
        };
        let q = query(dimensions, vec![Aggregation::theta_sketch("users", "u")], 1);
        prop_assert_eq!(q.cardinality_weight(), Ok(expected));
    }

    #[test]
    fn prop_weight_is_product_of_steps(
        dimensions in prop::collection::vec(arb_dimension(), 0..4),
        sketches in 1usize..4,
        days in 0u32..28,
    ) {
        let aggregations: Vec<Aggregation> = (0..sketches)
            .map(|i| Aggregation::theta_sketch(format!("s{}", i), format!("f{}", i)))
            .collect();
        let q = query(dimensions, aggregations, days);

        let expected = q.cardinality_weight().unwrap() * sketches as i64 * i64::from(days);
        prop_assert_eq!(q.compute_weight(&GrainSlicer), Ok(expected));
    }
}
