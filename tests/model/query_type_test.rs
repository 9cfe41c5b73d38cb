use druid_query::model::{wire_name_for, DefaultQueryType, NamedQueryType, QueryType, QueryTypeRef};
use druid_query::prelude::*;
use std::thread;

#[derive(Debug)]
struct ScanQueryType;

impl QueryType for ScanQueryType {
    fn wire_name(&self) -> &str {
        "scan"
    }
}

#[test]
fn test_group_by_wire_name() {
    assert_eq!(DefaultQueryType::GroupBy.wire_name(), "groupBy");
    assert_eq!(DefaultQueryType::TopN.wire_name(), "topN");
    assert_eq!(DefaultQueryType::SegmentMetadata.wire_name(), "segmentMetadata");
}

#[test]
fn test_wire_name_derived_from_tag() {
    for query_type in DefaultQueryType::ALL {
        assert_eq!(query_type.wire_name(), wire_name_for(query_type.tag()));
    }
}

#[test]
fn test_wire_name_stable_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                (0..100)
                    .map(|_| DefaultQueryType::TimeBoundary.wire_name().to_string())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for name in handle.join().unwrap() {
            assert_eq!(name, "timeBoundary");
        }
    }
}

#[test]
fn test_serializes_as_wire_name() {
    let json = serde_json::to_string(&QueryTypeRef::from(DefaultQueryType::Timeseries)).unwrap();
    assert_eq!(json, "\"timeseries\"");
}

#[test]
fn test_external_query_type_needs_no_registry_change() {
    let query = GroupByQuery::builder(DataSource::table("events"), Granularity::All)
        .query_type(QueryTypeRef::new(ScanQueryType))
        .aggregations([Aggregation::count("rows")])
        .build();

    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json["queryType"], "scan");
    assert_eq!(query.query_type().wire_name(), "scan");
}

#[test]
fn test_named_query_type() {
    let lookback = NamedQueryType::new("ROLLING_WINDOW");
    let handle = QueryTypeRef::from(lookback.clone());

    assert_eq!(handle.wire_name(), "rollingWindow");
    assert_eq!(handle.to_string(), "rollingWindow");
    assert_eq!(lookback.tag(), "ROLLING_WINDOW");
}

#[test]
fn test_handles_compare_by_wire_name() {
    let built_in = QueryTypeRef::from(DefaultQueryType::Search);
    let named = QueryTypeRef::from(NamedQueryType::new("SEARCH"));

    assert_eq!(built_in, named);
    assert_eq!(built_in, DefaultQueryType::Search);
    assert_ne!(built_in, DefaultQueryType::Lookback);
}
