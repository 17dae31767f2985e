//! Retrieve-multiple query executor
//!
//! Executes query expressions against a borrowed snapshot of candidate
//! records, producing deterministic pages.
//!
//! Execution flow (strict order):
//! 1. Keep records matching the condition tree
//! 2. Aggregate then sort, or sort then project to the column set
//! 3. Reduce to distinct records (if requested)
//! 4. Truncate to the top count
//! 5. Snapshot the total record count (if requested)
//! 6. Select the page window and build the paging cookie
//! 7. Annotate formatted values and run post-query transforms

use crate::config::{EngineConfig, DEFAULT_MAX_RETRIEVE_COUNT};
use crate::metadata::{InMemoryCatalog, MetadataCatalog};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::query::{
    validate, FetchTranslator, QueryError, QueryExpression, QueryRequest, QueryResult,
    QueryTranslator,
};
use crate::record::Record;

use super::aggregate::Aggregator;
use super::distinct::DistinctReducer;
use super::filters::CompiledFilter;
use super::formatter::FormattedValueAnnotator;
use super::paging::{paging_cookie, PageWindow};
use super::projection::project;
use super::result::EntityCollection;
use super::sorter::RecordSorter;
use super::transform::{DateBehaviorTransform, RecordTransform};

/// Query executor bound to a metadata catalog
pub struct QueryExecutor<'a, C: MetadataCatalog> {
    catalog: &'a C,
    config: EngineConfig,
    logger: Logger,
    metrics: MetricsRegistry,
    transforms: Vec<Box<dyn RecordTransform>>,
    fetch_translator: Option<&'a dyn FetchTranslator>,
}

impl<'a, C: MetadataCatalog> QueryExecutor<'a, C> {
    /// Creates a new executor.
    ///
    /// The date behaviour transform is registered when the configuration
    /// enables it.
    pub fn new(catalog: &'a C, config: EngineConfig) -> Self {
        let logger = Logger::new(config.log_level);
        let mut transforms: Vec<Box<dyn RecordTransform>> = Vec::new();
        if config.apply_date_behavior {
            transforms.push(Box::new(DateBehaviorTransform));
        }

        let max_retrieve_count = config.max_retrieve_count.to_string();
        let apply_date_behavior = config.apply_date_behavior.to_string();
        logger.event(
            Event::ConfigLoaded,
            &[
                ("max_retrieve_count", max_retrieve_count.as_str()),
                ("apply_date_behavior", apply_date_behavior.as_str()),
            ],
        );

        Self {
            catalog,
            config,
            logger,
            metrics: MetricsRegistry::new(),
            transforms,
            fetch_translator: None,
        }
    }

    /// Appends a post-query transform; transforms run in registration order
    pub fn with_transform(mut self, transform: impl RecordTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Sets the front-end used for fetch expressions
    pub fn with_fetch_translator(mut self, translator: &'a dyn FetchTranslator) -> Self {
        self.fetch_translator = Some(translator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Names of the registered transforms, in the order they run
    pub fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Translates, validates and executes a request.
    ///
    /// This method is deterministic: same request + same records = same page.
    pub fn execute(
        &self,
        request: &QueryRequest,
        records: &[Record],
    ) -> QueryResult<EntityCollection> {
        let translator = match self.fetch_translator {
            Some(fetch) => QueryTranslator::with_fetch_translator(fetch),
            None => QueryTranslator::new(),
        };

        match translator.translate(request) {
            Ok(query) => Ok(self.run(&query, records)),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Validates and executes an already translated query expression
    pub fn execute_expression(
        &self,
        query: &QueryExpression,
        records: &[Record],
    ) -> QueryResult<EntityCollection> {
        match validate(query) {
            Ok(()) => Ok(self.run(query, records)),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&self, err: QueryError) -> QueryError {
        self.metrics.increment_queries_rejected();
        self.logger.event(
            Event::QueryRejected,
            &[
                ("code", err.code().code()),
                ("message", err.message()),
                ("attribute", err.attribute().unwrap_or("")),
            ],
        );
        err
    }

    fn run(&self, query: &QueryExpression, records: &[Record]) -> EntityCollection {
        let entity = query.entity_name.as_str();
        let candidates = records.len().to_string();
        self.logger.event(
            Event::QueryBegin,
            &[("entity", entity), ("candidates", candidates.as_str())],
        );

        // Step 1: Filter
        let filter = CompiledFilter::new(&query.criteria);
        let mut matches: Vec<&Record> = records
            .iter()
            .filter(|record| filter.matches(record))
            .collect();
        let matched = matches.len();

        // Step 2: Aggregate or sort + project
        let mut rows: Vec<Record> = match &query.aggregate {
            Some(spec) => {
                self.metrics.increment_aggregate_queries();
                let mut groups = Aggregator::aggregate(&query.entity_name, &matches, spec);
                RecordSorter::sort(&mut groups, &query.orders);
                let group_count = groups.len().to_string();
                self.logger.event(
                    Event::AggregateComplete,
                    &[("entity", entity), ("groups", group_count.as_str())],
                );
                groups
            }
            None => {
                RecordSorter::sort(&mut matches, &query.orders);
                matches
                    .into_iter()
                    .map(|record| project(record, &query.column_set))
                    .collect()
            }
        };

        // Step 3: Distinct
        if query.distinct {
            let before = rows.len();
            rows = DistinctReducer::reduce(rows);
            if rows.len() < before {
                let (before, after) = (before.to_string(), rows.len().to_string());
                self.logger.event(
                    Event::DistinctReduced,
                    &[("before", before.as_str()), ("after", after.as_str())],
                );
            }
        }

        // Step 4: Top count
        if let Some(top) = query.top_count {
            let top = top as usize;
            if top < rows.len() {
                rows.truncate(top);
            }
        }

        // Step 5: Total record count
        let wants_total = query
            .page_info
            .as_ref()
            .map_or(false, |p| p.return_total_record_count);
        let total_record_count = if wants_total { rows.len() as i64 } else { -1 };

        // Step 6: Page window
        let window = PageWindow::compute(
            rows.len(),
            query.page_info.as_ref(),
            self.config.max_retrieve_count,
        );
        let mut page: Vec<Record> = rows.drain(window.range()).collect();

        let cookie = match (window.more_records, page.first(), page.last()) {
            (true, Some(first), Some(last)) => Some(paging_cookie(window.page_number, first, last)),
            _ => None,
        };

        // Step 7: Annotate + transforms
        let annotator = FormattedValueAnnotator::new(self.catalog);
        for record in page.iter_mut() {
            annotator.annotate_in_place(record);
            for transform in &self.transforms {
                transform.apply(record, self.catalog);
            }
        }

        self.metrics.increment_queries_executed();
        self.metrics.add_records_scanned(records.len() as u64);
        self.metrics.add_records_returned(page.len() as u64);

        let matched = matched.to_string();
        let returned = page.len().to_string();
        let page_number = window.page_number.to_string();
        let more_records = window.more_records.to_string();
        let transforms = self.transform_names().join(",");
        self.logger.event(
            Event::QueryComplete,
            &[
                ("entity", entity),
                ("matched", matched.as_str()),
                ("returned", returned.as_str()),
                ("page", page_number.as_str()),
                ("more_records", more_records.as_str()),
                ("transforms", transforms.as_str()),
            ],
        );

        EntityCollection {
            entity_name: query.entity_name.clone(),
            entities: page,
            more_records: window.more_records,
            paging_cookie: cookie,
            total_record_count,
            total_record_count_limit_exceeded: false,
        }
    }
}

/// Executes `query` over `records` with an empty catalog.
///
/// A default page size of 0 falls back to [`DEFAULT_MAX_RETRIEVE_COUNT`].
/// Date behaviour is not applied since no attribute metadata is known.
pub fn execute(
    query: &QueryExpression,
    records: &[Record],
    default_page_size: u32,
) -> QueryResult<EntityCollection> {
    let page_size = if default_page_size == 0 {
        DEFAULT_MAX_RETRIEVE_COUNT
    } else {
        default_page_size
    };
    let config = EngineConfig::default()
        .with_max_retrieve_count(page_size)
        .with_date_behavior(false);
    let catalog = InMemoryCatalog::new();

    QueryExecutor::new(&catalog, config).execute_expression(query, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AttributeMetadata, DateBehavior, EntityMetadata};
    use crate::query::{
        AggregateColumn, AggregateFunction, AggregateSpec, ColumnSet, ConditionExpression,
        ConditionOperator, FetchExpression, OrderExpression, PagingInfo, QueryByAttribute,
        QueryErrorCode,
    };
    use crate::record::{AliasedValue, AttributeValue, OptionSetValue};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    /// Mock fetch front-end: the query text is the entity name
    struct MockFetch;

    impl FetchTranslator for MockFetch {
        fn translate(&self, fetch: &FetchExpression) -> QueryResult<QueryExpression> {
            Ok(QueryExpression::new(fetch.query.trim()))
        }
    }

    struct UppercaseNames;

    impl RecordTransform for UppercaseNames {
        fn name(&self) -> &'static str {
            "uppercase_names"
        }

        fn apply(&self, record: &mut Record, _catalog: &dyn MetadataCatalog) {
            if let Some(AttributeValue::String(name)) = record.attributes.get_mut("name") {
                *name = name.to_uppercase();
            }
        }
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn contacts(n: u128) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::with_id("contact", id(i))
                    .with("name", format!("Contact {}", i))
                    .with("age", (20 + i) as i64)
            })
            .collect()
    }

    fn ids(result: &EntityCollection) -> Vec<Uuid> {
        result.iter().map(|r| r.id_or_nil()).collect()
    }

    fn quiet() -> EngineConfig {
        EngineConfig::default().with_log_level(crate::observability::Severity::Error)
    }

    #[test]
    fn test_execute_all() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet());
        let records = contacts(3);

        let result = executor
            .execute(&QueryExpression::new("contact").into(), &records)
            .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.entity_name, "contact");
        assert!(!result.more_records);
        assert!(result.paging_cookie.is_none());
        assert_eq!(result.total_record_count, -1);
    }

    #[test]
    fn test_filter_sort_project() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet());
        let records = contacts(5);

        let query = QueryExpression::new("contact")
            .with_condition(ConditionExpression::compare(
                "age",
                ConditionOperator::GreaterThan,
                22,
            ))
            .with_order(OrderExpression::desc("age"))
            .with_columns(ColumnSet::new(["name"]));

        let result = executor.execute(&query.into(), &records).unwrap();
        assert_eq!(ids(&result), vec![id(5), id(4), id(3)]);
        for record in result.iter() {
            assert!(record.contains("name"));
            assert!(!record.contains("age"));
        }
    }

    #[test]
    fn test_paging_first_page_with_cookie() {
        let records = contacts(5);
        let query = QueryExpression::new("contact").with_paging(PagingInfo::page(1, 2));

        let result = execute(&query, &records, 5000).unwrap();
        assert_eq!(ids(&result), vec![id(1), id(2)]);
        assert!(result.more_records);
        assert_eq!(
            result.paging_cookie.as_deref(),
            Some(
                "<cookie page=\"1\"><contactid \
                 last=\"{00000000-0000-0000-0000-000000000002}\" \
                 first=\"{00000000-0000-0000-0000-000000000001}\" /></cookie>"
            )
        );
    }

    #[test]
    fn test_paging_last_page() {
        let records = contacts(5);
        let query = QueryExpression::new("contact").with_paging(PagingInfo::page(3, 2));

        let result = execute(&query, &records, 5000).unwrap();
        assert_eq!(ids(&result), vec![id(5)]);
        assert!(!result.more_records);
        assert!(result.paging_cookie.is_none());
    }

    #[test]
    fn test_default_page_size() {
        let records = contacts(5);
        let query = QueryExpression::new("contact").with_paging(PagingInfo::page(2, 0));

        let result = execute(&query, &records, 2).unwrap();
        assert_eq!(ids(&result), vec![id(3), id(4)]);
        assert!(result.more_records);

        let result = execute(&QueryExpression::new("contact"), &records, 0).unwrap();
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_total_record_count_after_top() {
        let records = contacts(5);
        let query = QueryExpression::new("contact")
            .with_top_count(3)
            .with_paging(PagingInfo::page(1, 2).with_total_record_count());

        let result = execute(&query, &records, 5000).unwrap();
        assert_eq!(result.total_record_count, 3);
        assert_eq!(result.len(), 2);
        assert!(result.more_records);
    }

    #[test]
    fn test_top_zero() {
        let records = contacts(5);
        let result = execute(&QueryExpression::new("contact").with_top_count(0), &records, 0)
            .unwrap();
        assert!(result.is_empty());
        assert!(!result.more_records);
    }

    #[test]
    fn test_distinct_then_top() {
        let records = vec![
            Record::new("contact").with("city", "Oslo"),
            Record::new("contact").with("city", "Oslo"),
            Record::new("contact").with("city", "Rome"),
            Record::new("contact").with("city", "Lima"),
        ];
        let query = QueryExpression::new("contact")
            .with_distinct(true)
            .with_top_count(2);

        let result = execute(&query, &records, 0).unwrap();
        let cities: Vec<_> = result.iter().map(|r| r.get("city").cloned()).collect();
        assert_eq!(
            cities,
            vec![
                Some(AttributeValue::from("Oslo")),
                Some(AttributeValue::from("Rome")),
            ]
        );
    }

    #[test]
    fn test_aggregate_sorted_by_alias() {
        let records: Vec<Record> = (0..6)
            .map(|i| {
                Record::with_id("opportunity", id(i + 1))
                    .with("status", OptionSetValue::new(if i < 4 { 1 } else { 2 }))
                    .with("amount", Decimal::from(10 * (i + 1) as i64))
            })
            .collect();
        let query = QueryExpression::new("opportunity")
            .with_aggregate(
                AggregateSpec::new()
                    .group_by("status")
                    .with(AggregateColumn::new("amount", AggregateFunction::Count, "n"))
                    .with(AggregateColumn::new("amount", AggregateFunction::Sum, "total")),
            )
            .with_order(OrderExpression::asc("n"));

        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet());
        let result = executor.execute(&query.into(), &records).unwrap();

        assert_eq!(result.len(), 2);
        let first = &result.entities[0];
        assert!(first.is_aggregate());
        assert!(first.id.is_none());
        assert_eq!(
            first.get("n"),
            Some(&AttributeValue::from(AliasedValue::new(
                Some("opportunity".into()),
                "amount",
                AttributeValue::Integer(2),
            )))
        );
        assert_eq!(
            first.get("total").map(|v| v.unaliased().clone()),
            Some(AttributeValue::Decimal(Decimal::from(110)))
        );
        assert_eq!(executor.metrics().snapshot().aggregate_queries, 1);
    }

    #[test]
    fn test_by_attribute_request() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet());
        let records = contacts(4);

        let request = QueryByAttribute::new("contact").with_attribute_value("name", "contact 3");
        let result = executor.execute(&request.into(), &records).unwrap();
        assert_eq!(ids(&result), vec![id(3)]);
    }

    #[test]
    fn test_fetch_without_translator_rejected() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet());

        let err = executor
            .execute(&FetchExpression::new("contact").into(), &contacts(2))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::UnsupportedQueryShape);

        let snapshot = executor.metrics().snapshot();
        assert_eq!(snapshot.queries_rejected, 1);
        assert_eq!(snapshot.queries_executed, 0);
    }

    #[test]
    fn test_fetch_with_translator() {
        let catalog = InMemoryCatalog::new();
        let fetch = MockFetch;
        let executor = QueryExecutor::new(&catalog, quiet()).with_fetch_translator(&fetch);

        let result = executor
            .execute(&FetchExpression::new(" contact ").into(), &contacts(2))
            .unwrap();
        assert_eq!(result.entity_name, "contact");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_invalid_expression_rejected() {
        let query = QueryExpression::new("contact").with_condition(ConditionExpression::new(
            "age",
            ConditionOperator::Between,
            vec![AttributeValue::from(1)],
        ));

        let err = execute(&query, &contacts(2), 0).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::InvalidQueryDescription);
    }

    #[test]
    fn test_annotation_and_date_behavior() {
        let catalog = InMemoryCatalog::new().with_entity(
            EntityMetadata::new("contact")
                .with_attribute(AttributeMetadata::picklist("gendercode", [(2, "Female")]))
                .with_attribute(AttributeMetadata::datetime(
                    "birthdate",
                    DateBehavior::DateOnly,
                )),
        );
        let stored = Record::with_id("contact", id(1))
            .with("gendercode", OptionSetValue::new(2))
            .with("birthdate", Utc.with_ymd_and_hms(1990, 5, 17, 13, 30, 0).unwrap());
        let records = vec![stored.clone()];

        let executor = QueryExecutor::new(&catalog, quiet());
        let result = executor
            .execute(&QueryExpression::new("contact").into(), &records)
            .unwrap();

        let record = &result.entities[0];
        assert_eq!(record.formatted_value("gendercode"), Some("Female"));
        assert_eq!(
            record.get("birthdate"),
            Some(&AttributeValue::DateTime(
                Utc.with_ymd_and_hms(1990, 5, 17, 0, 0, 0).unwrap()
            ))
        );

        // Source records are never mutated
        assert_eq!(records[0], stored);
    }

    #[test]
    fn test_date_behavior_disabled() {
        let catalog = InMemoryCatalog::new().with_entity(
            EntityMetadata::new("contact").with_attribute(AttributeMetadata::datetime(
                "birthdate",
                DateBehavior::DateOnly,
            )),
        );
        let when = Utc.with_ymd_and_hms(1990, 5, 17, 13, 30, 0).unwrap();
        let records = vec![Record::with_id("contact", id(1)).with("birthdate", when)];

        let executor = QueryExecutor::new(&catalog, quiet().with_date_behavior(false));
        let result = executor
            .execute(&QueryExpression::new("contact").into(), &records)
            .unwrap();
        assert_eq!(
            result.entities[0].get("birthdate"),
            Some(&AttributeValue::DateTime(when))
        );
    }

    #[test]
    fn test_custom_transform_runs_on_page_only() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet()).with_transform(UppercaseNames);
        let records = contacts(3);

        let query = QueryExpression::new("contact")
            .with_condition(ConditionExpression::eq("name", "CONTACT 2"));
        let result = executor.execute(&query.into(), &records).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(
            result.entities[0].get("name"),
            Some(&AttributeValue::from("CONTACT 2"))
        );
        assert_eq!(records[1].get("name"), Some(&AttributeValue::from("Contact 2")));
    }

    #[test]
    fn test_transform_names_in_run_order() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet()).with_transform(UppercaseNames);
        assert_eq!(
            executor.transform_names(),
            vec!["date_behavior", "uppercase_names"]
        );

        let executor = QueryExecutor::new(&catalog, quiet().with_date_behavior(false));
        assert!(executor.transform_names().is_empty());
    }

    #[test]
    fn test_metrics_updated() {
        let catalog = InMemoryCatalog::new();
        let executor = QueryExecutor::new(&catalog, quiet());
        let records = contacts(5);
        let query = QueryExpression::new("contact").with_paging(PagingInfo::page(1, 2));

        executor.execute(&query.clone().into(), &records).unwrap();
        executor.execute(&query.into(), &records).unwrap();

        let snapshot = executor.metrics().snapshot();
        assert_eq!(snapshot.queries_executed, 2);
        assert_eq!(snapshot.records_scanned, 10);
        assert_eq!(snapshot.records_returned, 4);
    }

    #[test]
    fn test_determinism() {
        let records = contacts(7);
        let query = QueryExpression::new("contact")
            .with_order(OrderExpression::desc("name"))
            .with_paging(PagingInfo::page(2, 3));

        let first = execute(&query, &records, 0).unwrap();
        let second = execute(&query, &records, 0).unwrap();
        assert_eq!(first, second);
    }
}
