// expecta-core/src/application/validation.rs

// Evaluates one suite against the loaded snapshot. Each rule becomes a few
// COUNT queries; a rule that cannot be measured is reported as a failed
// result carrying the exception, never as an error of the run.

use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::domain::context::ValidationDefinition;
use crate::domain::expectation::Expectation;
use crate::domain::expectation::evaluation::{ColumnMapMetrics, exact_count_success};
use crate::domain::result::{ExpectationResult, ObservedMetrics, RunIdentifier, ValidationResult};
use crate::domain::suite::ExpectationSuite;
use crate::error::ExpectaError;
use crate::ports::connector::{ColumnSchema, Connector};

/// Double-quoted SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[instrument(skip_all, fields(definition = %definition.name, suite = %suite.name))]
pub async fn validate_suite(
    connector: &dyn Connector,
    definition: &ValidationDefinition,
    suite: &ExpectationSuite,
    run_id: &RunIdentifier,
) -> Result<ValidationResult, ExpectaError> {
    let table = &definition.data.asset;
    let columns = connector.fetch_columns(table).await?;

    let mut results = Vec::with_capacity(suite.expectations.len());
    for expectation in &suite.expectations {
        let result = evaluate(connector, table, &columns, expectation).await;
        if let Some(exception) = &result.exception {
            warn!(rule = expectation.kind(), %exception, "Rule could not be evaluated");
        } else {
            debug!(rule = expectation.kind(), success = result.success, "Rule evaluated");
        }
        results.push(result);
    }

    Ok(ValidationResult::new(
        &definition.name,
        &suite.name,
        &definition.data.batch_id(),
        run_id,
        results,
    ))
}

async fn evaluate(
    connector: &dyn Connector,
    table: &str,
    columns: &[ColumnSchema],
    expectation: &Expectation,
) -> ExpectationResult {
    if let Some(column) = expectation.column()
        && !matches!(expectation, Expectation::ExpectColumnToExist(_))
        && !columns.iter().any(|c| c.name == column)
    {
        return ExpectationResult::raised(
            expectation.clone(),
            format!("column '{column}' not found in table '{table}'"),
        );
    }

    match measure(connector, table, columns, expectation).await {
        Ok((success, observed)) => ExpectationResult::passed(expectation.clone(), success, observed),
        Err(e) => ExpectationResult::raised(expectation.clone(), e.to_string()),
    }
}

async fn measure(
    connector: &dyn Connector,
    table: &str,
    columns: &[ColumnSchema],
    expectation: &Expectation,
) -> Result<(bool, ObservedMetrics), ExpectaError> {
    let from = quote_ident(table);

    match expectation {
        Expectation::ExpectColumnValuesToBeBetween(rule) => {
            let col = quote_ident(&rule.column);
            let (element_count, non_null) = null_counts(connector, &from, &col).await?;

            let mut conditions = Vec::new();
            if let Some(min) = rule.min_value {
                conditions.push(format!("{col} >= {min}"));
            }
            if let Some(max) = rule.max_value {
                conditions.push(format!("{col} <= {max}"));
            }
            // Nulls are not evaluated by range rules
            let unexpected_count = if conditions.is_empty() {
                0
            } else {
                connector
                    .query_scalar(&format!(
                        "SELECT COUNT(*) FROM {from} WHERE {col} IS NOT NULL AND NOT ({})",
                        conditions.join(" AND ")
                    ))
                    .await?
            };

            let metrics = ColumnMapMetrics {
                element_count,
                missing_count: element_count.saturating_sub(non_null),
                evaluated_count: non_null,
                unexpected_count,
            };
            Ok((metrics.is_success(rule.mostly), map_observed(&metrics)))
        }
        Expectation::ExpectColumnValuesToNotBeNull(rule) => {
            let col = quote_ident(&rule.column);
            let (element_count, non_null) = null_counts(connector, &from, &col).await?;
            let missing_count = element_count.saturating_sub(non_null);

            let metrics = ColumnMapMetrics {
                element_count,
                missing_count,
                evaluated_count: element_count,
                unexpected_count: missing_count,
            };
            Ok((metrics.is_success(rule.mostly), map_observed(&metrics)))
        }
        Expectation::ExpectColumnValuesToBeNull(rule) => {
            let col = quote_ident(&rule.column);
            let (element_count, non_null) = null_counts(connector, &from, &col).await?;

            let metrics = ColumnMapMetrics {
                element_count,
                missing_count: element_count.saturating_sub(non_null),
                evaluated_count: element_count,
                unexpected_count: non_null,
            };
            Ok((metrics.is_success(rule.mostly), map_observed(&metrics)))
        }
        Expectation::ExpectColumnToExist(rule) => {
            let exists = columns.iter().any(|c| c.name == rule.column);
            Ok((
                exists,
                ObservedMetrics {
                    observed_value: Some(json!(exists)),
                    ..Default::default()
                },
            ))
        }
        Expectation::ExpectTableColumnCountToEqual(rule) => {
            let observed = columns.len() as u64;
            Ok((
                exact_count_success(observed, rule.value),
                ObservedMetrics {
                    observed_value: Some(json!(observed)),
                    ..Default::default()
                },
            ))
        }
        Expectation::ExpectTableRowCountToEqual(rule) => {
            let observed = connector
                .query_scalar(&format!("SELECT COUNT(*) FROM {from}"))
                .await?;
            Ok((
                exact_count_success(observed, rule.value),
                ObservedMetrics {
                    observed_value: Some(json!(observed)),
                    ..Default::default()
                },
            ))
        }
    }
}

/// (row count, non-null count) of one column.
async fn null_counts(
    connector: &dyn Connector,
    from: &str,
    col: &str,
) -> Result<(u64, u64), ExpectaError> {
    let element_count = connector
        .query_scalar(&format!("SELECT COUNT(*) FROM {from}"))
        .await?;
    let non_null = connector
        .query_scalar(&format!("SELECT COUNT({col}) FROM {from}"))
        .await?;
    Ok((element_count, non_null))
}

fn map_observed(metrics: &ColumnMapMetrics) -> ObservedMetrics {
    ObservedMetrics {
        observed_value: None,
        element_count: Some(metrics.element_count),
        missing_count: Some(metrics.missing_count),
        unexpected_count: Some(metrics.unexpected_count),
        unexpected_percent: Some(metrics.unexpected_percent()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::blueprint::Blueprint;
    use crate::domain::context::BatchRef;
    use crate::infrastructure::adapters::DataFusionConnector;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::Path;

    fn definition(suite: &str) -> ValidationDefinition {
        ValidationDefinition {
            name: suite.to_string(),
            data: BatchRef {
                data_source: "pandas".into(),
                asset: "transactions".into(),
                batch_definition: "transactions batch".into(),
            },
            suite: suite.to_string(),
        }
    }

    fn blueprint_suite(name: &str) -> ExpectationSuite {
        Blueprint::transactions()
            .suites
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
    }

    async fn run(connector: &DataFusionConnector, suite: &str) -> Result<ValidationResult> {
        Ok(validate_suite(
            connector,
            &definition(suite),
            &blueprint_suite(suite),
            &RunIdentifier::now("Quality"),
        )
        .await?)
    }

    /// `transactions` with the given ids and `null_ratings` null ratings among `rows` rows.
    async fn transactions(rows: usize, null_ratings: usize, id_of: impl Fn(usize) -> i64) -> Result<DataFusionConnector> {
        let connector = DataFusionConnector::new();
        let values: Vec<String> = (0..rows)
            .map(|i| {
                let rating = if i < null_ratings { "NULL".to_string() } else { "4.0".to_string() };
                format!("({}, 'C{i}', 10, 25.5, '2024-03-01', {rating})", id_of(i))
            })
            .collect();
        connector
            .execute(&format!(
                "CREATE TABLE transactions (transaction_id BIGINT, customer_id VARCHAR, product_id BIGINT, amount DOUBLE, purchase_date VARCHAR, product_rating DOUBLE) AS VALUES {}",
                values.join(", ")
            ))
            .await?;
        Ok(connector)
    }

    #[tokio::test]
    async fn test_distribution_rejects_out_of_range_id() -> Result<()> {
        let connector = transactions(21, 17, |i| if i == 0 { 1500 } else { 1001 + i as i64 % 20 }).await?;
        let result = run(&connector, "distribution").await?;
        assert!(!result.success);
        assert_eq!(result.results[0].observed.unexpected_count, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_distribution_accepts_in_range_id() -> Result<()> {
        let connector = transactions(21, 17, |i| if i == 0 { 1010 } else { 1001 + i as i64 % 20 }).await?;
        let result = run(&connector, "distribution").await?;
        assert!(result.success);
        Ok(())
    }

    #[tokio::test]
    async fn test_missingness_tolerance_boundary() -> Result<()> {
        let at_threshold = transactions(100, 80, |i| 1001 + i as i64 % 20).await?;
        let result = run(&at_threshold, "missingness").await?;
        assert!(result.success, "80% nulls meets mostly = 0.8");

        let below = transactions(100, 79, |i| 1001 + i as i64 % 20).await?;
        let result = run(&below, "missingness").await?;
        assert!(!result.success);
        let null_rule = &result.results[1];
        assert!(!null_rule.success);
        assert_eq!(null_rule.observed.unexpected_count, Some(21));
        Ok(())
    }

    #[tokio::test]
    async fn test_volume_and_schema() -> Result<()> {
        let exact = transactions(21, 17, |i| 1001 + i as i64 % 20).await?;
        assert!(run(&exact, "volume").await?.success);
        assert!(run(&exact, "schema").await?.success);

        let short = transactions(20, 16, |i| 1001 + i as i64).await?;
        let result = run(&short, "volume").await?;
        assert!(!result.success);
        assert_eq!(result.results[0].observed.observed_value, Some(json!(20)));
        Ok(())
    }

    #[tokio::test]
    async fn test_five_columns_fail_schema() -> Result<()> {
        let connector = DataFusionConnector::new();
        connector
            .execute("CREATE TABLE transactions (transaction_id BIGINT, customer_id VARCHAR, product_id BIGINT, amount DOUBLE, purchase_date VARCHAR) AS VALUES (1001, 'C1', 10, 25.5, '2024-03-01')")
            .await?;
        let result = run(&connector, "schema").await?;
        assert!(!result.success);
        assert!(result.results[0].success, "purchase_date still exists");
        assert!(!result.results[1].success);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_column_is_captured_on_the_rule() -> Result<()> {
        let connector = DataFusionConnector::new();
        connector
            .execute("CREATE TABLE transactions (transaction_id BIGINT) AS VALUES (1001), (1002)")
            .await?;
        let result = run(&connector, "missingness").await?;
        assert!(!result.success);
        assert!(result.results.iter().all(|r| r.exception.is_some()));
        assert_eq!(result.statistics.unsuccessful_expectations, 2);
        Ok(())
    }

    // --- MOCK CONNECTOR ---
    struct FailingConnector;

    #[async_trait]
    impl Connector for FailingConnector {
        async fn execute(&self, _query: &str) -> Result<(), ExpectaError> {
            Ok(())
        }
        async fn register_source(&self, _name: &str, _path: &Path) -> Result<u64, ExpectaError> {
            Ok(0)
        }
        async fn fetch_columns(&self, _table_name: &str) -> Result<Vec<ColumnSchema>, ExpectaError> {
            Ok(vec![ColumnSchema {
                name: "transaction_id".into(),
                data_type: "Int64".into(),
                is_nullable: true,
            }])
        }
        async fn query_scalar(&self, _query: &str) -> Result<u64, ExpectaError> {
            Err(ExpectaError::InternalError("engine unavailable".into()))
        }
        fn engine_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_metric_failure_becomes_exception() -> Result<()> {
        let result = validate_suite(
            &FailingConnector,
            &definition("distribution"),
            &blueprint_suite("distribution"),
            &RunIdentifier::now("Quality"),
        )
        .await?;
        assert!(!result.success);
        assert!(
            result.results[0]
                .exception
                .as_deref()
                .is_some_and(|e| e.contains("engine unavailable"))
        );
        Ok(())
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("transactions"), "\"transactions\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
