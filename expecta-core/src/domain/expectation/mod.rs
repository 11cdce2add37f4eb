// expecta-core/src/domain/expectation/mod.rs

pub mod evaluation;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub use evaluation::{ColumnMapMetrics, MOSTLY_TOLERANCE};

/// One declarative check, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    ExpectColumnValuesToBeBetween(ColumnValuesBetween),
    ExpectColumnValuesToNotBeNull(ColumnValuesNotNull),
    ExpectColumnValuesToBeNull(ColumnValuesNull),
    ExpectColumnToExist(ColumnToExist),
    ExpectTableColumnCountToEqual(TableColumnCountEqual),
    ExpectTableRowCountToEqual(TableRowCountEqual),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_bounds"))]
pub struct ColumnValuesBetween {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "mostly must be within [0, 1]"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mostly: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnValuesNotNull {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    #[validate(range(min = 0.0, max = 1.0, message = "mostly must be within [0, 1]"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mostly: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnValuesNull {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    #[validate(range(min = 0.0, max = 1.0, message = "mostly must be within [0, 1]"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mostly: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnToExist {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TableColumnCountEqual {
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TableRowCountEqual {
    pub value: u64,
}

fn validate_bounds(rule: &ColumnValuesBetween) -> Result<(), ValidationError> {
    match (rule.min_value, rule.max_value) {
        (None, None) => Err(ValidationError::new("missing_bounds")
            .with_message("at least one of min_value / max_value is required".into())),
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("inverted_bounds")
            .with_message(format!("min_value {min} is greater than max_value {max}").into())),
        _ => Ok(()),
    }
}

impl Expectation {
    pub fn between(column: &str, min_value: f64, max_value: f64) -> Self {
        Self::ExpectColumnValuesToBeBetween(ColumnValuesBetween {
            column: column.to_string(),
            min_value: Some(min_value),
            max_value: Some(max_value),
            mostly: None,
        })
    }

    pub fn not_null(column: &str) -> Self {
        Self::ExpectColumnValuesToNotBeNull(ColumnValuesNotNull {
            column: column.to_string(),
            mostly: None,
        })
    }

    pub fn null(column: &str, mostly: Option<f64>) -> Self {
        Self::ExpectColumnValuesToBeNull(ColumnValuesNull {
            column: column.to_string(),
            mostly,
        })
    }

    pub fn column_exists(column: &str) -> Self {
        Self::ExpectColumnToExist(ColumnToExist {
            column: column.to_string(),
        })
    }

    pub fn column_count(value: u64) -> Self {
        Self::ExpectTableColumnCountToEqual(TableColumnCountEqual { value })
    }

    pub fn row_count(value: u64) -> Self {
        Self::ExpectTableRowCountToEqual(TableRowCountEqual { value })
    }

    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExpectColumnValuesToBeBetween(_) => "expect_column_values_to_be_between",
            Self::ExpectColumnValuesToNotBeNull(_) => "expect_column_values_to_not_be_null",
            Self::ExpectColumnValuesToBeNull(_) => "expect_column_values_to_be_null",
            Self::ExpectColumnToExist(_) => "expect_column_to_exist",
            Self::ExpectTableColumnCountToEqual(_) => "expect_table_column_count_to_equal",
            Self::ExpectTableRowCountToEqual(_) => "expect_table_row_count_to_equal",
        }
    }

    /// Target column, for column-level rules.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::ExpectColumnValuesToBeBetween(r) => Some(&r.column),
            Self::ExpectColumnValuesToNotBeNull(r) => Some(&r.column),
            Self::ExpectColumnValuesToBeNull(r) => Some(&r.column),
            Self::ExpectColumnToExist(r) => Some(&r.column),
            Self::ExpectTableColumnCountToEqual(_) | Self::ExpectTableRowCountToEqual(_) => None,
        }
    }

    pub fn validate_params(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::ExpectColumnValuesToBeBetween(r) => r.validate(),
            Self::ExpectColumnValuesToNotBeNull(r) => r.validate(),
            Self::ExpectColumnValuesToBeNull(r) => r.validate(),
            Self::ExpectColumnToExist(r) => r.validate(),
            Self::ExpectTableColumnCountToEqual(r) => r.validate(),
            Self::ExpectTableRowCountToEqual(r) => r.validate(),
        }
    }

    /// Short human readable rendering used by the data docs.
    pub fn describe(&self) -> String {
        match self {
            Self::ExpectColumnValuesToBeBetween(r) => {
                let bounds = match (r.min_value, r.max_value) {
                    (Some(min), Some(max)) => format!("between {min} and {max}"),
                    (Some(min), None) => format!("at least {min}"),
                    (None, Some(max)) => format!("at most {max}"),
                    (None, None) => "unbounded".to_string(),
                };
                format!("{} values must be {}{}", r.column, bounds, mostly_suffix(r.mostly))
            }
            Self::ExpectColumnValuesToNotBeNull(r) => {
                format!("{} values must not be null{}", r.column, mostly_suffix(r.mostly))
            }
            Self::ExpectColumnValuesToBeNull(r) => {
                format!("{} values must be null{}", r.column, mostly_suffix(r.mostly))
            }
            Self::ExpectColumnToExist(r) => format!("column {} must exist", r.column),
            Self::ExpectTableColumnCountToEqual(r) => {
                format!("table must have exactly {} columns", r.value)
            }
            Self::ExpectTableRowCountToEqual(r) => {
                format!("table must have exactly {} rows", r.value)
            }
        }
    }
}

fn mostly_suffix(mostly: Option<f64>) -> String {
    match mostly {
        Some(m) => format!(", at least {}% of the time", m * 100.0),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_serde_tag_roundtrip() -> Result<()> {
        let rule = Expectation::null("product_rating", Some(0.8));
        let yaml = serde_yaml::to_string(&rule)?;
        assert!(yaml.contains("type: expect_column_values_to_be_null"));
        assert!(yaml.contains("mostly: 0.8"));

        let back: Expectation = serde_yaml::from_str(&yaml)?;
        assert_eq!(back, rule);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let rule = Expectation::between("transaction_id", 1020.0, 1001.0);
        assert!(rule.validate_params().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_bounds() -> Result<()> {
        let rule: Expectation = serde_yaml::from_str(
            "type: expect_column_values_to_be_between\ncolumn: transaction_id\n",
        )?;
        assert!(rule.validate_params().is_err());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_mostly_out_of_range() {
        let rule = Expectation::null("product_rating", Some(1.5));
        assert!(rule.validate_params().is_err());
    }

    #[test]
    fn test_validate_accepts_fixed_rules() {
        for rule in [
            Expectation::between("transaction_id", 1001.0, 1020.0),
            Expectation::not_null("customer_id"),
            Expectation::null("product_rating", Some(0.8)),
            Expectation::column_exists("purchase_date"),
            Expectation::column_count(6),
            Expectation::row_count(21),
        ] {
            assert!(rule.validate_params().is_ok(), "{} should be valid", rule.kind());
        }
    }

    #[test]
    fn test_column_accessor() {
        assert_eq!(
            Expectation::not_null("customer_id").column(),
            Some("customer_id")
        );
        assert_eq!(Expectation::row_count(21).column(), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            Expectation::between("transaction_id", 1001.0, 1020.0).describe(),
            "transaction_id values must be between 1001 and 1020"
        );
        assert_eq!(
            Expectation::null("product_rating", Some(0.8)).describe(),
            "product_rating values must be null, at least 80% of the time"
        );
    }
}
