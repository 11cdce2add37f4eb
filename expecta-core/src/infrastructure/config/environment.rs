// expecta-core/src/infrastructure/config/environment.rs

// Environment-provided configuration. Declarations on disk keep `${VAR}`
// placeholders; values are resolved when a command needs them.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::infrastructure::error::InfrastructureError;

pub const RESULTS_STORE_URL_VAR: &str = "EXPECTA_RESULTS_STORE_URL";
pub const RESULTS_STORE_TABLE_VAR: &str = "EXPECTA_RESULTS_STORE_TABLE";

fn re_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap_or_else(|_| {
            // The pattern is a literal, this branch is never taken.
            Regex::new("$^").unwrap_or_else(|_| unreachable!())
        })
    })
}

fn re_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

pub fn placeholder(var: &str) -> String {
    format!("${{{var}}}")
}

pub fn require_env(var: &str) -> Result<String, InfrastructureError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(InfrastructureError::MissingEnvironment(var.to_string())),
    }
}

/// Replaces every `${VAR}` with the process environment value.
pub fn resolve_placeholders(value: &str) -> Result<String, InfrastructureError> {
    resolve_with(value, |name| std::env::var(name).ok())
}

pub fn resolve_with<F>(value: &str, lookup: F) -> Result<String, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = String::with_capacity(value.len());
    let mut last = 0;
    for caps in re_placeholder().captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let replacement = lookup(name.as_str())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| InfrastructureError::MissingEnvironment(name.as_str().to_string()))?;
        debug!(variable = name.as_str(), "Resolved configuration placeholder");
        resolved.push_str(&value[last..whole.start()]);
        resolved.push_str(&replacement);
        last = whole.end();
    }
    resolved.push_str(&value[last..]);
    Ok(resolved)
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted.
pub fn validate_identifier(name: &str) -> Result<(), InfrastructureError> {
    if re_identifier().is_match(name) {
        Ok(())
    } else {
        Err(InfrastructureError::ConfigError(format!(
            "'{name}' is not a valid SQL table name"
        )))
    }
}

/// Connection settings of the relational results store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsStoreEnv {
    pub connection_string: String,
    pub table: String,
}

impl ResultsStoreEnv {
    /// Reads both variables. Missing values are fatal configuration errors.
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let connection_string = require_env(RESULTS_STORE_URL_VAR)?;
        let table = require_env(RESULTS_STORE_TABLE_VAR)?;
        validate_identifier(&table)?;
        Ok(Self {
            connection_string,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "DB_URL" => Some("duckdb:///tmp/results.duckdb".to_string()),
            "EMPTY" => Some("  ".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_resolve_placeholders() -> Result<(), InfrastructureError> {
        assert_eq!(
            resolve_with("${DB_URL}", lookup)?,
            "duckdb:///tmp/results.duckdb"
        );
        assert_eq!(
            resolve_with("prefix-${DB_URL}-suffix", lookup)?,
            "prefix-duckdb:///tmp/results.duckdb-suffix"
        );
        assert_eq!(resolve_with("no placeholder", lookup)?, "no placeholder");
        Ok(())
    }

    #[test]
    fn test_missing_placeholder_is_fatal() {
        let res = resolve_with("${NOT_SET}", lookup);
        assert!(matches!(res, Err(InfrastructureError::MissingEnvironment(v)) if v == "NOT_SET"));

        let res = resolve_with("${EMPTY}", lookup);
        assert!(matches!(res, Err(InfrastructureError::MissingEnvironment(_))));
    }

    #[test]
    fn test_placeholder_format() {
        assert_eq!(
            placeholder(RESULTS_STORE_URL_VAR),
            "${EXPECTA_RESULTS_STORE_URL}"
        );
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("validation_results").is_ok());
        assert!(validate_identifier("results; DROP TABLE x").is_err());
        assert!(validate_identifier("1results").is_err());
    }
}
