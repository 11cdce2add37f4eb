// expecta-core/src/application/docs.rs

use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::application::ports::TemplateEngine;
use crate::domain::result::ValidationResult;
use crate::error::ExpectaError;
use crate::infrastructure::context::FileDataContext;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::rendering::jinja::{INDEX_TEMPLATE, VALIDATION_TEMPLATE};
use crate::ports::results_store::ResultsStore;

// --- VIEW MODELS ---
// Exactly what the pages display.

#[derive(Serialize)]
struct IndexPage<'a> {
    site_name: &'a str,
    generated_at: String,
    entries: Vec<IndexEntry>,
}

#[derive(Serialize)]
struct IndexEntry {
    run_name: String,
    run_time: String,
    validation_definition: String,
    suite: String,
    batch_id: String,
    success: bool,
    successful: usize,
    evaluated: usize,
    success_percent: f64,
    link: String,
}

#[derive(Serialize)]
struct ValidationPage {
    index_link: String,
    validation_definition: String,
    suite: String,
    batch_id: String,
    run_name: String,
    run_time: String,
    success: bool,
    successful: usize,
    evaluated: usize,
    success_percent: f64,
    rules: Vec<RuleRow>,
}

#[derive(Serialize)]
struct RuleRow {
    kind: &'static str,
    description: String,
    success: bool,
    exception: Option<String>,
    observed: Vec<ObservedRow>,
}

#[derive(Serialize)]
struct ObservedRow {
    name: &'static str,
    value: String,
}

/// Where a rendered site can be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocsSiteUrl {
    pub site_name: String,
    pub site_url: String,
}

/// Page of one result, relative to the site root.
fn page_path(result: &ValidationResult) -> PathBuf {
    PathBuf::from("validations")
        .join(&result.suite)
        .join(&result.run_id.run_name)
        .join(result.run_id.run_time_key())
        .join(format!("{}.html", result.batch_id))
}

fn link(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn to_view<T: Serialize>(page: &T) -> Result<serde_json::Value, ExpectaError> {
    Ok(serde_json::to_value(page).map_err(InfrastructureError::from)?)
}

fn file_url(path: &Path) -> Result<String, ExpectaError> {
    let absolute = std::path::absolute(path)?;
    Ok(format!("file://{}", absolute.display()))
}

fn validation_page(result: &ValidationResult, depth: usize) -> ValidationPage {
    let rules = result
        .results
        .iter()
        .map(|r| {
            let o = &r.observed;
            let mut observed = Vec::new();
            if let Some(v) = &o.observed_value {
                observed.push(ObservedRow { name: "observed_value", value: v.to_string() });
            }
            if let Some(v) = o.element_count {
                observed.push(ObservedRow { name: "element_count", value: v.to_string() });
            }
            if let Some(v) = o.missing_count {
                observed.push(ObservedRow { name: "missing_count", value: v.to_string() });
            }
            if let Some(v) = o.unexpected_count {
                observed.push(ObservedRow { name: "unexpected_count", value: v.to_string() });
            }
            if let Some(v) = o.unexpected_percent {
                observed.push(ObservedRow { name: "unexpected_percent", value: format!("{v:.2}%") });
            }
            RuleRow {
                kind: r.expectation.kind(),
                description: r.expectation.describe(),
                success: r.success,
                exception: r.exception.clone(),
                observed,
            }
        })
        .collect();

    ValidationPage {
        index_link: format!("{}index.html", "../".repeat(depth)),
        validation_definition: result.validation_definition.clone(),
        suite: result.suite.clone(),
        batch_id: result.batch_id.clone(),
        run_name: result.run_id.run_name.clone(),
        run_time: result.run_id.run_time.to_rfc3339(),
        success: result.success,
        successful: result.statistics.successful_expectations,
        evaluated: result.statistics.evaluated_expectations,
        success_percent: result.statistics.success_percent,
        rules,
    }
}

/// Renders the named sites (all configured sites when `site_names` is empty)
/// from every result held by the store.
#[instrument(skip_all, fields(store = store.backend_name()))]
pub fn build_data_docs(
    context: &FileDataContext,
    store: &dyn ResultsStore,
    renderer: &dyn TemplateEngine,
    site_names: &[String],
) -> Result<Vec<DocsSiteUrl>, ExpectaError> {
    let mut results = store.list()?;
    // Newest run first
    results.sort_by(|a, b| {
        b.run_id
            .run_time
            .cmp(&a.run_id.run_time)
            .then_with(|| a.validation_definition.cmp(&b.validation_definition))
    });

    let mut urls = Vec::new();
    for (site_name, site) in context.data_docs_sites() {
        if !site_names.is_empty() && !site_names.contains(site_name) {
            continue;
        }
        let site_dir = context.paths().in_context(&site.base_directory);

        let mut entries = Vec::with_capacity(results.len());
        for result in &results {
            let relative = page_path(result);
            let depth = relative.components().count() - 1;
            let page = validation_page(result, depth);
            let html = renderer.render(VALIDATION_TEMPLATE, &to_view(&page)?)?;
            atomic_write(site_dir.join(&relative), html)?;

            entries.push(IndexEntry {
                run_name: page.run_name,
                run_time: page.run_time,
                validation_definition: page.validation_definition,
                suite: page.suite,
                batch_id: page.batch_id,
                success: page.success,
                successful: page.successful,
                evaluated: page.evaluated,
                success_percent: page.success_percent,
                link: link(&relative),
            });
        }

        let index = IndexPage {
            site_name,
            generated_at: Utc::now().to_rfc3339(),
            entries,
        };
        let html = renderer.render(INDEX_TEMPLATE, &to_view(&index)?)?;
        let index_path = site_dir.join("index.html");
        atomic_write(&index_path, html)?;

        let site_url = file_url(&index_path)?;
        info!(site = %site_name, url = %site_url, results = results.len(), "Built data docs");
        urls.push(DocsSiteUrl {
            site_name: site_name.clone(),
            site_url,
        });
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::DataDocsSite;
    use crate::domain::expectation::Expectation;
    use crate::domain::result::{ExpectationResult, ObservedMetrics, RunIdentifier};
    use crate::infrastructure::adapters::FileResultsStore;
    use crate::infrastructure::config::project::ProjectPaths;
    use crate::infrastructure::rendering::JinjaRenderer;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn stored_result(store: &FileResultsStore, success: bool) -> Result<ValidationResult> {
        let result = ValidationResult::new(
            "volume",
            "volume",
            "pandas-transactions",
            &RunIdentifier::now("Quality"),
            vec![ExpectationResult::passed(
                Expectation::row_count(21),
                success,
                ObservedMetrics {
                    observed_value: Some(serde_json::json!(21)),
                    ..Default::default()
                },
            )],
        );
        store.store(&result)?;
        Ok(result)
    }

    #[test]
    fn test_build_default_site() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path());
        let context = FileDataContext::create(&paths)?;
        let store = FileResultsStore::new(paths.in_context("uncommitted/validations"));
        let result = stored_result(&store, true)?;

        let urls = build_data_docs(&context, &store, &JinjaRenderer::new()?, &[])?;

        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].site_name, "local_site");
        assert!(urls[0].site_url.starts_with("file://"));
        assert!(urls[0].site_url.ends_with("gx/uncommitted/data_docs/local_site/index.html"));

        let site = paths.in_context("uncommitted/data_docs/local_site");
        let index = fs::read_to_string(site.join("index.html"))?;
        assert!(index.contains("volume"));
        assert!(site.join(page_path(&result)).is_file());

        let page = fs::read_to_string(site.join(page_path(&result)))?;
        assert!(page.contains("table must have exactly 21 rows"));
        assert!(page.contains("href=\"../../../../index.html\""));
        Ok(())
    }

    #[test]
    fn test_only_named_sites_are_rebuilt() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path());
        let mut context = FileDataContext::create(&paths)?;
        context.add_data_docs_site("team_site", DataDocsSite::for_name("team_site"))?;
        let store = FileResultsStore::new(paths.in_context("uncommitted/validations"));

        let urls = build_data_docs(
            &context,
            &store,
            &JinjaRenderer::new()?,
            &["team_site".to_string()],
        )?;

        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].site_name, "team_site");
        assert!(!paths.in_context("uncommitted/data_docs/local_site/index.html").exists());
        Ok(())
    }
}
