// expecta-core/src/infrastructure/rendering/jinja.rs

// Data docs pages are plain minijinja templates compiled into the binary.
// `.html` templates are auto-escaped.

use minijinja::Environment;

use crate::application::ports::TemplateEngine;
use crate::error::ExpectaError;
use crate::infrastructure::error::InfrastructureError;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const VALIDATION_TEMPLATE: &str = "validation.html";

pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    pub fn new() -> Result<Self, InfrastructureError> {
        let mut env = Environment::new();

        env.add_template(INDEX_TEMPLATE, include_str!("../../../templates/index.html"))?;
        env.add_template(
            VALIDATION_TEMPLATE,
            include_str!("../../../templates/validation.html"),
        )?;

        env.add_filter("percent", |value: f64| format!("{value:.1}%"));
        env.add_filter("status", |success: bool| {
            if success { "passed" } else { "failed" }.to_string()
        });

        Ok(Self { env })
    }
}

impl TemplateEngine for JinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, ExpectaError> {
        self.env
            .get_template(template)
            .and_then(|tmpl| tmpl.render(context))
            .map_err(|e| ExpectaError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_render_empty_index() -> Result<()> {
        let renderer = JinjaRenderer::new()?;
        let html = renderer.render(
            INDEX_TEMPLATE,
            &json!({ "site_name": "local_site", "generated_at": "now", "entries": [] }),
        )?;
        assert!(html.contains("No validation results stored yet."));
        assert!(html.contains("local_site"));
        Ok(())
    }

    #[test]
    fn test_index_filters_and_escaping() -> Result<()> {
        let renderer = JinjaRenderer::new()?;
        let html = renderer.render(
            INDEX_TEMPLATE,
            &json!({
                "site_name": "local_site",
                "generated_at": "now",
                "entries": [{
                    "run_name": "Quality",
                    "run_time": "20240309T140507.000000Z",
                    "validation_definition": "<script>",
                    "suite": "volume",
                    "batch_id": "pandas-transactions",
                    "success": false,
                    "successful": 0,
                    "evaluated": 1,
                    "success_percent": 0.0,
                    "link": "validations/volume.html"
                }]
            }),
        )?;
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("0/1 (0.0%)"));
        assert!(html.contains("class=\"failed\""));
        Ok(())
    }

    #[test]
    fn test_unknown_template() -> Result<()> {
        let renderer = JinjaRenderer::new()?;
        assert!(renderer.render("missing.html", &json!({})).is_err());
        Ok(())
    }
}
