use crate::error::ExpectaError;

/// Renders a named data docs page from a serialized view model.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, ExpectaError>;
}
