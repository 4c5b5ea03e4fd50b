//! Built-in templates using the Tera template engine
//!
//! Templates are embedded in the binary; `layout.html` is the page shell the
//! listing and post templates extend.

use std::collections::HashMap;

use tera::{Context, Tera};

use crate::error::BuildError;
use crate::helpers::html_escape;

/// Template renderer with the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self, BuildError> {
        let mut tera = Tera::default();

        // Values are escaped explicitly with `escape_html`; rendered post
        // bodies are inserted as-is
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("default/layout.html")),
            ("index.html", include_str!("default/index.html")),
            ("post.html", include_str!("default/post.html")),
        ])
        .map_err(|source| BuildError::Template {
            template: "layout.html".to_string(),
            source,
        })?;

        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, BuildError> {
        self.tera
            .render(template_name, context)
            .map_err(|source| BuildError::Template {
                template: template_name.to_string(),
                source,
            })
    }
}

/// Tera filter: escape HTML special characters
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_html", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}
