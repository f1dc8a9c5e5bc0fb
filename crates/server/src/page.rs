//! Chat page rendering.

use handlebars::Handlebars;
use serde::Serialize;
use stemtutor_core::{AppError, AppResult};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");

/// Values substituted into the chat page.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub title: String,
    pub tagline: String,
    pub samples: Vec<String>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            title: "STEM Tutor".to_string(),
            tagline: "Physics, chemistry, biology and math questions answered from \
                      curated notes and open science datasets."
                .to_string(),
            samples: [
                "What is Newton's second law?",
                "Explain photosynthesis",
                "How do covalent bonds form?",
                "What is the Pythagorean theorem?",
                "What does DNA do?",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Render the chat page. Values are HTML-escaped.
pub fn render_index(context: &PageContext) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("index", INDEX_TEMPLATE)
        .map_err(|e| AppError::Other(format!("Failed to register page template: {}", e)))?;

    handlebars
        .render("index", context)
        .map_err(|e| AppError::Other(format!("Failed to render page: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_page() {
        let html = render_index(&PageContext::default()).unwrap();
        assert!(html.contains("<title>STEM Tutor</title>"));
        assert!(html.contains("Explain photosynthesis"));
        assert!(html.contains("/api/chat"));
    }

    #[test]
    fn test_values_are_escaped() {
        let context = PageContext {
            title: "<script>".to_string(),
            tagline: String::new(),
            samples: vec![],
        };
        let html = render_index(&context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<title><script></title>"));
    }
}
