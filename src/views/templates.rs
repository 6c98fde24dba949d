//! HTML templates, compiled into the binary.

use std::sync::Arc;

use minijinja::{Environment, Value};
use serde::Serialize;

pub const LAYOUT: &str = "layout.html";
pub const LOGIN: &str = "login.html";
pub const SECRET: &str = "secret.html";

/// Values a page template can refer to.
#[derive(Debug, Default, Serialize)]
pub struct PageData<'a> {
    pub request_path: &'a str,
    pub user: Option<&'a str>,
    pub csrf_field: &'a str,
    pub csrf_token: &'a str,
}

/// Shared, read-only template set.
#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Compile the built-in templates. `.html` templates are auto-escaped.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("text", text_filter);
        env.add_template(LAYOUT, include_str!("../../templates/layout.html"))?;
        env.add_template(LOGIN, include_str!("../../templates/login.html"))?;
        env.add_template(SECRET, include_str!("../../templates/secret.html"))?;
        Ok(Self { env: Arc::new(env) })
    }

    pub fn render(&self, name: &str, data: &PageData<'_>) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(data)
    }
}

fn text_filter(value: String) -> Value {
    Value::from_safe_string(escape_text(&value))
}

/// Escape markup characters for element content.
///
/// The default HTML escaper also rewrites `/`, which would mangle paths.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_shows_request_path() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(LAYOUT, &PageData { request_path: "/", ..Default::default() })
            .unwrap();
        assert!(html.contains("Hello, you've requested: /"));
    }

    #[test]
    fn login_greets_user_and_embeds_token() {
        let templates = Templates::new().unwrap();
        let data = PageData {
            user: Some("Test"),
            csrf_field: "CSRFToken",
            csrf_token: "abc_-123",
            ..Default::default()
        };
        let html = templates.render(LOGIN, &data).unwrap();
        assert!(html.contains("Login Form"));
        assert!(html.contains("Hello Test"));
        assert!(html.contains(r#"name="CSRFToken" value="abc_-123""#));
    }

    #[test]
    fn values_are_escaped() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(LAYOUT, &PageData { request_path: "/<script>", ..Default::default() })
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("/&lt;script&gt;"));
    }

    #[test]
    fn anonymous_login_page_has_no_greeting() {
        let templates = Templates::new().unwrap();
        let html = templates.render(LOGIN, &PageData::default()).unwrap();
        assert!(html.contains("Login Form"));
        assert!(!html.contains("Hello "));
    }
}
