use rust_embed::RustEmbed;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("Regex should compile")
    })
}

/// Values substituted into a template.
///
/// [`Context::html`] inserts its value verbatim; user data goes through
/// [`Context::text`] or [`Context::attr`] so it is escaped first.
#[derive(Default)]
pub struct Context {
    values: HashMap<&'static str, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: &'static str, value: &str) -> Self {
        self.values.insert(key, escape(value));
        self
    }

    pub fn attr(mut self, key: &'static str, value: &str) -> Self {
        self.values.insert(key, escape_attr(value));
        self
    }

    pub fn html(mut self, key: &'static str, value: String) -> Self {
        self.values.insert(key, value);
        self
    }
}

pub fn escape(value: &str) -> String {
    html_escape::encode_text(value).to_string()
}

pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).to_string()
}

/// Render the embedded template `name`, replacing `{{ key }}` placeholders.
///
/// Unknown placeholders render as an empty string.
pub fn render(name: &str, ctx: &Context) -> anyhow::Result<String> {
    let template = Templates::get(name)
        .ok_or_else(|| anyhow::anyhow!("Template {} not found", name))?
        .data
        .to_vec();
    let template = String::from_utf8(template)?;

    let html = placeholder_regex().replace_all(&template, |caps: &Captures| {
        ctx.values.get(&caps[1]).cloned().unwrap_or_default()
    });

    Ok(html.into_owned())
}
