//! Template rendering with the fixed function library.

use std::io::Write;

use minijinja::{Environment, ErrorKind};
use tracing::trace;

use crate::record::Message;

/// Renders normalized records through a user-supplied template.
pub struct Renderer {
    template: String,
}

impl Renderer {
    /// Creates a renderer over the given template source.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Renders one message and writes the bytes to `out`.
    ///
    /// The template is compiled fresh on every call; templates are small
    /// enough that correctness beats caching here. Errors are message
    /// local: the caller logs them and moves on.
    ///
    /// # Errors
    ///
    /// Returns an error when the template fails to compile or execute, or
    /// when the sink rejects the write.
    pub fn render<W: Write>(&self, message: &Message, out: &mut W) -> anyhow::Result<()> {
        let mut env = Environment::new();
        env.add_function("re", re);
        env.add_function("join", join);
        env.add_function("strip", strip);
        env.add_template("message", &self.template)?;

        let rendered = env.get_template("message")?.render(message)?;
        trace!(bytes = rendered.len(), "rendered message");

        out.write_all(rendered.as_bytes())?;
        Ok(())
    }
}

/// `re(pattern, text)`: does `text` match the regular expression?
///
/// The pattern is compiled fresh on every call; an invalid pattern is a
/// rendering error for the current message only.
fn re(pattern: String, text: String) -> Result<bool, minijinja::Error> {
    let compiled = regex::Regex::new(&pattern).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid pattern {pattern:?}: {e}"),
        )
    })?;
    Ok(compiled.is_match(&text))
}

/// `join(separator, values)`: concatenates `values` with `separator`.
fn join(separator: String, values: Vec<String>) -> String {
    values.join(&separator)
}

/// `strip(text)`: removes all markup and decodes HTML entities.
fn strip(text: String) -> String {
    nanohtml2text::html2text(&text)
}
