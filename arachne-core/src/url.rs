use thiserror::Error;
use url::Url;

pub const DEFAULT_SCHEME: &str = "https";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("URL must not contain whitespace: '{0}'")]
    Whitespace(String),

    #[error("'{input}' is not a valid URL: {source}")]
    Parse {
        input: String,
        source: url::ParseError,
    },

    #[error("URL has no host: '{0}'")]
    MissingHost(String),
}

/// Normalizes user input into a crawl root.
///
/// A missing scheme becomes `https://`. The text is otherwise kept as typed,
/// so `example.com` becomes `https://example.com` with no trailing slash.
/// The crawler compares links against this exact string.
pub fn normalize_url(input: &str) -> Result<String, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(UrlError::Whitespace(trimmed.to_string()));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, trimmed)
    };

    let parsed = Url::parse(&candidate).map_err(|source| UrlError::Parse {
        input: trimmed.to_string(),
        source,
    })?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(candidate));
    }

    Ok(candidate)
}

/// True when `input` starts with `scheme://`.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
