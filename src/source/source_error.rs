use thiserror::Error;

/// Longest slice of a failing response body kept for diagnostics.
pub const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("token request failed with HTTP {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("token response has no access_token")]
    MissingAccessToken,

    #[error("listing API error {status}: {body}")]
    Fetch { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Decode(String),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("gave up after {0} pages without reaching the last one")]
    PageLimit(usize),

    #[error("continuation link repeated: {0}")]
    PaginationLoop(String),
}

/// First `BODY_EXCERPT_CHARS` characters of a response body.
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_on_char_boundaries() {
        let body = "é".repeat(BODY_EXCERPT_CHARS + 10);
        let short = excerpt(&body);
        assert_eq!(short.chars().count(), BODY_EXCERPT_CHARS);
    }

    #[test]
    fn excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("denied"), "denied");
    }
}
