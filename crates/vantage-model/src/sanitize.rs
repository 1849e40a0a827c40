//! Sanitization for user-entered text
//!
//! Dashboard names, descriptions, and text-widget bodies all arrive from
//! free-form input fields. These helpers strip markup down to either plain
//! text or a small allow-list of inline formatting. All functions are pure
//! and never panic on any input.

use crate::error::ValidationError;
use crate::MAX_NAME_LEN;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("hard-coded pattern"));
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("hard-coded pattern"));
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("hard-coded pattern"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("hard-coded pattern"));
static SLUG_DROP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9 \-]").expect("hard-coded pattern"));
static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("hard-coded pattern"));

/// Inline tags that survive [`sanitize_formatted_text`]
const ALLOWED_INLINE: [&str; 5] = ["b", "strong", "i", "em", "br"];

/// Strip all markup, returning plain text
///
/// Script and style elements are removed together with their contents;
/// every other tag is removed but its text is kept. Basic HTML entities are
/// decoded and whitespace runs collapse to single spaces.
#[must_use]
pub fn sanitize_plain_text(input: &str) -> String {
    let without_blocks = strip_dangerous_blocks(input);
    let without_tags = TAG.replace_all(&without_blocks, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RUN.replace_all(&decoded, " ").trim().to_string()
}

/// Strip markup except a small inline-formatting allow-list
///
/// `b`, `strong`, `i`, `em`, and `br` survive, re-emitted bare so any
/// attributes (event handlers included) are dropped. Script- and
/// style-bearing elements are removed with their contents unconditionally.
#[must_use]
pub fn sanitize_formatted_text(input: &str) -> String {
    let without_blocks = strip_dangerous_blocks(input);
    let filtered = TAG.replace_all(&without_blocks, |caps: &Captures<'_>| {
        let closing = &caps[1];
        let name = caps[2].to_ascii_lowercase();
        if !ALLOWED_INLINE.contains(&name.as_str()) {
            return String::from(" ");
        }
        if name == "br" {
            // self-closing either way; a closing </br> is dropped
            if closing.is_empty() {
                String::from("<br>")
            } else {
                String::from(" ")
            }
        } else {
            format!("<{closing}{name}>")
        }
    });
    let decoded = decode_entities(&filtered);
    WHITESPACE_RUN.replace_all(&decoded, " ").trim().to_string()
}

/// Sanitize a display name, rejecting empty or over-long results
///
/// # Errors
/// - [`ValidationError::EmptyName`] when nothing survives sanitization
/// - [`ValidationError::NameTooLong`] when the result exceeds `max_len`
pub fn sanitize_name(input: &str, max_len: usize) -> Result<String, ValidationError> {
    let name = sanitize_plain_text(input);
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len > max_len {
        return Err(ValidationError::NameTooLong { max: max_len, len });
    }
    Ok(name)
}

/// [`sanitize_name`] with the workspace-wide [`MAX_NAME_LEN`]
///
/// # Errors
/// See [`sanitize_name`].
pub fn sanitize_name_default(input: &str) -> Result<String, ValidationError> {
    sanitize_name(input, MAX_NAME_LEN)
}

/// Reduce arbitrary text to a url-safe slug
///
/// Lowercases, drops everything but alphanumerics, spaces, and hyphens,
/// collapses whitespace runs to single hyphens, collapses repeated hyphens,
/// and trims leading/trailing hyphens.
#[must_use]
pub fn sanitize_slug(input: &str) -> String {
    let lowered = input.to_lowercase();
    let kept = SLUG_DROP.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUN.replace_all(kept.trim(), "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

fn strip_dangerous_blocks(input: &str) -> String {
    let no_scripts = SCRIPT_BLOCK.replace_all(input, " ");
    STYLE_BLOCK.replace_all(&no_scripts, " ").into_owned()
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_passes_clean_input_through() {
        assert_eq!(sanitize_plain_text("Sales Dashboard 2024"), "Sales Dashboard 2024");
    }

    #[test]
    fn plain_text_strips_tags_but_keeps_content() {
        assert_eq!(sanitize_plain_text("<p>Quarterly <b>revenue</b></p>"), "Quarterly revenue");
    }

    #[test]
    fn plain_text_drops_script_contents() {
        assert_eq!(sanitize_plain_text("before<script>alert('x')</script>after"), "before after");
        assert_eq!(sanitize_plain_text("<style>body{}</style>text"), "text");
    }

    #[test]
    fn plain_text_decodes_entities_and_collapses_whitespace() {
        assert_eq!(sanitize_plain_text("a&nbsp;&amp;&nbsp;b \n\t c"), "a & b c");
    }

    #[test]
    fn non_markup_angle_text_survives() {
        assert_eq!(sanitize_plain_text("x < 3 and y > 4"), "x < 3 and y > 4");
    }

    #[test]
    fn formatted_text_keeps_allowed_inline_tags() {
        assert_eq!(
            sanitize_formatted_text("<b>bold</b> and <em>stress</em><br>next"),
            "<b>bold</b> and <em>stress</em><br>next"
        );
    }

    #[test]
    fn formatted_text_drops_attributes_from_allowed_tags() {
        assert_eq!(
            sanitize_formatted_text(r#"<b onclick="steal()">bold</b>"#),
            "<b>bold</b>"
        );
    }

    #[test]
    fn formatted_text_removes_disallowed_elements() {
        assert_eq!(
            sanitize_formatted_text(r#"<a href="x">link</a><script>no()</script>"#),
            "link"
        );
        assert_eq!(sanitize_formatted_text("<img src=x onerror=pwn()>"), "");
    }

    #[test]
    fn name_rejects_empty_inputs() {
        assert_eq!(sanitize_name_default(""), Err(ValidationError::EmptyName));
        assert_eq!(sanitize_name_default("   "), Err(ValidationError::EmptyName));
        assert_eq!(
            sanitize_name_default("<script></script>"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn name_rejects_overlong_inputs() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            sanitize_name_default(&long),
            Err(ValidationError::NameTooLong { max: MAX_NAME_LEN, len: MAX_NAME_LEN + 1 })
        );
    }

    #[test]
    fn name_accepts_ordinary_titles() {
        assert_eq!(sanitize_name_default("Sales Dashboard 2024").unwrap(), "Sales Dashboard 2024");
    }

    #[test]
    fn slug_reduces_to_url_safe_form() {
        assert_eq!(sanitize_slug("My Cool Dashboard!@#$"), "my-cool-dashboard");
        assert_eq!(sanitize_slug("  spaced   out  "), "spaced-out");
        assert_eq!(sanitize_slug("already-a-slug"), "already-a-slug");
        assert_eq!(sanitize_slug("---"), "");
    }

    proptest::proptest! {
        #[test]
        fn slug_output_is_always_url_safe(input in ".*") {
            let slug = sanitize_slug(&input);
            proptest::prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            proptest::prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }
}
