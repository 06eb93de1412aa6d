//! Lightweight HTML scraping helpers
//!
//! These are regex based and tolerate malformed markup; they are not a
//! DOM parser. Nested elements of the same tag match the innermost closing
//! tag first.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ToolError;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .expect("script/style pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("anchor pattern is valid")
});

static IMG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b([^>]*)/?>").expect("img pattern is valid"));

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern is valid")
});

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("tag name pattern is valid"));

/// All visible text, one text run per line
pub fn visible_text(html: &str) -> String {
    let cleaned = SCRIPT_STYLE.replace_all(html, "");
    let spaced = TAG.replace_all(&cleaned, "\n");
    let decoded = html_escape::decode_html_entities(&spaced);

    decoded
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text content of a fragment with each text run trimmed and concatenated
pub fn inner_text(fragment: &str) -> String {
    let cleaned = SCRIPT_STYLE.replace_all(fragment, "");
    TAG.split(&cleaned)
        .map(|run| html_escape::decode_html_entities(run).trim().to_string())
        .collect()
}

/// Value of attribute `name` in the raw attribute text of an opening tag
pub fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTR.captures_iter(attrs)
        .find(|c| c[1].eq_ignore_ascii_case(name))
        .map(|c| {
            let raw = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| m.as_str())
                .unwrap_or("");
            html_escape::decode_html_entities(raw).into_owned()
        })
}

/// `(text, href)` for every anchor carrying an href
pub fn links(html: &str) -> Vec<(String, String)> {
    let cleaned = SCRIPT_STYLE.replace_all(html, "");
    ANCHOR
        .captures_iter(&cleaned)
        .filter_map(|c| {
            let href = attribute(&c[1], "href")?;
            Some((inner_text(&c[2]), href))
        })
        .collect()
}

/// `(alt, src)` for every image with a non-empty src
pub fn images(html: &str) -> Vec<(String, String)> {
    let cleaned = SCRIPT_STYLE.replace_all(html, "");
    IMG.captures_iter(&cleaned)
        .filter_map(|c| {
            let src = attribute(&c[1], "src").filter(|s| !s.is_empty())?;
            let alt = attribute(&c[1], "alt").unwrap_or_else(|| "No alt text".to_string());
            Some((alt, src))
        })
        .collect()
}

/// Text of every `<tag>...</tag>` element in document order
pub fn elements_by_tag(html: &str, tag: &str) -> Result<Vec<String>, ToolError> {
    if !TAG_NAME.is_match(tag) {
        return Err(ToolError::InvalidParams(format!("Invalid tag name: {}", tag)));
    }
    let pattern = Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}\s*>"))
        .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
    let cleaned = SCRIPT_STYLE.replace_all(html, "");
    Ok(pattern
        .captures_iter(&cleaned)
        .map(|c| inner_text(&c[1]))
        .collect())
}
