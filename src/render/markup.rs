//! Markup helpers shared by the renderer and built-in components.

use serde_json::Value;

pub const DOCTYPE: &str = "<!doctype html>";

/// Attribute marking the root element of hydratable output.
pub const HYDRATION_ROOT_ATTR: &str = "data-rext-root";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Mark a fragment as hydratable.
///
/// The attribute goes on the first element; text-only or empty output is
/// wrapped in a `div` so there is always an element to attach to.
pub fn mark_hydration_root(html: &str) -> String {
    let trimmed = html.trim_start();
    let lead = html.len() - trimmed.len();

    if let Some(rest) = trimmed.strip_prefix('<') {
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(rest.len());
        let starts_element = rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if starts_element && name_len < rest.len() {
            let at = lead + 1 + name_len;
            return format!("{} {}=\"\"{}", &html[..at], HYDRATION_ROOT_ATTR, &html[at..]);
        }
    }

    format!("<div {}=\"\">{}</div>", HYDRATION_ROOT_ATTR, html)
}

/// Serialize state for an inline `<script>`.
///
/// Escapes sequences that would end the script element or break a
/// JavaScript string literal.
pub fn serialize_state(state: &Value) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(state)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(escape_attr("say \"hi\" 'x'"), "say &quot;hi&quot; &#39;x&#39;");
    }

    #[test]
    fn test_mark_hydration_root_on_first_element() {
        assert_eq!(
            mark_hydration_root("<main class=\"x\"><p>a</p></main>"),
            "<main data-rext-root=\"\" class=\"x\"><p>a</p></main>"
        );
        assert_eq!(mark_hydration_root("<div>a</div>"), "<div data-rext-root=\"\">a</div>");
    }

    #[test]
    fn test_mark_hydration_root_wraps_text() {
        assert_eq!(mark_hydration_root("hello"), "<div data-rext-root=\"\">hello</div>");
        assert_eq!(mark_hydration_root(""), "<div data-rext-root=\"\"></div>");
        assert_eq!(
            mark_hydration_root("<!-- c --><p>x</p>"),
            "<div data-rext-root=\"\"><!-- c --><p>x</p></div>"
        );
    }

    #[test]
    fn test_serialize_state_escapes_script_end() {
        let state = json!({ "html": "</script><script>alert(1)</script>" });
        let out = serialize_state(&state).unwrap();
        assert!(!out.contains("</script>"));
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), state);
    }
}
