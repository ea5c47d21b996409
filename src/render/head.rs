//! Document head collection.
//!
//! Components add title, meta, link and script tags while they render; the
//! collected tags are returned alongside the fragment and handed to the
//! document. Each render gets its own `Head`, nothing is shared between
//! requests.

use serde::Serialize;

use crate::render::markup::{escape_attr, escape_html};

/// Attributes identifying a meta tag. A later tag with the same key replaces
/// the earlier one.
const META_KEYS: &[&str] = &["name", "property", "http-equiv", "charset"];

type Attrs = Vec<(String, String)>;

#[derive(Debug, Clone, Default)]
pub struct Head {
    title: Option<String>,
    meta: Vec<Attrs>,
    link: Vec<Attrs>,
    script: Vec<(Attrs, String)>,
}

impl Head {
    /// Last title set wins, so a page overrides the app's default.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn meta<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let attrs = collect(attrs);
        match meta_key(&attrs) {
            Some(key) => {
                self.meta.retain(|existing| meta_key(existing) != Some(key.clone()));
                self.meta.push(attrs);
            }
            None => self.meta.push(attrs),
        }
    }

    pub fn link<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.link.push(collect(attrs));
    }

    /// Inline script content is written as-is; callers own its escaping.
    pub fn script<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>, content: impl Into<String>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.script.push((collect(attrs), content.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.meta.is_empty() && self.link.is_empty() && self.script.is_empty()
    }

    /// Render the collected tags to markup, grouped by kind.
    pub fn render(&self) -> HeadTags {
        HeadTags {
            title: self
                .title
                .as_ref()
                .map(|t| format!("<title>{}</title>", escape_html(t)))
                .unwrap_or_default(),
            meta: self.meta.iter().map(|a| format!("<meta{}>", attributes(a))).collect(),
            link: self.link.iter().map(|a| format!("<link{}>", attributes(a))).collect(),
            script: self
                .script
                .iter()
                .map(|(a, content)| format!("<script{}>{}</script>", attributes(a), content))
                .collect(),
        }
    }
}

/// Rendered head markup handed to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadTags {
    pub title: String,
    pub meta: String,
    pub link: String,
    pub script: String,
}

fn collect<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Attrs
where
    K: Into<String>,
    V: Into<String>,
{
    attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

fn meta_key(attrs: &Attrs) -> Option<(String, String)> {
    attrs.iter().find_map(|(k, v)| {
        let k = k.to_ascii_lowercase();
        if META_KEYS.contains(&k.as_str()) {
            // charset has one slot regardless of value
            let v = if k == "charset" { String::new() } else { v.clone() };
            Some((k, v))
        } else {
            None
        }
    })
}

fn attributes(attrs: &Attrs) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(" {}=\"{}\"", k, escape_attr(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_title_wins() {
        let mut head = Head::default();
        head.set_title("App");
        head.set_title("Page <1>");
        assert_eq!(head.render().title, "<title>Page &lt;1&gt;</title>");
    }

    #[test]
    fn test_meta_deduplicated_by_name() {
        let mut head = Head::default();
        head.meta([("name", "description"), ("content", "app")]);
        head.meta([("property", "og:title"), ("content", "x")]);
        head.meta([("name", "description"), ("content", "page")]);

        let tags = head.render();
        assert_eq!(
            tags.meta,
            "<meta property=\"og:title\" content=\"x\"><meta name=\"description\" content=\"page\">"
        );
    }

    #[test]
    fn test_links_and_scripts_accumulate() {
        let mut head = Head::default();
        head.link([("rel", "icon"), ("href", "/favicon.ico")]);
        head.script([("type", "application/ld+json")], "{}");
        head.script(Vec::<(String, String)>::new(), "var a = 1;");

        let tags = head.render();
        assert_eq!(tags.link, "<link rel=\"icon\" href=\"/favicon.ico\">");
        assert_eq!(
            tags.script,
            "<script type=\"application/ld+json\">{}</script><script>var a = 1;</script>"
        );
    }

    #[test]
    fn test_empty_head_renders_nothing() {
        let head = Head::default();
        assert!(head.is_empty());
        assert_eq!(head.render(), HeadTags::default());
    }
}
