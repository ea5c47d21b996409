//! Components the server ships with.
//!
//! A build that only emits page fragments is servable with these registered
//! as `_document` and `_app`.

use std::fmt::Write;

use crate::component::{Component, RenderScope};
use crate::render::error::RenderError;
use crate::render::markup::{escape_attr, serialize_state};

/// Pre-rendered HTML, returned verbatim.
#[derive(Debug, Clone)]
pub struct StaticFragment {
    html: String,
}

impl StaticFragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

impl Component for StaticFragment {
    fn render(&self, _scope: &mut RenderScope<'_>) -> Result<String, RenderError> {
        Ok(self.html.clone())
    }
}

/// Renders the page unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApp;

impl Component for DefaultApp {
    fn render(&self, scope: &mut RenderScope<'_>) -> Result<String, RenderError> {
        scope.render_child()
    }
}

/// Minimal html/head/body shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDocument;

impl Component for DefaultDocument {
    fn render(&self, scope: &mut RenderScope<'_>) -> Result<String, RenderError> {
        let doc = scope
            .document()
            .ok_or_else(|| RenderError::new("document rendered without document props"))?;

        let mut out = String::with_capacity(doc.body.len() + 512);
        out.push_str("<html><head><meta charset=\"utf-8\">");
        out.push_str(&doc.head.title);
        out.push_str(&doc.head.meta);
        out.push_str(&doc.head.link);
        for style in &doc.page_styles {
            write!(out, "<link rel=\"stylesheet\" href=\"{}\">", escape_attr(&doc.asset_url(style)))?;
        }
        out.push_str("</head><body>");

        write!(out, "<div id=\"{}\">{}</div>", escape_attr(&doc.id), doc.body)?;

        let state = match &doc.state {
            Some(state) => serialize_state(state)?,
            None => "null".to_string(),
        };
        write!(out, "<script>window.{}={}</script>", doc.context, state)?;

        for script in &doc.page_scripts {
            write!(out, "<script src=\"{}\"></script>", escape_attr(&doc.asset_url(script)))?;
        }
        out.push_str(&doc.head.script);
        out.push_str("</body></html>");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{component, RenderMode};
    use crate::render::document::DocumentProps;
    use crate::render::head::{Head, HeadTags};
    use serde_json::{json, Value};

    #[test]
    fn test_default_app_renders_page() {
        let page = component(|scope| Ok(format!("<p>{}</p>", scope.prop("n").unwrap_or(&Value::Null))));
        let props = json!({ "n": 1 });
        let mut head = Head::default();
        let mut scope = RenderScope::new(RenderMode::Hydratable, &props, &mut head).with_child(&*page);
        assert_eq!(DefaultApp.render(&mut scope).unwrap(), "<p>1</p>");
    }

    #[test]
    fn test_default_document_layout() {
        let doc = DocumentProps {
            body: "<p>hi</p>".into(),
            page_scripts: vec!["about.js".into()],
            page_styles: vec!["about.css".into()],
            state: Some(json!({ "a": "</script>" })),
            head: HeadTags {
                title: "<title>About</title>".into(),
                ..HeadTags::default()
            },
            context: "__REXT__".into(),
            id: "__rext".into(),
            public_path: "/static/".into(),
        };
        let props = Value::Null;
        let mut head = Head::default();
        let mut scope = RenderScope::new(RenderMode::Static, &props, &mut head).with_document(&doc);
        let html = DefaultDocument.render(&mut scope).unwrap();

        assert!(html.starts_with("<html><head><meta charset=\"utf-8\"><title>About</title>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"/static/about.css\">"));
        assert!(html.contains("<div id=\"__rext\"><p>hi</p></div>"));
        assert!(html.contains("<script>window.__REXT__={\"a\":\"\\u003c/script\\u003e\"}</script>"));
        assert!(html.contains("<script src=\"/static/about.js\"></script>"));
    }

    #[test]
    fn test_default_document_requires_props() {
        let props = Value::Null;
        let mut head = Head::default();
        let mut scope = RenderScope::new(RenderMode::Static, &props, &mut head);
        assert!(DefaultDocument.render(&mut scope).is_err());
    }
}
