//! Inputs to the document component.

use serde::Serialize;
use serde_json::Value;

use crate::render::head::HeadTags;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentProps {
    /// Hydratable app markup.
    pub body: String,
    pub page_scripts: Vec<String>,
    pub page_styles: Vec<String>,
    pub state: Option<Value>,
    pub head: HeadTags,
    /// Client-side variable holding `state`.
    pub context: String,
    /// Id of the mount element wrapping `body`.
    pub id: String,
    pub public_path: String,
}

impl DocumentProps {
    /// Asset URL as the browser should request it.
    pub fn asset_url(&self, asset: &str) -> String {
        if asset.starts_with('/') || asset.starts_with("http") {
            return asset.to_string();
        }
        let base = self.public_path.trim_end_matches('/');
        format!("{}/{}", base, asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(public_path: &str) -> DocumentProps {
        DocumentProps {
            body: String::new(),
            page_scripts: vec![],
            page_styles: vec![],
            state: None,
            head: HeadTags::default(),
            context: "__REXT__".into(),
            id: "__rext".into(),
            public_path: public_path.into(),
        }
    }

    #[test]
    fn test_asset_url() {
        let p = props("/static/");
        assert_eq!(p.asset_url("about.js"), "/static/about.js");
        assert_eq!(p.asset_url("/abs.js"), "/abs.js");

        let cdn = props("https://cdn.example.com/app");
        assert_eq!(cdn.asset_url("a.css"), "https://cdn.example.com/app/a.css");
        assert_eq!(cdn.asset_url("https://x.test/b.js"), "https://x.test/b.js");
    }
}
