//! Template rendering.
//!
//! Every template under the source root is loaded into one Tera instance and
//! named by its path relative to that root (`pages/index.html`,
//! `comps/blog/index.nunjucks`, `partials/nav.nunjucks`), so templates can
//! `extends` and `include` each other with Nunjucks-style paths.

mod pages;

pub use pages::{LocaleOutput, RenderFailure, RenderPlan, RenderedPage, render_locale};

use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use thiserror::Error;

use crate::locale::Mapping;
use crate::utils::path::{collect_all_files, slash_relative};

/// File extensions treated as templates, in lookup priority order.
pub const TEMPLATE_EXTS: &[&str] = &["nunjucks", "njk", "html"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load templates from `{0}`")]
    Load(PathBuf, #[source] tera::Error),

    #[error("failed to render `{template}`")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },

    #[error("template `{0}` not found")]
    NotFound(String),

    #[error("`{template}` writes the same file as `{kept}`")]
    Collision { template: String, kept: String },
}

impl RenderError {
    /// Full cause chain on one line; Tera keeps the useful part in `source()`.
    pub fn detail(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            parts.push(err.to_string());
            source = err.source();
        }
        parts.join(": ")
    }
}

/// Stateless renderer over a fixed set of templates.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load every template below `root`, skipping the `exclude` directories.
    pub fn load(root: &Path, exclude: &[PathBuf]) -> Result<Self, RenderError> {
        let mut files: Vec<(PathBuf, Option<String>)> = collect_all_files(root)
            .into_iter()
            .filter(|path| is_template(path))
            .filter(|path| !exclude.iter().any(|dir| path.starts_with(dir)))
            .map(|path| {
                let name = slash_relative(&path, root);
                (path, Some(name))
            })
            .collect();
        files.sort();

        let mut tera = Self::empty_tera();
        tera.add_template_files(files)
            .map_err(|e| RenderError::Load(root.to_path_buf(), e))?;
        Ok(Self { tera })
    }

    /// Build a renderer from in-memory `(name, source)` pairs.
    #[cfg(test)]
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RenderError> {
        let mut tera = Self::empty_tera();
        tera.add_raw_templates(sources.into_iter().collect::<Vec<_>>())
            .map_err(|e| RenderError::Load(PathBuf::new(), e))?;
        Ok(Self { tera })
    }

    fn empty_tera() -> Tera {
        let mut tera = Tera::default();
        tera.autoescape_on(TEMPLATE_EXTS.to_vec());
        tera
    }

    /// Render `template` with `data` as its context.
    pub fn render(&self, template: &str, data: &Mapping) -> Result<String, RenderError> {
        if !self.has_template(template) {
            return Err(RenderError::NotFound(template.to_string()));
        }
        let context = Context::from_serialize(data).map_err(|source| RenderError::Render {
            template: template.to_string(),
            source,
        })?;
        self.tera
            .render(template, &context)
            .map_err(|source| RenderError::Render {
                template: template.to_string(),
                source,
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Resolve `stem` (e.g. `comps/blog/index`) to a loaded template name.
    pub fn find_template(&self, stem: &str) -> Option<String> {
        TEMPLATE_EXTS
            .iter()
            .map(|ext| format!("{stem}.{ext}"))
            .find(|name| self.has_template(name))
    }

    /// Template names under `prefix/`, sorted.
    pub fn templates_under(&self, prefix: &str) -> Vec<String> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        let mut names: Vec<String> = self
            .tera
            .get_template_names()
            .filter(|name| name.starts_with(&prefix))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }
}

/// Position of `path`'s extension in [`TEMPLATE_EXTS`].
pub(crate) fn template_rank(path: &Path) -> usize {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| TEMPLATE_EXTS.iter().position(|e| *e == ext))
        .unwrap_or(TEMPLATE_EXTS.len())
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn data(value: serde_json::Value) -> Mapping {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_simple() {
        let renderer = Renderer::from_sources([("pages/index.html", "<h1>{{ title }}</h1>")]).unwrap();
        let html = renderer
            .render("pages/index.html", &data(json!({"title": "Home"})))
            .unwrap();
        assert_eq!(html, "<h1>Home</h1>");
    }

    #[test]
    fn test_undefined_key_is_error() {
        let renderer = Renderer::from_sources([("pages/index.html", "{{ missing }}")]).unwrap();
        let err = renderer
            .render("pages/index.html", &Mapping::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::Render { .. }));
        assert!(err.detail().contains("pages/index.html"));
    }

    #[test]
    fn test_malformed_template_fails_load() {
        let result = Renderer::from_sources([("pages/index.html", "{% if %}")]);
        assert!(matches!(result, Err(RenderError::Load(..))));
    }

    #[test]
    fn test_missing_template() {
        let renderer = Renderer::from_sources([("pages/index.html", "x")]).unwrap();
        let err = renderer.render("pages/nope.html", &Mapping::new()).unwrap_err();
        assert!(matches!(err, RenderError::NotFound(_)));
    }

    #[test]
    fn test_extends_across_directories() {
        let renderer = Renderer::from_sources([
            (
                "layouts/base.nunjucks",
                "<html lang=\"en\">{% block body %}{% endblock %}</html>",
            ),
            (
                "pages/about.nunjucks",
                "{% extends \"layouts/base.nunjucks\" %}{% block body %}{{ title }}{% endblock %}",
            ),
        ])
        .unwrap();
        let html = renderer
            .render("pages/about.nunjucks", &data(json!({"title": "About"})))
            .unwrap();
        assert_eq!(html, "<html lang=\"en\">About</html>");
    }

    #[test]
    fn test_autoescape() {
        let renderer = Renderer::from_sources([("pages/a.html", "{{ x }}|{{ x | safe }}")]).unwrap();
        let html = renderer
            .render("pages/a.html", &data(json!({"x": "<b>"})))
            .unwrap();
        assert_eq!(html, "&lt;b&gt;|<b>");
    }

    #[test]
    fn test_find_template_priority() {
        let renderer = Renderer::from_sources([
            ("comps/blog/index.html", "html"),
            ("comps/blog/index.nunjucks", "nunjucks"),
        ])
        .unwrap();
        assert_eq!(
            renderer.find_template("comps/blog/index").as_deref(),
            Some("comps/blog/index.nunjucks")
        );
        assert_eq!(renderer.find_template("comps/work/index"), None);
    }

    #[test]
    fn test_load_from_disk_skips_excluded() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::create_dir_all(root.join("assets/vendor")).unwrap();
        fs::write(root.join("pages/index.html"), "{{ title }}").unwrap();
        fs::write(root.join("assets/vendor/broken.html"), "{% if %}").unwrap();

        let renderer = Renderer::load(root, &[root.join("assets")]).unwrap();
        assert_eq!(renderer.templates_under("pages"), vec!["pages/index.html"]);
    }
}
