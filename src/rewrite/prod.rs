//! Production export: a copy of the output tree with root-relative URLs
//! turned into document-relative ones, for hosts that serve the site from
//! a sub-directory.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::RuleSet;
use crate::utils::path::{collect_all_files, copy_file, write_file};

/// Extensions whose content is rewritten; everything else is copied as is.
const TEXT_EXTS: &[&str] = &["html", "css", "js", "php"];

/// `/assets/` and `/../assets/`, with whatever dots precede them.
static ASSET_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.{0,2})/(\.\./)?assets/").unwrap());

/// `/../assets/` → `../assets/` and `/assets/` → `./assets/` in one pass.
///
/// A replacement is never matched again, and URLs that are already
/// relative (`./assets/`, `../assets/`) are kept.
pub fn relativize_assets(text: &str) -> Cow<'_, str> {
    ASSET_URL.replace_all(text, |caps: &Captures<'_>| {
        if !caps[1].is_empty() {
            caps[0].to_string()
        } else if caps.get(2).is_some() {
            "../assets/".to_string()
        } else {
            "./assets/".to_string()
        }
    })
}

/// Relativizing rewrites for the production copy.
#[derive(Debug, Clone)]
pub struct ProdRewriter {
    /// Links to a locale root, quoted (`"/ar"`) or unquoted (`href=/ar>`)
    /// as minified HTML writes them.
    locale_links: Option<Regex>,
    redirect: RuleSet,
}

impl ProdRewriter {
    pub fn new(langs: &[String], default_lang: &str) -> Self {
        let locale_links = (!langs.is_empty())
            .then(|| {
                let alternatives: Vec<String> = langs.iter().map(|lang| regex::escape(lang)).collect();
                format!(r#"(["']|=)/({})(["'\s>])"#, alternatives.join("|"))
            })
            .and_then(|pattern| Regex::new(&pattern).ok());

        let redirect = RuleSet::new().with(
            "redirect-url",
            format!(r#"url=/{default_lang}""#),
            format!(r#"url="./{default_lang}""#),
        );

        Self {
            locale_links,
            redirect,
        }
    }

    /// The redirect rule runs before the locale links, which would
    /// otherwise claim its `=/{lang}"`.
    pub fn apply(&self, text: &str) -> String {
        let text = self.redirect.apply(&relativize_assets(text));
        match &self.locale_links {
            Some(links) => links.replace_all(&text, "${1}../${2}${3}").into_owned(),
            None => text,
        }
    }
}

/// Copy `dist` to `prod`, rewriting text files with `rewriter`.
///
/// Any previous `prod` tree is replaced. Returns the number of files written.
pub fn export_prod(dist: &Path, prod: &Path, rewriter: &ProdRewriter) -> io::Result<usize> {
    if prod.exists() {
        fs::remove_dir_all(prod)?;
    }

    let files = collect_all_files(dist);
    for file in &files {
        let rel = file.strip_prefix(dist).unwrap_or(file);
        let target = prod.join(rel);

        if is_text(file) {
            let content = fs::read_to_string(file)?;
            write_file(&target, rewriter.apply(&content))?;
        } else {
            copy_file(file, &target)?;
        }
    }
    Ok(files.len())
}

fn is_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rewriter() -> ProdRewriter {
        ProdRewriter::new(&["ar".to_string(), "en".to_string()], "en")
    }

    #[test]
    fn test_rules_relativize() {
        let html = r#"<link href="/assets/css/style.min.css"><a href="/ar">ع</a><img src="/../assets/x.png">"#;
        assert_eq!(
            rewriter().apply(html),
            r#"<link href="./assets/css/style.min.css"><a href="../ar">ع</a><img src="../assets/x.png">"#
        );
    }

    #[test]
    fn test_both_asset_forms_in_one_document() {
        let css = "a{background:url(/../assets/a.png)}b{background:url(/assets/b.png)}c{background:url(/../assets/c.png)}";
        assert_eq!(
            relativize_assets(css),
            "a{background:url(../assets/a.png)}b{background:url(./assets/b.png)}c{background:url(../assets/c.png)}"
        );
    }

    #[test]
    fn test_relative_asset_urls_kept() {
        let html = r#"<img src="./assets/a.png"><img src="../assets/b.png">"#;
        assert_eq!(relativize_assets(html), html);
    }

    #[test]
    fn test_unquoted_locale_links() {
        assert_eq!(
            rewriter().apply("<a href=/ar>ع</a><a href=/en >en</a><a href=/arabic>x</a>"),
            "<a href=../ar>ع</a><a href=../en >en</a><a href=/arabic>x</a>"
        );
    }

    #[test]
    fn test_redirect_url_rule() {
        assert_eq!(
            rewriter().apply(r#"content="0; url=/en" />"#),
            r#"content="0; url="./en" />"#
        );
    }

    #[test]
    fn test_export_copies_binary_untouched() {
        let temp = TempDir::new().unwrap();
        let dist = temp.path().join("dist");
        let prod = temp.path().join("prod");
        write_file(&dist.join("en/index.html"), r#"<a href="/en">x</a>"#).unwrap();
        write_file(&dist.join("assets/images/a.png"), b"/assets/\x89PNG").unwrap();
        write_file(&prod.join("stale.html"), "old").unwrap();

        let count = export_prod(&dist, &prod, &rewriter()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(prod.join("en/index.html")).unwrap(),
            r#"<a href="../en">x</a>"#
        );
        assert_eq!(fs::read(prod.join("assets/images/a.png")).unwrap(), b"/assets/\x89PNG");
        assert!(!prod.join("stale.html").exists());
    }
}
