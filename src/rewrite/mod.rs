//! Literal text rewrites applied to rendered HTML.
//!
//! Templates reference development asset names (`script.js`, `style.css`)
//! and are authored in the source language (`lang="en" dir="ltr"`). Each
//! locale gets an ordered [`RuleSet`] that points them at the minified,
//! direction-specific files. Replacements are plain substring swaps, not
//! DOM-aware: a token used outside its intended context is rewritten too.
//!
//! Rule order per locale:
//!
//! | # | rule             | from            | to                  | applies to      |
//! |---|------------------|-----------------|---------------------|-----------------|
//! | 1 | `min-script`     | `script.js`     | `script.min.js`     | all             |
//! | 2 | `min-style`      | `style.css`     | `style.min.css`     | all             |
//! | 3 | `rtl-style`      | `style.min.css` | `style-rtl.min.css` | RTL locales     |
//! | 4 | `rtl-dir`        | `dir="ltr"`     | `dir="rtl"`         | RTL locales     |
//! | 5 | `lang-attr`      | `lang="{src}"`  | `lang="{code}"`     | non-source lang |
//!
//! Rule 3 depends on rule 2 having run.

mod critical;
mod prod;

pub use critical::{CriticalCss, critical_path_rules, inject_critical_css};
pub use prod::{ProdRewriter, export_prod};

use std::borrow::Cow;

use crate::asset::minify::minify_html;
use crate::locale::Locale;

/// One literal substring replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub name: &'static str,
    pub from: String,
    pub to: String,
}

impl RewriteRule {
    pub fn new(name: &'static str, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.from.is_empty() || !text.contains(self.from.as_str()) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.replace(self.from.as_str(), &self.to))
    }
}

/// An ordered list of rewrite rules, applied front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rules.push(RewriteRule::new(name, from, to));
        self
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            if let Cow::Owned(next) = rule.apply(&current) {
                current = next;
            }
        }
        current
    }

    /// Asset and locale rewrites for pages of `locale`.
    ///
    /// `source_lang` is the language templates are authored in.
    pub fn for_locale(locale: &Locale, source_lang: &str) -> Self {
        let mut rules = Self::new()
            .with("min-script", "script.js", "script.min.js")
            .with("min-style", "style.css", "style.min.css");

        if locale.direction.is_rtl() {
            rules = rules
                .with("rtl-style", "style.min.css", "style-rtl.min.css")
                .with("rtl-dir", r#"dir="ltr""#, r#"dir="rtl""#);
        }

        if locale.code != source_lang {
            rules = rules.with(
                "lang-attr",
                format!(r#"lang="{source_lang}""#),
                format!(r#"lang="{}""#, locale.code),
            );
        }

        rules
    }
}

/// Apply the locale's asset and locale rewrites to rendered HTML.
pub fn post_process(html: &str, locale: &Locale, source_lang: &str) -> String {
    RuleSet::for_locale(locale, source_lang).apply(html)
}

/// Everything that happens to a page between rendering and disk.
pub struct PageFinisher<'a> {
    pub source_lang: &'a str,
    pub minify: bool,
    pub placeholder: &'a str,
    pub critical: &'a CriticalCss,
}

impl PageFinisher<'_> {
    /// locale rewrites → minify → critical CSS inline → critical path fix
    ///
    /// The rewrites match quoted attributes, which the minifier unquotes, so
    /// they run first.
    pub fn finish(&self, html: &str, locale: &Locale) -> String {
        let html = post_process(html, locale, self.source_lang);
        let html = if self.minify { minify_html(&html) } else { html };
        let html = match self.critical.for_direction(locale.direction) {
            Some(css) => inject_critical_css(&html, self.placeholder, css),
            None => html,
        };
        critical_path_rules().apply(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic_example() {
        let input = r#"<html lang="en" dir="ltr"><link href="style.css"><script src="script.js"></script></html>"#;
        let output = post_process(input, &Locale::rtl("ar"), "en");
        assert_eq!(
            output,
            r#"<html lang="ar" dir="rtl"><link href="style-rtl.min.css"><script src="script.min.js"></script></html>"#
        );
    }

    #[test]
    fn test_english_only_minified_names() {
        let input = r#"<html lang="en" dir="ltr"><link href="/assets/css/style.css"><script src="/assets/js/script.js"></script>"#;
        let output = post_process(input, &Locale::ltr("en"), "en");
        assert_eq!(
            output,
            r#"<html lang="en" dir="ltr"><link href="/assets/css/style.min.css"><script src="/assets/js/script.min.js"></script>"#
        );
    }

    #[test]
    fn test_order_independent_of_position() {
        // script token after the style tokens in the source still lands first
        let input = r#"dir="ltr" style.css lang="en" script.js"#;
        let rules = RuleSet::for_locale(&Locale::rtl("ar"), "en");
        assert_eq!(
            rules.names(),
            vec!["min-script", "min-style", "rtl-style", "rtl-dir", "lang-attr"]
        );
        assert_eq!(
            rules.apply(input),
            r#"dir="rtl" style-rtl.min.css lang="ar" script.min.js"#
        );
    }

    #[test]
    fn test_already_minified_reference_for_rtl() {
        let output = post_process(r#"href="style.min.css""#, &Locale::rtl("ar"), "en");
        assert_eq!(output, r#"href="style-rtl.min.css""#);
    }

    #[test]
    fn test_bundle_names_follow_script_rule() {
        let output = post_process(
            "post-script.js critical-script.js script.min.js",
            &Locale::ltr("en"),
            "en",
        );
        assert_eq!(
            output,
            "post-script.min.js critical-script.min.js script.min.js"
        );
    }

    #[test]
    fn test_ltr_non_source_locale_changes_lang_only() {
        let output = post_process(r#"<html lang="en" dir="ltr">"#, &Locale::ltr("fr"), "en");
        assert_eq!(output, r#"<html lang="fr" dir="ltr">"#);
    }

    #[test]
    fn test_literal_fragility_preserved() {
        // substitution is not DOM-aware: prose mentioning the token is rewritten
        let output = post_process("<p>edit style.css</p>", &Locale::ltr("en"), "en");
        assert_eq!(output, "<p>edit style.min.css</p>");
    }

    fn finisher(critical: &CriticalCss, minify: bool) -> PageFinisher<'_> {
        PageFinisher {
            source_lang: "en",
            minify,
            placeholder: "[critical-css]",
            critical,
        }
    }

    const PAGE: &str = "<html lang=\"en\" dir=\"ltr\">\n  <head>[critical-css]<link href=\"style.css\"></head>\n  <body>\n    <img src=\"../images/a.png\">\n  </body>\n</html>";

    #[test]
    fn test_finisher_pipeline() {
        let critical = CriticalCss::from_parts(Some("a{b:c}".into()), Some("a{b:d}".into()));

        let ar = finisher(&critical, false).finish(PAGE, &Locale::rtl("ar"));
        assert_eq!(
            ar,
            "<html lang=\"ar\" dir=\"rtl\">\n  <head><style>a{b:d}</style><link href=\"style-rtl.min.css\"></head>\n  <body>\n    <img src=\"/assets/images/a.png\">\n  </body>\n</html>"
        );

        let en = finisher(&critical, false).finish(PAGE, &Locale::ltr("en"));
        assert!(en.contains("<style>a{b:c}</style>"));
    }

    #[test]
    fn test_minified_page_keeps_rewrites() {
        let critical = CriticalCss::from_parts(Some("a{b:c}".into()), Some("a{b:d}".into()));
        let ar = finisher(&critical, true).finish(PAGE, &Locale::rtl("ar"));

        assert!(!ar.contains('\n'));
        assert!(!ar.contains("en"), "{ar}");
        assert!(!ar.contains("ltr"), "{ar}");
        assert!(ar.contains("rtl"));
        assert!(ar.contains("style-rtl.min.css"));
        assert!(ar.contains("<style>a{b:d}</style>"));
        assert!(ar.contains("/assets/images/a.png"));
    }
}
