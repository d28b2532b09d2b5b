//! Critical CSS inlining.

use std::fs;
use std::path::Path;

use super::RuleSet;
use crate::debug;
use crate::locale::Direction;

/// Minified critical stylesheets, one per text direction.
#[derive(Debug, Clone, Default)]
pub struct CriticalCss {
    ltr: Option<String>,
    rtl: Option<String>,
}

impl CriticalCss {
    /// Read `critical.min.css` and `critical-rtl.min.css` from `css_dir`.
    ///
    /// Missing files leave the placeholder in place.
    pub fn load(css_dir: &Path) -> Self {
        let read = |name: &str| {
            let path = css_dir.join(name);
            match fs::read_to_string(&path) {
                Ok(css) => Some(css),
                Err(_) => {
                    debug!("critical"; "no {}", path.display());
                    None
                }
            }
        };
        Self {
            ltr: read("critical.min.css"),
            rtl: read("critical-rtl.min.css"),
        }
    }

    #[cfg(test)]
    pub fn from_parts(ltr: Option<String>, rtl: Option<String>) -> Self {
        Self { ltr, rtl }
    }

    /// RTL pages fall back to the LTR sheet when no mirrored sheet exists.
    pub fn for_direction(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Ltr => self.ltr.as_deref(),
            Direction::Rtl => self.rtl.as_deref().or(self.ltr.as_deref()),
        }
    }
}

/// Replace `placeholder` with an inline `<style>` element.
pub fn inject_critical_css(html: &str, placeholder: &str, css: &str) -> String {
    if placeholder.is_empty() {
        return html.to_string();
    }
    html.replace(placeholder, &format!("<style>{}</style>", css.trim()))
}

/// Asset URLs written relative to `assets/css/` must become absolute once
/// the CSS is inlined into a page.
pub fn critical_path_rules() -> RuleSet {
    RuleSet::new()
        .with("critical-fonts", "../fonts", "/assets/fonts")
        .with("critical-images", "../images", "/assets/images")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inject() {
        let html = "<head>[critical-css]</head>";
        assert_eq!(
            inject_critical_css(html, "[critical-css]", "a{color:red}\n"),
            "<head><style>a{color:red}</style></head>"
        );
    }

    #[test]
    fn test_inject_without_placeholder_is_noop() {
        let html = "<head></head>";
        assert_eq!(inject_critical_css(html, "[critical-css]", "a{}"), html);
    }

    #[test]
    fn test_path_rules() {
        let css = "@font-face{src:url(../fonts/a.woff2)}.b{background:url(../images/b.png)}";
        assert_eq!(
            critical_path_rules().apply(css),
            "@font-face{src:url(/assets/fonts/a.woff2)}.b{background:url(/assets/images/b.png)}"
        );
    }

    #[test]
    fn test_load_and_direction_fallback() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("critical.min.css"), "ltr").unwrap();

        let critical = CriticalCss::load(temp.path());
        assert_eq!(critical.for_direction(Direction::Ltr), Some("ltr"));
        assert_eq!(critical.for_direction(Direction::Rtl), Some("ltr"));

        fs::write(temp.path().join("critical-rtl.min.css"), "rtl").unwrap();
        let critical = CriticalCss::load(temp.path());
        assert_eq!(critical.for_direction(Direction::Rtl), Some("rtl"));
    }

    #[test]
    fn test_load_missing_dir() {
        let critical = CriticalCss::load(Path::new("/nope/css"));
        assert_eq!(critical.for_direction(Direction::Ltr), None);
    }
}
