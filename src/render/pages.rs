//! Render jobs for one locale.
//!
//! One job per page template under the pages prefix, plus one job per
//! collection entry found in `locales/{lang}/{collection}/`. Jobs share only
//! the read-only dictionary, so they run on rayon without coordination.

use std::collections::hash_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::{RenderError, Renderer, template_rank};
use crate::locale::{
    Collection, EntityRef, Locale, LocaleDirs, Mapping, collection_entries, load_locale_data,
    overlay_entity, report_load_error,
};

/// Everything a locale render needs, borrowed from the build.
pub struct RenderPlan<'a> {
    pub renderer: &'a Renderer,
    pub dirs: &'a LocaleDirs,
    /// Template prefix of simple pages (`pages`).
    pub pages: &'a str,
    /// Template prefix of collection components (`comps`).
    pub comps: &'a str,
    /// Prefix every output path with the locale code.
    pub multilang: bool,
}

/// A rendered document, before post-processing.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub html: String,
}

#[derive(Debug)]
pub struct RenderFailure {
    pub locale: String,
    pub target: String,
    pub error: RenderError,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.locale, self.target, self.error.detail())
    }
}

/// Result of rendering one locale: successes and failures side by side.
#[derive(Debug)]
pub struct LocaleOutput {
    pub locale: Locale,
    pub pages: Vec<RenderedPage>,
    pub failures: Vec<RenderFailure>,
}

struct Job {
    template: String,
    entity: EntityRef,
    output: PathBuf,
}

/// Render every page and collection entry of `locale`.
///
/// Never fails as a whole: data problems fall back to empty data, render
/// problems are collected per job. Without a readable dictionary every job
/// renders with empty data, overrides included.
pub fn render_locale(plan: &RenderPlan<'_>, locale: &Locale) -> LocaleOutput {
    let lang = locale.code.as_str();
    let dictionary = match load_locale_data(plan.dirs, lang, None) {
        Ok(dictionary) => Some(dictionary),
        Err(e) => {
            report_load_error(lang, None, &e);
            None
        }
    };

    let (jobs, mut failures) = plan.jobs(lang);

    let results: Vec<_> = jobs
        .par_iter()
        .map(|job| plan.run(job, lang, dictionary.as_ref()))
        .collect();

    let mut pages = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(page) => pages.push(page),
            Err(failure) => failures.push(failure),
        }
    }

    LocaleOutput {
        locale: locale.clone(),
        pages,
        failures,
    }
}

impl RenderPlan<'_> {
    fn output_root(&self, lang: &str) -> PathBuf {
        if self.multilang {
            PathBuf::from(lang)
        } else {
            PathBuf::new()
        }
    }

    /// Jobs for `lang`. Templates that map to an output already claimed
    /// are reported instead of rendered; between page templates the
    /// extension order of `TEMPLATE_EXTS` decides which one is kept.
    fn jobs(&self, lang: &str) -> (Vec<Job>, Vec<RenderFailure>) {
        let root = self.output_root(lang);
        let mut jobs = Vec::new();
        let mut failures = Vec::new();
        let mut claimed: FxHashMap<PathBuf, String> = FxHashMap::default();

        let mut claim = |job: Job, failures: &mut Vec<RenderFailure>| match claimed.entry(job.output.clone()) {
            Entry::Occupied(kept) => failures.push(RenderFailure {
                locale: lang.to_string(),
                target: job.entity.to_string(),
                error: RenderError::Collision {
                    template: job.template,
                    kept: kept.get().clone(),
                },
            }),
            Entry::Vacant(slot) => {
                slot.insert(job.template.clone());
                jobs.push(job);
            }
        };

        let page_prefix = format!("{}/", self.pages.trim_end_matches('/'));
        let mut pages: Vec<(PathBuf, usize, String)> = self
            .renderer
            .templates_under(self.pages)
            .into_iter()
            .map(|template| {
                let rel = Path::new(&template[page_prefix.len()..]);
                (rel.with_extension("html"), template_rank(rel), template)
            })
            .collect();
        pages.sort();

        for (rel, _, template) in pages {
            let stem = rel
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            claim(
                Job {
                    output: root.join(rel),
                    entity: EntityRef::Page(stem),
                    template,
                },
                &mut failures,
            );
        }

        for collection in Collection::ALL {
            let ids = collection_entries(self.dirs, lang, collection);
            if ids.is_empty() {
                continue;
            }

            let stem = format!("{}/{}/index", self.comps.trim_end_matches('/'), collection);
            let Some(template) = self.renderer.find_template(&stem) else {
                failures.push(RenderFailure {
                    locale: lang.to_string(),
                    target: collection.to_string(),
                    error: RenderError::NotFound(stem),
                });
                continue;
            };

            for id in ids {
                claim(
                    Job {
                        template: template.clone(),
                        output: root.join(collection.as_str()).join(&id).join("index.html"),
                        entity: EntityRef::entry(collection, id),
                    },
                    &mut failures,
                );
            }
        }

        (jobs, failures)
    }

    fn run(&self, job: &Job, lang: &str, dictionary: Option<&Mapping>) -> Result<RenderedPage, RenderFailure> {
        let data = match dictionary {
            Some(dictionary) => overlay_entity(self.dirs, lang, dictionary, &job.entity).unwrap_or_else(|e| {
                report_load_error(lang, Some(&job.entity), &e);
                Mapping::new()
            }),
            None => Mapping::new(),
        };

        self.renderer
            .render(&job.template, &data)
            .map(|html| RenderedPage {
                output: job.output.clone(),
                html,
            })
            .map_err(|error| RenderFailure {
                locale: lang.to_string(),
                target: job.entity.to_string(),
                error,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn renderer() -> Renderer {
        Renderer::from_sources([
            ("pages/index.html", "<title>{{ title }}</title>"),
            ("pages/about/team.nunjucks", "{{ title }}|{{ team }}"),
            ("comps/blog/index.nunjucks", "<h1>{{ title }}</h1>"),
        ])
        .unwrap()
    }

    fn locales() -> TempDir {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "en.json", r#"{"title": "Home", "team": "Us"}"#);
        write(temp.path(), "en/team.json", r#"{"title": "Team"}"#);
        write(temp.path(), "en/blog/first.json", r#"{"title": "First"}"#);
        write(temp.path(), "en/blog/second.json", r#"{"title": "Second"}"#);
        temp
    }

    fn find<'a>(output: &'a LocaleOutput, path: &str) -> &'a RenderedPage {
        output
            .pages
            .iter()
            .find(|p| p.output == Path::new(path))
            .unwrap_or_else(|| panic!("missing output {path}"))
    }

    #[test]
    fn test_pages_and_entries_rendered() {
        let temp = locales();
        let dirs = LocaleDirs::new(temp.path());
        let renderer = renderer();
        let plan = RenderPlan {
            renderer: &renderer,
            dirs: &dirs,
            pages: "pages",
            comps: "comps",
            multilang: true,
        };

        let output = render_locale(&plan, &Locale::ltr("en"));
        assert!(output.failures.is_empty(), "{:?}", output.failures);
        assert_eq!(output.pages.len(), 4);

        assert_eq!(find(&output, "en/index.html").html, "<title>Home</title>");
        assert_eq!(find(&output, "en/about/team.html").html, "Team|Us");
        assert_eq!(find(&output, "en/blog/first/index.html").html, "<h1>First</h1>");
        assert_eq!(find(&output, "en/blog/second/index.html").html, "<h1>Second</h1>");
    }

    #[test]
    fn test_single_language_outputs_at_root() {
        let temp = locales();
        let dirs = LocaleDirs::new(temp.path());
        let renderer = renderer();
        let plan = RenderPlan {
            renderer: &renderer,
            dirs: &dirs,
            pages: "pages",
            comps: "comps",
            multilang: false,
        };

        let output = render_locale(&plan, &Locale::ltr("en"));
        find(&output, "index.html");
        find(&output, "blog/first/index.html");
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let temp = locales();
        write(temp.path(), "en/blog/broken.json", r#"{"other": 1}"#);
        let dirs = LocaleDirs::new(temp.path());
        // only `broken` defines `other`; the remaining entries fail
        let renderer = Renderer::from_sources([
            ("pages/index.html", "{{ title }}"),
            ("comps/blog/index.html", "{{ other }}"),
        ])
        .unwrap();
        let plan = RenderPlan {
            renderer: &renderer,
            dirs: &dirs,
            pages: "pages",
            comps: "comps",
            multilang: true,
        };

        let output = render_locale(&plan, &Locale::ltr("en"));
        assert_eq!(output.pages.len(), 2);
        assert_eq!(output.failures.len(), 2);
        assert!(output.failures.iter().all(|f| f.target.starts_with("blog/")));
        find(&output, "en/blog/broken/index.html");
    }

    #[test]
    fn test_missing_collection_template_reported() {
        let temp = locales();
        write(temp.path(), "en/work/case.json", "{}");
        let dirs = LocaleDirs::new(temp.path());
        let renderer = renderer();
        let plan = RenderPlan {
            renderer: &renderer,
            dirs: &dirs,
            pages: "pages",
            comps: "comps",
            multilang: true,
        };

        let output = render_locale(&plan, &Locale::ltr("en"));
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].target, "work");
        assert!(matches!(output.failures[0].error, RenderError::NotFound(_)));
    }

    #[test]
    fn test_missing_dictionary_renders_with_empty_data() {
        let temp = locales();
        let dirs = LocaleDirs::new(temp.path());
        let renderer = Renderer::from_sources([("pages/static.html", "static")]).unwrap();
        let plan = RenderPlan {
            renderer: &renderer,
            dirs: &dirs,
            pages: "pages",
            comps: "comps",
            multilang: true,
        };

        let output = render_locale(&plan, &Locale::rtl("ar"));
        assert!(output.failures.is_empty());
        assert_eq!(find(&output, "ar/static.html").html, "static");
    }

    fn plan<'a>(renderer: &'a Renderer, dirs: &'a LocaleDirs) -> RenderPlan<'a> {
        RenderPlan {
            renderer,
            dirs,
            pages: "pages",
            comps: "comps",
            multilang: true,
        }
    }

    #[test]
    fn test_missing_dictionary_ignores_overrides() {
        let temp = locales();
        write(temp.path(), "ar/blog/first.json", r#"{"title": "First"}"#);
        write(temp.path(), "ar/index.json", r#"{"title": "Home"}"#);
        let dirs = LocaleDirs::new(temp.path());
        let renderer = Renderer::from_sources([
            ("pages/index.html", r#"<h1>{{ title | default(value="none") }}</h1>"#),
            ("comps/blog/index.html", r#"<h1>{{ title | default(value="none") }}</h1>"#),
        ])
        .unwrap();

        let output = render_locale(&plan(&renderer, &dirs), &Locale::rtl("ar"));
        assert!(output.failures.is_empty(), "{:?}", output.failures);
        assert_eq!(find(&output, "ar/index.html").html, "<h1>none</h1>");
        assert_eq!(find(&output, "ar/blog/first/index.html").html, "<h1>none</h1>");
    }

    #[test]
    fn test_invalid_override_renders_with_empty_data() {
        let temp = locales();
        write(temp.path(), "en/blog/first.json", "{not json");
        let dirs = LocaleDirs::new(temp.path());
        let renderer = Renderer::from_sources([(
            "comps/blog/index.html",
            r#"<h1>{{ title | default(value="none") }}</h1>"#,
        )])
        .unwrap();

        let output = render_locale(&plan(&renderer, &dirs), &Locale::ltr("en"));
        assert_eq!(find(&output, "en/blog/first/index.html").html, "<h1>none</h1>");
        assert_eq!(find(&output, "en/blog/second/index.html").html, "<h1>Second</h1>");
    }

    #[test]
    fn test_same_output_reported_as_collision() {
        let temp = locales();
        let dirs = LocaleDirs::new(temp.path());
        let renderer = Renderer::from_sources([
            ("pages/foo.html", "html"),
            ("pages/foo.nunjucks", "nunjucks"),
            ("pages/blog/first/index.html", "page"),
            ("comps/blog/index.html", "entry"),
        ])
        .unwrap();

        for _ in 0..3 {
            let output = render_locale(&plan(&renderer, &dirs), &Locale::ltr("en"));
            assert_eq!(find(&output, "en/foo.html").html, "nunjucks");
            assert_eq!(find(&output, "en/blog/first/index.html").html, "page");
            assert_eq!(output.failures.len(), 2, "{:?}", output.failures);

            let foo = output.failures.iter().find(|f| f.target == "foo").unwrap();
            assert!(matches!(
                &foo.error,
                RenderError::Collision { template, kept }
                    if template == "pages/foo.html" && kept == "pages/foo.nunjucks"
            ));
            assert!(output.failures.iter().any(|f| f.target == "blog/first"));
        }
    }
}
