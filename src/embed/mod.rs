//! Embedded static resources.
//!
//! - `build` - files written into the output tree (redirect.html)
//! - `serve` - dev server resources (livereload.js, loading page)

mod template;

pub use template::{Template, TemplateVars};

pub mod build {
    use super::{Template, TemplateVars};

    /// Variables for redirect.html.
    pub struct RedirectVars {
        pub default_locale: String,
    }

    impl TemplateVars for RedirectVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__DEFAULT_LOCALE__", &self.default_locale)
        }
    }

    /// Root page forwarding visitors to the default locale.
    pub const REDIRECT_HTML: Template<RedirectVars> =
        Template::new(include_str!("build/redirect.html"));
}

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__LISAN_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// URL the dev server answers with [`LIVERELOAD_JS`].
    pub const LIVERELOAD_URL: &str = "/__lisan/livereload.js";

    /// Shown while the initial build runs; refreshes itself.
    pub const LOADING_HTML: &str = include_str!("serve/loading.html");

    /// Tag injected into served HTML pages.
    pub fn livereload_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}"></script>"#)
    }
}
