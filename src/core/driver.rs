//! Build mode for production/development builds.

/// Build mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Whether script bundles are minified.
    /// Development builds write the plain concatenation to `*.min.js` too.
    pub minify_scripts: bool,
}

impl BuildMode {
    /// Production mode: fully minified output.
    pub const PRODUCTION: Self = Self {
        minify_scripts: true,
    };

    /// Development mode: fast rebuilds for serve and watch.
    pub const DEVELOPMENT: Self = Self {
        minify_scripts: false,
    };

    /// Check if this is development mode.
    #[inline]
    pub const fn is_dev(&self) -> bool {
        !self.minify_scripts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        assert!(BuildMode::DEVELOPMENT.is_dev());
        assert!(!BuildMode::PRODUCTION.is_dev());
    }
}
