//! Live reload script injection.

/// Inject the live reload script if content is HTML and live reload is on
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_livereload_script(&body),
        _ => body,
    }
}

/// Inject the script tag before the last `</body>`, or append it
fn inject_livereload_script(content: &[u8]) -> Vec<u8> {
    let script = crate::embed::serve::livereload_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script_bytes);
    result.extend_from_slice(&content[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    const TAG: &str = r#"<script src="/__lisan/livereload.js"></script>"#;

    #[test]
    fn test_injected_before_body_close() {
        let body = b"<html><body><p>x</p></BODY></html>".to_vec();
        let out = maybe_inject_livereload(body, HTML, Some(35729));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("<html><body><p>x</p>{TAG}</BODY></html>")
        );
    }

    #[test]
    fn test_appended_without_body() {
        let out = maybe_inject_livereload(b"<p>x</p>".to_vec(), HTML, Some(35729));
        assert_eq!(String::from_utf8(out).unwrap(), format!("<p>x</p>{TAG}"));
    }

    #[test]
    fn test_untouched_when_disabled_or_not_html() {
        let body = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_livereload(body.clone(), HTML, None), body);
        assert_eq!(maybe_inject_livereload(body.clone(), CSS, Some(1)), body);
    }
}
