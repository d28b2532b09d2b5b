//! Mirror a left-to-right stylesheet for right-to-left locales.
//!
//! Works on plain CSS text: only declarations inside blocks are touched.
//! Selectors, at-rule preludes, comments, strings and `url(...)` arguments
//! come out byte-identical.
//!
//! | kind                      | example                                   |
//! |---------------------------|-------------------------------------------|
//! | property name             | `margin-left` → `margin-right`            |
//! | keyword value             | `float: left` → `float: right`            |
//! | 4-value shorthand         | `padding: 1px 2px 3px 4px` → `1px 4px 3px 2px` |
//! | `border-radius` corners   | `1px 2px 3px 4px` → `2px 1px 4px 3px`     |
//! | `direction`               | `ltr` → `rtl`                             |
//! | `cursor`                  | `e-resize` → `w-resize`                   |
//! | shadows                   | `2px 0 red` → `-2px 0 red`                |
//! | `transform` translations  | `translateX(10px)` → `translateX(-10px)`  |
//! | horizontal positions      | `background-position: 25% 0` → `75% 0`    |

use std::borrow::Cow;

/// Mirror every directional declaration in `css`.
pub fn flip_stylesheet(css: &str) -> String {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut segment_start = 0;
    let mut depth = 0usize;
    let mut paren = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(css, i);
                continue;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' => paren += 1,
            b')' => paren = paren.saturating_sub(1),
            b @ (b'{' | b'}' | b';') if paren == 0 => {
                let segment = &css[segment_start..i];
                if depth > 0 && b != b'{' {
                    out.push_str(&flip_declaration(segment));
                } else {
                    out.push_str(segment);
                }
                out.push(b as char);
                match b {
                    b'{' => depth += 1,
                    b'}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                segment_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    out.push_str(&css[segment_start..]);
    out
}

/// Index just past the comment starting at `start`.
fn skip_comment(css: &str, start: usize) -> usize {
    css[start + 2..]
        .find("*/")
        .map_or(css.len(), |end| start + 2 + end + 2)
}

/// Index just past the string literal starting at `start`.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Spans of `s` separated by bytes matching `is_sep`, ignoring separators
/// inside parentheses, strings and comments.
fn split_top_level(s: &str, is_sep: impl Fn(u8) -> bool) -> Vec<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut paren = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(s, i);
                continue;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' => paren += 1,
            b')' => paren = paren.saturating_sub(1),
            b if paren == 0 && is_sep(b) => {
                spans.push((start, i));
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    spans.push((start, bytes.len()));
    spans
}

/// Whitespace-separated tokens at the top level, as spans.
fn tokens(s: &str) -> Vec<(usize, usize)> {
    split_top_level(s, |b| b.is_ascii_whitespace())
        .into_iter()
        .filter(|(start, end)| start < end)
        .collect()
}

fn flip_declaration(segment: &str) -> Cow<'_, str> {
    if segment.trim_start().starts_with('@') {
        return Cow::Borrowed(segment);
    }
    let Some(&(_, colon)) = split_top_level(segment, |b| b == b':').first() else {
        return Cow::Borrowed(segment);
    };
    if colon == segment.len() {
        return Cow::Borrowed(segment);
    }

    let head = &segment[..colon];
    let value = &segment[colon + 1..];
    let name_end = head.trim_end().len();
    let name_start = head[..name_end]
        .rfind(|c: char| !is_ident_char(c))
        .map_or(0, |i| i + 1);
    let name = &head[name_start..name_end];
    if name.is_empty() || name.starts_with("--") {
        return Cow::Borrowed(segment);
    }

    let new_name = flip_property(name);
    let new_value = flip_value(&name.to_ascii_lowercase(), value);
    if matches!(new_name, Cow::Borrowed(_)) && matches!(new_value, Cow::Borrowed(_)) {
        return Cow::Borrowed(segment);
    }

    Cow::Owned(format!(
        "{}{}{}:{}",
        &head[..name_start],
        new_name,
        &head[name_end..],
        new_value
    ))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Swap `left`/`right` components of a hyphenated identifier.
fn flip_ident(ident: &str) -> Cow<'_, str> {
    if !ident.contains("left") && !ident.contains("right") {
        return Cow::Borrowed(ident);
    }
    let mut changed = false;
    let flipped = ident
        .split('-')
        .map(|part| match part {
            "left" => {
                changed = true;
                "right"
            }
            "right" => {
                changed = true;
                "left"
            }
            other => other,
        })
        .collect::<Vec<_>>()
        .join("-");
    if changed {
        Cow::Owned(flipped)
    } else {
        Cow::Borrowed(ident)
    }
}

fn flip_property(name: &str) -> Cow<'_, str> {
    flip_ident(name)
}

fn strip_vendor(name: &str) -> &str {
    ["-webkit-", "-moz-", "-ms-", "-o-"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Flip a raw declaration value, keeping surrounding whitespace.
fn flip_value<'a>(property: &str, value: &'a str) -> Cow<'a, str> {
    let lead = value.len() - value.trim_start().len();
    let core = value.trim();
    if core.is_empty() {
        return Cow::Borrowed(value);
    }
    let trail = &value[lead + core.len()..];
    let (body, important) = split_important(core);

    let structural: Cow<'_, str> = if body.contains("/*") {
        Cow::Borrowed(body)
    } else {
        match strip_vendor(property) {
            "margin" | "padding" | "border-width" | "border-style" | "border-color" | "inset"
            | "scroll-margin" | "scroll-padding" => swap_four(body),
            "border-radius" => flip_radius(body),
            "box-shadow" | "text-shadow" => flip_shadows(body),
            "transform" => flip_transform(body),
            "background-position" | "background-position-x" | "transform-origin" => flip_position(body),
            "direction" => map_tokens(body, |t| match t {
                "ltr" => Some("rtl"),
                "rtl" => Some("ltr"),
                _ => None,
            }),
            "cursor" => map_tokens(body, flip_cursor),
            _ => Cow::Borrowed(body),
        }
    };
    let flipped = swap_keywords(&structural);

    if matches!(structural, Cow::Borrowed(_)) && matches!(flipped, Cow::Borrowed(_)) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(format!("{}{}{}{}", &value[..lead], flipped, important, trail))
}

/// `1px 2px !important` → (`1px 2px`, ` !important`)
fn split_important(core: &str) -> (&str, &str) {
    if let Some(bang) = core.rfind('!') {
        if core[bang + 1..].trim().eq_ignore_ascii_case("important") {
            let body = core[..bang].trim_end();
            return (body, &core[body.len()..]);
        }
    }
    (core, "")
}

fn join_spans(s: &str, spans: &[(usize, usize)], order: &[usize]) -> String {
    order
        .iter()
        .map(|&i| &s[spans[i].0..spans[i].1])
        .collect::<Vec<_>>()
        .join(" ")
}

/// top right bottom left → top left bottom right
fn swap_four(body: &str) -> Cow<'_, str> {
    let spans = tokens(body);
    if spans.len() != 4 {
        return Cow::Borrowed(body);
    }
    Cow::Owned(join_spans(body, &spans, &[0, 3, 2, 1]))
}

fn flip_radius(body: &str) -> Cow<'_, str> {
    let parts = split_top_level(body, |b| b == b'/');
    let mut changed = false;
    let flipped: Vec<String> = parts
        .iter()
        .map(|&(start, end)| {
            let part = body[start..end].trim();
            let spans = tokens(part);
            let order: &[usize] = match spans.len() {
                2 => &[1, 0],
                3 => &[1, 0, 1, 2],
                4 => &[1, 0, 3, 2],
                _ => return part.to_string(),
            };
            changed = true;
            join_spans(part, &spans, order)
        })
        .collect();

    if changed {
        Cow::Owned(flipped.join(" / "))
    } else {
        Cow::Borrowed(body)
    }
}

/// Negate the horizontal offset of every comma-separated shadow.
fn flip_shadows(body: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(body.len() + 2);
    let mut cursor = 0;
    let mut changed = false;

    for (start, end) in split_top_level(body, |b| b == b',') {
        let shadow = &body[start..end];
        let Some(&(t_start, t_end)) = tokens(shadow)
            .iter()
            .find(|&&(s, e)| is_numeric(&shadow[s..e]))
        else {
            continue;
        };
        let negated = negate(&shadow[t_start..t_end]);
        if negated == shadow[t_start..t_end] {
            continue;
        }
        out.push_str(&body[cursor..start + t_start]);
        out.push_str(&negated);
        cursor = start + t_end;
        changed = true;
    }

    if !changed {
        return Cow::Borrowed(body);
    }
    out.push_str(&body[cursor..]);
    Cow::Owned(out)
}

/// Negate the x offset of `translate()`, `translateX()` and `translate3d()`.
fn flip_transform(body: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(body.len() + 2);
    let mut cursor = 0;
    let mut changed = false;

    for (start, end) in tokens(body) {
        let func = &body[start..end];
        let (Some(open), Some(close)) = (func.find('('), func.rfind(')')) else {
            continue;
        };
        let name = func[..open].to_ascii_lowercase();
        if close < open || !matches!(name.as_str(), "translate" | "translatex" | "translate3d") {
            continue;
        }

        let args = &func[open + 1..close];
        let Some(&(a_start, a_end)) = split_top_level(args, |b| b == b',').first() else {
            continue;
        };
        let raw = &args[a_start..a_end];
        let arg = raw.trim();
        if !is_numeric(arg) {
            continue;
        }
        let negated = negate(arg);
        if negated == arg {
            continue;
        }

        let at = start + open + 1 + a_start + (raw.len() - raw.trim_start().len());
        out.push_str(&body[cursor..at]);
        out.push_str(&negated);
        cursor = at + arg.len();
        changed = true;
    }

    if !changed {
        return Cow::Borrowed(body);
    }
    out.push_str(&body[cursor..]);
    Cow::Owned(out)
}

/// Mirror the horizontal component of every comma-separated position:
/// `p%` becomes `(100 - p)%` and a zero offset becomes `100%`.
fn flip_position(body: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(body.len() + 4);
    let mut cursor = 0;
    let mut changed = false;

    for (start, end) in split_top_level(body, |b| b == b',') {
        let layer = &body[start..end];
        let Some(&(t_start, t_end)) = tokens(layer).first() else {
            continue;
        };
        let Some(mirrored) = mirror_offset(&layer[t_start..t_end]) else {
            continue;
        };
        out.push_str(&body[cursor..start + t_start]);
        out.push_str(&mirrored);
        cursor = start + t_end;
        changed = true;
    }

    if !changed {
        return Cow::Borrowed(body);
    }
    out.push_str(&body[cursor..]);
    Cow::Owned(out)
}

fn mirror_offset(token: &str) -> Option<String> {
    if !is_numeric(token) {
        return None;
    }
    if let Some(number) = token.strip_suffix('%') {
        let percent: f64 = number.parse().ok()?;
        return Some(format!("{}%", 100.0 - percent));
    }
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let value: f64 = digits.parse().ok()?;
    (value == 0.0).then(|| "100%".to_string())
}

fn is_numeric(token: &str) -> bool {
    let rest = token.strip_prefix(['-', '+']).unwrap_or(token);
    rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

fn negate(token: &str) -> String {
    if let Some(rest) = token.strip_prefix('-') {
        return rest.to_string();
    }
    let rest = token.strip_prefix('+').unwrap_or(token);
    let is_zero = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .all(|c| c == '0' || c == '.');
    if is_zero {
        rest.to_string()
    } else {
        format!("-{rest}")
    }
}

fn flip_cursor(token: &str) -> Option<&'static str> {
    match token {
        "e-resize" => Some("w-resize"),
        "w-resize" => Some("e-resize"),
        "ne-resize" => Some("nw-resize"),
        "nw-resize" => Some("ne-resize"),
        "se-resize" => Some("sw-resize"),
        "sw-resize" => Some("se-resize"),
        _ => None,
    }
}

/// Replace whole top-level tokens through `map`, keeping separators.
fn map_tokens(body: &str, map: impl Fn(&str) -> Option<&'static str>) -> Cow<'_, str> {
    let mut out = String::with_capacity(body.len());
    let mut cursor = 0;
    let mut changed = false;

    for (start, end) in split_top_level(body, |b| b.is_ascii_whitespace() || b == b',') {
        if let Some(replacement) = map(&body[start..end]) {
            out.push_str(&body[cursor..start]);
            out.push_str(replacement);
            cursor = end;
            changed = true;
        }
    }

    if !changed {
        return Cow::Borrowed(body);
    }
    out.push_str(&body[cursor..]);
    Cow::Owned(out)
}

/// Swap `left`/`right` identifiers in a value, skipping strings, comments,
/// `url(...)` and custom property names.
fn swap_keywords(value: &str) -> Cow<'_, str> {
    if !value.contains("left") && !value.contains("right") {
        return Cow::Borrowed(value);
    }

    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut changed = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = match b {
            b'/' if bytes.get(i + 1) == Some(&b'*') => skip_comment(value, i),
            b'"' | b'\'' => skip_string(bytes, i),
            _ if is_url_start(&bytes[i..]) => skip_url(bytes, i),
            _ if is_ident_char(b as char) => {
                let end = bytes[i..]
                    .iter()
                    .position(|&c| !is_ident_char(c as char))
                    .map_or(bytes.len(), |p| i + p);
                let ident = &value[i..end];
                if ident.starts_with("--") {
                    out.push_str(ident);
                } else {
                    let flipped = flip_ident(ident);
                    changed |= matches!(flipped, Cow::Owned(_));
                    out.push_str(&flipped);
                }
                i = end;
                continue;
            }
            _ => {
                // multi-byte characters are copied whole
                let len = value[i..].chars().next().map_or(1, char::len_utf8);
                i + len
            }
        };
        out.push_str(&value[i..next]);
        i = next;
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(value)
    }
}

fn is_url_start(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4].eq_ignore_ascii_case(b"url(")
}

/// Index just past the `)` closing a `url(` at `start`.
fn skip_url(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 4;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(bytes, i),
            b')' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_decl(decl: &str) -> String {
        let css = format!(".a {{\n  {decl};\n}}\n");
        let flipped = flip_stylesheet(&css);
        flipped
            .strip_prefix(".a {\n  ")
            .and_then(|s| s.strip_suffix(";\n}\n"))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_property_names() {
        assert_eq!(flip_decl("margin-left: 10px"), "margin-right: 10px");
        assert_eq!(flip_decl("padding-right: 1em"), "padding-left: 1em");
        assert_eq!(flip_decl("left: 0"), "right: 0");
        assert_eq!(
            flip_decl("border-top-left-radius: 4px"),
            "border-top-right-radius: 4px"
        );
        assert_eq!(flip_decl("border-right-color: red"), "border-left-color: red");
    }

    #[test]
    fn test_keyword_values() {
        assert_eq!(flip_decl("float: left"), "float: right");
        assert_eq!(flip_decl("text-align: right"), "text-align: left");
        assert_eq!(flip_decl("clear: left"), "clear: right");
        assert_eq!(
            flip_decl("background-position: left top"),
            "background-position: right top"
        );
        assert_eq!(
            flip_decl("transition: margin-left 0.2s ease"),
            "transition: margin-right 0.2s ease"
        );
    }

    #[test]
    fn test_four_value_shorthands() {
        assert_eq!(flip_decl("margin: 1px 2px 3px 4px"), "margin: 1px 4px 3px 2px");
        assert_eq!(flip_decl("padding: 0 auto"), "padding: 0 auto");
        assert_eq!(
            flip_decl("border-width: 1px 2px 3px 4px !important"),
            "border-width: 1px 4px 3px 2px !important"
        );
        assert_eq!(
            flip_decl("border-color: red rgb(0, 0, 0) blue green"),
            "border-color: red green blue rgb(0, 0, 0)"
        );
    }

    #[test]
    fn test_border_radius() {
        assert_eq!(flip_decl("border-radius: 4px"), "border-radius: 4px");
        assert_eq!(
            flip_decl("border-radius: 1px 2px 3px 4px"),
            "border-radius: 2px 1px 4px 3px"
        );
        assert_eq!(flip_decl("border-radius: 1px 2px"), "border-radius: 2px 1px");
        assert_eq!(
            flip_decl("border-radius: 1px 2px 3px"),
            "border-radius: 2px 1px 2px 3px"
        );
        assert_eq!(
            flip_decl("border-radius: 1px 2px / 3px 4px"),
            "border-radius: 2px 1px / 4px 3px"
        );
    }

    #[test]
    fn test_direction_and_cursor() {
        assert_eq!(flip_decl("direction: ltr"), "direction: rtl");
        assert_eq!(flip_decl("cursor: e-resize"), "cursor: w-resize");
        assert_eq!(flip_decl("cursor: nw-resize"), "cursor: ne-resize");
        assert_eq!(flip_decl("cursor: pointer"), "cursor: pointer");
    }

    #[test]
    fn test_shadows() {
        assert_eq!(
            flip_decl("box-shadow: 2px 0 4px rgba(0, 0, 0, 0.2)"),
            "box-shadow: -2px 0 4px rgba(0, 0, 0, 0.2)"
        );
        assert_eq!(
            flip_decl("box-shadow: inset -1px 1px red, 0 1px 2px blue"),
            "box-shadow: inset 1px 1px red, 0 1px 2px blue"
        );
        assert_eq!(flip_decl("text-shadow: 1px 1px #000"), "text-shadow: -1px 1px #000");
    }

    #[test]
    fn test_untouched_parts() {
        let css = "/* float: left */\n.pull-left > .left:hover {\n  content: \"left\";\n  background: url(img/left.png) no-repeat left;\n  --side-left: 1px;\n  width: var(--left-gap);\n}\n@import url(\"left.css\");\n";
        let flipped = flip_stylesheet(css);
        assert_eq!(
            flipped,
            "/* float: left */\n.pull-left > .left:hover {\n  content: \"left\";\n  background: url(img/left.png) no-repeat right;\n  --side-left: 1px;\n  width: var(--left-gap);\n}\n@import url(\"left.css\");\n"
        );
    }

    #[test]
    fn test_nested_at_rules() {
        let css = "@media (min-width: 10px) {\n  .a {\n    right: 1px;\n  }\n}\n";
        assert_eq!(
            flip_stylesheet(css),
            "@media (min-width: 10px) {\n  .a {\n    left: 1px;\n  }\n}\n"
        );
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        assert_eq!(flip_stylesheet(".a{left:0}"), ".a{right:0}");
    }

    #[test]
    fn test_data_uri_semicolon() {
        let css = ".a{background:url(data:image/png;base64,AAA) left}";
        assert_eq!(
            flip_stylesheet(css),
            ".a{background:url(data:image/png;base64,AAA) right}"
        );
    }

    #[test]
    fn test_non_directional_identical() {
        let css = ".a {\n  color: red;\n  display: flex;\n  font: 12px/1.5 \"Helvetica\", sans-serif;\n}\n";
        assert_eq!(flip_stylesheet(css), css);
    }

    #[test]
    fn test_involution() {
        let css = ".nav {\n  margin-left: 10px;\n  padding: 1px 2px 3px 4px;\n  float: left;\n  text-align: right;\n  border-top-left-radius: 3px;\n  border-radius: 1px 2px 3px 4px;\n  box-shadow: 2px 0 4px rgba(0, 0, 0, 0.2), inset -1px 1px red;\n  direction: ltr;\n  cursor: ne-resize;\n  background: url(left.png) no-repeat left center;\n}\n";
        let once = flip_stylesheet(css);
        assert_ne!(once, css);
        assert_eq!(flip_stylesheet(&once), css);
    }

    #[test]
    fn test_transform_translations() {
        assert_eq!(
            flip_stylesheet(".a{transform:translateX(10px)}"),
            ".a{transform:translateX(-10px)}"
        );
        assert_eq!(
            flip_decl("transform: translate(-5%, 10px)"),
            "transform: translate(5%, 10px)"
        );
        assert_eq!(
            flip_decl("-webkit-transform: translate3d(2px, 0, 0) rotate(45deg)"),
            "-webkit-transform: translate3d(-2px, 0, 0) rotate(45deg)"
        );
        assert_eq!(flip_decl("transform: translateY(4px)"), "transform: translateY(4px)");
        assert_eq!(
            flip_decl("transform: translateX(calc(100% - 4px))"),
            "transform: translateX(calc(100% - 4px))"
        );
    }

    #[test]
    fn test_horizontal_positions() {
        assert_eq!(
            flip_stylesheet(".a{background-position:0 50%}"),
            ".a{background-position:100% 50%}"
        );
        assert_eq!(flip_decl("background-position: 25% 0"), "background-position: 75% 0");
        assert_eq!(flip_decl("background-position: 10px 0"), "background-position: 10px 0");
        assert_eq!(
            flip_decl("background-position: 12.5% 0, 0 0"),
            "background-position: 87.5% 0, 100% 0"
        );
        assert_eq!(flip_decl("background-position-x: 30%"), "background-position-x: 70%");
        assert_eq!(flip_decl("transform-origin: 0 0"), "transform-origin: 100% 0");
        assert_eq!(
            flip_decl("transform-origin: left center"),
            "transform-origin: right center"
        );
    }
}
