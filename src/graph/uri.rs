//! Identifier canonicalization for safe use in generated query patterns.

use url::Url;

/// Characters that may not appear raw inside a generated pattern.
const FORBIDDEN_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '^', '`', '\\'];

fn is_unsafe(c: char) -> bool {
    FORBIDDEN_CHARS.contains(&c) || c.is_whitespace() || c.is_control()
}

/// Percent-escape every unsafe character, leaving the rest untouched.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut buf = [0u8; 4];
    for c in raw.chars() {
        if is_unsafe(c) {
            for byte in c.encode_utf8(&mut buf).as_bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Namespace with a guaranteed trailing separator; a missing namespace
/// degrades to a bare `#` so output is still syntactically qualified.
fn qualified_namespace(namespace: &str) -> String {
    let ns = namespace.trim();
    if ns.is_empty() {
        return "#".to_string();
    }
    if ns.ends_with('#') || ns.ends_with('/') {
        ns.to_string()
    } else {
        format!("{}#", ns)
    }
}

/// Canonicalize a raw identifier against the active namespace.
///
/// Fully-qualified identifiers pass through (escaped only when they carry
/// unsafe characters); bare local names are namespace-qualified and escaped.
/// Never fails: blank input degrades to `<namespace>unknown`.
pub fn normalize(raw: &str, namespace: &str) -> String {
    let trimmed = raw.trim();
    let ns = qualified_namespace(namespace);
    if trimmed.is_empty() {
        return format!("{}unknown", ns);
    }
    if Url::parse(trimmed).is_ok() {
        if trimmed.chars().any(is_unsafe) {
            return escape(trimmed);
        }
        return trimmed.to_string();
    }
    format!("{}{}", ns, escape(trimmed))
}

/// Map an arbitrary predicate name to a valid pattern-variable token.
pub fn sanitize_for_pattern_variable(name: &str) -> String {
    let token: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_with_letter = token
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false);
    if starts_with_letter {
        token
    } else {
        format!("v_{}", token)
    }
}

/// Trailing segment of an identifier after the last `#` or `/`, falling back
/// to the whole identifier when no delimiter is present.
pub fn local_name(identifier: &str) -> &str {
    match identifier.rfind(['#', '/']) {
        Some(idx) if idx + 1 < identifier.len() => &identifier[idx + 1..],
        _ => identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://example.com/graph#";

    #[test]
    fn test_normalize_absolute_passthrough() {
        let id = "http://example.com/graph#flask";
        assert_eq!(normalize(id, NS), id);
    }

    #[test]
    fn test_normalize_absolute_with_unsafe_chars() {
        let id = "http://example.com/graph#bad<name>";
        let normalized = normalize(id, NS);
        assert_eq!(normalized, "http://example.com/graph#bad%3Cname%3E");
    }

    #[test]
    fn test_normalize_bare_name() {
        assert_eq!(normalize("flask", NS), "http://example.com/graph#flask");
    }

    #[test]
    fn test_normalize_bare_name_with_space() {
        assert_eq!(
            normalize("flask web", NS),
            "http://example.com/graph#flask%20web"
        );
    }

    #[test]
    fn test_normalize_blank_falls_back_to_unknown() {
        assert_eq!(normalize("  ", NS), "http://example.com/graph#unknown");
        assert_eq!(normalize("", ""), "#unknown");
    }

    #[test]
    fn test_normalize_namespace_gets_separator() {
        assert_eq!(
            normalize("flask", "http://example.com/graph"),
            "http://example.com/graph#flask"
        );
    }

    #[test]
    fn test_sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize_for_pattern_variable("used-by lib"), "used_by_lib");
        assert_eq!(sanitize_for_pattern_variable("uses_library"), "uses_library");
    }

    #[test]
    fn test_sanitize_prefixes_non_letter_start() {
        assert_eq!(sanitize_for_pattern_variable("42nd"), "v_42nd");
        assert_eq!(sanitize_for_pattern_variable("_x"), "v__x");
        assert_eq!(sanitize_for_pattern_variable(""), "v_");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("http://example.com/graph#flask"), "flask");
        assert_eq!(local_name("http://example.com/things/widget"), "widget");
        assert_eq!(local_name("flask"), "flask");
        // trailing delimiter: no segment follows, keep the whole identifier
        assert_eq!(local_name("http://example.com/graph#"), "http://example.com/graph#");
    }
}
