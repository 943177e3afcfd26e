//! Path pattern helpers: placeholder scanning, URL generation and mount joins.
//!
//! Patterns use axum syntax: `{name}` captures one segment, `{*name}` captures
//! the rest of the path, and `{{` / `}}` are literal braces.

use std::collections::BTreeMap;

use crate::error::{ControllerError, ControllerResult};

/// A placeholder found in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub wildcard: bool,
}

enum Piece<'a> {
    Literal(&'a str),
    Brace(char),
    Param(Placeholder),
}

fn pieces(pattern: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find(['{', '}']) {
        if pos > 0 {
            out.push(Piece::Literal(&rest[..pos]));
        }
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push(Piece::Brace(tail.as_bytes()[0] as char));
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{')
            && let Some(end) = tail.find('}')
        {
            let inner = &tail[1..end];
            let (name, wildcard) = match inner.strip_prefix('*') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            out.push(Piece::Param(Placeholder {
                name: name.to_string(),
                wildcard,
            }));
            rest = &tail[end + 1..];
            continue;
        }

        // Unbalanced brace: keep it as text
        out.push(Piece::Literal(&tail[..1]));
        rest = &tail[1..];
    }

    if !rest.is_empty() {
        out.push(Piece::Literal(rest));
    }
    out
}

/// List the placeholders of a pattern in order of appearance.
pub fn placeholders(pattern: &str) -> Vec<Placeholder> {
    pieces(pattern)
        .into_iter()
        .filter_map(|p| match p {
            Piece::Param(ph) => Some(ph),
            _ => None,
        })
        .collect()
}

/// Substitute `params` into `pattern`.
///
/// Segment values are percent-encoded. Wildcard values keep their `/`
/// separators. Parameters that match no placeholder are appended as a query
/// string, sorted by key.
pub fn fill(
    route: &str,
    pattern: &str,
    params: &BTreeMap<String, String>,
) -> ControllerResult<String> {
    let mut url = String::with_capacity(pattern.len());
    let mut used: Vec<&str> = Vec::new();

    for piece in pieces(pattern) {
        match piece {
            Piece::Literal(text) => url.push_str(text),
            Piece::Brace(c) => url.push(c),
            Piece::Param(ph) => {
                let value = params
                    .get(&ph.name)
                    .ok_or_else(|| ControllerError::MissingParam {
                        route: route.to_string(),
                        param: ph.name.clone(),
                    })?;
                if ph.wildcard {
                    let encoded: Vec<String> = value
                        .trim_start_matches('/')
                        .split('/')
                        .map(|seg| urlencoding::encode(seg).into_owned())
                        .collect();
                    url.push_str(&encoded.join("/"));
                } else {
                    url.push_str(&urlencoding::encode(value));
                }
                if let Some((key, _)) = params.get_key_value(&ph.name) {
                    used.push(key.as_str());
                }
            }
        }
    }

    let query: Vec<String> = params
        .iter()
        .filter(|(k, _)| !used.contains(&k.as_str()))
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    Ok(url)
}

/// Join two path fragments into a normalized absolute path.
///
/// `""` and `"/"` both mean the root. The result never ends with a slash
/// unless it is the root itself.
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_matches('/');
    let path = path.trim_matches('/');

    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => format!("/{base}"),
        (false, false) => format!("/{base}/{path}"),
    }
}

/// Check that `path` is a pattern the router accepts.
///
/// Rejects relative paths, `:name` and `*name` segments, empty or malformed
/// placeholders, unbalanced braces and wildcards anywhere but at the end.
pub fn validate_path(path: &str) -> ControllerResult<()> {
    let invalid = |reason| {
        Err(ControllerError::InvalidPath {
            path: path.to_string(),
            reason,
        })
    };

    if !path.starts_with('/') {
        return invalid("must start with '/'");
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return invalid("segments must not start with ':' or '*', use '{name}' or '{*name}'");
    }

    let pieces = pieces(path);
    let last = pieces.len().saturating_sub(1);
    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Literal(text) if text.contains(['{', '}']) => {
                return invalid("unbalanced brace");
            }
            Piece::Param(ph) if ph.name.is_empty() || ph.name.contains(['{', '}', '/', '*']) => {
                return invalid("malformed placeholder");
            }
            Piece::Param(ph) if ph.wildcard && i != last => {
                return invalid("wildcard must be the last part of the path");
            }
            _ => {}
        }
    }
    Ok(())
}

/// Normalize a mount segment; the root becomes the empty string.
///
/// Mounts may hold `{name}` placeholders but no wildcard.
pub fn normalize_mount(mount: &str) -> ControllerResult<String> {
    let trimmed = mount.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Ok(String::new());
    }
    validate_path(trimmed)?;
    if placeholders(trimmed).iter().any(|ph| ph.wildcard) {
        return Err(ControllerError::InvalidPath {
            path: mount.to_string(),
            reason: "mounts cannot contain wildcards",
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Pattern with placeholder names erased, so `/users/{id}` and
/// `/users/{uid}` compare equal.
pub fn shape(pattern: &str) -> String {
    pieces(pattern)
        .into_iter()
        .fold(String::with_capacity(pattern.len()), |mut out, piece| {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Brace(c) => {
                    out.push(c);
                    out.push(c);
                }
                Piece::Param(ph) if ph.wildcard => out.push_str("{*}"),
                Piece::Param(_) => out.push_str("{}"),
            }
            out
        })
}
