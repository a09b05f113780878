//! Name normalization and join keys.
//!
//! Editorial lists, family names and metadata rows are all matched through
//! these helpers so that every lookup agrees on one canonical form.

use percent_encoding::percent_decode_str;

/// Lowercase, collapse runs of whitespace (including NBSP) to one space, trim.
pub fn normalize_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(|c: char| c.is_whitespace() || c == '\u{00A0}') {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&word.to_lowercase());
    }
    out
}

/// Join key for a URL-like field.
///
/// Last path segment, query and fragment removed, percent-decoded when the
/// encoding is valid UTF-8, extension dropped. Returns `None` for blank input.
pub fn join_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let seg = raw.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(raw);
    let seg = seg.split('?').next().unwrap_or(seg);
    let seg = seg.split('#').next().unwrap_or(seg);

    let decoded = match percent_decode_str(seg).decode_utf8() {
        Ok(s) => s.into_owned(),
        Err(_) => seg.to_string(),
    };
    let key = strip_extension(&decoded);
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Stable tile id for an asset path: file name without extension.
pub fn id_from_path(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    strip_extension(name).to_string()
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => {
            &name[..dot]
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_name("  Eat,\u{00A0}Cook  &\tDrink "), "eat, cook & drink");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_join_key_strips_everything() {
        assert_eq!(
            join_key("http://n2t.net/ark:/65665/edanmdm%3Anmah_639698.png?x=1#top").as_deref(),
            Some("edanmdm:nmah_639698")
        );
        assert_eq!(join_key("edanmdm:nmah_1").as_deref(), Some("edanmdm:nmah_1"));
        assert_eq!(join_key("   "), None);
    }

    #[test]
    fn test_join_key_keeps_invalid_encoding() {
        assert_eq!(join_key("a/b%FFc.jpg").as_deref(), Some("b%FFc"));
    }

    #[test]
    fn test_id_from_path_matches_join_key() {
        let path = "assets/samplers/edanmdm:nmah_639698.png";
        assert_eq!(id_from_path(path), "edanmdm:nmah_639698");
        assert_eq!(join_key(path).as_deref(), Some(id_from_path(path).as_str()));
    }
}
