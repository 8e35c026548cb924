//! Escaping of literal message text
//!
//! Runs once, before any block or inline rule looks at the input. Everything
//! downstream works on escaped text and never escapes again.

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Replace every character with meaning to the output format by its
/// literal-display entity. Nothing else is touched, whitespace included.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Exact inverse of [`escape`]
///
/// Only used to turn an escaped link destination back into something a host
/// can navigate to. Sequences `escape` never produces are left alone.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let decoded = ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity));

        match decoded {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// True when `text` holds no raw character that [`escape`] would rewrite,
/// i.e. every `&` starts one of the entities `escape` emits.
pub fn is_escaped(text: &str) -> bool {
    if text.contains(['<', '>', '"', '\'']) {
        return false;
    }
    text.match_indices('&').all(|(pos, _)| {
        let rest = &text[pos..];
        ENTITIES.iter().any(|(entity, _)| rest.starts_with(entity))
    })
}
