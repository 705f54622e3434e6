/// HTML entity decoding for question text.
///
/// The remote trivia source HTML-escapes its strings (`&quot;`, `&#039;`,
/// `&eacute;`, ...). Prompts are shown as plain text, so entities are
/// decoded while the prompt is built.
use quick_xml::escape::resolve_html5_entity;
use std::borrow::Cow;

/// Longest entity body we try to resolve (`CounterClockwiseContourIntegral`).
const MAX_ENTITY_LEN: usize = 32;

/// Decode HTML character references in `input`.
///
/// Unknown or malformed references are left untouched. Returns a borrowed
/// string when there is nothing to decode.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';') {
            Some(end)
                if end > 0 && end <= MAX_ENTITY_LEN && push_resolved(&after[..end], &mut out) =>
            {
                rest = &after[end + 1..];
            }
            _ => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Append the text `body` refers to. Returns false, leaving `out` alone,
/// when the reference is unknown.
fn push_resolved(body: &str, out: &mut String) -> bool {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        return match code.and_then(char::from_u32) {
            Some(c) => {
                out.push(c);
                true
            }
            None => false,
        };
    }
    match resolve_html5_entity(body) {
        Some(text) => {
            out.push_str(text);
            true
        }
        None => false,
    }
}
