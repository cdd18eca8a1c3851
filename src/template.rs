//! Placeholder substitution and URL helpers for the embedded HTML templates.
//!
//! Templates mark slots as `{name}` where `name` is made of lowercase ASCII
//! letters and underscores. The template is scanned once; inserted values are
//! never scanned again, so record text containing `{...}` stays literal.
//! Braces that do not form a known slot (CSS blocks) are copied unchanged.

/// Fill `template`, looking each slot up in `values`.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let slot = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });

        match slot {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Percent-encode each segment of a `/`-separated path for use in a URL.
///
/// Quotes and parentheses come out encoded, so the result is safe inside
/// both an HTML attribute and a CSS `url('...')`.
pub fn url_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}
