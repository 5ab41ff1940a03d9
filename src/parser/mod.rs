//! Citation template parsing.
//!
//! Encyclopedia references arrive as `{{cite book |key=value |... }}`
//! templates. The parser splits the template into its `|`-delimited
//! fragments, discards the template-name segment, and keeps only the fields
//! relevant to matching against a catalog record. Every retained key is
//! suffixed with `_wiki` to namespace it against the candidate-side fields
//! of the same semantic name (`title` vs `title_ia` and so on).

mod error;

pub use error::ParseError;

use std::collections::BTreeMap;

use tracing::debug;

/// Citation fields retained for matching; everything else in the template
/// (isbn, oclc, access-date, archive links) is dropped.
pub const RETAIN_KEYS: [&str; 10] = [
    "title", "last", "first", "first1", "last1", "first2", "last2", "date", "publisher", "url",
];

/// Suffix applied to every retained citation key.
pub const CITATION_SUFFIX: &str = "_wiki";

/// Parses a templated citation string into a namespaced field mapping.
///
/// Splits on `|`, discards the leading template-name segment, strips
/// template-close markers (`}`) and surrounding whitespace from each
/// fragment, then splits each fragment at its first `=`. Only keys in
/// `retain_keys` are kept, each suffixed with `_wiki`.
///
/// # Errors
///
/// Returns [`ParseError::NoFields`] when the input has no `|` delimiter at
/// all, and [`ParseError::MissingSeparator`] when any fragment lacks `=`.
pub fn parse_citation(
    raw: &str,
    retain_keys: &[&str],
) -> Result<BTreeMap<String, String>, ParseError> {
    let mut fragments = raw.split('|');

    // First segment is the template name ("{{cite book "), not a field.
    fragments.next();

    let mut fields = BTreeMap::new();
    let mut seen_any = false;

    for fragment in fragments {
        seen_any = true;
        let cleaned = fragment.replace('}', "");
        let cleaned = cleaned.trim();

        let Some((key, value)) = cleaned.split_once('=') else {
            return Err(ParseError::missing_separator(cleaned));
        };
        let key = key.trim();
        let value = value.trim();

        if retain_keys.contains(&key) {
            fields.insert(format!("{key}{CITATION_SUFFIX}"), value.to_string());
        }
    }

    if !seen_any {
        return Err(ParseError::no_fields(raw));
    }

    debug!(fields = fields.len(), "Parsed citation template");
    Ok(fields)
}

/// Parses a citation with the default retain-set ([`RETAIN_KEYS`]).
///
/// # Errors
///
/// See [`parse_citation`].
pub fn parse_cite_book(raw: &str) -> Result<BTreeMap<String, String>, ParseError> {
    parse_citation(raw, &RETAIN_KEYS)
}
