//! Scanning of `{{...}}` variable references in raw document text.
//!
//! The scan works on text lines and knows nothing about the document tree:
//! references inside comments, headers and bodies are all reported.

use crate::models::document::span_range;
use crate::models::Range;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// `{{name}}` optionally followed by `.`-prefixed path segments, e.g.
/// `{{login.response.body.$.token}}`. Group 1 is the base name.
static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Za-z0-9_]+)(\..*?)*\}\}").expect("Failed to compile reference regex")
});

/// One occurrence of a variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// Base name, e.g. `login` for `{{login.response.body.$.token}}`
    pub name: String,
    /// The whole matched token including braces
    pub text: String,
    /// Zero-based line of the occurrence
    pub line: usize,
    /// Span of the base name only
    pub range: Range,
}

impl VariableReference {
    /// Path following the base name, without braces and without the leading
    /// dot: `response.body.$.token` for `{{login.response.body.$.token}}`.
    pub fn path(&self) -> &str {
        let inner = self
            .text
            .strip_prefix("{{")
            .and_then(|t| t.strip_suffix("}}"))
            .unwrap_or(&self.text);
        let rest = inner.strip_prefix(self.name.as_str()).unwrap_or(inner);
        rest.strip_prefix('.').unwrap_or(rest)
    }
}

/// References grouped by base name. Iteration yields names in the order of
/// their first occurrence; occurrences keep line and in-line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableReferences {
    order: Vec<String>,
    by_name: HashMap<String, Vec<VariableReference>>,
}

impl VariableReferences {
    fn push(&mut self, reference: VariableReference) {
        match self.by_name.get_mut(&reference.name) {
            Some(occurrences) => occurrences.push(reference),
            None => {
                self.order.push(reference.name.clone());
                self.by_name.insert(reference.name.clone(), vec![reference]);
            }
        }
    }

    /// Occurrences of `name`, if it is referenced at all
    pub fn get(&self, name: &str) -> Option<&[VariableReference]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// Names with their occurrences, in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[VariableReference])> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.by_name[name].as_slice()))
    }

    /// Number of distinct names referenced
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Scans `text` for variable references.
///
/// # Examples
///
/// ```
/// use rest_client_core::variables::scan_references;
///
/// let refs = scan_references("GET {{host}}/users/{{login.response.body.$.id}}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs.get("login").unwrap()[0].range.start.character, 21);
/// ```
pub fn scan_references(text: &str) -> VariableReferences {
    let mut references = VariableReferences::default();

    for (line_number, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        for captures in REFERENCE_REGEX.captures_iter(line) {
            let (Some(full), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            references.push(VariableReference {
                name: name.as_str().to_string(),
                text: full.as_str().to_string(),
                line: line_number,
                range: span_range(line_number, line, name.start(), name.end()),
            });
        }
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_and_path_references_share_base_name() {
        let refs = scan_references("GET {{token}}\nX-Id: {{token.path.$.x}}");

        let occurrences = refs.get("token").unwrap();
        assert_eq!(occurrences.len(), 2);

        assert_eq!(occurrences[0].range, Range::at_line(0, 6, 11));
        assert_eq!(occurrences[0].text, "{{token}}");
        assert_eq!(occurrences[1].range, Range::at_line(1, 8, 13));
        assert_eq!(occurrences[1].text, "{{token.path.$.x}}");
    }

    #[test]
    fn test_names_iterate_in_first_occurrence_order() {
        let refs = scan_references("{{b}} {{a}}\n{{b}} {{c}}");
        let names: Vec<&str> = refs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(refs.get("b").unwrap()[1].line, 1);
    }

    #[test]
    fn test_non_matching_tokens_are_ignored() {
        let refs = scan_references("{{$guid}} {{ spaced }} {{}} {single}");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_path_strips_name_and_braces() {
        let refs = scan_references("{{login.response.body.$.token}} {{login}}");
        let occurrences = refs.get("login").unwrap();
        assert_eq!(occurrences[0].path(), "response.body.$.token");
        assert_eq!(occurrences[1].path(), "");
    }

    #[test]
    fn test_crlf_lines_do_not_shift_columns() {
        let refs = scan_references("GET {{a}}\r\nGET {{b}}\r\n");
        assert_eq!(refs.get("b").unwrap()[0].range, Range::at_line(1, 6, 7));
    }

    proptest! {
        #[test]
        fn prop_range_covers_only_base_name(
            prefix in "[a-z /:]{0,20}",
            name in "[A-Za-z_][A-Za-z0-9_]{0,12}",
            path in proptest::option::of("\\.[a-z$.]{1,10}"),
        ) {
            let line = format!("{}{{{{{}{}}}}}", prefix, name, path.clone().unwrap_or_default());
            let refs = scan_references(&line);
            let occurrences = refs.get(&name).unwrap();
            prop_assert_eq!(occurrences.len(), 1);
            let range = occurrences[0].range;
            prop_assert_eq!(range.start.character, prefix.len() + 2);
            prop_assert_eq!(range.end.character - range.start.character, name.len());
        }
    }
}
