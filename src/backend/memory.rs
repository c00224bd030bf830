//! In-memory reference implementation of `SearchIndex`.
//!
//! Understands the native query syntax the translator emits: terms joined
//! by ` AND `, where a term is `field:value`, a prefix match
//! `field:value*`, or a parenthesized alternation `(field:a OR field:b*)`.
//! Values containing whitespace are double-quoted.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::backend::SearchIndex;
use crate::error::AppError;
use crate::models::file_meta::FileId;
use crate::models::listing::SearchHits;

#[derive(Debug, Clone)]
struct FieldMatch {
    field: String,
    value: String,
    prefix: bool,
}

impl FieldMatch {
    fn matches(&self, fields: &HashMap<String, String>) -> bool {
        match fields.get(&self.field) {
            Some(v) if self.prefix => v.starts_with(&self.value),
            Some(v) => v == &self.value,
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
enum Term {
    One(FieldMatch),
    Any(Vec<FieldMatch>),
}

impl Term {
    fn matches(&self, fields: &HashMap<String, String>) -> bool {
        match self {
            Term::One(m) => m.matches(fields),
            Term::Any(ms) => ms.iter().any(|m| m.matches(fields)),
        }
    }
}

fn malformed(query: &str) -> AppError {
    AppError::Index(format!("malformed query: {query}"))
}

fn parse_field_match(token: &str, query: &str) -> Result<FieldMatch, AppError> {
    let (field, value) = token.split_once(':').ok_or_else(|| malformed(query))?;
    let mut value = value.trim();
    let prefix = value.ends_with('*');
    if prefix {
        value = &value[..value.len() - 1];
    }
    let value = value.trim_matches('"');
    Ok(FieldMatch {
        field: field.trim().to_ascii_lowercase(),
        value: value.to_string(),
        prefix,
    })
}

/// Leading token of `rest`, ending at unquoted whitespace.
fn take_token(rest: &str) -> (&str, &str) {
    let mut in_quotes = false;
    for (i, c) in rest.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => return (&rest[..i], &rest[i..]),
            _ => {}
        }
    }
    (rest, "")
}

fn parse_query(query: &str) -> Result<Vec<Term>, AppError> {
    let mut terms = Vec::new();
    let mut rest = query.trim();
    while !rest.is_empty() {
        if let Some(open) = rest.strip_prefix('(') {
            let close = open.find(')').ok_or_else(|| malformed(query))?;
            let alternatives = open[..close]
                .split(" OR ")
                .map(|tok| parse_field_match(tok.trim(), query))
                .collect::<Result<Vec<_>, _>>()?;
            if alternatives.is_empty() {
                return Err(malformed(query));
            }
            terms.push(Term::Any(alternatives));
            rest = open[close + 1..].trim_start();
        } else {
            let (token, remainder) = take_token(rest);
            terms.push(Term::One(parse_field_match(token, query)?));
            rest = remainder.trim_start();
        }
        if let Some(after) = rest.strip_prefix("AND") {
            rest = after.trim_start();
        }
    }
    Ok(terms)
}

/// Index over documents held as field/value maps. Field names are
/// case-insensitive; values match exactly or by prefix.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    docs: Mutex<BTreeMap<FileId, HashMap<String, String>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        MemoryIndex::default()
    }

    pub fn insert(&self, id: FileId, fields: &[(&str, &str)]) {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        self.lock().insert(id, fields);
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<FileId, HashMap<String, String>>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SearchIndex for MemoryIndex {
    fn search(&self, query: &str) -> Result<SearchHits, AppError> {
        let terms = parse_query(query)?;
        let docs = self.lock();
        let ids: Vec<FileId> = docs
            .iter()
            .filter(|(_, fields)| terms.iter().all(|t| t.matches(fields)))
            .map(|(id, _)| *id)
            .collect();
        Ok(SearchHits {
            total: ids.len() as i64,
            ids,
        })
    }

    fn list_all(&self) -> Result<SearchHits, AppError> {
        let docs = self.lock();
        let ids: Vec<FileId> = docs.keys().copied().collect();
        Ok(SearchHits {
            total: ids.len() as i64,
            ids,
        })
    }

    fn delete(&self, id: FileId) -> Result<(), AppError> {
        self.lock().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> MemoryIndex {
        let index = MemoryIndex::new();
        index.insert(1, &[("folder", "a/b"), ("scope", "0"), ("name", "one.txt")]);
        index.insert(2, &[("folder", "a/b/c"), ("scope", "0"), ("name", "two.txt")]);
        index.insert(3, &[("folder", "a/bc"), ("scope", "0"), ("name", "three.txt")]);
        index.insert(4, &[("folder", "a"), ("scope", "0"), ("name", "four.txt")]);
        index.insert(5, &[("folder", "a/b"), ("scope", "1"), ("name", "five.txt")]);
        index
    }

    #[test]
    fn test_exact_term() {
        let index = sample_index();
        let hits = index.search("folder:a/b").unwrap();
        assert_eq!(hits.ids, vec![1, 5]);
        assert_eq!(hits.total, 2);
    }

    #[test]
    fn test_conjunction() {
        let index = sample_index();
        let hits = index.search("folder:a/b AND scope:0").unwrap();
        assert_eq!(hits.ids, vec![1]);
    }

    #[test]
    fn test_folder_group_matches_folder_and_descendants_only() {
        let index = sample_index();
        let hits = index.search("(folder:a/b OR folder:a/b/*) AND scope:0").unwrap();
        // a/b and a/b/c, but never a/bc or a
        assert_eq!(hits.ids, vec![1, 2]);
    }

    #[test]
    fn test_prefix_term() {
        let index = sample_index();
        let hits = index.search("name:t*").unwrap();
        assert_eq!(hits.ids, vec![2, 3]);
    }

    #[test]
    fn test_quoted_value_with_spaces() {
        let index = MemoryIndex::new();
        index.insert(7, &[("folder", "My Documents/tax"), ("scope", "0")]);
        let hits = index.search("folder:\"My Documents/tax\" AND scope:0").unwrap();
        assert_eq!(hits.ids, vec![7]);
    }

    #[test]
    fn test_field_names_case_insensitive() {
        let index = sample_index();
        let hits = index.search("Folder:a/b AND Scope:0").unwrap();
        assert_eq!(hits.ids, vec![1]);
    }

    #[test]
    fn test_missing_field_never_matches() {
        let index = sample_index();
        let hits = index.search("status:published").unwrap();
        assert!(hits.ids.is_empty());
        assert_eq!(hits.total, 0);
    }

    #[test]
    fn test_malformed_query_is_an_error() {
        let index = sample_index();
        assert!(index.search("no-colon-here").is_err());
        assert!(index.search("(folder:a OR folder:b").is_err());
    }

    #[test]
    fn test_list_all() {
        let index = sample_index();
        let hits = index.list_all().unwrap();
        assert_eq!(hits.total, 5);
        assert_eq!(hits.ids.len(), 5);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let index = sample_index();
        index.delete(3).unwrap();
        assert!(!index.contains(3));
        index.delete(3).unwrap(); // already gone, still fine
        assert_eq!(index.len(), 4);
    }
}
