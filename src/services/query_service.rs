//! Translates filter clauses plus implicit scoping into the index's
//! native query syntax. Pure: nothing here touches a backend.

use std::borrow::Cow;

use crate::models::query::FilterClause;
use crate::scope_path;

pub const FIELD_FOLDER: &str = "folder";
pub const FIELD_SCOPE: &str = "scope";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedQuery {
    /// Native query string; empty means "no filter applies" and the
    /// fetcher should list the full index.
    pub query: String,
    /// Folder the overlay/breadcrumb logic should treat as current. An
    /// explicit folder filter clause overrides the request's folder.
    pub current_folder: String,
}

fn quote(value: &str) -> Cow<'_, str> {
    if value.chars().any(char::is_whitespace) {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}

/// A single term, or `None` when the clause is moot (empty value, bare
/// wildcard) and would match everything.
fn term(field: &str, value: &str, wildcard: bool) -> Option<String> {
    let value = if wildcard {
        value.trim().trim_end_matches('*')
    } else {
        value.trim()
    };
    if value.is_empty() {
        return None;
    }
    let field = field.to_ascii_lowercase();
    let quoted = quote(value);
    Some(if wildcard {
        format!("{field}:{quoted}*")
    } else {
        format!("{field}:{quoted}")
    })
}

/// Matches the folder itself or anything below it, but never a sibling
/// whose name merely shares the prefix.
fn folder_scope_term(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let exact = quote(path);
    let prefix = format!("{path}/");
    let prefix = quote(&prefix);
    Some(format!(
        "({FIELD_FOLDER}:{exact} OR {FIELD_FOLDER}:{prefix}*)"
    ))
}

pub fn translate(filters: &[FilterClause], folder: &str, scope: &str) -> TranslatedQuery {
    let mut current_folder = scope_path::normalize(folder);
    let mut terms: Vec<String> = Vec::new();

    let has_folder_clause = filters
        .iter()
        .any(|f| f.name.eq_ignore_ascii_case(FIELD_FOLDER));

    for clause in filters {
        if clause.name.eq_ignore_ascii_case(FIELD_FOLDER) {
            // An explicit folder clause scopes to exactly that folder and
            // becomes the current folder for the overlay.
            let value = scope_path::normalize(clause.exact_value.as_deref().unwrap_or(""));
            terms.extend(term(FIELD_FOLDER, &value, false));
            current_folder = value;
        } else if let Some(exact) = clause.exact_value.as_deref() {
            terms.extend(term(&clause.name, exact, false));
        } else if let Some(wildcard) = clause.wildcard_value.as_deref() {
            terms.extend(term(&clause.name, wildcard, true));
        }
    }

    if !folder.is_empty() && !has_folder_clause {
        terms.extend(folder_scope_term(&current_folder));
    }

    // Tenant scoping is mandatory and not overridable by caller input.
    terms.extend(term(FIELD_SCOPE, scope, false));

    TranslatedQuery {
        query: terms.join(" AND "),
        current_folder,
    }
}
