/// Canonicalizes a repository-relative path: backslashes become forward
/// slashes, leading/trailing `~` and `/` are stripped. The result is the
/// form used for index matching and breadcrumb comparison.
pub fn normalize(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    normalized
        .trim_matches('~')
        .trim_matches('/')
        .to_string()
}

/// Extension of a raw file name, without the dot, lowercased.
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
