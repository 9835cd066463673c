//! Pure path math for project-relative and classpath-style paths.
//!
//! All paths handled here are plain `/`-separated strings. Roots are
//! absolute prefixes that always carry a trailing `/` so that prefix
//! comparisons cannot match partial path segments.

/// Extensions treated as classpath archives rather than directories.
const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

/// Replaces backslashes with forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Appends a trailing `/` unless one is already present.
pub fn with_dir_suffix(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Removes a trailing `/` if present.
pub fn strip_dir_suffix(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Returns the path of `path` relative to the directory `root`.
///
/// `root` is compared with its dir suffix so `/a/proj` never matches
/// `/a/project-two/lib`. Returns `None` when `path` is not under `root`.
pub fn relative_to(root: &str, path: &str) -> Option<String> {
    let root = with_dir_suffix(root);
    if path == strip_dir_suffix(&root) {
        return Some(String::new());
    }
    path.strip_prefix(root.as_str()).map(str::to_string)
}

/// Joins `path` onto the directory `root`.
///
/// Absolute inputs (leading `/` or a drive-letter prefix) are returned
/// unchanged.
pub fn absolute_from(root: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    format!("{}{path}", with_dir_suffix(root))
}

/// Whether `path` is absolute: rooted at `/` or at a drive letter.
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

/// Case-insensitive extension check. `ext` is given without the dot.
pub fn has_extension(path: &str, ext: &str) -> bool {
    match extension(path) {
        Some(found) => found.eq_ignore_ascii_case(ext),
        None => false,
    }
}

/// The extension of the final path segment, if any.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path)?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// The final segment of `path`, ignoring a trailing `/`.
pub fn file_name(path: &str) -> Option<&str> {
    let trimmed = strip_dir_suffix(path);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.rsplit('/').next().unwrap_or(trimmed))
}

/// Whether `path` names a classpath archive (`.jar`, `.zip`).
pub fn is_archive(path: &str) -> bool {
    ARCHIVE_EXTENSIONS
        .iter()
        .any(|ext| has_extension(path, ext))
}
