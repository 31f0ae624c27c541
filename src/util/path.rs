use std::path::{Component, Path, PathBuf};

/// Join `name` onto `base`, refusing anything that would leave `base`.
///
/// The relative path from `base` to the joined result must be non-empty
/// and free of `..`, root and prefix components.
pub fn resolve_within(base: &Path, name: &str) -> Option<PathBuf> {
    let candidate = base.join(name.trim_start_matches('/'));
    let relative = pathdiff::diff_paths(&candidate, base)?;
    let escapes = relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if relative.as_os_str().is_empty() || escapes || relative.is_absolute() {
        return None;
    }
    Some(candidate)
}

/// Display label derived from a launch target: file name without a bundle suffix.
pub fn label_from_target(target: &str) -> String {
    let trimmed = target.trim_end_matches('/');
    let name = Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string());
    match name.strip_suffix(".app") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// True if `target` ends with `.<ext>` for one of `extensions` (case-insensitive).
pub fn has_extension(target: &str, extensions: &[String]) -> bool {
    let lower = target.trim_end_matches('/').to_lowercase();
    extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.trim_start_matches('.').to_lowercase())))
}
