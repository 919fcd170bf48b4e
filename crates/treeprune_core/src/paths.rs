use log::trace;
use path_clean::clean;
use std::path::{Component, Path, PathBuf};

/// Joins `path` onto `base` unless it is already absolute, then removes `.`
/// and `..` segments lexically. Symlinks are not followed.
pub fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let joined = base.join(path);
    let cleaned = clean(&joined);
    trace!("Resolved '{}' against {:?} to {:?}", path, base, cleaned);
    cleaned
}

/// Lossy `/`-separated rendering of a path, the form the path tree works on.
pub fn to_slash_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Create a relative path from `base` to `target`
pub fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_components = target.components();
    let mut base_components = base.components();

    let mut common_prefix_len = 0;
    let mut target_parts = Vec::new();
    let mut base_parts = Vec::new();

    loop {
        match (target_components.next(), base_components.next()) {
            (Some(t), Some(b)) if t == b => {
                common_prefix_len += 1;
            }
            (Some(t), Some(b)) => {
                target_parts.push(t);
                base_parts.push(b);
                break;
            }
            (Some(t), None) => {
                target_parts.push(t);
                break;
            }
            (None, Some(b)) => {
                base_parts.push(b);
                break;
            }
            (None, None) => {
                return Some(PathBuf::from("."));
            }
        }
    }

    target_parts.extend(target_components);
    base_parts.extend(base_components);

    if common_prefix_len == 0 && target.components().next() != base.components().next() {
        return None;
    }

    let mut result = PathBuf::new();
    for _ in &base_parts {
        result.push("..");
    }
    for component in target_parts {
        match component {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// [`make_relative`] rendered as a `/`-separated string, falling back to the
/// target itself when no relative form exists.
pub fn relative_display(target: &Path, base: &Path) -> String {
    match make_relative(target, base) {
        Some(rel) => to_slash_string(&rel),
        None => to_slash_string(target),
    }
}
