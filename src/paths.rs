//! Path-string helpers tolerant of mixed `/` and `\` separators.
//!
//! Record paths are opaque strings coming from whatever filesystem the index
//! was built on, so both separator styles must be accepted. Comparisons run
//! on the normalized (forward-slash) form; display strings keep whatever
//! style the record arrived with.

/// Convert every backslash to a forward slash.
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn last_separator(path: &str) -> Option<usize> {
    path.rfind(|c| c == '/' || c == '\\')
}

/// Directory part of a path: the text before the last separator.
/// A path with no separator degrades to an empty directory.
pub fn parent_dir(path: &str) -> &str {
    match last_separator(path) {
        Some(i) => &path[..i],
        None => "",
    }
}

/// Final path segment (the file name).
pub fn file_name(path: &str) -> &str {
    match last_separator(path) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// File name with its extension removed. Dotfiles keep their full name.
pub fn stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

/// True when `dir` sits strictly below `ancestor`.
///
/// Both arguments must already be normalized. The empty directory (a
/// separator-less record path) is never an ancestor of anything.
pub fn is_descendant(dir: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return false;
    }
    dir.len() > ancestor.len()
        && dir.starts_with(ancestor)
        && dir.as_bytes()[ancestor.len()] == b'/'
}

/// Last segment of a directory path, for display.
pub fn dir_label(dir: &str) -> &str {
    let trimmed = dir.trim_end_matches(['/', '\\']);
    match trimmed.rfind(|c| c == '/' || c == '\\') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_dir("/media/clips/movie.mkv"), "/media/clips");
        assert_eq!(file_name("/media/clips/movie.mkv"), "movie.mkv");
        assert_eq!(parent_dir("D:\\media\\movie.mkv"), "D:\\media");
        assert_eq!(file_name("D:\\media\\movie.mkv"), "movie.mkv");
    }

    #[test]
    fn test_separatorless_path_degrades() {
        assert_eq!(parent_dir("movie.mkv"), "");
        assert_eq!(file_name("movie.mkv"), "movie.mkv");
        assert_eq!(stem("movie.mkv"), "movie");
    }

    #[test]
    fn test_stem() {
        assert_eq!(stem("/a/clip_opt.mp4"), "clip_opt");
        assert_eq!(stem("/a/noext"), "noext");
        assert_eq!(stem("/a/.hidden"), ".hidden");
        assert_eq!(stem("/a/two.dots.mkv"), "two.dots");
    }

    #[test]
    fn test_descendant() {
        assert!(is_descendant("/a/b", "/a"));
        assert!(is_descendant("/a/b/c", "/a"));
        assert!(!is_descendant("/ab", "/a"));
        assert!(!is_descendant("/a", "/a"));
        assert!(!is_descendant("/a/b", ""));
    }

    #[test]
    fn test_dir_label() {
        assert_eq!(dir_label("/media/clips"), "clips");
        assert_eq!(dir_label("D:\\media"), "media");
        assert_eq!(dir_label(""), "");
    }
}
