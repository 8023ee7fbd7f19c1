//! Lexical path handling for overlay paths.
//!
//! Overlay paths are plain slash-separated strings, independent of the host
//! platform. Nothing here touches the filesystem: `..` is resolved purely
//! lexically, so `/a/b/../c` becomes `/a/c` whether or not `/a/b` exists.

/// Lexically normalize a slash-separated path.
///
/// - Repeated separators collapse to one.
/// - `.` segments are dropped.
/// - `..` removes the preceding segment. At the root of an absolute path it
///   is dropped; at the start of a relative path it is kept.
/// - Trailing slashes are removed, except for the root itself.
/// - An empty result is `/` for absolute input and `.` otherwise.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    match (rooted, segments.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", segments.join("/")),
        (false, true) => ".".to_string(),
        (false, false) => segments.join("/"),
    }
}

/// Returns true if the path is absolute (starts with `/`).
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Normalize a caller-facing path, treating relative input as rooted.
///
/// `"."` and `""` map to `/`, `"a/b"` maps to `/a/b`.
pub fn to_absolute(path: &str) -> String {
    let cleaned = clean(path);
    if is_absolute(&cleaned) {
        cleaned
    } else {
        clean(&format!("/{}", cleaned))
    }
}

/// Join a directory path and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    match dir {
        "/" => format!("/{}", name),
        "." | "" => name.to_string(),
        _ => format!("{}/{}", dir, name),
    }
}

/// Strip `prefix` from `path` if `prefix` is `path` or one of its ancestors.
///
/// Returns the remainder without a leading slash, or `"."` when the two are
/// equal. Both arguments must already be clean and absolute.
pub fn strip_ancestor(prefix: &str, path: &str) -> Option<String> {
    if path == prefix {
        return Some(".".to_string());
    }
    if prefix == "/" {
        return Some(path.trim_start_matches('/').to_string());
    }
    path.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
}

/// The first segment of `descendant` below `ancestor`, if `ancestor` is a
/// strict ancestor of it.
///
/// `next_segment("/a", "/a/b/c")` is `Some("b")`. Returns `None` for equal
/// paths and unrelated ones.
pub fn next_segment<'a>(ancestor: &str, descendant: &'a str) -> Option<&'a str> {
    let rest = if ancestor == "/" {
        descendant.strip_prefix('/')?
    } else {
        descendant.strip_prefix(ancestor)?.strip_prefix('/')?
    };
    rest.split('/').next().filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean(""), ".");
        assert_eq!(clean("."), ".");
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("//"), "/");
        assert_eq!(clean("/foo/"), "/foo");
        assert_eq!(clean("/foo//bar/./baz"), "/foo/bar/baz");
        assert_eq!(clean("/foo/../bar"), "/bar");
        assert_eq!(clean("/../../foo"), "/foo");
        assert_eq!(clean("foo/.."), ".");
        assert_eq!(clean("../foo"), "../foo");
        assert_eq!(clean("foo/../../bar"), "../bar");
    }

    #[test]
    fn test_to_absolute() {
        assert_eq!(to_absolute("."), "/");
        assert_eq!(to_absolute(""), "/");
        assert_eq!(to_absolute("quux/1.txt"), "/quux/1.txt");
        assert_eq!(to_absolute("../quux"), "/quux");
        assert_eq!(to_absolute("/corge/"), "/corge");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
        assert_eq!(join(".", "b"), "b");
    }

    #[test]
    fn test_strip_ancestor() {
        assert_eq!(strip_ancestor("/a", "/a"), Some(".".to_string()));
        assert_eq!(strip_ancestor("/a", "/a/f.txt"), Some("f.txt".to_string()));
        assert_eq!(strip_ancestor("/a", "/ab/f.txt"), None);
        assert_eq!(strip_ancestor("/", "/x/y"), Some("x/y".to_string()));
        assert_eq!(strip_ancestor("/", "/"), Some(".".to_string()));
    }

    #[test]
    fn test_next_segment() {
        assert_eq!(next_segment("/a", "/a/b/c"), Some("b"));
        assert_eq!(next_segment("/", "/a/b"), Some("a"));
        assert_eq!(next_segment("/a", "/a"), None);
        assert_eq!(next_segment("/a", "/ab/c"), None);
        assert_eq!(next_segment("/", "/"), None);
    }
}
