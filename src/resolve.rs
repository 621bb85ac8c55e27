//! Subrequest path resolution.
//!
//! A web server redirecting a request to the bridge hands over the virtual
//! path together with its filesystem translation. Trailing segments of the
//! virtual path may be extra path info rather than real directories, so the
//! translation may not exist. [`resolve`] walks up both paths until an
//! existing file is found.
use std::path::{Path, PathBuf};

use crate::environ::{Environ, keys};
use crate::error::{Error, Result};
use crate::log::trace;

/// Result of subrequest path resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegments {
    /// Existing filesystem path.
    pub matched_prefix: PathBuf,
    /// Virtual path addressing [`matched_prefix`].
    ///
    /// [`matched_prefix`]: PathSegments::matched_prefix
    pub script_name: String,
    /// Remaining virtual path, empty or starting with `/`.
    pub path_info: String,
}

impl PathSegments {
    /// Rewrite `SCRIPT_NAME` and `PATH_INFO` of the request attributes.
    pub fn apply(&self, environ: &mut Environ<'_>) {
        environ.insert(keys::SCRIPT_NAME, self.script_name.as_str());
        environ.insert(keys::PATH_INFO, self.path_info.as_str());
    }
}

/// Resolve a virtual path against its claimed filesystem translation.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no prefix of the translation exists.
pub fn resolve(virtual_path: &str, translated: &Path) -> Result<PathSegments> {
    resolve_with(virtual_path, translated, Path::exists)
}

/// [`resolve`] with a custom existence check.
pub fn resolve_with<F>(virtual_path: &str, translated: &Path, exists: F) -> Result<PathSegments>
where
    F: Fn(&Path) -> bool,
{
    let mut current = translated;
    let mut script_name = virtual_path;
    let mut extra = Vec::new();

    while !exists(current) {
        trace!("{current:?} missing, moving up");

        current = step_up(current).ok_or_else(|| Error::NotFound(translated.to_path_buf()))?;

        let (head, tail) = split(script_name);
        script_name = head;
        extra.push(tail);
    }

    let path_info = if extra.is_empty() {
        String::new()
    } else {
        extra.iter().rev().fold(String::new(), |mut acc, segment| {
            acc.push('/');
            acc.push_str(segment);
            acc
        })
    };

    Ok(PathSegments {
        matched_prefix: current.to_path_buf(),
        script_name: script_name.to_owned(),
        path_info,
    })
}

/// Drop the final segment of a filesystem path, like [`split`] does.
///
/// A trailing `/` marks an empty final segment, so only the slash is
/// dropped. Returns `None` if there is nothing left to drop.
fn step_up(path: &Path) -> Option<&Path> {
    if path.as_os_str().as_encoded_bytes().ends_with(b"/") {
        let trimmed = path.components().as_path();
        (trimmed.as_os_str().len() < path.as_os_str().len()).then_some(trimmed)
    } else {
        path.parent()
    }
}

/// Split path into everything up to the last `/` and the final segment.
///
/// Trailing slashes of the head are stripped, unless the head is all slashes.
fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => {
            let (head, tail) = (&path[..=i], &path[i + 1..]);
            let trimmed = head.trim_end_matches('/');
            (if trimmed.is_empty() { head } else { trimmed }, tail)
        }
        None => ("", path),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn only(existing: &'static [&'static str]) -> impl Fn(&Path) -> bool {
        move |path| path == Path::new("/") || existing.iter().any(|e| path == Path::new(e))
    }

    #[test]
    fn test_split() {
        assert_eq!(split("/app/view/42"), ("/app/view", "42"));
        assert_eq!(split("/app"), ("/", "app"));
        assert_eq!(split("/"), ("/", ""));
        assert_eq!(split("//app"), ("//", "app"));
        assert_eq!(split("a//b"), ("a", "b"));
        assert_eq!(split("app"), ("", "app"));
        assert_eq!(split(""), ("", ""));
    }

    #[test]
    fn resolves_extra_path_info() {
        let segments = resolve_with(
            "/app/view/42",
            Path::new("/srv/app/view/42"),
            only(&["/srv/app"]),
        )
        .unwrap();

        assert_eq!(segments.matched_prefix, Path::new("/srv/app"));
        assert_eq!(segments.script_name, "/app");
        assert_eq!(segments.path_info, "/view/42");
    }

    #[test]
    fn existing_translation_has_no_path_info() {
        let segments = resolve_with(
            "/app",
            Path::new("/srv/app"),
            only(&["/srv/app"]),
        )
        .unwrap();

        assert_eq!(segments.matched_prefix, Path::new("/srv/app"));
        assert_eq!(segments.script_name, "/app");
        assert_eq!(segments.path_info, "");
    }

    #[test]
    fn walks_up_to_root() {
        let segments = resolve_with("/a/b", Path::new("/a/b"), only(&[])).unwrap();

        assert_eq!(segments.matched_prefix, Path::new("/"));
        assert_eq!(segments.script_name, "/");
        assert_eq!(segments.path_info, "/a/b");
    }

    #[test]
    fn not_found_without_existing_prefix() {
        let err = resolve_with("/a/b", Path::new("a/b"), |_| false).unwrap_err();
        assert!(matches!(err, Error::NotFound(path) if path == Path::new("a/b")));
    }

    #[test]
    fn resolves_on_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("app");
        fs::write(&script, b"").unwrap();

        let translated = script.join("view").join("42");
        let segments = resolve("/app/view/42", &translated).unwrap();

        assert_eq!(segments.matched_prefix, script);
        assert_eq!(segments.script_name, "/app");
        assert_eq!(segments.path_info, "/view/42");
    }

    #[test]
    fn test_step_up() {
        assert_eq!(step_up(Path::new("/srv/app/")), Some(Path::new("/srv/app")));
        assert_eq!(step_up(Path::new("/srv/app//")), Some(Path::new("/srv/app")));
        assert_eq!(step_up(Path::new("/srv/app")), Some(Path::new("/srv")));
        assert_eq!(step_up(Path::new("app")), Some(Path::new("")));
        assert_eq!(step_up(Path::new("/")), None);
        assert_eq!(step_up(Path::new("")), None);
    }

    #[test]
    fn trailing_slash_after_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("app");
        fs::write(&script, b"").unwrap();

        let mut translated = script.clone().into_os_string();
        translated.push("/");
        let segments = resolve("/app/", Path::new(&translated)).unwrap();

        assert_eq!(segments.matched_prefix, script);
        assert_eq!(segments.script_name, "/app");
        assert_eq!(segments.path_info, "/");
    }

    #[test]
    fn trailing_slash_after_path_info() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("app");
        fs::write(&script, b"").unwrap();

        let mut translated = script.join("view").into_os_string();
        translated.push("/");
        let segments = resolve("/app/view/", Path::new(&translated)).unwrap();

        assert_eq!(segments.matched_prefix, script);
        assert_eq!(segments.script_name, "/app");
        assert_eq!(segments.path_info, "/view/");
    }

    #[test]
    fn trailing_slash_steps_in_lockstep() {
        let segments = resolve_with(
            "/app/view/",
            Path::new("/srv/app/view/"),
            only(&["/srv/app"]),
        )
        .unwrap();

        assert_eq!(segments.matched_prefix.as_os_str(), "/srv/app");
        assert_eq!(segments.script_name, "/app");
        assert_eq!(segments.path_info, "/view/");
    }

    #[test]
    fn apply_rewrites_attributes() {
        let segments = PathSegments {
            matched_prefix: PathBuf::from("/srv/app"),
            script_name: "/app".into(),
            path_info: "/view/42".into(),
        };
        let mut environ = Environ::from_vars([(keys::PATH_INFO, "/app/view/42")]);
        segments.apply(&mut environ);

        assert_eq!(environ.get_str(keys::SCRIPT_NAME), Some("/app"));
        assert_eq!(environ.get_str(keys::PATH_INFO), Some("/view/42"));
    }
}
