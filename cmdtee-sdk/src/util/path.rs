//! Path helpers.

use std::path::{Path, PathBuf};

use crate::types::{Error, Result};

/// Resolve `name` to an executable path.
///
/// Absolute paths are returned unchanged, without checking that they exist.
/// Anything else is looked up on the search path (or, when it contains a
/// separator, relative to the current directory).
pub fn resolve_executable_path(name: &str) -> Result<PathBuf> {
    resolve_executable_path_in(name, None)
}

/// Resolve `name` as seen from a child started in `cwd`.
///
/// A relative name with a separator (`./tool`, `bin/tool`) is looked up
/// under `cwd` rather than the current directory, and so are relative
/// search path entries. With `cwd` unset this is
/// [`resolve_executable_path`].
pub fn resolve_executable_path_in(name: &str, cwd: Option<&Path>) -> Result<PathBuf> {
    let path = Path::new(name);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let resolved = match cwd {
        Some(cwd) => {
            let cwd = std::path::absolute(cwd)?;
            which::which_in(name, std::env::var_os("PATH"), cwd)
        }
        None => which::which(name),
    };
    resolved.map_err(|source| Error::ExecutableNotFound {
        name: name.to_string(),
        source,
    })
}

/// File name of `path` without directories and without its last extension.
///
/// Only the text after the final `.` of the file name is removed:
/// `file.txt.ext` becomes `file.txt`, and a dot file such as `.profile` is
/// all extension, leaving an empty name.
pub fn base_name_without_extension<P: AsRef<Path>>(path: P) -> String {
    let Some(name) = path.as_ref().file_name() else {
        return String::new();
    };

    let name = name.to_string_lossy();
    match name.rfind('.') {
        Some(dot) => name[..dot].to_string(),
        None => name.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name_without_extension("/path/to/file.txt"), "file");
        assert_eq!(base_name_without_extension("/path/to/file.txt.ext"), "file.txt");
        assert_eq!(
            base_name_without_extension("/パス/トゥ/日本語パス.txt.ext"),
            "日本語パス.txt"
        );
        assert_eq!(base_name_without_extension("relative/noext"), "noext");
    }

    #[test]
    fn test_base_name_strips_after_last_dot_only() {
        assert_eq!(base_name_without_extension("/path/to/.profile"), "");
        assert_eq!(base_name_without_extension("/path/to/.config.bak"), ".config");
        assert_eq!(base_name_without_extension("trailing."), "trailing");
        assert_eq!(base_name_without_extension("/"), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute_is_unchanged() {
        let resolved = resolve_executable_path("/opt/local/bin/go").unwrap();
        assert_eq!(resolved, PathBuf::from("/opt/local/bin/go"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_from_search_path() {
        let expected = which::which("sh").unwrap();
        assert_eq!(resolve_executable_path("sh").unwrap(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_relative_against_cwd() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("tool");
        std::fs::write(&tool, "#!/bin/sh\necho tool\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolved = resolve_executable_path_in("./tool", Some(dir.path())).unwrap();
        assert_eq!(
            resolved.canonicalize().unwrap(),
            tool.canonicalize().unwrap()
        );
        assert!(resolve_executable_path("./tool").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_bare_name_ignores_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let expected = which::which("sh").unwrap();
        assert_eq!(resolve_executable_path_in("sh", Some(dir.path())).unwrap(), expected);
    }

    #[test]
    fn test_resolve_missing() {
        let result = resolve_executable_path("cmdtee-no-such-binary");
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }
}
