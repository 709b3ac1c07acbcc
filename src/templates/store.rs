//! templates::store
//!
//! Template lookup by name or path.
//!
//! # Reference Resolution
//!
//! A reference is treated as a filesystem path when it:
//! - contains a path separator, or
//! - starts with `.` or `~`, or
//! - ends in `.yaml`, `.yml`, `.txt` or `.md`.
//!
//! Anything else is a name looked up in the store directory as
//! `<name>.yaml`, then `<name>.yml`.

use std::fs;
use std::path::{Path, PathBuf};

use super::template::{self, Template, TemplateSource};
use super::TemplateError;
use crate::core::paths::{expand_home, LlmPaths};

const PATH_EXTENSIONS: &[&str] = &["yaml", "yml", "txt", "md"];
const STORE_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// A directory of named templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the user directory's `templates/`.
    pub fn from_paths(paths: &LlmPaths) -> Self {
        Self::new(paths.templates_dir())
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a template by name or path.
    ///
    /// # Errors
    ///
    /// - `TemplateError::NotFound` if nothing exists for the reference
    /// - `TemplateError::Io` if the file exists but cannot be read
    /// - `TemplateError::Invalid` if the YAML is malformed
    pub fn resolve(&self, reference: &str) -> Result<Template, TemplateError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(TemplateError::NotFound(String::new()));
        }

        if is_path_reference(reference) {
            let path = expand_home(Path::new(reference));
            if !path.is_file() {
                return Err(TemplateError::NotFound(reference.to_string()));
            }
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| reference.to_string());
            log::debug!("template '{}' from file {}", name, path.display());
            let content = read(&path)?;
            return Template::parse(name, TemplateSource::File(path), &content);
        }

        match self.find(reference) {
            Some(path) => {
                log::debug!("template '{}' from store {}", reference, path.display());
                let content = read(&path)?;
                Template::parse(reference, TemplateSource::Store(path), &content)
            }
            None => Err(TemplateError::NotFound(reference.to_string())),
        }
    }

    /// Path of the stored template `name`, if it exists.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if validate_name(name).is_err() {
            return None;
        }
        STORE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file())
    }

    /// Whether a stored template called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Names of stored templates, sorted and deduplicated.
    ///
    /// A missing store directory lists as empty.
    pub fn list(&self) -> Result<Vec<String>, TemplateError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TemplateError::Io {
                    path: self.dir.clone(),
                    source: e,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| STORE_EXTENSIONS.contains(&e))
            })
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();

        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Raw file content of a stored template.
    pub fn raw(&self, name: &str) -> Result<String, TemplateError> {
        let path = self
            .find(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        read(&path)
    }

    /// Create or replace a stored template.
    ///
    /// Plain text is stored as the template prompt; YAML templates are
    /// validated and stored verbatim.
    ///
    /// # Errors
    ///
    /// - `TemplateError::InvalidName` for names that are not simple file stems
    /// - `TemplateError::AlreadyExists` if the template exists and `force`
    ///   is false
    pub fn create(&self, name: &str, content: &str, force: bool) -> Result<PathBuf, TemplateError> {
        validate_name(name)?;

        if !force {
            if let Some(existing) = self.find(name) {
                return Err(TemplateError::AlreadyExists(existing));
            }
        }

        let stored = template::to_storage(name, content)?;
        let path = self.dir.join(format!("{}.yaml", name));

        fs::create_dir_all(&self.dir).map_err(|e| TemplateError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        fs::write(&path, stored).map_err(|e| TemplateError::Io {
            path: path.clone(),
            source: e,
        })?;

        log::debug!("wrote template {}", path.display());
        Ok(path)
    }
}

/// Whether `reference` addresses a file rather than a stored name.
pub fn is_path_reference(reference: &str) -> bool {
    if reference.contains('/') || reference.contains(std::path::MAIN_SEPARATOR) {
        return true;
    }
    if reference.starts_with('.') || reference.starts_with('~') {
        return true;
    }
    Path::new(reference)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PATH_EXTENSIONS.contains(&e))
}

/// Check that `name` can be used as a stored template name.
pub fn validate_name(name: &str) -> Result<(), TemplateError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(name.to_string()))
    }
}

fn read(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|e| TemplateError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &str)]) -> (TempDir, TemplateStore) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let store = TemplateStore::new(temp.path());
        (temp, store)
    }

    mod references {
        use super::*;

        #[test]
        fn path_like_references() {
            assert!(is_path_reference("./t.yaml"));
            assert!(is_path_reference("dir/t"));
            assert!(is_path_reference("~/prompts/t"));
            assert!(is_path_reference("notes.txt"));
            assert!(is_path_reference("README.md"));
        }

        #[test]
        fn name_like_references() {
            assert!(!is_path_reference("claude"));
            assert!(!is_path_reference("zsh-cmd"));
            assert!(!is_path_reference("v1.2"));
        }

        #[test]
        fn name_validation() {
            assert!(validate_name("review_v2").is_ok());
            assert!(validate_name("").is_err());
            assert!(validate_name(".hidden").is_err());
            assert!(validate_name("a b").is_err());
            assert!(validate_name("a/b").is_err());
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn by_name() {
            let (_temp, store) = store_with(&[("claude.yaml", "system: You are Claude.\n")]);
            let t = store.resolve("claude").unwrap();
            assert_eq!(t.name, "claude");
            assert_eq!(t.system.as_deref(), Some("You are Claude."));
            assert!(matches!(t.source, TemplateSource::Store(_)));
        }

        #[test]
        fn by_name_yml_extension() {
            let (_temp, store) = store_with(&[("short.yml", "prompt: hi\n")]);
            assert_eq!(store.resolve("short").unwrap().prompt.as_deref(), Some("hi"));
        }

        #[test]
        fn by_path() {
            let (temp, store) = store_with(&[]);
            let path = temp.path().join("adhoc.txt");
            fs::write(&path, "Explain {{topic}}").unwrap();

            let t = store.resolve(path.to_str().unwrap()).unwrap();
            assert_eq!(t.name, "adhoc");
            assert_eq!(t.prompt.as_deref(), Some("Explain {{topic}}"));
            assert_eq!(t.source, TemplateSource::File(path));
        }

        #[test]
        fn unknown_name_not_found() {
            let (_temp, store) = store_with(&[]);
            let err = store.resolve("nope").unwrap_err();
            assert!(matches!(err, TemplateError::NotFound(ref r) if r == "nope"));
        }

        #[test]
        fn missing_path_not_found() {
            let (_temp, store) = store_with(&[]);
            let err = store.resolve("./missing.yaml").unwrap_err();
            assert!(matches!(err, TemplateError::NotFound(_)));
        }

        #[test]
        fn missing_store_dir_is_not_found() {
            let store = TemplateStore::new("/definitely/not/here");
            assert!(matches!(
                store.resolve("claude"),
                Err(TemplateError::NotFound(_))
            ));
            assert!(store.list().unwrap().is_empty());
        }
    }

    mod manage {
        use super::*;

        #[test]
        fn list_sorted_and_filtered() {
            let (_temp, store) = store_with(&[
                ("b.yaml", "prompt: b"),
                ("a.yml", "prompt: a"),
                ("a.yaml", "prompt: a"),
                ("notes.txt", "ignored"),
            ]);
            assert_eq!(store.list().unwrap(), vec!["a", "b"]);
        }

        #[test]
        fn create_wraps_plain_text() {
            let (_temp, store) = store_with(&[]);
            let path = store.create("explain", "Explain {{input}}", false).unwrap();
            assert!(path.ends_with("explain.yaml"));

            let t = store.resolve("explain").unwrap();
            assert_eq!(t.prompt.as_deref(), Some("Explain {{input}}"));
        }

        #[test]
        fn create_refuses_overwrite_without_force() {
            let (_temp, store) = store_with(&[("x.yaml", "prompt: old")]);
            assert!(matches!(
                store.create("x", "new", false),
                Err(TemplateError::AlreadyExists(_))
            ));

            store.create("x", "new", true).unwrap();
            assert_eq!(store.resolve("x").unwrap().prompt.as_deref(), Some("new"));
        }

        #[test]
        fn create_creates_store_dir() {
            let temp = TempDir::new().unwrap();
            let store = TemplateStore::new(temp.path().join("nested/templates"));
            store.create("t", "hello", false).unwrap();
            assert_eq!(store.list().unwrap(), vec!["t"]);
        }

        #[test]
        fn raw_returns_file_content() {
            let (_temp, store) = store_with(&[("t.yaml", "prompt: |\n  hi\n")]);
            assert_eq!(store.raw("t").unwrap(), "prompt: |\n  hi\n");
        }
    }
}
