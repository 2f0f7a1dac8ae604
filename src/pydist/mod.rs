//! Override database: curated distribution name to Debian dependency mapping
//!
//! Records are read from three sources, in precedence order:
//! 1. the package's own override file (`debian/py3dist-overrides`)
//! 2. every file in the system directory, in file name order
//! 3. the fallback file generated with the interpreter packages
//!
//! A single broken line in any source aborts the whole load.

mod line;

pub use line::{parse_line, Line};

use crate::domain::VersionRange;
use crate::error::OverrideError;
use crate::memo::Memoized;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One override entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRecord {
    /// Name normalized with [`crate::domain::safe_name`]
    pub name: String,
    /// Interpreter versions this record applies to
    pub range: VersionRange,
    /// Debian dependency template; empty means "ignore this requirement"
    pub dependency: String,
    /// Translation rules for upstream version constraints
    pub rules: Vec<Rule>,
    /// Apply PEP 386 pre-release normalization after the rules
    pub pep386: bool,
}

impl OverrideRecord {
    /// The requirement is to be dropped
    pub fn is_ignore(&self) -> bool {
        self.dependency.is_empty()
    }

    /// The template already carries its own version constraint
    pub fn is_hardcoded(&self) -> bool {
        self.dependency.ends_with(')')
    }

    /// Upstream versions should be translated for this record
    pub fn wants_translation(&self) -> bool {
        self.pep386 || !self.rules.is_empty()
    }
}

/// Locations of the three override sources
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideSources {
    pub user_file: Option<PathBuf>,
    pub system_dir: Option<PathBuf>,
    pub fallback_file: Option<PathBuf>,
}

impl OverrideSources {
    /// Files to read, highest precedence first; missing sources are skipped
    pub fn files(&self) -> Result<Vec<PathBuf>, OverrideError> {
        let mut files = Vec::new();
        if let Some(user) = self.user_file.as_ref().filter(|p| p.is_file()) {
            files.push(user.clone());
        }
        if let Some(dir) = self.system_dir.as_ref().filter(|p| p.is_dir()) {
            let entries = fs::read_dir(dir).map_err(|e| OverrideError::unreadable(dir, e))?;
            let mut listed = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| OverrideError::unreadable(dir, e))?;
                listed.push(entry.path());
            }
            listed.sort();
            files.extend(listed.into_iter().filter(|p| p.is_file()));
        }
        if let Some(fallback) = self.fallback_file.as_ref().filter(|p| p.is_file()) {
            files.push(fallback.clone());
        }
        Ok(files)
    }
}

impl Default for OverrideSources {
    fn default() -> Self {
        Self {
            user_file: Some(PathBuf::from("debian/py3dist-overrides")),
            system_dir: Some(PathBuf::from("/usr/share/python3/dist/")),
            fallback_file: Some(PathBuf::from("/usr/share/python3/dist_fallback")),
        }
    }
}

/// Override records indexed by normalized name, in source precedence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideDatabase {
    records: HashMap<String, Vec<OverrideRecord>>,
}

impl OverrideDatabase {
    /// Reads every available source
    pub fn load(sources: &OverrideSources) -> Result<Self, OverrideError> {
        let mut db = Self::default();
        for path in sources.files()? {
            tracing::debug!("loading overrides from {}", path.display());
            let content =
                fs::read_to_string(&path).map_err(|e| OverrideError::unreadable(&path, e))?;
            db.extend_from_str(&path, &content)?;
        }
        Ok(db)
    }

    /// Builds a database from in-memory sources, highest precedence first
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, OverrideError> {
        let mut db = Self::default();
        for (label, content) in sources {
            db.extend_from_str(Path::new(label), content)?;
        }
        Ok(db)
    }

    fn extend_from_str(&mut self, path: &Path, content: &str) -> Result<(), OverrideError> {
        for (index, text) in content.lines().enumerate() {
            match parse_line(text) {
                Ok(Line::Record(record)) => self
                    .records
                    .entry(record.name.clone())
                    .or_default()
                    .push(record),
                Ok(Line::Blank | Line::Comment) => {}
                Err(message) => {
                    tracing::error!("{} file has a broken line: {}", path.display(), text);
                    return Err(OverrideError::broken_line(path, index + 1, text, message));
                }
            }
        }
        Ok(())
    }

    /// Records for a normalized name, highest precedence first
    pub fn lookup(&self, name: &str) -> &[OverrideRecord] {
        self.records.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Checks an override file against the line grammar without aborting
///
/// Returns the first broken line as an error; the caller decides whether
/// that is fatal.
pub fn validate(path: &Path) -> Result<(), OverrideError> {
    let content = fs::read_to_string(path).map_err(|e| OverrideError::unreadable(path, e))?;
    for (index, text) in content.lines().enumerate() {
        if let Err(message) = parse_line(text) {
            let file = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            tracing::error!("invalid pydist data in file {}: {}", file, text);
            return Err(OverrideError::broken_line(path, index + 1, text, message));
        }
    }
    Ok(())
}

type LoadFn = fn(&OverrideSources) -> Result<OverrideDatabase, OverrideError>;

/// Loads each distinct set of sources once and shares the result
pub struct OverrideLoader {
    memo: Memoized<OverrideSources, OverrideDatabase, OverrideError, LoadFn>,
}

impl OverrideLoader {
    pub fn new() -> Self {
        Self {
            memo: Memoized::new(OverrideDatabase::load as LoadFn),
        }
    }

    pub fn load(&self, sources: &OverrideSources) -> Result<Arc<OverrideDatabase>, OverrideError> {
        self.memo.call(sources)
    }

    /// Number of distinct source sets loaded so far
    pub fn loaded(&self) -> usize {
        self.memo.len()
    }
}

impl Default for OverrideLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;
    use std::fs;

    fn sources(dir: &Path) -> OverrideSources {
        OverrideSources {
            user_file: Some(dir.join("py3dist-overrides")),
            system_dir: Some(dir.join("dist")),
            fallback_file: Some(dir.join("dist_fallback")),
        }
    }

    #[test]
    fn test_load_precedence_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("dist")).unwrap();
        fs::write(root.join("py3dist-overrides"), "Foo python3-foo-user\n").unwrap();
        fs::write(root.join("dist/b"), "foo python3-foo-b\n").unwrap();
        fs::write(root.join("dist/a"), "# comment\n\nfoo python3-foo-a\n").unwrap();
        fs::write(root.join("dist_fallback"), "foo python3-foo-fallback\n").unwrap();

        let db = OverrideDatabase::load(&sources(root)).unwrap();
        let deps: Vec<&str> = db.lookup("foo").iter().map(|r| r.dependency.as_str()).collect();
        assert_eq!(
            deps,
            vec![
                "python3-foo-user",
                "python3-foo-a",
                "python3-foo-b",
                "python3-foo-fallback"
            ]
        );
    }

    #[test]
    fn test_load_missing_sources_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = OverrideDatabase::load(&sources(temp_dir.path())).unwrap();
        assert!(db.is_empty());
        assert!(db.lookup("foo").is_empty());
    }

    #[test]
    fn test_load_broken_line_names_file_and_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("dist_fallback"), "foo python3-foo\nbar 3.x python3-bar\n").unwrap();

        let err = OverrideDatabase::load(&sources(root)).unwrap_err();
        match err {
            OverrideError::BrokenLine { path, line, .. } => {
                assert!(path.ends_with("dist_fallback"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_uses_normalized_names() {
        let content = "Zope.Interface python3-zope.interface";
        let db = OverrideDatabase::from_sources([("inline", content)]).unwrap();
        assert_eq!(db.lookup("zope.interface").len(), 1);
        assert!(db.lookup("Zope.Interface").is_empty());
    }

    #[test]
    fn test_record_predicates() {
        let db = OverrideDatabase::from_sources([(
            "inline",
            "a\nb python3-b (>= 1.0)\nc python3-c; s/^/1:/\nd 3.2 python3-d",
        )])
        .unwrap();
        assert!(db.lookup("a")[0].is_ignore());
        assert!(db.lookup("b")[0].is_hardcoded());
        assert!(db.lookup("c")[0].wants_translation());
        assert!(!db.lookup("d")[0].wants_translation());
        assert!(db.lookup("d")[0].range.contains(Version::new(3, 2)));
    }

    #[test]
    fn test_validate_reports_without_panicking() {
        let temp_dir = tempfile::tempdir().unwrap();
        let good = temp_dir.path().join("good");
        let bad = temp_dir.path().join("bad");
        fs::write(&good, "foo python3-foo\n").unwrap();
        fs::write(&bad, "foo python3-foo\n!!! broken\n").unwrap();

        assert!(validate(&good).is_ok());
        assert!(matches!(
            validate(&bad),
            Err(OverrideError::BrokenLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_loader_memoizes_by_sources() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("dist_fallback"), "foo python3-foo\n").unwrap();

        let loader = OverrideLoader::new();
        let first = loader.load(&sources(root)).unwrap();
        // later edits are not seen: the first load is kept for the process
        fs::write(root.join("dist_fallback"), "foo python3-changed\n").unwrap();
        let second = loader.load(&sources(root)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lookup("foo")[0].dependency, "python3-foo");
        assert_eq!(loader.loaded(), 1);
    }
}
