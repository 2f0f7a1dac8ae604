//! Integration tests for pydist
//!
//! These tests verify:
//! - Override loading across user, system and fallback sources
//! - The resolver decision chain end to end
//! - Dependency aggregation from scanner findings

use pydist::config::Ecosystem;
use pydist::depends::Aggregator;
use pydist::domain::{
    Category, DependencyOptions, MemorySink, PrivateDirStats, Shebang, Stats, SupportedVersions,
    Version,
};
use pydist::pydist::{OverrideDatabase, OverrideLoader, OverrideSources};
use pydist::resolver::{Resolver, StaticFileIndex};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn sources(root: &Path) -> OverrideSources {
    OverrideSources {
        user_file: Some(root.join("debian/py3dist-overrides")),
        system_dir: Some(root.join("usr/share/python3/dist")),
        fallback_file: Some(root.join("usr/share/python3/dist_fallback")),
    }
}

/// Lays out the three override sources under `root`
fn write_sources(root: &Path, user: &str, system: &[(&str, &str)], fallback: &str) {
    fs::create_dir_all(root.join("debian")).unwrap();
    fs::create_dir_all(root.join("usr/share/python3/dist")).unwrap();
    fs::write(root.join("debian/py3dist-overrides"), user).unwrap();
    for (name, content) in system {
        fs::write(root.join("usr/share/python3/dist").join(name), content).unwrap();
    }
    fs::write(root.join("usr/share/python3/dist_fallback"), fallback).unwrap();
}

mod override_loading {
    use super::*;

    #[test]
    fn test_user_file_wins_over_fallback() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write_sources(
            root,
            "Foo python3-foo-local\n",
            &[("python3-foo", "foo python3-foo-system\n")],
            "foo python3-foo\nbar python3-bar\n",
        );

        let db = OverrideDatabase::load(&sources(root)).unwrap();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        assert_eq!(resolver.resolve("foo", None).unwrap().as_deref(), Some("python3-foo-local"));
        assert_eq!(resolver.resolve("bar", None).unwrap().as_deref(), Some("python3-bar"));
    }

    #[test]
    fn test_system_dir_is_read_in_name_order() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write_sources(
            root,
            "",
            &[("b-second", "foo python3-foo-b\n"), ("a-first", "foo python3-foo-a\n")],
            "",
        );

        let db = OverrideDatabase::load(&sources(root)).unwrap();
        assert_eq!(db.lookup("foo")[0].dependency, "python3-foo-a");
    }

    #[test]
    fn test_broken_system_file_aborts_load() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write_sources(root, "foo python3-foo\n", &[("broken", "foo python3-foo; s/[/x/\n")], "");

        let err = OverrideDatabase::load(&sources(root)).unwrap_err();
        assert!(err.to_string().contains("broken:1"));
    }

    #[test]
    fn test_loader_shares_database_between_calls() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        write_sources(root, "foo python3-foo\n", &[], "");

        let loader = OverrideLoader::new();
        let first = loader.load(&sources(root)).unwrap();
        let second = loader.load(&sources(root)).unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));

        let other = OverrideSources {
            user_file: None,
            ..sources(root)
        };
        assert!(loader.load(&other).unwrap().lookup("foo").is_empty());
        assert_eq!(loader.loaded(), 2);
    }
}

mod resolver_chain {
    use super::*;

    fn database() -> OverrideDatabase {
        OverrideDatabase::from_sources([
            (
                "debian/py3dist-overrides",
                "foo python3-foo (>= 1.0)\n\
                 bar python3-bar; s/^/1:/\n\
                 baz python3-baz; PEP386 s/\\.post/+post/\n\
                 argparse\n\
                 legacy -3.2 python3-legacy-old\n\
                 legacy python3-legacy\n",
            ),
            ("dist_fallback", "bar python3-bar-fallback\n"),
        ])
        .unwrap()
    }

    #[test]
    fn test_documented_examples() {
        let db = database();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        assert_eq!(
            resolver.resolve("foo>=2.0", None).unwrap().as_deref(),
            Some("python3-foo (>= 1.0)")
        );
        assert_eq!(
            resolver.resolve("bar>=2.3", None).unwrap().as_deref(),
            Some("python3-bar (>= 1:2.3)")
        );
        assert_eq!(resolver.resolve("My_Foo", None).unwrap().as_deref(), Some("python3-my-foo"));
        assert_eq!(resolver.resolve("argparse>=1.1", None).unwrap(), None);
    }

    #[test]
    fn test_rules_then_pre_release_normalization() {
        let db = database();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        assert_eq!(
            resolver.resolve("baz>1.0rc1.post2", None).unwrap().as_deref(),
            Some("python3-baz (>> 1.0~rc1+post2)")
        );
    }

    #[test]
    fn test_extras_and_markers_are_ignored() {
        let db = database();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        assert_eq!(
            resolver
                .resolve("bar[tests] >= 2.3, < 3; python_version >= '3'", None)
                .unwrap()
                .as_deref(),
            Some("python3-bar (>= 1:2.3)")
        );
    }

    #[test]
    fn test_target_version_selects_record() {
        let db = database();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        assert_eq!(
            resolver.resolve("legacy", Some(Version::new(3, 1))).unwrap().as_deref(),
            Some("python3-legacy-old")
        );
        assert_eq!(
            resolver.resolve("legacy", Some(Version::new(3, 2))).unwrap().as_deref(),
            Some("python3-legacy")
        );
    }

    #[test]
    fn test_file_index_owner_before_synthesis() {
        let db = database();
        let index = StaticFileIndex::parse(
            "python3-pkg-resources: /usr/lib/python3/dist-packages/Setuptools-0.6.egg-info\n\
             python2-setuptools: /usr/lib/python2.7/dist-packages/setuptools-0.6.egg-info\n",
        );
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        assert_eq!(
            resolver.resolve("setuptools", None).unwrap().as_deref(),
            Some("python3-pkg-resources")
        );
    }

    #[test]
    fn test_invalid_requirement_is_an_error() {
        let db = database();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let resolver = Resolver::new(&db, &index, &ecosystem);

        let err = resolver.resolve("==1.0", None).unwrap_err();
        assert!(err.to_string().contains("requirement is not valid"));
    }
}

mod aggregation {
    use super::*;

    fn supported() -> SupportedVersions {
        SupportedVersions::new([Version::new(3, 1), Version::new(3, 2)], Version::new(3, 1))
            .unwrap()
    }

    #[test]
    fn test_full_package() {
        let temp_dir = create_test_dir();
        let egg = temp_dir
            .path()
            .join("debian/python3-foo/usr/lib/python3/dist-packages/foo.egg-info");
        fs::create_dir_all(&egg).unwrap();
        fs::write(egg.join("requires.txt"), "bar>=2.3\nsix\n[docs]\nsphinx\n").unwrap();

        let db =
            OverrideDatabase::from_sources([("overrides", "bar python3-bar; s/^/1:/\n")]).unwrap();
        let index = StaticFileIndex::new()
            .with_file("python3-six", "/usr/lib/python3/dist-packages/six-1.16.0.egg-info");
        let ecosystem = Ecosystem::default();
        let supported = supported();
        let resolver = Resolver::new(&db, &index, &ecosystem);
        let aggregator = Aggregator::new(&resolver, &ecosystem, &supported);

        let mut stats = Stats {
            compile: true,
            ext: [Version::new(3, 1), Version::new(3, 2)].into_iter().collect(),
            shebangs: vec![Shebang::new("python3", None)],
            requires: vec![egg.join("requires.txt")],
            ..Stats::default()
        };
        stats.private_dirs.insert(
            "/usr/share/foo".to_string(),
            PrivateDirStats {
                compile: true,
                ext: Default::default(),
                shebangs: vec![Shebang::new("python3.2", Some(Version::new(3, 2)))],
            },
        );
        let options = DependencyOptions {
            vrange: Some("3.1-".parse().unwrap()),
            suggests: vec!["python-ldap".to_string()],
            regexpr: vec!["/tests/".to_string()],
            ..DependencyOptions::default()
        };

        let set = aggregator.aggregate("python3-foo", &stats, &options).unwrap();
        let mut sink = MemorySink::new();
        set.emit(&mut sink);

        assert_eq!(
            sink.values("python3-foo", Category::Depends),
            vec![
                "python3 (>= 3.1)",
                "python3 (<< 3.3)",
                "python3 (>= 3.2.3-3~)",
                "python3",
                "python3.2",
                "python3-bar (>= 1:2.3)",
                "python3-six",
            ]
        );
        assert_eq!(sink.values("python3-foo", Category::Suggests), vec!["python3-ldap"]);
        assert_eq!(sink.rtupdates.len(), 1);
        assert_eq!(sink.rtupdates[0].1.location, "/usr/share/foo");
        assert_eq!(sink.rtupdates[0].1.args, "-V 3.1- -X '/tests/'");
    }

    #[test]
    fn test_debug_package_templates() {
        let db = OverrideDatabase::default();
        let index = StaticFileIndex::new();
        let ecosystem = Ecosystem::default();
        let supported = supported();
        let resolver = Resolver::new(&db, &index, &ecosystem);
        let aggregator = Aggregator::new(&resolver, &ecosystem, &supported);

        let stats = Stats {
            ext: [Version::new(3, 1)].into_iter().collect(),
            ..Stats::default()
        };
        let set = aggregator
            .aggregate("python3-foo-dbg", &stats, &DependencyOptions::default())
            .unwrap();
        assert_eq!(set.depends, vec!["python3-dbg (>= 3.1)", "python3-dbg (<< 3.2)"]);
    }

    #[test]
    fn test_stats_json_schema() {
        let stats: Stats = serde_json::from_str(
            r#"{
                "compile": true,
                "ext": ["3.2"],
                "shebangs": [{"interpreter": "python3", "version": null}],
                "private_dirs": {
                    "/usr/share/foo": {"shebangs": [{"interpreter": "python3.2", "version": "3.2"}]}
                },
                "requires": ["debian/tmp/requires.txt"]
            }"#,
        )
        .unwrap();
        assert!(stats.compile);
        assert!(stats.ext.contains(&Version::new(3, 2)));
        assert_eq!(
            stats.private_dirs["/usr/share/foo"].shebangs[0].version,
            Some(Version::new(3, 2))
        );
        assert!(!stats.private_dirs["/usr/share/foo"].compile);
    }
}
