//! Property-based tests for paths, pins and configuration.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;
use std::sync::Arc;

use protomod::config::{write_config, ConfigVersion, Provider, WriteConfigOptions};
use protomod::core::context::Context;
use protomod::core::paths::{normalize_and_validate, validate_module_file_path};
use protomod::core::types::{ModuleIdentity, ModulePin, ModuleReference, TypeError};
use protomod::module::{Module, ModuleError, ModuleOptions};
use protomod::storage::{MemBucket, ReadBucket};

/// Strategy for one identity component.
fn component() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,7}"
}

/// Strategy for valid module identities.
fn identity() -> impl Strategy<Value = ModuleIdentity> {
    (component(), component(), component())
        .prop_map(|(r, o, n)| ModuleIdentity::new(format!("{r}.com"), o, n).unwrap())
}

/// Strategy for hex commits.
fn commit() -> impl Strategy<Value = String> {
    "[0-9a-f]{12}"
}

/// Strategy for relative path segments that are not `.` or `..`.
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,7}".prop_filter("no dot segments", |s| s != "." && s != "..")
}

/// Strategy for plain file stems with no extension of their own.
fn stem() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

fn source_bucket() -> Arc<dyn ReadBucket> {
    Arc::new(MemBucket::from_files([("a.proto", "syntax = \"proto3\";")]).unwrap())
}

proptest! {
    /// Pins always come out sorted and unique, whatever order they go in.
    #[test]
    fn pins_sorted_after_construction(
        pins in prop::collection::btree_map(identity(), commit(), 0..8),
        seed in any::<u64>(),
    ) {
        let mut input: Vec<ModulePin> = pins
            .iter()
            .map(|(id, commit)| ModulePin::new(id.clone(), "main", commit.clone()).unwrap())
            .collect();
        // Deterministic shuffle.
        let len = input.len().max(1);
        input.rotate_left((seed as usize) % len);
        input.reverse();

        let ctx = Context::background();
        let module = Module::from_bucket_with_pins(&ctx, source_bucket(), input, ModuleOptions::new()).unwrap();
        let out: Vec<&ModuleIdentity> = module.dependency_module_pins().iter().map(ModulePin::identity).collect();
        let expected: Vec<&ModuleIdentity> = pins.keys().collect();
        prop_assert_eq!(out, expected);
    }

    /// Two pins with the same identity are always rejected.
    #[test]
    fn duplicate_identity_rejected(id in identity(), a in commit(), b in commit()) {
        let pins = vec![
            ModulePin::new(id.clone(), "main", a).unwrap(),
            ModulePin::new(id.clone(), "main", b).unwrap(),
        ];
        let err = Module::from_bucket_with_pins(
            &Context::background(),
            source_bucket(),
            pins,
            ModuleOptions::new(),
        )
        .unwrap_err();
        let is_duplicate = matches!(
            err,
            ModuleError::Type(TypeError::DuplicateDependency { ref identity }) if *identity == id.to_string()
        );
        prop_assert!(is_duplicate);
    }

    /// Any path with a `..` component is invalid.
    #[test]
    fn parent_traversal_rejected(
        before in prop::collection::vec(segment(), 0..3),
        after in prop::collection::vec(segment(), 0..3),
    ) {
        let mut parts = before;
        parts.push("..".to_string());
        parts.extend(after);
        let path = parts.join("/");
        prop_assert!(normalize_and_validate(&path).is_err());
    }

    /// Any absolute path is invalid.
    #[test]
    fn absolute_rejected(parts in prop::collection::vec(segment(), 1..4)) {
        let path = format!("/{}.proto", parts.join("/"));
        prop_assert!(normalize_and_validate(&path).is_err());
        prop_assert!(validate_module_file_path(&path).is_err());
    }

    /// Normalization is idempotent.
    #[test]
    fn normalize_idempotent(parts in prop::collection::vec(segment(), 1..4)) {
        let path = parts.join("//./");
        let once = normalize_and_validate(&path).unwrap();
        prop_assert_eq!(normalize_and_validate(&once).unwrap(), once);
    }

    /// Only files with the source extension are ever enumerated.
    #[test]
    fn non_source_files_invisible(
        names in prop::collection::btree_set(stem(), 1..6),
        ext in prop::sample::select(vec![".proto", ".txt", ".md", ".proto.bak", ""]),
    ) {
        let files: Vec<(String, &str)> = names.iter().map(|n| (format!("{n}{ext}"), "x")).collect();
        let bucket = MemBucket::from_files(files.iter().map(|(p, c)| (p.as_str(), *c))).unwrap();
        let ctx = Context::background();
        let module = Module::from_bucket(&ctx, Arc::new(bucket), ModuleOptions::new()).unwrap();
        for info in module.source_file_infos(&ctx).unwrap() {
            prop_assert!(info.path().ends_with(".proto"));
        }
        if ext != ".proto" {
            prop_assert!(module.source_file_infos(&ctx).unwrap().is_empty());
        }
    }

    /// Written configs read back with the same identity and dependencies.
    #[test]
    fn write_read_round_trip(
        name in identity(),
        deps in prop::collection::btree_set(identity(), 0..4),
        version in prop::sample::select(ConfigVersion::ALL.to_vec()),
        documented in any::<bool>(),
    ) {
        let deps: Vec<ModuleReference> = deps
            .into_iter()
            .filter(|d| *d != name)
            .map(|d| ModuleReference::new(d, "main").unwrap())
            .collect();
        let mut options = WriteConfigOptions::new()
            .with_version(version)
            .with_module_identity(name.clone())
            .with_dependency_module_references(deps.clone());
        if documented {
            options = options.with_documentation_comments();
        }

        let ctx = Context::background();
        let bucket = MemBucket::new();
        write_config(&ctx, &bucket, options).unwrap();
        let config = Provider::new().get_config(&ctx, &bucket).unwrap();
        prop_assert_eq!(config.version, version);
        prop_assert_eq!(config.module_identity, Some(name));
        prop_assert_eq!(config.dependency_module_references, deps);
    }
}
