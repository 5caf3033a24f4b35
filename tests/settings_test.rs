//! Tests for loading [`CacheSettings`] from files.

use std::io::Write;
use std::time::Duration;

use repocache::{CacheError, CacheProfile, CacheSettings, Policy};

fn write_settings(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_explicit_file() {
    let file = write_settings(
        r#"
        [repository_cache]
        ttl = 5
        enabled = true
        use_tags = false
    "#,
    );

    let settings = CacheSettings::load(Some(file.path())).unwrap();
    assert_eq!(settings.ttl, 5);
    assert!(settings.enabled);
    assert!(!settings.use_tags);
    assert!(!settings.debug);
}

#[test]
fn load_rejects_malformed_file() {
    let file = write_settings("ttl = [");
    let err = CacheSettings::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, CacheError::Configuration(_)));
}

#[test]
fn load_missing_explicit_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(CacheSettings::load(Some(&path)).is_err());
}

#[test]
fn unknown_keys_are_ignored() {
    let settings = CacheSettings::from_toml_str(
        r#"
        ttl = 2
        driver = "redis"
    "#,
    )
    .unwrap();
    assert_eq!(settings.ttl, 2);
}

#[test]
fn loaded_settings_drive_the_policy() {
    let file = write_settings(
        r#"
        ttl = 1
        debug = true
        use_tags = false
        cache_empty = false
    "#,
    );
    let settings = CacheSettings::load(Some(file.path())).unwrap();
    let profile = CacheProfile::new("users")
        .clear_tags_on(["insert"])
        .tags(["users"]);

    let policy = Policy::load(&settings, &profile);
    assert_eq!(policy.ttl(), Duration::from_secs(60));
    assert!(policy.debug_logging());
    assert!(policy.tags().is_empty());
    assert!(!policy.clears_tags("insert"));
    assert!(!policy.cache_empty_results());
}
