//! Integration tests for s3-resolver

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary isolated from the caller's config file and environment
    fn resolver(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("s3-resolver");
        cmd.env_remove("SOURCE_ROOT")
            .env_remove("CACHE_ROOT")
            .env_remove("RUST_LOG")
            .env("CI", "1")
            .env(
                "S3_RESOLVER_CONFIG",
                config_dir.path().join("config.toml"),
            );
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("read-through image cache"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("s3-resolver"));
    }

    #[test]
    fn locate_maps_key_and_cache_path() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        resolver(&temp)
            .args(["locate", "dog.jpg", "--format", "json"])
            .args(["--source-root", "s3://bucket1/images/"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""key": "images/dog.jpg""#))
            .stdout(predicate::str::contains(r#""bucket": "bucket1""#))
            .stdout(predicate::str::contains(r#""cached": false"#));
    }

    #[test]
    fn locate_decodes_escaped_identifier() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        resolver(&temp)
            .args(["locate", "a%2Fb%20c.png", "--format", "json"])
            .arg("--cache-root")
            .arg(&cache)
            .env("SOURCE_ROOT", "s3://bucket1/images/")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""key": "images/a/b c.png""#));
    }

    #[test]
    fn locate_reports_cached_file() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("dog.jpg"), b"jpeg").unwrap();

        resolver(&temp)
            .args(["locate", "dog.jpg", "--format", "json"])
            .args(["--source-root", "s3://bucket1/"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""cached": true"#));
    }

    #[test]
    fn locate_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["locate", "..%2Fetc%2Fpasswd"])
            .args(["--source-root", "s3://bucket1/"])
            .arg("--cache-root")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid identifier"));
    }

    #[test]
    fn resolve_requires_source_root() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["resolve", "dog.jpg"])
            .arg("--cache-root")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing setting for source_root"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn resolve_rejects_non_s3_scheme() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["resolve", "dog.jpg"])
            .args(["--source-root", "http://bucket1/images/"])
            .arg("--cache-root")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("is not an s3:// url"));
    }

    #[test]
    fn resolve_rejects_relative_cache_root() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["resolve", "dog.jpg"])
            .args(["--source-root", "s3://bucket1/"])
            .args(["--cache-root", "relative/cache"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("must be an absolute path"));
    }

    #[test]
    fn resolve_serves_cached_file_without_network() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("dog.jpg"), b"jpeg").unwrap();

        resolver(&temp)
            .args(["resolve", "dog.jpg", "--format", "plain"])
            .args(["--source-root", "s3://bucket1/images/"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains("dog.jpg"));
    }

    #[test]
    fn cache_info_counts_files() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(cache.join("nested")).unwrap();
        std::fs::write(cache.join("dog.jpg"), b"12345").unwrap();
        std::fs::write(cache.join("nested").join("cat.png"), b"123").unwrap();

        resolver(&temp)
            .args(["cache", "info", "--format", "json"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""files": 2"#))
            .stdout(predicate::str::contains(r#""bytes": 8"#));
    }

    #[test]
    fn cache_purge_removes_file() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("dog.jpg"), b"jpeg").unwrap();

        resolver(&temp)
            .args(["cache", "purge", "dog.jpg"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success();

        assert!(!cache.join("dog.jpg").exists());
    }

    #[test]
    fn cache_clear_with_yes() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(cache.join("nested")).unwrap();
        std::fs::write(cache.join("nested").join("cat.png"), b"123").unwrap();

        resolver(&temp)
            .args(["cache", "clear", "--yes"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success();

        assert!(cache.exists());
        assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[test]
    fn cache_clear_without_yes_keeps_files() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("dog.jpg"), b"jpeg").unwrap();

        resolver(&temp)
            .args(["cache", "clear"])
            .arg("--cache-root")
            .arg(&cache)
            .assert()
            .success();

        assert!(cache.join("dog.jpg").exists());
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["config", "set", "resolver.source_root", "s3://bucket1/images/"])
            .assert()
            .success();

        resolver(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[resolver]"))
            .stdout(predicate::str::contains(r#"source_root = "s3://bucket1/images/""#));
    }

    #[test]
    fn config_set_does_not_persist_env_overrides() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .env("CACHE_ROOT", "/from/env")
            .args(["config", "set", "resolver.timeout_secs", "5"])
            .assert()
            .success();

        let written = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(written.contains("timeout_secs = 5"));
        assert!(!written.contains("/from/env"));
    }

    #[test]
    fn config_set_unknown_key() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn status_reports_missing_settings() {
        let temp = TempDir::new().unwrap();
        resolver(&temp)
            .arg("status")
            .assert()
            .failure()
            .stdout(predicate::str::contains("Configuration:"));
    }
}

mod resolver_tests {
    use s3_resolver::remote::MemoryStore;
    use s3_resolver::{ErrorKind, ResolverError, Resolver, ResolverSettings};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup(store: &Arc<MemoryStore>) -> (TempDir, Resolver) {
        let temp = TempDir::new().unwrap();
        let settings =
            ResolverSettings::new("store://bucket1/images/", temp.path().join("cache")).unwrap();
        let resolver = Resolver::new(settings, store.clone()).unwrap();
        (temp, resolver)
    }

    #[tokio::test]
    async fn first_access_downloads_then_serves_from_cache() {
        let store = Arc::new(MemoryStore::new("store"));
        store.insert("bucket1", "images/dog.jpg", vec![7u8; 10_000]);
        let (temp, resolver) = setup(&store);

        let image = resolver.resolve("dog.jpg", "https://iiif.example.org/dog.jpg/").await.unwrap();
        assert_eq!(image.src_path, temp.path().join("cache").join("dog.jpg"));
        assert_eq!(image.extra.size, 10_000);
        assert_eq!(image.base_uri, "https://iiif.example.org/dog.jpg");
        assert_eq!(std::fs::read(&image.src_path).unwrap(), vec![7u8; 10_000]);

        let heads = store.head_calls();
        let downloads = store.download_calls();
        let again = resolver.resolve("dog.jpg", "").await.unwrap();
        assert_eq!(again.src_path, image.src_path);
        assert_eq!(store.head_calls(), heads);
        assert_eq!(store.download_calls(), downloads);
    }

    #[tokio::test]
    async fn nested_identifier_mirrors_key_layout() {
        let store = Arc::new(MemoryStore::new("store"));
        store.insert("bucket1", "images/a/b c.png", b"png".to_vec());
        let (temp, resolver) = setup(&store);

        let image = resolver.resolve("a%2Fb%20c.png", "").await.unwrap();
        assert_eq!(
            image.src_path,
            temp.path().join("cache").join("a").join("b c.png")
        );
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = Arc::new(MemoryStore::new("store"));
        let (temp, resolver) = setup(&store);

        let err = resolver.resolve("missing.jpg", "").await.unwrap_err();
        match err {
            ResolverError::NotFound { ref key, ref bucket } => {
                assert_eq!(key, "images/missing.jpg");
                assert_eq!(bucket, "bucket1");
            }
            ref other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(err.status_code(), 404);
        assert!(!temp.path().join("cache").join("missing.jpg").exists());
    }

    #[tokio::test]
    async fn remote_failure_is_distinct_from_not_found() {
        let store = Arc::new(MemoryStore::new("store"));
        store.fail_head("connection reset");
        let (_temp, resolver) = setup(&store);

        let err = resolver.resolve("dog.jpg", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.status_code(), 500);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn interrupted_download_leaves_cache_empty() {
        let store = Arc::new(MemoryStore::new("store"));
        store.insert("bucket1", "images/dog.jpg", vec![1u8; 20_000]);
        store.fail_download_after(8192);
        let (temp, resolver) = setup(&store);

        assert!(resolver.resolve("dog.jpg", "").await.is_err());

        let cache = temp.path().join("cache");
        let leftovers = std::fs::read_dir(&cache)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
        assert!(!resolver.in_cache("dog.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn store_scheme_must_match_source_root() {
        let temp = TempDir::new().unwrap();
        let settings = ResolverSettings::new("s3://bucket1/", temp.path()).unwrap();
        let store = Arc::new(MemoryStore::new("store"));

        let err = Resolver::new(settings, store).err().unwrap();
        assert!(matches!(err, ResolverError::SourceRootScheme { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
