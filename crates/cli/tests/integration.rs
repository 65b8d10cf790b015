//! Integration tests for the s3kit CLI
//!
//! These tests require a running S3-compatible server.
//!
//! Run with:
//! ```bash
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey \
//!     -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! TEST_S3_ENDPOINT=http://localhost:9000 \
//! TEST_S3_ACCESS_KEY=accesskey \
//! TEST_S3_SECRET_KEY=secretkey \
//!     cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

use tempfile::TempDir;

fn s3kit_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_s3kit"))
}

/// Run s3kit with an isolated config directory
fn run(args: &[&str], config_dir: &Path) -> Output {
    Command::new(s3kit_binary())
        .args(args)
        .env("S3KIT_CONFIG_DIR", config_dir)
        .env_remove("S3KIT_PROFILE")
        .output()
        .expect("Failed to execute s3kit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_ok(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn get_test_config() -> Option<(String, String, String)> {
    let endpoint = std::env::var("TEST_S3_ENDPOINT").ok()?;
    let access_key = std::env::var("TEST_S3_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("TEST_S3_SECRET_KEY").ok()?;
    Some((endpoint, access_key, secret_key))
}

fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFF_FFFF)
}

/// Configure a default profile and wait for the server to answer
fn setup_profile() -> Option<TempDir> {
    let (endpoint, access_key, secret_key) = get_test_config()?;
    let config_dir = tempfile::tempdir().ok()?;

    let output = run(
        &[
            "profile",
            "set",
            "test",
            &endpoint,
            &access_key,
            &secret_key,
            "--addressing-style",
            "path",
            "--default",
        ],
        config_dir.path(),
    );
    if !output.status.success() {
        eprintln!("Failed to set profile: {}", String::from_utf8_lossy(&output.stderr));
        return None;
    }

    for _ in 0..30 {
        if run(&["ls", "--json"], config_dir.path()).status.success() {
            return Some(config_dir);
        }
        std::thread::sleep(Duration::from_secs(1));
    }
    eprintln!("S3 service did not become ready in time");
    None
}

/// Profile plus a fresh bucket
fn setup_bucket(name: &str) -> Option<(TempDir, String)> {
    let config_dir = setup_profile()?;
    let bucket = format!("test-{name}-{}", unique_suffix());
    let output = run(&["mb", &format!("s3://{bucket}")], config_dir.path());
    if !output.status.success() {
        eprintln!("Failed to create bucket: {}", String::from_utf8_lossy(&output.stderr));
        return None;
    }
    Some((config_dir, bucket))
}

fn cleanup_bucket(config_dir: &Path, bucket: &str) {
    let _ = run(&["rb", "--force", &format!("s3://{bucket}")], config_dir);
}

macro_rules! require {
    ($setup:expr) => {
        match $setup {
            Some(v) => v,
            None => {
                eprintln!("Skipping: S3 test config not available");
                return;
            }
        }
    };
}

mod bucket_operations {
    use super::*;

    #[test]
    fn test_create_list_and_delete_bucket() {
        let config_dir = require!(setup_profile());
        let bucket = format!("test-bucket-{}", unique_suffix());

        let output = run(&["mb", &format!("s3://{bucket}"), "--json"], config_dir.path());
        assert_ok(&output, "mb");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["bucket"], bucket.as_str());

        let output = run(&["mb", &format!("s3://{bucket}"), "-p"], config_dir.path());
        assert_ok(&output, "mb --ignore-existing");

        let output = run(&["ls", "--json"], config_dir.path());
        assert_ok(&output, "ls");
        assert!(stdout(&output).contains(&bucket), "bucket missing from listing");

        let output = run(&["stat", &format!("s3://{bucket}"), "--json"], config_dir.path());
        assert_ok(&output, "stat bucket");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["type"], "bucket");

        let output = run(&["rb", &format!("s3://{bucket}")], config_dir.path());
        assert_ok(&output, "rb");
    }

    #[test]
    fn test_bucket_not_found() {
        let config_dir = require!(setup_profile());
        let output = run(
            &["ls", &format!("s3://missing-{}", unique_suffix())],
            config_dir.path(),
        );
        assert_eq!(output.status.code(), Some(5), "expected NotFound exit code");
    }

    #[test]
    fn test_versioning_enable_and_suspend() {
        let (config_dir, bucket) = require!(setup_bucket("versioning"));
        let url = format!("s3://{bucket}");

        let output = run(&["version", "enable", &url, "--json"], config_dir.path());
        assert_ok(&output, "version enable");
        assert!(stdout(&output).contains("Enabled"));

        let output = run(&["version", "suspend", &url, "--json"], config_dir.path());
        assert_ok(&output, "version suspend");
        assert!(stdout(&output).contains("Suspended"));

        cleanup_bucket(config_dir.path(), &bucket);
    }
}

mod object_operations {
    use super::*;

    #[test]
    fn test_upload_cat_stat_and_download() {
        let (config_dir, bucket) = require!(setup_bucket("small"));
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("hello.txt");
        std::fs::write(&source, "Hello, S3 integration test!").unwrap();

        let target = format!("s3://{bucket}/docs/hello.txt");
        let output = run(&["cp", source.to_str().unwrap(), &target], config_dir.path());
        assert_ok(&output, "upload");

        let output = run(&["cat", &target], config_dir.path());
        assert_ok(&output, "cat");
        assert_eq!(stdout(&output), "Hello, S3 integration test!");

        let output = run(&["cat", &target, "--range", "0-4"], config_dir.path());
        assert_ok(&output, "cat range");
        assert_eq!(stdout(&output), "Hello");

        let output = run(&["stat", &target, "--json"], config_dir.path());
        assert_ok(&output, "stat");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["content_length"], 27);
        assert_eq!(json["content_type"], "text/plain");

        let download = work.path().join("out.txt");
        let output = run(&["cp", &target, download.to_str().unwrap()], config_dir.path());
        assert_ok(&output, "download");
        assert_eq!(
            std::fs::read_to_string(&download).unwrap(),
            "Hello, S3 integration test!"
        );

        cleanup_bucket(config_dir.path(), &bucket);
    }

    #[test]
    fn test_multipart_upload() {
        let (config_dir, bucket) = require!(setup_bucket("multipart"));
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("large.bin");
        let data: Vec<u8> = (0..(70 * 1024 * 1024)).map(|i| (i % 251) as u8).collect();
        std::fs::write(&source, &data).unwrap();

        let target = format!("s3://{bucket}/large.bin");
        let output = run(
            &["cp", source.to_str().unwrap(), &target, "--part-size", "5", "--json"],
            config_dir.path(),
        );
        assert_ok(&output, "multipart upload");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["size_bytes"], data.len() as u64);
        assert_eq!(json["parts"], 14);

        let download = work.path().join("large.out");
        let output = run(&["cp", &target, download.to_str().unwrap()], config_dir.path());
        assert_ok(&output, "download");
        assert_eq!(std::fs::read(&download).unwrap(), data);

        cleanup_bucket(config_dir.path(), &bucket);
    }

    #[test]
    fn test_recursive_copy_list_and_remove() {
        let (config_dir, bucket) = require!(setup_bucket("recursive"));
        let work = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(work.path().join("tree/nested")).unwrap();
        std::fs::write(work.path().join("tree/a.txt"), "a").unwrap();
        std::fs::write(work.path().join("tree/nested/b.txt"), "b").unwrap();

        let tree = work.path().join("tree");
        let output = run(
            &["cp", "-r", tree.to_str().unwrap(), &format!("s3://{bucket}/tree/")],
            config_dir.path(),
        );
        assert_ok(&output, "recursive upload");

        let output = run(&["ls", &format!("s3://{bucket}/tree/")], config_dir.path());
        assert_ok(&output, "ls");
        let listing = stdout(&output);
        assert!(listing.contains("tree/a.txt"));
        assert!(listing.contains("tree/nested/"));
        assert!(!listing.contains("tree/nested/b.txt"));

        let output = run(&["ls", "-r", &format!("s3://{bucket}/tree/")], config_dir.path());
        assert!(stdout(&output).contains("tree/nested/b.txt"));

        let output = run(
            &["cp", "-r", &format!("s3://{bucket}/tree/"), &format!("s3://{bucket}/copy/")],
            config_dir.path(),
        );
        assert_ok(&output, "server-side recursive copy");

        let output = run(&["rm", "-r", &format!("s3://{bucket}/tree"), "--json"], config_dir.path());
        assert_ok(&output, "recursive rm");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["deleted"], 2);

        let output = run(&["ls", "-r", &format!("s3://{bucket}"), "--json"], config_dir.path());
        let listing = stdout(&output);
        assert!(listing.contains("copy/nested/b.txt"));
        assert!(!listing.contains("\"tree/a.txt\""));

        cleanup_bucket(config_dir.path(), &bucket);
    }

    #[test]
    fn test_object_not_found() {
        let (config_dir, bucket) = require!(setup_bucket("notfound"));
        let output = run(&["cat", &format!("s3://{bucket}/missing.txt")], config_dir.path());
        assert_eq!(output.status.code(), Some(5), "expected NotFound exit code");
        cleanup_bucket(config_dir.path(), &bucket);
    }

    #[test]
    fn test_tags_round_trip() {
        let (config_dir, bucket) = require!(setup_bucket("tags"));
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("t.txt");
        std::fs::write(&source, "t").unwrap();
        let target = format!("s3://{bucket}/t.txt");
        assert_ok(&run(&["cp", source.to_str().unwrap(), &target], config_dir.path()), "upload");

        let output = run(&["tag", "set", &target, "env=test", "team=storage"], config_dir.path());
        assert_ok(&output, "tag set");

        let output = run(&["tag", "get", &target, "--json"], config_dir.path());
        assert_ok(&output, "tag get");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["tags"].as_array().map(Vec::len), Some(2));

        let output = run(&["tag", "clear", &target], config_dir.path());
        assert_ok(&output, "tag clear");

        cleanup_bucket(config_dir.path(), &bucket);
    }

    #[test]
    fn test_presigned_get() {
        let (config_dir, bucket) = require!(setup_bucket("presign"));
        let output = run(
            &["presign", &format!("s3://{bucket}/file.txt"), "--expires", "10m", "--json"],
            config_dir.path(),
        );
        assert_ok(&output, "presign");
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        let url = json["url"].as_str().unwrap();
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=600"));
        assert_eq!(json["method"], "GET");

        cleanup_bucket(config_dir.path(), &bucket);
    }
}

mod profile_operations {
    use super::*;

    #[test]
    fn test_profile_set_list_remove() {
        let config_dir = tempfile::tempdir().unwrap();

        let output = run(
            &["profile", "set", "local", "http://localhost:9000", "ak", "sk"],
            config_dir.path(),
        );
        assert_ok(&output, "profile set");

        let output = run(&["profile", "list", "--json"], config_dir.path());
        assert_ok(&output, "profile list");
        let listing = stdout(&output);
        assert!(listing.contains("\"local\""));
        assert!(!listing.contains("sk\""), "secret leaked into listing");

        let output = run(&["profile", "remove", "local"], config_dir.path());
        assert_ok(&output, "profile remove");

        let output = run(&["profile", "remove", "local"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }
}
