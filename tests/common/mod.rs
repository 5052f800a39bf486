#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;

/// A complete configuration with two repositories.
pub const CONFIG: &str = r#"{
    "servers": {
        "staging": {
            "web01": { "REMOTE_HOST": "10.0.0.1", "REMOTE_USER": "deploy", "SSH_KEY": "stg-key" }
        },
        "production": {
            "web02": { "REMOTE_HOST": "10.1.0.1", "REMOTE_USER": "deploy", "SSH_KEY": "prd-key" }
        }
    },
    "configs": {
        "global": {
            "all": { "secrets": { "SENTRY_DSN": "https://sentry" }, "vars": { "REGION": "eu-west-1" } },
            "staging": { "secrets": {}, "vars": { "LOG_LEVEL": "debug" } },
            "production": { "secrets": { "PAGER_KEY": "pk" }, "vars": { "LOG_LEVEL": "warn" } }
        }
    },
    "repositories": {
        "api": {
            "environments": {
                "staging": { "server": "web01", "secrets": { "DB_PASS": "s3cr3t" }, "vars": { "PORT": "8080" } },
                "production": { "server": "web02", "secrets": { "DB_PASS": "pr0d" }, "vars": { "PORT": "80" } }
            }
        },
        "web": {
            "environments": {
                "production": { "server": "web02" }
            }
        }
    }
}"#;

/// Run envsync with a clean environment: no GitHub credentials, no colors.
pub fn envsync() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("envsync");
    cmd.env_remove("GITHUB_OWNER")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env("NO_COLOR", "1");
    cmd
}

/// Temp directory holding `config.json` with the given content.
pub fn project(config: &str) -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("config.json").write_str(config).unwrap();
    dir
}

/// Names of the files in `versions/`.
pub fn snapshot_names(dir: &assert_fs::TempDir) -> Vec<String> {
    let versions = dir.path().join("versions");
    if !versions.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(versions)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
