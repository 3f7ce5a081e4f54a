//! Integration tests for cachepull

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn cachepull() -> Command {
        let mut cmd = cargo_bin_cmd!("cachepull");
        // Shield the tests from ambient CI/AWS configuration.
        for var in [
            "CACHE_RESTORE_KEYS",
            "CACHE_RESTORE_PATH",
            "CACHE_ARCHIVE_EXT",
            "CACHE_S3_BUCKET",
            "CACHE_S3_ENDPOINT",
            "AWS_REGION",
            "AWS_ACCESS_KEY_ID",
            "AWS_SECRET_ACCESS_KEY",
            "BITRISE_GIT_BRANCH",
            "BITRISE_OSX_STACK_REV_ID",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    #[test]
    fn help_displays() {
        cachepull()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("restore CI build caches"));
    }

    #[test]
    fn version_displays() {
        cachepull()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cachepull"));
    }

    #[test]
    fn keys_resolves_templates() {
        cachepull()
            .args([
                "keys",
                "--restore-keys",
                "release-{{ branch }}\nrelease-fallback",
                "--branch",
                "main",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("release-main"))
            .stdout(predicate::str::contains("release-fallback"));
    }

    #[test]
    fn keys_literal_template_passes_through() {
        cachepull()
            .args(["keys", "--restore-keys", "release-v1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("release-v1"));
    }

    #[test]
    fn keys_branch_from_env() {
        cachepull()
            .args(["keys", "--restore-keys", "deps-{{ branch }}"])
            .env("BITRISE_GIT_BRANCH", "feature/login")
            .assert()
            .success()
            .stdout(predicate::str::contains("deps-feature/login"));
    }

    #[test]
    fn keys_unknown_function_fails() {
        cachepull()
            .args(["keys", "--restore-keys", "cache-{{ commit }}"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown key function 'commit'"));
    }

    #[test]
    fn keys_missing_branch_value_fails_with_hint() {
        cachepull()
            .args(["keys", "--restore-keys", "deps-{{ branch }}"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("has no value"))
            .stderr(predicate::str::contains("BITRISE_GIT_BRANCH"));
    }

    #[test]
    fn keys_json_output() {
        cachepull()
            .args([
                "keys",
                "--json",
                "--restore-keys",
                "deps-{{ branch }}",
                "--branch",
                "main",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"template\": \"deps-{{ branch }}\""))
            .stdout(predicate::str::contains("\"key\": \"deps-main\""));
    }

    #[test]
    fn restore_requires_store_settings() {
        cachepull()
            .args(["restore", "--restore-keys", "k", "--path", "/tmp/out"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--bucket"));
    }

    #[test]
    fn restore_rejects_unknown_archive_extension() {
        cachepull()
            .args([
                "restore",
                "--restore-keys",
                "k",
                "--path",
                "/tmp/out",
                "--archive-ext",
                "rar",
                "--bucket",
                "ci-caches",
                "--access-key-id",
                "AKIDEXAMPLE",
                "--secret-access-key",
                "secret",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported archive extension"));
    }

    #[test]
    fn check_rejects_schemeless_endpoint() {
        cachepull()
            .args([
                "check",
                "--restore-keys",
                "k",
                "--bucket",
                "ci-caches",
                "--access-key-id",
                "AKIDEXAMPLE",
                "--secret-access-key",
                "secret",
                "--endpoint",
                "localhost:9000",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid store endpoint"));
    }
}
