use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the caller's environment and working directory
fn clean_locator(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clean-locator").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("CLEAN_LOCATOR_TOKEN")
        .env_remove("CLEAN_LOCATOR_DB")
        .env_remove("CLEAN_LOCATOR_ENDPOINT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_shows_usage() {
    let workdir = tempfile::tempdir().unwrap();
    clean_locator(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--sleep"))
        .stdout(predicate::str::contains("<DIRECTORY>"));
}

#[test]
fn test_directory_argument_is_required() {
    let workdir = tempfile::tempdir().unwrap();
    clean_locator(&workdir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DIRECTORY"));
}

#[test]
fn test_missing_token_is_rejected() {
    let workdir = tempfile::tempdir().unwrap();
    clean_locator(&workdir)
        .arg(workdir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));
}

#[test]
fn test_missing_directory_fails() {
    let workdir = tempfile::tempdir().unwrap();
    clean_locator(&workdir)
        .args(["no-such-library", "--token", "secret", "--db", "music.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_empty_library_prints_summary() {
    let workdir = tempfile::tempdir().unwrap();
    std::fs::create_dir(workdir.path().join("library")).unwrap();
    std::fs::write(workdir.path().join("library").join("cover.jpg"), b"").unwrap();

    clean_locator(&workdir)
        .args(["library", "--db", "music.db", "--sleep", "0"])
        .env("CLEAN_LOCATOR_TOKEN", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Library Audit Summary:"))
        .stdout(predicate::str::contains("Files found: 0"));

    assert!(workdir.path().join("music.db").is_file());
}

#[test]
fn test_config_file_supplies_token() {
    let workdir = tempfile::tempdir().unwrap();
    std::fs::create_dir(workdir.path().join("library")).unwrap();
    std::fs::write(
        workdir.path().join("clean_locator.toml"),
        "[catalog]\ntoken = \"from-file\"\n\n[store]\ndatabase = \"audit.db\"\n",
    )
    .unwrap();

    clean_locator(&workdir)
        .args(["library", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"files_found\": 0"));

    assert!(workdir.path().join("audit.db").is_file());
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let workdir = tempfile::tempdir().unwrap();
    std::fs::write(workdir.path().join("settings.toml"), "[catalog]\ntokn = \"typo\"\n").unwrap();

    clean_locator(&workdir)
        .args([".", "--config", "settings.toml", "--token", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_oversized_probe_timeout_is_a_config_error() {
    let workdir = tempfile::tempdir().unwrap();
    clean_locator(&workdir)
        .args([".", "--token", "secret", "--db", "music.db", "--probe-timeout", "1e20"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("probe.timeout_secs"));
}
