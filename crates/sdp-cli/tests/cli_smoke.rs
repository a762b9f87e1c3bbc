use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn sdp_cmd(tmp: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docker-sdp");
    cmd.current_dir(tmp.path())
        .env_remove("DOCKER_SWARM_DEPLOY_VERBOSE")
        .env_remove("SWARM_DEPLOYER_VERBOSE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn usage_banner_without_stack_deploy() {
    let tmp = TempDir::new().unwrap();
    sdp_cmd(&tmp)
        .assert()
        .stdout(predicate::str::contains("docker-stack-deploy (docker-sdp)"))
        .stdout(predicate::str::contains("SHA-1"));
}

#[test]
fn version_flag() {
    let tmp = TempDir::new().unwrap();
    sdp_cmd(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn duplicate_stack_file_fails_before_docker() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.yml"), "services: {}\n").unwrap();
    sdp_cmd(&tmp)
        .args(["stack", "deploy", "-c", "a.yml", "-c", "a.yml", "app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repeated stack file a.yml"));
}

#[test]
fn missing_secret_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("stack.yml"),
        "secrets:\n  db_pw:\n    file: ./pw.txt\n",
    )
    .unwrap();
    sdp_cmd(&tmp)
        .args(["stack", "deploy", "-c", "stack.yml", "app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack file stack.yml"))
        .stderr(predicate::str::contains("did not find file at path"));
}

#[test]
fn trailing_selector_is_invalid() {
    let tmp = TempDir::new().unwrap();
    sdp_cmd(&tmp)
        .args(["stack", "deploy", "app", "--compose-file"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid arguments"));
}

#[test]
fn stack_file_from_stdin() {
    let tmp = TempDir::new().unwrap();
    sdp_cmd(&tmp)
        .args(["stack", "deploy", "-c", "-", "app"])
        .write_stdin("services:\n  api:\n    secrets:\n      - source: db_pw\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack file -: "))
        .stderr(predicate::str::contains("service 'api' references undeclared secret 'db_pw'"));
}

#[test]
fn stdin_stack_file_missing_secret_is_reported() {
    let tmp = TempDir::new().unwrap();
    sdp_cmd(&tmp)
        .args(["stack", "deploy", "--compose-file", "-", "app"])
        .write_stdin("secrets:\n  db_pw:\n    file: ./pw.txt\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack file -: "))
        .stderr(predicate::str::contains("did not find file at path"))
        .stderr(predicate::str::contains("pw.txt"));
}
