use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::Server;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn piton(root: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("piton"));
    cmd.arg("--root")
        .arg(root)
        .env_remove("PITON_INDEX_URL")
        .env_remove("PITON_PYTHON");
    cmd
}

fn install_fake_package(root: &Path, name: &str, version: &str, requires: &[&str]) {
    let modules = root.join("python_modules");
    let dist = modules.join(format!("{}-{}.dist-info", name, version));
    fs::create_dir_all(&dist).unwrap();

    let mut metadata = format!("Name: {}\nVersion: {}\n", name, version);
    for requirement in requires {
        metadata.push_str(&format!("Requires-Dist: {}\n", requirement));
    }
    fs::write(dist.join("METADATA"), metadata).unwrap();
    fs::write(dist.join("top_level.txt"), format!("{}\n", name)).unwrap();
    fs::create_dir_all(modules.join(name)).unwrap();
}

fn write_manifest(root: &Path, dependencies: &str) {
    fs::write(
        root.join("package.json"),
        format!(
            r#"{{"pythonDependencies": {}, "pythonDevDependencies": {{}}}}"#,
            dependencies
        ),
    )
    .unwrap();
}

#[test]
fn test_init_creates_manifest_once() {
    let dir = tempdir().unwrap();

    piton(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["pythonDependencies"], serde_json::json!({}));
    assert_eq!(json["pythonDevDependencies"], serde_json::json!({}));

    piton(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("package.json already exists"));
}

#[test]
fn test_list_shows_tree_and_unwanted() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), r#"{"requests": "^2.31.0", "foo": "^1.0.0"}"#);
    install_fake_package(dir.path(), "requests", "2.31.0", &["idna (<4,>=2.5)"]);
    install_fake_package(dir.path(), "idna", "3.4", &[]);
    install_fake_package(dir.path(), "leftover", "0.1.0", &[]);

    piton(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().display().to_string()))
        .stdout(predicate::str::contains("├── foo@^1.0.0 (not installed)"))
        .stdout(predicate::str::contains("└── requests@2.31.0"))
        .stdout(predicate::str::contains("    └── idna@3.4"))
        .stdout(predicate::str::contains("Unwanted:\n  leftover"));
}

#[test]
fn test_list_without_manifest_or_modules() {
    let dir = tempdir().unwrap();

    piton(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unwanted").not());
}

#[test]
fn test_prune_removes_unwanted_packages() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), r#"{"requests": "^2.31.0"}"#);
    install_fake_package(dir.path(), "requests", "2.31.0", &["idna"]);
    install_fake_package(dir.path(), "idna", "3.4", &[]);
    install_fake_package(dir.path(), "leftover", "0.1.0", &[]);

    piton(dir.path())
        .arg("prune")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed leftover"));

    let modules = dir.path().join("python_modules");
    assert!(!modules.join("leftover").exists());
    assert!(!modules.join("leftover-0.1.0.dist-info").exists());
    assert!(modules.join("requests").exists());
    assert!(modules.join("idna-3.4.dist-info").exists());
}

#[test]
fn test_remove_with_save() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), r#"{"six": "^1.16.0", "attrs": "^23.1.0"}"#);
    install_fake_package(dir.path(), "six", "1.16.0", &[]);

    piton(dir.path())
        .args(["remove", "six", "--save"])
        .assert()
        .success();

    assert!(!dir.path().join("python_modules/six").exists());
    assert!(
        !dir.path()
            .join("python_modules/six-1.16.0.dist-info")
            .exists()
    );
    let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!content.contains("six"));
    assert!(content.contains("attrs"));
}

#[test]
fn test_remove_absent_package() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), r#"{"six": "^1.16.0"}"#);

    piton(dir.path())
        .args(["remove", "six", "-s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package six is not installed"));

    let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!content.contains("six"));
}

#[test]
fn test_outdated_empty_manifest_prints_nothing() {
    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "{}");

    piton(dir.path())
        .args(["outdated", "--index-url", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_outdated_reports_against_index() {
    let mut server = Server::new();
    let _six = server
        .mock("GET", "/pypi/six/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"releases": {"1.15.0": [], "1.16.0": []}}"#)
        .create();
    let _requests = server
        .mock("GET", "/pypi/requests/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"releases": {"2.9.0": [], "2.31.0": []}}"#)
        .create();

    let dir = tempdir().unwrap();
    write_manifest(dir.path(), r#"{"six": "^1.15.0", "requests": "^2.31.0"}"#);
    install_fake_package(dir.path(), "six", "1.15.0", &[]);
    install_fake_package(dir.path(), "requests", "2.31.0", &[]);

    piton(dir.path())
        .args(["outdated", "--index-url", &server.url()])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Package"))
        .stdout(predicate::str::contains("six"))
        .stdout(predicate::str::contains("1.16.0"))
        .stdout(predicate::str::contains("requests").not());
}

#[test]
fn test_install_unknown_package() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/pypi/no-such-package/json")
        .with_status(404)
        .create();

    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "{}");

    piton(dir.path())
        .args(["install", "no-such-package", "--save"])
        .args(["--index-url", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Unable to find package no-such-package",
        ));

    let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!content.contains("no-such-package"));
}

#[test]
fn test_install_fails_when_python_is_missing() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/pypi/six/json")
        .with_status(200)
        .with_body(r#"{"releases": {"1.16.0": []}}"#)
        .create();

    let dir = tempdir().unwrap();
    write_manifest(dir.path(), "{}");

    piton(dir.path())
        .args(["install", "six", "--save"])
        .args(["--index-url", &server.url()])
        .args(["--python", "/nonexistent/python3"])
        .assert()
        .failure();

    let content = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(!content.contains("six"));
    assert!(!dir.path().join(".piton-pip.conf").exists());
}
