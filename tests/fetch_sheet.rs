mod sheet_stub;

use std::fs;

use amrito::formats::Chapter;
use predicates::prelude::*;
use sheet_stub::{GOOD_GID, SheetStub};

#[test]
fn fetch_by_gid_writes_chapters_in_display_order() -> anyhow::Result<()> {
    let stub = SheetStub::spawn();
    let temp = tempfile::TempDir::new()?;
    let out = temp.path().join("chapters.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.env("AMRITO_SHEET_BASE_URL", &stub.base_url)
        .args(["fetch", "--gid", GOOD_GID, "--out", out.to_str().unwrap()])
        .assert()
        .success();

    let chapters: Vec<Chapter> = serde_json::from_str(&fs::read_to_string(&out)?)?;
    let ids = chapters.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["chapter-1", "chapter-0"]);
    assert_eq!(chapters[0].title, "First");
    assert_eq!(chapters[0].index, 0);
    assert_eq!(chapters[1].title, "Second");
    assert_eq!(chapters[1].index, 1);
    assert!(chapters[0].content.contains("Translator's Note\nA note"));

    cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.env("AMRITO_SHEET_BASE_URL", &stub.base_url)
        .args(["fetch", "--gid", GOOD_GID, "--out", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("open output"));
    Ok(())
}

#[test]
fn fetch_by_language_uses_sources_file() -> anyhow::Result<()> {
    let stub = SheetStub::spawn();
    let temp = tempfile::TempDir::new()?;
    let sources = temp.path().join("sources.yaml");
    fs::write(
        &sources,
        format!(
            "base_url: \"{}\"\nlanguages:\n  - code: en\n    name: English\n    gid: \"{GOOD_GID}\"\n",
            stub.base_url
        ),
    )?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    let output = cmd
        .env_remove("AMRITO_SHEET_BASE_URL")
        .args(["fetch", "--lang", "EN", "--sources", sources.to_str().unwrap()])
        .output()?;
    assert!(output.status.success());

    let chapters: Vec<Chapter> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(chapters.len(), 2);

    cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.args(["fetch", "--lang", "fr", "--sources", sources.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown language: fr"));
    Ok(())
}

#[test]
fn failed_fetch_yields_empty_list_and_logs_error() {
    let stub = SheetStub::spawn();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.env("AMRITO_SHEET_BASE_URL", &stub.base_url)
        .args(["fetch", "--gid", "999"])
        .assert()
        .success()
        .stdout("[]\n")
        .stderr(predicate::str::contains("fetch chapters failed"));
}

#[test]
fn unreachable_url_yields_empty_list() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.args(["fetch", "--url", &format!("http://{addr}/export?format=csv")])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn non_http_url_is_rejected() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.args(["fetch", "--url", "file:///etc/passwd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be http/https"));
}

#[test]
fn fetch_requires_a_sheet() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("amrito");
    cmd.args(["fetch"]).assert().failure();
}
