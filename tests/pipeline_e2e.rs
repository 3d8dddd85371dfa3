//! End-to-end pipeline tests: a LaTeX fixture in a temp directory, a
//! wiremock INSPIRE stand-in, and assertions on the rewritten files.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use ads2inspire_core::{FetchPolicy, KeyFilter, PipelineConfig, run};
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADS_KEY: &str = "1992ApJ...388..621D";
const INSP_BIBTEX: &str = "@article{Duncan:1992hi,\n  author = \"Duncan, Robert C. and Thompson, Christopher\",\n  journal = \"Astrophys. J. Lett.\",\n  volume = \"392\",\n  pages = \"L9\",\n  year = \"1992\"\n}";

/// Writes a manuscript fixture: paper.aux, paper.tex, refs.bib.
fn write_fixture(dir: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let bib = dir.path().join("refs.bib");
    fs::write(
        &bib,
        format!("@article{{{ADS_KEY},\n  eprint = {{9201001}},\n  title = {{Magnetars}}\n}}\n"),
    )
    .expect("write bib");

    let aux = dir.path().join("paper.aux");
    fs::write(
        &aux,
        format!(
            "\\relax\n\\bibdata{{{}}}\n\\bibcite{{{ADS_KEY}}}{{1}}\n",
            bib.display()
        ),
    )
    .expect("write aux");

    let tex = dir.path().join("paper.tex");
    fs::write(
        &tex,
        format!("Magnetars were proposed in~\\cite{{{ADS_KEY}}} and revisited in \\cite{{{ADS_KEY}}}.\n"),
    )
    .expect("write tex");

    (aux, tex, bib)
}

async fn mount_arxiv_success(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/arxiv/9201001"))
        .and(query_param("format", "bibtex"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INSP_BIBTEX))
        .mount(server)
        .await;
}

fn config(aux: &PathBuf, tex: &PathBuf, server: &MockServer, backup: bool) -> PipelineConfig {
    PipelineConfig {
        aux_path: aux.clone(),
        tex_paths: vec![tex.clone()],
        backup,
        filter: KeyFilter::Ads,
        fill_missing: false,
        api_base: format!("{}/", server.uri()),
        policy: FetchPolicy::new(3, Duration::from_millis(1)),
    }
}

#[tokio::test]
async fn pipeline_rewrites_tex_and_appends_bib() {
    let server = MockServer::start().await;
    mount_arxiv_success(&server).await;

    let dir = TempDir::new().expect("temp dir");
    let (aux, tex, bib) = write_fixture(&dir);

    run(&config(&aux, &tex, &server, false)).await.expect("pipeline runs");

    let tex_out = fs::read_to_string(&tex).expect("read tex");
    assert!(!tex_out.contains(ADS_KEY), "old key must be gone: {tex_out}");
    assert_eq!(tex_out.matches("Duncan:1992hi").count(), 2);

    let bib_out = fs::read_to_string(&bib).expect("read bib");
    assert!(bib_out.contains("@article{Duncan:1992hi,"));
    // The original entry is untouched.
    assert!(bib_out.contains(ADS_KEY));
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let server = MockServer::start().await;
    mount_arxiv_success(&server).await;

    let dir = TempDir::new().expect("temp dir");
    let (aux, tex, bib) = write_fixture(&dir);
    let cfg = config(&aux, &tex, &server, false);

    run(&cfg).await.expect("first run");
    let tex_after_first = fs::read_to_string(&tex).expect("read tex");
    let bib_after_first = fs::read_to_string(&bib).expect("read bib");

    // The reloaded bibliography now contains the fetched key, so the second
    // run must not append again, and the tex no longer has the old key.
    run(&cfg).await.expect("second run");
    assert_eq!(fs::read_to_string(&tex).expect("read tex"), tex_after_first);
    assert_eq!(fs::read_to_string(&bib).expect("read bib"), bib_after_first);
}

#[tokio::test]
async fn already_present_key_is_not_duplicated() {
    let server = MockServer::start().await;
    mount_arxiv_success(&server).await;

    let dir = TempDir::new().expect("temp dir");
    let (aux, tex, bib) = write_fixture(&dir);
    // The bibliography already carries the INSPIRE entry.
    let mut existing = fs::read_to_string(&bib).expect("read bib");
    existing.push_str(INSP_BIBTEX);
    existing.push('\n');
    fs::write(&bib, &existing).expect("write bib");

    run(&config(&aux, &tex, &server, false)).await.expect("pipeline runs");

    let bib_out = fs::read_to_string(&bib).expect("read bib");
    assert_eq!(bib_out.matches("@article{Duncan:1992hi,").count(), 1);
    // No separator block either, since nothing was appended.
    assert!(!bib_out.contains(&"%".repeat(60)));
}

#[tokio::test]
async fn backup_flag_preserves_preimages() {
    let server = MockServer::start().await;
    mount_arxiv_success(&server).await;

    let dir = TempDir::new().expect("temp dir");
    let (aux, tex, bib) = write_fixture(&dir);
    let tex_before = fs::read_to_string(&tex).expect("read tex");
    let bib_before = fs::read_to_string(&bib).expect("read bib");

    run(&config(&aux, &tex, &server, true)).await.expect("pipeline runs");

    let tex_backup = fs::read_to_string(dir.path().join("paper.bak.tex")).expect("tex backup");
    assert_eq!(tex_backup, tex_before);
    let bib_backup = fs::read_to_string(dir.path().join("refs.bak.bib")).expect("bib backup");
    assert_eq!(bib_backup, bib_before);
}

#[tokio::test]
async fn failed_lookup_leaves_files_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let (aux, tex, bib) = write_fixture(&dir);
    let tex_before = fs::read_to_string(&tex).expect("read tex");
    let bib_before = fs::read_to_string(&bib).expect("read bib");

    // Per-key failures never abort the run.
    run(&config(&aux, &tex, &server, false)).await.expect("pipeline still succeeds");

    assert_eq!(fs::read_to_string(&tex).expect("read tex"), tex_before);
    assert_eq!(fs::read_to_string(&bib).expect("read bib"), bib_before);
}

#[tokio::test]
async fn fill_missing_fetches_cited_but_absent_inspire_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature"))
        .and(query_param("q", "texkeys:Abbott:2016blz"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "@article{Abbott:2016blz,\n  title = \"Observation of Gravitational Waves\"\n}",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let bib = dir.path().join("refs.bib");
    fs::write(&bib, "@article{old, title = {T}}\n").expect("write bib");
    let aux = dir.path().join("paper.aux");
    fs::write(
        &aux,
        format!("\\bibdata{{{}}}\n\\bibcite{{Abbott:2016blz}}{{1}}\n", bib.display()),
    )
    .expect("write aux");
    let tex = dir.path().join("paper.tex");
    fs::write(&tex, "\\cite{Abbott:2016blz}\n").expect("write tex");

    let mut cfg = config(&aux, &tex, &server, false);
    cfg.fill_missing = true;

    run(&cfg).await.expect("pipeline runs");

    let bib_out = fs::read_to_string(&bib).expect("read bib");
    assert!(bib_out.contains("@article{Abbott:2016blz,"));
    // The citation already used the INSPIRE key; the tex is unchanged.
    assert_eq!(fs::read_to_string(&tex).expect("read tex"), "\\cite{Abbott:2016blz}\n");
}

#[test]
fn binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("ads2inspire").expect("binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("INSPIRE"));
}

#[test]
fn binary_missing_aux_file_fails() {
    let dir = TempDir::new().expect("temp dir");
    let mut cmd = Command::cargo_bin("ads2inspire").expect("binary exists");
    cmd.current_dir(dir.path())
        .arg("no-such-paper")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-paper"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn binary_end_to_end_against_mock_server() {
    let server = MockServer::start().await;
    mount_arxiv_success(&server).await;

    let dir = TempDir::new().expect("temp dir");
    let (aux, tex, _bib) = write_fixture(&dir);

    let api_base = format!("{}/", server.uri());
    let aux_arg = aux.to_string_lossy().into_owned();
    let tex_arg = tex.to_string_lossy().into_owned();

    // assert_cmd blocks; run it off the runtime so the mock server stays
    // responsive.
    let assert = tokio::task::spawn_blocking(move || {
        let mut cmd = Command::cargo_bin("ads2inspire").expect("binary exists");
        cmd.arg(&aux_arg)
            .arg(&tex_arg)
            .arg("--api-base")
            .arg(&api_base)
            .arg("--delay-ms")
            .arg("1")
            .assert()
    })
    .await
    .expect("spawn_blocking");
    assert.success();

    let tex_out = fs::read_to_string(&tex).expect("read tex");
    assert!(tex_out.contains("Duncan:1992hi"));
    assert!(!tex_out.contains(ADS_KEY));
}
