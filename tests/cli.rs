use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const VALID_BODY: &str = r#"{
    "content": [{
        "changes": [{
            "_id": "66f1a2",
            "date": "2024-09-12T08:30:00Z",
            "field": "title",
            "previousValue": "Itaú",
            "currentValue": "Itaú: Conta, Cartão e Pix"
        }]
    }],
    "totalElements": 1
}"#;

fn write_config(dir: &Path, api_host: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let contents = format!(
        "api_host: '{api_host}'\n\
         max_retries: 2\n\
         timeout_ms: 2000\n\
         retry_delay_ms: 1\n\
         rate_limit_delay_ms: 1\n\
         calls_per_second: 100.0\n\
         output_dir: '{}'\n\
         log_file: '{}'\n\
         apps:\n  apple: []\n  google:\n    - com.itau\n    - com.bradesco\n",
        dir.join("data").display(),
        dir.join("logs").join("api.log").display(),
    );
    fs::write(&path, contents).expect("failed to write config");
    path
}

fn rankscope(dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rankscope"));
    cmd.current_dir(dir)
        .arg("--config")
        .arg(config)
        .env_remove("RANKSCOPE_API_HOST")
        .env_remove("RANKSCOPE_FORMAT")
        .env_remove("RANKSCOPE_LOG_FILE");
    cmd
}

#[test]
fn version_prints_package_version() -> Result<(), Box<dyn std::error::Error>> {
    Command::new(assert_cmd::cargo::cargo_bin!("rankscope"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn collect_without_token_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "http://127.0.0.1:9");

    rankscope(temp.path(), &config)
        .args(["collect", "--start", "2024-09-01", "--end", "2024-09-30"])
        .env_remove("RANKAPI_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("RANKAPI_TOKEN"));
    Ok(())
}

#[test]
fn collect_rejects_inverted_range() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "http://127.0.0.1:9");

    rankscope(temp.path(), &config)
        .args(["collect", "--start", "2024-09-30", "--end", "2024-09-01"])
        .env("RANKAPI_TOKEN", "t")
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end date"));
    Ok(())
}

#[test]
fn missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    rankscope(temp.path(), &temp.path().join("absent.yaml"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn status_reports_token_and_host() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "http://localhost:4010/v1");

    let assert = rankscope(temp.path(), &config)
        .args(["status", "--format", "json"])
        .env_remove("RANKAPI_TOKEN")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(json["token_present"], false);
    assert_eq!(json["config"]["api_host"], "http://localhost:4010/v1");
    assert_eq!(json["config"]["apps"]["google"][0], "com.itau");
    Ok(())
}

#[test]
fn api_host_flag_overrides_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "http://localhost:4010/v1");

    rankscope(temp.path(), &config)
        .args(["status", "--api-host", "http://override:1/v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://override:1/v1"));
    Ok(())
}

#[test]
fn validate_accepts_valid_response() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "http://127.0.0.1:9");
    let file = temp.path().join("response.json");
    fs::write(&file, VALID_BODY)?;

    rankscope(temp.path(), &config)
        .arg("validate")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
    Ok(())
}

#[test]
fn validate_reports_reason_code() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "http://127.0.0.1:9");
    let file = temp.path().join("results.json");
    fs::write(
        &file,
        format!(
            r#"{{ "com.itau": {VALID_BODY}, "com.bradesco": {{ "content": [{{ "changes": [{{ "_id": "x" }}] }}] }} }}"#
        ),
    )?;

    rankscope(temp.path(), &config)
        .arg("validate")
        .arg(&file)
        .arg("--batch")
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing-required-field"))
        .stderr(predicate::str::contains("1 of 2"));
    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn collect_saves_successes_and_reports_failures() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();

    let itau = server
        .mock("GET", "/apps/com.itau/google/changes-log")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("store".into(), "google".into()),
            mockito::Matcher::UrlEncoded("startDate".into(), "2024-09-01".into()),
            mockito::Matcher::UrlEncoded("endDate".into(), "2024-09-30".into()),
        ]))
        .match_header("rankapi-token", "test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(VALID_BODY)
        .expect(1)
        .create();

    let bradesco = server
        .mock("GET", "/apps/com.bradesco/google/changes-log")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .expect(2)
        .create();

    let temp = tempdir()?;
    let config = write_config(temp.path(), &server.url());

    let assert = rankscope(temp.path(), &config)
        .args([
            "collect",
            "--store",
            "google",
            "--start",
            "2024-09-01",
            "--end",
            "2024-09-30",
        ])
        .env("RANKAPI_TOKEN", "test-token")
        .assert()
        .success();

    itau.assert();
    bradesco.assert();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("com.itau"));
    assert!(stdout.contains("fetched"));
    assert!(stdout.contains("failed"));

    let saved = fs::read_to_string(
        temp.path()
            .join("data")
            .join("changeslog_google_results.json"),
    )?;
    // Non-ASCII text is written verbatim
    assert!(saved.contains("Itaú: Conta, Cartão e Pix"));
    let json: serde_json::Value = serde_json::from_str(&saved)?;
    assert!(json.get("com.itau").is_some());
    assert!(json.get("com.bradesco").is_none());

    let log = fs::read_to_string(temp.path().join("logs").join("api.log"))?;
    assert!(log.contains("com.bradesco"));
    assert!(log.contains("ERROR"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn fetch_prints_change_log_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/apps/com.nu.iphone/apple/changes-log")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(VALID_BODY)
        .create();

    let temp = tempdir()?;
    let config = write_config(temp.path(), &server.url());

    let assert = rankscope(temp.path(), &config)
        .args([
            "fetch",
            "com.nu.iphone",
            "--store",
            "apple",
            "--start",
            "2024-09-01",
            "--end",
            "2024-09-30",
            "--format",
            "json",
        ])
        .env("RANKAPI_TOKEN", "test-token")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(json["content"][0]["changes"][0]["_id"], "66f1a2");
    assert_eq!(json["totalElements"], 1);
    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn fetch_unauthorized_makes_one_call_and_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/apps/com.itau/google/changes-log")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config = write_config(temp.path(), &server.url());

    rankscope(temp.path(), &config)
        .args([
            "fetch",
            "com.itau",
            "--store",
            "google",
            "--start",
            "2024-09-01",
            "--end",
            "2024-09-30",
        ])
        .env("RANKAPI_TOKEN", "bad-token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));

    mock.assert();
    Ok(())
}
