//! Integration tests for pdf-preview

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Binary with an isolated config file
    fn preview(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("pdf-preview");
        cmd.env("PDF_PREVIEW_CONFIG", config_dir.path().join("config.toml"));
        cmd
    }

    fn write_pdf(dir: &Path, name: &str, body: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("read coalescing and save handshake"))
            .stdout(predicate::str::contains("serve"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pdf-preview"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("capacity = 5"));
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .args(["config", "set", "save.timeout_secs", "10"])
            .assert()
            .success();
        preview(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("timeout_secs = 10"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn info_reports_document() {
        let temp = TempDir::new().unwrap();
        let file = write_pdf(temp.path(), "report.pdf", b"%PDF-1.7\n%%EOF\n");

        preview(&temp)
            .args(["info", "--format", "json"])
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"pdf_version\": \"1.7\""))
            .stdout(predicate::str::contains("\"size\": 15"))
            .stdout(predicate::str::contains("report.pdf"));
    }

    #[test]
    fn info_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .arg("info")
            .arg(temp.path().join("missing.pdf"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read"));
    }

    #[test]
    fn info_restricted_enforces_limit() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "[document]\nmax_restricted_size_mb = 0\n",
        )
        .unwrap();
        let file = write_pdf(temp.path(), "big.pdf", b"%PDF-1.7\n");

        preview(&temp)
            .args(["info", "--restricted"])
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("File is too large"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[cache]\ncapacity = 0\n").unwrap();

        preview(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cache.capacity"));
    }

    #[test]
    fn serve_answers_ready_and_saves_direct() {
        let temp = TempDir::new().unwrap();
        let file = write_pdf(temp.path(), "doc.pdf", b"%PDF-1.4");

        preview(&temp)
            .arg("serve")
            .arg(&file)
            .write_stdin(
                "{\"command\":\"ready\"}\n\
                 {\"command\":\"save-direct\",\"data\":[37,80,68,70,45,50]}\n\
                 {\"command\":\"close\"}\n",
            )
            .assert()
            .success()
            .stdout(predicate::str::contains("\"command\":\"preview\""))
            .stdout(predicate::str::contains("\"data\":[37,80,68,70,45,49,46,52]"));

        assert_eq!(std::fs::read(&file).unwrap(), b"%PDF-2");
    }

    #[test]
    fn serve_uri_mode_sends_location() {
        let temp = TempDir::new().unwrap();
        let file = write_pdf(temp.path(), "doc.pdf", b"%PDF-1.4");

        preview(&temp)
            .args(["serve", "--uri-mode"])
            .arg(&file)
            .write_stdin("{\"command\":\"ready\"}\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"pdfUri\":\"file://"))
            .stdout(predicate::str::contains("\"data\"").not());
    }

    #[test]
    fn serve_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        preview(&temp)
            .arg("serve")
            .arg(temp.path().join("missing.pdf"))
            .write_stdin("")
            .assert()
            .failure()
            .stderr(predicate::str::contains("File not found"));
    }
}
