use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn init_creates_vault_with_default_settings() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let target = temp.path().join("vault");

    let mut cmd = cli();
    cmd.args(["init", target.to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout(contains("Initialized vault at"));

    let settings = std::fs::read_to_string(target.join(".autolink/settings.json"))?;
    assert!(settings.contains("\"autoRefreshLinks\": \"always\""));
    assert!(settings.contains("\"lemmatizeTerms\": true"));
    Ok(())
}

#[test]
fn init_dry_run_does_not_write() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let target = temp.path().join("vault-dry-run");

    let mut cmd = cli();
    cmd.args(["init", target.to_str().unwrap(), "--dry-run"]);

    cmd.assert()
        .success()
        .stdout(contains("Dry run: would initialize vault"));

    assert!(!target.exists());
    Ok(())
}

#[test]
fn init_rejects_nested_vault() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let parent = temp.path().join("parent");
    let child = parent.join("child");
    std::fs::create_dir_all(parent.join(".autolink"))?;

    let mut cmd = cli();
    cmd.args(["init", child.to_str().unwrap()]);

    cmd.assert()
        .failure()
        .code(64)
        .stderr(contains("ancestor vault"));
    Ok(())
}

#[test]
fn init_twice_reports_existing_vault() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    cli().args(["init", temp.path().to_str().unwrap()]).assert().success();

    cli()
        .args(["init", temp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Vault already initialized"));
    Ok(())
}

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_autolink"))
}
