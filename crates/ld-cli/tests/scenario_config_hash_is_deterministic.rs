use assert_cmd::prelude::*;
use predicates::prelude::*;

/// `ld config-hash` over the same layered files twice must print the same
/// hash — the hashing must not depend on map iteration order or time.
#[test]
fn config_hash_is_stable_across_runs() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let base = dir.join("base.yaml");
    let overlay = dir.join("overlay.yaml");
    std::fs::write(&base, "fresh_retouch_ratio: 0.7\nmax_contacts_per_company: 3\n")?;
    std::fs::write(&overlay, "max_contacts_per_company: 5\n")?;

    let first = run_config_hash(&base, &overlay)?;
    let second = run_config_hash(&base, &overlay)?;
    assert_eq!(first, second);
    assert!(first.starts_with("config_hash="));

    Ok(())
}

#[test]
fn config_hash_changes_when_overlay_changes() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let base = dir.join("base.yaml");
    let overlay = dir.join("overlay.yaml");
    std::fs::write(&base, "fresh_retouch_ratio: 0.7\n")?;
    std::fs::write(&overlay, "fresh_retouch_ratio: 0.5\n")?;
    let a = run_config_hash(&base, &overlay)?;

    std::fs::write(&overlay, "fresh_retouch_ratio: 0.9\n")?;
    let b = run_config_hash(&base, &overlay)?;

    assert_ne!(a, b);
    Ok(())
}

fn run_config_hash(base: &std::path::Path, overlay: &std::path::Path) -> anyhow::Result<String> {
    let mut cmd = assert_cmd::Command::cargo_bin("ld-cli")?;
    let assert = cmd
        .args([
            "config-hash",
            base.to_str().unwrap(),
            overlay.to_str().unwrap(),
        ])
        .assert()
        .success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout
        .lines()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no output"))?
        .to_string();
    assert!(predicate::str::starts_with("config_hash=").eval(&first_line));
    Ok(first_line)
}

fn tempdir() -> anyhow::Result<std::path::PathBuf> {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_nanos();
    let mut dir = std::env::temp_dir();
    dir.push(format!("ld-cli-test-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
