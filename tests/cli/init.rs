use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Created .stratarc.json"));

    let content = test.read_file(".stratarc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    for field in ["upstreamDir", "customDir", "finalDir", "sourceLocale", "localeAliases"] {
        assert!(parsed.get(field).is_some(), "Config should have '{field}' field");
    }
    assert_eq!(parsed["excludedLocales"][0], "qqq");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".stratarc.json", "{}")?;

    let output = test.run(&["init"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: .stratarc.json already exists"));
    assert_eq!(test.read_file(".stratarc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.run(&["init"])?;
    test.mkdir("translations-upstream")?;
    test.mkdir("translations-custom")?;

    let output = test.run(&["merge_final"])?;
    assert!(
        output.status.success(),
        "merge_final should work with initialized config. stderr: {}",
        stderr(&output)
    );

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.run(&[])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("update_custom"));
    Ok(())
}
