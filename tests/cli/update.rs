use anyhow::Result;

use crate::{CliTest, NO_CHECKER_CONFIG, po, stderr, stdout};

const EN: &str = "repoA/conf/locale/en/LC_MESSAGES/django.po";

fn fixture() -> Result<CliTest> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(&format!("translations-upstream/{EN}"), &po(&[("Hello", "")]))?;
    test.write_file(
        "translations-upstream/repoA/conf/locale/fr/LC_MESSAGES/django.po",
        &po(&[("Hello", "Bonjour")]),
    )?;
    test.write_file(
        &format!("extracted/{EN}"),
        &po(&[("Hello", ""), ("Custom", "")]),
    )?;
    Ok(test)
}

#[test]
fn test_update_adds_custom_string_and_placeholder() -> Result<()> {
    let test = fixture()?;

    let output = test.run(&["update_custom", "--extracted-dir", "extracted"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Updated custom layer for 1 language"));

    let source = test.read_file(&format!("translations-custom/{EN}"))?;
    assert!(source.contains("msgid \"Custom\""));
    assert!(!source.contains("msgid \"Hello\""));

    let fr = test.read_file("translations-custom/repoA/conf/locale/fr/LC_MESSAGES/django.po")?;
    assert!(fr.contains("msgid \"Custom\"\nmsgstr \"\""));
    assert!(fr.contains("Language: fr"));
    Ok(())
}

#[test]
fn test_update_is_idempotent() -> Result<()> {
    let test = fixture()?;
    test.run(&["update-custom", "--extracted-dir", "extracted"])?;
    let fr_path = "translations-custom/repoA/conf/locale/fr/LC_MESSAGES/django.po";
    let first = test.read_file(fr_path)?;

    let output = test.run(&["update-custom", "--extracted-dir", "extracted"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("0 source, 0 placeholder(s) created, 0 placeholder(s) updated"));
    assert_eq!(test.read_file(fr_path)?, first);
    Ok(())
}

#[test]
fn test_update_requires_upstream_layer() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.mkdir("extracted")?;

    let output = test.run(&["update_custom", "--extracted-dir", "extracted"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("upstream directory"));
    Ok(())
}

#[test]
fn test_update_with_root_flag() -> Result<()> {
    let test = fixture()?;
    let extracted = test.root().join("extracted");

    let output = test
        .command()
        .current_dir("/")
        .arg("update_custom")
        .arg("--root")
        .arg(test.root())
        .arg("--extracted-dir")
        .arg(&extracted)
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.exists("translations-custom/repoA/conf/locale/fr/LC_MESSAGES/django.po"));
    Ok(())
}
