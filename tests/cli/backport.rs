use anyhow::Result;

use crate::{CliTest, NO_CHECKER_CONFIG, po, stderr, stdout};

fn fixture() -> Result<CliTest> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(
        "old/locale/fr/LC_MESSAGES/wm-django.po",
        &po(&[("Hello", "Bonjour"), ("Gone", "Parti")]),
    )?;
    test.write_file(
        "translations-custom/repoA/conf/locale/en/LC_MESSAGES/django.po",
        &po(&[("Hello", "")]),
    )?;
    Ok(test)
}

#[test]
fn test_backport_fills_custom_catalogs() -> Result<()> {
    let test = fixture()?;

    let output = test.run(&["backport", "old/locale", "--report", "report.txt"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("BACKPORT SUMMARY"));
    assert!(out.contains("Placeholder files created: 1"));
    assert!(out.contains("Backported 1 of 2 strings into 1 file"));

    let fr = test.read_file("translations-custom/repoA/conf/locale/fr/LC_MESSAGES/django.po")?;
    assert!(fr.contains("msgid \"Hello\"\nmsgstr \"Bonjour\""));

    let report = test.read_file("report.txt")?;
    assert!(report.contains("[fr] 1 string(s):"));
    assert!(report.contains("  msgid:  Gone"));
    Ok(())
}

#[test]
fn test_backport_prefix_flag() -> Result<()> {
    let test = fixture()?;

    let output = test.run(&["backport", "old/locale", "--prefix", "legacy-"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Old translation strings: 0"));
    assert!(!test.exists("translations-custom/repoA/conf/locale/fr"));
    Ok(())
}

#[test]
fn test_backport_missing_old_dir() -> Result<()> {
    let test = fixture()?;
    let output = test.run(&["backport", "nowhere"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("old locale directory"));
    Ok(())
}
