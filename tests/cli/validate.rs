use anyhow::Result;

use crate::{CliTest, NO_CHECKER_CONFIG, po, stderr, stdout};

const FR: &str = "repoA/conf/locale/fr/LC_MESSAGES/django.po";

#[test]
fn test_validate_passes_clean_catalogs() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(
        &format!("translations/{FR}"),
        &po(&[("Hello %(name)s", "Bonjour %(name)s")]),
    )?;
    // source and pseudo-locale catalogs are not checked
    test.write_file("translations/repoA/conf/locale/en/LC_MESSAGES/django.po", "broken")?;
    test.write_file("translations/repoA/conf/locale/qqq/LC_MESSAGES/django.po", "broken")?;

    let output = test.run(&["validate", "--dirs", "translations"])?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("SUCCESS: 1 catalog checked, all valid"));
    Ok(())
}

#[test]
fn test_validate_reports_placeholder_mismatch() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(
        &format!("translations-custom/{FR}"),
        &po(&[("Hello %(name)s", "Bonjour %(nom)s")]),
    )?;
    test.write_file(&format!("translations/{FR}"), &po(&[("Hi", "Salut")]))?;

    let output = test.run(&["validate"])?;
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("INVALID:"));
    assert!(err.contains("translations-custom"));
    assert!(err.contains("  msgid: Hello %(name)s"));
    assert!(err.contains("warning: directory not found"));
    assert!(stdout(&output).contains("FAILURE: 1 of 2 catalogs invalid"));
    Ok(())
}

#[test]
fn test_validate_malformed_catalog_is_invalid() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(&format!("translations/{FR}"), "msgid \"open\nmsgstr \"\"\n")?;

    let output = test.run(&["validate", "--dirs", "translations"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("INVALID:"));
    Ok(())
}

#[test]
fn test_validate_unrunnable_checker_is_fatal() -> Result<()> {
    let test = CliTest::with_config(r#"{ "checker": ["strata-no-such-checker"] }"#)?;
    test.write_file(&format!("translations/{FR}"), &po(&[("Hi", "Salut")]))?;

    let output = test.run(&["validate", "--dirs", "translations"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("strata-no-such-checker"));
    Ok(())
}
