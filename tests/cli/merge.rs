use anyhow::Result;

use crate::{CliTest, NO_CHECKER_CONFIG, po, stderr, stdout};

const FR: &str = "repoA/conf/locale/fr/LC_MESSAGES/django.po";
const FR_JSON: &str = "mfe/src/i18n/messages/fr.json";

#[test]
fn test_merge_overlays_custom_on_upstream() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(
        &format!("translations-upstream/{FR}"),
        &po(&[("Hello", "Bonjour"), ("Bye", "")]),
    )?;
    test.write_file(
        &format!("translations-custom/{FR}"),
        &po(&[("Bye", "Salut"), ("Custom", "")]),
    )?;
    test.write_file(&format!("translations-upstream/{FR_JSON}"), r#"{"k1": "", "k2": "x"}"#)?;
    test.write_file(&format!("translations-custom/{FR_JSON}"), r#"{"k1": "bonjour"}"#)?;
    test.write_file("translations/stale.po", &po(&[]))?;

    let output = test.run(&["merge_final"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Rebuilt final layer from 2 upstream files"));
    assert!(stdout(&output).contains("2 merged, 0 copied, 0 unchanged"));

    let merged = test.read_file(&format!("translations/{FR}"))?;
    assert!(merged.contains("msgid \"Hello\"\nmsgstr \"Bonjour\""));
    assert!(merged.contains("msgid \"Bye\"\nmsgstr \"Salut\""));
    assert!(merged.contains("msgid \"Custom\""));

    let json: serde_json::Value = serde_json::from_str(&test.read_file(&format!("translations/{FR_JSON}"))?)?;
    assert_eq!(json["k1"], "bonjour");
    assert_eq!(json["k2"], "x");
    assert!(!test.exists("translations/stale.po"));
    Ok(())
}

#[test]
fn test_merge_warns_about_malformed_custom() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    let upstream = po(&[("Hello", "Bonjour")]);
    test.write_file(&format!("translations-upstream/{FR}"), &upstream)?;
    test.write_file(&format!("translations-custom/{FR}"), "msgid \"Hello\"\n")?;

    let output = test.run(&["merge-final"])?;
    assert!(output.status.success());
    assert!(stderr(&output).contains("warning: 1 file was skipped"));
    assert_eq!(test.read_file(&format!("translations/{FR}"))?, upstream);
    Ok(())
}

#[test]
fn test_merge_requires_custom_layer() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.mkdir("translations-upstream")?;

    let output = test.run(&["merge_final"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("custom directory"));
    Ok(())
}

#[test]
fn test_merge_rejects_final_dir_override_matching_custom() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.mkdir("translations-upstream")?;
    test.write_file(&format!("translations-custom/{FR}"), &po(&[]))?;

    let output = test.run(&["merge_final", "--final-dir", "translations-custom"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(test.exists(&format!("translations-custom/{FR}")));
    Ok(())
}
