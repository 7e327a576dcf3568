use anyhow::Result;

use crate::{CliTest, NO_CHECKER_CONFIG, po, stderr, stdout};

#[test]
fn test_normalize_moves_and_merges_aliases() -> Result<()> {
    let test = CliTest::with_config(NO_CHECKER_CONFIG)?;
    test.write_file(
        "translations-custom/repoA/conf/locale/pt-br/LC_MESSAGES/django.po",
        &po(&[("Hello", "Olá")]),
    )?;
    test.write_file(
        "translations-custom/mfe/src/i18n/messages/zh-hans.json",
        r#"{"a": "甲", "b": "乙"}"#,
    )?;
    test.write_file(
        "translations-custom/mfe/src/i18n/messages/zh_CN.json",
        r#"{"a": "", "c": "丙"}"#,
    )?;

    let output = test.run(&["normalize"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Normalized 2 of 2 locale aliases"));

    assert!(!test.exists("translations-custom/repoA/conf/locale/pt-br"));
    assert!(test.exists("translations-custom/repoA/conf/locale/pt_BR/LC_MESSAGES/django.po"));
    assert!(!test.exists("translations-custom/mfe/src/i18n/messages/zh-hans.json"));

    let json: serde_json::Value =
        serde_json::from_str(&test.read_file("translations-custom/mfe/src/i18n/messages/zh_CN.json")?)?;
    assert_eq!(json["a"], "甲");
    assert_eq!(json["b"], "乙");
    assert_eq!(json["c"], "丙");

    let again = test.run(&["normalize"])?;
    assert!(stdout(&again).contains("No locale aliases found"));
    Ok(())
}

#[test]
fn test_normalize_uses_configured_aliases() -> Result<()> {
    let test = CliTest::with_config(r#"{ "checker": [], "localeAliases": { "es-419": "es_419" } }"#)?;
    test.write_file("translations-custom/mfe/src/i18n/messages/es-419.json", r#"{"a": "b"}"#)?;
    test.write_file("translations-custom/mfe/src/i18n/messages/pt-br.json", r#"{"a": "b"}"#)?;

    let output = test.run(&["normalize"])?;
    assert!(output.status.success());
    assert!(test.exists("translations-custom/mfe/src/i18n/messages/es_419.json"));
    assert!(test.exists("translations-custom/mfe/src/i18n/messages/pt-br.json"));
    Ok(())
}
