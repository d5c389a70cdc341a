use invoke_itself::app::locale::CatalogTranslator;
use invoke_itself::app::trigger::TriggerEvent;
use invoke_itself::app::EventOutcome;
use invoke_itself::app::registry::TargetRegistry;
use invoke_itself::{AppConfig, Application};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_catalog(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(format!("{}.json", name)), body).unwrap();
}

fn app_in(dir: &Path, locale: &str) -> Application {
    let config = AppConfig {
        translations_dir: dir.to_path_buf(),
        locale: Some(locale.to_string()),
        ..AppConfig::default()
    };
    Application::new(
        config,
        Arc::new(TargetRegistry::default()),
        Box::new(CatalogTranslator::new()),
    )
    .unwrap()
}

#[test]
fn startup_loads_catalog_for_configured_locale() {
    let temp = TempDir::new().unwrap();
    write_catalog(temp.path(), "InvokeItself_de_DE", r#"{"Invoke": "Aufrufen"}"#);

    let app = app_in(temp.path(), "de_DE");
    assert!(app.locale().is_installed());
    assert_eq!(app.translations().tr("Invoke"), "Aufrufen");
}

#[test]
fn locale_change_swaps_translations() {
    let temp = TempDir::new().unwrap();
    write_catalog(temp.path(), "InvokeItself_de", r#"{"Invoke": "Aufrufen"}"#);
    write_catalog(temp.path(), "InvokeItself_fr", r#"{"Invoke": "Invoquer"}"#);

    let mut app = app_in(temp.path(), "de_AT");
    let translations = app.translations();
    assert_eq!(translations.tr("Invoke"), "Aufrufen");

    let outcome = app.handle(TriggerEvent::LocaleChanged("fr_BE".to_string()));
    assert!(matches!(
        outcome,
        EventOutcome::LocaleChanged { installed: true, .. }
    ));
    assert_eq!(translations.tr("Invoke"), "Invoquer");
}

#[test]
fn missing_catalog_leaves_nothing_installed() {
    let temp = TempDir::new().unwrap();
    write_catalog(temp.path(), "InvokeItself_fr", r#"{"Invoke": "Invoquer"}"#);

    let mut app = app_in(temp.path(), "fr_FR");
    assert!(app.locale().is_installed());

    let outcome = app.handle(TriggerEvent::LocaleChanged("ko_KR".to_string()));
    assert!(matches!(
        outcome,
        EventOutcome::LocaleChanged { installed: false, .. }
    ));
    assert!(!app.locale().is_installed());
    assert_eq!(app.translations().tr("Invoke"), "Invoke");
}
