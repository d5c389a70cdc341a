//! Translation catalogs and locale-change handling
//!
//! On every locale change the installed translator is removed and the catalog
//! named `<app_name>_<locale>` is loaded from the translations directory. A
//! missing file falls back to shorter locales (`App_en_US` → `App_en` → `App`),
//! never cutting into the app name itself.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

/// Catalog file extension
pub const CATALOG_EXTENSION: &str = "json";

/// Locale used when the environment names none
pub const DEFAULT_LOCALE: &str = "en_US";

/// Loads and serves translations
pub trait Translator: Send + Sync {
    /// Load the catalog `file_name` from `dir`, replacing any loaded entries
    fn load(&mut self, file_name: &str, dir: &Path) -> bool;

    /// Translate `text`, returning it unchanged when there is no entry
    fn translate(&self, text: &str) -> String;

    /// Whether no entries are loaded
    fn is_empty(&self) -> bool;
}

/// Translator backed by JSON `{ "source": "translation" }` catalogs
#[derive(Debug, Default, Clone)]
pub struct CatalogTranslator {
    entries: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl CatalogTranslator {
    /// Create an empty translator
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the catalog that was loaded last
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn read_catalog(path: &Path) -> anyhow::Result<HashMap<String, String>> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read catalog: {:?}", path))?;
        let entries = serde_json::from_slice(&data)
            .with_context(|| format!("Failed to parse catalog: {:?}", path))?;
        Ok(entries)
    }
}

impl Translator for CatalogTranslator {
    fn load(&mut self, file_name: &str, dir: &Path) -> bool {
        self.entries.clear();
        self.source = None;

        let path = dir.join(format!("{}.{}", file_name, CATALOG_EXTENSION));
        if !path.is_file() {
            return false;
        }

        match Self::read_catalog(&path) {
            Ok(entries) => {
                tracing::debug!(catalog = ?path, entries = entries.len(), "catalog loaded");
                self.entries = entries;
                self.source = Some(path);
                true
            }
            Err(err) => {
                tracing::warn!("{:#}", err);
                false
            }
        }
    }

    fn translate(&self, text: &str) -> String {
        self.entries
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog names to try for `locale`: `App_en_US`, `App_en`, then `App`
fn candidate_names(app_name: &str, locale: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = locale;
    while !rest.is_empty() {
        names.push(format!("{}_{}", app_name, rest));
        rest = match rest.rfind('_') {
            Some(idx) => &rest[..idx],
            None => "",
        };
    }
    names.push(app_name.to_string());
    names
}

/// Process locale from `LC_ALL`, `LC_MESSAGES` or `LANG`
pub fn system_locale() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| normalize_locale(&value))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Strip encoding and modifier: `de_DE.UTF-8@euro` → `de_DE`
pub fn normalize_locale(raw: &str) -> Option<String> {
    let name = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace('-', "_");

    match name.as_str() {
        "" | "C" | "POSIX" => None,
        _ => Some(name),
    }
}

/// Reloads the app's translator whenever the system language changes
pub struct LocaleHandler {
    app_name: String,
    dir: PathBuf,
    translator: Box<dyn Translator>,
    installed: Arc<RwLock<Option<Box<dyn Translator>>>>,
    locale: Option<String>,
}

impl LocaleHandler {
    /// Create a handler loading `<app_name>_<locale>` catalogs from `dir`
    pub fn new(
        app_name: impl Into<String>,
        dir: impl Into<PathBuf>,
        translator: Box<dyn Translator>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            dir: dir.into(),
            translator,
            installed: Arc::new(RwLock::new(None)),
            locale: None,
        }
    }

    /// Catalog file name for `locale`
    pub fn file_name(&self, locale: &str) -> String {
        format!("{}_{}", self.app_name, locale)
    }

    /// Locale of the most recent change, if any
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Remove the installed translator, then load and install the catalog for `locale`
    ///
    /// Returns whether a catalog was installed.
    pub fn on_system_language_changed(&mut self, locale: &str) -> bool {
        if let Some(previous) = self.installed.write().take() {
            self.translator = previous;
        }
        self.locale = Some(locale.to_string());

        let dir = &self.dir;
        let translator = &mut self.translator;
        let found = candidate_names(&self.app_name, locale)
            .into_iter()
            .any(|name| translator.load(&name, dir));
        if !found {
            let file_name = self.file_name(locale);
            tracing::debug!(locale, file = %file_name, dir = ?self.dir, "no catalog for locale");
            return false;
        }

        let loaded = std::mem::replace(&mut self.translator, Box::new(CatalogTranslator::new()));
        *self.installed.write() = Some(loaded);
        tracing::debug!(locale, "translator installed");
        true
    }

    /// Whether a translator is currently installed
    pub fn is_installed(&self) -> bool {
        self.installed.read().is_some()
    }

    /// Shared view of the installed translations
    pub fn translations(&self) -> Translations {
        Translations {
            installed: self.installed.clone(),
        }
    }
}

/// Cheap handle for translating UI strings with whatever is installed
#[derive(Clone)]
pub struct Translations {
    installed: Arc<RwLock<Option<Box<dyn Translator>>>>,
}

impl Translations {
    /// Translate `text`, or return it unchanged
    pub fn tr(&self, text: &str) -> String {
        match self.installed.read().as_ref() {
            Some(translator) => translator.translate(text),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_catalog(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(format!("{}.json", name)), body).unwrap();
    }

    #[test]
    fn test_candidate_names() {
        assert_eq!(
            candidate_names("InvokeItself", "en_US"),
            vec!["InvokeItself_en_US", "InvokeItself_en", "InvokeItself"]
        );
        assert_eq!(
            candidate_names("Invoke_Itself", "fr"),
            vec!["Invoke_Itself_fr", "Invoke_Itself"]
        );
    }

    #[test]
    fn test_fallback_stops_at_app_name() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "Invoke", r#"{"Invoke": "Wrong"}"#);

        let mut handler =
            LocaleHandler::new("Invoke_Itself", temp.path(), Box::new(CatalogTranslator::new()));
        assert!(!handler.on_system_language_changed("fr"));
        assert_eq!(handler.translations().tr("Invoke"), "Invoke");

        write_catalog(temp.path(), "Invoke_Itself", r#"{"Invoke": "Default"}"#);
        assert!(handler.on_system_language_changed("fr"));
        assert_eq!(handler.translations().tr("Invoke"), "Default");
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("de_DE.UTF-8@euro").as_deref(), Some("de_DE"));
        assert_eq!(normalize_locale("fr-CA").as_deref(), Some("fr_CA"));
        assert_eq!(normalize_locale("C"), None);
        assert_eq!(normalize_locale(""), None);
    }

    #[test]
    fn test_catalog_loads_exact_name() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "InvokeItself_fr", r#"{"Invoke": "Invoquer"}"#);

        let mut translator = CatalogTranslator::new();
        assert!(!translator.load("InvokeItself_fr_CA", temp.path()));
        assert!(translator.load("InvokeItself_fr", temp.path()));
        assert_eq!(translator.translate("Invoke"), "Invoquer");
        assert_eq!(translator.translate("Other"), "Other");
        assert!(translator.source().unwrap().ends_with("InvokeItself_fr.json"));
    }

    #[test]
    fn test_malformed_catalog_fails() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "InvokeItself_de", "not json");

        let mut translator = CatalogTranslator::new();
        assert!(!translator.load("InvokeItself_de", temp.path()));
        assert!(translator.is_empty());
    }

    #[test]
    fn test_language_change_reinstalls() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "InvokeItself_fr", r#"{"Invoke": "Invoquer"}"#);

        let mut handler =
            LocaleHandler::new("InvokeItself", temp.path(), Box::new(CatalogTranslator::new()));
        let translations = handler.translations();

        assert!(handler.on_system_language_changed("fr_FR"));
        assert!(handler.is_installed());
        assert_eq!(translations.tr("Invoke"), "Invoquer");

        assert!(!handler.on_system_language_changed("ja_JP"));
        assert!(!handler.is_installed());
        assert_eq!(translations.tr("Invoke"), "Invoke");
        assert_eq!(handler.locale(), Some("ja_JP"));
    }
}
