//! Bilingual label dictionary embedded in the HTML report.
//!
//! Every element of the report that carries a `data-i18n-key` attribute must
//! name a key in [`TRANSLATIONS`]; the client-side toggle swaps the element's
//! text between the `en` and `ru` columns.

use crate::config::Locale;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub key: &'static str,
    pub en: &'static str,
    pub ru: &'static str,
}

const fn entry(key: &'static str, en: &'static str, ru: &'static str) -> Translation {
    Translation { key, en, ru }
}

pub const TRANSLATIONS: &[Translation] = &[
    entry("report-title", "SonarQube Security Report", "Отчёт безопасности SonarQube"),
    entry("report-date-title", "Generated on:", "Отчет сгенерирован:"),
    entry("version", "version", "версия"),
    entry("total-issues", "Total Issues", "Всего уязвимостей"),
    entry("vulnerabilities", "Vulnerabilities", "Уязвимости"),
    entry("bugs", "Bugs", "Баги"),
    entry("code-smells", "Code Smells", "Код с запашком"),
    entry("severity-distribution", "Severity Distribution", "Распределение по серьёзности"),
    entry("status-distribution", "Status Distribution", "Распределение по статусам"),
    entry("severity", "Severity", "Серьёзность"),
    entry("status", "Status", "Статус"),
    entry("count", "Count", "Количество"),
    entry("percentage", "Percentage", "Процент"),
    entry("severity-BLOCKER", "BLOCKER", "НАИВЫСШАЯ"),
    entry("severity-CRITICAL", "CRITICAL", "КРИТИЧЕСКАЯ"),
    entry("severity-MAJOR", "MAJOR", "ВЫСОКАЯ"),
    entry("severity-MINOR", "MINOR", "НИЗКАЯ"),
    entry("severity-INFO", "INFO", "ИНФО"),
    entry("severity-UNKNOWN", "UNKNOWN", "НЕИЗВЕСТНО"),
    entry("status-OPEN", "OPEN", "Не обработано"),
    entry("status-CONFIRMED", "CONFIRMED", "Подтверждено"),
    entry("status-REOPENED", "REOPENED", "Открыто повторно"),
    entry("status-RESOLVED", "RESOLVED", "Решено"),
    entry("status-CLOSED", "CLOSED", "Закрыто"),
    entry("status-ACCEPTED", "ACCEPTED", "Принято"),
    entry("status-FALSE_POSITIVE", "FALSE POSITIVE", "Ложное срабатывание"),
    entry("status-FIXED", "FIXED", "Исправлено"),
    entry("status-UNKNOWN", "UNKNOWN", "НЕИЗВЕСТНО"),
    entry("category-header-VULNERABILITY", "Vulnerabilities", "Уязвимости"),
    entry("category-header-BUG", "Bugs", "Баги"),
    entry("category-header-CODE_SMELL", "Code smells", "Код с запашком"),
    entry("issue-description", "Issue Description", "Описание ошибки"),
    entry("key", "Key", "Ключ-идентификатор"),
    entry("type", "Type", "Тип"),
    entry("author", "Author", "Автор кода"),
    entry("rule", "Rule", "Правило"),
    entry("language", "Language", "Язык"),
    entry("source-code", "Source Code", "Исходный код"),
    entry("comments", "Comments", "Комментарии"),
    entry("unknown-date", "Unknown date", "Дата неизвестна"),
];

pub fn find(key: &str) -> Option<&'static Translation> {
    TRANSLATIONS.iter().find(|t| t.key == key)
}

pub fn has_key(key: &str) -> bool {
    find(key).is_some()
}

pub fn severity_key(label: &str) -> String {
    format!("severity-{label}")
}

pub fn status_key(label: &str) -> String {
    format!("status-{label}")
}

/// The dictionary as `{"en": {key: text}, "ru": {key: text}}`
pub fn dictionary_json() -> Value {
    let mut en = Map::new();
    let mut ru = Map::new();
    for t in TRANSLATIONS {
        en.insert(t.key.to_string(), Value::String(t.en.to_string()));
        ru.insert(t.key.to_string(), Value::String(t.ru.to_string()));
    }

    let mut root = Map::new();
    root.insert(Locale::En.code().to_string(), Value::Object(en));
    root.insert(Locale::Ru.code().to_string(), Value::Object(ru));
    Value::Object(root)
}
