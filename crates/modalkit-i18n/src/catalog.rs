//! String catalog with locale fallback and interpolation.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: a lookup tries the exact locale, then
//!    its language prefix (`zh-TW` → `zh`), then each configured fallback
//!    locale once, returning `None` if nothing provides the key.
//!
//! 2. **Interpolation is single-pass**: `format()` replaces `{name}` tokens
//!    in one pass; substituted values are never re-scanned.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any locale | Returns `None` |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Bad interpolation arg | `{name}` but no `name` arg | Token left as-is |
//! | Malformed tag | `try_add_locale("en__US", ..)` | `I18nError::InvalidLocale` |

use ahash::AHashMap;

/// Locale identifier (e.g., `"en"`, `"zh-TW"`).
pub type Locale = String;

/// Errors from i18n operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum I18nError {
    /// A locale tag was malformed.
    #[error("invalid locale: {0}")]
    InvalidLocale(String),
    /// Duplicate key in the same locale.
    #[error("duplicate key '{key}' in locale '{locale}'")]
    DuplicateKey { locale: String, key: String },
}

/// Strings for a single locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleStrings {
    strings: AHashMap<String, String>,
}

impl LocaleStrings {
    /// Create an empty locale string set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs, rejecting repeated keys.
    pub fn from_pairs<'a>(
        locale: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, I18nError> {
        let mut strings = Self::new();
        for (key, value) in pairs {
            if strings.strings.contains_key(key) {
                return Err(I18nError::DuplicateKey {
                    locale: locale.to_owned(),
                    key: key.to_owned(),
                });
            }
            strings.insert(key, value);
        }
        Ok(strings)
    }

    /// Insert a string, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Central string catalog with locale fallback.
///
/// # Example
///
/// ```
/// use modalkit_i18n::catalog::{LocaleStrings, StringCatalog};
///
/// let mut catalog = StringCatalog::new();
/// let mut en = LocaleStrings::new();
/// en.insert("greeting", "Hello, {name}!");
/// catalog.add_locale("en", en);
/// catalog.set_fallback_chain(vec!["en".into()]);
///
/// assert_eq!(
///     catalog.format("fr", "greeting", &[("name", "Ana")]),
///     Some("Hello, Ana!".into())
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    locales: AHashMap<Locale, LocaleStrings>,
    fallback_chain: Vec<Locale>,
}

impl StringCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add strings for a locale, replacing any previous set.
    pub fn add_locale(&mut self, locale: impl Into<String>, strings: LocaleStrings) {
        self.locales.insert(locale.into(), strings);
    }

    /// Add strings for a locale after validating the tag.
    pub fn try_add_locale(
        &mut self,
        locale: impl Into<String>,
        strings: LocaleStrings,
    ) -> Result<(), I18nError> {
        let locale = locale.into();
        validate_locale(&locale)?;
        self.add_locale(locale, strings);
        Ok(())
    }

    /// Set the fallback chain (tried in order when a key is missing).
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// Look up a string by key.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        let lookup = |tag: &str| self.locales.get(tag).and_then(|ls| ls.get(key));

        if let Some(found) = lookup(locale) {
            return Some(found);
        }
        let language = language_of(locale);
        if language != locale
            && let Some(found) = lookup(language)
        {
            return Some(found);
        }
        self.fallback_chain
            .iter()
            .filter(|tag| tag.as_str() != locale && tag.as_str() != language)
            .find_map(|tag| lookup(tag.as_str()))
    }

    /// Look up a string and perform `{name}` interpolation.
    #[must_use]
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> Option<String> {
        self.get(locale, key)
            .map(|template| interpolate(template, args))
    }

    /// All registered locale tags.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }
}

/// The primary language subtag (`"zh-TW"` → `"zh"`).
#[must_use]
pub fn language_of(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

/// Check a BCP-47-shaped tag: a 2–3 letter language followed by
/// alphanumeric subtags of 1–8 characters, separated by `-`.
pub fn validate_locale(locale: &str) -> Result<(), I18nError> {
    let invalid = || I18nError::InvalidLocale(locale.to_owned());
    let mut parts = locale.split('-');
    let language = parts.next().ok_or_else(invalid)?;
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    for part in parts {
        if !(1..=8).contains(&part.len()) || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Single-pass `{name}` interpolation. Unmatched tokens left as-is.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let token = &after[..close];
                match args.iter().find(|(name, _)| *name == token) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        result.push('{');
                        result.push_str(token);
                        result.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                result.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}
