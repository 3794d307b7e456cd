//! Locale-keyed word lookup service.
//!
//! Membership checks happen on every submitted turn, so the sets live in
//! memory. Loads replace a locale's set wholesale: the new set is built off
//! to the side and swapped in under a short writer lock.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::sync::{Arc, RwLock};

use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;

#[derive(Clone, Default)]
pub struct Dictionary {
    locales: Arc<RwLock<HashMap<String, Arc<HashSet<String>>>>>,
}

impl Dictionary {
    /// Case-insensitive membership check.
    pub fn contains(&self, word: &str, locale: &str) -> bool {
        let needle = word.trim().to_lowercase();
        let locales = self
            .locales
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locales
            .get(locale)
            .map(|set| set.contains(&needle))
            .unwrap_or(false)
    }

    /// Replace a locale's word set with the contents of a line-oriented
    /// reader. Returns the number of distinct words loaded.
    pub fn load<R: BufRead>(&self, locale: &str, source: R) -> Result<usize, AppError> {
        let mut set = HashSet::new();
        for line in source.lines() {
            let line = line.map_err(|e| AppError::Serialization(e.to_string()))?;
            let word = line.trim().to_lowercase();
            if !word.is_empty() {
                set.insert(word);
            }
        }
        let count = set.len();
        self.swap(locale, set);
        Ok(count)
    }

    /// Pull every persisted locale from the `word` table into memory.
    /// Returns the total number of words loaded across locales.
    pub async fn warm(&self, pool: &PgPool) -> Result<usize, AppError> {
        let mut total = 0;
        for locale in db::word::locales(pool).await? {
            let words = db::word::for_locale(pool, &locale).await?;
            total += words.len();
            self.swap(&locale, words.into_iter().collect());
        }
        Ok(total)
    }

    fn swap(&self, locale: &str, set: HashSet<String>) {
        let mut locales = self
            .locales
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locales.insert(locale.to_string(), Arc::new(set));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_and_contains() {
        let dict = Dictionary::default();
        let count = dict.load("en", Cursor::new("apple\nElephant\n\n  tiger  \n")).unwrap();
        assert_eq!(count, 3);

        assert!(dict.contains("apple", "en"));
        assert!(dict.contains("APPLE", "en"));
        assert!(dict.contains("elephant", "en"));
        assert!(!dict.contains("banana", "en"));
        assert!(!dict.contains("apple", "fr"));
    }

    #[test]
    fn test_load_replaces_locale() {
        let dict = Dictionary::default();
        dict.load("en", Cursor::new("apple")).unwrap();
        dict.load("en", Cursor::new("banana")).unwrap();

        assert!(!dict.contains("apple", "en"));
        assert!(dict.contains("banana", "en"));
    }

    #[test]
    fn test_duplicate_lines_counted_once() {
        let dict = Dictionary::default();
        let count = dict.load("en", Cursor::new("apple\nAPPLE\napple")).unwrap();
        assert_eq!(count, 1);
    }
}
