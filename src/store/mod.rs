//! File-backed store for the singleton content records.
//!
//! The store is a single JSON document grouping records by kind and key:
//!
//! ```json
//! {
//!   "site_settings": { "1": { "header_tagline": "..." } },
//!   "home_page":     { "1": { "hero_cta_text": "..." } }
//! }
//! ```
//!
//! Records are created by an explicit [`SiteStore::seed`] step (run by
//! `yoga init`); [`SiteStore::get_or_create`] still fills in a missing record
//! so a fresh checkout renders without seeding first.

mod models;

pub use models::{HomePage, ImageRef, SINGLETON_KEY, SiteSettings, Singleton};

use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Store-related errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("store file `{0}` is not valid JSON")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("stored `{0}` record is malformed")]
    Record(&'static str, #[source] serde_json::Error),

    #[error("`{0}` has no field `{1}`")]
    UnknownField(&'static str, String),

    #[error("{0}")]
    Validation(String),
}

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// JSON-file store addressed by record kind and fixed key.
#[derive(Debug)]
pub struct SiteStore {
    path: PathBuf,
    records: Collections,
}

impl SiteStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let records = if path.exists() {
            let content =
                fs::read_to_string(path).map_err(|err| StoreError::Io(path.to_path_buf(), err))?;
            serde_json::from_str(&content)
                .map_err(|err| StoreError::Json(path.to_path_buf(), err))?
        } else {
            Collections::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Insert default records for every singleton kind that is missing.
    ///
    /// Returns the verbose names of the records created. Persists only when
    /// something was inserted.
    pub fn seed(&mut self) -> Result<Vec<&'static str>, StoreError> {
        let mut created = Vec::new();
        if self.insert_default::<SiteSettings>()? {
            created.push(SiteSettings::VERBOSE_NAME);
        }
        if self.insert_default::<HomePage>()? {
            created.push(HomePage::VERBOSE_NAME);
        }
        if !created.is_empty() {
            self.save()?;
        }
        Ok(created)
    }

    /// Read a record without creating it.
    pub fn get<T: Singleton>(&self) -> Result<Option<T>, StoreError> {
        self.records
            .get(T::KIND)
            .and_then(|records| records.get(SINGLETON_KEY))
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|err| StoreError::Record(T::KIND, err))
            })
            .transpose()
    }

    /// Read a record, creating and persisting its defaults when absent.
    pub fn get_or_create<T: Singleton>(&mut self) -> Result<T, StoreError> {
        if let Some(record) = self.get::<T>()? {
            return Ok(record);
        }
        self.insert_default::<T>()?;
        self.save()?;
        Ok(T::default())
    }

    /// Mutate a record in place and persist it.
    ///
    /// The stored record is left untouched when `f` fails.
    pub fn update<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        T: Singleton,
        F: FnOnce(&mut T) -> Result<(), StoreError>,
    {
        let mut record = self.get::<T>()?.unwrap_or_default();
        f(&mut record)?;
        self.put(&record)?;
        self.save()?;
        Ok(record)
    }

    /// Write the whole store file, creating parent directories.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::Io(parent.to_path_buf(), err))?;
        }
        let content = serde_json::to_string_pretty(&self.records)
            .map_err(|err| StoreError::Json(self.path.clone(), err))?;
        fs::write(&self.path, content).map_err(|err| StoreError::Io(self.path.clone(), err))
    }

    fn insert_default<T: Singleton>(&mut self) -> Result<bool, StoreError> {
        if self.get::<T>()?.is_some() {
            return Ok(false);
        }
        self.put(&T::default())?;
        Ok(true)
    }

    fn put<T: Singleton>(&mut self, record: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(record).map_err(|err| StoreError::Record(T::KIND, err))?;
        self.records
            .entry(T::KIND.to_owned())
            .or_default()
            .insert(SINGLETON_KEY.to_owned(), value);
        Ok(())
    }
}
