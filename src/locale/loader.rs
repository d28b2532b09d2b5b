//! Reading locale dictionaries and override files from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use super::{Collection, EntityRef, Mapping, merge};
use crate::{debug, log};

/// Failure to produce data for a template.
///
/// Never fatal on its own: the build substitutes an empty mapping.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("locale data `{0}` not found")]
    Missing(PathBuf),

    #[error("IO error when reading `{0}`")]
    Read(PathBuf, #[source] io::Error),

    #[error("invalid JSON in `{0}`")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("`{0}` does not contain a JSON object")]
    NotObject(PathBuf),
}

/// Path layout of the locales directory.
#[derive(Debug, Clone, Default)]
pub struct LocaleDirs {
    /// `locales/` root
    root: PathBuf,
}

impl LocaleDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `locales/{lang}.json`
    pub fn dictionary(&self, lang: &str) -> PathBuf {
        self.root.join(format!("{lang}.json"))
    }

    /// `locales/{lang}/...` override path for an entity.
    pub fn override_file(&self, lang: &str, entity: &EntityRef) -> PathBuf {
        self.root.join(lang).join(entity.override_path())
    }

    /// `locales/{lang}/{collection}/`
    pub fn collection_dir(&self, lang: &str, collection: Collection) -> PathBuf {
        self.root.join(lang).join(collection.as_str())
    }
}

/// Load the merged data for `lang`, optionally overlaid with an entity's
/// override file.
///
/// A missing dictionary is an error; a missing override file is not.
pub fn load_locale_data(
    dirs: &LocaleDirs,
    lang: &str,
    entity: Option<&EntityRef>,
) -> Result<Mapping, DataLoadError> {
    let dictionary = read_mapping(&dirs.dictionary(lang))?;
    let Some(entity) = entity else {
        return Ok(dictionary);
    };
    overlay_entity(dirs, lang, &dictionary, entity)
}

/// Overlay an entity override onto an already loaded dictionary.
pub fn overlay_entity(
    dirs: &LocaleDirs,
    lang: &str,
    dictionary: &Mapping,
    entity: &EntityRef,
) -> Result<Mapping, DataLoadError> {
    let path = dirs.override_file(lang, entity);
    if !path.is_file() {
        debug!("data"; "no override for {} in {}", entity, lang);
        return Ok(dictionary.clone());
    }
    let overrides = read_mapping(&path)?;
    Ok(merge(dictionary, &overrides))
}

/// Best-effort variant of [`load_locale_data`]: log and fall back to an
/// empty mapping.
pub fn load_or_empty(dirs: &LocaleDirs, lang: &str, entity: Option<&EntityRef>) -> Mapping {
    match load_locale_data(dirs, lang, entity) {
        Ok(data) => data,
        Err(e) => {
            report(lang, entity, &e);
            Mapping::new()
        }
    }
}

pub(crate) fn report(lang: &str, entity: Option<&EntityRef>, error: &DataLoadError) {
    match entity {
        Some(entity) => log!("data"; "could not load data for {} in {}: {}", entity, lang, error),
        None => log!("data"; "could not load dictionary for {}: {}", lang, error),
    }
}

/// Read a JSON file that must hold an object.
fn read_mapping(path: &Path) -> Result<Mapping, DataLoadError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataLoadError::Missing(path.to_path_buf()),
        _ => DataLoadError::Read(path.to_path_buf(), e),
    })?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| DataLoadError::Parse(path.to_path_buf(), e))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DataLoadError::NotObject(path.to_path_buf())),
    }
}

/// Every `*.json` file directly inside the locales directory is a locale.
pub fn discover_locales(dirs: &LocaleDirs) -> io::Result<Vec<String>> {
    let mut langs: Vec<String> = fs::read_dir(dirs.root())?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    langs.sort();
    Ok(langs)
}

/// Entry ids of a collection in one locale, sorted.
///
/// A missing collection directory just means the locale has no entries.
pub fn collection_entries(dirs: &LocaleDirs, lang: &str, collection: Collection) -> Vec<String> {
    let dir = dirs.collection_dir(lang, collection);
    let Ok(read_dir) = fs::read_dir(&dir) else {
        debug!("data"; "no {} data for {}", collection, lang);
        return Vec::new();
    };

    let mut ids: Vec<String> = read_dir
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    ids.sort();
    ids
}
