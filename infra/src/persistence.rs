use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use err_derive::Error;
use log::*;

use crate::documents::Document;

#[derive(Debug, Error, PartialEq, Eq)]
#[error(display = "invalid storage key: {:?}", _0)]
pub struct InvalidKey(pub String);

/// String-keyed, string-valued storage. Each key is independent of the
/// others; nothing here offers a transaction spanning several keys.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed access to [`Storage`], serializing each document as JSON.
pub trait Documents {
    fn load<D: Document>(&self) -> Result<Option<D>>;
    fn save<D: Document>(&self, document: &D) -> Result<()>;
    fn forget<D: Document>(&self) -> Result<()>;
}

impl<S: Storage + ?Sized> Documents for S {
    fn load<D: Document>(&self) -> Result<Option<D>> {
        match self.get(D::KEY)? {
            Some(json) => {
                let doc = serde_json::from_str(&json)
                    .with_context(|| format!("decode stored document {}", D::KEY))?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    fn save<D: Document>(&self, document: &D) -> Result<()> {
        let json = serde_json::to_string(document)
            .with_context(|| format!("encode document {}", D::KEY))?;
        self.set(D::KEY, &json)?;
        debug!("Saved {} ({} bytes)", D::KEY, json.len());
        Ok(())
    }

    fn forget<D: Document>(&self) -> Result<()> {
        self.remove(D::KEY)
    }
}

impl<'a, S: Storage + ?Sized> Storage for &'a S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> Result<R> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        Ok(f(&mut entries))
    }
}

impl Storage for MemStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(|e| e.get(key).cloned())
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|e| {
            e.insert(key.to_string(), value.to_string());
        })
    }
    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|e| {
            e.remove(key);
        })
    }
}

/// Keeps each key in `<dir>/<key>.json`. A write goes to a temporary file
/// first and is renamed into place, so a reader sees either the old or the
/// new value of a key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("create storage dir {:?}", dir))?;
        debug!("File storage at {:?}", dir);
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(InvalidKey(key.to_string()).into());
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {:?}", path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        {
            let mut f = fs::File::create(&tmp).with_context(|| format!("create {:?}", tmp))?;
            f.write_all(value.as_bytes())
                .with_context(|| format!("write {:?}", tmp))?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &path).with_context(|| format!("rename {:?} to {:?}", tmp, path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {:?}", path)),
        }
    }
}
