use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use err_derive::Error;
use log::*;
use serde_json::Value;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(display = "fetching {}: unexpected status {}", _0, _1)]
    Status(Url, u16),
    #[error(display = "unsupported source scheme: {:?}", _0)]
    UnsupportedScheme(String),
}

/// Read-only access to JSON resources that do not change for the lifetime
/// of a session. Each resource is expected to be fetched at most once.
pub trait Source {
    fn fetch(&self, resource: &str) -> Result<Value>;
}

impl<'a, S: Source + ?Sized> Source for &'a S {
    fn fetch(&self, resource: &str) -> Result<Value> {
        (**self).fetch(resource)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn fetch(&self, resource: &str) -> Result<Value> {
        (**self).fetch(resource)
    }
}

#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirSource { root: root.into() }
    }
}

impl Source for DirSource {
    fn fetch(&self, resource: &str) -> Result<Value> {
        let path = self.root.join(resource);
        debug!("Fetch {:?}", path);
        let content = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        let value = serde_json::from_str(&content).with_context(|| format!("parse {:?}", path))?;
        Ok(value)
    }
}

#[derive(Debug)]
pub struct HttpSource {
    base: Url,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(mut base: Url) -> Result<Self> {
        // `Url::join` replaces the last path segment unless it ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(HttpSource { base, client })
    }

    fn url_for(&self, resource: &str) -> Result<Url> {
        self.base
            .join(resource)
            .with_context(|| format!("resolve {} against {}", resource, self.base))
    }
}

impl Source for HttpSource {
    fn fetch(&self, resource: &str) -> Result<Value> {
        let url = self.url_for(resource)?;
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {}", url))?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(url, resp.status().as_u16()).into());
        }
        let value = resp
            .json::<Value>()
            .with_context(|| format!("decode body of {}", url))?;
        Ok(value)
    }
}

/// Picks a source implementation from the scheme of `url`.
pub fn source_for(url: &Url) -> Result<Box<dyn Source>> {
    match url.scheme() {
        "file" => {
            let root = url
                .to_file_path()
                .map_err(|()| anyhow!("not a local path: {}", url))?;
            Ok(Box::new(DirSource::new(root)))
        }
        "http" | "https" => Ok(Box::new(HttpSource::new(url.clone())?)),
        other => Err(FetchError::UnsupportedScheme(other.to_string()).into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn dir_source_reads_json_resources() {
        env_logger::try_init().unwrap_or_default();
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("menu_db.json"), r#"{"platos_principales": []}"#)
            .expect("write");

        let source = DirSource::new(dir.path());
        let value = source.fetch("menu_db.json").expect("fetch");

        assert_eq!(value, json!({ "platos_principales": [] }));
    }

    #[test]
    fn dir_source_fails_on_missing_or_malformed_resources() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.json"), "{").expect("write");
        let source = DirSource::new(dir.path());

        assert!(source.fetch("absent.json").is_err());
        assert!(source.fetch("broken.json").is_err());
    }

    #[test]
    fn file_urls_map_to_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("logros_db.json"), r#"{"logros": []}"#).expect("write");
        let url = Url::from_directory_path(dir.path()).expect("url");

        let source = source_for(&url).expect("source");
        assert_eq!(source.fetch("logros_db.json").expect("fetch"), json!({"logros": []}));
    }

    #[test]
    fn should_reject_unknown_schemes() {
        let url = Url::parse("ftp://example.org/data/").expect("url");
        let err = source_for(&url).err().expect("should fail");

        match err.downcast_ref::<FetchError>() {
            Some(FetchError::UnsupportedScheme(scheme)) => assert_eq!(scheme, "ftp"),
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn http_resources_resolve_below_the_base_directory() {
        let base = Url::parse("https://example.org/calendario/data").expect("url");
        let source = HttpSource::new(base).expect("source");

        assert_eq!(
            source.url_for("menu_db.json").expect("join").as_str(),
            "https://example.org/calendario/data/menu_db.json"
        );
    }
}
