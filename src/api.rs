// 📡 Data Access - read the static creature list from a file or URL

use crate::creature::Creature;
use crate::filter::SearchPattern;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Default location of the data file, relative to the working directory
pub const DEFAULT_SOURCE: &str = "data/pokemon.json";

/// Path the server publishes the data file under
pub const RESOURCE_PATH: &str = "/pokemon.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("creature data is not a valid list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("loader stopped before delivering a result")]
    Interrupted,
}

/// Where the creature list lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(DataSource::Url(s.to_string()))
        } else {
            Ok(DataSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::File(PathBuf::from(DEFAULT_SOURCE))
    }
}

impl DataSource {
    /// Fetch the raw body. No retry, and no timeout: the HTTP client is
    /// built without reqwest's 30 s default.
    fn read_body(&self) -> Result<String, LoadError> {
        match self {
            DataSource::File(path) => fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            }),
            DataSource::Url(url) => {
                let http_err = |source| LoadError::Http {
                    url: url.clone(),
                    source,
                };

                let client = reqwest::blocking::Client::builder()
                    .timeout(None::<Duration>)
                    .build()
                    .map_err(http_err)?;
                let response = client.get(url.as_str()).send().map_err(http_err)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }

                response.text().map_err(http_err)
            }
        }
    }
}

/// Parse a JSON array of creatures
pub fn parse_creatures(body: &str) -> Result<Vec<Creature>, LoadError> {
    Ok(serde_json::from_str(body)?)
}

/// Load every creature from the source
pub fn get_all(source: &DataSource) -> Result<Vec<Creature>, LoadError> {
    log::debug!("loading creatures from {}", source);
    let creatures = parse_creatures(&source.read_body()?)?;
    log::info!("loaded {} creatures from {}", creatures.len(), source);
    Ok(creatures)
}

/// Load the creatures whose name contains `search`, ignoring case.
/// An empty search returns everything.
pub fn get_by_name(source: &DataSource, search: &str) -> Result<Vec<Creature>, LoadError> {
    let pattern = SearchPattern::literal(search);
    Ok(get_all(source)?
        .into_iter()
        .filter(|c| pattern.matches(&c.name))
        .collect())
}

/// Run [`get_all`] once on a background thread.
///
/// The result arrives on the returned channel. If the receiver is gone by the
/// time the load finishes, the result is dropped.
pub fn spawn_load(source: DataSource) -> Receiver<Result<Vec<Creature>, LoadError>> {
    spawn_load_worker(source).0
}

/// Same as [`spawn_load`], also handing back the worker. The worker yields
/// whether the result reached the receiver.
pub(crate) fn spawn_load_worker(
    source: DataSource,
) -> (Receiver<Result<Vec<Creature>, LoadError>>, JoinHandle<bool>) {
    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        let result = get_all(&source);
        if let Err(e) = &result {
            log::warn!("load from {} failed: {}", source, e);
        }
        if tx.send(result).is_err() {
            log::debug!("view closed before load from {} finished", source);
            return false;
        }
        true
    });

    (rx, worker)
}
