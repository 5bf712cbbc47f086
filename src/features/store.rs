use std::{
    collections::HashMap,
    fmt, fs, io,
    path::PathBuf,
};

use thiserror::Error;

use super::account::Account;

/// The single key the whole account collection lives under
pub const ACCOUNTS_KEY: &str = "bankAccounts";

/// A key-value backend that holds whole serialized values.
/// A write of one key replaces the previous value in a single step.
pub trait BlobStore {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&mut self, key: &str, blob: &str) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlobs {
    entries: HashMap<String, String>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobs {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> io::Result<()> {
        self.entries.insert(key.to_owned(), blob.to_owned());
        Ok(())
    }
}

/// Keeps each key as `<root>/<key>.json`
#[derive(Debug, Clone)]
pub struct DirectoryBlobs {
    root: PathBuf,
}

impl DirectoryBlobs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStore for DirectoryBlobs {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: &str, blob: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let target = self.path_for(key);
        let staging = self.root.join(format!(".{key}.json.tmp"));

        // rename is atomic on the same filesystem, readers never see half a blob
        fs::write(&staging, blob)?;
        fs::rename(&staging, &target).map_err(|e| {
            if let Err(cleanup) = fs::remove_file(&staging) {
                warn!("Unable to remove {}: {cleanup}", staging.display());
            }
            e
        })
    }
}

/// What `load` does with a blob it cannot read or decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Treat it as an empty collection and log a warning.
    #[default]
    Lenient,

    /// Surface it as an error.
    Strict,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Stored accounts are corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Unable to encode accounts: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

type ChangeListener = Box<dyn FnMut(&[Account])>;

/// Loads and saves the account collection as one blob under [`ACCOUNTS_KEY`]
pub struct Store<B> {
    blobs: B,
    policy: LoadPolicy,
    listeners: Vec<ChangeListener>,
}

impl<B: BlobStore> Store<B> {
    pub fn new(blobs: B, policy: LoadPolicy) -> Self {
        Self {
            blobs,
            policy,
            listeners: Vec::new(),
        }
    }

    pub fn load(&self) -> StoreResult<Vec<Account>> {
        let blob = match self.blobs.read(ACCOUNTS_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(Vec::new()),
            Err(e) if self.policy == LoadPolicy::Lenient => {
                warn!("Unable to read stored accounts, starting empty: {e}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<Account>>(&blob) {
            Ok(accounts) => {
                debug!("Loaded {} accounts", accounts.len());
                Ok(accounts)
            }
            Err(e) if self.policy == LoadPolicy::Lenient => {
                warn!("Stored accounts are corrupt, starting empty: {e}");
                Ok(Vec::new())
            }
            Err(e) => Err(StoreError::Corrupt(e)),
        }
    }

    /// Overwrites the blob, then tells every listener the collection changed.
    pub fn save(&mut self, accounts: &[Account]) -> StoreResult<()> {
        let blob = serde_json::to_string(accounts).map_err(StoreError::Encode)?;
        self.blobs.write(ACCOUNTS_KEY, &blob)?;
        debug!("Saved {} accounts", accounts.len());

        for listener in self.listeners.iter_mut() {
            listener(accounts);
        }
        Ok(())
    }

    pub fn on_change(&mut self, listener: impl FnMut(&[Account]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

impl<B: fmt::Debug> fmt::Debug for Store<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("blobs", &self.blobs)
            .field("policy", &self.policy)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
