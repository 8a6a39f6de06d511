use crate::config::{Config, StorageMode};
use crate::errors::AppError;
use crate::models::{AppData, Completion, Habit};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

const DOCUMENT_VERSION: u32 = 1;
const HABITS_FILE: &str = "habits.json";
const COMPLETION_PREFIX: &str = "completion_";

/// A mutation that has just been applied to the in-memory snapshot.
#[derive(Debug, Clone, Copy)]
pub enum Change<'a> {
    HabitSaved(&'a Habit),
    HabitDeleted(&'a str),
    CompletionSet(&'a Completion),
    CompletionDeleted { habit_id: &'a str, date: &'a str },
    /// Everything was replaced, e.g. by an overwrite import.
    Replaced,
}

pub trait Persistence {
    fn load(&self) -> impl Future<Output = AppData> + Send;

    /// Writes `change` out. `data` is the snapshot with the change applied.
    fn persist(
        &self,
        data: &AppData,
        change: Change<'_>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    habits: Vec<Habit>,
    #[serde(default)]
    completions: Vec<Completion>,
}

/// Primary store: the whole snapshot in a single JSON file.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Prepares the parent directory and checks an existing file can be
    /// read and written.
    pub async fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is a directory", path.display()),
                ));
            }
            Ok(_) => {
                fs::OpenOptions::new()
                    .read(true)
                    .append(true)
                    .open(path)
                    .await?;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for DocumentStore {
    async fn load(&self) -> AppData {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<StoredDocument>(&bytes) {
                Ok(document) => AppData::from_parts(document.habits, document.completions),
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    AppData::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => AppData::default(),
            Err(err) => {
                error!("failed to read data file: {err}");
                AppData::default()
            }
        }
    }

    async fn persist(&self, data: &AppData, _change: Change<'_>) -> Result<(), AppError> {
        let document = StoredDocument {
            version: DOCUMENT_VERSION,
            habits: data.habits.clone(),
            completions: data.all_completions(),
        };
        let payload = serde_json::to_vec_pretty(&document)?;
        write_atomic(&self.path, &payload).await?;
        Ok(())
    }
}

/// Degraded store: one file per record, so each change only touches the
/// records it names.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub async fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn habits_path(&self) -> PathBuf {
        self.dir.join(HABITS_FILE)
    }

    fn completion_path(&self, habit_id: &str, date: &str) -> PathBuf {
        self.dir.join(format!(
            "{}{}.json",
            completion_prefix(habit_id),
            encode_key(date)
        ))
    }

    async fn write_habits(&self, habits: &[Habit]) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(habits)?;
        write_atomic(&self.habits_path(), &payload).await?;
        Ok(())
    }

    async fn write_completion(&self, completion: &Completion) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(completion)?;
        let path = self.completion_path(&completion.habit_id, &completion.date);
        write_atomic(&path, &payload).await?;
        Ok(())
    }

    /// Removes completion files whose name starts with `prefix`.
    async fn remove_completions(&self, prefix: &str) -> Result<(), AppError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(prefix) {
                remove_if_present(&entry.path()).await?;
            }
        }
        Ok(())
    }

    async fn load_habits(&self) -> Vec<Habit> {
        match fs::read(self.habits_path()).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                error!("failed to parse {HABITS_FILE}: {err}");
                Vec::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                error!("failed to read {HABITS_FILE}: {err}");
                Vec::new()
            }
        }
    }

    async fn load_completions(&self) -> io::Result<Vec<Completion>> {
        let mut completions = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(COMPLETION_PREFIX) || !name.ends_with(".json") {
                continue;
            }
            let parsed = fs::read(entry.path())
                .await
                .map_err(|err| err.to_string())
                .and_then(|bytes| {
                    serde_json::from_slice::<Completion>(&bytes).map_err(|err| err.to_string())
                });
            match parsed {
                Ok(completion) => completions.push(completion),
                Err(err) => warn!("skipping unreadable record {name}: {err}"),
            }
        }
        Ok(completions)
    }
}

impl Persistence for RecordStore {
    async fn load(&self) -> AppData {
        let habits = self.load_habits().await;
        let completions = match self.load_completions().await {
            Ok(completions) => completions,
            Err(err) => {
                error!("failed to list records in {}: {err}", self.dir.display());
                Vec::new()
            }
        };
        AppData::from_parts(habits, completions)
    }

    async fn persist(&self, data: &AppData, change: Change<'_>) -> Result<(), AppError> {
        match change {
            Change::HabitSaved(_) => self.write_habits(&data.habits).await,
            Change::HabitDeleted(habit_id) => {
                self.write_habits(&data.habits).await?;
                self.remove_completions(&completion_prefix(habit_id)).await
            }
            Change::CompletionSet(completion) => self.write_completion(completion).await,
            Change::CompletionDeleted { habit_id, date } => {
                remove_if_present(&self.completion_path(habit_id, date)).await?;
                Ok(())
            }
            Change::Replaced => {
                self.remove_completions(COMPLETION_PREFIX).await?;
                self.write_habits(&data.habits).await?;
                for completion in data.completions.values().flat_map(|map| map.values()) {
                    self.write_completion(completion).await?;
                }
                Ok(())
            }
        }
    }
}

/// The store picked at startup. Never changes while the process runs.
#[derive(Debug, Clone)]
pub enum Backend {
    Document(DocumentStore),
    Records(RecordStore),
}

impl Backend {
    pub async fn open(config: &Config) -> io::Result<Self> {
        let backend = match config.storage {
            StorageMode::Document => Self::Document(DocumentStore::open(&config.data_path).await?),
            StorageMode::Records => Self::Records(RecordStore::open(&config.fallback_dir).await?),
            StorageMode::Auto => match DocumentStore::open(&config.data_path).await {
                Ok(store) => Self::Document(store),
                Err(err) => {
                    warn!(
                        "document store at {} unavailable ({err}), falling back to record store",
                        config.data_path.display()
                    );
                    Self::Records(RecordStore::open(&config.fallback_dir).await?)
                }
            },
        };
        info!("using {} storage at {}", backend.kind(), backend.location().display());
        Ok(backend)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Records(_) => "records",
        }
    }

    pub fn location(&self) -> &Path {
        match self {
            Self::Document(store) => store.path(),
            Self::Records(store) => store.dir(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Records(_))
    }
}

impl Persistence for Backend {
    async fn load(&self) -> AppData {
        match self {
            Self::Document(store) => store.load().await,
            Self::Records(store) => store.load().await,
        }
    }

    async fn persist(&self, data: &AppData, change: Change<'_>) -> Result<(), AppError> {
        match self {
            Self::Document(store) => store.persist(data, change).await,
            Self::Records(store) => store.persist(data, change).await,
        }
    }
}

/// Replaces `path` in one step so readers never see a half-written file.
async fn write_atomic(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn completion_prefix(habit_id: &str) -> String {
    format!("{COMPLETION_PREFIX}{}_", encode_key(habit_id))
}

/// File-name safe form of a key. Anything but ASCII alphanumerics and `-`
/// is percent-encoded, so `_` only ever appears as a separator.
fn encode_key(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}
