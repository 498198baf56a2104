use log::{debug, info};
use segue_ports::storage::{PlaybackConfig, StorageError, StoragePort};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "Segue";
const CONFIG_FILE: &str = "config.json";

fn io_error(err: io::Error) -> StorageError {
    StorageError::Io(err.to_string())
}

/// Playback config kept as one pretty-printed JSON file in `dir`.
pub struct FsStorage {
    dir: PathBuf,
}

impl FsStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the platform config dir, e.g. `~/.config/Segue`.
    pub fn in_user_config_dir() -> Result<Self, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("no user config dir on this platform".to_string()))?;
        Ok(Self::new(base.join(APP_DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    // written next to the target and renamed over it, so readers never see a partial file
    fn staging_path(&self) -> PathBuf {
        self.dir.join(format!("{CONFIG_FILE}.tmp"))
    }
}

impl StoragePort for FsStorage {
    fn load_config(&self) -> Result<PlaybackConfig, StorageError> {
        let path = self.config_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                return Ok(PlaybackConfig::default());
            }
            Err(err) => return Err(io_error(err)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|err| StorageError::Serde(format!("{}: {}", path.display(), err)))
    }

    fn save_config(&self, config: &PlaybackConfig) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_error)?;
        let bytes =
            serde_json::to_vec_pretty(config).map_err(|err| StorageError::Serde(err.to_string()))?;

        let staging = self.staging_path();
        let path = self.config_path();
        fs::write(&staging, bytes).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)?;
        info!("config written to {}", path.display());
        Ok(())
    }
}
