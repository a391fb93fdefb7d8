use crate::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const CANCELLATION_BIT: u8 = 1 << 0;
const RECOVERY_BIT: u8 = 1 << 1;

/// Persisted on/off switches for key cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeFlags {
    pub cancellation_enabled: bool,
    /// Only takes effect while `cancellation_enabled` is also set.
    pub recovery_enabled: bool,
}

impl ModeFlags {
    pub const fn new(cancellation_enabled: bool, recovery_enabled: bool) -> Self {
        Self {
            cancellation_enabled,
            recovery_enabled,
        }
    }

    pub const fn is_recovery_active(&self) -> bool {
        self.cancellation_enabled && self.recovery_enabled
    }

    /// Packs the flags into the keymap configuration byte.
    pub const fn to_raw(self) -> u8 {
        let mut raw = 0;
        if self.cancellation_enabled {
            raw |= CANCELLATION_BIT;
        }
        if self.recovery_enabled {
            raw |= RECOVERY_BIT;
        }
        raw
    }

    /// Unpacks a configuration byte. Unknown bits are ignored.
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            cancellation_enabled: raw & CANCELLATION_BIT != 0,
            recovery_enabled: raw & RECOVERY_BIT != 0,
        }
    }
}

/// Non-volatile storage for [`ModeFlags`].
///
/// `save` is called once per flag mutation.
pub trait ConfigStore {
    fn load(&mut self) -> Result<ModeFlags>;
    fn save(&mut self, flags: &ModeFlags) -> Result<()>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for Box<S> {
    fn load(&mut self) -> Result<ModeFlags> {
        (**self).load()
    }

    fn save(&mut self, flags: &ModeFlags) -> Result<()> {
        (**self).save(flags)
    }
}

#[derive(Debug, Default)]
struct MemoryCell {
    raw: u8,
    writes: usize,
}

/// In-RAM stand-in for the EEPROM config word. Clones share the same cell,
/// so a handle kept by the caller observes writes made through the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cell: Arc<Mutex<MemoryCell>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: ModeFlags) -> Self {
        Self {
            cell: Arc::new(Mutex::new(MemoryCell {
                raw: flags.to_raw(),
                writes: 0,
            })),
        }
    }

    pub fn raw(&self) -> u8 {
        self.cell.lock().raw
    }

    pub fn flags(&self) -> ModeFlags {
        ModeFlags::from_raw(self.raw())
    }

    /// Number of `save` calls so far.
    pub fn writes(&self) -> usize {
        self.cell.lock().writes
    }
}

impl ConfigStore for MemoryStore {
    fn load(&mut self) -> Result<ModeFlags> {
        Ok(self.flags())
    }

    fn save(&mut self, flags: &ModeFlags) -> Result<()> {
        let mut cell = self.cell.lock();
        cell.raw = flags.to_raw();
        cell.writes += 1;
        Ok(())
    }
}

/// JSON settings file. A missing file loads as the defaults.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&mut self) -> Result<ModeFlags> {
        if !self.path.exists() {
            debug!("No settings at {:?}, using defaults", self.path);
            return Ok(ModeFlags::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, flags: &ModeFlags) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(flags)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
