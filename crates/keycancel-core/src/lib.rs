pub mod config;
pub mod engine;
pub mod error;
pub mod hold_buffer;
pub mod host;
pub mod keycode;
pub mod mode;
pub mod parser;
pub mod table;
pub mod types;

pub use config::{ConfigStore, JsonFileStore, MemoryStore, ModeFlags};
pub use engine::Engine;
pub use error::{Error, Result};
pub use hold_buffer::{HoldBuffer, HOLD_BUFFER_CAPACITY};
pub use host::HostState;
pub use mode::ControlCode;
pub use table::{CancellationPair, CancellationTable, PairTable, SOCD_WASD};
pub use types::{HostEvent, HostReport, KeyAction, KeyCode, KeyEdge, KeyEvent, KeyPos};
