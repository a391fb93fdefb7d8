use crate::config::{ConfigStore, ModeFlags};
use crate::types::KeyCode;
use tracing::{info, warn};

/// Base of the reserved range used by the control codes.
pub const CONTROL_CODE_BASE: u16 = 0x7E40;

/// Dedicated keycodes that switch cancellation on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCode {
    CancellationOn,
    CancellationOff,
    CancellationToggle,
    RecoveryOn,
    RecoveryOff,
    RecoveryToggle,
}

impl ControlCode {
    pub const ALL: [ControlCode; 6] = [
        ControlCode::CancellationOn,
        ControlCode::CancellationOff,
        ControlCode::CancellationToggle,
        ControlCode::RecoveryOn,
        ControlCode::RecoveryOff,
        ControlCode::RecoveryToggle,
    ];

    pub const fn keycode(self) -> KeyCode {
        let offset = match self {
            ControlCode::CancellationOn => 0,
            ControlCode::CancellationOff => 1,
            ControlCode::CancellationToggle => 2,
            ControlCode::RecoveryOn => 3,
            ControlCode::RecoveryOff => 4,
            ControlCode::RecoveryToggle => 5,
        };
        KeyCode(CONTROL_CODE_BASE + offset)
    }

    pub fn from_keycode(key: KeyCode) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keycode() == key)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ControlCode::CancellationOn => "KC_CANCEL_ON",
            ControlCode::CancellationOff => "KC_CANCEL_OFF",
            ControlCode::CancellationToggle => "KC_CANCEL_TOGG",
            ControlCode::RecoveryOn => "KC_CANCEL_RECOVERY_ON",
            ControlCode::RecoveryOff => "KC_CANCEL_RECOVERY_OFF",
            ControlCode::RecoveryToggle => "KC_CANCEL_RECOVERY_TOGG",
        }
    }
}

/// Owns the mode flags and writes them through to the store on every change.
pub struct ModeControl<S: ConfigStore> {
    flags: ModeFlags,
    store: S,
    on_change: Option<Box<dyn Fn(ModeFlags) + Send + Sync>>,
}

impl<S: ConfigStore> ModeControl<S> {
    /// Loads the initial flags from `store`. A failed load falls back to the
    /// defaults (everything off).
    pub fn load(mut store: S) -> Self {
        let flags = match store.load() {
            Ok(flags) => flags,
            Err(e) => {
                warn!("Failed to load key cancellation config: {}", e);
                ModeFlags::default()
            }
        };
        info!(
            "Key cancellation: enabled={} recovery={}",
            flags.cancellation_enabled, flags.recovery_enabled
        );
        Self {
            flags,
            store,
            on_change: None,
        }
    }

    pub fn set_on_change(&mut self, cb: impl Fn(ModeFlags) + Send + Sync + 'static) {
        self.on_change = Some(Box::new(cb));
    }

    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_cancellation_enabled(&self) -> bool {
        self.flags.cancellation_enabled
    }

    pub fn is_recovery_active(&self) -> bool {
        self.flags.is_recovery_active()
    }

    pub fn enable_cancellation(&mut self) {
        self.flags.cancellation_enabled = true;
        self.commit();
    }

    pub fn disable_cancellation(&mut self) {
        self.flags.cancellation_enabled = false;
        self.commit();
    }

    pub fn toggle_cancellation(&mut self) {
        self.flags.cancellation_enabled = !self.flags.cancellation_enabled;
        self.commit();
    }

    pub fn enable_recovery(&mut self) {
        self.flags.recovery_enabled = true;
        self.commit();
    }

    pub fn disable_recovery(&mut self) {
        self.flags.recovery_enabled = false;
        self.commit();
    }

    pub fn toggle_recovery(&mut self) {
        self.flags.recovery_enabled = !self.flags.recovery_enabled;
        self.commit();
    }

    pub fn apply(&mut self, code: ControlCode) {
        match code {
            ControlCode::CancellationOn => self.enable_cancellation(),
            ControlCode::CancellationOff => self.disable_cancellation(),
            ControlCode::CancellationToggle => self.toggle_cancellation(),
            ControlCode::RecoveryOn => self.enable_recovery(),
            ControlCode::RecoveryOff => self.disable_recovery(),
            ControlCode::RecoveryToggle => self.toggle_recovery(),
        }
    }

    fn commit(&mut self) {
        info!(
            "Key cancellation: enabled={} recovery={}",
            self.flags.cancellation_enabled, self.flags.recovery_enabled
        );
        // The in-memory flag stays authoritative even if the write fails.
        if let Err(e) = self.store.save(&self.flags) {
            warn!("Failed to persist key cancellation config: {}", e);
        }
        if let Some(ref cb) = self.on_change {
            cb(self.flags);
        }
    }
}
