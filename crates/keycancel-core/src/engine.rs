use crate::config::{ConfigStore, ModeFlags};
use crate::hold_buffer::HoldBuffer;
use crate::mode::{ControlCode, ModeControl};
use crate::table::CancellationTable;
use crate::types::{HostReport, KeyAction, KeyCode, KeyEdge, KeyEvent};
use tracing::{debug, trace, warn};

type KeyFilter = Box<dyn Fn(KeyCode, &KeyEvent) -> bool + Send + Sync>;

/// Key cancellation engine.
///
/// Sits in front of the host report. Every transition goes through
/// [`Engine::process_key`], which may release or re-register other keys on
/// the supplied [`HostReport`] before the original event is forwarded.
pub struct Engine<T: CancellationTable, S: ConfigStore> {
    table: T,
    modes: ModeControl<S>,
    held: HoldBuffer,
    filter: Option<KeyFilter>,
}

impl<T: CancellationTable, S: ConfigStore> Engine<T, S> {
    pub fn new(table: T, store: S) -> Self {
        Self {
            table,
            modes: ModeControl::load(store),
            held: HoldBuffer::new(),
            filter: None,
        }
    }

    /// Installs a veto hook. Returning `false` lets the event through
    /// untouched; the hook cannot change engine state.
    pub fn with_filter(
        mut self,
        filter: impl Fn(KeyCode, &KeyEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.set_filter(filter);
        self
    }

    pub fn set_filter(&mut self, filter: impl Fn(KeyCode, &KeyEvent) -> bool + Send + Sync + 'static) {
        self.filter = Some(Box::new(filter));
    }

    pub fn set_on_mode_change(&mut self, cb: impl Fn(ModeFlags) + Send + Sync + 'static) {
        self.modes.set_on_change(cb);
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn held(&self) -> &HoldBuffer {
        &self.held
    }

    pub fn modes(&self) -> &ModeControl<S> {
        &self.modes
    }

    pub fn flags(&self) -> ModeFlags {
        self.modes.flags()
    }

    pub fn is_enabled(&self) -> bool {
        self.modes.is_cancellation_enabled()
    }

    pub fn is_recovery_active(&self) -> bool {
        self.modes.is_recovery_active()
    }

    /// Applies a mode change as if its control key had been pressed.
    pub fn apply_control(&mut self, code: ControlCode) {
        let was_active = self.modes.is_recovery_active();
        self.modes.apply(code);
        // Releases seen while recovery was off never reached the buffer.
        if !was_active && self.modes.is_recovery_active() && !self.held.is_empty() {
            debug!("Dropping stale hold buffer {}", self.held);
            self.held.clear();
        }
    }

    pub fn process_key<H: HostReport + ?Sized>(
        &mut self,
        key: KeyCode,
        event: KeyEvent,
        host: &mut H,
    ) -> KeyAction {
        if let Some(code) = ControlCode::from_keycode(key) {
            if event.is_pressed() {
                self.apply_control(code);
            }
            return KeyAction::Block;
        }

        if !self.modes.is_cancellation_enabled() {
            return KeyAction::Pass;
        }

        if !key.is_basic() {
            trace!("{} is not a basic keycode, passing", key);
            return KeyAction::Pass;
        }

        if let Some(ref filter) = self.filter {
            if !filter(key, &event) {
                trace!("{} vetoed by filter, passing", key);
                return KeyAction::Pass;
            }
        }

        let recovery = self.modes.is_recovery_active();

        match event.edge {
            KeyEdge::Down => {
                if recovery {
                    self.track_press(key);
                    if self.held.is_empty() {
                        return KeyAction::Pass;
                    }
                }
                self.cancel_opposites(key, host);
            }
            KeyEdge::Up => {
                if !recovery {
                    return KeyAction::Pass;
                }
                if self.table.is_press_key(key) {
                    self.held.remove(key);
                }
                if self.held.is_empty() {
                    return KeyAction::Pass;
                }
                self.reconcile(host);
            }
        }

        KeyAction::Pass
    }

    fn track_press(&mut self, key: KeyCode) {
        if !self.table.is_press_key(key) || self.held.contains(key) {
            return;
        }
        if !self.held.insert(key) {
            warn!("Hold buffer full, {} will not be recovered", key);
        }
    }

    /// The newly pressed key wins over every key it cancels.
    fn cancel_opposites<H: HostReport + ?Sized>(&self, key: KeyCode, host: &mut H) {
        for pair in self.table.pairs_pressing(key) {
            debug!("{} cancels {}", key, pair.unpress);
            host.release(pair.unpress);
        }
    }

    /// Decides, after a release, which held keys are reported again and which
    /// stay suppressed. Later holds take precedence over earlier ones.
    fn reconcile<H: HostReport + ?Sized>(&self, host: &mut H) {
        let mut snapshot = self.held.snapshot();

        for j in (0..snapshot.len()).rev() {
            let Some(key) = snapshot.get(j) else {
                continue;
            };
            for pair in self.table.pairs_pressing(key) {
                if self.held.contains(pair.unpress) {
                    snapshot.clear_before(pair.unpress, j);
                }
            }
        }

        debug!("hold buffer: {}", self.held);
        debug!("snapshot:    {}", snapshot);

        for (i, &held) in self.held.iter().enumerate() {
            match snapshot.get(i) {
                None => {
                    debug!("keep {} released", held);
                    host.release(held);
                }
                Some(k) if k == held => {
                    debug!("recover {}", held);
                    host.register(held);
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;
    use crate::table::{PairTable, SOCD_WASD};
    use crate::types::HostEvent;

    fn engine_with(
        table: PairTable,
        cancellation: bool,
        recovery: bool,
    ) -> (Engine<PairTable, MemoryStore>, MemoryStore) {
        let store = MemoryStore::with_flags(ModeFlags::new(cancellation, recovery));
        (Engine::new(table, store.clone()), store)
    }

    fn socd() -> PairTable {
        SOCD_WASD.into_iter().collect()
    }

    fn press(
        engine: &mut Engine<PairTable, MemoryStore>,
        key: KeyCode,
    ) -> (KeyAction, Vec<HostEvent>) {
        let mut out = Vec::new();
        let action = engine.process_key(key, KeyEvent::down(), &mut out);
        (action, out)
    }

    fn release(
        engine: &mut Engine<PairTable, MemoryStore>,
        key: KeyCode,
    ) -> (KeyAction, Vec<HostEvent>) {
        let mut out = Vec::new();
        let action = engine.process_key(key, KeyEvent::up(), &mut out);
        (action, out)
    }

    #[test]
    fn test_press_releases_opposite() {
        let (mut engine, _) = engine_with(socd(), true, false);
        let (action, out) = press(&mut engine, KeyCode::A);
        assert_eq!(action, KeyAction::Pass);
        assert_eq!(out, vec![HostEvent::Release(KeyCode::D)]);
        assert!(engine.held().is_empty(), "no tracking without recovery");
    }

    #[test]
    fn test_press_applies_every_matching_pair() {
        let mut table = PairTable::new();
        table
            .push(KeyCode::A, KeyCode::D)
            .push(KeyCode::W, KeyCode::S)
            .push(KeyCode::A, KeyCode::LEFT);
        let (mut engine, _) = engine_with(table, true, false);
        let (_, out) = press(&mut engine, KeyCode::A);
        assert_eq!(
            out,
            vec![HostEvent::Release(KeyCode::D), HostEvent::Release(KeyCode::LEFT)]
        );
    }

    #[test]
    fn test_release_without_recovery_is_untouched() {
        let (mut engine, _) = engine_with(socd(), true, false);
        press(&mut engine, KeyCode::A);
        press(&mut engine, KeyCode::D);
        let (action, out) = release(&mut engine, KeyCode::D);
        assert_eq!(action, KeyAction::Pass);
        assert!(out.is_empty());
    }

    #[test]
    fn test_disabled_engine_passes_everything() {
        let (mut engine, _) = engine_with(socd(), false, true);
        for key in [KeyCode::A, KeyCode::D, KeyCode::W] {
            let (action, out) = press(&mut engine, key);
            assert_eq!(action, KeyAction::Pass);
            assert!(out.is_empty());
        }
        let (action, out) = release(&mut engine, KeyCode::A);
        assert_eq!(action, KeyAction::Pass);
        assert!(out.is_empty());
        assert!(engine.held().is_empty());
    }

    #[test]
    fn test_non_basic_keys_pass() {
        let mut table = PairTable::new();
        table.push(KeyCode::LEFT_SHIFT, KeyCode::RIGHT_SHIFT);
        let (mut engine, _) = engine_with(table, true, true);
        let (action, out) = press(&mut engine, KeyCode::LEFT_SHIFT);
        assert_eq!(action, KeyAction::Pass);
        assert!(out.is_empty());
        assert!(engine.held().is_empty());
    }

    #[test]
    fn test_filter_veto_passes_through() {
        let (engine, _) = engine_with(socd(), true, true);
        let mut engine = engine.with_filter(|key, event| !(key == KeyCode::A && event.pos.is_none()));

        let (action, out) = press(&mut engine, KeyCode::A);
        assert_eq!(action, KeyAction::Pass);
        assert!(out.is_empty());
        assert!(engine.held().is_empty());

        let mut out: Vec<HostEvent> = Vec::new();
        engine.process_key(KeyCode::A, KeyEvent::down().at(2, 1), &mut out);
        assert_eq!(out, vec![HostEvent::Release(KeyCode::D)]);
        assert_eq!(engine.held().as_slice(), &[KeyCode::A]);
    }

    #[test]
    fn test_recovery_restores_suppressed_key() {
        let (mut engine, _) = engine_with(socd(), true, true);
        press(&mut engine, KeyCode::A);
        let (_, out) = press(&mut engine, KeyCode::D);
        assert_eq!(out, vec![HostEvent::Release(KeyCode::A)]);

        let (action, out) = release(&mut engine, KeyCode::D);
        assert_eq!(action, KeyAction::Pass);
        assert_eq!(out, vec![HostEvent::Register(KeyCode::A)]);
        assert_eq!(engine.held().as_slice(), &[KeyCode::A]);
    }

    #[test]
    fn test_latest_hold_wins_on_unrelated_release() {
        let (mut engine, _) = engine_with(socd(), true, true);
        press(&mut engine, KeyCode::A);
        press(&mut engine, KeyCode::D);
        press(&mut engine, KeyCode::SPACE);

        let (_, out) = release(&mut engine, KeyCode::SPACE);
        assert_eq!(
            out,
            vec![HostEvent::Release(KeyCode::A), HostEvent::Register(KeyCode::D)]
        );
    }

    #[test]
    fn test_empty_buffer_release_passes() {
        let (mut engine, _) = engine_with(socd(), true, true);
        press(&mut engine, KeyCode::A);
        let (action, out) = release(&mut engine, KeyCode::A);
        assert_eq!(action, KeyAction::Pass);
        assert!(out.is_empty());
    }

    #[test]
    fn test_control_codes_block_and_persist() {
        let (mut engine, store) = engine_with(socd(), false, false);

        let (action, out) = press(&mut engine, ControlCode::CancellationToggle.keycode());
        assert_eq!(action, KeyAction::Block);
        assert!(out.is_empty());
        assert!(engine.is_enabled());
        assert_eq!(store.writes(), 1);

        // Release edge is swallowed but changes nothing.
        let (action, _) = release(&mut engine, ControlCode::CancellationToggle.keycode());
        assert_eq!(action, KeyAction::Block);
        assert!(engine.is_enabled());
        assert_eq!(store.writes(), 1);

        press(&mut engine, ControlCode::RecoveryOn.keycode());
        assert!(engine.is_recovery_active());
        assert_eq!(store.flags(), ModeFlags::new(true, true));
        assert!(engine.held().is_empty());
    }

    #[test]
    fn test_reenabling_recovery_drops_stale_entries() {
        let (mut engine, _) = engine_with(socd(), true, true);
        press(&mut engine, KeyCode::A);
        press(&mut engine, ControlCode::CancellationOff.keycode());
        // Released while disabled: the buffer never hears about it.
        release(&mut engine, KeyCode::A);
        assert_eq!(engine.held().as_slice(), &[KeyCode::A]);

        press(&mut engine, ControlCode::CancellationOn.keycode());
        assert!(engine.held().is_empty());

        press(&mut engine, KeyCode::SPACE);
        let (_, out) = release(&mut engine, KeyCode::SPACE);
        assert!(out.is_empty(), "A must not come back: {out:?}");
    }
}
