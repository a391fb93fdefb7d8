use crate::types::KeyCode;
use std::collections::HashMap;
use std::fmt;

impl KeyCode {
    pub const NO: Self = Self(0x00);

    pub const A: Self = Self(0x04);
    pub const B: Self = Self(0x05);
    pub const C: Self = Self(0x06);
    pub const D: Self = Self(0x07);
    pub const E: Self = Self(0x08);
    pub const F: Self = Self(0x09);
    pub const G: Self = Self(0x0A);
    pub const H: Self = Self(0x0B);
    pub const I: Self = Self(0x0C);
    pub const J: Self = Self(0x0D);
    pub const K: Self = Self(0x0E);
    pub const L: Self = Self(0x0F);
    pub const M: Self = Self(0x10);
    pub const N: Self = Self(0x11);
    pub const O: Self = Self(0x12);
    pub const P: Self = Self(0x13);
    pub const Q: Self = Self(0x14);
    pub const R: Self = Self(0x15);
    pub const S: Self = Self(0x16);
    pub const T: Self = Self(0x17);
    pub const U: Self = Self(0x18);
    pub const V: Self = Self(0x19);
    pub const W: Self = Self(0x1A);
    pub const X: Self = Self(0x1B);
    pub const Y: Self = Self(0x1C);
    pub const Z: Self = Self(0x1D);

    pub const N1: Self = Self(0x1E);
    pub const N2: Self = Self(0x1F);
    pub const N3: Self = Self(0x20);
    pub const N4: Self = Self(0x21);
    pub const N5: Self = Self(0x22);
    pub const N6: Self = Self(0x23);
    pub const N7: Self = Self(0x24);
    pub const N8: Self = Self(0x25);
    pub const N9: Self = Self(0x26);
    pub const N0: Self = Self(0x27);

    pub const ENTER: Self = Self(0x28);
    pub const ESCAPE: Self = Self(0x29);
    pub const BACKSPACE: Self = Self(0x2A);
    pub const TAB: Self = Self(0x2B);
    pub const SPACE: Self = Self(0x2C);

    pub const RIGHT: Self = Self(0x4F);
    pub const LEFT: Self = Self(0x50);
    pub const DOWN: Self = Self(0x51);
    pub const UP: Self = Self(0x52);

    /// Last keycode of the basic range.
    pub const EXSEL: Self = Self(0xA4);

    pub const LEFT_CTRL: Self = Self(0xE0);
    pub const LEFT_SHIFT: Self = Self(0xE1);
    pub const LEFT_ALT: Self = Self(0xE2);
    pub const LEFT_GUI: Self = Self(0xE3);
    pub const RIGHT_CTRL: Self = Self(0xE4);
    pub const RIGHT_SHIFT: Self = Self(0xE5);
    pub const RIGHT_ALT: Self = Self(0xE6);
    pub const RIGHT_GUI: Self = Self(0xE7);

    /// Plain reportable key (`A..=EXSEL`). Modifiers, layer keys and custom
    /// codes are outside this range.
    pub const fn is_basic(self) -> bool {
        self.0 >= Self::A.0 && self.0 <= Self::EXSEL.0
    }

    pub const fn is_modifier(self) -> bool {
        self.0 >= Self::LEFT_CTRL.0 && self.0 <= Self::RIGHT_GUI.0
    }

    pub fn name(self) -> Option<&'static str> {
        KEY_NAMES
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:04X}", self.0),
        }
    }
}

/// Canonical names, first match wins for display.
pub const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("KC_NO", KeyCode::NO),
    // Letters
    ("KC_A", KeyCode::A),
    ("KC_B", KeyCode::B),
    ("KC_C", KeyCode::C),
    ("KC_D", KeyCode::D),
    ("KC_E", KeyCode::E),
    ("KC_F", KeyCode::F),
    ("KC_G", KeyCode::G),
    ("KC_H", KeyCode::H),
    ("KC_I", KeyCode::I),
    ("KC_J", KeyCode::J),
    ("KC_K", KeyCode::K),
    ("KC_L", KeyCode::L),
    ("KC_M", KeyCode::M),
    ("KC_N", KeyCode::N),
    ("KC_O", KeyCode::O),
    ("KC_P", KeyCode::P),
    ("KC_Q", KeyCode::Q),
    ("KC_R", KeyCode::R),
    ("KC_S", KeyCode::S),
    ("KC_T", KeyCode::T),
    ("KC_U", KeyCode::U),
    ("KC_V", KeyCode::V),
    ("KC_W", KeyCode::W),
    ("KC_X", KeyCode::X),
    ("KC_Y", KeyCode::Y),
    ("KC_Z", KeyCode::Z),
    // Number row
    ("KC_1", KeyCode::N1),
    ("KC_2", KeyCode::N2),
    ("KC_3", KeyCode::N3),
    ("KC_4", KeyCode::N4),
    ("KC_5", KeyCode::N5),
    ("KC_6", KeyCode::N6),
    ("KC_7", KeyCode::N7),
    ("KC_8", KeyCode::N8),
    ("KC_9", KeyCode::N9),
    ("KC_0", KeyCode::N0),
    ("KC_ENTER", KeyCode::ENTER),
    ("KC_ESCAPE", KeyCode::ESCAPE),
    ("KC_BACKSPACE", KeyCode::BACKSPACE),
    ("KC_TAB", KeyCode::TAB),
    ("KC_SPACE", KeyCode::SPACE),
    ("KC_MINUS", KeyCode(0x2D)),
    ("KC_EQUAL", KeyCode(0x2E)),
    ("KC_LEFT_BRACKET", KeyCode(0x2F)),
    ("KC_RIGHT_BRACKET", KeyCode(0x30)),
    ("KC_BACKSLASH", KeyCode(0x31)),
    ("KC_SEMICOLON", KeyCode(0x33)),
    ("KC_QUOTE", KeyCode(0x34)),
    ("KC_GRAVE", KeyCode(0x35)),
    ("KC_COMMA", KeyCode(0x36)),
    ("KC_DOT", KeyCode(0x37)),
    ("KC_SLASH", KeyCode(0x38)),
    ("KC_CAPS_LOCK", KeyCode(0x39)),
    // Function row
    ("KC_F1", KeyCode(0x3A)),
    ("KC_F2", KeyCode(0x3B)),
    ("KC_F3", KeyCode(0x3C)),
    ("KC_F4", KeyCode(0x3D)),
    ("KC_F5", KeyCode(0x3E)),
    ("KC_F6", KeyCode(0x3F)),
    ("KC_F7", KeyCode(0x40)),
    ("KC_F8", KeyCode(0x41)),
    ("KC_F9", KeyCode(0x42)),
    ("KC_F10", KeyCode(0x43)),
    ("KC_F11", KeyCode(0x44)),
    ("KC_F12", KeyCode(0x45)),
    // Navigation
    ("KC_PRINT_SCREEN", KeyCode(0x46)),
    ("KC_SCROLL_LOCK", KeyCode(0x47)),
    ("KC_PAUSE", KeyCode(0x48)),
    ("KC_INSERT", KeyCode(0x49)),
    ("KC_HOME", KeyCode(0x4A)),
    ("KC_PAGE_UP", KeyCode(0x4B)),
    ("KC_DELETE", KeyCode(0x4C)),
    ("KC_END", KeyCode(0x4D)),
    ("KC_PAGE_DOWN", KeyCode(0x4E)),
    ("KC_RIGHT", KeyCode::RIGHT),
    ("KC_LEFT", KeyCode::LEFT),
    ("KC_DOWN", KeyCode::DOWN),
    ("KC_UP", KeyCode::UP),
    ("KC_EXSEL", KeyCode::EXSEL),
    // Modifiers (never cancelled, but nameable)
    ("KC_LEFT_CTRL", KeyCode::LEFT_CTRL),
    ("KC_LEFT_SHIFT", KeyCode::LEFT_SHIFT),
    ("KC_LEFT_ALT", KeyCode::LEFT_ALT),
    ("KC_LEFT_GUI", KeyCode::LEFT_GUI),
    ("KC_RIGHT_CTRL", KeyCode::RIGHT_CTRL),
    ("KC_RIGHT_SHIFT", KeyCode::RIGHT_SHIFT),
    ("KC_RIGHT_ALT", KeyCode::RIGHT_ALT),
    ("KC_RIGHT_GUI", KeyCode::RIGHT_GUI),
];

/// Short aliases accepted in table files on top of the canonical names.
const KEY_ALIASES: &[(&str, KeyCode)] = &[
    ("KC_ENT", KeyCode::ENTER),
    ("KC_ESC", KeyCode::ESCAPE),
    ("KC_BSPC", KeyCode::BACKSPACE),
    ("KC_SPC", KeyCode::SPACE),
    ("KC_RGHT", KeyCode::RIGHT),
    ("KC_LSFT", KeyCode::LEFT_SHIFT),
    ("KC_RSFT", KeyCode::RIGHT_SHIFT),
    ("KC_LCTL", KeyCode::LEFT_CTRL),
    ("KC_RCTL", KeyCode::RIGHT_CTRL),
];

lazy_static::lazy_static! {
    static ref BY_NAME: HashMap<String, KeyCode> = {
        let mut m = HashMap::new();
        for (name, code) in KEY_NAMES.iter().chain(KEY_ALIASES.iter()) {
            m.insert(name.to_string(), *code);
            if let Some(short) = name.strip_prefix("KC_") {
                m.insert(short.to_string(), *code);
            }
        }
        m
    };
}

/// Resolves `KC_A`, `a`, `Left` or a hex literal such as `0x04`.
pub fn parse_keycode(raw: &str) -> Option<KeyCode> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16).ok().map(KeyCode);
    }
    BY_NAME.get(&raw.to_ascii_uppercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_range() {
        assert!(KeyCode::A.is_basic());
        assert!(KeyCode::EXSEL.is_basic());
        assert!(KeyCode::UP.is_basic());
        assert!(!KeyCode::NO.is_basic());
        assert!(!KeyCode::LEFT_SHIFT.is_basic());
        assert!(KeyCode::LEFT_SHIFT.is_modifier());
        assert!(!KeyCode(0x7E40).is_basic());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_keycode("KC_A"), Some(KeyCode::A));
        assert_eq!(parse_keycode("d"), Some(KeyCode::D));
        assert_eq!(parse_keycode("Left"), Some(KeyCode::LEFT));
        assert_eq!(parse_keycode("kc_rght"), Some(KeyCode::RIGHT));
        assert_eq!(parse_keycode("0x1a"), Some(KeyCode::W));
        assert_eq!(parse_keycode("KC_NOPE"), None);
        assert_eq!(parse_keycode(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyCode::W.to_string(), "KC_W");
        assert_eq!(KeyCode(0x7E40).to_string(), "0x7E40");
    }
}
