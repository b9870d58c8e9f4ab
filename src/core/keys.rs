// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/keys.rs
//!
//! Virtual key codes and their classification
//!
//! Keys are identified by their platform virtual-key code. This module holds:
//! - The key code constants the engine and the editor refer to by name
//! - `KeyType` / `ModifierFamily` / `ModifierSide` classification
//! - Human readable key names used by the profile parser and the CLI
//!
//! A modifier family (Win, Ctrl, Alt, Shift) has a generic form that stands
//! for either side plus a left and a right specific form. Win has no generic
//! platform code, so `VK_WIN_BOTH` is a symbolic value outside the byte range.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform virtual-key code
pub type VirtualKey = u32;

/// Null key: an unset slot, or a disabled remap target
pub const VK_NULL: VirtualKey = 0x00;

pub const VK_LBUTTON: VirtualKey = 0x01;
pub const VK_RBUTTON: VirtualKey = 0x02;
pub const VK_MBUTTON: VirtualKey = 0x04;
pub const VK_XBUTTON1: VirtualKey = 0x05;
pub const VK_XBUTTON2: VirtualKey = 0x06;

pub const VK_BACK: VirtualKey = 0x08;
pub const VK_TAB: VirtualKey = 0x09;
pub const VK_RETURN: VirtualKey = 0x0D;
pub const VK_SHIFT: VirtualKey = 0x10;
pub const VK_CONTROL: VirtualKey = 0x11;
pub const VK_MENU: VirtualKey = 0x12;
pub const VK_PAUSE: VirtualKey = 0x13;
pub const VK_CAPITAL: VirtualKey = 0x14;
pub const VK_ESCAPE: VirtualKey = 0x1B;
pub const VK_SPACE: VirtualKey = 0x20;
pub const VK_PRIOR: VirtualKey = 0x21;
pub const VK_NEXT: VirtualKey = 0x22;
pub const VK_END: VirtualKey = 0x23;
pub const VK_HOME: VirtualKey = 0x24;
pub const VK_LEFT: VirtualKey = 0x25;
pub const VK_UP: VirtualKey = 0x26;
pub const VK_RIGHT: VirtualKey = 0x27;
pub const VK_DOWN: VirtualKey = 0x28;
pub const VK_SNAPSHOT: VirtualKey = 0x2C;
pub const VK_INSERT: VirtualKey = 0x2D;
pub const VK_DELETE: VirtualKey = 0x2E;
pub const VK_LWIN: VirtualKey = 0x5B;
pub const VK_RWIN: VirtualKey = 0x5C;
pub const VK_APPS: VirtualKey = 0x5D;
pub const VK_NUMPAD0: VirtualKey = 0x60;
pub const VK_MULTIPLY: VirtualKey = 0x6A;
pub const VK_ADD: VirtualKey = 0x6B;
pub const VK_SUBTRACT: VirtualKey = 0x6D;
pub const VK_DECIMAL: VirtualKey = 0x6E;
pub const VK_DIVIDE: VirtualKey = 0x6F;
pub const VK_F1: VirtualKey = 0x70;
pub const VK_F24: VirtualKey = 0x87;
pub const VK_NUMLOCK: VirtualKey = 0x90;
pub const VK_SCROLL: VirtualKey = 0x91;
pub const VK_LSHIFT: VirtualKey = 0xA0;
pub const VK_RSHIFT: VirtualKey = 0xA1;
pub const VK_LCONTROL: VirtualKey = 0xA2;
pub const VK_RCONTROL: VirtualKey = 0xA3;
pub const VK_LMENU: VirtualKey = 0xA4;
pub const VK_RMENU: VirtualKey = 0xA5;

/// Symbolic "either Win key" code
pub const VK_WIN_BOTH: VirtualKey = 0x104;

/// Reserved, otherwise unused code whose key-up flushes OS combo detection
pub const DUMMY_KEY: VirtualKey = 0xFF;

/// Highest code that can be physically held
pub const MAX_KEY_CODE: VirtualKey = 0xFE;

/// Classification of a virtual key
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyType {
    Win,
    Ctrl,
    Alt,
    Shift,
    /// Anything that is not a modifier
    Action,
}

/// The four modifier families, in emission order
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ModifierFamily {
    Win,
    Ctrl,
    Alt,
    Shift,
}

impl ModifierFamily {
    /// All families in the order target keys are pressed (Win → Ctrl → Alt → Shift).
    pub const ALL: [ModifierFamily; 4] = [
        ModifierFamily::Win,
        ModifierFamily::Ctrl,
        ModifierFamily::Alt,
        ModifierFamily::Shift,
    ];

    /// Returns the family `key` belongs to, or `None` for action keys.
    pub fn of(key: VirtualKey) -> Option<Self> {
        match key {
            VK_LWIN | VK_RWIN | VK_WIN_BOTH => Some(ModifierFamily::Win),
            VK_CONTROL | VK_LCONTROL | VK_RCONTROL => Some(ModifierFamily::Ctrl),
            VK_MENU | VK_LMENU | VK_RMENU => Some(ModifierFamily::Alt),
            VK_SHIFT | VK_LSHIFT | VK_RSHIFT => Some(ModifierFamily::Shift),
            _ => None,
        }
    }

    /// Either-side code (`VK_WIN_BOTH` for Win)
    pub fn generic_key(self) -> VirtualKey {
        match self {
            ModifierFamily::Win => VK_WIN_BOTH,
            ModifierFamily::Ctrl => VK_CONTROL,
            ModifierFamily::Alt => VK_MENU,
            ModifierFamily::Shift => VK_SHIFT,
        }
    }

    pub fn left_key(self) -> VirtualKey {
        match self {
            ModifierFamily::Win => VK_LWIN,
            ModifierFamily::Ctrl => VK_LCONTROL,
            ModifierFamily::Alt => VK_LMENU,
            ModifierFamily::Shift => VK_LSHIFT,
        }
    }

    pub fn right_key(self) -> VirtualKey {
        match self {
            ModifierFamily::Win => VK_RWIN,
            ModifierFamily::Ctrl => VK_RCONTROL,
            ModifierFamily::Alt => VK_RMENU,
            ModifierFamily::Shift => VK_RSHIFT,
        }
    }

    /// Code for this family on the given side.
    pub fn key_for(self, side: ModifierSide) -> VirtualKey {
        match side {
            ModifierSide::Left => self.left_key(),
            ModifierSide::Right => self.right_key(),
            ModifierSide::Either => self.generic_key(),
        }
    }
}

impl fmt::Display for ModifierFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierFamily::Win => write!(f, "Win"),
            ModifierFamily::Ctrl => write!(f, "Ctrl"),
            ModifierFamily::Alt => write!(f, "Alt"),
            ModifierFamily::Shift => write!(f, "Shift"),
        }
    }
}

/// Which physical key(s) of a family a shortcut slot accepts
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ModifierSide {
    Left,
    Right,
    /// Generic form, matches both sides
    Either,
}

impl ModifierSide {
    /// Returns the side encoded by a modifier code, or `None` for action keys.
    pub fn of(key: VirtualKey) -> Option<Self> {
        match key {
            VK_LWIN | VK_LCONTROL | VK_LMENU | VK_LSHIFT => Some(ModifierSide::Left),
            VK_RWIN | VK_RCONTROL | VK_RMENU | VK_RSHIFT => Some(ModifierSide::Right),
            VK_WIN_BOTH | VK_CONTROL | VK_MENU | VK_SHIFT => Some(ModifierSide::Either),
            _ => None,
        }
    }
}

/// Classifies `key` into exactly one `KeyType`.
pub fn key_type(key: VirtualKey) -> KeyType {
    match ModifierFamily::of(key) {
        Some(ModifierFamily::Win) => KeyType::Win,
        Some(ModifierFamily::Ctrl) => KeyType::Ctrl,
        Some(ModifierFamily::Alt) => KeyType::Alt,
        Some(ModifierFamily::Shift) => KeyType::Shift,
        None => KeyType::Action,
    }
}

pub fn is_modifier_key(key: VirtualKey) -> bool {
    key_type(key) != KeyType::Action
}

/// Mouse buttons share the virtual-key space but never take part in remaps.
pub fn is_mouse_button(key: VirtualKey) -> bool {
    matches!(
        key,
        VK_LBUTTON | VK_RBUTTON | VK_MBUTTON | VK_XBUTTON1 | VK_XBUTTON2
    )
}

/// Canonical names for keys outside the letter/digit/function ranges.
const NAMED_KEYS: &[(VirtualKey, &str)] = &[
    (VK_BACK, "Backspace"),
    (VK_TAB, "Tab"),
    (VK_RETURN, "Enter"),
    (VK_SHIFT, "Shift"),
    (VK_CONTROL, "Ctrl"),
    (VK_MENU, "Alt"),
    (VK_PAUSE, "Pause"),
    (VK_CAPITAL, "CapsLock"),
    (VK_ESCAPE, "Esc"),
    (VK_SPACE, "Space"),
    (VK_PRIOR, "PageUp"),
    (VK_NEXT, "PageDown"),
    (VK_END, "End"),
    (VK_HOME, "Home"),
    (VK_LEFT, "Left"),
    (VK_UP, "Up"),
    (VK_RIGHT, "Right"),
    (VK_DOWN, "Down"),
    (VK_SNAPSHOT, "PrintScreen"),
    (VK_INSERT, "Insert"),
    (VK_DELETE, "Delete"),
    (VK_LWIN, "LWin"),
    (VK_RWIN, "RWin"),
    (VK_APPS, "Apps"),
    (VK_MULTIPLY, "NumMultiply"),
    (VK_ADD, "NumAdd"),
    (VK_SUBTRACT, "NumSubtract"),
    (VK_DECIMAL, "NumDecimal"),
    (VK_DIVIDE, "NumDivide"),
    (VK_NUMLOCK, "NumLock"),
    (VK_SCROLL, "ScrollLock"),
    (VK_LSHIFT, "LShift"),
    (VK_RSHIFT, "RShift"),
    (VK_LCONTROL, "LCtrl"),
    (VK_RCONTROL, "RCtrl"),
    (VK_LMENU, "LAlt"),
    (VK_RMENU, "RAlt"),
    (0xAD, "VolumeMute"),
    (0xAE, "VolumeDown"),
    (0xAF, "VolumeUp"),
    (0xB0, "MediaNext"),
    (0xB1, "MediaPrevious"),
    (0xB2, "MediaStop"),
    (0xB3, "MediaPlayPause"),
    (0xBA, "Semicolon"),
    (0xBB, "Equals"),
    (0xBC, "Comma"),
    (0xBD, "Minus"),
    (0xBE, "Period"),
    (0xBF, "Slash"),
    (0xC0, "Backtick"),
    (0xDB, "LBracket"),
    (0xDC, "Backslash"),
    (0xDD, "RBracket"),
    (0xDE, "Quote"),
    (VK_WIN_BOTH, "Win"),
];

/// Alternative spellings accepted when parsing.
const KEY_ALIASES: &[(&str, VirtualKey)] = &[
    ("back", VK_BACK),
    ("return", VK_RETURN),
    ("control", VK_CONTROL),
    ("lcontrol", VK_LCONTROL),
    ("rcontrol", VK_RCONTROL),
    ("menu", VK_MENU),
    ("lmenu", VK_LMENU),
    ("rmenu", VK_RMENU),
    ("altgr", VK_RMENU),
    ("caps", VK_CAPITAL),
    ("capital", VK_CAPITAL),
    ("escape", VK_ESCAPE),
    ("del", VK_DELETE),
    ("ins", VK_INSERT),
    ("pgup", VK_PRIOR),
    ("pgdn", VK_NEXT),
    ("super", VK_WIN_BOTH),
    ("lsuper", VK_LWIN),
    ("rsuper", VK_RWIN),
];

/// Human readable name for `key`.
///
/// Unknown codes render as hex (`0x7E`) so every code has a name that
/// `parse_key_name` accepts back.
pub fn key_name(key: VirtualKey) -> String {
    match key {
        VK_NULL => "None".to_string(),
        0x30..=0x39 | 0x41..=0x5A => char::from_u32(key)
            .map(|c| c.to_string())
            .unwrap_or_else(|| format!("0x{:02X}", key)),
        0x60..=0x69 => format!("Num{}", key - VK_NUMPAD0),
        VK_F1..=VK_F24 => format!("F{}", key - VK_F1 + 1),
        _ => NAMED_KEYS
            .iter()
            .find(|(code, _)| *code == key)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| format!("0x{:02X}", key)),
    }
}

/// Parses a key name back into its code (case-insensitive).
///
/// Accepts canonical names, the aliases above, single letters and digits,
/// `F1`-`F24`, `Num0`-`Num9` and raw hex codes such as `0x7E`.
pub fn parse_key_name(name: &str) -> Option<VirtualKey> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(c.to_ascii_uppercase() as VirtualKey);
        }
        return None;
    }

    let lower = name.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        return VirtualKey::from_str_radix(hex, 16)
            .ok()
            .filter(|code| *code != VK_NULL && (*code <= MAX_KEY_CODE || *code == VK_WIN_BOTH));
    }
    if let Some(number) = lower.strip_prefix("num").and_then(|n| n.parse::<u32>().ok()) {
        return (number <= 9).then(|| VK_NUMPAD0 + number);
    }
    if let Some(number) = lower.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
        return (1..=24).contains(&number).then(|| VK_F1 + number - 1);
    }

    NAMED_KEYS
        .iter()
        .find(|(_, key_name)| key_name.eq_ignore_ascii_case(&lower))
        .map(|(code, _)| *code)
        .or_else(|| {
            KEY_ALIASES
                .iter()
                .find(|(alias, _)| *alias == lower)
                .map(|(_, code)| *code)
        })
}

/// Keys offered by the editor's dropdowns, in display order.
///
/// The list starts with `VK_NULL`, the "None" entry used to clear a slot.
pub fn selectable_keys() -> Vec<VirtualKey> {
    let mut keys = vec![VK_NULL];
    keys.extend(0x41..=0x5A);
    keys.extend(0x30..=0x39);
    keys.extend(VK_F1..=VK_F24);
    keys.extend(VK_NUMPAD0..=VK_NUMPAD0 + 9);
    keys.extend(NAMED_KEYS.iter().map(|(code, _)| *code));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_classification() {
        assert_eq!(key_type(VK_LWIN), KeyType::Win);
        assert_eq!(key_type(VK_WIN_BOTH), KeyType::Win);
        assert_eq!(key_type(VK_RCONTROL), KeyType::Ctrl);
        assert_eq!(key_type(VK_MENU), KeyType::Alt);
        assert_eq!(key_type(VK_LSHIFT), KeyType::Shift);
        assert_eq!(key_type(0x41), KeyType::Action);
        assert_eq!(key_type(VK_CAPITAL), KeyType::Action);
    }

    #[test]
    fn test_family_keys() {
        assert_eq!(ModifierFamily::Ctrl.key_for(ModifierSide::Either), VK_CONTROL);
        assert_eq!(ModifierFamily::Alt.key_for(ModifierSide::Right), VK_RMENU);
        assert_eq!(ModifierFamily::Win.key_for(ModifierSide::Either), VK_WIN_BOTH);
        assert_eq!(ModifierSide::of(VK_LSHIFT), Some(ModifierSide::Left));
        assert_eq!(ModifierSide::of(0x41), None);
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in selectable_keys().into_iter().skip(1) {
            let name = key_name(key);
            assert_eq!(parse_key_name(&name), Some(key), "name {}", name);
        }
    }

    #[test]
    fn test_parse_aliases_and_case() {
        assert_eq!(parse_key_name("ctrl"), Some(VK_CONTROL));
        assert_eq!(parse_key_name("CONTROL"), Some(VK_CONTROL));
        assert_eq!(parse_key_name("lctrl"), Some(VK_LCONTROL));
        assert_eq!(parse_key_name("super"), Some(VK_WIN_BOTH));
        assert_eq!(parse_key_name("c"), Some(0x43));
        assert_eq!(parse_key_name("f12"), Some(0x7B));
        assert_eq!(parse_key_name("0x7e"), Some(0x7E));
        assert_eq!(parse_key_name("0x00"), None);
        assert_eq!(parse_key_name("F25"), None);
        assert_eq!(parse_key_name("Hyper"), None);
        assert_eq!(parse_key_name("+"), None);
    }

    #[test]
    fn test_mouse_buttons() {
        assert!(is_mouse_button(VK_LBUTTON));
        assert!(is_mouse_button(VK_XBUTTON2));
        assert!(!is_mouse_button(0x03));
        assert!(!is_mouse_button(VK_BACK));
    }
}
