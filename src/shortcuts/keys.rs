//! Physical key code normalization.
//!
//! Maps the code delivered by the event source (`"ControlLeft"`, `"KeyA"`,
//! `"Numpad7"`) to the canonical key name used by every combo.

use super::types::Key;

/// Named physical keys. Letter, digit and numpad-digit codes are derived
/// structurally in [`normalize_key`].
static KEY_CODE_TABLE: &[(&str, &str)] = &[
    ("ControlLeft", "ctrl (left)"),
    ("ControlRight", "ctrl (right)"),
    ("ShiftLeft", "shift (left)"),
    ("ShiftRight", "shift (right)"),
    ("AltLeft", "alt (left)"),
    ("AltRight", "alt (right)"),
    ("MetaLeft", "meta (left)"),
    ("MetaRight", "meta (right)"),
    ("OSLeft", "meta (left)"),
    ("OSRight", "meta (right)"),
    ("NumpadAdd", "numpad +"),
    ("NumpadSubtract", "numpad -"),
    ("NumpadMultiply", "numpad *"),
    ("NumpadDivide", "numpad /"),
    ("NumpadEnter", "numpad enter"),
    ("NumpadDecimal", "numpad ."),
    ("NumpadEqual", "numpad ="),
    ("NumpadComma", "numpad ,"),
    ("NumpadParenLeft", "numpad ("),
    ("NumpadParenRight", "numpad )"),
    ("Minus", "-"),
    ("Equal", "="),
    ("BracketLeft", "["),
    ("BracketRight", "]"),
    ("Backslash", "\\"),
    ("Semicolon", ";"),
    ("Quote", "'"),
    ("Comma", ","),
    ("Period", "."),
    ("Slash", "/"),
    ("Backquote", "`"),
    ("IntlBackslash", "intl \\"),
    ("IntlRo", "intl ro"),
    ("IntlYen", "intl yen"),
    ("Escape", "esc"),
    ("Tab", "tab"),
    ("CapsLock", "caps lock"),
    ("Enter", "enter"),
    ("Space", "space"),
    ("Backspace", "backspace"),
    ("NumLock", "num lock"),
    ("ScrollLock", "scroll lock"),
    ("Pause", "pause"),
    ("ContextMenu", "context menu"),
    ("PrintScreen", "print screen"),
    ("Insert", "insert"),
    ("Delete", "delete"),
    ("Home", "home"),
    ("End", "end"),
    ("PageUp", "page up"),
    ("PageDown", "page down"),
    ("ArrowUp", "arrow up"),
    ("ArrowDown", "arrow down"),
    ("ArrowLeft", "arrow left"),
    ("ArrowRight", "arrow right"),
    ("AudioVolumeMute", "volume mute"),
    ("AudioVolumeDown", "volume down"),
    ("AudioVolumeUp", "volume up"),
    ("VolumeMute", "volume mute"),
    ("VolumeDown", "volume down"),
    ("VolumeUp", "volume up"),
    ("MediaTrackNext", "media next track"),
    ("MediaTrackPrevious", "media previous track"),
    ("MediaPlayPause", "media play/pause"),
    ("MediaStop", "media stop"),
    ("MediaSelect", "media select"),
    ("BrowserHome", "browser home"),
    ("BrowserSearch", "browser search"),
    ("BrowserFavorites", "browser favorites"),
    ("BrowserRefresh", "browser refresh"),
    ("BrowserStop", "browser stop"),
    ("BrowserForward", "browser forward"),
    ("BrowserBack", "browser back"),
    ("LaunchApp1", "launch app 1"),
    ("LaunchApp2", "launch app 2"),
    ("LaunchMail", "launch mail"),
    ("LaunchMediaPlayer", "launch media player"),
    ("LaunchCalculator", "launch calculator"),
    ("Convert", "convert"),
    ("NonConvert", "non convert"),
    ("KanaMode", "kana mode"),
    ("Lang1", "language 1"),
    ("Lang2", "language 2"),
    ("Lang3", "language 3"),
    ("Lang4", "language 4"),
    ("Lang5", "language 5"),
    ("Power", "power"),
    ("Sleep", "sleep"),
    ("WakeUp", "wake up"),
    ("Eject", "eject"),
    ("Undo", "undo"),
    ("Redo", "redo"),
    ("Copy", "copy"),
    ("Cut", "cut"),
    ("Paste", "paste"),
    ("Select", "select"),
    ("Again", "again"),
    ("Find", "find"),
    ("Open", "open"),
    ("Props", "properties"),
    ("Help", "help"),
    ("Fn", "fn"),
    ("BrightnessUp", "brightness up"),
    ("BrightnessDown", "brightness down"),
];

/// Map a raw physical key code to its canonical key name.
///
/// Never fails: an unmapped code degrades to its own lower-cased spelling.
pub fn normalize_key(code: &str) -> Key {
    if let Some((_, name)) = KEY_CODE_TABLE.iter().find(|(c, _)| *c == code) {
        return Key::new(name);
    }
    if let Some(letter) = code.strip_prefix("Key").filter(|rest| is_single_alnum(rest)) {
        return Key::new(letter);
    }
    if let Some(digit) = code.strip_prefix("Digit").filter(|rest| is_single_alnum(rest)) {
        return Key::new(digit);
    }
    if let Some(digit) = code.strip_prefix("Numpad").filter(|rest| is_single_alnum(rest)) {
        return Key::new(format!("numpad {}", digit));
    }
    Key::new(code)
}

fn is_single_alnum(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_codes_map_to_sided_names() {
        assert_eq!(normalize_key("ControlLeft").as_str(), "ctrl (left)");
        assert_eq!(normalize_key("ShiftRight").as_str(), "shift (right)");
        assert_eq!(normalize_key("OSLeft").as_str(), "meta (left)");
    }

    #[test]
    fn test_structural_codes() {
        assert_eq!(normalize_key("KeyA").as_str(), "a");
        assert_eq!(normalize_key("Digit7").as_str(), "7");
        assert_eq!(normalize_key("Numpad3").as_str(), "numpad 3");
        assert_eq!(normalize_key("NumpadAdd").as_str(), "numpad +");
    }

    #[test]
    fn test_named_codes() {
        assert_eq!(normalize_key("ArrowUp").as_str(), "arrow up");
        assert_eq!(normalize_key("Escape").as_str(), "esc");
        assert_eq!(normalize_key("Backslash").as_str(), "\\");
    }

    #[test]
    fn test_unknown_code_degrades_to_lowercase() {
        assert_eq!(normalize_key("F5").as_str(), "f5");
        assert_eq!(normalize_key("SomeVendorKey").as_str(), "somevendorkey");
        assert_eq!(normalize_key("KeyAB").as_str(), "keyab");
    }
}
