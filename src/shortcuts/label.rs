//! Platform-aware display text for a key combo.
//!
//! `["meta", "shift", "k"]` renders as `⌘ + ⇧ + K` on macOS and
//! `Ctrl + ⇧ + K` elsewhere.

use super::types::Key;

/// Platform enum for display formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(target_os = "linux")]
        {
            Platform::Linux
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            Platform::Linux
        }
    }

    pub fn is_mac(self) -> bool {
        self == Platform::MacOS
    }
}

/// Default rendering of a single key.
pub fn key_label(key: &str, platform: Platform) -> String {
    let key = Key::new(key);
    match key.as_str() {
        "meta" if platform.is_mac() => "⌘",
        "meta" => "Ctrl",
        "ctrl" => "Ctrl",
        "shift" => "⇧",
        "alt" if platform.is_mac() => "⌥",
        "alt" => "Alt",
        "enter" => "↵",
        other => return other.to_uppercase(),
    }
    .to_string()
}

/// Render `keys` with the default symbols, joined by `" + "`.
pub fn shortcut_label<S: AsRef<str>>(keys: &[S], platform: Platform) -> String {
    keys.iter()
        .map(|k| key_label(k.as_ref(), platform))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Render every key with `render(key, index, all_keys)` and concatenate.
///
/// The callback owns separators as well as symbols.
pub fn shortcut_label_with<S, F>(keys: &[S], mut render: F) -> String
where
    S: AsRef<str>,
    F: FnMut(&str, usize, &[S]) -> String,
{
    keys.iter()
        .enumerate()
        .map(|(i, k)| render(k.as_ref(), i, keys))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_symbols() {
        assert_eq!(
            shortcut_label(&["meta", "shift", "k"], Platform::MacOS),
            "⌘ + ⇧ + K"
        );
        assert_eq!(shortcut_label(&["alt", "enter"], Platform::MacOS), "⌥ + ↵");
    }

    #[test]
    fn test_other_platform_text() {
        assert_eq!(shortcut_label(&["meta", "s"], Platform::Windows), "Ctrl + S");
        assert_eq!(shortcut_label(&["Alt", "F4"], Platform::Linux), "Alt + F4");
        assert_eq!(shortcut_label(&["command", "p"], Platform::Linux), "Ctrl + P");
    }

    #[test]
    fn test_custom_renderer_controls_separators() {
        let label = shortcut_label_with(&["ctrl", "alt", "delete"], |key, i, all| {
            let sep = if i + 1 < all.len() { "-" } else { "" };
            format!("[{}]{}", key, sep)
        });
        assert_eq!(label, "[ctrl]-[alt]-[delete]");
    }

    #[test]
    fn test_empty_keys_render_empty() {
        let keys: [&str; 0] = [];
        assert_eq!(shortcut_label(&keys, Platform::MacOS), "");
    }
}
