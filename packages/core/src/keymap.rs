//! Keyboard shortcuts
//!
//! Chords are written like `Ctrl+Shift+Z`. `Cmd`/`Meta` are folded into
//! `Ctrl` so one keymap serves every platform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorCommand {
    Save,
    ExportJson,
    Undo,
    Redo,
    OpenCommandPalette,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Uppercased key name, e.g. `Z` or `ESCAPE`
    pub key: String,
}

impl KeyChord {
    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            shift: false,
            alt: false,
            key: key.to_ascii_uppercase().to_string(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

impl FromStr for KeyChord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chord = KeyChord {
            ctrl: false,
            shift: false,
            alt: false,
            key: String::new(),
        };

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(format!("empty key chord: {:?}", s));
        };

        for modifier in modifiers {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" | "meta" | "super" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                other => return Err(format!("unknown modifier '{}' in {:?}", other, s)),
            }
        }

        if key.is_empty() {
            return Err(format!("missing key in {:?}", s));
        }
        chord.key = key.to_ascii_uppercase();
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        f.write_str(&self.key)
    }
}

#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyChord, EditorCommand>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Keymap {
            bindings: HashMap::new(),
        };
        keymap.bind(KeyChord::ctrl('s'), EditorCommand::Save);
        keymap.bind(KeyChord::ctrl('e').with_shift(), EditorCommand::ExportJson);
        keymap.bind(KeyChord::ctrl('z'), EditorCommand::Undo);
        keymap.bind(KeyChord::ctrl('z').with_shift(), EditorCommand::Redo);
        keymap.bind(KeyChord::ctrl('y'), EditorCommand::Redo);
        keymap.bind(KeyChord::ctrl('k'), EditorCommand::OpenCommandPalette);
        keymap
    }
}

impl Keymap {
    /// Bind `chord`, replacing any previous binding
    pub fn bind(&mut self, chord: KeyChord, command: EditorCommand) -> Option<EditorCommand> {
        self.bindings.insert(chord, command)
    }

    pub fn unbind(&mut self, chord: &KeyChord) -> Option<EditorCommand> {
        self.bindings.remove(chord)
    }

    pub fn resolve(&self, chord: &KeyChord) -> Option<EditorCommand> {
        self.bindings.get(chord).copied()
    }

    /// Resolve a chord written as text; unparseable chords resolve to nothing
    pub fn resolve_str(&self, chord: &str) -> Option<EditorCommand> {
        chord.parse::<KeyChord>().ok().and_then(|chord| self.resolve(&chord))
    }

    /// All chords bound to `command`, sorted for display
    pub fn chords_for(&self, command: EditorCommand) -> Vec<String> {
        let mut chords: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == command)
            .map(|(chord, _)| chord.to_string())
            .collect();
        chords.sort();
        chords
    }
}
