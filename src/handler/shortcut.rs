//! Keyboard shortcut parsing and the shortcut handler's transforms.
//!
//! # Syntax
//! ```text
//! sequence := chord (", " chord){0,3}
//! chord    := (modifier "+")* key
//! modifier := Ctrl | Alt | Shift | Meta   (plus aliases, case-insensitive)
//! key      := letter | digit | punctuation | F1..F35 | named key
//! ```
//!
//! A lone `+` or `,` is a key, so `Ctrl++` and `Ctrl+,` parse.

use std::fmt;
use std::str::FromStr;

use crate::error::KeySequenceError;

/// Most chords a single sequence may hold.
pub const MAX_CHORDS: usize = 4;

/// Stored token for the Return key.
pub const ENTER_TOKEN: &str = "Enter";

/// Keyboard modifier. Ordering is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "Ctrl"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

impl FromStr for Modifier {
    type Err = KeySequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "alt" | "option" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            "meta" | "cmd" | "command" | "super" | "win" => Ok(Modifier::Meta),
            _ => Err(KeySequenceError::InvalidModifier(s.to_string())),
        }
    }
}

/// A single non-modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letter (stored upper-case), digit or punctuation.
    Char(char),
    /// Function key F1..F35.
    Function(u8),
    Escape,
    Tab,
    Backtab,
    Backspace,
    Return,
    Enter,
    Insert,
    Delete,
    Pause,
    Print,
    SysReq,
    Home,
    End,
    Left,
    Up,
    Right,
    Down,
    PageUp,
    PageDown,
    CapsLock,
    NumLock,
    ScrollLock,
    Menu,
    Help,
    Space,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Char(c) => return write!(f, "{}", c),
            Key::Function(n) => return write!(f, "F{}", n),
            Key::Escape => "Esc",
            Key::Tab => "Tab",
            Key::Backtab => "Backtab",
            Key::Backspace => "Backspace",
            Key::Return => "Return",
            Key::Enter => "Enter",
            Key::Insert => "Ins",
            Key::Delete => "Del",
            Key::Pause => "Pause",
            Key::Print => "Print",
            Key::SysReq => "SysReq",
            Key::Home => "Home",
            Key::End => "End",
            Key::Left => "Left",
            Key::Up => "Up",
            Key::Right => "Right",
            Key::Down => "Down",
            Key::PageUp => "PgUp",
            Key::PageDown => "PgDown",
            Key::CapsLock => "CapsLock",
            Key::NumLock => "NumLock",
            Key::ScrollLock => "ScrollLock",
            Key::Menu => "Menu",
            Key::Help => "Help",
            Key::Space => "Space",
        };
        f.write_str(name)
    }
}

impl FromStr for Key {
    type Err = KeySequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_alphanumeric() {
                return Ok(Key::Char(c.to_uppercase().next().unwrap_or(c)));
            }
            if !c.is_whitespace() && !c.is_control() {
                return Ok(Key::Char(c));
            }
            return Err(KeySequenceError::UnknownKey(s.to_string()));
        }

        let lower = s.to_lowercase();
        let key = match lower.as_str() {
            "esc" | "escape" => Key::Escape,
            "tab" => Key::Tab,
            "backtab" => Key::Backtab,
            "backspace" => Key::Backspace,
            "return" => Key::Return,
            "enter" => Key::Enter,
            "ins" | "insert" => Key::Insert,
            "del" | "delete" => Key::Delete,
            "pause" => Key::Pause,
            "print" => Key::Print,
            "sysreq" => Key::SysReq,
            "home" => Key::Home,
            "end" => Key::End,
            "left" => Key::Left,
            "up" => Key::Up,
            "right" => Key::Right,
            "down" => Key::Down,
            "pgup" | "pageup" => Key::PageUp,
            "pgdown" | "pagedown" => Key::PageDown,
            "capslock" => Key::CapsLock,
            "numlock" => Key::NumLock,
            "scrolllock" => Key::ScrollLock,
            "menu" => Key::Menu,
            "help" => Key::Help,
            "space" => Key::Space,
            other => {
                let n = other
                    .strip_prefix('f')
                    .and_then(|num| num.parse::<u8>().ok())
                    .filter(|n| (1..=35).contains(n))
                    .ok_or_else(|| KeySequenceError::UnknownKey(s.to_string()))?;
                Key::Function(n)
            }
        };
        Ok(key)
    }
}

/// Modifiers plus one key, e.g. `Ctrl+Shift+S`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Sorted, without duplicates.
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl KeyChord {
    pub fn new(mut modifiers: Vec<Modifier>, key: Key) -> Self {
        modifiers.sort();
        modifiers.dedup();
        Self { modifiers, key }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyChord {
    type Err = KeySequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeySequenceError::Empty);
        }

        let (modifier_part, key_part) = if s == "+" {
            (None, "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (Some(prefix), "+")
        } else {
            match s.rfind('+') {
                Some(idx) => (Some(&s[..idx]), &s[idx + 1..]),
                None => (None, s),
            }
        };

        let mut modifiers = Vec::new();
        if let Some(part) = modifier_part {
            for name in part.split('+') {
                modifiers.push(name.parse::<Modifier>()?);
            }
        }

        let key_part = key_part.trim();
        if key_part.is_empty() {
            return Err(KeySequenceError::UnknownKey(s.to_string()));
        }
        Ok(KeyChord::new(modifiers, key_part.parse()?))
    }
}

/// One to four chords pressed in succession, e.g. `Ctrl+K, Ctrl+C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySequence {
    chords: Vec<KeyChord>,
}

impl KeySequence {
    /// True for the bare Return key with no modifiers.
    pub fn is_return(&self) -> bool {
        match self.chords.as_slice() {
            [chord] => chord.modifiers.is_empty() && chord.key == Key::Return,
            _ => false,
        }
    }
}

impl From<KeyChord> for KeySequence {
    fn from(chord: KeyChord) -> Self {
        Self { chords: vec![chord] }
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chord) in self.chords.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", chord)?;
        }
        Ok(())
    }
}

impl FromStr for KeySequence {
    type Err = KeySequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(KeySequenceError::Empty);
        }
        let chords = s
            .split(", ")
            .map(str::parse::<KeyChord>)
            .collect::<Result<Vec<_>, _>>()?;
        if chords.len() > MAX_CHORDS {
            return Err(KeySequenceError::TooManyChords {
                count: chords.len(),
                max: MAX_CHORDS,
            });
        }
        Ok(Self { chords })
    }
}

/// Empty text (no shortcut) or a parseable sequence.
pub(crate) fn check(text: &str) -> bool {
    text.is_empty() || text.parse::<KeySequence>().is_ok()
}

/// Storage form: the bare Return key is written as `Enter`.
pub(crate) fn representation(text: &str) -> String {
    match text.parse::<KeySequence>() {
        Ok(sequence) if sequence.is_return() => ENTER_TOKEN.to_string(),
        _ => text.to_string(),
    }
}

/// Read form: `Enter` maps back to Return; anything else gets its final
/// character lower-cased.
pub(crate) fn process(text: &str) -> String {
    if text == ENTER_TOKEN {
        return KeySequence::from(KeyChord::new(Vec::new(), Key::Return)).to_string();
    }
    let mut out = text.to_string();
    if let Some(last) = out.pop() {
        out.extend(last.to_lowercase());
    }
    out
}
