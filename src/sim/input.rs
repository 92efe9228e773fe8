//! Keyboard events to gameplay intents
//!
//! Device polling happens outside the crate; the platform layer hands us
//! already-decoded key events and we turn them into [`Intent`]s.

use serde::{Deserialize, Serialize};

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// Keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    B,
    Seven,
    Keypad7,
    Other,
}

impl Key {
    /// Map a DOM/winit style key name
    pub fn from_name(name: &str) -> Self {
        match name {
            "w" | "W" => Key::W,
            "a" | "A" => Key::A,
            "s" | "S" => Key::S,
            "d" | "D" => Key::D,
            " " | "Space" => Key::Space,
            "b" | "B" => Key::B,
            "7" => Key::Seven,
            "Numpad7" | "KP_7" => Key::Keypad7,
            _ => Key::Other,
        }
    }
}

/// A decoded keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: Key,
    /// OS auto-repeat of a held key
    pub repeat: bool,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key,
            repeat: false,
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            kind: KeyEventKind::Up,
            key,
            repeat: false,
        }
    }
}

/// Thrust directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    /// Backward (toward the left edge)
    Left,
    /// Forward (toward the right edge)
    Right,
}

/// What the player wants to happen this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Thrust { dir: Direction, pressed: bool },
    FireForward,
    FireBack,
    RequestGameOver,
}

/// Pure key-event mapping. Auto-repeated presses never re-press thrust (so the
/// forward kick fires once per physical press) but do keep the guns firing.
pub fn map_key_event(event: &KeyEvent) -> Option<Intent> {
    let pressed = event.kind == KeyEventKind::Down;
    let thrust = |dir| {
        if pressed && event.repeat {
            None
        } else {
            Some(Intent::Thrust { dir, pressed })
        }
    };
    match event.key {
        Key::W => thrust(Direction::Up),
        Key::S => thrust(Direction::Down),
        Key::A => thrust(Direction::Left),
        Key::D => thrust(Direction::Right),
        Key::Space if pressed => Some(Intent::FireForward),
        Key::B if pressed => Some(Intent::FireBack),
        Key::Seven | Key::Keypad7 if pressed => Some(Intent::RequestGameOver),
        _ => None,
    }
}
