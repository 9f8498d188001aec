//! Global keyboard shortcuts.
//!
//! DESIGN
//! ======
//! One router owns a dispatch table from key chord to action. Ctrl and Cmd
//! are treated as the same modifier so bindings read the same on every
//! platform. While focus is inside a text field the router ignores every
//! key, Escape included, so typing is never hijacked.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

/// Where keyboard focus is when the key is pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Document,
    TextInput,
    TextArea,
}

impl Focus {
    #[must_use]
    pub fn is_text_entry(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    pub focus: Focus,
}

impl KeyEvent {
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false, meta: false, focus: Focus::Document }
    }

    #[must_use]
    pub fn ctrl(c: char) -> Self {
        Self { ctrl: true, ..Self::plain(Key::Char(c)) }
    }

    #[must_use]
    pub fn meta(c: char) -> Self {
        Self { meta: true, ..Self::plain(Key::Char(c)) }
    }

    #[must_use]
    pub fn in_focus(mut self, focus: Focus) -> Self {
        self.focus = focus;
        self
    }

    fn chord(&self) -> KeyChord {
        let key = match self.key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        KeyChord { key, command: self.ctrl || self.meta }
    }
}

/// A key plus whether the platform command modifier (Ctrl or Cmd) is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub command: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    CreateTicket,
    FocusSearch,
    DismissModal,
}

/// The page elements shortcuts act on. Each method returns false when its
/// element is not on the page (or, for modals, when none is open).
pub trait ShortcutTarget: Send + Sync {
    fn activate_create_ticket(&self) -> bool;
    /// Focus the search field and select its text.
    fn focus_search(&self) -> bool;
    fn dismiss_top_modal(&self) -> bool;
}

pub struct KeyboardShortcutRouter {
    target: Arc<dyn ShortcutTarget>,
    bindings: HashMap<KeyChord, ShortcutAction>,
    enabled: bool,
}

impl KeyboardShortcutRouter {
    /// Router with the standard bindings, enabled.
    #[must_use]
    pub fn new(target: Arc<dyn ShortcutTarget>) -> Self {
        let bindings = HashMap::from([
            (KeyChord { key: Key::Char('n'), command: true }, ShortcutAction::CreateTicket),
            (KeyChord { key: Key::Char('/'), command: true }, ShortcutAction::FocusSearch),
            (KeyChord { key: Key::Escape, command: false }, ShortcutAction::DismissModal),
        ]);
        Self { target, bindings, enabled: true }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn binding(&self, chord: KeyChord) -> Option<ShortcutAction> {
        self.bindings.get(&chord).copied()
    }

    /// Dispatch a key press. Returns the action that ran, if any; the caller
    /// should suppress the browser default exactly when this is `Some`.
    pub fn handle(&self, event: &KeyEvent) -> Option<ShortcutAction> {
        if !self.enabled || event.focus.is_text_entry() {
            return None;
        }

        let action = self.binding(event.chord())?;
        let ran = match action {
            ShortcutAction::CreateTicket => self.target.activate_create_ticket(),
            ShortcutAction::FocusSearch => self.target.focus_search(),
            ShortcutAction::DismissModal => self.target.dismiss_top_modal(),
        };
        debug!(?action, ran, "keyboard shortcut");
        ran.then_some(action)
    }
}

#[cfg(test)]
#[path = "keyboard_test.rs"]
mod tests;
