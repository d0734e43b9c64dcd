// services/infra-dash/src/views/input.rs
//
// Single-line text field

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    active: bool,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Applies an editing key. Returns false for keys the field does not use.
    pub fn handle(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }

    /// Field text with a cursor while focused.
    pub fn display(&self) -> String {
        if self.active {
            format!("{}▏", self.value)
        } else {
            self.value.clone()
        }
    }

    pub fn masked(&self) -> String {
        let stars = "*".repeat(self.value.chars().count());
        if self.active {
            format!("{}▏", stars)
        } else {
            stars
        }
    }
}
