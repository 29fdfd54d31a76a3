//! Minimal multi-field text form used by onboarding, registration and admin.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone)]
pub struct Field {
    pub label: String,
    pub value: String,
    pub required: bool,
    /// Render as asterisks (passcodes, tokens).
    pub secret: bool,
    /// Only digits may be typed.
    pub numeric: bool,
}

impl Field {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            required: false,
            secret: false,
            numeric: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn display(&self) -> String {
        if self.secret {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// What a keypress did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Edited,
    Submit,
    Cancel,
    /// Key not handled by the form.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn remove(&mut self, idx: usize) {
        if idx < self.fields.len() {
            self.fields.remove(idx);
            if self.focus >= self.fields.len() {
                self.focus = self.fields.len().saturating_sub(1);
            }
        }
    }

    fn next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    fn prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = if self.focus == 0 { self.fields.len() - 1 } else { self.focus - 1 };
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return FormEvent::Ignored;
        }
        match key.code {
            KeyCode::Enter => FormEvent::Submit,
            KeyCode::Esc => FormEvent::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.next();
                FormEvent::Edited
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.prev();
                FormEvent::Edited
            }
            KeyCode::Backspace => {
                if let Some(f) = self.fields.get_mut(self.focus) {
                    f.value.pop();
                }
                FormEvent::Edited
            }
            KeyCode::Char(c) => match self.fields.get_mut(self.focus) {
                Some(f) if f.numeric && !c.is_ascii_digit() => FormEvent::Ignored,
                Some(f) => {
                    f.value.push(c);
                    FormEvent::Edited
                }
                None => FormEvent::Ignored,
            },
            _ => FormEvent::Ignored,
        }
    }
}
