use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text { max_len: Option<usize> },
    Secret,
    Choice(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn text(label: &'static str) -> Self { Self { label, value: String::new(), kind: FieldKind::Text { max_len: None } } }

    pub fn limited(label: &'static str, max_len: usize) -> Self {
        Self { label, value: String::new(), kind: FieldKind::Text { max_len: Some(max_len) } }
    }

    pub fn secret(label: &'static str) -> Self { Self { label, value: String::new(), kind: FieldKind::Secret } }

    pub fn choice(label: &'static str, options: Vec<&'static str>, initial: &str) -> Self {
        let value = options.iter().find(|o| **o == initial).or(options.first()).copied().unwrap_or_default().to_string();
        Self { label, value, kind: FieldKind::Choice(options) }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// What the terminal shows: secrets are masked, choices get arrows.
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            FieldKind::Choice(_) => format!("< {} >", self.value),
            FieldKind::Text { .. } => self.value.clone(),
        }
    }

    fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(options) = &self.kind else { return };
        if options.is_empty() { return; }
        let pos = options.iter().position(|o| *o == self.value).unwrap_or(0);
        let next = if forward { (pos + 1) % options.len() } else { (pos + options.len() - 1) % options.len() };
        self.value = options[next].to_string();
    }

    fn push(&mut self, c: char) {
        match &self.kind {
            FieldKind::Choice(_) => {}
            FieldKind::Text { max_len: Some(max) } if self.value.chars().count() >= *max => {}
            _ => self.value.push(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Edited,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Form {
    pub fn new(title: &'static str, fields: Vec<Field>) -> Self { Self { title, fields, focus: 0, error: None } }

    pub fn value(&self, label: &str) -> &str {
        self.fields.iter().find(|f| f.label == label).map(|f| f.value.as_str()).unwrap_or_default()
    }

    pub fn trimmed(&self, label: &str) -> String { self.value(label).trim().to_string() }

    pub fn fail(&mut self, message: impl Into<String>) { self.error = Some(message.into()); }

    pub fn input(&mut self, key: KeyEvent) -> FormAction {
        let count = self.fields.len().max(1);
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % count,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + count - 1) % count,
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                if let Some(f) = self.focused() { f.cycle(forward); }
            }
            KeyCode::Backspace => {
                if let Some(f) = self.focused() {
                    if !matches!(f.kind, FieldKind::Choice(_)) { f.value.pop(); }
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(f) = self.focused() { f.push(c); }
            }
            _ => {}
        }
        FormAction::Edited
    }

    fn focused(&mut self) -> Option<&mut Field> { self.fields.get_mut(self.focus) }
}

#[cfg(test)]
pub(crate) fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

#[cfg(test)]
pub(crate) fn type_text(form: &mut Form, text: &str) {
    for c in text.chars() { form.input(key(KeyCode::Char(c))); }
}
