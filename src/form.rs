use crate::textarea::TextArea;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub input: TextArea,
    pub masked: bool,
    pub multiline: bool,
}

impl Field {
    pub fn text(label: &'static str) -> Self {
        Field {
            label,
            input: TextArea::new(),
            masked: false,
            multiline: false,
        }
    }

    pub fn password(label: &'static str) -> Self {
        Field {
            masked: true,
            ..Field::text(label)
        }
    }

    pub fn multiline(label: &'static str, limit: Option<usize>) -> Self {
        Field {
            input: limit.map(TextArea::with_limit).unwrap_or_default(),
            multiline: true,
            ..Field::text(label)
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.input.set_text(value);
        self
    }

    /// What the screen shows: dots for passwords, a bar at the cursor when
    /// focused.
    pub fn display(&self, focused: bool) -> String {
        if self.masked {
            let dots = "•".repeat(self.input.char_count());
            return if focused { format!("{}|", dots) } else { dots };
        }
        if focused {
            self.input.with_cursor('|')
        } else {
            self.input.text().to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    Cancel,
    Changed,
    Ignored,
}

/// A stack of labelled inputs with one focused at a time.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Form { fields, focus: 0 }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.input.text())
            .unwrap_or("")
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Enter moves to the next field and submits from the last one; in a
    /// multiline field Enter inserts a newline and Ctrl+S submits.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        let last = self.fields.len().saturating_sub(1);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let focus = self.focus;
        let Some(field) = self.fields.get_mut(focus) else {
            return FormEvent::Ignored;
        };

        match key.code {
            KeyCode::Esc => FormEvent::Cancel,
            KeyCode::Char('s') if ctrl => FormEvent::Submit,
            KeyCode::Tab | KeyCode::Down if !field.multiline || key.code == KeyCode::Tab => {
                self.focus_next();
                FormEvent::Changed
            }
            KeyCode::BackTab | KeyCode::Up if !field.multiline || key.code == KeyCode::BackTab => {
                self.focus_prev();
                FormEvent::Changed
            }
            KeyCode::Enter if field.multiline => {
                field.input.insert_newline();
                FormEvent::Changed
            }
            KeyCode::Enter if focus == last => FormEvent::Submit,
            KeyCode::Enter => {
                self.focus_next();
                FormEvent::Changed
            }
            KeyCode::Char(c) if !ctrl => {
                field.input.insert(c);
                FormEvent::Changed
            }
            KeyCode::Backspace => {
                field.input.backspace();
                FormEvent::Changed
            }
            KeyCode::Delete => {
                field.input.delete();
                FormEvent::Changed
            }
            KeyCode::Left => {
                field.input.left();
                FormEvent::Changed
            }
            KeyCode::Right => {
                field.input.right();
                FormEvent::Changed
            }
            KeyCode::Up => {
                field.input.up();
                FormEvent::Changed
            }
            KeyCode::Down => {
                field.input.down();
                FormEvent::Changed
            }
            KeyCode::Home => {
                field.input.home();
                FormEvent::Changed
            }
            KeyCode::End => {
                field.input.end();
                FormEvent::Changed
            }
            _ => FormEvent::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut Form, s: &str) {
        for c in s.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn login_form() -> Form {
        Form::new(vec![Field::text("Username"), Field::password("Password")])
    }

    #[test]
    fn test_enter_advances_then_submits() {
        let mut form = login_form();
        type_str(&mut form, "ada");
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormEvent::Changed);
        assert_eq!(form.focus, 1);
        type_str(&mut form, "pw");
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormEvent::Submit);
        assert_eq!(form.value(0), "ada");
        assert_eq!(form.value(1), "pw");
    }

    #[test]
    fn test_masked_display() {
        let mut form = login_form();
        form.fields[1].input.set_text("secret");
        assert_eq!(form.fields[1].display(false), "••••••");
        assert_eq!(form.fields[1].display(true), "••••••|");
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = login_form();
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focus, 1);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_multiline_enter_inserts_newline() {
        let mut form = Form::new(vec![Field::text("Name"), Field::multiline("Bio", Some(10))]);
        form.focus = 1;
        type_str(&mut form, "hi");
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormEvent::Changed);
        type_str(&mut form, "there friend");
        assert_eq!(form.value(1), "hi\nthere f");
        assert_eq!(
            form.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            FormEvent::Submit
        );
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormEvent::Cancel);
    }
}
