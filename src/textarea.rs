use unicode_width::UnicodeWidthChar;

/// Editable text with a char-indexed cursor and an optional character limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextArea {
    text: String,
    cursor: usize,
    limit: Option<usize>,
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        TextArea {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the contents, truncating to the limit, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = match self.limit {
            Some(limit) => text.chars().take(limit).collect(),
            None => text.to_string(),
        };
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.char_count()))
    }

    pub fn is_at_limit(&self) -> bool {
        self.remaining() == Some(0)
    }

    pub fn is_near_limit(&self) -> bool {
        matches!(self.remaining(), Some(left) if left <= 50)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Returns false when the limit rejected the character.
    pub fn insert(&mut self, c: char) -> bool {
        if self.is_at_limit() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    pub fn insert_newline(&mut self) -> bool {
        self.insert('\n')
    }

    /// Like [`insert`](Self::insert), but also refuses a character that would
    /// wrap the text past `max_rows` rows at `width` columns.
    pub fn insert_within(&mut self, c: char, width: u16, max_rows: u16) -> bool {
        if !self.insert(c) {
            return false;
        }
        if self.rows(width) > max_rows {
            self.backspace();
            return false;
        }
        true
    }

    pub fn is_at_rows(&self, width: u16, max_rows: u16) -> bool {
        self.rows(width) >= max_rows
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.text.remove(at);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        self.cursor = line_start(&chars, self.cursor);
    }

    pub fn end(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        self.cursor = line_end(&chars, self.cursor);
    }

    pub fn up(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let current_start = line_start(&chars, self.cursor);
        if current_start == 0 {
            return;
        }
        let column = self.cursor - current_start;
        let prev_start = line_start(&chars, current_start - 1);
        let prev_len = current_start - 1 - prev_start;
        self.cursor = prev_start + column.min(prev_len);
    }

    pub fn down(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let current_end = line_end(&chars, self.cursor);
        if current_end >= chars.len() {
            return;
        }
        let column = self.cursor - line_start(&chars, self.cursor);
        let next_start = current_end + 1;
        let next_len = line_end(&chars, next_start) - next_start;
        self.cursor = next_start + column.min(next_len);
    }

    /// The text with a bar drawn at the cursor.
    pub fn with_cursor(&self, marker: char) -> String {
        let mut shown = self.text.clone();
        shown.insert(self.byte_index(self.cursor), marker);
        shown
    }

    /// Rows the text occupies when wrapped to `width` columns.
    pub fn rows(&self, width: u16) -> u16 {
        let width = usize::from(width.max(1));
        let rows: usize = self
            .text
            .split('\n')
            .map(|line| {
                let used: usize = line.chars().map(|c| c.width().unwrap_or(0)).sum();
                used.div_ceil(width).max(1)
            })
            .sum();
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    /// Height of the box that grows with its contents, borders included.
    pub fn height(&self, inner_width: u16, min: u16, max: u16) -> u16 {
        self.rows(inner_width).saturating_add(2).clamp(min, max)
    }

    pub fn status_line(&self) -> String {
        let mut status = match self.limit {
            Some(limit) => format!(
                "{}/{} characters • {} words",
                self.char_count(),
                limit,
                self.word_count()
            ),
            None => format!("{} characters • {} words", self.char_count(), self.word_count()),
        };
        if self.is_near_limit() {
            match self.remaining() {
                Some(0) => status.push_str(" • Character limit reached!"),
                Some(left) => status.push_str(&format!(" • {} characters remaining", left)),
                None => {}
            }
        }
        status
    }
}

fn line_start(chars: &[char], cursor: usize) -> usize {
    chars[..cursor.min(chars.len())]
        .iter()
        .rposition(|&c| c == '\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn line_end(chars: &[char], cursor: usize) -> usize {
    let from = cursor.min(chars.len());
    chars[from..]
        .iter()
        .position(|&c| c == '\n')
        .map(|i| from + i)
        .unwrap_or(chars.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextArea {
        let mut area = TextArea::new();
        for c in s.chars() {
            area.insert(c);
        }
        area
    }

    #[test]
    fn test_limit_rejects_extra_chars() {
        let mut area = TextArea::with_limit(3);
        assert!(area.insert('a'));
        assert!(area.insert('b'));
        assert!(area.insert('c'));
        assert!(!area.insert('d'));
        assert_eq!(area.text(), "abc");
        assert!(area.is_at_limit());

        area.backspace();
        assert!(area.insert('z'));
        assert_eq!(area.text(), "abz");
    }

    #[test]
    fn test_set_text_truncates() {
        let mut area = TextArea::with_limit(5);
        area.set_text("hello world");
        assert_eq!(area.text(), "hello");
        assert_eq!(area.cursor, 5);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut area = typed("héllo");
        area.left();
        area.left();
        area.left();
        area.backspace();
        assert_eq!(area.text(), "hllo");
        area.insert('é');
        assert_eq!(area.text(), "héllo");
        area.delete();
        assert_eq!(area.text(), "hélo");
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut area = typed("abcdef\nxy\nlonger line");
        // cursor at end of "longer line" (column 11)
        area.up();
        assert_eq!(area.cursor, 9); // end of "xy"
        area.up();
        assert_eq!(area.cursor, 2); // column 2 of "abcdef"
        area.down();
        assert_eq!(area.cursor, 9);
        area.down();
        assert_eq!(area.cursor, 12);
        area.down();
        assert_eq!(area.cursor, 12);
    }

    #[test]
    fn test_home_end() {
        let mut area = typed("one\ntwo");
        area.home();
        assert_eq!(area.cursor, 4);
        area.up();
        area.end();
        assert_eq!(area.cursor, 3);
    }

    #[test]
    fn test_counts_and_status() {
        let mut area = TextArea::with_limit(500);
        area.set_text("Dear diary,  today   was fine");
        assert_eq!(area.word_count(), 5);
        assert_eq!(area.status_line(), "29/500 characters • 5 words");

        area.set_text(&"x".repeat(460));
        assert!(area.is_near_limit());
        assert!(area.status_line().ends_with("40 characters remaining"));

        area.set_text(&"x".repeat(600));
        assert!(area.status_line().ends_with("Character limit reached!"));
    }

    #[test]
    fn test_rows_and_height() {
        let area = typed("0123456789\n\nabc");
        assert_eq!(area.rows(5), 2 + 1 + 1);
        assert_eq!(area.height(5, 3, 10), 6);
        assert_eq!(area.height(5, 3, 5), 5);
        assert_eq!(TextArea::new().height(20, 3, 10), 3);
    }

    #[test]
    fn test_cursor_marker() {
        let mut area = typed("ab");
        area.left();
        assert_eq!(area.with_cursor('|'), "a|b");
    }

    #[test]
    fn test_insert_within_row_cap() {
        let mut area = TextArea::with_limit(500);
        for line in 0..3 {
            if line > 0 {
                assert!(area.insert_within('\n', 10, 3));
            }
            assert!(area.insert_within('x', 10, 3));
        }
        assert!(area.is_at_rows(10, 3));
        assert!(!area.insert_within('\n', 10, 3));
        assert_eq!(area.rows(10), 3);

        // filling the last row is fine, wrapping past it is not
        for _ in 0..9 {
            assert!(area.insert_within('y', 10, 3));
        }
        assert!(!area.insert_within('z', 10, 3));
        assert_eq!(area.text(), "x\nx\nxyyyyyyyyy");
        assert_eq!(area.cursor, 14);

        area.backspace();
        assert!(area.insert_within('z', 10, 3));
    }
}
