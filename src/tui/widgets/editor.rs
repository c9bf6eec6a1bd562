/// Single-line text input used by the task form.
///
/// The cursor is a character index, not a byte offset, so multi-byte
/// input behaves.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    chars: Vec<char>,
    pub cursor_col: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(content: &str) -> Self {
        // Form fields are single-line; fold pasted newlines into spaces
        let chars: Vec<char> = content
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let cursor_col = chars.len();
        Self { chars, cursor_col }
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.is_whitespace())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        let col = self.cursor_col.min(self.chars.len());
        self.chars.insert(col, ch);
        self.cursor_col = col + 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(if ch == '\n' { ' ' } else { ch });
        }
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        if self.cursor_col > 0 && self.cursor_col <= self.chars.len() {
            self.chars.remove(self.cursor_col - 1);
            self.cursor_col -= 1;
        }
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        if self.cursor_col < self.chars.len() {
            self.chars.remove(self.cursor_col);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_col = (self.cursor_col + 1).min(self.chars.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.chars.len();
    }

    pub fn move_cursor_word_left(&mut self) {
        let mut col = self.cursor_col.min(self.chars.len());
        while col > 0 && !is_word_char(self.chars[col - 1]) {
            col -= 1;
        }
        while col > 0 && is_word_char(self.chars[col - 1]) {
            col -= 1;
        }
        self.cursor_col = col;
    }

    pub fn move_cursor_word_right(&mut self) {
        let len = self.chars.len();
        let mut col = self.cursor_col.min(len);
        while col < len && is_word_char(self.chars[col]) {
            col += 1;
        }
        while col < len && !is_word_char(self.chars[col]) {
            col += 1;
        }
        self.cursor_col = col;
    }

    /// Text that fits in `width` columns, scrolled so the cursor stays visible,
    /// plus the cursor's column within that text.
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let cursor = self.cursor_col.min(self.chars.len());
        // Leave room for the cursor one past the last character
        let start = (cursor + 1).saturating_sub(width);
        let end = (start + width).min(self.chars.len());
        (self.chars[start..end].iter().collect(), cursor - start)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_the_cursor() {
        let mut editor = Editor::from_string("Stand");
        editor.insert_str("up");
        assert_eq!(editor.value(), "Standup");

        editor.move_cursor_home();
        editor.delete_forward();
        editor.insert_char('s');
        assert_eq!(editor.value(), "standup");

        editor.move_cursor_end();
        editor.delete_char();
        assert_eq!(editor.value(), "standu");
        assert_eq!(editor.cursor_col, 6);
    }

    #[test]
    fn handles_multibyte_text() {
        let mut editor = Editor::from_string("café");
        editor.delete_char();
        assert_eq!(editor.value(), "caf");
        editor.insert_char('é');
        editor.move_cursor_left();
        editor.insert_char('ß');
        assert_eq!(editor.value(), "cafßé");
    }

    #[test]
    fn pasted_newlines_become_spaces() {
        let mut editor = Editor::new();
        editor.insert_str("line one\nline two");
        assert_eq!(editor.value(), "line one line two");
        assert_eq!(Editor::from_string("a\nb").value(), "a b");
    }

    #[test]
    fn word_motion() {
        let mut editor = Editor::from_string("write the report");
        editor.move_cursor_word_left();
        assert_eq!(editor.cursor_col, 10);
        editor.move_cursor_word_left();
        assert_eq!(editor.cursor_col, 6);
        editor.move_cursor_word_right();
        assert_eq!(editor.cursor_col, 10);
    }

    #[test]
    fn visible_window_follows_cursor() {
        let editor = Editor::from_string("abcdefghij");
        let (text, cursor) = editor.visible(4);
        assert_eq!(text, "hij");
        assert_eq!(cursor, 3);

        let mut editor = editor;
        editor.move_cursor_home();
        let (text, cursor) = editor.visible(4);
        assert_eq!(text, "abcd");
        assert_eq!(cursor, 0);
    }

    #[test]
    fn blank_detection() {
        assert!(Editor::from_string("   ").is_blank());
        assert!(!Editor::from_string(" x ").is_blank());
    }
}
