//! The diary's in-memory text, stored as lines of characters with a cursor.

#[derive(Debug, Clone)]
pub struct TextBuffer {
    // Vec<Vec<char>> keeps cursor arithmetic in characters, not bytes
    lines: Vec<Vec<char>>,
    cursor_x: usize,
    cursor_y: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        TextBuffer {
            lines: vec![Vec::new()],
            cursor_x: 0,
            cursor_y: 0,
        }
    }
}

impl TextBuffer {
    /// Build a buffer holding `text`, cursor at the very end.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = TextBuffer::default();
        buffer.set_text(text);
        buffer
    }

    /// Full contents. Lines are joined with '\n', so `from_text(s).text() == s`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Replace everything and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        // split (not lines) so a trailing newline survives as an empty last line
        self.lines = text.split('\n').map(|line| line.chars().collect()).collect();
        self.cursor_y = self.lines.len() - 1;
        self.cursor_x = self.lines[self.cursor_y].len();
    }

    pub fn clear(&mut self) {
        *self = TextBuffer::default();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn lines(&self) -> &[Vec<char>] {
        &self.lines
    }

    /// Cursor as (column, line).
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    /// Count of whitespace-delimited, non-empty tokens.
    pub fn word_count(&self) -> usize {
        count_words(&self.text())
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        self.lines[self.cursor_y].insert(self.cursor_x, c);
        self.cursor_x += 1;
    }

    /// Insert text at the cursor, leaving the cursor after it.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(c);
        }
    }

    pub fn insert_newline(&mut self) {
        let current_line = &mut self.lines[self.cursor_y];
        let new_line: Vec<char> = current_line.drain(self.cursor_x..).collect();
        self.lines.insert(self.cursor_y + 1, new_line);
        self.cursor_y += 1;
        self.cursor_x = 0;
    }

    /// Returns false if there was nothing to delete.
    pub fn backspace(&mut self) -> bool {
        if self.cursor_x > 0 {
            self.lines[self.cursor_y].remove(self.cursor_x - 1);
            self.cursor_x -= 1;
            true
        } else if self.cursor_y > 0 {
            let current_line = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.lines[self.cursor_y].len();
            self.lines[self.cursor_y].extend(current_line);
            true
        } else {
            false
        }
    }

    /// Returns false if there was nothing to delete.
    pub fn delete(&mut self) -> bool {
        let line_len = self.current_line().len();
        if self.cursor_x < line_len {
            self.lines[self.cursor_y].remove(self.cursor_x);
            true
        } else if self.cursor_y < self.lines.len() - 1 {
            let next_line = self.lines.remove(self.cursor_y + 1);
            self.lines[self.cursor_y].extend(next_line);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_x > 0 {
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.current_line().len();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_x < self.current_line().len() {
            self.cursor_x += 1;
        } else if self.cursor_y < self.lines.len() - 1 {
            self.cursor_y += 1;
            self.cursor_x = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.clamp_x();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_y < self.lines.len() - 1 {
            self.cursor_y += 1;
            self.clamp_x();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_x = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_x = self.current_line().len();
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.cursor_y = self.cursor_y.saturating_sub(page_size);
        self.clamp_x();
    }

    pub fn page_down(&mut self, page_size: usize) {
        self.cursor_y = (self.cursor_y + page_size).min(self.lines.len() - 1);
        self.clamp_x();
    }

    fn current_line(&self) -> &Vec<char> {
        &self.lines[self.cursor_y]
    }

    fn clamp_x(&mut self) {
        self.cursor_x = self.cursor_x.min(self.current_line().len());
    }
}

/// Number of whitespace-separated words in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
