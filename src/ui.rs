//! Terminal rendering for the login screen, the editor and the overlays.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use unicode_width::UnicodeWidthChar;

use crate::app::{App, Overlay, PasswordForm};
use crate::diary::DiaryEditor;

const TITLE: &str = "My Secure Digital Diary";
const HELP: &str = "^L Load  ^S Save  ^K Clear  ^T Insert Time  ^P Change Password  ^Q Quit";

/// Rows above and below the text area: header, status, help.
const CHROME_ROWS: u16 = 3;

/// Tab stops every this many columns.
const TAB_WIDTH: usize = 4;

/// Viewport state for the editor's text area.
pub struct Screen {
    width: u16,
    height: u16,
    offset_x: usize,
    offset_y: usize,
}

impl Screen {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Screen {
            width,
            height,
            offset_x: 0,
            offset_y: 0,
        })
    }

    /// Returns true if the size actually changed.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn text_height(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS).max(1) as usize
    }

    pub fn draw(&mut self, app: &App) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        queue!(stdout, Hide, Clear(ClearType::All))?;

        let mut cursor = match app.editor() {
            Some(editor) => self.draw_editor(&mut stdout, editor)?,
            None => self.draw_login(&mut stdout, app)?,
        };

        if let Some(overlay) = app.overlay() {
            cursor = self.draw_overlay(&mut stdout, overlay)?;
        }

        if let Some((x, y)) = cursor {
            queue!(stdout, MoveTo(x, y), Show)?;
        }
        stdout.flush()
    }

    fn draw_login(&self, out: &mut impl Write, app: &App) -> io::Result<Option<(u16, u16)>> {
        let masked = "*".repeat(app.login_input().chars().count());
        let hint = format!("Default password: {}", app.default_password());
        let lines = [
            "Welcome Back".to_string(),
            "Enter your password to continue".to_string(),
            String::new(),
            format!("Password: {}", masked),
            String::new(),
            hint,
            "Enter to log in, Esc to quit".to_string(),
        ];

        let top = self.height.saturating_sub(lines.len() as u16) / 2;
        let left = self.width.saturating_sub(36) / 2;
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as u16;
            queue!(out, MoveTo(left, y))?;
            match i {
                0 => queue!(
                    out,
                    SetForegroundColor(Color::Cyan),
                    SetAttribute(Attribute::Bold),
                    Print(line),
                    SetAttribute(Attribute::Reset),
                    ResetColor
                )?,
                5 | 6 => queue!(out, SetForegroundColor(Color::DarkGrey), Print(line), ResetColor)?,
                _ => queue!(out, Print(line))?,
            }
        }

        let cursor_x = left + "Password: ".len() as u16 + masked.len() as u16;
        Ok(Some((cursor_x, top + 3)))
    }

    fn draw_editor(&mut self, out: &mut impl Write, editor: &DiaryEditor) -> io::Result<Option<(u16, u16)>> {
        let width = self.width as usize;

        // Header: title left, clock right
        queue!(
            out,
            MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            SetAttribute(Attribute::Bold),
            Print(fit(TITLE, width)),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        let clock = editor.clock();
        if width > TITLE.len() + clock.len() + 1 {
            queue!(out, MoveTo((width - clock.len()) as u16, 0), Print(clock))?;
        }

        // Text area, scrolled in display columns
        let (cursor_x, cursor_y) = editor.buffer().cursor();
        let lines = editor.buffer().lines();
        let cursor_col = display_column(&lines[cursor_y], cursor_x);
        self.scroll_to(cursor_col, cursor_y);
        for row in 0..self.text_height() {
            let y = row as u16 + 1;
            let line_y = row + self.offset_y;
            queue!(out, MoveTo(0, y))?;
            if editor.buffer().is_empty() && line_y == 0 {
                queue!(
                    out,
                    SetForegroundColor(Color::DarkGrey),
                    Print(fit("Start writing...", width)),
                    ResetColor
                )?;
            } else if let Some(line) = lines.get(line_y) {
                queue!(out, Print(visible_cells(line, self.offset_x, width)))?;
            } else {
                queue!(out, SetForegroundColor(Color::DarkGrey), Print("~"), ResetColor)?;
            }
        }

        // Status row: word count left, save status right
        let status_y = self.height.saturating_sub(2);
        let words = format!("Words: {}", editor.word_count());
        queue!(out, MoveTo(0, status_y), Print(fit(&words, width)))?;
        let status = editor.status().to_string();
        if !status.is_empty() && width > words.len() + 2 {
            let status = fit(&status, width - words.len() - 2);
            let x = width - status.chars().count();
            queue!(
                out,
                MoveTo(x as u16, status_y),
                SetForegroundColor(Color::DarkGrey),
                Print(status),
                ResetColor
            )?;
        }

        queue!(
            out,
            MoveTo(0, self.height.saturating_sub(1)),
            SetForegroundColor(Color::DarkGrey),
            Print(fit(HELP, width)),
            ResetColor
        )?;

        let screen_x = (cursor_col - self.offset_x) as u16;
        let screen_y = (cursor_y - self.offset_y) as u16 + 1;
        Ok(Some((screen_x, screen_y)))
    }

    fn draw_overlay(&self, out: &mut impl Write, overlay: &Overlay) -> io::Result<Option<(u16, u16)>> {
        match overlay {
            Overlay::Alert { title, message } => {
                self.draw_box(out, title, &[message.clone(), String::new(), "[Enter] OK".to_string()])?;
                Ok(None)
            }
            Overlay::ConfirmClear => {
                self.draw_box(out, "Confirm", &["Clear everything? (y/n)".to_string()])?;
                Ok(None)
            }
            Overlay::ChangePassword(form) => self.draw_password_form(out, form),
        }
    }

    fn draw_password_form(&self, out: &mut impl Write, form: &PasswordForm) -> io::Result<Option<(u16, u16)>> {
        let mut lines = Vec::new();
        for (i, label) in PasswordForm::LABELS.iter().enumerate() {
            let marker = if i == form.focus { '>' } else { ' ' };
            let masked = "*".repeat(form.fields[i].chars().count());
            lines.push(format!("{} {:<17} {}", marker, format!("{}:", label), masked));
        }
        lines.push(String::new());
        lines.push("Tab next field, Enter update, Esc cancel".to_string());

        let (left, top) = self.draw_box(out, "Change Password", &lines)?;
        let x = left + 2 + 2 + 18 + form.fields[form.focus].chars().count() as u16;
        let y = top + 2 + form.focus as u16;
        Ok(Some((x, y)))
    }

    /// Draw a bordered box centred on screen. Returns its top-left corner.
    fn draw_box(&self, out: &mut impl Write, title: &str, lines: &[String]) -> io::Result<(u16, u16)> {
        let content_width = lines
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(title.chars().count()))
            .max()
            .unwrap_or(0);
        let inner = content_width.min((self.width as usize).saturating_sub(4));
        let box_width = inner + 4;
        let box_height = lines.len() + 3;

        let left = (self.width as usize).saturating_sub(box_width) as u16 / 2;
        let top = (self.height as usize).saturating_sub(box_height) as u16 / 2;

        let horizontal = "─".repeat(box_width.saturating_sub(2));
        queue!(out, MoveTo(left, top), Print(format!("┌{}┐", horizontal)))?;
        queue!(
            out,
            MoveTo(left, top + 1),
            Print("│ "),
            SetAttribute(Attribute::Bold),
            Print(format!("{:<width$}", fit(title, inner), width = inner)),
            SetAttribute(Attribute::Reset),
            Print(" │")
        )?;
        for (i, line) in lines.iter().enumerate() {
            let y = top + 2 + i as u16;
            queue!(
                out,
                MoveTo(left, y),
                Print(format!("│ {:<width$} │", fit(line, inner), width = inner))
            )?;
        }
        queue!(
            out,
            MoveTo(left, top + box_height as u16 - 1),
            Print(format!("└{}┘", horizontal))
        )?;

        Ok((left, top))
    }

    fn scroll_to(&mut self, cursor_x: usize, cursor_y: usize) {
        let visible_height = self.text_height();
        if cursor_y < self.offset_y {
            self.offset_y = cursor_y;
        } else if cursor_y >= self.offset_y + visible_height {
            self.offset_y = cursor_y - visible_height + 1;
        }

        let visible_width = (self.width as usize).max(1);
        if cursor_x < self.offset_x {
            self.offset_x = cursor_x;
        } else if cursor_x >= self.offset_x + visible_width {
            self.offset_x = cursor_x - visible_width + 1;
        }
    }
}

fn cell_width(c: char, column: usize) -> usize {
    if c == '\t' {
        TAB_WIDTH - column % TAB_WIDTH
    } else {
        c.width().unwrap_or(0)
    }
}

/// Terminal column where the character at index `upto` starts.
fn display_column(line: &[char], upto: usize) -> usize {
    line.iter()
        .take(upto)
        .fold(0, |column, &c| column + cell_width(c, column))
}

/// The part of `line` between display columns `offset` and `offset + width`.
/// Tabs become spaces; a wide character cut by the left edge becomes padding.
fn visible_cells(line: &[char], offset: usize, width: usize) -> String {
    let mut out = String::new();
    let mut column = 0;
    for &c in line {
        let w = cell_width(c, column);
        let start = column;
        column += w;
        if column < offset || (column == offset && w > 0) {
            continue;
        }
        if column > offset + width {
            break;
        }
        if start < offset || c == '\t' {
            let pad = column - start.max(offset);
            out.extend(std::iter::repeat(' ').take(pad));
        } else {
            out.push(c);
        }
    }
    out
}

/// Cut `s` to at most `width` characters.
fn fit(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}
