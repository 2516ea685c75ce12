//! The diary editor: buffer, persistence, autosave and the passive read-outs.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::buffer::TextBuffer;
use crate::error::Result;
use crate::flatfile;
use crate::timer::RepeatingTimer;

/// Format of the clock shown in the header, e.g. "16 Oct 2026 - 09:30:00".
pub const CLOCK_FORMAT: &str = "%d %b %Y - %H:%M:%S";

/// Format of timestamps inserted into the text, e.g. "16-10-2026 09:30:00".
pub const STAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

#[derive(Debug, Clone)]
pub struct EditorSettings {
    pub diary_path: PathBuf,
    pub autosave_interval: Duration,
    pub clock_interval: Duration,
}

/// What the status read-out says about the last write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    SavedManually,
    Autosaved,
    SaveFailed(String),
    AutosaveFailed(String),
    AutosavePaused,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Idle => Ok(()),
            SaveStatus::SavedManually => write!(f, "Saved manually"),
            SaveStatus::Autosaved => write!(f, "Autosaved just now"),
            SaveStatus::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
            SaveStatus::AutosaveFailed(msg) => write!(f, "Autosave failed: {}", msg),
            SaveStatus::AutosavePaused => write!(f, "Autosave paused: diary failed to load"),
        }
    }
}

#[derive(Debug)]
pub struct DiaryEditor {
    buffer: TextBuffer,
    diary_path: PathBuf,
    status: SaveStatus,
    word_count: usize,
    clock: String,
    notice: Option<String>,
    // set while the file on disk could not be read; autosave must not replace it
    load_failed: bool,
    clock_timer: RepeatingTimer,
    autosave_timer: RepeatingTimer,
}

impl DiaryEditor {
    /// Create an empty editor with both timers armed relative to `now`.
    pub fn new(settings: EditorSettings, now: Instant) -> Self {
        DiaryEditor {
            buffer: TextBuffer::default(),
            diary_path: settings.diary_path,
            status: SaveStatus::Idle,
            word_count: 0,
            clock: format_clock(Local::now()),
            notice: None,
            load_failed: false,
            clock_timer: RepeatingTimer::start(settings.clock_interval, now),
            autosave_timer: RepeatingTimer::start(settings.autosave_interval, now),
        }
    }

    /// Pull in the existing diary, if any, without the "loaded" notice.
    pub fn initialize(&mut self) -> Result<()> {
        self.load(false)?;
        self.update_word_count();
        Ok(())
    }

    /// Replace the buffer with the diary file. Returns whether a file was
    /// found; a missing file leaves the buffer untouched.
    ///
    /// A read failure pauses autosave until a later load or a manual save
    /// succeeds, so the unreadable file is never overwritten behind the
    /// user's back.
    pub fn load(&mut self, notify: bool) -> Result<bool> {
        let contents = match flatfile::read_optional(&self.diary_path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(?err, path = %self.diary_path.display(), "diary failed to load, autosave paused");
                self.load_failed = true;
                self.status = SaveStatus::AutosavePaused;
                return Err(err.into());
            }
        };
        self.load_failed = false;

        let Some(contents) = contents else {
            debug!(path = %self.diary_path.display(), "no diary file to load");
            return Ok(false);
        };

        self.buffer = TextBuffer::from_text(&contents);
        self.update_word_count();
        debug!(path = %self.diary_path.display(), bytes = contents.len(), "diary loaded");

        if notify {
            self.notice = Some("Diary loaded successfully!".to_string());
        }
        Ok(true)
    }

    pub fn save(&mut self) -> Result<()> {
        match self.write() {
            Ok(()) => {
                self.load_failed = false;
                self.status = SaveStatus::SavedManually;
                info!(path = %self.diary_path.display(), "diary saved");
                Ok(())
            }
            Err(err) => {
                self.status = SaveStatus::SaveFailed(err.to_string());
                warn!(?err, "manual save failed");
                Err(err)
            }
        }
    }

    /// Same write as `save`, but failures only end up in the status read-out.
    pub fn autosave(&mut self) {
        if self.load_failed {
            debug!("autosave skipped, diary failed to load");
            self.status = SaveStatus::AutosavePaused;
            return;
        }
        match self.write() {
            Ok(()) => {
                self.status = SaveStatus::Autosaved;
                debug!(path = %self.diary_path.display(), "diary autosaved");
            }
            Err(err) => {
                warn!(?err, "autosave failed");
                self.status = SaveStatus::AutosaveFailed(err.to_string());
            }
        }
    }

    /// Empty the buffer. The file keeps its contents until the next write.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.update_word_count();
    }

    /// Insert "\n[DD-MM-YYYY HH:MM:SS]\n" at the cursor.
    pub fn insert_timestamp(&mut self, now: DateTime<Local>) {
        self.buffer.insert_str(&format!("\n[{}]\n", now.format(STAMP_FORMAT)));
        self.update_word_count();
    }

    pub fn update_word_count(&mut self) {
        self.word_count = self.buffer.word_count();
    }

    pub fn tick_clock(&mut self) {
        self.clock = format_clock(Local::now());
    }

    /// Fire whichever timers are due at `now`. Returns true if anything ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut fired = false;
        if self.clock_timer.poll(now) {
            self.tick_clock();
            fired = true;
        }
        if self.autosave_timer.poll(now) {
            self.autosave();
            fired = true;
        }
        fired
    }

    /// Cancel both timers. Nothing is written.
    pub fn shutdown(&mut self) {
        self.clock_timer.cancel();
        self.autosave_timer.cancel();
    }

    #[cfg(test)]
    pub fn timers_armed(&self) -> bool {
        self.clock_timer.is_armed() || self.autosave_timer.is_armed()
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert_char(c);
        self.update_word_count();
    }

    pub fn insert_newline(&mut self) {
        self.buffer.insert_newline();
        self.update_word_count();
    }

    pub fn backspace(&mut self) {
        if self.buffer.backspace() {
            self.update_word_count();
        }
    }

    pub fn delete(&mut self) {
        if self.buffer.delete() {
            self.update_word_count();
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn clock(&self) -> &str {
        &self.clock
    }

    /// Hand over the pending user notice, if one was raised.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn write(&self) -> Result<()> {
        flatfile::replace(&self.diary_path, &self.text())?;
        Ok(())
    }
}

fn format_clock(now: DateTime<Local>) -> String {
    now.format(CLOCK_FORMAT).to_string()
}
