//! Application state: which screen is showing, which overlays are open, and
//! how key presses map onto the gate and the editor.

use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{error, info};

use crate::config::Config;
use crate::diary::DiaryEditor;
use crate::error::DiaryError;
use crate::gate::SessionGate;

/// Lines scrolled by PageUp/PageDown when the screen height is unknown.
const DEFAULT_PAGE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Alert { title: String, message: String },
    ConfirmClear,
    ChangePassword(PasswordForm),
}

/// The old/new/confirm fields of the change-password form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub fields: [String; 3],
    pub focus: usize,
}

impl PasswordForm {
    pub const LABELS: [&'static str; 3] = ["Old Password", "New Password", "Confirm Password"];

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }
}

pub struct App {
    config: Config,
    gate: SessionGate,
    login_input: String,
    editor: Option<DiaryEditor>,
    overlays: Vec<Overlay>,
    page_size: usize,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let gate = SessionGate::new(config.credential_store(), config.min_password_length);
        App {
            config,
            gate,
            login_input: String::new(),
            editor: None,
            overlays: Vec::new(),
            page_size: DEFAULT_PAGE,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn login_input(&self) -> &str {
        &self.login_input
    }

    pub fn default_password(&self) -> &str {
        self.gate.store().default_password()
    }

    pub fn editor(&self) -> Option<&DiaryEditor> {
        self.editor.as_ref()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlays.last()
    }

    pub fn set_page_size(&mut self, lines: usize) {
        self.page_size = lines.max(1);
    }

    /// Drive the editor's timers. Returns true if the screen needs a redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.editor.as_mut() {
            Some(editor) => editor.tick(now),
            None => false,
        }
    }

    /// Stop the editor's timers before the process exits.
    pub fn shutdown(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.shutdown();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if key.code == KeyCode::Char('q') && is_ctrl(&key) {
            self.should_quit = true;
            return;
        }

        if !self.overlays.is_empty() {
            self.handle_overlay_key(key);
        } else if self.gate.is_authenticated() {
            self.handle_editor_key(key);
        } else {
            self.handle_login_key(key, now);
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => match self.gate.submit(&self.login_input) {
                Ok(()) => {
                    self.login_input.clear();
                    self.open_editor(now);
                }
                Err(err) => self.alert_error(&err),
            },
            KeyCode::Backspace => {
                self.login_input.pop();
            }
            KeyCode::Char(c) if !has_command_modifier(&key) => self.login_input.push(c),
            _ => {}
        }
    }

    fn open_editor(&mut self, now: Instant) {
        let mut editor = DiaryEditor::new(self.config.editor_settings(), now);
        if let Err(err) = editor.initialize() {
            error!(?err, "failed to load diary on startup");
            self.alert_error(&err);
        }
        info!("diary opened");
        self.editor = Some(editor);
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let page_size = self.page_size;
        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        if is_ctrl(&key) {
            match key.code {
                KeyCode::Char('l') => match editor.load(true) {
                    Ok(_) => {
                        if let Some(notice) = editor.take_notice() {
                            self.push_alert("Loaded", notice);
                        }
                    }
                    Err(err) => self.alert_error(&err),
                },
                KeyCode::Char('s') => {
                    if let Err(err) = editor.save() {
                        self.alert_error(&err);
                    }
                }
                KeyCode::Char('k') => self.overlays.push(Overlay::ConfirmClear),
                KeyCode::Char('t') => editor.insert_timestamp(Local::now()),
                KeyCode::Char('p') => self
                    .overlays
                    .push(Overlay::ChangePassword(PasswordForm::default())),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Left => editor.buffer_mut().move_left(),
            KeyCode::Right => editor.buffer_mut().move_right(),
            KeyCode::Up => editor.buffer_mut().move_up(),
            KeyCode::Down => editor.buffer_mut().move_down(),
            KeyCode::Home => editor.buffer_mut().move_home(),
            KeyCode::End => editor.buffer_mut().move_end(),
            KeyCode::PageUp => editor.buffer_mut().page_up(page_size),
            KeyCode::PageDown => editor.buffer_mut().page_down(page_size),
            KeyCode::Backspace => editor.backspace(),
            KeyCode::Delete => editor.delete(),
            KeyCode::Enter => editor.insert_newline(),
            KeyCode::Tab => editor.insert_char('\t'),
            KeyCode::Char(c) if !has_command_modifier(&key) => editor.insert_char(c),
            _ => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let Some(top) = self.overlays.last_mut() else {
            return;
        };

        match top {
            Overlay::Alert { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.overlays.pop();
                }
            }
            Overlay::ConfirmClear => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.overlays.pop();
                    if let Some(editor) = self.editor.as_mut() {
                        editor.clear();
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.overlays.pop();
                }
                _ => {}
            },
            Overlay::ChangePassword(form) => match key.code {
                KeyCode::Esc => {
                    self.overlays.pop();
                }
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => {
                    form.fields[form.focus].pop();
                }
                KeyCode::Enter if form.focus + 1 < form.fields.len() => form.focus_next(),
                KeyCode::Enter => {
                    let [old, new, confirm] = &form.fields;
                    match self.gate.change_password(old, new, confirm) {
                        Ok(()) => {
                            self.overlays.pop();
                            self.push_alert("Success", "Password Updated!");
                        }
                        Err(err) => self.alert_error(&err),
                    }
                }
                KeyCode::Char(c) if !has_command_modifier(&key) => form.fields[form.focus].push(c),
                _ => {}
            },
        }
    }

    fn push_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.overlays.push(Overlay::Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    fn alert_error(&mut self, err: &DiaryError) {
        self.push_alert(err.title(), err.to_string());
    }
}

/// AltGr arrives as CONTROL|ALT on Windows and produces ordinary characters,
/// so only one of the two on its own marks a command.
fn has_command_modifier(key: &KeyEvent) -> bool {
    let both = KeyModifiers::CONTROL | KeyModifiers::ALT;
    key.modifiers.intersects(both) && !key.modifiers.contains(both)
}

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn app_in(dir: &tempfile::TempDir) -> App {
        let config = Config {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..Config::default()
        };
        App::new(config)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL), Instant::now());
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn login(app: &mut App) {
        type_str(app, "admin123");
        press(app, KeyCode::Enter);
        assert!(app.editor().is_some());
    }

    #[test]
    fn test_wrong_password_shows_alert() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        type_str(&mut app, "guess");
        press(&mut app, KeyCode::Enter);

        assert!(app.editor().is_none());
        assert_eq!(
            app.overlay(),
            Some(&Overlay::Alert {
                title: "Error".to_string(),
                message: "Incorrect password!".to_string(),
            })
        );

        press(&mut app, KeyCode::Enter);
        assert!(app.overlay().is_none());
        assert_eq!(app.login_input(), "guess");
    }

    #[test]
    fn test_login_opens_editor_with_existing_diary() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diary.txt"), "old words here").unwrap();
        let mut app = app_in(&dir);
        login(&mut app);

        let editor = app.editor().unwrap();
        assert_eq!(editor.text(), "old words here");
        assert_eq!(editor.word_count(), 3);
        assert!(app.overlay().is_none());
        assert_eq!(app.login_input(), "");
    }

    #[test]
    fn test_typing_and_manual_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        login(&mut app);

        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "world");
        ctrl(&mut app, 's');

        assert_eq!(fs::read_to_string(dir.path().join("diary.txt")).unwrap(), "hello\nworld");
        assert_eq!(app.editor().unwrap().status().to_string(), "Saved manually");
        assert_eq!(app.editor().unwrap().word_count(), 2);
    }

    #[test]
    fn test_load_shows_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        login(&mut app);
        fs::write(dir.path().join("diary.txt"), "from disk").unwrap();

        ctrl(&mut app, 'l');
        assert_eq!(app.editor().unwrap().text(), "from disk");
        assert!(matches!(app.overlay(), Some(Overlay::Alert { title, .. }) if title == "Loaded"));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        login(&mut app);
        type_str(&mut app, "precious");

        ctrl(&mut app, 'k');
        assert_eq!(app.overlay(), Some(&Overlay::ConfirmClear));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.editor().unwrap().text(), "precious");

        ctrl(&mut app, 'k');
        press(&mut app, KeyCode::Char('y'));
        assert!(app.overlay().is_none());
        assert_eq!(app.editor().unwrap().text(), "");
        assert_eq!(app.editor().unwrap().word_count(), 0);
    }

    #[test]
    fn test_change_password_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        login(&mut app);

        ctrl(&mut app, 'p');
        type_str(&mut app, "admin123");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "abc");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "abc");
        press(&mut app, KeyCode::Enter);

        // too short: alert above the still-open form
        assert!(matches!(app.overlay(), Some(Overlay::Alert { title, .. }) if title == "Weak"));
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.overlay(), Some(Overlay::ChangePassword(_))));
        assert!(!dir.path().join("password.txt").exists());

        // lengthen both new and confirm
        press(&mut app, KeyCode::Up);
        type_str(&mut app, "d");
        press(&mut app, KeyCode::Down);
        type_str(&mut app, "d");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.overlay(), Some(Overlay::Alert { title, .. }) if title == "Success"));
        press(&mut app, KeyCode::Enter);
        assert!(app.overlay().is_none());
        assert_eq!(fs::read_to_string(dir.path().join("password.txt")).unwrap(), "abcd");
    }

    #[test]
    fn test_change_password_wrong_old() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        login(&mut app);

        ctrl(&mut app, 'p');
        type_str(&mut app, "nope");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "newpass");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "newpass");
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.overlay(),
            Some(&Overlay::Alert {
                title: "Error".to_string(),
                message: "Old password incorrect!".to_string(),
            })
        );
    }

    #[test]
    fn test_tick_autosaves_after_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let start = Instant::now();
        type_str(&mut app, "admin123");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), start);
        type_str(&mut app, "draft");

        assert!(app.tick(start + Duration::from_secs(61)));
        assert_eq!(fs::read_to_string(dir.path().join("diary.txt")).unwrap(), "draft");

        app.shutdown();
        assert!(!app.editor().unwrap().timers_armed());
    }

    #[test]
    fn test_unreadable_diary_survives_autosave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diary.txt");
        fs::write(&path, b"caf\xe9 memories").unwrap();
        let mut app = app_in(&dir);
        let start = Instant::now();
        type_str(&mut app, "admin123");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), start);

        assert!(matches!(app.overlay(), Some(Overlay::Alert { title, .. }) if title == "Error"));
        press(&mut app, KeyCode::Enter);

        app.tick(start + Duration::from_secs(61));
        assert_eq!(fs::read(&path).unwrap(), b"caf\xe9 memories");
        assert_eq!(
            app.editor().unwrap().status().to_string(),
            "Autosave paused: diary failed to load"
        );
    }

    #[test]
    fn test_huge_intervals_do_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_string_lossy().to_string(),
            autosave_interval_seconds: u64::MAX,
            clock_interval_ms: u64::MAX,
            ..Config::default()
        };
        let mut app = App::new(config);
        login(&mut app);
        app.tick(Instant::now() + Duration::from_secs(5));
    }

    #[test]
    fn test_altgr_characters_are_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;

        type_str(&mut app, "admin123");
        press(&mut app, KeyCode::Enter);
        app.handle_key(KeyEvent::new(KeyCode::Char('@'), altgr), Instant::now());
        app.handle_key(KeyEvent::new(KeyCode::Char('{'), altgr), Instant::now());
        assert_eq!(app.editor().unwrap().text(), "@{");

        // plain Alt is still swallowed
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT), Instant::now());
        assert_eq!(app.editor().unwrap().text(), "@{");
    }

    #[test]
    fn test_altgr_in_login_and_password_form() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("password.txt"), "me@home").unwrap();
        let mut app = app_in(&dir);
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;

        type_str(&mut app, "me");
        app.handle_key(KeyEvent::new(KeyCode::Char('@'), altgr), Instant::now());
        type_str(&mut app, "home");
        assert_eq!(app.login_input(), "me@home");
        press(&mut app, KeyCode::Enter);
        assert!(app.editor().is_some());

        ctrl(&mut app, 'p');
        app.handle_key(KeyEvent::new(KeyCode::Char('@'), altgr), Instant::now());
        match app.overlay() {
            Some(Overlay::ChangePassword(form)) => assert_eq!(form.fields[0], "@"),
            other => panic!("unexpected overlay: {:?}", other),
        }
    }

    #[test]
    fn test_ctrl_q_quits_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        ctrl(&mut app, 'q');
        assert!(app.should_quit());
    }
}
