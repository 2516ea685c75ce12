use crossterm::{
    cursor::Show,
    event::{self, Event},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod buffer;
mod config;
mod credentials;
mod diary;
mod error;
mod flatfile;
mod gate;
mod timer;
mod ui;

use app::App;
use config::Config;
use ui::Screen;

/// How long the loop waits for input before checking timers again.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    let config = Config::load();
    init_logging(&config);
    info!(data_dir = %config.data_dir, "starting diary");

    let mut app = App::new(config);

    enter_raw_mode()?;
    let result = run(&mut app);
    app.shutdown();
    // Restore the terminal even if the loop failed
    leave_raw_mode()?;

    if let Err(err) = &result {
        error!(?err, "event loop failed");
    }
    info!("diary closed");
    result
}

/// Send logs to the configured file; the terminal belongs to the UI.
fn init_logging(config: &Config) {
    let path = config.log_path();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled, cannot open {}: {}", path.display(), e);
            return;
        }
    };

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn run(app: &mut App) -> io::Result<()> {
    let mut screen = Screen::new()?;
    app.set_page_size(screen.text_height());
    let mut dirty = true;

    loop {
        if dirty {
            screen.draw(app)?;
            dirty = false;
        }

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key_event) => {
                    app.handle_key(key_event, Instant::now());
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    if screen.resize(width, height) {
                        app.set_page_size(screen.text_height());
                        dirty = true;
                    }
                }
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }

        if app.tick(Instant::now()) {
            dirty = true;
        }
    }

    Ok(())
}

fn enter_raw_mode() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Clear(ClearType::All))?;
    Ok(())
}

fn leave_raw_mode() -> io::Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    Ok(())
}
