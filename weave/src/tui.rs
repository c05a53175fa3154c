//! Terminal setup and teardown.
//!
//! Frames go to stderr through a `BufWriter`, so a whole frame of escape
//! sequences leaves in one write while a reply streams in.

use std::io::{self, BufWriter, Stderr};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub type Term = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Switches to raw mode on the alternate screen with mouse capture.
///
/// Every exit path must call [`leave`]; ratatui does not undo this on drop.
pub fn enter() -> io::Result<Term> {
    terminal::enable_raw_mode()?;
    let mut writer = BufWriter::new(io::stderr());
    execute!(writer, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(writer))
}

/// Puts the terminal back the way the shell expects it. Safe to call twice.
pub fn leave() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Chains a panic hook that calls [`leave`] first, so the panic message lands
/// on a usable screen. Install before [`enter`].
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = leave();
        previous(info);
    }));
}

/// Flag flipped by SIGTERM. The event loop polls it.
pub fn sigterm_flag() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&flag))?;
    Ok(flag)
}
