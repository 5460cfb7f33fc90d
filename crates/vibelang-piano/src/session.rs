//! Terminal input session
//!
//! Raw mode, the alternate screen, mouse capture and keyboard enhancement
//! flags are terminal-wide. [`TerminalSession`] owns them for as long as the
//! piano is on screen and gives them back on drop, including when the event
//! loop bails out with an error.

use crate::error::Result;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::prelude::*;
use std::io::{self, stdout, Stdout};

/// Terminal set up for the piano
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    keyboard_enhanced: bool,
}

impl TerminalSession {
    /// Take over the terminal
    pub fn start() -> Result<Self> {
        enable_raw_mode()?;
        let terminal = match Terminal::new(CrosstermBackend::new(stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(e.into());
            }
        };

        // From here on Drop undoes whatever was set up
        let mut session = Self {
            terminal,
            keyboard_enhanced: false,
        };
        execute!(
            session.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        if supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                session.terminal.backend_mut(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            session.keyboard_enhanced = true;
        } else {
            log::info!("Terminal does not report key releases, falling back to auto-release");
        }

        Ok(session)
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Whether key release events will be delivered
    pub fn reports_key_release(&self) -> bool {
        self.keyboard_enhanced
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        disable_raw_mode()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            // Still try to leave raw mode so the shell stays usable
            let _ = disable_raw_mode();
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}
