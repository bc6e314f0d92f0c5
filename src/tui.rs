use crossterm::{
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
    },
};
use ratatui::prelude::*;
use std::io::{self, Stdout, stdout};

/// A type alias for the terminal type used in this application
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Minimum required terminal dimensions
pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;

/// Initialize the terminal
pub fn init() -> io::Result<Tui> {
    // Check terminal size before initialization
    let (width, height) = size()?;
    check_size(width, height)?;

    execute!(stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn check_size(width: u16, height: u16) -> io::Result<()> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(io::Error::other(format!(
            "Terminal size too small. Required: {}x{}, Current: {}x{}\nPlease resize your terminal and try again.",
            MIN_WIDTH, MIN_HEIGHT, width, height
        )));
    }
    Ok(())
}

/// Restore the terminal to its original state
pub fn restore() -> io::Result<()> {
    execute!(stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_size() {
        assert!(check_size(80, 24).is_ok());
        assert!(check_size(200, 60).is_ok());
        assert!(check_size(79, 24).is_err());
        assert!(check_size(80, 23).is_err());
    }
}
