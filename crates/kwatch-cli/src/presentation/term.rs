use std::io::{self, Stdout, Write};

use anyhow::Result;
use crossterm::cursor;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use kwatch_core::{Frame, TextStyle};
use kwatch_types::Theme;

/// The render surface: draws frames either inline (redrawing in place) or
/// on the alternate screen, switching between the two whenever the frame's
/// derived alt-screen signal changes.
pub struct Screen {
    out: Stdout,
    theme: Theme,
    altscreen: bool,
    last_lines: u16,
}

impl Screen {
    pub fn new(theme: Theme) -> Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, cursor::Hide)?;
        Ok(Screen {
            out,
            theme,
            altscreen: false,
            last_lines: 0,
        })
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        if frame.altscreen != self.altscreen {
            if frame.altscreen {
                execute!(self.out, EnterAlternateScreen)?;
            } else {
                execute!(self.out, LeaveAlternateScreen)?;
            }
            self.altscreen = frame.altscreen;
            self.last_lines = 0;
        }

        if self.altscreen {
            queue!(self.out, cursor::MoveTo(0, 0))?;
        } else {
            queue!(self.out, cursor::MoveToColumn(0))?;
            if self.last_lines > 0 {
                queue!(self.out, cursor::MoveUp(self.last_lines))?;
            }
        }

        for line in &frame.lines {
            for span in line {
                match self.color(span.style) {
                    Some(color) => queue!(
                        self.out,
                        SetForegroundColor(Color::AnsiValue(color)),
                        Print(&span.text),
                        ResetColor
                    )?,
                    None => queue!(self.out, Print(&span.text))?,
                }
            }
            queue!(self.out, Clear(ClearType::UntilNewLine), Print("\r\n"))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        self.out.flush()?;
        self.last_lines = frame.lines.len() as u16;
        Ok(())
    }

    fn color(&self, style: TextStyle) -> Option<u8> {
        if !self.theme.enabled {
            return None;
        }
        match style {
            TextStyle::Plain => None,
            TextStyle::Ok => Some(self.theme.ok),
            TextStyle::Warning => Some(self.theme.warning),
            TextStyle::Error => Some(self.theme.error),
            TextStyle::DeletedRow => Some(self.theme.deleted),
            TextStyle::Subdued => Some(self.theme.subdued),
            TextStyle::ErrorLabel => Some(self.theme.error_label),
        }
    }

    /// Best-effort terminal restore; used on both the quit and error paths.
    pub fn restore(&mut self) {
        if self.altscreen {
            let _ = execute!(self.out, LeaveAlternateScreen);
            self.altscreen = false;
        }
        let _ = execute!(self.out, cursor::Show);
        let _ = disable_raw_mode();
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.restore();
    }
}
