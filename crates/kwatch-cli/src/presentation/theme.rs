use is_terminal::IsTerminal;

use kwatch_types::Theme;

/// Resolve the color theme once at startup. Colors switch off under
/// NO_COLOR or when stdout is not a terminal.
pub fn detect_theme() -> Theme {
    if std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
        return Theme::disabled();
    }
    Theme::default()
}
