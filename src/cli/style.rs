//! Terminal capability checks for CLI output
//!
//! Respects the [NO_COLOR standard](https://no-color.org/) and `TINYENV_COLORS`.

use std::env;

use supports_color::Stream;

/// Whether stdout output should carry color
pub fn colors_enabled() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(val) = env::var("TINYENV_COLORS") {
        if val == "never" || val == "0" || val == "false" {
            return false;
        }
        if val == "always" || val == "1" || val == "true" {
            return true;
        }
    }
    supports_color::on(Stream::Stdout).is_some()
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
