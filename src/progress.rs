//! Progress bar for per-file analysis.
//!
//! Bars are hidden when stderr is not a terminal, when `--plain` is given,
//! or when `SMELLSCOPE_QUIET` is set.

use indicatif::{ProgressBar, ProgressStyle};

pub const TEMPLATE_FILE_ANALYSIS: &str = "{msg} {pos}/{len} files ({percent}%) - {eta}";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressConfig {
    pub quiet_mode: bool,
}

impl ProgressConfig {
    pub fn from_env(quiet: bool) -> Self {
        Self {
            quiet_mode: quiet || std::env::var("SMELLSCOPE_QUIET").is_ok(),
        }
    }

    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }
        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }

    /// A bar of `len` steps, or a hidden one when progress is off
    pub fn create_bar(&self, len: u64, template: &str, msg: &str) -> ProgressBar {
        if !self.should_show_progress() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ");
        bar.set_style(style);
        bar.set_message(msg.to_string());
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_flag_hides_bars() {
        let config = ProgressConfig::from_env(true);
        assert!(!config.should_show_progress());
        assert!(config
            .create_bar(10, TEMPLATE_FILE_ANALYSIS, "Analyzing")
            .is_hidden());
    }
}
