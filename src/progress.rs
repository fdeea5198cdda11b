//! Progress display for long corpus passes.
//!
//! A bar is shown when the number of examples is known up front, a spinner
//! with a running count otherwise. Counts are display-only.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} {msg}";

/// Progress display settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressConfig {
    /// Suppress all progress output.
    pub hidden: bool,
}

impl ProgressConfig {
    /// Settings with progress output suppressed.
    #[must_use]
    pub const fn hidden() -> Self {
        Self { hidden: true }
    }

    /// Creates a progress indicator for a pass over `length_hint` examples.
    #[must_use]
    pub fn start(&self, length_hint: Option<u64>, message: &'static str) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }
        let (bar, template) = match length_hint {
            Some(total) => (ProgressBar::new(total), BAR_TEMPLATE),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
        };
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(message);
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_config_never_draws() {
        let bar = ProgressConfig::hidden().start(Some(10), "ranking");
        assert!(bar.is_hidden());
        bar.inc(3);
        assert_eq!(bar.position(), 3);
    }

    #[test]
    fn length_hint_sets_bar_length() {
        let bar = ProgressConfig::default().start(Some(42), "ranking");
        assert_eq!(bar.length(), Some(42));
        bar.finish_and_clear();
    }

    #[test]
    fn templates_parse() {
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
        assert!(ProgressStyle::with_template(SPINNER_TEMPLATE).is_ok());
    }
}
