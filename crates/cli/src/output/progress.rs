//! Progress bars for transfers
//!
//! Hidden in quiet and JSON mode and with `--no-progress`.

use indicatif::ProgressStyle;

use super::OutputConfig;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Progress bar wrapper
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    fn visible(config: &OutputConfig) -> bool {
        !(config.quiet || config.json || config.no_progress)
    }

    /// Byte progress for a transfer of `total` bytes
    pub fn new(config: &OutputConfig, total: u64, message: &str) -> Self {
        let bar = Self::visible(config).then(|| {
            let bar = indicatif::ProgressBar::new(total);
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            bar.set_style(style);
            bar.set_message(message.to_string());
            bar
        });

        Self { bar }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_hidden() {
        for config in [
            OutputConfig {
                quiet: true,
                ..Default::default()
            },
            OutputConfig {
                json: true,
                ..Default::default()
            },
            OutputConfig {
                no_progress: true,
                ..Default::default()
            },
        ] {
            assert!(!ProgressBar::new(&config, 100, "x").is_visible());
        }
    }

    #[test]
    fn test_progress_bar_normal() {
        let bar = ProgressBar::new(&OutputConfig::default(), 100, "file");
        assert!(bar.is_visible());
        bar.inc(50);
        bar.finish_and_clear();
    }
}
