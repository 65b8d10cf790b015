//! Output formatter for human-readable and JSON output
//!
//! Ensures consistent output formatting across all commands. In JSON mode
//! every result is a single pretty-printed document on stdout and errors
//! are JSON objects on stderr.

use comfy_table::{Table, presets};
use console::Style;
use serde::Serialize;

use super::OutputConfig;

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colors_enabled() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Output a success message (human mode only)
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{} {message}", self.paint(Style::new().green(), "✓"));
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.paint(Style::new().red(), "✗"));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{} {message}", self.paint(Style::new().yellow(), "⚠"));
    }

    /// Output JSON directly, regardless of mode
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Dim text for secondary columns
    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dim(), text)
    }

    /// Render rows as a borderless, left-aligned table
    pub fn table<I, R>(&self, header: &[&str], rows: I) -> String
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = String>,
    {
        let mut table = Table::new();
        table.load_preset(presets::NOTHING);
        if !header.is_empty() {
            table.set_header(header.iter().map(|h| self.paint(Style::new().bold(), h)));
        }
        for row in rows {
            table.add_row(row.into_iter().collect::<Vec<_>>());
        }
        table.to_string()
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Formatter {
        Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_formatter_default() {
        let formatter = Formatter::default();
        assert!(!formatter.is_json());
        assert!(formatter.colors_enabled());
    }

    #[test]
    fn test_formatter_json_mode() {
        let formatter = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(formatter.is_json());
        assert!(!formatter.colors_enabled());
    }

    #[test]
    fn test_no_color_leaves_text_alone() {
        let formatter = plain();
        assert!(!formatter.colors_enabled());
        assert_eq!(formatter.dim("text"), "text");
    }

    #[test]
    fn test_table_rendering() {
        let rendered = plain().table(
            &["NAME", "SIZE"],
            vec![
                vec!["a.txt".to_string(), "1 KiB".to_string()],
                vec!["longer-name.bin".to_string(), "12 MiB".to_string()],
            ],
        );
        let lines: Vec<&str> = rendered.lines().map(str::trim_end).collect();
        insta::assert_debug_snapshot!(lines, @r#"
        [
            " NAME             SIZE",
            " a.txt            1 KiB",
            " longer-name.bin  12 MiB",
        ]
        "#);
    }
}
