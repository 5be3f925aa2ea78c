//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the session
//! loop can be driven against a terminal or captured in tests. The default
//! implementation uses ANSI escape codes for the labels.

use std::io::{self, Write};

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code to drop bold while keeping the color.
const ANSI_NORMAL: &str = "\x1b[22m";

/// ANSI escape code for green text (used for the input prompt).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for cyan text (used for assistant answers).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for moderation blocks and errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for dim text (used for informational output).
const ANSI_DIM: &str = "\x1b[2m";

/// Label shown before operator input.
pub const PROMPT_LABEL: &str = "Customer: ";

/// Label shown before assistant output.
pub const ANSWER_LABEL: &str = "Chat Assistant: ";

/// Header printed above moderation violations.
pub const BLOCKED_HEADER: &str = "Sorry, your question didn't pass the moderation check:";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// The prompt string shown while waiting for input.
    fn prompt(&self) -> String;

    /// Print the assistant's answer.
    fn print_answer(&mut self, answer: &str);

    /// Print the moderation header and one line per violation.
    fn print_blocked(&mut self, descriptions: &[&str]);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// Answers and info go to the output stream, errors and moderation blocks to
/// the error stream. [`PlainTextRenderer::new`] uses stdout and stderr.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writers(use_color, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Creates a renderer that writes to the given streams.
    pub fn with_writers(
        use_color: bool,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            out,
            err,
            use_color,
        }
    }

    /// Returns true if ANSI styling is enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// Write failures are ignored.
impl Renderer for PlainTextRenderer {
    fn prompt(&self) -> String {
        if self.use_color {
            format!("{ANSI_GREEN}{ANSI_BOLD}{PROMPT_LABEL}{ANSI_RESET}")
        } else {
            PROMPT_LABEL.to_string()
        }
    }

    fn print_answer(&mut self, answer: &str) {
        let _ = if self.use_color {
            writeln!(
                self.out,
                "{ANSI_CYAN}{ANSI_BOLD}{ANSWER_LABEL}{ANSI_NORMAL}{answer}{ANSI_RESET}"
            )
        } else {
            writeln!(self.out, "{ANSWER_LABEL}{answer}")
        };
        let _ = self.out.flush();
    }

    fn print_blocked(&mut self, descriptions: &[&str]) {
        if self.use_color {
            let _ = write!(self.err, "{ANSI_RED}{ANSI_BOLD}");
        }
        let _ = writeln!(self.err, "{BLOCKED_HEADER}");
        for description in descriptions {
            let _ = writeln!(self.err, "{description}");
        }
        if self.use_color {
            let _ = write!(self.err, "{ANSI_RESET}");
        }
        let _ = writeln!(self.err);
        let _ = self.err.flush();
    }

    fn print_error(&mut self, error: &str) {
        let _ = if self.use_color {
            writeln!(self.err, "{ANSI_RED}Error: {error}{ANSI_RESET}")
        } else {
            writeln!(self.err, "Error: {error}")
        };
        let _ = self.err.flush();
    }

    fn print_info(&mut self, info: &str) {
        let _ = if self.use_color {
            writeln!(self.out, "{ANSI_DIM}{info}{ANSI_RESET}")
        } else {
            writeln!(self.out, "{info}")
        };
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured(use_color: bool) -> (PlainTextRenderer, Captured, Captured) {
        let out = Captured::default();
        let err = Captured::default();
        let renderer = PlainTextRenderer::with_writers(
            use_color,
            Box::new(out.clone()),
            Box::new(err.clone()),
        );
        (renderer, out, err)
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color());
        assert!(renderer.prompt().contains(PROMPT_LABEL));
        assert!(renderer.prompt().starts_with(ANSI_GREEN));
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color());
        assert_eq!(renderer.prompt(), "Customer: ");
    }

    #[test]
    fn blocked_prints_header_then_one_line_per_violation() {
        let (mut renderer, out, err) = captured(false);
        let violence = crate::types::ModerationCategory::Violence.description();
        renderer.print_blocked(&[violence]);

        let text = err.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![BLOCKED_HEADER, violence, ""]);
        assert!(out.text().is_empty());
    }

    #[test]
    fn answer_and_info_go_to_output() {
        let (mut renderer, out, err) = captured(false);
        renderer.print_answer("We ship worldwide.");
        renderer.print_info("Request cancelled.");
        renderer.print_error("completion service failed");

        assert_eq!(
            out.text(),
            "Chat Assistant: We ship worldwide.\nRequest cancelled.\n"
        );
        assert_eq!(err.text(), "Error: completion service failed\n");
    }

    #[test]
    fn colored_block_keeps_descriptions_verbatim() {
        let (mut renderer, _, err) = captured(true);
        renderer.print_blocked(&["first", "second"]);

        let text = err.text();
        assert!(text.starts_with(ANSI_RED));
        assert!(text.contains(&format!("{BLOCKED_HEADER}\nfirst\nsecond\n")));
    }
}
