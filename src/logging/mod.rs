//! Logging and output control
//!
//! This module provides the [`Logger`] used for every user-visible line replika
//! prints: section headings, job status lines and the final summary. It supports
//! quiet and verbose output.
//!
//! Output is best effort. A line that cannot be written (closed pipe, full
//! disk) is dropped and never affects the job that produced it.

use crate::concurrency::Phase;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Logger responsible for all user-visible output
#[derive(Clone)]
pub struct Logger {
    pub verbose: bool,
    pub quiet: bool,
    pub start_time: Option<Instant>,
    /// Replaces stdout and stderr when set
    writer: Option<SharedWriter>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("start_time", &self.start_time)
            .field("custom_writer", &self.writer.is_some())
            .finish()
    }
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
            start_time: Some(Instant::now()),
            writer: None,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
            start_time: Some(Instant::now()),
            writer: None,
        }
    }

    /// Send every line, errors included, to `writer` instead of stdout/stderr
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Arc::new(Mutex::new(writer)));
        self
    }

    fn out(&self, line: fmt::Arguments<'_>) {
        match &self.writer {
            Some(writer) => Self::write_shared(writer, line),
            None => {
                let _ = writeln!(io::stdout().lock(), "{}", line);
            }
        }
    }

    fn err(&self, line: fmt::Arguments<'_>) {
        match &self.writer {
            Some(writer) => Self::write_shared(writer, line),
            None => {
                let _ = writeln!(io::stderr().lock(), "{}", line);
            }
        }
    }

    fn write_shared(writer: &SharedWriter, line: fmt::Arguments<'_>) {
        if let Ok(mut writer) = writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        if !self.quiet {
            self.out(format_args!("\n=== {} ===", title));
        }
    }

    /// Sub-section heading
    pub fn subsection(&self, title: &str) {
        if !self.quiet {
            self.out(format_args!("\n--- {} ---", title));
        }
    }

    /// Information message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.out(format_args!("ℹ️  {}", message));
        }
    }

    /// Success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.out(format_args!("✅ {}", message));
        }
    }

    /// Warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.out(format_args!("⚠️  WARNING: {}", message));
        }
    }

    /// Error message, printed even in quiet mode
    pub fn error(&self, message: &str) {
        self.err(format_args!("❌ ERROR: {}", message));
    }

    /// Step information
    pub fn step(&self, message: &str) {
        if !self.quiet {
            self.out(format_args!("▶️  {}", message));
        }
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.out(format_args!("   {}", message));
        }
    }

    /// Status line printed before a pull, tag or push starts
    pub fn phase_start(&self, phase: Phase, target: &str) {
        if !self.quiet {
            self.out(format_args!("{}", Self::status_line('-', phase, target)));
        }
    }

    /// Status line printed after a pull, tag or push succeeded
    pub fn phase_done(&self, phase: Phase, target: &str) {
        if !self.quiet {
            self.out(format_args!("{}", Self::status_line('+', phase, target)));
        }
    }

    fn status_line(marker: char, phase: Phase, target: &str) -> String {
        format!("{} {}: {}", marker, phase, target)
    }

    pub fn summary(&self, title: &str, items: &[String]) {
        if !self.quiet {
            self.out(format_args!("\n📋 {}", title));
            self.out(format_args!("{}", "─".repeat(title.len() + 3)));

            for item in items {
                self.out(format_args!("  • {}", item));
            }

            if items.is_empty() {
                self.out(format_args!("  (No items to display)"));
            }
        }
    }

    // Structured list output
    pub fn list(&self, title: &str, items: &[String]) {
        if !self.quiet {
            self.subsection(title);
            for (i, item) in items.iter().enumerate() {
                self.out(format_args!("  {}. {}", i + 1, item));
            }

            if items.is_empty() {
                self.out(format_args!("  (No items to display)"));
            }
        }
    }

    /// Time since the logger was created
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Format duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{}.{}s", secs, duration.subsec_millis() / 100)
        } else if secs < 3600 {
            format!("{}m{}s", secs / 60, secs % 60)
        } else {
            format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }
}
