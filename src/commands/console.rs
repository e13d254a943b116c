//! User-visible output.
//!
//! Every line is also sent to `tracing`, so the log file carries the same
//! record as the terminal.

#[cfg(test)]
use std::cell::RefCell;

use super::CallContext;

/// Severity of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress and success messages.
    Info,
    /// Failures. Never suppressed.
    Error,
    /// Command results (tables, JSON).
    Output,
}

enum Sink {
    Terminal,
    #[cfg(test)]
    Capture(RefCell<Vec<(Level, String)>>),
}

/// Where operations write for the user.
pub struct Console {
    sink: Sink,
}

impl Console {
    /// Write to stdout (info, output) and stderr (errors).
    pub fn terminal() -> Self {
        Self {
            sink: Sink::Terminal,
        }
    }

    /// Record lines in memory.
    #[cfg(test)]
    pub fn capture() -> Self {
        Self {
            sink: Sink::Capture(RefCell::new(Vec::new())),
        }
    }

    pub fn info(&self, ctx: CallContext, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(internal = ctx.internal, "{}", message);
        if !ctx.is_quiet() {
            self.emit(Level::Info, message);
        }
    }

    /// Report a failure. Shown even for internal calls.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.emit(Level::Error, message);
    }

    pub fn output(&self, ctx: CallContext, text: impl Into<String>) {
        if !ctx.is_quiet() {
            self.emit(Level::Output, text.into());
        }
    }

    fn emit(&self, level: Level, message: String) {
        match &self.sink {
            Sink::Terminal => match level {
                Level::Error => eprintln!("{}", message),
                Level::Info | Level::Output => println!("{}", message),
            },
            #[cfg(test)]
            Sink::Capture(lines) => lines.borrow_mut().push((level, message)),
        }
    }

    /// Everything captured so far. Empty for the terminal sink.
    #[cfg(test)]
    pub fn captured(&self) -> Vec<(Level, String)> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Capture(lines) => lines.borrow().clone(),
        }
    }

    /// Captured lines of one level.
    #[cfg(test)]
    pub fn lines(&self, level: Level) -> Vec<String> {
        self.captured()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}
