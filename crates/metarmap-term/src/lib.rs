//! Terminal strip renderer for metarmap
//!
//! Draws a row of colored glyphs using ANSI 24-bit color escapes, one glyph per
//! indicator position. The strip is redrawn in place on every frame.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Stdout, Write};

/// Glyph drawn for every lit or unlit position.
const GLYPH: &str = "\u{25cf}";

/// Resets all ANSI attributes.
const RESET: &str = "\x1b[0m";

/// A strip of indicators drawn on a terminal line.
#[derive(Debug)]
pub struct TerminalStrip<W: Write> {
    out: W,
    frames: u64,
}

impl TerminalStrip<Stdout> {
    /// Create a strip that draws to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalStrip<W> {
    /// Create a strip that draws to the given writer.
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Draw one frame of `(r, g, b)` pixels, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying writer fails.
    pub fn show(&mut self, pixels: &[(u8, u8, u8)]) -> io::Result<()> {
        let mut line = String::with_capacity(pixels.len() * 24 + 8);
        line.push('\r');
        for &(r, g, b) in pixels {
            if (r, g, b) == (0, 0, 0) {
                // Unlit positions stay visible as dim placeholders
                line.push_str("\x1b[38;2;40;40;40m");
            } else {
                line.push_str(&format!("\x1b[38;2;{r};{g};{b}m"));
            }
            line.push_str(GLYPH);
            line.push(' ');
        }
        line.push_str(RESET);

        self.out.write_all(line.as_bytes())?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }

    /// Finish the strip line so later output starts on a fresh line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying writer fails.
    pub fn finish(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    /// Number of frames drawn so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Consume the strip and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Get renderer name
#[must_use]
pub fn renderer_name() -> &'static str {
    "terminal"
}
