//! Output side of the display: anything that can show a frame.

use std::io::Write;

use metarmap_term::TerminalStrip;

use crate::animation::Frame;
use crate::error::{Error, Result};

/// Draws frames on a physical or simulated indicator strip.
pub trait StripRenderer: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Show a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the frame.
    fn show(&mut self, frame: &Frame) -> Result<()>;

    /// Release the device at shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be released cleanly.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write + Send> StripRenderer for TerminalStrip<W> {
    fn name(&self) -> &'static str {
        metarmap_term::renderer_name()
    }

    fn show(&mut self, frame: &Frame) -> Result<()> {
        TerminalStrip::show(self, &frame.to_tuples()).map_err(Error::Render)
    }

    fn finish(&mut self) -> Result<()> {
        TerminalStrip::finish(self).map_err(Error::Render)
    }
}
