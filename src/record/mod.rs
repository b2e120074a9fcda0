mod alignment;
mod bubble;
mod coverage;

use std::io::{self, Write};

use crate::error::Result;
use crate::reader::CortexFile;
use crate::types::Metadata;
pub use alignment::Alignment;
pub use bubble::{Bubble, BubblePath};
pub use coverage::Coverage;

/// A record kind that can be pulled from a [`CortexFile`] and written back as text.
pub trait Record: Clone {
    /// Creates an empty record with per-colour storage for `colours` colours.
    fn with_colours(colours: usize) -> Self;

    /// Reads the next record of this kind into `self`, reusing its buffers.
    ///
    /// Returns `Ok(false)` once the file is exhausted.
    fn read_from(&mut self, file: &mut CortexFile) -> Result<bool>;

    fn write_to<W: Write>(&self, out: &mut W, metadata: &Metadata) -> io::Result<()>;
}
