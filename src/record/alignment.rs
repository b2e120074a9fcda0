use std::io::{self, Write};

use getset::Getters;

use crate::error::Result;
use crate::reader::CortexFile;
use crate::record::{Coverage, Record};
use crate::types::Metadata;
use crate::writer;

/// A named sequence with its coverage in every colour.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Alignment {
    pub(crate) name: String,
    pub(crate) seq: String,
    pub(crate) coverages: Vec<Coverage>,
}

impl Alignment {
    pub fn new(colours: usize) -> Self {
        let mut alignment = Self::default();
        alignment.set_colours(colours);
        alignment
    }

    pub fn colours(&self) -> usize {
        self.coverages.len()
    }

    pub(crate) fn set_colours(&mut self, colours: usize) {
        self.coverages.resize_with(colours, Coverage::new);
    }

    /// # Panics
    ///
    /// If `colour` is not below [`Alignment::colours`].
    pub fn coverage(&self, colour: usize) -> &Coverage {
        &self.coverages[colour]
    }

    /// Empties every field while keeping the allocations for the next read.
    pub fn clear(&mut self) {
        self.name.clear();
        self.seq.clear();
        self.coverages.iter_mut().for_each(Coverage::clear);
    }
}

impl Record for Alignment {
    fn with_colours(colours: usize) -> Self {
        Alignment::new(colours)
    }

    fn read_from(&mut self, file: &mut CortexFile) -> Result<bool> {
        file.read_alignment(self)
    }

    fn write_to<W: Write>(&self, out: &mut W, metadata: &Metadata) -> io::Result<()> {
        writer::write_alignment(out, self, metadata)
    }
}
