use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use log::{error, warn};

use crate::error::{Error, Result};
use crate::line_source::LineSource;
use crate::parser;
use crate::record::{Alignment, Bubble, Coverage, Record};
use crate::sniffer;
use crate::types::{
    starts_with_digit, starts_with_ignore_case, Call, FileType, Metadata, PathKind,
    DIPLOID_MARKER, LIKELIHOOD_HEADER_PREFIX,
};

/// An open cortex bubble or alignment file.
///
/// Opening classifies the input, after which records are pulled one at a time with
/// [`CortexFile::read_bubble`] or [`CortexFile::read_alignment`]. The reading methods
/// expect the current line of the underlying [`LineSource`] to be the first unread
/// line, and leave it on the first line of the following record.
pub struct CortexFile {
    source: LineSource,
    metadata: Metadata,
}

impl CortexFile {
    /// Opens a file, which may be gzip-compressed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        LineSource::from_path(path)
            .and_then(Self::new)
            .map_err(report)
    }

    /// Opens an in-memory file, which may be gzip-compressed. `name` is used in
    /// diagnostics only.
    pub fn from_bytes<S: Into<String>>(name: S, bytes: Vec<u8>) -> Result<Self> {
        LineSource::from_bytes(name, bytes)
            .and_then(Self::new)
            .map_err(report)
    }

    /// Classifies the lines of `source` and rewinds it.
    pub fn new(mut source: LineSource) -> Result<Self> {
        let metadata = sniffer::sniff(&mut source)?;
        Ok(Self { source, metadata })
    }

    /// Releases the underlying stream. Dropping the file has the same effect.
    pub fn close(self) {}

    pub fn path(&self) -> &str {
        self.source.name()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn file_type(&self) -> FileType {
        self.metadata.file_type()
    }

    pub fn kmer_size(&self) -> u32 {
        self.metadata.kmer_size()
    }

    pub fn colours(&self) -> usize {
        self.metadata.colours()
    }

    pub fn colour_list(&self) -> String {
        self.metadata.colour_list()
    }

    pub fn has_likelihoods(&self) -> bool {
        self.metadata.has_likelihoods()
    }

    pub fn is_diploid(&self) -> bool {
        self.metadata.is_diploid()
    }

    /// Number of the line currently held, starting from 1.
    pub fn line_number(&self) -> u64 {
        self.source.line_number()
    }

    /// Creates an empty record sized for the colours of this file.
    pub fn new_record<R: Record>(&self) -> R {
        R::with_colours(self.colours())
    }

    pub fn new_bubble(&self) -> Bubble {
        self.new_record()
    }

    pub fn new_alignment(&self) -> Alignment {
        self.new_record()
    }

    /// Iterates over the remaining records, yielding an owned copy of each.
    ///
    /// The iterator ends after the first error.
    pub fn records<R: Record>(&mut self) -> Records<'_, R> {
        let record = self.new_record();
        Records {
            file: self,
            record,
            done: false,
        }
    }

    pub fn bubbles(&mut self) -> Records<'_, Bubble> {
        self.records()
    }

    pub fn alignments(&mut self) -> Records<'_, Alignment> {
        self.records()
    }

    //-------------------------------------------------------------------------

    /// Reads the next bubble into `bubble`.
    ///
    /// Returns `Ok(false)` at the end of the file, including on repeated calls.
    /// A malformed record is an error; the file stays open but the position within it is
    /// unspecified.
    pub fn read_bubble(&mut self, bubble: &mut Bubble) -> Result<bool> {
        self.expect_file_type(FileType::Bubble)?;
        if !self.source.skip_blank_lines()? {
            return Ok(false);
        }

        bubble.set_colours(self.colours());
        bubble.clear();

        if self.metadata.fails_classifier_line {
            bubble.fails_classifier.push_str(self.source.line());
            self.next_line("call start")?;
        }
        if self.metadata.discovery_phase_line {
            bubble.discovery_phase.push_str(self.source.line());
            self.next_line("call start")?;
        }

        if self.metadata.has_likelihoods {
            self.read_likelihoods(bubble)?;
        }

        for &kind in PathKind::ORDER.iter() {
            self.read_bubble_path(bubble, kind)?;
        }

        if !self.source.skip_blank_lines()? {
            return Err(self.premature_eof("bubble coverages"));
        }

        // The current line is the "branch1 coverages" label.
        for branch in 0..2 {
            let expected = bubble.branches[branch].seq_length as usize;
            for colour in 0..self.colours() {
                // "Covg in Col N:" label, then the numbers
                self.next_line("bubble coverages")?;
                self.next_line("bubble coverages")?;
                self.load_coverage(&mut bubble.branch_coverages[branch][colour], expected);
            }
            self.source.read_line()?;
        }

        self.source.skip_blank_lines()?;
        Ok(true)
    }

    fn read_likelihoods(&mut self, bubble: &mut Bubble) -> Result<()> {
        if !starts_with_ignore_case(self.source.line(), LIKELIHOOD_HEADER_PREFIX) {
            return Err(self.malformed("expected a likelihood header"));
        }
        if self.source.line().contains(DIPLOID_MARKER) {
            self.metadata.is_diploid = true;
        }
        let diploid = self.metadata.is_diploid;

        for colour in 0..self.colours() {
            self.next_line("call likelihoods")?;
            if !starts_with_digit(self.source.line()) {
                return Err(self.malformed("expected a likelihood line"));
            }
            let (call, llks) = match parser::likelihood_line(self.source.line()) {
                Ok((_, (_, call, llks))) => (call, llks),
                Err(_) => return Err(self.malformed("invalid likelihood line")),
            };
            let expected = if diploid { 3 } else { 2 };
            if llks.len() != expected {
                return Err(self.malformed(format!(
                    "expected {} likelihoods but found {}",
                    expected,
                    llks.len()
                )));
            }
            let call = match Call::from_str(call) {
                Ok(Call::Unknown) | Err(_) => {
                    return Err(self.malformed(format!("unexpected genotype call '{}'", call)))
                }
                Ok(Call::Het) if !diploid => {
                    return Err(self.malformed("heterozygous call in a haploid file"))
                }
                Ok(call) => call,
            };

            bubble.calls[colour] = call;
            bubble.llk_hom_br1[colour] = llks[0];
            if diploid {
                bubble.llk_het[colour] = llks[1];
                bubble.llk_hom_br2[colour] = llks[2];
            } else {
                bubble.llk_hom_br2[colour] = llks[1];
            }
        }

        self.next_line("bubble paths")
    }

    fn read_bubble_path(&mut self, bubble: &mut Bubble, kind: PathKind) -> Result<()> {
        let header = match parser::path_header(self.source.line()) {
            Ok((_, header)) => header,
            Err(_) => return Err(self.malformed(format!("couldn't parse {} header", kind))),
        };
        if header.kind != kind {
            return Err(self.malformed(format!("expected {} but found {}", kind, header.kind)));
        }
        if kind == PathKind::Flank5p {
            bubble.var_num = header.var_num;
        } else if header.var_num != bubble.var_num {
            return Err(self.malformed(format!(
                "{} has var number {} instead of {}",
                kind, header.var_num, bubble.var_num
            )));
        }
        if let Err(err) = bubble.path_mut(kind).set_header(&header) {
            return Err(self.malformed(err.to_string()));
        }

        self.next_line("bubble sequence")?;
        bubble.path_mut(kind).set_seq(self.source.line());
        self.source.read_line()?;
        Ok(())
    }

    //-------------------------------------------------------------------------

    /// Reads the next alignment into `alignment`.
    ///
    /// Returns `Ok(false)` at the end of the file, including on repeated calls.
    pub fn read_alignment(&mut self, alignment: &mut Alignment) -> Result<bool> {
        self.expect_file_type(FileType::Alignment)?;
        if !self.source.skip_blank_lines()? {
            return Ok(false);
        }

        alignment.set_colours(self.colours());
        alignment.clear();

        match self.source.line().strip_prefix('>') {
            Some(name) => alignment.name.push_str(name),
            None => return Err(self.malformed("alignment header doesn't start with '>'")),
        }
        self.next_line("alignment sequence")?;
        alignment.seq.push_str(self.source.line());

        let expected = alignment.seq.len();
        for colour in 0..self.colours() {
            self.next_line("alignment coverages")?;
            self.next_line("alignment coverages")?;
            self.load_coverage(&mut alignment.coverages[colour], expected);
        }

        self.source.read_line()?;
        Ok(true)
    }

    //-------------------------------------------------------------------------

    /// Writes `bubble` in the layout of this file.
    pub fn write_bubble<W: Write>(&self, out: &mut W, bubble: &Bubble) -> io::Result<()> {
        bubble.write_to(out, &self.metadata)
    }

    pub fn write_alignment<W: Write>(&self, out: &mut W, alignment: &Alignment) -> io::Result<()> {
        alignment.write_to(out, &self.metadata)
    }

    pub fn print_bubble(&self, bubble: &Bubble) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_bubble(&mut out, bubble)
    }

    pub fn print_alignment(&self, alignment: &Alignment) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_alignment(&mut out, alignment)
    }

    //-------------------------------------------------------------------------

    fn expect_file_type(&self, expected: FileType) -> Result<()> {
        if self.file_type() != expected {
            return Err(Error::WrongFileType {
                location: self.source.location(),
                expected,
                found: self.file_type(),
            });
        }
        Ok(())
    }

    fn next_line(&mut self, context: &'static str) -> Result<()> {
        if self.source.read_line()? {
            Ok(())
        } else {
            Err(self.premature_eof(context))
        }
    }

    // Width mismatches and trailing text are reported but do not fail the record.
    fn load_coverage(&self, coverage: &mut Coverage, expected: usize) {
        let (found, rest) = coverage.load(self.source.line(), expected);
        if found != expected {
            warn!(
                "{}",
                Error::CoverageWidthMismatch {
                    location: self.source.location(),
                    expected,
                    found,
                }
            );
        }
        let rest = rest.trim();
        if !rest.is_empty() {
            warn!(
                "unexpected content on the end of line ['{}'] ({})",
                rest,
                self.source.location()
            );
        }
    }

    fn malformed<S: Into<String>>(&self, reason: S) -> Error {
        Error::MalformedRecord {
            location: self.source.location(),
            reason: reason.into(),
        }
    }

    fn premature_eof(&self, context: &'static str) -> Error {
        Error::PrematureEof {
            location: self.source.location(),
            context,
        }
    }
}

fn report(err: Error) -> Error {
    error!("{}", err);
    err
}

/// Iterator over the remaining records of a [`CortexFile`].
pub struct Records<'a, R: Record> {
    file: &'a mut CortexFile,
    record: R,
    done: bool,
}

impl<'a, R: Record> Iterator for Records<'a, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.record.read_from(self.file) {
            Ok(true) => Some(Ok(self.record.clone())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
