use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Location, Result};

enum Origin {
    File(PathBuf),
    Memory(Rc<[u8]>),
}

/// Sequential supplier of chomped lines over a (possibly gzip-compressed) input.
///
/// The most recently read line stays available through [`LineSource::line`] until the
/// next call to [`LineSource::read_line`]; the readers rely on this to peek at the first
/// line of the following record.
pub struct LineSource {
    name: String,
    origin: Origin,
    inner: Box<dyn BufRead>,
    line: String,
    line_number: u64,
    eof: bool,
}

impl LineSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self::new(name, Origin::File(path))
    }

    /// Reads lines from an in-memory buffer. `name` is used in diagnostics only.
    pub fn from_bytes<S: Into<String>>(name: S, bytes: Vec<u8>) -> Result<Self> {
        Self::new(name.into(), Origin::Memory(Rc::from(bytes)))
    }

    fn new(name: String, origin: Origin) -> Result<Self> {
        let inner = open(&name, &origin)?;
        Ok(Self {
            name,
            origin,
            inner,
            line: String::with_capacity(500),
            line_number: 0,
            eof: false,
        })
    }

    /// Replaces the current line with the next one from the input.
    ///
    /// Returns `false` at end of input, in which case the current line is empty.
    /// Blank lines return `true`.
    pub fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        if self.eof {
            return Ok(false);
        }
        let read = self
            .inner
            .read_line(&mut self.line)
            .map_err(|source| Error::Io {
                path: self.name.clone(),
                source,
            })?;
        if read == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.line_number += 1;
        let chomped = self.line.trim_end_matches(&['\n', '\r'][..]).len();
        self.line.truncate(chomped);
        Ok(true)
    }

    /// Advances until the current line is not blank. Returns `false` if the input ran out.
    pub fn skip_blank_lines(&mut self) -> Result<bool> {
        while self.is_blank() {
            if !self.read_line()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Starts over from the beginning of the input and loads the first line.
    pub fn rewind(&mut self) -> Result<bool> {
        self.inner = open(&self.name, &self.origin)?;
        self.line_number = 0;
        self.eof = false;
        self.read_line()
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn is_blank(&self) -> bool {
        self.line.trim().is_empty()
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        Location {
            path: self.name.clone(),
            line: self.line_number,
        }
    }
}

fn open(name: &str, origin: &Origin) -> Result<Box<dyn BufRead>> {
    let opened = match origin {
        Origin::File(path) => niffler::from_path(path),
        Origin::Memory(bytes) => niffler::get_reader(Box::new(Cursor::new(Rc::clone(bytes)))),
    };
    let reader = match opened {
        Ok((reader, _format)) => reader,
        // Too short to hold a compression magic number, so it can only be plain text.
        Err(niffler::Error::FileTooShort) => open_plain(name, origin)?,
        Err(niffler::Error::IOError(source)) => {
            return Err(Error::Io {
                path: name.to_owned(),
                source,
            })
        }
        Err(source) => {
            return Err(Error::Decompress {
                path: name.to_owned(),
                source,
            })
        }
    };
    Ok(Box::new(BufReader::new(reader)))
}

fn open_plain(name: &str, origin: &Origin) -> Result<Box<dyn Read>> {
    match origin {
        Origin::File(path) => match File::open(path) {
            Ok(file) => Ok(Box::new(file)),
            Err(source) => Err(Error::Io {
                path: name.to_owned(),
                source,
            }),
        },
        Origin::Memory(bytes) => Ok(Box::new(Cursor::new(Rc::clone(bytes)))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn lines(source: &mut LineSource) -> Vec<String> {
        let mut lines = Vec::new();
        while source.read_line().unwrap() {
            lines.push(source.line().to_owned());
        }
        lines
    }

    #[test]
    fn test_chomps_line_endings() {
        let mut source =
            LineSource::from_bytes("mem", b"first\r\n\nthird line \nlast".to_vec()).unwrap();
        assert_eq!(lines(&mut source), ["first", "", "third line ", "last"]);
        assert_eq!(source.line_number(), 4);
        assert!(source.is_eof());
        assert!(!source.read_line().unwrap());
        assert_eq!(source.line_number(), 4);
    }

    #[test]
    fn test_rewind_restarts_numbering() {
        let mut source = LineSource::from_bytes("mem", b"one\ntwo\nthree\n".to_vec()).unwrap();
        lines(&mut source);
        assert!(source.rewind().unwrap());
        assert_eq!(source.line(), "one");
        assert_eq!(source.line_number(), 1);
        assert_eq!(lines(&mut source), ["two", "three"]);
    }

    #[test]
    fn test_skip_blank_lines() {
        let mut source = LineSource::from_bytes("mem", b"\n  \n>x\n\n".to_vec()).unwrap();
        source.read_line().unwrap();
        assert!(source.skip_blank_lines().unwrap());
        assert_eq!(source.line(), ">x");
        source.read_line().unwrap();
        assert!(!source.skip_blank_lines().unwrap());
        assert!(source.is_eof());
    }

    #[test]
    fn test_gzipped_input() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">seq\nACGT\n").unwrap();
        let compressed = encoder.finish().unwrap();
        let mut source = LineSource::from_bytes("mem.gz", compressed).unwrap();
        assert_eq!(lines(&mut source), [">seq", "ACGT"]);
        assert!(source.rewind().unwrap());
        assert_eq!(source.line(), ">seq");
    }

    #[test]
    fn test_short_input() {
        let mut source = LineSource::from_bytes("short", b">x\n".to_vec()).unwrap();
        assert_eq!(lines(&mut source), [">x"]);
        assert!(source.rewind().unwrap());
        assert_eq!(source.line(), ">x");

        let mut source = LineSource::from_bytes("empty", Vec::new()).unwrap();
        assert!(!source.read_line().unwrap());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            LineSource::from_path("resources/does-not-exist.colour_covgs"),
            Err(Error::Io { .. })
        ));
    }
}
