use std::fmt;
use std::ops::Deref;

use getset::CopyGetters;
use itertools::Itertools;
use strum::{Display, EnumString};

/// Leading annotation written before a bubble that fits the repeat model better.
pub const FAILS_CLASSIFIER_PREFIX: &str = "FAILS CLASSIFIER:";
/// Leading annotation written before a bubble found in the discovery phase.
pub const DISCOVERY_PHASE_PREFIX: &str = "DISCOVERY PHASE:";

pub(crate) const FAILS_CLASSIFIER_LINE: &str =
    "FAILS CLASSIFIER: fits repeat model better than variation model";
pub(crate) const DISCOVERY_PHASE_LINE: &str =
    "DISCOVERY PHASE:  VARIANT vs REPEAT MODEL LOG_LIKELIHOODS:\tllk_var:nan\tllk_rep:-inf";

pub(crate) const LIKELIHOOD_HEADER_PREFIX: &str = "Colour";
pub(crate) const DIPLOID_MARKER: &str = "llk_het";
pub(crate) const LIKELIHOOD_HEADER_HAPLOID: &str = "Colour/sample\tGT_call\tllk_hom_br1\tllk_hom_br2";
pub(crate) const LIKELIHOOD_HEADER_DIPLOID: &str =
    "Colour/sample\tGT_call\tllk_hom_br1\tllk_het\tllk_hom_br2";

pub(crate) const ALIGNMENT_COVERAGE_SUFFIX: &str = "_colour_0_kmer_coverages";
pub(crate) const COVERAGE_LABEL_PREFIX: &str = "Covg ";
pub(crate) const BRANCH_LABEL_PREFIX: &str = "branch";

/// Longest k-mer the assembler supports, and so the longest token a path header holds.
pub const MAX_TOKEN_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FileType {
    #[strum(serialize = "unknown")]
    Unknown,
    #[strum(serialize = "bubble")]
    Bubble,
    #[strum(serialize = "alignment")]
    Alignment,
}

impl Default for FileType {
    fn default() -> Self {
        FileType::Unknown
    }
}

/// Dataset-wide properties of a cortex file, fixed when the file is opened.
///
/// `is_diploid` is the one exception: it is also switched on the first time a record's
/// likelihood header carries an `llk_het` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Metadata {
    pub(crate) file_type: FileType,
    pub(crate) kmer_size: u32,
    pub(crate) colours: usize,
    pub(crate) has_likelihoods: bool,
    pub(crate) is_diploid: bool,
    /// Each bubble is preceded by a "FAILS CLASSIFIER" line.
    pub(crate) fails_classifier_line: bool,
    /// Each bubble is preceded by a "DISCOVERY PHASE" line.
    pub(crate) discovery_phase_line: bool,
}

impl Metadata {
    /// Colour indices as a comma separated list, e.g. `0,1,2`.
    pub fn colour_list(&self) -> String {
        (0..self.colours).join(",")
    }
}

/// Genotype call for one colour of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Call {
    #[strum(serialize = "UNKNOWN")]
    Unknown,
    #[strum(serialize = "HOM1")]
    HomBranch1,
    #[strum(serialize = "HOM2")]
    HomBranch2,
    #[strum(serialize = "HET")]
    Het,
}

impl Default for Call {
    fn default() -> Self {
        Call::Unknown
    }
}

/// The four sequence segments of a bubble, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Flank5p,
    Branch1,
    Branch2,
    Flank3p,
}

impl PathKind {
    pub const ORDER: [PathKind; 4] = [
        PathKind::Flank5p,
        PathKind::Branch1,
        PathKind::Branch2,
        PathKind::Flank3p,
    ];

    /// The header name of this path in a given bubble, e.g. `var_7_5p_flank`.
    pub(crate) fn name(self, var_num: u64) -> PathName {
        PathName(self, var_num)
    }
}

pub(crate) struct PathName(PathKind, u64);

impl fmt::Display for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let PathName(kind, var_num) = self;
        match kind {
            PathKind::Flank5p => write!(f, "var_{}_5p_flank", var_num),
            PathKind::Branch1 => write!(f, "branch_{}_1", var_num),
            PathKind::Branch2 => write!(f, "branch_{}_2", var_num),
            PathKind::Flank3p => write!(f, "var_{}_3p_flank", var_num),
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PathKind::Flank5p => "5p flank",
            PathKind::Branch1 => "branch 1",
            PathKind::Branch2 => "branch 2",
            PathKind::Flank3p => "3p flank",
        };
        f.write_str(name)
    }
}

/// A k-mer or orientation token of at most [`MAX_TOKEN_LENGTH`] bytes.
///
/// The allocation is kept across [`KmerToken::set`] calls so a token can be reused
/// from one record to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KmerToken(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTooLong(pub usize);

impl fmt::Display for TokenTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token of {} characters exceeds the limit of {}",
            self.0, MAX_TOKEN_LENGTH
        )
    }
}

impl KmerToken {
    pub fn new(value: &str) -> Result<Self, TokenTooLong> {
        let mut token = KmerToken::default();
        token.set(value)?;
        Ok(token)
    }

    pub fn set(&mut self, value: &str) -> Result<(), TokenTooLong> {
        if value.len() > MAX_TOKEN_LENGTH {
            return Err(TokenTooLong(value.len()));
        }
        self.0.clear();
        self.0.push_str(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Deref for KmerToken {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KmerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

pub(crate) fn starts_with_digit(line: &str) -> bool {
    line.bytes().next().map_or(false, |b| b.is_ascii_digit())
}

pub(crate) fn is_base(b: u8) -> bool {
    matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T')
}
