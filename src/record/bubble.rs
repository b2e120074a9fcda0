use std::io::{self, Write};

use getset::{CopyGetters, Getters};

use crate::error::Result;
use crate::parser::PathHeader;
use crate::reader::CortexFile;
use crate::record::{Coverage, Record};
use crate::types::{Call, KmerToken, Metadata, PathKind, TokenTooLong};
use crate::writer;

/// One of the four sequence segments of a bubble together with its header fields.
#[derive(Debug, Clone, Default, PartialEq, Getters, CopyGetters)]
pub struct BubblePath {
    #[getset(get = "pub")]
    pub(crate) seq: String,
    /// Length given in the path header.
    #[getset(get_copy = "pub")]
    pub(crate) seq_length: u64,
    #[getset(get_copy = "pub")]
    pub(crate) mean_covg: f32,
    #[getset(get_copy = "pub")]
    pub(crate) min_covg: u64,
    #[getset(get_copy = "pub")]
    pub(crate) max_covg: u64,
    #[getset(get_copy = "pub")]
    pub(crate) fst_covg: u64,
    #[getset(get = "pub")]
    pub(crate) fst_kmer: KmerToken,
    #[getset(get = "pub")]
    pub(crate) fst_r: KmerToken,
    #[getset(get = "pub")]
    pub(crate) fst_f: KmerToken,
    #[getset(get_copy = "pub")]
    pub(crate) lst_covg: u64,
    #[getset(get = "pub")]
    pub(crate) lst_kmer: KmerToken,
    #[getset(get = "pub")]
    pub(crate) lst_r: KmerToken,
    #[getset(get = "pub")]
    pub(crate) lst_f: KmerToken,
}

impl BubblePath {
    pub(crate) fn set_header(&mut self, header: &PathHeader<'_>) -> std::result::Result<(), TokenTooLong> {
        self.seq_length = header.length;
        self.mean_covg = header.mean_covg;
        self.min_covg = header.min_covg;
        self.max_covg = header.max_covg;
        self.fst_covg = header.fst_covg;
        self.fst_kmer.set(header.fst_kmer)?;
        self.fst_r.set(header.fst_r)?;
        self.fst_f.set(header.fst_f)?;
        self.lst_covg = header.lst_covg;
        self.lst_kmer.set(header.lst_kmer)?;
        self.lst_r.set(header.lst_r)?;
        self.lst_f.set(header.lst_f)?;
        Ok(())
    }

    pub(crate) fn set_seq(&mut self, seq: &str) {
        self.seq.clear();
        self.seq.push_str(seq);
    }

    pub fn clear(&mut self) {
        self.seq.clear();
        self.seq_length = 0;
        self.mean_covg = 0.0;
        self.min_covg = 0;
        self.max_covg = 0;
        self.fst_covg = 0;
        self.fst_kmer.clear();
        self.fst_r.clear();
        self.fst_f.clear();
        self.lst_covg = 0;
        self.lst_kmer.clear();
        self.lst_r.clear();
        self.lst_f.clear();
    }
}

/// A candidate variant site: two alternative branches between a 5' and a 3' flank.
///
/// All per-colour vectors are sized when the bubble is created and reused by every
/// subsequent read.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Bubble {
    #[getset(get_copy = "pub")]
    pub(crate) var_num: u64,
    #[getset(get = "pub")]
    pub(crate) flank_5p: BubblePath,
    #[getset(get = "pub")]
    pub(crate) branches: [BubblePath; 2],
    #[getset(get = "pub")]
    pub(crate) flank_3p: BubblePath,
    #[getset(get = "pub")]
    pub(crate) calls: Vec<Call>,
    #[getset(get = "pub")]
    pub(crate) llk_hom_br1: Vec<f32>,
    /// Only filled in for diploid files.
    #[getset(get = "pub")]
    pub(crate) llk_het: Vec<f32>,
    #[getset(get = "pub")]
    pub(crate) llk_hom_br2: Vec<f32>,
    // branch_coverages[branch][colour]
    pub(crate) branch_coverages: [Vec<Coverage>; 2],
    /// Annotation line read before the record, if the file has them.
    #[getset(get = "pub")]
    pub(crate) fails_classifier: String,
    #[getset(get = "pub")]
    pub(crate) discovery_phase: String,
}

impl Bubble {
    pub fn new(colours: usize) -> Self {
        let mut bubble = Self {
            var_num: 0,
            flank_5p: BubblePath::default(),
            branches: [BubblePath::default(), BubblePath::default()],
            flank_3p: BubblePath::default(),
            calls: Vec::new(),
            llk_hom_br1: Vec::new(),
            llk_het: Vec::new(),
            llk_hom_br2: Vec::new(),
            branch_coverages: [Vec::new(), Vec::new()],
            fails_classifier: String::new(),
            discovery_phase: String::new(),
        };
        bubble.set_colours(colours);
        bubble
    }

    pub fn colours(&self) -> usize {
        self.calls.len()
    }

    /// Resizes the per-colour vectors. Does nothing if the colour count already matches.
    pub(crate) fn set_colours(&mut self, colours: usize) {
        if self.colours() == colours && self.branch_coverages[0].len() == colours {
            return;
        }
        self.calls.resize(colours, Call::Unknown);
        self.llk_hom_br1.resize(colours, 0.0);
        self.llk_het.resize(colours, 0.0);
        self.llk_hom_br2.resize(colours, 0.0);
        for coverages in self.branch_coverages.iter_mut() {
            coverages.resize_with(colours, Coverage::new);
        }
    }

    pub fn path(&self, kind: PathKind) -> &BubblePath {
        match kind {
            PathKind::Flank5p => &self.flank_5p,
            PathKind::Branch1 => &self.branches[0],
            PathKind::Branch2 => &self.branches[1],
            PathKind::Flank3p => &self.flank_3p,
        }
    }

    pub(crate) fn path_mut(&mut self, kind: PathKind) -> &mut BubblePath {
        match kind {
            PathKind::Flank5p => &mut self.flank_5p,
            PathKind::Branch1 => &mut self.branches[0],
            PathKind::Branch2 => &mut self.branches[1],
            PathKind::Flank3p => &mut self.flank_3p,
        }
    }

    /// Coverage of `branch` (0 or 1) in `colour`.
    ///
    /// # Panics
    ///
    /// If `branch > 1` or `colour` is not below [`Bubble::colours`].
    pub fn branch_coverage(&self, branch: usize, colour: usize) -> &Coverage {
        &self.branch_coverages[branch][colour]
    }

    pub fn branch_coverages(&self, branch: usize) -> &[Coverage] {
        &self.branch_coverages[branch]
    }

    /// Empties every field while keeping the allocations for the next read.
    pub fn clear(&mut self) {
        self.var_num = 0;
        self.flank_5p.clear();
        self.branches[0].clear();
        self.branches[1].clear();
        self.flank_3p.clear();
        self.calls.iter_mut().for_each(|call| *call = Call::Unknown);
        self.llk_hom_br1.iter_mut().for_each(|llk| *llk = 0.0);
        self.llk_het.iter_mut().for_each(|llk| *llk = 0.0);
        self.llk_hom_br2.iter_mut().for_each(|llk| *llk = 0.0);
        for coverages in self.branch_coverages.iter_mut() {
            coverages.iter_mut().for_each(Coverage::clear);
        }
        self.fails_classifier.clear();
        self.discovery_phase.clear();
    }
}

impl Record for Bubble {
    fn with_colours(colours: usize) -> Self {
        Bubble::new(colours)
    }

    fn read_from(&mut self, file: &mut CortexFile) -> Result<bool> {
        file.read_bubble(self)
    }

    fn write_to<W: Write>(&self, out: &mut W, metadata: &Metadata) -> io::Result<()> {
        writer::write_bubble(out, self, metadata)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_sizes_colours() {
        let bubble = Bubble::new(3);
        assert_eq!(bubble.colours(), 3);
        assert_eq!(bubble.branch_coverages(0).len(), 3);
        assert_eq!(bubble.branch_coverages(1).len(), 3);
        assert!(bubble.calls().iter().all(|&call| call == Call::Unknown));
    }

    #[test]
    fn test_clear_keeps_allocations() {
        let mut bubble = Bubble::new(1);
        bubble.branch_coverages[1][0] = Coverage::from(vec![1; 1000]);
        bubble.flank_5p.set_seq("ACGT");
        bubble.calls[0] = Call::HomBranch2;
        bubble.clear();
        assert!(bubble.branch_coverage(1, 0).is_empty());
        assert!(bubble.branch_coverage(1, 0).capacity() >= 1000);
        assert!(bubble.flank_5p().seq().is_empty());
        assert_eq!(bubble.calls()[0], Call::Unknown);
    }

    #[test]
    fn test_paths_by_kind() {
        let mut bubble = Bubble::new(0);
        bubble.path_mut(PathKind::Branch2).set_seq("GATTACA");
        assert_eq!(bubble.branches()[1].seq(), "GATTACA");
        assert_eq!(bubble.path(PathKind::Branch2).seq(), "GATTACA");
    }
}
