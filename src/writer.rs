//! Text output in the layouts the readers consume.
//!
//! Floats are written with two decimals; everything else is written as it was read, so a
//! record read from a file and written again reproduces its lines.

use std::io::{self, Write};

use log::warn;

use crate::record::{Alignment, Bubble, BubblePath};
use crate::types::{
    Call, Metadata, PathKind, DISCOVERY_PHASE_LINE, FAILS_CLASSIFIER_LINE,
    LIKELIHOOD_HEADER_DIPLOID, LIKELIHOOD_HEADER_HAPLOID,
};

pub fn write_bubble<W: Write>(out: &mut W, bubble: &Bubble, metadata: &Metadata) -> io::Result<()> {
    if metadata.fails_classifier_line() {
        writeln!(out, "{}", or_default(bubble.fails_classifier(), FAILS_CLASSIFIER_LINE))?;
    }
    if metadata.discovery_phase_line() {
        writeln!(out, "{}", or_default(bubble.discovery_phase(), DISCOVERY_PHASE_LINE))?;
    }

    if metadata.has_likelihoods() {
        write_likelihoods(out, bubble, metadata)?;
    }

    for &kind in PathKind::ORDER.iter() {
        write_bubble_path(out, bubble.var_num(), kind, bubble.path(kind))?;
    }
    write!(out, "\n\n")?;

    for branch in 0..2 {
        writeln!(out, "branch{} coverages", branch + 1)?;
        for (colour, coverage) in bubble.branch_coverages(branch).iter().enumerate() {
            writeln!(out, "Covg in Col {}:", colour)?;
            writeln!(out, "{}", coverage)?;
        }
    }
    write!(out, "\n\n")
}

fn or_default<'a>(line: &'a str, default: &'a str) -> &'a str {
    if line.is_empty() {
        default
    } else {
        line
    }
}

fn write_likelihoods<W: Write>(out: &mut W, bubble: &Bubble, metadata: &Metadata) -> io::Result<()> {
    let diploid = metadata.is_diploid();
    if diploid {
        writeln!(out, "{}", LIKELIHOOD_HEADER_DIPLOID)?;
    } else {
        writeln!(out, "{}", LIKELIHOOD_HEADER_HAPLOID)?;
    }

    for (colour, &call) in bubble.calls().iter().enumerate() {
        if call == Call::Unknown {
            warn!("var {} has no genotype call for colour {}", bubble.var_num(), colour);
        }
        let hom_br1 = bubble.llk_hom_br1()[colour];
        let hom_br2 = bubble.llk_hom_br2()[colour];
        if diploid {
            let het = bubble.llk_het()[colour];
            writeln!(
                out,
                "{}\t{}\t{:.2}\t{:.2}\t{:.2}",
                colour, call, hom_br1, het, hom_br2
            )?;
        } else {
            writeln!(out, "{}\t{}\t{:.2}\t{:.2}", colour, call, hom_br1, hom_br2)?;
        }
    }
    Ok(())
}

fn write_bubble_path<W: Write>(
    out: &mut W,
    var_num: u64,
    kind: PathKind,
    path: &BubblePath,
) -> io::Result<()> {
    writeln!(
        out,
        ">{} length:{} average_coverage: {:.2} min_coverage:{} max_coverage:{} \
         fst_coverage:{} fst_kmer:{} fst_r:{} fst_f:{} \
         lst_coverage:{} lst_kmer:{} lst_r:{} lst_f:{}",
        kind.name(var_num),
        path.seq_length(),
        path.mean_covg(),
        path.min_covg(),
        path.max_covg(),
        path.fst_covg(),
        path.fst_kmer(),
        path.fst_r(),
        path.fst_f(),
        path.lst_covg(),
        path.lst_kmer(),
        path.lst_r(),
        path.lst_f(),
    )?;
    writeln!(out, "{}", path.seq())
}

pub fn write_alignment<W: Write>(
    out: &mut W,
    alignment: &Alignment,
    metadata: &Metadata,
) -> io::Result<()> {
    debug_assert_eq!(alignment.colours(), metadata.colours());
    writeln!(out, ">{}", alignment.name())?;
    writeln!(out, "{}", alignment.seq())?;
    for (colour, coverage) in alignment.coverages().iter().enumerate() {
        writeln!(out, ">{}_colour_{}_kmer_coverages", alignment.name(), colour)?;
        writeln!(out, "{}", coverage)?;
    }
    Ok(())
}
