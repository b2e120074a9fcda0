//! Classification of an input from its first few lines.
//!
//! Neither layout carries a header or magic number, so the file type, colour count and
//! k-mer size are all inferred from the first record. The source is rewound afterwards
//! so that reading starts again from line 1.

use log::debug;

use crate::error::{Error, Result};
use crate::line_source::LineSource;
use crate::parser;
use crate::types::{
    is_base, starts_with_digit, starts_with_ignore_case, FileType, Metadata,
    ALIGNMENT_COVERAGE_SUFFIX, BRANCH_LABEL_PREFIX, COVERAGE_LABEL_PREFIX, DIPLOID_MARKER,
    DISCOVERY_PHASE_PREFIX, FAILS_CLASSIFIER_PREFIX, LIKELIHOOD_HEADER_PREFIX,
};

pub(crate) fn sniff(source: &mut LineSource) -> Result<Metadata> {
    let mut metadata = Metadata::default();

    if !source.skip_blank_lines()? {
        return Err(empty_file(source));
    }

    if starts_with_ignore_case(source.line(), FAILS_CLASSIFIER_PREFIX) {
        metadata.fails_classifier_line = true;
        if !source.read_line()? {
            return Err(empty_file(source));
        }
    }

    if starts_with_ignore_case(source.line(), DISCOVERY_PHASE_PREFIX) {
        metadata.discovery_phase_line = true;
        if !source.read_line()? {
            return Err(empty_file(source));
        }
    }

    if starts_with_ignore_case(source.line(), LIKELIHOOD_HEADER_PREFIX) {
        sniff_likelihoods(source, &mut metadata)?;
    } else if source.line().starts_with('>') {
        sniff_records(source, &mut metadata)?;
    } else {
        return Err(Error::UnrecognisedLine(source.location()));
    }

    debug!(
        "{}: {} file with {} colours, k={}{}",
        source.name(),
        metadata.file_type,
        metadata.colours,
        metadata.kmer_size,
        if metadata.has_likelihoods {
            ", with likelihoods"
        } else {
            ""
        }
    );

    source.rewind()?;
    Ok(metadata)
}

fn empty_file(source: &LineSource) -> Error {
    Error::EmptyFile {
        path: source.name().to_owned(),
    }
}

// The likelihood block has one line per colour, each starting with the colour index,
// and ends where the first path header begins.
fn sniff_likelihoods(source: &mut LineSource, metadata: &mut Metadata) -> Result<()> {
    metadata.file_type = FileType::Bubble;
    metadata.has_likelihoods = true;
    metadata.is_diploid = source.line().contains(DIPLOID_MARKER);

    loop {
        if !source.read_line()? {
            return Err(Error::UnknownFormat(source.location()));
        }
        let line = source.line();
        if line.starts_with('>') {
            break;
        }
        if starts_with_digit(line) {
            metadata.colours += 1;
        }
    }

    metadata.kmer_size = first_kmer_size(source, source.line())?;
    Ok(())
}

fn sniff_records(source: &mut LineSource, metadata: &mut Metadata) -> Result<()> {
    source.read_line()?;
    let second_len = source.line().len();
    source.read_line()?;
    let third = source.line().to_owned();
    source.read_line()?;
    let fourth = source.line().to_owned();

    if third.ends_with(ALIGNMENT_COVERAGE_SUFFIX) && starts_with_digit(&fourth) {
        metadata.file_type = FileType::Alignment;
        metadata.colours = 1;
        while source.read_line()? && source.read_line()? && starts_with_digit(source.line()) {
            metadata.colours += 1;
        }

        // One coverage value per k-mer of the sequence.
        let kmers = fourth
            .split_whitespace()
            .take_while(|value| starts_with_digit(value))
            .count();
        metadata.kmer_size = (second_len + 1).saturating_sub(kmers) as u32;
        return Ok(());
    }

    let starts_with_base = fourth.bytes().next().map_or(false, is_base);
    if parser::branch1_probe(&third).is_ok() && starts_with_base {
        metadata.file_type = FileType::Bubble;
        metadata.kmer_size = first_kmer_size(source, &third)?;
        count_branch_colours(source, metadata)?;
        return Ok(());
    }

    Err(Error::UnknownFormat(source.location()))
}

// The source is positioned on the branch 1 sequence. The rest of the paths come first,
// then blank lines and a "branch1 coverages" label, and then one "Covg in Col N:" label
// and one line of numbers per colour.
fn count_branch_colours(source: &mut LineSource, metadata: &mut Metadata) -> Result<()> {
    for _ in 0..4 {
        if !source.read_line()? {
            break;
        }
    }

    let mut more = source.read_line()?;
    while more && source.is_blank() {
        more = source.read_line()?;
    }
    if more && starts_with_ignore_case(source.line(), BRANCH_LABEL_PREFIX) {
        more = source.read_line()?;
    }

    while more && starts_with_ignore_case(source.line(), COVERAGE_LABEL_PREFIX) {
        if !source.read_line()? || !starts_with_digit(source.line()) {
            break;
        }
        metadata.colours += 1;
        more = source.read_line()?;
    }
    Ok(())
}

fn first_kmer_size(source: &LineSource, line: &str) -> Result<u32> {
    parser::first_kmer(line)
        .map(|(_, kmer)| kmer.len() as u32)
        .map_err(|_| Error::UnknownFormat(source.location()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn sniff_text(text: &str) -> Result<Metadata> {
        let mut source = LineSource::from_bytes("test", text.as_bytes().to_vec())?;
        sniff(&mut source)
    }

    #[test]
    fn test_alignment() {
        let text = ">seq\nACGTACGT\n>seq_colour_0_kmer_coverages\n1 2 3 4\n\
            >seq_colour_1_kmer_coverages\n0 0 1 1\n>next\nACGT\n";
        let metadata = sniff_text(text).unwrap();
        assert_eq!(metadata.file_type(), FileType::Alignment);
        assert_eq!(metadata.colours(), 2);
        assert_eq!(metadata.kmer_size(), 5);
        assert!(!metadata.has_likelihoods());
    }

    #[test]
    fn test_rewinds_to_first_line() {
        let text = "\n\n>seq\nACG\n>seq_colour_0_kmer_coverages\n1 2 3\n";
        let mut source = LineSource::from_bytes("test", text.as_bytes().to_vec()).unwrap();
        sniff(&mut source).unwrap();
        assert_eq!(source.line_number(), 1);
        assert_eq!(source.line(), "");
    }

    #[test]
    fn test_likelihood_header() {
        let text = "FAILS CLASSIFIER: fits repeat model better than variation model\n\
            Colour/sample\tGT_call\tllk_hom_br1\tllk_hom_br2\n\
            0\tHOM1\t-1.00\t-2.00\n\
            \n\
            1\tHOM2\t-1.00\t-2.00\n\
            >var_1_5p_flank length:3 average_coverage: 1.00 min_coverage:1 max_coverage:1 \
            fst_coverage:1 fst_kmer:ACGTACG fst_r: fst_f: lst_coverage:1 lst_kmer:ACGTACG lst_r: lst_f:\n";
        let metadata = sniff_text(text).unwrap();
        assert_eq!(metadata.file_type(), FileType::Bubble);
        assert!(metadata.has_likelihoods());
        assert!(metadata.fails_classifier_line());
        assert!(!metadata.discovery_phase_line());
        assert!(!metadata.is_diploid());
        assert_eq!(metadata.colours(), 2);
        assert_eq!(metadata.kmer_size(), 7);
    }

    #[test]
    fn test_failures() {
        assert!(matches!(sniff_text("\n\n\n\n\n\n"), Err(Error::EmptyFile { .. })));
        assert!(matches!(sniff_text(""), Err(Error::EmptyFile { .. })));
        assert!(matches!(sniff_text(">x\n"), Err(Error::UnknownFormat(_))));
        assert!(matches!(sniff_text("ab\n"), Err(Error::UnrecognisedLine(_))));
        assert!(matches!(
            sniff_text("FAILS CLASSIFIER: nothing else\n"),
            Err(Error::EmptyFile { .. })
        ));
        assert!(matches!(
            sniff_text("\nhello world\n"),
            Err(Error::UnrecognisedLine(location)) if location.line == 2
        ));
        assert!(matches!(
            sniff_text(">seq\nACGT\n>other\nNNNN\n"),
            Err(Error::UnknownFormat(_))
        ));
        assert!(matches!(
            sniff_text("Colour/sample\tGT_call\n0\tHOM1\t-1.00\t-2.00\n"),
            Err(Error::UnknownFormat(_))
        ));
    }
}
