use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, tag_no_case, take_till, take_until};
use nom::character::complete::{char, one_of, space0, space1, u64};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::{fold_many0, many0};
use nom::number::complete::float;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{IResult, Parser};

use crate::types::{is_base, PathKind};

/// Fields of one bubble path header line, borrowed from the line.
///
/// ```text
/// >var_1_5p_flank length:50 average_coverage: 2.00 min_coverage:2 max_coverage:2 fst_coverage:2 fst_kmer:GACCATAGCAAGGACAC fst_r: fst_f:C lst_coverage:2 lst_kmer:ACGTTCAACGCCAAGGG lst_r:C lst_f:AT
/// ```
#[derive(Debug, PartialEq)]
pub(crate) struct PathHeader<'a> {
    pub kind: PathKind,
    pub var_num: u64,
    pub length: u64,
    pub mean_covg: f32,
    pub min_covg: u64,
    pub max_covg: u64,
    pub fst_covg: u64,
    pub fst_kmer: &'a str,
    pub fst_r: &'a str,
    pub fst_f: &'a str,
    pub lst_covg: u64,
    pub lst_kmer: &'a str,
    pub lst_r: &'a str,
    pub lst_f: &'a str,
}

fn label<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(space0, tag(name))
}

fn field<'a, O, F>(name: &'static str, value: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    preceded(pair(label(name), space0), value)
}

fn token(input: &str) -> IResult<&str, &str> {
    is_not(" \t")(input)
}

// Orientation tokens may be missing entirely, leaving the label followed by a space.
fn optional_bases(input: &str) -> IResult<&str, &str> {
    if input.bytes().next().map_or(false, is_base) {
        take_till(|c: char| c.is_whitespace())(input)
    } else {
        Ok((input, ""))
    }
}

// Skips whatever is left of the current token when it held no bases.
fn orientation<'a>(
    name: &'static str,
    next: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(preceded(label(name), optional_bases), take_until(next))
}

fn path_name(input: &str) -> IResult<&str, (PathKind, u64)> {
    alt((
        map(delimited(tag("var_"), u64, tag("_5p_flank")), |n| {
            (PathKind::Flank5p, n)
        }),
        map(delimited(tag("var_"), u64, tag("_3p_flank")), |n| {
            (PathKind::Flank3p, n)
        }),
        map(delimited(tag("branch_"), u64, tag("_1")), |n| {
            (PathKind::Branch1, n)
        }),
        map(delimited(tag("branch_"), u64, tag("_2")), |n| {
            (PathKind::Branch2, n)
        }),
    ))(input)
}

pub(crate) fn path_header(input: &str) -> IResult<&str, PathHeader<'_>> {
    let (input, (kind, var_num)) = preceded(char('>'), path_name)(input)?;
    let (input, (length, mean_covg, min_covg, max_covg, fst_covg, fst_kmer)) = tuple((
        field("length:", u64),
        field("average_coverage:", float),
        field("min_coverage:", u64),
        field("max_coverage:", u64),
        field("fst_coverage:", u64),
        field("fst_kmer:", token),
    ))(input)?;
    let (input, (fst_r, fst_f)) = pair(
        orientation("fst_r:", "fst_f:"),
        orientation("fst_f:", "lst_coverage:"),
    )(input)?;
    let (input, (lst_covg, lst_kmer)) =
        pair(field("lst_coverage:", u64), field("lst_kmer:", token))(input)?;
    let (input, (lst_r, lst_f)) = pair(
        orientation("lst_r:", "lst_f:"),
        terminated(
            preceded(label("lst_f:"), optional_bases),
            pair(take_till(|c: char| c.is_whitespace()), space0),
        ),
    )(input)?;
    Ok((
        input,
        PathHeader {
            kind,
            var_num,
            length,
            mean_covg,
            min_covg,
            max_covg,
            fst_covg,
            fst_kmer,
            fst_r,
            fst_f,
            lst_covg,
            lst_kmer,
            lst_r,
            lst_f,
        },
    ))
}

/// Recognises the start of a branch 1 header, which is enough to tell a bubble file
/// without likelihoods apart from other inputs.
pub(crate) fn branch1_probe(input: &str) -> IResult<&str, u64> {
    let (input, (var_num, _length, _mean, _min, _max)) = tuple((
        delimited(tag(">branch_"), u64, tag("_1")),
        field("length:", u64),
        field("average_coverage:", float),
        field("min_coverage:", u64),
        field("max_coverage:", u64),
    ))(input)?;
    Ok((input, var_num))
}

/// Finds the `fst_kmer:` token anywhere on a path header line.
pub(crate) fn first_kmer(input: &str) -> IResult<&str, &str> {
    preceded(
        pair(take_until("fst_kmer:"), tag("fst_kmer:")),
        take_till(|c: char| c.is_whitespace()),
    )(input)
}

// Signed infinities and NaN, which `float` only accepts without a sign.
fn non_finite(input: &str) -> IResult<&str, f32> {
    let (input, negative) = map(opt(one_of("+-")), |sign| sign == Some('-'))(input)?;
    let (input, value) = alt((
        map(
            alt((tag_no_case("infinity"), tag_no_case("inf"))),
            |_| f32::INFINITY,
        ),
        map(tag_no_case("nan"), |_| f32::NAN),
    ))(input)?;
    Ok((input, if negative { -value } else { value }))
}

/// A log-likelihood. The caller writes `-inf` for impossible genotypes.
pub(crate) fn likelihood(input: &str) -> IResult<&str, f32> {
    alt((non_finite, float))(input)
}

/// A likelihood line: colour index, call token and two or three log-likelihoods.
pub(crate) fn likelihood_line(input: &str) -> IResult<&str, (u64, &str, Vec<f32>)> {
    all_consuming(terminated(
        tuple((
            u64,
            preceded(space1, token),
            many0(preceded(space1, likelihood)),
        )),
        space0,
    ))(input)
}

/// Parses whitespace separated unsigned integers, keeping at most `expected` of them in
/// `values`. Returns the unparsed remainder and how many numbers were found in total.
pub(crate) fn coverage_values<'a>(
    input: &'a str,
    expected: usize,
    values: &mut Vec<u64>,
) -> IResult<&'a str, usize> {
    fold_many0(
        preceded(space0, u64),
        || 0usize,
        |found, value| {
            if found < expected {
                values.push(value);
            }
            found + 1
        },
    )(input)
}

#[cfg(test)]
mod test {
    use super::*;

    const FLANK: &str = ">var_1_5p_flank length:50 average_coverage: 2.00 min_coverage:2 \
        max_coverage:2 fst_coverage:2 fst_kmer:GACCATAGCAAGGACAC fst_r: fst_f:C \
        lst_coverage:2 lst_kmer:ACGTTCAACGCCAAGGG lst_r:C lst_f:AT ";

    #[test]
    fn test_path_header() {
        let (rest, header) = path_header(FLANK).unwrap();
        assert!(rest.is_empty());
        assert_eq!(header.kind, PathKind::Flank5p);
        assert_eq!(header.var_num, 1);
        assert_eq!(header.length, 50);
        assert!((header.mean_covg - 2.0).abs() < f32::EPSILON);
        assert_eq!(header.fst_kmer, "GACCATAGCAAGGACAC");
        assert_eq!(header.fst_r, "");
        assert_eq!(header.fst_f, "C");
        assert_eq!(header.lst_covg, 2);
        assert_eq!(header.lst_kmer, "ACGTTCAACGCCAAGGG");
        assert_eq!(header.lst_r, "C");
        assert_eq!(header.lst_f, "AT");
    }

    #[test]
    fn test_non_base_orientation_tokens() {
        let line = FLANK
            .replace("fst_r: ", "fst_r:N ")
            .replace("lst_f:AT ", "lst_f:-");
        let (_, header) = path_header(&line).unwrap();
        assert_eq!(header.fst_r, "");
        assert_eq!(header.fst_f, "C");
        assert_eq!(header.lst_kmer, "ACGTTCAACGCCAAGGG");
        assert_eq!(header.lst_r, "C");
        assert_eq!(header.lst_f, "");
    }

    #[test]
    fn test_path_names() {
        assert_eq!(path_name("branch_12_2").unwrap().1, (PathKind::Branch2, 12));
        assert_eq!(path_name("var_3_3p_flank").unwrap().1, (PathKind::Flank3p, 3));
        assert!(path_name("branch_3_3").is_err());
    }

    #[test]
    fn test_path_header_rejects_missing_fields() {
        assert!(path_header(">branch_1_1 length:10 average_coverage: 2.00").is_err());
        assert!(path_header("branch_1_1 length:10").is_err());
    }

    #[test]
    fn test_branch1_probe() {
        let line = ">branch_7_1 length:10 average_coverage: 1.50 min_coverage:1 max_coverage:3 \
            fst_coverage:1 fst_kmer:ACGTA fst_r: fst_f: lst_coverage:1 lst_kmer:CGTAC lst_r: lst_f:";
        assert_eq!(branch1_probe(line).unwrap().1, 7);
        assert_eq!(first_kmer(line).unwrap().1, "ACGTA");
        assert!(branch1_probe(FLANK).is_err());
    }

    #[test]
    fn test_likelihood_line() {
        let (_, (colour, call, llks)) = likelihood_line("1\tHET\t-12.50\t-3.25\t-20.00").unwrap();
        assert_eq!(colour, 1);
        assert_eq!(call, "HET");
        assert_eq!(llks, vec![-12.5, -3.25, -20.0]);
        assert!(likelihood_line("1\tHOM1\t-1.00\tabc").is_err());
    }

    #[test]
    fn test_non_finite_likelihoods() {
        let (_, (_, _, llks)) = likelihood_line("0\tHOM2\t-inf\t-10.47").unwrap();
        assert_eq!(llks[0], f32::NEG_INFINITY);
        assert_eq!(likelihood("+Infinity").unwrap().1, f32::INFINITY);
        assert!(likelihood("-nan").unwrap().1.is_nan());
        assert_eq!(likelihood("-2.5").unwrap().1, -2.5);
    }

    #[test]
    fn test_coverage_values() {
        let mut values = Vec::new();
        let (rest, found) = coverage_values("1 2  3 4 x", 3, &mut values).unwrap();
        assert_eq!(found, 4);
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(rest.trim(), "x");
    }
}
