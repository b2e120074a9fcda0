use std::fmt;

use itertools::Itertools;

use crate::parser;

const INITIAL_CAPACITY: usize = 200;

/// Per-position coverage of one colour along one sequence.
///
/// The buffer only ever grows: clearing it keeps the allocation so that the next record
/// can be loaded without reallocating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    values: Vec<u64>,
}

impl Default for Coverage {
    fn default() -> Self {
        Self::new()
    }
}

impl Coverage {
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Grows the buffer to hold at least `required` values. Existing values are kept.
    pub fn reserve(&mut self, required: usize) {
        if self.values.capacity() < required {
            self.values.reserve_exact(required - self.values.len());
        }
    }

    pub fn push(&mut self, value: u64) {
        self.values.push(value);
    }

    /// Replaces the contents with the numbers on `line`, keeping the first `expected`.
    ///
    /// Returns how many numbers the line held and whatever text followed them.
    pub(crate) fn load<'a>(&mut self, line: &'a str, expected: usize) -> (usize, &'a str) {
        self.values.clear();
        self.reserve(expected);
        match parser::coverage_values(line, expected, &mut self.values) {
            Ok((rest, found)) => (found, rest),
            Err(_) => (0, line),
        }
    }
}

impl From<Vec<u64>> for Coverage {
    fn from(values: Vec<u64>) -> Self {
        Self { values }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.iter().format(" "))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_growth_keeps_values() {
        let mut coverage = Coverage::new();
        for value in 0..INITIAL_CAPACITY as u64 {
            coverage.push(value);
        }
        coverage.reserve(INITIAL_CAPACITY * 3);
        assert!(coverage.capacity() >= INITIAL_CAPACITY * 3);
        assert_eq!(coverage.len(), INITIAL_CAPACITY);
        assert!(coverage
            .values()
            .iter()
            .enumerate()
            .all(|(i, &value)| value == i as u64));
    }

    #[test]
    fn test_capacity_never_shrinks() {
        let mut coverage = Coverage::new();
        let wide = (0..500).map(|i| i.to_string()).join(" ");
        coverage.load(&wide, 500);
        let capacity = coverage.capacity();
        assert!(capacity >= 500);
        let (found, _) = coverage.load("1 2 3", 3);
        assert_eq!(found, 3);
        assert_eq!(coverage.values(), &[1, 2, 3]);
        assert_eq!(coverage.capacity(), capacity);
    }

    #[test]
    fn test_load_keeps_first_values() {
        let mut coverage = Coverage::new();
        let (found, rest) = coverage.load("5 6 7 8", 2);
        assert_eq!(found, 4);
        assert!(rest.is_empty());
        assert_eq!(coverage.values(), &[5, 6]);

        let (found, rest) = coverage.load("5 6 oops", 4);
        assert_eq!(found, 2);
        assert_eq!(rest.trim(), "oops");
        assert_eq!(coverage.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Coverage::from(vec![3, 0, 12]).to_string(), "3 0 12");
        assert_eq!(Coverage::new().to_string(), "");
    }
}
