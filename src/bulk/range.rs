use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::error::ValidationError;

/// Default ceiling on the number of issues one range may expand to
pub const DEFAULT_MAX_TARGETS: usize = 10_000;

/// A positive issue number within a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    /// Wrap a raw number; zero is not a valid issue number
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ascending, deduplicated issue numbers
///
/// Built by [`parse_range_spec`] or collected from an iterator; either way
/// the ordering invariant holds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct IssueSet(Vec<IssueNumber>);

impl IssueSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IssueNumber> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[IssueNumber] {
        &self.0
    }

    /// Render back to compact range syntax, e.g. `17-19,25`
    ///
    /// The output parses back to the same set.
    #[must_use]
    pub fn to_range_spec(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut iter = self.0.iter().map(|n| n.get()).peekable();
        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&(end + 1)) {
                end += 1;
                iter.next();
            }
            if start == end {
                parts.push(start.to_string());
            } else {
                parts.push(format!("{start}-{end}"));
            }
        }
        parts.join(",")
    }
}

impl FromIterator<IssueNumber> for IssueSet {
    fn from_iter<I: IntoIterator<Item = IssueNumber>>(iter: I) -> Self {
        let unique: BTreeSet<IssueNumber> = iter.into_iter().collect();
        Self(unique.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IssueSet {
    type Item = IssueNumber;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, IssueNumber>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl fmt::Display for IssueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_range_spec())
    }
}

/// Parse a range specification such as `17-23,25,30-32`
///
/// Tokens are separated by commas; each is `N` or an inclusive `N-M`.
/// Whitespace around tokens and around the dash is ignored. The result is
/// sorted and deduplicated, so overlapping ranges are fine.
///
/// A single range wider than `max` is rejected before it is expanded, and the
/// running set is checked after every token, so pathological input such as
/// `1-999999999` never allocates more than `max` entries.
///
/// # Errors
/// Returns `ValidationError` for empty input or tokens, non-numeric or
/// non-positive values, inverted ranges, and sets larger than `max`.
pub fn parse_range_spec(raw: &str, max: usize) -> Result<IssueSet, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyRange);
    }

    let mut numbers = BTreeSet::new();
    for token in raw.split(',') {
        let token = token.trim();
        let (lower, upper) = match token.split_once('-') {
            Some((lower, upper)) => (parse_bound(lower, token)?, parse_bound(upper, token)?),
            None => {
                let value = parse_bound(token, token)?;
                (value, value)
            }
        };
        if lower > upper {
            return Err(ValidationError::InvertedRange { lower, upper });
        }
        let width = upper - lower;
        if width >= max as u64 {
            return Err(ValidationError::TooManyTargets { max });
        }
        numbers.extend(lower..=upper);
        if numbers.len() > max {
            return Err(ValidationError::TooManyTargets { max });
        }
    }

    Ok(numbers.into_iter().filter_map(IssueNumber::new).collect())
}

fn parse_bound(part: &str, token: &str) -> Result<u64, ValidationError> {
    let part = part.trim();
    if part.is_empty() {
        return Err(ValidationError::InvalidToken(token.to_string()));
    }
    // Signed parse: zero and negatives are NonPositive, not InvalidToken.
    match part.parse::<i128>() {
        Ok(value) if value <= 0 => Err(ValidationError::NonPositive(part.to_string())),
        Ok(value) => {
            u64::try_from(value).map_err(|_| ValidationError::InvalidToken(token.to_string()))
        }
        Err(_) => Err(ValidationError::InvalidToken(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(set: &IssueSet) -> Vec<u64> {
        set.iter().map(IssueNumber::get).collect()
    }

    fn parse(raw: &str) -> Result<IssueSet, ValidationError> {
        parse_range_spec(raw, DEFAULT_MAX_TARGETS)
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        assert_eq!(numbers(&parse("3,1-2,2").unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn test_overlapping_ranges() {
        assert_eq!(
            numbers(&parse("1-5,3-7").unwrap()),
            vec![1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_single_token() {
        assert_eq!(numbers(&parse("42").unwrap()), vec![42]);
        assert_eq!(numbers(&parse("7-7").unwrap()), vec![7]);
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(
            numbers(&parse(" 17 - 19 , 25 ").unwrap()),
            vec![17, 18, 19, 25]
        );
    }

    #[test]
    fn test_inverted_range() {
        assert_eq!(
            parse("5-3").unwrap_err(),
            ValidationError::InvertedRange { lower: 5, upper: 3 }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("").unwrap_err(), ValidationError::EmptyRange);
        assert_eq!(parse("   ").unwrap_err(), ValidationError::EmptyRange);
    }

    #[test]
    fn test_empty_tokens_rejected() {
        assert!(matches!(parse("1,,2"), Err(ValidationError::InvalidToken(_))));
        assert!(matches!(parse("1,2,"), Err(ValidationError::InvalidToken(_))));
        assert!(matches!(parse("3-"), Err(ValidationError::InvalidToken(_))));
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(
            parse("1,abc").unwrap_err(),
            ValidationError::InvalidToken("abc".into())
        );
        assert!(matches!(parse("1-2-3"), Err(ValidationError::InvalidToken(_))));
        assert!(matches!(parse("#12"), Err(ValidationError::InvalidToken(_))));
    }

    #[test]
    fn test_non_positive() {
        assert_eq!(parse("0").unwrap_err(), ValidationError::NonPositive("0".into()));
        assert_eq!(
            parse("0-4").unwrap_err(),
            ValidationError::NonPositive("0".into())
        );
        // A leading dash leaves an empty lower bound
        assert!(matches!(parse("-3"), Err(ValidationError::InvalidToken(_))));
    }

    #[test]
    fn test_ceiling() {
        assert_eq!(
            parse_range_spec("1-20000", 10_000).unwrap_err(),
            ValidationError::TooManyTargets { max: 10_000 }
        );
        assert_eq!(parse_range_spec("1-10000", 10_000).unwrap().len(), 10_000);
        assert!(parse_range_spec("1-999999999999", 10_000).is_err());
    }

    #[test]
    fn test_ceiling_counts_unique_numbers() {
        assert_eq!(parse_range_spec("1-3,2-4", 4).unwrap().len(), 4);
        assert_eq!(
            parse_range_spec("1-3,5-6", 4).unwrap_err(),
            ValidationError::TooManyTargets { max: 4 }
        );
    }

    #[test]
    fn test_overflowing_number() {
        assert!(matches!(
            parse("99999999999999999999999"),
            Err(ValidationError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_to_range_spec_compacts_runs() {
        let set = parse("25,17-19").unwrap();
        assert_eq!(set.to_range_spec(), "17-19,25");
        assert_eq!(parse("4,6").unwrap().to_string(), "4,6");
        assert_eq!(IssueSet::default().to_range_spec(), "");
    }

    #[test]
    fn test_range_spec_round_trips() {
        let set = parse("1,3-5,9,10").unwrap();
        assert_eq!(parse(&set.to_range_spec()).unwrap(), set);
    }

    #[test]
    fn test_collect_sorts_and_dedups() {
        let set: IssueSet = [9, 2, 9, 4]
            .into_iter()
            .filter_map(IssueNumber::new)
            .collect();
        assert_eq!(numbers(&set), vec![2, 4, 9]);
    }

    #[test]
    fn test_issue_number_display() {
        assert_eq!(IssueNumber::new(17).unwrap().to_string(), "#17");
        assert!(IssueNumber::new(0).is_none());
    }
}
