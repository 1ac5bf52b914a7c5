use regex::Regex;

use crate::Result;

/// Compiled regular expression used to pick tuple fields apart.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Occurrence `match_index` (0 is the first) of the pattern in `input`.
    ///
    /// Element 0 is the whole match, the capture groups follow from left to right. A group
    /// that took no part in the match is an empty string. Every element borrows from `input`.
    /// `None` when the pattern occurs fewer than `match_index + 1` times.
    pub fn extract<'i>(&self, input: &'i str, match_index: usize) -> Option<Vec<&'i str>> {
        let captures = self.regex.captures_iter(input).nth(match_index)?;
        Some(
            captures
                .iter()
                .map(|group| group.map_or("", |m| m.as_str()))
                .collect(),
        )
    }
}

/// One-shot [`Pattern::extract`]. Fails only when `pattern` doesn't compile.
pub fn extract<'i>(
    input: &'i str,
    pattern: &str,
    match_index: usize,
) -> Result<Option<Vec<&'i str>>> {
    Ok(Pattern::new(pattern)?.extract(input, match_index))
}

#[cfg(test)]
mod test {
    use super::{extract, Pattern};
    use crate::Error;

    const DOTTED_QUAD: &str = r"(\d+)\.(\d+)\.(\d+)\.(\d+)";

    #[test]
    fn full_match_and_groups() {
        let parts = extract("192.293.44.1", DOTTED_QUAD, 0).unwrap();
        assert_eq!(parts, Some(vec!["192.293.44.1", "192", "293", "44", "1"]));
    }

    #[test]
    fn without_groups_only_full_match() {
        let parts = extract("192.293.44.1", r"\d+\.\d+\.\d+\.\d+", 0).unwrap();
        assert_eq!(parts, Some(vec!["192.293.44.1"]));
    }

    #[test]
    fn no_match() {
        assert_eq!(extract("123.2e3.44.1", r"\d+\.\d+\.\d+\.\d+", 0).unwrap(), None);
    }

    #[test]
    fn substrings_point_into_input() {
        let input = String::from("src=10.0.0.1 dst=10.0.0.2");
        let parts = extract(&input, DOTTED_QUAD, 1).unwrap().unwrap();
        assert_eq!(parts[0], "10.0.0.2");
        assert!(input.as_bytes().as_ptr_range().contains(&parts[0].as_ptr()));
    }

    #[test]
    fn occurrence_index() {
        let pattern = Pattern::new(r"(\w+)=(\w+)").unwrap();
        let input = "proto=HTTPS app=Facebook";
        assert_eq!(pattern.extract(input, 0), Some(vec!["proto=HTTPS", "proto", "HTTPS"]));
        assert_eq!(pattern.extract(input, 1), Some(vec!["app=Facebook", "app", "Facebook"]));
        assert_eq!(pattern.extract(input, 2), None);
    }

    #[test]
    fn empty_match_is_not_no_match() {
        assert_eq!(extract("abc", r"x*", 0).unwrap(), Some(vec![""]));
    }

    #[test]
    fn unmatched_group_is_empty() {
        let parts = extract("port 80", r"port (\d+)(/tcp)?", 0).unwrap();
        assert_eq!(parts, Some(vec!["port 80", "80", ""]));
    }

    #[test]
    fn invalid_pattern() {
        assert!(matches!(extract("anything", r"(\d+", 0), Err(Error::Pattern(_))));
    }
}
