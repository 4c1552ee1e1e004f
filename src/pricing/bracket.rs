//! Age-bracket label parsing and matching
//!
//! Labels are free text such as `"0-18"`, `"19 - 23"`, `"59-+"` or `"59+"`.
//! A `+` anywhere in the upper token (or a trailing `+` with no hyphen) makes
//! the range open-ended. Labels that cannot be parsed never match any age.

/// Inclusive age range parsed from a bracket label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketRange {
    pub lower: u32,
    /// None = open-ended
    pub upper: Option<u32>,
}

/// Outcome of testing an age against a bracket label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketMatch {
    Matched,
    NotMatched,
    /// Label could not be parsed; the bracket is skipped
    Malformed,
}

impl BracketRange {
    /// Parse a label; None when the label is malformed
    pub fn parse(label: &str) -> Option<Self> {
        let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();

        let mut parts = compact.split('-');
        let lower_token = parts.next()?;
        let upper_token = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match upper_token {
            Some(upper_token) => {
                let lower = lower_token.parse::<u32>().ok()?;
                let upper = if upper_token.contains('+') {
                    None
                } else {
                    Some(upper_token.parse::<u32>().ok()?)
                };
                Some(Self { lower, upper })
            }
            // "59+" form
            None => {
                let lower = lower_token.strip_suffix('+')?.parse::<u32>().ok()?;
                Some(Self { lower, upper: None })
            }
        }
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.lower && self.upper.map_or(true, |upper| age <= upper)
    }
}

/// Tri-state match used internally so malformed labels can be told apart
pub fn classify(age: u32, label: &str) -> BracketMatch {
    match BracketRange::parse(label) {
        Some(range) if range.contains(age) => BracketMatch::Matched,
        Some(_) => BracketMatch::NotMatched,
        None => BracketMatch::Malformed,
    }
}

/// Whether `age` falls inside the bracket described by `label`.
/// Malformed labels yield `false`.
pub fn matches(age: u32, label: &str) -> bool {
    classify(age, label) == BracketMatch::Matched
}
