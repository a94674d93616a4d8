use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("malformed version: {0:?}")]
    Malformed(String),
}

/// Pre-release classification of a version, derived from its qualifier token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Stable,
    Snapshot,
    Unstable,
}

/// An ordered, arbitrary-length numeric version such as `7.0.10` or
/// `1.2.0-SNAPSHOT`.
///
/// Components are unbounded non-negative integers; comparison is numeric and
/// component-wise, with the shorter vector zero-padded (`1.0` equals `1.0.0`,
/// `1.0.9` sorts before `1.0.10`). The qualifier never participates in the
/// ordering.
#[derive(Debug, Clone)]
pub struct PluginVersion {
    components: Vec<BigUint>,
    qualifier: Qualifier,
    qualifier_text: Option<String>,
}

impl PluginVersion {
    /// Parse a version string: dot-separated non-negative integer components,
    /// optionally followed by `-<qualifier>`.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let trimmed = text.trim();
        let (numeric, qualifier_text) = match trimmed.split_once('-') {
            Some((numeric, qualifier)) if !qualifier.is_empty() => {
                (numeric, Some(qualifier.to_string()))
            }
            Some(_) => return Err(VersionError::Malformed(text.to_string())),
            None => (trimmed, None),
        };
        if numeric.is_empty() {
            return Err(VersionError::Malformed(text.to_string()));
        }

        let mut components = Vec::new();
        for segment in numeric.split('.') {
            let component = BigUint::from_str(segment)
                .map_err(|_| VersionError::Malformed(text.to_string()))?;
            components.push(component);
        }

        let qualifier = match qualifier_text.as_deref() {
            None => Qualifier::Stable,
            Some(q) if q.eq_ignore_ascii_case("snapshot") => Qualifier::Snapshot,
            Some(_) => Qualifier::Unstable,
        };

        Ok(Self {
            components,
            qualifier,
            qualifier_text,
        })
    }

    pub fn components(&self) -> &[BigUint] {
        &self.components
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    pub fn is_snapshot(&self) -> bool {
        self.qualifier == Qualifier::Snapshot
    }

    pub fn is_unstable(&self) -> bool {
        self.qualifier == Qualifier::Unstable
    }
}

impl FromStr for PluginVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = BigUint::default();
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let lhs = self.components.get(i).unwrap_or(&zero);
            let rhs = other.components.get(i).unwrap_or(&zero);
            match lhs.cmp(rhs) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PluginVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PluginVersion {}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        if let Some(qualifier) = &self.qualifier_text {
            write!(f, "-{qualifier}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(text: &str) -> PluginVersion {
        PluginVersion::parse(text).unwrap()
    }

    #[rstest]
    #[case("1.0.0", "1.0.0", Ordering::Equal)]
    #[case("1.0.0", "1.1.1", Ordering::Less)]
    #[case("1.1.1", "1.0.10", Ordering::Greater)]
    #[case("1.0.9", "1.0.10", Ordering::Less)]
    #[case("1.0.0", "1.0.9", Ordering::Less)]
    fn ordering_is_numeric(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(v(a).cmp(&v(b)), expected);
    }

    #[rstest]
    fn missing_trailing_components_compare_as_zero() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("1.0.1") > v("1"));
    }

    #[rstest]
    fn large_components_do_not_overflow() {
        let version = v("78999.6546546.321321321");
        assert_eq!(version.components()[2], BigUint::from(321_321_321_u32));
        assert!(v("999999999999999999999999999") > v("321321321"));
    }

    #[rstest]
    #[case("1.0.0", Qualifier::Stable)]
    #[case("1.0.0-SNAPSHOT", Qualifier::Snapshot)]
    #[case("1.0.0-snapshot", Qualifier::Snapshot)]
    #[case("2.1.0-RC1", Qualifier::Unstable)]
    #[case("2.1.0-beta2", Qualifier::Unstable)]
    fn qualifier_classification(#[case] text: &str, #[case] expected: Qualifier) {
        assert_eq!(v(text).qualifier(), expected);
    }

    #[rstest]
    fn qualifier_does_not_affect_ordering() {
        assert_eq!(v("1.0.0-SNAPSHOT"), v("1.0.0"));
        assert!(v("1.0.0-RC1") < v("1.0.1"));
    }

    #[rstest]
    #[case("")]
    #[case("a.b.c")]
    #[case("1.0.x")]
    #[case("1..0")]
    #[case("-SNAPSHOT")]
    #[case("1.0.0-")]
    fn malformed_versions_are_rejected(#[case] text: &str) {
        assert!(matches!(
            PluginVersion::parse(text),
            Err(VersionError::Malformed(_))
        ));
    }

    #[rstest]
    fn display_round_trips_the_textual_form() {
        assert_eq!(v("7.0.10").to_string(), "7.0.10");
        assert_eq!(v("1.2.0-SNAPSHOT").to_string(), "1.2.0-SNAPSHOT");
    }
}
