use std::{fmt, slice, str::FromStr};

use crate::error::ValidationError;

/// Accumulator for a repeatable command-line option.
///
/// Each successful [`RepeatedOption::parse`] appends one value; iteration order is the order the flags were seen.
/// A bad occurrence fails on its own and leaves the already accumulated values untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedOption<T> {
    values: Vec<T>,
}

impl<T> RepeatedOption<T>
where
    T: FromStr<Err = ValidationError> + fmt::Display,
{
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Parse one occurrence and append it.
    pub fn parse(&mut self, raw: &str) -> Result<&T, ValidationError> {
        let value = raw.parse::<T>()?;
        self.values.push(value);
        Ok(&self.values[self.values.len() - 1])
    }

    /// Parse every occurrence in order, stopping at the first bad one.
    pub fn parse_all<I, S>(raws: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::new();
        for raw in raws {
            out.parse(raw.as_ref())?;
        }
        Ok(out)
    }

    /// Render every value back into its flag syntax, comma separated.
    pub fn render(&self) -> String {
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<T> RepeatedOption<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T> Default for RepeatedOption<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> From<Vec<T>> for RepeatedOption<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<'a, T> IntoIterator for &'a RepeatedOption<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnvVar, PortMapping, Volume};

    #[test]
    fn parse_appends_in_order() {
        let mut envs = RepeatedOption::<EnvVar>::new();
        envs.parse("A=1").unwrap();
        envs.parse("B=2").unwrap();
        envs.parse("A=3").unwrap();

        let names: Vec<_> = envs.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["A", "B", "A"]);
        assert_eq!(envs.render(), "A=1,B=2,A=3");
    }

    #[test]
    fn bad_occurrence_does_not_touch_accumulated_values() {
        let mut ports = RepeatedOption::<PortMapping>::new();
        ports.parse("8080:80").unwrap();
        assert!(ports.parse("nope").is_err());
        assert_eq!(ports.len(), 1);
    }

    #[test]
    fn parse_all_reports_first_bad_value() {
        let err = RepeatedOption::<Volume>::parse_all(["/a:/b", "/c", "/d:/e:xx"]).unwrap_err();
        assert_eq!(err, ValidationError::InvalidVolume("/c".into()));
    }

    #[test]
    fn parse_all_accepts_empty_input() {
        let empty: Vec<String> = Vec::new();
        let vols = RepeatedOption::<Volume>::parse_all(empty).unwrap();
        assert!(vols.is_empty());
        assert_eq!(vols.render(), "");
    }
}
