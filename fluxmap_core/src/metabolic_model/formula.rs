//! Flattened chemical formulas
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::io::formula_parse::{parse_formula, FormulaParseError};

/// A chemical formula flattened into element counts
///
/// Groups such as `(CH2)2` are multiplied out during parsing. A formula containing a
/// generic radical (`R`, `X`) or a group with a variable repeat count (`(C2H4O)n`) is
/// marked as variable, the counted elements then exclude the variable parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Formula {
    elements: BTreeMap<String, u64>,
    variable: bool,
}

impl Formula {
    /// Parse and flatten a formula string
    ///
    /// # Examples
    /// ```rust
    /// use fluxmap_core::metabolic_model::formula::Formula;
    /// let formula = Formula::parse("C6H12O6").unwrap();
    /// assert_eq!(formula.count("C"), 6);
    /// ```
    pub fn parse(input: &str) -> Result<Formula, FormulaParseError> {
        parse_formula(input)
    }

    /// Build a formula from element counts, zero counts are dropped
    pub fn from_elements<'a, I: IntoIterator<Item = (&'a str, u64)>>(elements: I) -> Formula {
        let mut formula = Formula::default();
        for (element, count) in elements {
            formula.add(element, count);
        }
        formula
    }

    pub(crate) fn add(&mut self, element: &str, count: u64) {
        if count > 0 {
            let current = self.elements.entry(element.to_string()).or_insert(0);
            *current = current.saturating_add(count);
        }
    }

    pub(crate) fn mark_variable(&mut self) {
        self.variable = true;
    }

    /// Add `times` copies of `other`, `None` if an element count overflows
    pub(crate) fn merge(&mut self, other: &Formula, times: u64) -> Option<()> {
        for (element, count) in &other.elements {
            let scaled = count.checked_mul(times)?;
            let current = self.elements.entry(element.clone()).or_insert(0);
            *current = current.checked_add(scaled)?;
        }
        self.variable |= other.variable;
        Some(())
    }

    /// Whether at least one atom of `element` is present
    pub fn contains(&self, element: &str) -> bool {
        self.count(element) > 0
    }

    /// Number of atoms of `element`
    pub fn count(&self, element: &str) -> u64 {
        self.elements.get(element).copied().unwrap_or(0)
    }

    /// Whether the formula has generic or variably repeated parts
    pub fn is_variable(&self) -> bool {
        self.variable
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over (element, count), sorted by element symbol
    pub fn elements(&self) -> impl Iterator<Item = (&str, u64)> {
        self.elements.iter().map(|(e, c)| (e.as_str(), *c))
    }

    /// Element wise minimum of two formulas
    pub fn intersection(&self, other: &Formula) -> Formula {
        let mut shared = Formula::default();
        for (element, count) in &self.elements {
            shared.add(element, (*count).min(other.count(element)));
        }
        shared
    }

    /// Remove the atoms of `other`, saturating at zero
    pub fn subtract(&mut self, other: &Formula) {
        for (element, count) in &other.elements {
            if let Some(current) = self.elements.get_mut(element) {
                *current = current.saturating_sub(*count);
            }
        }
        self.elements.retain(|_, c| *c > 0);
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Hill order: carbon, hydrogen, then everything else alphabetically
        let leading = ["C", "H"];
        let rest = self
            .elements
            .keys()
            .filter(|e| !leading.contains(&e.as_str()))
            .map(|e| e.as_str());
        for element in leading.into_iter().chain(rest) {
            match self.count(element) {
                0 => {}
                1 => write!(f, "{}", element)?,
                n => write!(f, "{}{}", element, n)?,
            }
        }
        Ok(())
    }
}
