//! Utilities for displaying fitted expressions
//!
//! This module turns coefficients and their term labels into human-readable strings.
//!
//! # Key Concepts
//! - **[`ExpressionFormatter`]**: Renders a set of coefficients as an expression, dropping
//!   negligible terms.
//! - **[`Notation`]**: Plain ASCII (`0.5000*u^2*v`) or Unicode (`0.5000u²·v`).
//! - **[`Term`]**: Represents a single term with a sign and body.
//! - **[`Sign`]**: Tracks whether a term is positive or negative.
//!
//! # Output
//! - Monomial terms are joined into one expression: `1.2500 + 0.5000*u^2*v`
//! - Spherical-harmonic terms are listed one per line: `Y_2^-1: 0.031250`
//! - If every term is dropped, the expression is `0`
//!
//! # Helpers
//! - [`format_coefficient`]: Formats a numeric coefficient, skipping zeros.
//! - [`format_variable`]: Formats a variable with a Unicode subscript and exponent.
use crate::{basis::TermLabel, fit::Coefficients, value::Value};

pub mod unicode;

/// Default drop threshold for monomial terms
pub const MONOMIAL_THRESHOLD: f64 = 1e-5;

/// Default drop threshold for spherical-harmonic terms
pub const HARMONIC_THRESHOLD: f64 = 1e-4;

/// Default number of decimals for monomial coefficients
pub const MONOMIAL_PRECISION: usize = 4;

/// Default number of decimals for spherical-harmonic coefficients
pub const HARMONIC_PRECISION: usize = 6;

/// Channel names of an RGB image, for [`ExpressionFormatter::format_channels`]
pub const RGB_CHANNELS: [&str; 3] = ["Red", "Green", "Blue"];

/// Default range in which scientific notation is not used
#[must_use]
pub fn default_fixed_range<T: Value>() -> Option<std::ops::Range<T>> {
    const RANGE: std::ops::Range<f64> = 1e-3..1e3;
    let s = T::try_cast(RANGE.start).ok()?;
    let e = T::try_cast(RANGE.end).ok()?;
    Some(s..e)
}

/// How terms are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    /// `coef*u^2*v`, joined with `" + "`; coefficients keep their own sign.
    ///
    /// Suitable for pasting into code or a spreadsheet.
    #[default]
    Ascii,

    /// `coef·u²·v`, joined with `+` or `-` depending on the sign of each term.
    Unicode,
}

/// Represents the sign of a term.
///
/// Used when formatting expressions to determine how a term
/// should be connected to the rest of the expression (e.g., with `+` or `-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Positive sign (`+` when displayed).
    Positive,

    /// Negative sign (`-` when displayed).
    Negative,
}

impl Sign {
    /// Determines the sign from a numeric coefficient.
    ///
    /// # Example
    /// ```
    /// # use basisfit::display::Sign;
    /// assert_eq!(Sign::from_coef(3.0), Sign::Positive);
    /// assert_eq!(Sign::from_coef(-2.0), Sign::Negative);
    /// ```
    pub fn from_coef<T: Value>(coef: T) -> Self {
        if Value::is_sign_negative(&coef) {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    /// Returns the character representation of the sign.
    ///
    /// `+` for `Positive`, `-` for `Negative`.
    #[must_use]
    pub fn char(&self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

/// Represents a single term of an expression for display purposes.
///
/// A `Term` combines the **sign** and the **formatted body** of a component
/// (e.g., `"2u²"`, `"3.14"`, `"Y₁⁰"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// The sign of the term (positive or negative).
    pub sign: Sign,

    /// The body of the term, without its sign.
    pub body: String,
}

impl Term {
    /// Creates a new term with the given sign and body.
    #[must_use]
    pub fn new(sign: Sign, body: String) -> Self {
        Self { sign, body }
    }
}

/// Formats the magnitude of a coefficient for display in a Unicode term.
///
/// - Returns `None` if the coefficient is zero or effectively zero (≤ epsilon).
/// - Returns an empty string for a magnitude of 1 on a non-constant term, so `1u²` reads `u²`.
/// - Formats as a decimal if the absolute value is between `1e-3` and `1e3`.
/// - Formats in scientific notation otherwise.
///
/// # Example
/// ```
/// # use basisfit::display::format_coefficient;
/// assert_eq!(format_coefficient(0.0, false, 2), None);
/// assert_eq!(format_coefficient(-2.5, false, 2), Some("2.50".to_string()));
/// assert_eq!(format_coefficient(1.0, false, 2), Some(String::new()));
/// assert_eq!(format_coefficient(1e5, true, 2), Some("1.00e5".to_string()));
/// ```
pub fn format_coefficient<T: Value>(coef: T, constant: bool, precision: usize) -> Option<String> {
    let abs = Value::abs(coef);

    if coef.is_zero() || abs <= T::epsilon() {
        return None;
    }

    if Value::abs_sub(abs, T::one()) <= T::epsilon() && !constant {
        return Some(String::new());
    }

    let sci_cutoff = default_fixed_range();
    Some(unicode::float(abs, sci_cutoff, precision))
}

/// Formats a variable with an optional subscript and exponent for display purposes.
///
/// # Behavior
/// - If `exp == 0`, returns an empty string (`""`).
/// - If `exp == 1`, returns the base string with its subscript.
/// - Otherwise, appends the Unicode superscript version of `exp`.
///
/// # Examples
/// ```
/// # use basisfit::display::format_variable;
/// assert_eq!(format_variable("x", None, 0), "");
/// assert_eq!(format_variable("u", None, 1), "u");
/// assert_eq!(format_variable("x", Some("1"), 2), "x₁²");
/// ```
#[must_use]
pub fn format_variable(base: &str, subscript: Option<&str>, exp: i32) -> String {
    let lbl = unicode::subscript(subscript.unwrap_or_default());
    match exp {
        0 => String::new(),
        1 => format!("{base}{lbl}"),
        _ => {
            let sup = unicode::superscript(&exp.to_string());
            format!("{base}{lbl}{sup}")
        }
    }
}

/// Renders fitted coefficients as a human-readable expression.
///
/// Terms whose coefficient magnitude is below the threshold are left out. The threshold and
/// precision default per term family: [`MONOMIAL_THRESHOLD`] and [`MONOMIAL_PRECISION`] for
/// monomials, [`HARMONIC_THRESHOLD`] and [`HARMONIC_PRECISION`] for spherical harmonics.
///
/// Formatting is purely presentational; nothing here feeds back into a fit.
///
/// # Example
/// ```
/// use basisfit::{basis::TermLabel, display::ExpressionFormatter};
///
/// let labels = [
///     TermLabel::Monomial(vec![0, 0]),
///     TermLabel::Monomial(vec![1, 0]),
///     TermLabel::Monomial(vec![2, 1]),
/// ];
/// let formatter = ExpressionFormatter::new(["u", "v"]);
/// assert_eq!(formatter.format_terms(&labels, &[1.25, 0.000_001, -0.5]), "1.2500 + -0.5000*u^2*v");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionFormatter {
    variables: Vec<String>,
    threshold: Option<f64>,
    precision: Option<usize>,
    notation: Notation,
}
impl ExpressionFormatter {
    /// Creates a formatter naming the coordinates in dimension order.
    ///
    /// Dimensions without a name are written `x0`, `x1`, ...
    pub fn new<S: Into<String>>(variables: impl IntoIterator<Item = S>) -> Self {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            threshold: None,
            precision: None,
            notation: Notation::Ascii,
        }
    }

    /// Creates a formatter with conventional variable names for `dimensions` coordinates.
    ///
    /// `x` for one dimension, `x, y` for two, `x, y, z` for three, and `x0, x1, ...` beyond.
    #[must_use]
    pub fn for_dimensions(dimensions: usize) -> Self {
        match dimensions {
            1 => Self::new(["x"]),
            2 => Self::new(["x", "y"]),
            3 => Self::new(["x", "y", "z"]),
            _ => Self::new((0..dimensions).map(|d| format!("x{d}"))),
        }
    }

    /// Drops terms whose coefficient magnitude is below `threshold`, for every term family.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Writes coefficients with `precision` decimals, for every term family.
    #[must_use]
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the notation.
    #[must_use]
    pub fn notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    /// Renders a set of fitted coefficients.
    #[must_use]
    pub fn format<T: Value>(&self, coefficients: &Coefficients<T>) -> String {
        self.format_terms(coefficients.labels(), coefficients.values())
    }

    /// Renders coefficients given as parallel slices of labels and values.
    ///
    /// Extra labels or values beyond the shorter of the two are ignored.
    #[must_use]
    pub fn format_terms<T: Value>(&self, labels: &[TermLabel], coefficients: &[T]) -> String {
        let mut output = String::new();

        // Writing to a String cannot fail
        self.write_terms(&mut output, labels, coefficients).ok();
        output
    }

    /// Writes the expression for one set of coefficients into the provided buffer.
    ///
    /// # Errors
    /// Returns an error if writing to `buffer` fails.
    pub fn write_terms<B: std::fmt::Write, T: Value>(
        &self,
        buffer: &mut B,
        labels: &[TermLabel],
        coefficients: &[T],
    ) -> std::fmt::Result {
        let mut terms = Vec::new();
        let mut harmonics = Vec::new();

        for (label, &coef) in labels.iter().zip(coefficients) {
            if self.is_negligible(label, coef) {
                continue;
            }

            if let TermLabel::Harmonic { l, m } = label {
                harmonics.push(self.harmonic_line(*l, *m, coef));
            } else if let Some(term) = self.format_term(label, coef) {
                terms.push(term);
            }
        }

        if terms.is_empty() && harmonics.is_empty() {
            return write!(buffer, "0");
        }

        if !terms.is_empty() {
            self.write_sum(buffer, terms)?;
            if !harmonics.is_empty() {
                writeln!(buffer)?;
            }
        }

        write!(buffer, "{}", harmonics.join("\n"))
    }

    /// Renders one expression per channel, each under a `=== Name Channel ===` header.
    ///
    /// Channels beyond the number of names are labelled by index.
    ///
    /// # Example
    /// ```
    /// use basisfit::{basis::TermLabel, display::{ExpressionFormatter, RGB_CHANNELS}, fit::Coefficients};
    ///
    /// let red = Coefficients::new(vec![0.5], vec![TermLabel::Harmonic { l: 0, m: 0 }]).unwrap();
    /// let text = ExpressionFormatter::new(["θ", "φ"]).format_channels(&RGB_CHANNELS, &[red]);
    /// assert_eq!(text, "=== Red Channel ===\nY_0^0: 0.500000\n\n");
    /// ```
    #[must_use]
    pub fn format_channels<T: Value>(&self, names: &[&str], channels: &[Coefficients<T>]) -> String {
        let mut output = String::new();
        for (i, coefficients) in channels.iter().enumerate() {
            let name = names.get(i).map_or_else(|| i.to_string(), |n| (*n).to_string());
            output.push_str(&format!("=== {name} Channel ===\n"));
            output.push_str(&self.format(coefficients));
            output.push_str("\n\n");
        }
        output
    }

    fn is_negligible<T: Value>(&self, label: &TermLabel, coef: T) -> bool {
        let threshold = self.threshold.unwrap_or(match label {
            TermLabel::Harmonic { .. } => HARMONIC_THRESHOLD,
            _ => MONOMIAL_THRESHOLD,
        });

        // A threshold too large for T drops everything; a NaN coefficient is never negligible
        let threshold = T::try_cast(threshold).unwrap_or(T::infinity());
        Value::abs(coef) < threshold
    }

    fn precision_for(&self, label: &TermLabel) -> usize {
        self.precision.unwrap_or(match label {
            TermLabel::Harmonic { .. } => HARMONIC_PRECISION,
            _ => MONOMIAL_PRECISION,
        })
    }

    fn variable(&self, d: usize) -> String {
        self.variables
            .get(d)
            .cloned()
            .unwrap_or_else(|| format!("x{d}"))
    }

    /// Formats a non-harmonic term.
    ///
    /// Returns `None` if a Unicode term has an effectively-zero coefficient.
    fn format_term<T: Value>(&self, label: &TermLabel, coef: T) -> Option<Term> {
        let precision = self.precision_for(label);
        let exponents: &[u32] = match label {
            TermLabel::Monomial(exponents) => exponents,
            _ => &[],
        };

        match self.notation {
            Notation::Ascii => {
                let mut body = format!("{coef:.precision$}");
                for (d, &e) in exponents.iter().enumerate() {
                    match e {
                        0 => {}
                        1 => body.push_str(&format!("*{}", self.variable(d))),
                        _ => body.push_str(&format!("*{}^{e}", self.variable(d))),
                    }
                }
                Some(Term::new(Sign::Positive, body))
            }

            Notation::Unicode => {
                let sign = Sign::from_coef(coef);
                let coef = format_coefficient(coef, label.is_constant(), precision)?;
                let vars: Vec<String> = exponents
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| **e > 0)
                    .map(|(d, &e)| {
                        let exp = i32::try_from(e).unwrap_or(i32::MAX);
                        format_variable(&self.variable(d), None, exp)
                    })
                    .collect();
                Some(Term::new(sign, format!("{coef}{}", vars.join("·"))))
            }
        }
    }

    fn harmonic_line<T: Value>(&self, l: u32, m: i32, coef: T) -> String {
        let precision = self.precision_for(&TermLabel::Harmonic { l, m });
        match self.notation {
            Notation::Ascii => format!("Y_{l}^{m}: {coef:.precision$}"),
            Notation::Unicode => {
                let name = format_variable("Y", Some(&l.to_string()), 1);
                let order = unicode::superscript(&m.to_string());
                format!("{name}{order}: {coef:.precision$}")
            }
        }
    }

    fn write_sum<B: std::fmt::Write>(&self, buffer: &mut B, mut terms: Vec<Term>) -> std::fmt::Result {
        if self.notation == Notation::Ascii {
            let bodies: Vec<String> = terms.into_iter().map(|t| t.body).collect();
            return write!(buffer, "{}", bodies.join(" + "));
        }

        // Extract the first term to avoid leading '+'
        let term_n = terms.remove(0);
        if term_n.sign == Sign::Negative {
            write!(buffer, "{}", term_n.sign.char())?;
        }
        write!(buffer, "{}", term_n.body)?;

        for term in terms {
            let sign = term.sign.char();
            let body = term.body;

            write!(buffer, " {sign} {body}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monomials(exponents: &[&[u32]]) -> Vec<TermLabel> {
        exponents
            .iter()
            .map(|e| TermLabel::Monomial(e.to_vec()))
            .collect()
    }

    #[test]
    fn test_sign_from_coef() {
        assert_eq!(Sign::from_coef(1.0), Sign::Positive);
        assert_eq!(Sign::from_coef(-1.0), Sign::Negative);
        assert_eq!(Sign::from_coef(0.0), Sign::Positive);
    }

    #[test]
    fn test_format_coefficient() {
        assert_eq!(format_coefficient(2.5, false, 2), Some("2.50".to_string()));
        assert_eq!(format_coefficient(-2.5, false, 2), Some("2.50".to_string()));
        assert_eq!(format_coefficient(0.0, false, 2), None);
        assert_eq!(format_coefficient(1e-20, false, 2), None);
        assert_eq!(format_coefficient(1e5, false, 2), Some("1.00e5".to_string()));
        assert_eq!(format_coefficient(1e-5, false, 2), Some("1.00e-5".to_string()));
        assert_eq!(format_coefficient(-1.0, false, 2), Some(String::new()));
        assert_eq!(format_coefficient(-1.0, true, 2), Some("1.00".to_string()));
    }

    #[test]
    fn test_format_variable() {
        assert_eq!(format_variable("x", None, 0), "");
        assert_eq!(format_variable("x", None, 1), "x");
        assert_eq!(format_variable("x", Some("1"), 2), "x₁²");
        assert_eq!(format_variable("Y", Some("3"), 1), "Y₃");
        assert_eq!(format_variable("x", None, -2), "x⁻²");
    }

    #[test]
    fn test_threshold() {
        let labels = monomials(&[&[0], &[1], &[2]]);
        let formatter = ExpressionFormatter::new(["x"]).threshold(1e-4);

        assert_eq!(formatter.format_terms(&labels, &[0.00001, 0.0005, 2.0]), "0.0005*x + 2.0000*x^2");
        assert_eq!(formatter.format_terms(&labels, &[0.0, 0.0, 0.0]), "0");
        assert_eq!(formatter.format_terms(&labels, &[0.00002, -0.00003, 0.0]), "0");
    }

    #[test]
    fn test_monomial_ascii() {
        let labels = monomials(&[&[0, 0], &[1, 0], &[0, 1], &[2, 0], &[1, 1], &[0, 2]]);
        let coefficients = [0.25, -1.5, 0.0, 3.0, 0.125, 0.000_001];
        let formatter = ExpressionFormatter::new(["u", "v"]);
        assert_eq!(
            formatter.format_terms(&labels, &coefficients),
            "0.2500 + -1.5000*u + 3.0000*u^2 + 0.1250*u*v"
        );

        let formatter = formatter.precision(2);
        assert_eq!(formatter.format_terms(&labels[..2], &coefficients[..2]), "0.25 + -1.50*u");
    }

    #[test]
    fn test_monomial_unicode() {
        let labels = monomials(&[&[0, 0], &[1, 0], &[2, 1], &[0, 1]]);
        let formatter = ExpressionFormatter::new(["u", "v"]).notation(Notation::Unicode);
        assert_eq!(
            formatter.format_terms(&labels, &[-0.5, 1.0, 2.0, -3.25]),
            "-0.5000 + u + 2.0000u²·v - 3.2500v"
        );
    }

    #[test]
    fn test_harmonic_lines() {
        let labels = vec![
            TermLabel::Harmonic { l: 0, m: 0 },
            TermLabel::Harmonic { l: 1, m: -1 },
            TermLabel::Harmonic { l: 1, m: 0 },
            TermLabel::Harmonic { l: 1, m: 1 },
        ];
        let formatter = ExpressionFormatter::new(["θ", "φ"]);
        assert_eq!(
            formatter.format_terms(&labels, &[1.772_453_85, 0.00005, -0.25, 0.0005]),
            "Y_0^0: 1.772454\nY_1^0: -0.250000\nY_1^1: 0.000500"
        );

        let formatter = formatter.notation(Notation::Unicode);
        assert_eq!(formatter.format_terms(&labels[1..3], &[0.5, 0.0]), "Y₁⁻¹: 0.500000");
    }

    #[test]
    fn test_intercept_and_defaults() {
        let labels = vec![TermLabel::Monomial(vec![1]), TermLabel::Intercept];
        let formatter = ExpressionFormatter::for_dimensions(1);
        assert_eq!(formatter.format_terms(&labels, &[2.0, 3.0]), "2.0000*x + 3.0000");

        let formatter = ExpressionFormatter::for_dimensions(4);
        let labels = monomials(&[&[0, 0, 0, 2]]);
        assert_eq!(formatter.format_terms(&labels, &[1.0]), "1.0000*x3^2");

        // Unnamed dimensions fall back to indices
        let formatter = ExpressionFormatter::new(["a"]);
        let labels = monomials(&[&[1, 1]]);
        assert_eq!(formatter.format_terms(&labels, &[1.0]), "1.0000*a*x1");
    }

    #[test]
    fn test_format_channels() {
        let labels = monomials(&[&[0], &[1]]);
        let red = Coefficients::new(vec![1.0, 0.5], labels.clone()).unwrap();
        let green = Coefficients::new(vec![0.0, 0.0], labels).unwrap();

        let text = ExpressionFormatter::new(["x"]).format_channels(&RGB_CHANNELS[..1], &[red, green]);
        assert_eq!(
            text,
            "=== Red Channel ===\n1.0000 + 0.5000*x\n\n=== 1 Channel ===\n0\n\n"
        );
    }
}
