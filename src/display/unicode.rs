//! Unicode formatting utilities
use std::ops::Range;

use crate::value::Value;

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Format a floating point number as a string
///
/// # Parameters
/// - `n`: The number to format
/// - `fixed_range`: An optional range of magnitudes that will not be formatted in scientific notation
/// - `precision`: The number of decimal places to include
pub fn float<T: Value>(n: T, fixed_range: Option<Range<T>>, precision: usize) -> String {
    match fixed_range {
        Some(range) if range.contains(&Value::abs(n)) => format!("{n:.precision$}"),
        _ => format!("{n:.precision$e}"),
    }
}

/// Convert a string into a superscript string, ignoring characters with no superscript form
///
/// Supports digits, signs and parentheses, which is enough for exponents and harmonic orders.
pub fn superscript(s: &str) -> String {
    s.chars().filter_map(to_superscript).collect()
}

/// Convert a string into a subscript string, ignoring characters with no subscript form
///
/// Supports digits, signs and parentheses.
pub fn subscript(s: &str) -> String {
    s.chars().filter_map(to_subscript).collect()
}

fn to_superscript(c: char) -> Option<char> {
    match c {
        '+' => Some('⁺'),
        '-' => Some('⁻'),
        '(' => Some('⁽'),
        ')' => Some('⁾'),
        _ => c.to_digit(10).map(|d| SUPERSCRIPT_DIGITS[d as usize]),
    }
}

fn to_subscript(c: char) -> Option<char> {
    match c {
        '+' => Some('₊'),
        '-' => Some('₋'),
        '(' => Some('₍'),
        ')' => Some('₎'),
        _ => c.to_digit(10).map(|d| SUBSCRIPT_DIGITS[d as usize]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts() {
        assert_eq!(superscript("10"), "¹⁰");
        assert_eq!(superscript("-3"), "⁻³");
        assert_eq!(subscript("42"), "₄₂");
        assert_eq!(subscript("(1)"), "₍₁₎");
        assert_eq!(superscript("x2"), "²");
    }

    #[test]
    fn test_float() {
        let range = Some(1e-3..1e3);
        assert_eq!(float(2.5, range.clone(), 2), "2.50");
        assert_eq!(float(-2.5, range.clone(), 2), "-2.50");
        assert_eq!(float(12345.0, range.clone(), 1), "1.2e4");
        assert_eq!(float(0.5, None, 3), "5.000e-1");
    }
}
