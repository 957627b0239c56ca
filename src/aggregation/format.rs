//! Display helpers for amounts and counts.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// numfmt switches to exponent notation from here on.
const NUMFMT_EXPONENT_THRESHOLD: f64 = 1e12;

/// Format `amount` as whole hryvnias with space separated thousands,
/// e.g. "1 000 ₴".
pub fn format_currency(amount: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .expect("a comma is a valid separator")
            .precision(Precision::Decimals(0))
    });

    let amount = amount.round();
    let magnitude = amount.abs();

    let digits = if amount == 0.0 {
        // Zero is hardcoded as "0" by numfmt regardless of the precision.
        "0".to_owned()
    } else if magnitude >= NUMFMT_EXPONENT_THRESHOLD {
        group_thousands(&format!("{magnitude:.0}"))
    } else {
        fmt.fmt_string(magnitude).replace(',', " ")
    };

    let sign = if amount < 0.0 { "-" } else { "" };

    format!("{sign}{digits} ₴")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    grouped
}

/// The form of the word "expense" that agrees with `count`.
///
/// Ukrainian uses the nominative singular after 1, 21, 31..., the nominative
/// plural after 2-4, 22-24... and the genitive plural otherwise, including the
/// teens.
pub fn ukrainian_plural(count: usize) -> &'static str {
    let last_digit = count % 10;
    let last_two_digits = count % 100;

    if last_digit == 1 && last_two_digits != 11 {
        "витрата"
    } else if (2..=4).contains(&last_digit) && !(12..=14).contains(&last_two_digits) {
        "витрати"
    } else {
        "витрат"
    }
}

#[cfg(test)]
mod tests {
    use super::{format_currency, ukrainian_plural};

    #[test]
    fn formats_thousands_with_spaces() {
        assert_eq!(format_currency(1000.0), "1 000 ₴");
        assert_eq!(format_currency(1_234_567.0), "1 234 567 ₴");
    }

    #[test]
    fn rounds_to_whole_hryvnias() {
        assert_eq!(format_currency(99.5), "100 ₴");
        assert_eq!(format_currency(120.49), "120 ₴");
    }

    #[test]
    fn formats_zero_and_values_that_round_to_zero() {
        assert_eq!(format_currency(0.0), "0 ₴");
        assert_eq!(format_currency(0.4), "0 ₴");
    }

    #[test]
    fn large_amounts_are_never_in_exponent_form() {
        assert_eq!(format_currency(1e12), "1 000 000 000 000 ₴");
        assert_eq!(format_currency(1e15), "1 000 000 000 000 000 ₴");
        assert_eq!(format_currency(-2.5e12), "-2 500 000 000 000 ₴");
    }

    #[test]
    fn small_amounts_have_no_separator() {
        assert_eq!(format_currency(999.0), "999 ₴");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(ukrainian_plural(1), "витрата");
        assert_eq!(ukrainian_plural(2), "витрати");
        assert_eq!(ukrainian_plural(4), "витрати");
        assert_eq!(ukrainian_plural(5), "витрат");
        assert_eq!(ukrainian_plural(0), "витрат");
        assert_eq!(ukrainian_plural(11), "витрат");
        assert_eq!(ukrainian_plural(12), "витрат");
        assert_eq!(ukrainian_plural(14), "витрат");
        assert_eq!(ukrainian_plural(21), "витрата");
        assert_eq!(ukrainian_plural(22), "витрати");
        assert_eq!(ukrainian_plural(111), "витрат");
        assert_eq!(ukrainian_plural(101), "витрата");
    }
}
