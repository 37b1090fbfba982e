//! SQL expression templates.

use crate::error::{PlatformError, Result};
use crate::platform::Vendor;

/// Which side of a string TRIM removes characters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// No side given; both sides are trimmed.
    #[default]
    Unspecified,
    /// Leading characters only.
    Leading,
    /// Trailing characters only.
    Trailing,
    /// Both sides.
    Both,
}

/// Direction of a date arithmetic expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOperator {
    /// Add the interval.
    Add,
    /// Subtract the interval.
    Sub,
}

impl DateOperator {
    /// Returns `+` or `-`.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
        }
    }
}

/// Unit of a date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIntervalUnit {
    /// Seconds.
    Second,
    /// Minutes.
    Minute,
    /// Hours.
    Hour,
    /// Days.
    Day,
    /// Weeks.
    Week,
    /// Months.
    Month,
    /// Quarters.
    Quarter,
    /// Years.
    Year,
}

impl DateIntervalUnit {
    /// Returns the upper-case unit keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
        }
    }

    /// Rewrites quarters as months times three.
    #[must_use]
    pub fn fold_quarter(self, interval: &str) -> (Self, String) {
        match self {
            Self::Quarter => (Self::Month, scale_interval(interval, 3)),
            unit => (unit, interval.to_string()),
        }
    }

    /// Rewrites weeks as days times seven.
    #[must_use]
    pub fn fold_week(self, interval: &str) -> (Self, String) {
        match self {
            Self::Week => (Self::Day, scale_interval(interval, 7)),
            unit => (unit, interval.to_string()),
        }
    }
}

/// Multiplies an interval, folding the product when the interval is a
/// plain integer literal.
#[must_use]
pub fn scale_interval(interval: &str, factor: i64) -> String {
    match interval.trim().parse::<i64>() {
        Ok(n) => n.saturating_mul(factor).to_string(),
        Err(_) => format!("({interval}) * {factor}"),
    }
}

/// Vendor spelling of portable SQL expressions.
///
/// Operations the vendor has no equivalent for return `UnsupportedFeature`.
pub trait ExpressionTranslator: Vendor {
    /// `SUBSTRING(string FROM start [FOR length])`, 1-based start.
    fn substring_expression(&self, string: &str, start: &str, length: Option<&str>) -> String {
        match length {
            Some(length) => format!("SUBSTRING({string} FROM {start} FOR {length})"),
            None => format!("SUBSTRING({string} FROM {start})"),
        }
    }

    /// Position of `substring` in `string`, searching from the 1-based `start`.
    ///
    /// Returns 0 when not found and the 1-based position otherwise.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` on vendors with no position function.
    fn locate_expression(
        &self,
        string: &str,
        substring: &str,
        start: Option<&str>,
    ) -> Result<String> {
        match start {
            None => Ok(format!("POSITION({substring} IN {string})")),
            Some(start) => {
                let tail = self.substring_expression(string, start, None);
                Ok(format!(
                    "CASE WHEN (POSITION({substring} IN {tail}) = 0) THEN 0 \
                     ELSE (POSITION({substring} IN {tail}) + {start} - 1) END"
                ))
            }
        }
    }

    /// Concatenation of all parts.
    fn concat_expression(&self, parts: &[&str]) -> String {
        parts.join(" || ")
    }

    /// TRIM with an optional character to remove.
    fn trim_expression(&self, string: &str, mode: TrimMode, chars: Option<&str>) -> String {
        let side = match mode {
            TrimMode::Unspecified => "",
            TrimMode::Leading => "LEADING ",
            TrimMode::Trailing => "TRAILING ",
            TrimMode::Both => "BOTH ",
        };
        match chars {
            Some(chars) => format!("TRIM({side}{chars} FROM {string})"),
            None if side.is_empty() => format!("TRIM({string})"),
            None => format!("TRIM({side}FROM {string})"),
        }
    }

    /// Length of a string in characters.
    fn length_expression(&self, string: &str) -> String {
        format!("LENGTH({string})")
    }

    /// Remainder of an integer division.
    fn mod_expression(&self, dividend: &str, divisor: &str) -> String {
        format!("MOD({dividend}, {divisor})")
    }

    /// Number of days between two dates (`date1 - date2`).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor has no date difference.
    fn date_diff_expression(&self, _date1: &str, _date2: &str) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "date difference"))
    }

    /// Date plus or minus an interval.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor has no date arithmetic.
    fn date_arithmetic_expression(
        &self,
        _date: &str,
        _operator: DateOperator,
        _interval: &str,
        _unit: DateIntervalUnit,
    ) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "date arithmetic"))
    }

    /// Date plus an interval.
    ///
    /// # Errors
    ///
    /// See [`ExpressionTranslator::date_arithmetic_expression`].
    fn date_add_expression(
        &self,
        date: &str,
        interval: &str,
        unit: DateIntervalUnit,
    ) -> Result<String> {
        self.date_arithmetic_expression(date, DateOperator::Add, interval, unit)
    }

    /// Date minus an interval.
    ///
    /// # Errors
    ///
    /// See [`ExpressionTranslator::date_arithmetic_expression`].
    fn date_sub_expression(
        &self,
        date: &str,
        interval: &str,
        unit: DateIntervalUnit,
    ) -> Result<String> {
        self.date_arithmetic_expression(date, DateOperator::Sub, interval, unit)
    }

    /// Bitwise AND.
    fn bit_and_expression(&self, a: &str, b: &str) -> String {
        format!("({a} & {b})")
    }

    /// Bitwise OR.
    fn bit_or_expression(&self, a: &str, b: &str) -> String {
        format!("({a} | {b})")
    }

    /// Expression generating a new GUID.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor cannot generate GUIDs.
    fn guid_expression(&self) -> Result<String> {
        Err(PlatformError::unsupported(self.name(), "GUID generation"))
    }

    /// MD5 hash of a string, as hex.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor has no MD5 function.
    fn md5_expression(&self, string: &str) -> Result<String> {
        Ok(format!("MD5({string})"))
    }

    /// The constant pi.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFeature` when the vendor has no PI() builtin.
    fn pi_expression(&self) -> Result<String> {
        Ok("PI()".to_string())
    }

    /// Current timestamp.
    fn current_timestamp_sql(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    /// Current date.
    fn current_date_sql(&self) -> &'static str {
        "CURRENT_DATE"
    }

    /// Current time.
    fn current_time_sql(&self) -> &'static str {
        "CURRENT_TIME"
    }

    /// Quotes a string literal.
    fn quote_string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// TRIM built from `PATINDEX`, `STUFF` and `REVERSE`, for vendors whose
/// TRIM cannot take a character argument.
#[must_use]
pub fn pattern_trim_expression(string: &str, mode: TrimMode, chars: Option<&str>) -> String {
    let Some(chars) = chars else {
        return match mode {
            TrimMode::Leading => format!("LTRIM({string})"),
            TrimMode::Trailing => format!("RTRIM({string})"),
            TrimMode::Unspecified | TrimMode::Both => format!("LTRIM(RTRIM({string}))"),
        };
    };

    let pattern = format!("'%[^' + {chars} + ']%'");
    let strip_leading =
        |s: &str| format!("STUFF({s}, 1, PATINDEX({pattern}, {s}) - 1, NULL)");
    let strip_trailing = |s: &str| {
        let reversed = format!("REVERSE({s})");
        format!("REVERSE({})", strip_leading(&reversed))
    };

    match mode {
        TrimMode::Leading => strip_leading(string),
        TrimMode::Trailing => strip_trailing(string),
        TrimMode::Unspecified | TrimMode::Both => strip_trailing(&strip_leading(string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ansi;

    impl Vendor for Ansi {
        fn name(&self) -> &'static str {
            "ansi"
        }
    }

    impl ExpressionTranslator for Ansi {}

    #[test]
    fn test_trim_variants() {
        assert_eq!(Ansi.trim_expression("col", TrimMode::Unspecified, None), "TRIM(col)");
        assert_eq!(
            Ansi.trim_expression("col", TrimMode::Leading, None),
            "TRIM(LEADING FROM col)"
        );
        assert_eq!(
            Ansi.trim_expression("col", TrimMode::Both, Some("'x'")),
            "TRIM(BOTH 'x' FROM col)"
        );
    }

    #[test]
    fn test_locate_with_start() {
        let sql = Ansi.locate_expression("col", "'a'", Some("3")).unwrap();
        assert_eq!(
            sql,
            "CASE WHEN (POSITION('a' IN SUBSTRING(col FROM 3)) = 0) THEN 0 \
             ELSE (POSITION('a' IN SUBSTRING(col FROM 3)) + 3 - 1) END"
        );
    }

    #[test]
    fn test_date_arithmetic_unsupported_by_default() {
        let err = Ansi
            .date_add_expression("d", "1", DateIntervalUnit::Day)
            .unwrap_err();
        assert!(matches!(err, PlatformError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_fold_quarter() {
        assert_eq!(
            DateIntervalUnit::Quarter.fold_quarter("2"),
            (DateIntervalUnit::Month, "6".to_string())
        );
        assert_eq!(
            DateIntervalUnit::Quarter.fold_quarter("n"),
            (DateIntervalUnit::Month, "(n) * 3".to_string())
        );
        assert_eq!(
            DateIntervalUnit::Day.fold_quarter("2"),
            (DateIntervalUnit::Day, "2".to_string())
        );
    }

    #[test]
    fn test_pattern_trim() {
        assert_eq!(
            pattern_trim_expression("col", TrimMode::Both, None),
            "LTRIM(RTRIM(col))"
        );
        assert_eq!(
            pattern_trim_expression("col", TrimMode::Leading, Some("'x'")),
            "STUFF(col, 1, PATINDEX('%[^' + 'x' + ']%', col) - 1, NULL)"
        );
        assert_eq!(
            pattern_trim_expression("col", TrimMode::Trailing, Some("'x'")),
            "REVERSE(STUFF(REVERSE(col), 1, PATINDEX('%[^' + 'x' + ']%', REVERSE(col)) - 1, NULL))"
        );
    }

    #[test]
    fn test_quote_string_literal() {
        assert_eq!(Ansi.quote_string_literal("it's"), "'it''s'");
    }
}
