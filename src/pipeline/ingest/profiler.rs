//! Bounded shape statistics over a sampled text.
//!
//! Line statistics look at the first `MAX_PROFILE_LINES` lines; character
//! ratios look at the first `MAX_RATIO_CHARS` characters of the raw sample.
//! Lines break on `\n`, `\r\n`, a bare `\r` and the other Unicode line
//! separators; a trailing terminator does not open an empty last line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Attributes, ObjectProfile};

pub const MAX_PROFILE_LINES: usize = 5_000;
pub const MAX_RATIO_CHARS: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextProfile {
    pub line_count: u64,
    pub avg_line_len: f64,
    pub max_line_len: u64,
    pub ratio_digit: f64,
    pub ratio_alpha: f64,
    pub ratio_symbol: f64,
    pub has_csv_header: bool,
}

impl TextProfile {
    /// Attach the profile to a catalog object. Missing `bytes` is stored as 0.
    pub fn into_object_profile(
        self,
        object_id: Uuid,
        bytes: Option<i64>,
        profiled_at: DateTime<Utc>,
    ) -> ObjectProfile {
        ObjectProfile {
            object_id,
            bytes: bytes.unwrap_or(0),
            line_count: self.line_count as i64,
            avg_line_len: self.avg_line_len,
            max_line_len: self.max_line_len as i64,
            ratio_digit: self.ratio_digit,
            ratio_alpha: self.ratio_alpha,
            ratio_symbol: self.ratio_symbol,
            has_csv_header: self.has_csv_header,
            profiled_at,
        }
    }
}

/// The `sample` attribute, when it is a non-empty string.
pub fn sample_text(attrs: &Attributes) -> Option<&str> {
    match attrs.get("sample") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

pub fn profile_text(sample: &str) -> TextProfile {
    let mut line_count: u64 = 0;
    let mut total_len: u64 = 0;
    let mut max_line_len: u64 = 0;
    for line in split_lines(sample).take(MAX_PROFILE_LINES) {
        let len = line.chars().count() as u64;
        line_count += 1;
        total_len += len;
        max_line_len = max_line_len.max(len);
    }
    let avg_line_len = if line_count == 0 {
        0.0
    } else {
        total_len as f64 / line_count as f64
    };

    let mut considered: u64 = 0;
    let mut digits: u64 = 0;
    let mut alphas: u64 = 0;
    for c in sample.chars().take(MAX_RATIO_CHARS) {
        considered += 1;
        // Decimal digits only: '½', '²' and 'Ⅻ' are not digits.
        if c.is_ascii_digit() {
            digits += 1;
        }
        if c.is_alphabetic() {
            alphas += 1;
        }
    }
    let denominator = considered.max(1) as f64;
    let ratio_digit = digits as f64 / denominator;
    let ratio_alpha = alphas as f64 / denominator;
    let ratio_symbol = (1.0 - ratio_digit - ratio_alpha).max(0.0);

    TextProfile {
        line_count,
        avg_line_len,
        max_line_len,
        ratio_digit,
        ratio_alpha,
        ratio_symbol,
        has_csv_header: has_csv_header(split_lines(sample).next()),
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

/// Lines of `text` without their terminators. `\r\n` is one break.
fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: text }
}

struct SplitLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((at, c)) => {
                let line = &self.rest[..at];
                let mut end = at + c.len_utf8();
                if c == '\r' && self.rest[end..].starts_with('\n') {
                    end += 1;
                }
                self.rest = &self.rest[end..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

/// Coarse heuristic: a first line containing a comma.
fn has_csv_header(first_line: Option<&str>) -> bool {
    first_line.is_some_and(|line| line.contains(','))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_ratios_sum_to_one(p: &TextProfile) {
        let sum = p.ratio_digit + p.ratio_alpha + p.ratio_symbol;
        assert!((sum - 1.0).abs() < 1e-9, "ratios sum to {sum}");
        assert!(p.ratio_symbol >= 0.0);
    }

    #[test]
    fn small_csv_sample() {
        let p = profile_text("a,b\n1,2\n");
        assert_eq!(p.line_count, 2);
        assert_eq!(p.max_line_len, 3);
        assert!((p.avg_line_len - 3.0).abs() < f64::EPSILON);
        assert!(p.has_csv_header);
        // 8 chars: 2 digits, 2 letters, 4 symbols (two commas, two newlines)
        assert!((p.ratio_digit - 0.25).abs() < 1e-12);
        assert!((p.ratio_alpha - 0.25).abs() < 1e-12);
        assert!((p.ratio_symbol - 0.5).abs() < 1e-12);
    }

    #[test]
    fn plain_text_has_no_csv_header() {
        let p = profile_text("hello world\nsecond, line");
        assert!(!p.has_csv_header);
        assert_eq!(p.line_count, 2);
        assert_eq!(p.max_line_len, 12);
    }

    #[test]
    fn crlf_lines_are_split() {
        let p = profile_text("id,name\r\n1,x\r\n");
        assert_eq!(p.line_count, 2);
        assert_eq!(p.max_line_len, 7);
    }

    #[test]
    fn bare_cr_lines_are_split() {
        let p = profile_text("a,b\r1,2\r3,4\r");
        assert_eq!(p.line_count, 3);
        assert_eq!(p.max_line_len, 3);
        assert!((p.avg_line_len - 3.0).abs() < f64::EPSILON);
        assert!(p.has_csv_header);
    }

    #[test]
    fn mixed_terminators_and_unicode_separators() {
        let lines: Vec<&str> = split_lines("a\r\nb\rc\nd\u{2028}e\u{85}f").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "e", "f"]);
        let blank: Vec<&str> = split_lines("\n\r\n").collect();
        assert_eq!(blank, vec!["", ""]);
        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn cr_only_header_is_first_line_only() {
        let p = profile_text("title\rx,y");
        assert_eq!(p.line_count, 2);
        assert!(!p.has_csv_header);
    }

    #[test]
    fn only_decimal_digits_count_as_digits() {
        let p = profile_text("½²Ⅻ");
        assert_eq!(p.ratio_digit, 0.0);
        assert_ratios_sum_to_one(&p);

        // Alphabetic counting is independent of the digit check
        let p = profile_text("Ⅻ1");
        assert!((p.ratio_digit - 0.5).abs() < 1e-12);
        assert!((p.ratio_alpha - 0.5).abs() < 1e-12);
        assert_eq!(p.ratio_symbol, 0.0);
    }

    #[test]
    fn line_statistics_bounded_to_first_5000_lines() {
        let mut sample = String::new();
        for _ in 0..5_000 {
            sample.push_str("ab\n");
        }
        for _ in 0..5_000 {
            sample.push_str("a much longer line that must not be counted\n");
        }
        let p = profile_text(&sample);
        assert_eq!(p.line_count, 5_000);
        assert_eq!(p.max_line_len, 2);
        assert!((p.avg_line_len - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ratios_bounded_to_first_200k_chars() {
        // 200k digits followed by 800k letters: only the digits count
        let sample = format!("{}{}", "7".repeat(200_000), "x".repeat(800_000));
        let p = profile_text(&sample);
        assert_eq!(p.ratio_digit, 1.0);
        assert_eq!(p.ratio_alpha, 0.0);
        assert_eq!(p.ratio_symbol, 0.0);
        assert_eq!(p.line_count, 1);
        assert_eq!(p.max_line_len, 1_000_000);
    }

    #[test]
    fn line_length_counts_characters_not_bytes() {
        let p = profile_text("héllo,wörld");
        assert_eq!(p.max_line_len, 11);
        assert!(p.has_csv_header);
    }

    #[test]
    fn ratios_always_sum_to_one() {
        for sample in ["", "abc", "123", "!!!", "a1!", "2024-01-01T00:00:00Z", "ＡＢＣ１２３", "Ⅻ"] {
            assert_ratios_sum_to_one(&profile_text(sample));
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let p = profile_text("");
        assert_eq!(p.line_count, 0);
        assert_eq!(p.avg_line_len, 0.0);
        assert_eq!(p.max_line_len, 0);
        assert!(!p.has_csv_header);
        assert_eq!(p.ratio_symbol, 1.0);
    }

    #[test]
    fn sample_text_requires_non_empty_string() {
        let with = |v: serde_json::Value| {
            let mut a = Attributes::new();
            a.insert("sample".into(), v);
            a
        };
        assert_eq!(sample_text(&with(json!("x,y"))), Some("x,y"));
        assert_eq!(sample_text(&with(json!(""))), None);
        assert_eq!(sample_text(&with(json!(42))), None);
        assert_eq!(sample_text(&Attributes::new()), None);
    }

    #[test]
    fn object_profile_defaults_missing_bytes_to_zero() {
        let id = Uuid::new_v4();
        let at = Utc::now();
        let stored = profile_text("a").into_object_profile(id, None, at);
        assert_eq!(stored.bytes, 0);
        assert_eq!(stored.object_id, id);
        assert_eq!(stored.line_count, 1);
    }
}
