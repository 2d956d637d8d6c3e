//! Display formatting: grouped currency amounts and pluralised term labels.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{round_money, Money};

/// Plural form selected for a count of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    One,
    Few,
    Many,
}

/// `1 → One`, `2..=4 → Few`, everything else `Many`.
pub fn plural_category(years: u32) -> PluralCategory {
    match years {
        1 => PluralCategory::One,
        2..=4 => PluralCategory::Few,
        _ => PluralCategory::Many,
    }
}

/// Words for "year" in each plural category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermWords {
    pub one: String,
    pub few: String,
    pub many: String,
}

impl TermWords {
    pub fn russian() -> Self {
        Self {
            one: "год".into(),
            few: "года".into(),
            many: "лет".into(),
        }
    }

    pub fn english() -> Self {
        Self {
            one: "year".into(),
            few: "years".into(),
            many: "years".into(),
        }
    }

    pub fn word(&self, years: u32) -> &str {
        match plural_category(years) {
            PluralCategory::One => &self.one,
            PluralCategory::Few => &self.few,
            PluralCategory::Many => &self.many,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLocale {
    #[default]
    Ru,
    En,
}

/// Locale-dependent formatting rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pub group_separator: char,
    /// Numbers with fewer integer digits than this are not grouped
    /// (`5000` stays `5000` in Russian, `17 194` is grouped).
    pub min_grouping_digits: usize,
    pub currency_suffix: String,
    pub term_words: TermWords,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::russian()
    }
}

impl DisplayFormat {
    pub fn russian() -> Self {
        Self {
            group_separator: '\u{a0}',
            min_grouping_digits: 5,
            currency_suffix: " ₽".into(),
            term_words: TermWords::russian(),
        }
    }

    pub fn english() -> Self {
        Self {
            group_separator: ',',
            min_grouping_digits: 4,
            currency_suffix: " ₽".into(),
            term_words: TermWords::english(),
        }
    }

    pub fn for_locale(locale: DisplayLocale) -> Self {
        match locale {
            DisplayLocale::Ru => Self::russian(),
            DisplayLocale::En => Self::english(),
        }
    }

    /// Whole-unit amount with digit grouping, no currency.
    pub fn group(&self, value: Money) -> String {
        let rounded = round_money(value);
        let digits = rounded.abs().trunc().to_string();
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };

        if digits.len() < self.min_grouping_digits {
            return format!("{sign}{digits}");
        }

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(ch);
        }
        format!("{sign}{grouped}")
    }

    /// Grouped amount followed by the currency suffix.
    pub fn money(&self, value: Money) -> String {
        format!("{}{}", self.group(value), self.currency_suffix)
    }

    /// Count of years with the correctly pluralised word, e.g. "20 лет".
    pub fn term(&self, years: u32) -> String {
        format!("{} {}", years, self.term_words.word(years))
    }
}
