//! Render projection: pure mapping from (input, lifecycle state) to display data.
//!
//! Nothing here can fail. Every state projects to something displayable,
//! and currency formatting degrades to a placeholder on non-finite input.

use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::RequestLifecycleState;
use crate::domain::property::PropertyField;
use crate::domain::statistics::StatisticsSnapshot;
use crate::input::InputModel;

/// Shown in place of a value that cannot be formatted.
pub const UNAVAILABLE: &str = "N/A";

/// Number formatting conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
}

impl Locale {
    fn group_separator(self) -> &'static str {
        match self {
            Locale::EnUs | Locale::EnGb => ",",
            Locale::DeDe => ".",
            Locale::FrFr => "\u{202f}",
        }
    }

    fn decimal_separator(self) -> &'static str {
        match self {
            Locale::EnUs | Locale::EnGb => ".",
            Locale::DeDe | Locale::FrFr => ",",
        }
    }
}

/// Format a number with locale grouping and at most `max_fraction_digits`
/// decimals (trailing zeros dropped).
pub fn format_number(value: f64, locale: Locale, max_fraction_digits: u32) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }

    let digits = max_fraction_digits.min(6);
    let scale = 10u128.pow(digits);
    // Float-to-int casts saturate, so huge magnitudes clamp instead of overflowing
    let scaled = (value.abs() * scale as f64).round() as u128;
    let whole = scaled / scale;
    let fraction = scaled % scale;

    let whole_digits = whole.to_string();
    let mut out = String::with_capacity(whole_digits.len() + 8);
    if value < 0.0 && scaled != 0 {
        out.push('-');
    }
    for (i, c) in whole_digits.chars().enumerate() {
        if i > 0 && (whole_digits.len() - i) % 3 == 0 {
            out.push_str(locale.group_separator());
        }
        out.push(c);
    }

    if fraction > 0 {
        let fraction_digits = format!("{:0width$}", fraction, width = digits as usize);
        out.push_str(locale.decimal_separator());
        out.push_str(fraction_digits.trim_end_matches('0'));
    }

    out
}

/// Format a dollar amount, e.g. `$2,500,000` or `$350,000.5`.
pub fn format_currency(value: f64, locale: Locale) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    let amount = format_number(value.abs(), locale, 2);
    if value < 0.0 && amount != "0" {
        format!("-${}", amount)
    } else {
        format!("${}", amount)
    }
}

/// One form field as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub field: PropertyField,
    pub name: &'static str,
    pub label: &'static str,
    pub raw: String,
    pub error: Option<String>,
}

/// Everything the estimator view needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatorView {
    pub fields: Vec<FieldView>,
    pub loading: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    /// Predicted price, present iff the last request succeeded
    pub result: Option<f64>,
    pub result_text: Option<String>,
    /// Humanized failure, present iff the last request failed
    pub error: Option<String>,
}

pub fn project_estimator(
    input: &InputModel,
    state: &RequestLifecycleState<f64>,
    locale: Locale,
) -> EstimatorView {
    let fields = input
        .iter()
        .map(|(field, field_state)| FieldView {
            field,
            name: field.name(),
            label: field.label(),
            raw: field_state.raw.clone(),
            error: field_state.error.as_ref().map(ToString::to_string),
        })
        .collect();

    let loading = state.is_in_flight();
    let result = state.payload().copied();

    EstimatorView {
        fields,
        loading,
        submit_enabled: !loading && input.is_submittable(),
        submit_label: if loading { "Predicting…" } else { "Get Estimate" },
        result,
        result_text: result.map(|price| format_currency(price, locale)),
        error: state.failure().map(|reason| reason.to_error_message()),
    }
}

/// A single statistic card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// Everything the analysis view needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub loading: bool,
    /// Empty unless statistics have been received
    pub cards: Vec<StatCard>,
    pub error: Option<String>,
}

pub fn stat_cards(snapshot: &StatisticsSnapshot, locale: Locale) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Number of properties",
            value: snapshot.count.to_string(),
        },
        StatCard {
            title: "Average price",
            value: format_currency(snapshot.average_price, locale),
        },
        StatCard {
            title: "Minimum price",
            value: format_currency(snapshot.min_price, locale),
        },
        StatCard {
            title: "Maximum price",
            value: format_currency(snapshot.max_price, locale),
        },
    ]
}

pub fn project_analysis(
    state: &RequestLifecycleState<StatisticsSnapshot>,
    locale: Locale,
) -> AnalysisView {
    AnalysisView {
        loading: state.is_in_flight(),
        cards: state
            .payload()
            .map(|snapshot| stat_cards(snapshot, locale))
            .unwrap_or_default(),
        error: state.failure().map(|reason| reason.to_error_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lifecycle::{FailureReason, Generation};

    #[test]
    fn test_format_currency_en_us() {
        assert_eq!(format_currency(350_000.0, Locale::EnUs), "$350,000");
        assert_eq!(format_currency(2_500_000.0, Locale::EnUs), "$2,500,000");
        assert_eq!(format_currency(999.0, Locale::EnUs), "$999");
        assert_eq!(format_currency(1000.5, Locale::EnUs), "$1,000.5");
        assert_eq!(format_currency(1234.567, Locale::EnUs), "$1,234.57");
        assert_eq!(format_currency(0.0, Locale::EnUs), "$0");
        assert_eq!(format_currency(-1500.0, Locale::EnUs), "-$1,500");
    }

    #[test]
    fn test_format_currency_other_locales() {
        assert_eq!(format_currency(410_000.25, Locale::DeDe), "$410.000,25");
        assert_eq!(format_currency(95_000.0, Locale::FrFr), "$95\u{202f}000");
        assert_eq!(format_currency(95_000.0, Locale::EnGb), "$95,000");
    }

    #[test]
    fn test_format_never_panics_on_extremes() {
        assert_eq!(format_currency(f64::NAN, Locale::EnUs), UNAVAILABLE);
        assert_eq!(format_currency(f64::INFINITY, Locale::EnUs), UNAVAILABLE);
        assert!(format_currency(f64::MAX, Locale::EnUs).starts_with('$'));
        assert_eq!(format_currency(-0.001, Locale::EnUs), "$0");
    }

    #[test]
    fn test_project_estimator_states() {
        let input = InputModel::default();

        let idle = project_estimator(&input, &RequestLifecycleState::Idle, Locale::EnUs);
        assert!(!idle.loading && idle.submit_enabled);
        assert_eq!(idle.result, None);
        assert_eq!(idle.error, None);
        assert_eq!(idle.fields.len(), PropertyField::ALL.len());

        let in_flight = project_estimator(
            &input,
            &RequestLifecycleState::InFlight {
                generation: Generation(1),
            },
            Locale::EnUs,
        );
        assert!(in_flight.loading);
        assert!(!in_flight.submit_enabled);
        assert_eq!(in_flight.submit_label, "Predicting…");

        let succeeded = project_estimator(
            &input,
            &RequestLifecycleState::Succeeded(350_000.0),
            Locale::EnUs,
        );
        assert_eq!(succeeded.result, Some(350_000.0));
        assert_eq!(succeeded.result_text.as_deref(), Some("$350,000"));

        let failed = project_estimator(
            &input,
            &RequestLifecycleState::Failed(FailureReason::HttpFailure {
                status: 500,
                body: String::new(),
            }),
            Locale::EnUs,
        );
        assert_eq!(failed.result, None);
        assert!(!failed.error.unwrap().is_empty());
    }

    #[test]
    fn test_project_estimator_field_errors() {
        let mut input = InputModel::default();
        input.update(PropertyField::Bedrooms, "two");

        let view = project_estimator(&input, &RequestLifecycleState::Idle, Locale::EnUs);
        let bedrooms = view
            .fields
            .iter()
            .find(|f| f.field == PropertyField::Bedrooms)
            .unwrap();
        assert_eq!(bedrooms.raw, "two");
        assert_eq!(bedrooms.error.as_deref(), Some("Bedrooms must be a number"));
        assert!(!view.submit_enabled);
    }

    #[test]
    fn test_project_analysis_cards() {
        let snapshot = StatisticsSnapshot {
            count: 120,
            average_price: 410_000.0,
            min_price: 95_000.0,
            max_price: 2_500_000.0,
        };
        let view = project_analysis(&RequestLifecycleState::Succeeded(snapshot), Locale::EnUs);
        let values: Vec<&str> = view.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["120", "$410,000", "$95,000", "$2,500,000"]);
        assert!(!view.loading);
        assert_eq!(view.error, None);
    }
}
