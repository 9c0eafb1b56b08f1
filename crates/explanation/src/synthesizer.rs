//! Explanation Synthesizer
//!
//! Summarises each channel over the cleaned window: mean, classification,
//! severity score, the direction of the deviation, and a maintenance tip
//! prefixed with a severity banner.

use crate::catalog::tips;
use feature_engine::StatisticalFeatures;
use serde::Serialize;
use severity::{round2, Assessment, Classification, SeverityClassifier};
use telemetry::{Channel, SampleRow};
use tracing::{debug, warn};

/// Side of the normal band a channel leans toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
}

/// Banner prefixed to every tip
pub fn banner(classification: Classification) -> &'static str {
    match classification {
        Classification::Critical => "[CRITICAL]",
        Classification::Warning => "[WARNING]",
        Classification::Normal => "[NORMAL]",
        Classification::Unknown => "[UNKNOWN]",
    }
}

/// Explanation entry for one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub feature: Channel,
    pub status: Classification,
    /// Window mean, two decimals; `None` when the channel never reported
    pub value: Option<f64>,
    pub severity_score: i32,
    pub description: &'static str,
    pub tip: String,
}

impl Explanation {
    /// Anything other than normal, including unknown
    pub fn is_abnormal(&self) -> bool {
        self.status != Classification::Normal
    }
}

/// Builds per-channel explanations for one vehicle model
pub struct ExplanationSynthesizer<'a> {
    classifier: &'a SeverityClassifier,
    brand: &'a str,
    model: &'a str,
}

impl<'a> ExplanationSynthesizer<'a> {
    pub fn new(classifier: &'a SeverityClassifier, brand: &'a str, model: &'a str) -> Self {
        Self {
            classifier,
            brand,
            model,
        }
    }

    /// Direction of a channel mean. Trim channels use the sign, others
    /// compare with the middle of the normal band; "high" when no range exists.
    pub fn direction(&self, channel: Channel, mean: f64) -> Direction {
        let high = if channel.is_zero_centered() {
            mean > 0.0
        } else {
            match self.classifier.range(self.brand, self.model, channel) {
                Some(range) => mean > range.midpoint(),
                None => true,
            }
        };
        if high {
            Direction::High
        } else {
            Direction::Low
        }
    }

    /// Explain a single channel
    pub fn explain_channel(&self, rows: &[SampleRow], channel: Channel) -> Explanation {
        let entry = tips(channel);

        let Some(mean) = StatisticalFeatures::channel_mean(rows, channel) else {
            debug!("No values for {} in window", channel);
            return Explanation {
                feature: channel,
                status: Classification::Unknown,
                value: None,
                severity_score: Assessment::unknown().score,
                description: entry.description,
                tip: format!(
                    "{} No {} readings in this window",
                    banner(Classification::Unknown),
                    channel
                ),
            };
        };

        let assessment = self.classifier.assess(self.brand, self.model, channel, mean);
        if assessment.classification == Classification::Unknown {
            warn!(
                "No reference range for {}/{}/{}; reporting as unknown",
                self.brand, self.model, channel
            );
        }

        let text = match self.direction(channel, mean) {
            Direction::High => entry.high_tip,
            Direction::Low => entry.low_tip,
        };

        Explanation {
            feature: channel,
            status: assessment.classification,
            value: Some(round2(mean)),
            severity_score: assessment.score,
            description: entry.description,
            tip: format!("{} {}", banner(assessment.classification), text),
        }
    }

    /// Explain every channel in canonical order
    pub fn explain(&self, rows: &[SampleRow]) -> Vec<Explanation> {
        Channel::ALL
            .iter()
            .map(|&channel| self.explain_channel(rows, channel))
            .collect()
    }
}

/// Channels whose explanation is not normal, in canonical order
pub fn abnormal_features(explanations: &[Explanation]) -> Vec<Channel> {
    explanations
        .iter()
        .filter(|e| e.is_abnormal())
        .map(|e| e.feature)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use severity::{ReferenceRange, ReferenceTable};
    use std::sync::Arc;

    fn range(bounds: [f64; 4]) -> ReferenceRange {
        ReferenceRange::new(bounds[0], bounds[1], bounds[2], bounds[3]).unwrap()
    }

    fn classifier() -> SeverityClassifier {
        let table = ReferenceTable::empty()
            .with_range("honda", "click", Channel::Rpm, range([1300.0, 1700.0, 1000.0, 2000.0]))
            .with_range("honda", "click", Channel::CoolantTemp, range([60.0, 90.0, 40.0, 100.0]))
            .with_range("honda", "click", Channel::LongFuelTrim1, range([-5.0, 5.0, -10.0, 10.0]));
        SeverityClassifier::new(Arc::new(table))
    }

    fn window(coolant: f64, trim: f64) -> Vec<SampleRow> {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        (0..10)
            .map(|i| {
                SampleRow::from_values(
                    base + Duration::seconds(i * 5),
                    [1500.0, 20.0, 2.5, trim, coolant, 13.8],
                )
            })
            .collect()
    }

    #[test]
    fn test_warning_coolant() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "Honda", "Click");
        let e = synth.explain_channel(&window(95.0, 0.0), Channel::CoolantTemp);

        assert_eq!(e.status, Classification::Warning);
        assert_eq!(e.severity_score, 50);
        assert_eq!(e.value, Some(95.0));
        assert!(e.tip.starts_with("[WARNING]"));
        assert!(e.tip.contains("running hot"));
    }

    #[test]
    fn test_critical_coolant() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "honda", "click");
        let e = synth.explain_channel(&window(102.0, 0.0), Channel::CoolantTemp);

        assert_eq!(e.status, Classification::Critical);
        assert_eq!(e.severity_score, 100);
        assert!(e.tip.starts_with("[CRITICAL]"));
    }

    #[test]
    fn test_trim_direction_uses_sign() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "honda", "click");
        assert_eq!(synth.direction(Channel::LongFuelTrim1, 0.5), Direction::High);
        assert_eq!(synth.direction(Channel::LongFuelTrim1, -0.5), Direction::Low);

        let e = synth.explain_channel(&window(80.0, -7.0), Channel::LongFuelTrim1);
        assert_eq!(e.status, Classification::Warning);
        assert!(e.tip.contains("running rich"));
    }

    #[test]
    fn test_midpoint_direction() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "honda", "click");
        assert_eq!(synth.direction(Channel::CoolantTemp, 74.0), Direction::Low);
        assert_eq!(synth.direction(Channel::CoolantTemp, 76.0), Direction::High);
        // no range configured
        assert_eq!(synth.direction(Channel::ElmVoltage, 1.0), Direction::High);
    }

    #[test]
    fn test_missing_reference_is_unknown_and_abnormal() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "acme", "x1");
        let explanations = synth.explain(&window(80.0, 0.0));

        assert_eq!(explanations.len(), Channel::ALL.len());
        let voltage = &explanations[Channel::ElmVoltage.index()];
        assert_eq!(voltage.status, Classification::Unknown);
        assert_eq!(voltage.severity_score, -1);
        assert!(voltage.tip.starts_with("[UNKNOWN]"));
        assert_eq!(abnormal_features(&explanations).len(), Channel::ALL.len());
    }

    #[test]
    fn test_channel_without_values() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "honda", "click");
        let mut rows = window(80.0, 0.0);
        for row in &mut rows {
            row.set(Channel::ElmVoltage, None);
        }

        let e = synth.explain_channel(&rows, Channel::ElmVoltage);
        assert_eq!(e.value, None);
        assert_eq!(e.status, Classification::Unknown);
        assert_eq!(e.severity_score, -1);

        let json = serde_json::to_value(&e).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["feature"], "elm_voltage");
        assert_eq!(json["status"], "unknown");
    }

    #[test]
    fn test_normal_channels() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "honda", "click");
        let explanations = synth.explain(&window(80.0, 1.0));
        let abnormal = abnormal_features(&explanations);

        assert!(!abnormal.contains(&Channel::Rpm));
        assert!(!abnormal.contains(&Channel::CoolantTemp));
        assert!(!abnormal.contains(&Channel::LongFuelTrim1));
        // engine_load, throttle_pos and elm_voltage have no range
        assert_eq!(abnormal.len(), 3);
        assert!(explanations[0].tip.starts_with("[NORMAL]"));
    }

    #[test]
    fn test_normal_tip_follows_direction() {
        let classifier = classifier();
        let synth = ExplanationSynthesizer::new(&classifier, "honda", "click");

        let warm = synth.explain_channel(&window(80.0, 0.0), Channel::CoolantTemp);
        assert_eq!(warm.status, Classification::Normal);
        assert_eq!(warm.tip, format!("[NORMAL] {}", tips(Channel::CoolantTemp).high_tip));

        let cool = synth.explain_channel(&window(70.0, 0.0), Channel::CoolantTemp);
        assert_eq!(cool.status, Classification::Normal);
        assert_eq!(cool.tip, format!("[NORMAL] {}", tips(Channel::CoolantTemp).low_tip));
    }
}
