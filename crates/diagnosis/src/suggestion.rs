//! Final suggestion text

use explanation::Explanation;
use severity::Classification;

/// Suggestion when nothing stands out
pub const ALL_NORMAL: &str = "All systems within normal range";

fn names(explanations: &[Explanation], status: Classification) -> Vec<&'static str> {
    explanations
        .iter()
        .filter(|e| e.status == status)
        .map(|e| e.feature.as_str())
        .collect()
}

/// Pick the suggestion: critical > warning > model anomaly > all normal.
/// Unknown channels never drive the outcome.
pub fn suggest(explanations: &[Explanation], ml_anomaly: bool) -> String {
    let critical = names(explanations, Classification::Critical);
    if !critical.is_empty() {
        return format!(
            "Critical: {} outside safe limits. Stop riding and have the motorcycle inspected",
            critical.join(", ")
        );
    }

    let warning = names(explanations, Classification::Warning);
    if !warning.is_empty() {
        return format!(
            "Warning: {} drifting outside the normal idle range. Schedule a maintenance check",
            warning.join(", ")
        );
    }

    if ml_anomaly {
        return "Unusual idle pattern detected for this motorcycle. \
                Keep monitoring and consider an inspection"
            .to_string();
    }

    ALL_NORMAL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::Channel;

    fn explanation(feature: Channel, status: Classification) -> Explanation {
        Explanation {
            feature,
            status,
            value: Some(1.0),
            severity_score: 0,
            description: "",
            tip: String::new(),
        }
    }

    #[test]
    fn test_precedence() {
        let mixed = vec![
            explanation(Channel::Rpm, Classification::Warning),
            explanation(Channel::CoolantTemp, Classification::Critical),
        ];
        let text = suggest(&mixed, true);
        assert!(text.starts_with("Critical: coolant_temp"));

        let warn = vec![explanation(Channel::Rpm, Classification::Warning)];
        assert!(suggest(&warn, true).starts_with("Warning: rpm"));

        let normal = vec![explanation(Channel::Rpm, Classification::Normal)];
        assert!(suggest(&normal, true).starts_with("Unusual idle pattern"));
        assert_eq!(suggest(&normal, false), ALL_NORMAL);
    }

    #[test]
    fn test_unknown_does_not_alert() {
        let explanations = vec![
            explanation(Channel::Rpm, Classification::Normal),
            explanation(Channel::ElmVoltage, Classification::Unknown),
        ];
        assert_eq!(suggest(&explanations, false), ALL_NORMAL);
    }
}
