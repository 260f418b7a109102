//! MessageCard payload for the webhook notification.

use super::{group_thousands, status_glyph, FAILURE_GLYPH};
use crate::models::{FleetReport, IndexReport, IndexStatus, InstanceResult, ProbeOutcome};
use serde::Serialize;

pub const CARD_TYPE: &str = "MessageCard";
pub const CARD_CONTEXT: &str = "http://schema.org/extensions";
pub const THEME_COLOR: &str = "0076D7";
pub const CARD_SUMMARY: &str = "RediSearch Index Statistics";
pub const CARD_TITLE: &str = "🔄 RediSearch Index Statistics";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "themeColor")]
    pub theme_color: String,
    pub summary: String,
    pub sections: Vec<CardSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSection {
    #[serde(rename = "activityTitle", skip_serializing_if = "Option::is_none", default)]
    pub activity_title: Option<String>,
    #[serde(rename = "activitySubtitle", skip_serializing_if = "Option::is_none", default)]
    pub activity_subtitle: Option<String>,
    pub facts: Vec<CardFact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardFact {
    pub name: String,
    pub value: String,
}

impl CardFact {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build the notification card: a header section, then one section per instance.
pub fn render_card(report: &FleetReport) -> MessageCard {
    let mut sections = Vec::with_capacity(report.results.len() + 1);
    sections.push(CardSection {
        activity_title: Some(CARD_TITLE.to_string()),
        activity_subtitle: None,
        facts: vec![
            CardFact::new("Build Number", report.build_number.clone()),
            CardFact::new(
                "Timestamp",
                report.generated_at.format(TIMESTAMP_FORMAT).to_string(),
            ),
        ],
    });
    sections.extend(report.results.iter().map(instance_section));

    MessageCard {
        card_type: CARD_TYPE.to_string(),
        context: CARD_CONTEXT.to_string(),
        theme_color: THEME_COLOR.to_string(),
        summary: CARD_SUMMARY.to_string(),
        sections,
    }
}

fn instance_section(result: &InstanceResult) -> CardSection {
    let mut facts = vec![CardFact::new(
        "Execution Time",
        format!("{:.2}s", result.elapsed_secs),
    )];

    match &result.outcome {
        ProbeOutcome::Error { message, .. } => {
            facts.push(CardFact::new("Status", format!("{FAILURE_GLYPH} {message}")));
        }
        ProbeOutcome::Success { indexes } => {
            facts.extend(indexes.iter().map(index_fact));
        }
    }

    CardSection {
        activity_title: None,
        activity_subtitle: Some(result.label.clone()),
        facts,
    }
}

fn index_fact(index: &IndexReport) -> CardFact {
    let glyph = status_glyph(index.status.is_active());
    let value = match &index.status {
        IndexStatus::Active(stats) => format!(
            "{glyph} Documents: {}\nMemory Usage: {}MB\nIndexing Failures: {}",
            group_thousands(stats.num_docs),
            stats.memory_used_mb,
            stats.indexing_failures
        ),
        other => format!("{glyph} {}", other.describe()),
    };
    CardFact::new(index.name.clone(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndexStats, InstanceErrorKind, Metric};
    use chrono::{Local, TimeZone};

    fn report() -> FleetReport {
        FleetReport {
            build_number: "42".into(),
            generated_at: Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap(),
            results: vec![
                InstanceResult {
                    label: "Redis Instance 1 (a)".into(),
                    outcome: ProbeOutcome::Success {
                        indexes: vec![IndexReport {
                            name: "POI Index".into(),
                            index: "poi-idx".into(),
                            status: IndexStatus::Active(IndexStats {
                                num_docs: 25000,
                                total_indexing_time_secs: 0.25,
                                memory_used_mb: Metric::Text("3.5".into()),
                                indexing_failures: 2,
                            }),
                        }],
                    },
                    elapsed_secs: 0.1234,
                },
                InstanceResult {
                    label: "Redis Instance 2 (b)".into(),
                    outcome: ProbeOutcome::Error {
                        kind: InstanceErrorKind::AuthFailure,
                        message: "Authentication failed".into(),
                    },
                    elapsed_secs: 1.0,
                },
            ],
            total_elapsed_secs: 1.2,
        }
    }

    #[test]
    fn test_card_envelope() {
        let json = serde_json::to_value(render_card(&report())).unwrap();
        assert_eq!(json["@type"], "MessageCard");
        assert_eq!(json["@context"], "http://schema.org/extensions");
        assert_eq!(json["themeColor"], "0076D7");
        assert_eq!(json["summary"], "RediSearch Index Statistics");
        assert_eq!(json["sections"].as_array().unwrap().len(), 3);
        assert!(json["sections"][0].get("activitySubtitle").is_none());
    }

    #[test]
    fn test_header_facts() {
        let card = render_card(&report());
        let header = &card.sections[0];
        assert_eq!(header.facts[0], CardFact::new("Build Number", "42"));
        assert_eq!(header.facts[1], CardFact::new("Timestamp", "2024-03-05 07:08:09"));
    }

    #[test]
    fn test_instance_sections() {
        let card = render_card(&report());
        let ok = &card.sections[1];
        assert_eq!(ok.activity_subtitle.as_deref(), Some("Redis Instance 1 (a)"));
        assert_eq!(ok.facts[0].value, "0.12s");
        assert_eq!(
            ok.facts[1].value,
            "✅ Documents: 25,000\nMemory Usage: 3.5MB\nIndexing Failures: 2"
        );

        let failed = &card.sections[2];
        assert_eq!(failed.facts.len(), 2);
        assert_eq!(failed.facts[1], CardFact::new("Status", "❌ Authentication failed"));
    }
}
