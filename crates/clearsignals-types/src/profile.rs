use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{AnalysisResult, Ryg, Signal, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipHealth {
    Strong,
    Healthy,
    AtRisk,
    Damaged,
}

impl RelationshipHealth {
    pub fn from_avg_intent(avg: f64) -> Self {
        if avg >= 7.0 {
            Self::Strong
        } else if avg >= 5.0 {
            Self::Healthy
        } else if avg >= 3.0 {
            Self::AtRisk
        } else {
            Self::Damaged
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    /// Compares the last deal's intent with the first one
    pub fn from_intents(intents: &[u8]) -> Self {
        match (intents.first(), intents.last()) {
            (Some(first), Some(last)) if intents.len() >= 2 && last > first => Self::Improving,
            (Some(first), Some(last)) if intents.len() >= 2 && last < first => Self::Declining,
            _ => Self::Stable,
        }
    }
}

/// Communication profile aggregated over one user's analysed deals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationProfile {
    pub user_id: String,
    pub deal_count: usize,
    pub avg_intent: f64,
    pub avg_win_pct: f64,
    pub ryg_total: Ryg,
    pub total_signals: usize,
    pub cultural_violation_count: usize,
    pub competitive_mention_count: usize,
    pub relationship_health: RelationshipHealth,
    pub trend_direction: TrendDirection,
    #[serde(default)]
    pub deal_stages: BTreeMap<String, usize>,
    pub updated_at: DateTime<Utc>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[u8]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

/// Thread-level signals, or the per-message ones when the final list is empty
fn deal_signals(result: &AnalysisResult) -> Vec<&Signal> {
    if result.final_assessment.signals.is_empty() {
        result.per_message.iter().flat_map(|p| p.signals.iter()).collect()
    } else {
        result.final_assessment.signals.iter().collect()
    }
}

impl CommunicationProfile {
    /// Aggregate `results` in the order given (oldest deal first). `None` when empty.
    pub fn build(user_id: impl Into<String>, results: &[AnalysisResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let intents: Vec<u8> = results.iter().map(|r| r.final_assessment.intent).collect();
        let win_pcts: Vec<u8> = results.iter().map(|r| r.final_assessment.win_pct).collect();

        let signals: Vec<&Signal> = results.iter().flat_map(deal_signals).collect();

        let mut deal_stages = BTreeMap::new();
        for result in results {
            *deal_stages
                .entry(result.final_assessment.deal_stage.as_str().to_string())
                .or_insert(0) += 1;
        }

        let avg_intent = mean(&intents);

        Some(Self {
            user_id: user_id.into(),
            deal_count: results.len(),
            avg_intent: round1(avg_intent),
            avg_win_pct: round1(mean(&win_pcts)),
            ryg_total: results
                .iter()
                .map(|r| r.final_assessment.ryg)
                .fold(Ryg::default(), |acc, ryg| acc + ryg),
            total_signals: signals.len(),
            cultural_violation_count: signals.iter().filter(|s| s.is_cultural_violation()).count(),
            competitive_mention_count: signals
                .iter()
                .filter(|s| s.kind == SignalKind::Competitive)
                .count(),
            relationship_health: RelationshipHealth::from_avg_intent(avg_intent),
            trend_direction: TrendDirection::from_intents(&intents),
            deal_stages,
            updated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DealStage, FinalAssessment, Severity};

    fn result(intent: u8, win_pct: u8, stage: DealStage, signals: Vec<Signal>) -> AnalysisResult {
        AnalysisResult {
            contact_name: String::new(),
            company_name: String::new(),
            rep_name: String::new(),
            messages: Vec::new(),
            per_message: Vec::new(),
            final_assessment: FinalAssessment {
                intent,
                win_pct,
                deal_stage: stage,
                signals,
                ryg: Ryg { r: 1, y: 1, g: 2 },
                ..Default::default()
            },
        }
    }

    fn signal(kind: SignalKind, severity: Severity) -> Signal {
        Signal {
            kind,
            severity,
            description: String::new(),
            quote: String::new(),
        }
    }

    #[test]
    fn test_empty_history_has_no_profile() {
        assert!(CommunicationProfile::build("u1", &[]).is_none());
    }

    #[test]
    fn test_aggregates() {
        let results = vec![
            result(
                3,
                20,
                DealStage::Demo,
                vec![
                    signal(SignalKind::Cultural, Severity::Red),
                    signal(SignalKind::Cultural, Severity::Yellow),
                ],
            ),
            result(6, 55, DealStage::Proposal, vec![signal(SignalKind::Competitive, Severity::Yellow)]),
            result(8, 70, DealStage::Proposal, vec![]),
        ];

        let profile = CommunicationProfile::build("u1", &results).unwrap();
        assert_eq!(profile.deal_count, 3);
        assert_eq!(profile.avg_intent, 5.7);
        assert_eq!(profile.avg_win_pct, 48.3);
        assert_eq!(profile.ryg_total, Ryg { r: 3, y: 3, g: 6 });
        assert_eq!(profile.total_signals, 3);
        assert_eq!(profile.cultural_violation_count, 1);
        assert_eq!(profile.competitive_mention_count, 1);
        assert_eq!(profile.relationship_health, RelationshipHealth::Healthy);
        assert_eq!(profile.trend_direction, TrendDirection::Improving);
        assert_eq!(profile.deal_stages.get("proposal"), Some(&2));
    }

    #[test]
    fn test_huge_ryg_counts_do_not_overflow() {
        let mut heavy = result(5, 50, DealStage::Demo, vec![]);
        heavy.final_assessment.ryg = serde_json::from_str(r#"{"r": 4294967295}"#).unwrap();

        let profile = CommunicationProfile::build("u1", &[heavy.clone(), heavy]).unwrap();
        assert_eq!(profile.ryg_total.r, u32::MAX);
        assert_eq!(profile.ryg_total.total(), u32::MAX);
    }

    #[test]
    fn test_health_thresholds() {
        assert_eq!(RelationshipHealth::from_avg_intent(7.0), RelationshipHealth::Strong);
        assert_eq!(RelationshipHealth::from_avg_intent(5.0), RelationshipHealth::Healthy);
        assert_eq!(RelationshipHealth::from_avg_intent(3.0), RelationshipHealth::AtRisk);
        assert_eq!(RelationshipHealth::from_avg_intent(2.9), RelationshipHealth::Damaged);
    }

    #[test]
    fn test_trend_needs_two_deals() {
        assert_eq!(TrendDirection::from_intents(&[9]), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_intents(&[7, 2, 4]), TrendDirection::Declining);
        assert_eq!(TrendDirection::from_intents(&[4, 9, 4]), TrendDirection::Stable);
    }

    #[test]
    fn test_serializes_snake_case() {
        let profile = CommunicationProfile::build("u1", &[result(2, 10, DealStage::ClosedLost, vec![])]).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["relationship_health"], "damaged");
        assert_eq!(json["trend_direction"], "stable");
        assert_eq!(json["deal_stages"]["closed_lost"], 1);
    }
}
