use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;
use crate::thread::{MessageSummary, Thread};

pub const MAX_NEXT_TIME: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Intent,
    Cultural,
    Competitive,
    Formality,
    Drift,
    #[default]
    Other,
}

impl SignalKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "intent" => SignalKind::Intent,
            "cultural" | "culture" => SignalKind::Cultural,
            "competitive" | "competitor" | "competition" => SignalKind::Competitive,
            "formality" => SignalKind::Formality,
            "drift" => SignalKind::Drift,
            _ => SignalKind::Other,
        }
    }
}

impl<'de> Deserialize<'de> for SignalKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(lenient::tag(d)?
            .map(|t| SignalKind::parse(&t))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Red,
    #[default]
    Yellow,
    Green,
}

impl Severity {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "red" | "r" | "high" => Some(Severity::Red),
            "yellow" | "y" | "amber" | "medium" => Some(Severity::Yellow),
            "green" | "g" | "low" => Some(Severity::Green),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(lenient::tag(d)?
            .and_then(|t| Severity::parse(&t))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: SignalKind,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub quote: String,
}

impl Signal {
    pub fn is_cultural_violation(&self) -> bool {
        self.kind == SignalKind::Cultural && self.severity == Severity::Red
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coaching {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub good: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub better: Option<String>,
}

impl Coaching {
    pub fn is_empty(&self) -> bool {
        self.good.is_none() && self.better.is_none()
    }
}

fn coaching<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Coaching>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(serde_json::from_value::<Coaching>(value)
        .ok()
        .filter(|c| !c.is_empty()))
}

/// Scores for one message, keyed by its 1-based ordinal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerMessageAnalysis {
    #[serde(default, alias = "email_num", deserialize_with = "lenient::ordinal")]
    pub index: usize,
    #[serde(default = "lenient::default_intent", deserialize_with = "lenient::intent")]
    pub intent: u8,
    #[serde(default = "lenient::default_win_pct", deserialize_with = "lenient::win_pct")]
    pub win_pct: u8,
    #[serde(default, deserialize_with = "lenient::list")]
    pub signals: Vec<Signal>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(default, deserialize_with = "coaching", skip_serializing_if = "Option::is_none")]
    pub coaching: Option<Coaching>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub pivotal: Option<String>,
}

/// Cumulative red / yellow / green counts over the whole thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ryg {
    #[serde(default, alias = "red", deserialize_with = "lenient::count")]
    pub r: u32,
    #[serde(default, alias = "yellow", deserialize_with = "lenient::count")]
    pub y: u32,
    #[serde(default, alias = "green", deserialize_with = "lenient::count")]
    pub g: u32,
}

impl Ryg {
    pub fn total(&self) -> u32 {
        self.r.saturating_add(self.y).saturating_add(self.g)
    }
}

impl std::ops::Add for Ryg {
    type Output = Ryg;

    fn add(self, other: Ryg) -> Ryg {
        Ryg {
            r: self.r.saturating_add(other.r),
            y: self.y.saturating_add(other.y),
            g: self.g.saturating_add(other.g),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Prospecting,
    Qualification,
    Demo,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
    #[default]
    NoDecision,
}

impl DealStage {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "prospecting" => DealStage::Prospecting,
            "qualification" | "qualifying" => DealStage::Qualification,
            "demo" => DealStage::Demo,
            "proposal" => DealStage::Proposal,
            "negotiation" => DealStage::Negotiation,
            "closed_won" | "won" => DealStage::ClosedWon,
            "closed_lost" | "lost" => DealStage::ClosedLost,
            _ => DealStage::NoDecision,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Prospecting => "prospecting",
            DealStage::Qualification => "qualification",
            DealStage::Demo => "demo",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed_won",
            DealStage::ClosedLost => "closed_lost",
            DealStage::NoDecision => "no_decision",
        }
    }
}

impl<'de> Deserialize<'de> for DealStage {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(lenient::tag(d)?
            .map(|t| DealStage::parse(&t))
            .unwrap_or_default())
    }
}

/// A "what to do differently" note pinned to a message ordinal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextTime {
    #[serde(default, alias = "email_num", deserialize_with = "lenient::ordinal")]
    pub at_email: usize,
    #[serde(default, deserialize_with = "lenient::string")]
    pub suggestion: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub why: String,
}

fn next_time<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NextTime>, D::Error> {
    let mut entries = Option::<Vec<NextTime>>::deserialize(d)?.unwrap_or_default();
    entries.truncate(MAX_NEXT_TIME);
    Ok(entries)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAssessment {
    #[serde(default, deserialize_with = "lenient::list")]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub ryg: Ryg,
    #[serde(default = "lenient::default_intent", deserialize_with = "lenient::intent")]
    pub intent: u8,
    #[serde(default = "lenient::default_win_pct", deserialize_with = "lenient::win_pct")]
    pub win_pct: u8,
    #[serde(default, deserialize_with = "lenient::string")]
    pub coach: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub next_steps: String,
    #[serde(default)]
    pub deal_stage: DealStage,
    #[serde(default, deserialize_with = "next_time")]
    pub next_time: Vec<NextTime>,
}

impl Default for FinalAssessment {
    fn default() -> Self {
        Self {
            signals: Vec::new(),
            ryg: Ryg::default(),
            intent: lenient::DEFAULT_INTENT,
            win_pct: lenient::DEFAULT_WIN_PCT,
            coach: String::new(),
            summary: String::new(),
            next_steps: String::new(),
            deal_stage: DealStage::default(),
            next_time: Vec::new(),
        }
    }
}

/// Stage-2 output: one entry per message plus the thread-level verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAnalysis {
    #[serde(rename = "per_email", alias = "per_message", default, deserialize_with = "lenient::list")]
    pub per_message: Vec<PerMessageAnalysis>,
    #[serde(rename = "final")]
    pub final_assessment: FinalAssessment,
}

/// Canonical merged output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient::string")]
    pub contact_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rep_name: String,
    #[serde(rename = "emails", alias = "messages", default, deserialize_with = "lenient::list")]
    pub messages: Vec<MessageSummary>,
    #[serde(rename = "per_email", alias = "per_message", default, deserialize_with = "lenient::list")]
    pub per_message: Vec<PerMessageAnalysis>,
    #[serde(rename = "final")]
    pub final_assessment: FinalAssessment,
}

impl AnalysisResult {
    pub fn merge(thread: &Thread, analysis: DealAnalysis) -> Self {
        Self {
            contact_name: thread.contact_name.clone(),
            company_name: thread.company_name.clone(),
            rep_name: thread.rep_name.clone(),
            messages: thread.messages.iter().map(|m| m.summary()).collect(),
            per_message: analysis.per_message,
            final_assessment: analysis.final_assessment,
        }
    }

    pub fn email_count(&self) -> usize {
        self.messages.len()
    }

    pub fn analysis_count(&self) -> usize {
        self.per_message.len()
    }

    pub fn is_complete(&self) -> bool {
        self.email_count() == self.analysis_count()
    }

    /// Text used as the deal's similarity fingerprint.
    ///
    /// The final summary when the model wrote one, otherwise the parties,
    /// deal stage and per-message summaries. Never blank.
    pub fn fingerprint(&self) -> String {
        let summary = self.final_assessment.summary.trim();
        if !summary.is_empty() {
            return summary.to_string();
        }

        let mut parts: Vec<String> = Vec::new();
        let parties = [self.contact_name.trim(), self.company_name.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" at ");
        if !parties.is_empty() {
            parts.push(parties);
        }
        parts.push(format!("Deal stage {}", self.final_assessment.deal_stage.as_str()));
        parts.extend(
            self.per_message
                .iter()
                .map(|p| p.summary.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        parts.join("\n")
    }
}
