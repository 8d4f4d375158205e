use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;

pub const SNIPPET_CHARS: usize = 160;

/// Which side of the deal sent a message. Inferred by the model; best-effort only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Inbound,
    Outbound,
}

impl Direction {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "inbound" | "in" | "received" | "buyer" | "prospect" => Some(Direction::Inbound),
            "outbound" | "out" | "sent" | "rep" | "seller" => Some(Direction::Outbound),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(lenient::tag(d)?
            .and_then(|t| Direction::parse(&t))
            .unwrap_or_default())
    }
}

/// One cleaned email inside a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    #[serde(default, alias = "email_num", deserialize_with = "lenient::ordinal")]
    pub index: usize,
    #[serde(rename = "from", alias = "sender", default, deserialize_with = "lenient::string")]
    pub sender: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, alias = "cleaned_body", alias = "text", deserialize_with = "lenient::string")]
    pub body: String,
}

impl ThreadMessage {
    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            index: self.index,
            sender: self.sender.clone(),
            date: self.date.clone(),
            snippet: snippet(&self.body, SNIPPET_CHARS),
            direction: self.direction,
        }
    }
}

/// A segmented thread: ordered messages (oldest first) plus the parties involved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default, alias = "contact", deserialize_with = "lenient::string")]
    pub contact_name: String,
    #[serde(default, alias = "company", deserialize_with = "lenient::string")]
    pub company_name: String,
    #[serde(default, alias = "rep", deserialize_with = "lenient::string")]
    pub rep_name: String,
    #[serde(rename = "emails", alias = "messages", default)]
    pub messages: Vec<ThreadMessage>,
}

impl Thread {
    /// Rewrite ordinals to 1..=N in the order given, so `index` always equals position
    pub fn renumber(&mut self) {
        for (position, message) in self.messages.iter_mut().enumerate() {
            message.index = position + 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Numbered transcript handed to the analyzer stage
    pub fn transcript(&self) -> String {
        let total = self.messages.len();
        self.messages
            .iter()
            .map(|m| {
                format!(
                    "EMAIL {} of {}\nFrom: {}\nDate: {}\nDirection: {}\n\n{}\n",
                    m.index,
                    total,
                    if m.sender.is_empty() { "unknown" } else { &m.sender },
                    m.date.as_deref().unwrap_or("unknown"),
                    m.direction.as_str(),
                    m.body.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n\n")
    }
}

/// Short per-message view carried in the canonical result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    #[serde(default, alias = "email_num", deserialize_with = "lenient::ordinal")]
    pub index: usize,
    #[serde(rename = "from", alias = "sender", default, deserialize_with = "lenient::string")]
    pub sender: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, alias = "body", deserialize_with = "lenient::string")]
    pub snippet: String,
    #[serde(default)]
    pub direction: Direction,
}

/// First `max_chars` characters of `text` with whitespace collapsed, `…` appended when cut
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", collapsed[..cut].trim_end()),
        None => collapsed,
    }
}
