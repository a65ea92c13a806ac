//! Explorer domain records
//!
//! Records returned by the explorer API plus the identifiers and filters
//! used to request them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ApiError;

/// Address prefix used by the explorer routes
pub const ACCOUNT_PREFIX: &str = "nano_";

/// Legacy address prefix, still accepted on input
const LEGACY_PREFIX: &str = "xrb_";

// ============================================
// Identifiers and filters
// ============================================

/// Normalized account address (`nano_...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Parse an address as it appears in a route or on the command line.
    ///
    /// Routes carry the address without its prefix, so a bare address gets
    /// `nano_` prepended. `xrb_` addresses are rewritten to `nano_`.
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let trimmed = input.trim();
        let bare = trimmed
            .strip_prefix(ACCOUNT_PREFIX)
            .or_else(|| trimmed.strip_prefix(LEGACY_PREFIX))
            .unwrap_or(trimmed);

        if bare.is_empty() {
            return Err(ApiError::Validation("empty account address".to_string()));
        }
        if !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ApiError::Validation(format!(
                "invalid account address: {}",
                trimmed
            )));
        }

        Ok(Self(format!("{}{}", ACCOUNT_PREFIX, bare.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address without the `nano_` prefix, as used in page routes
    pub fn route_address(&self) -> &str {
        self.0.strip_prefix(ACCOUNT_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Block categories summarized on the account page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Send,
    Receive,
    Change,
}

impl BlockType {
    pub const ALL: [BlockType; 3] = [BlockType::Send, BlockType::Receive, BlockType::Change];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Send => "send",
            BlockType::Receive => "receive",
            BlockType::Change => "change",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "send" => Ok(BlockType::Send),
            "receive" => Ok(BlockType::Receive),
            "change" => Ok(BlockType::Change),
            other => Err(ApiError::Validation(format!("unknown block type: {}", other))),
        }
    }
}

/// Post age window, in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeWindow(u32);

impl AgeWindow {
    pub const HOURS_36: AgeWindow = AgeWindow(36);
    pub const DAYS_3: AgeWindow = AgeWindow(72);
    pub const DAYS_7: AgeWindow = AgeWindow(168);
    pub const DAYS_14: AgeWindow = AgeWindow(336);
    pub const DAYS_30: AgeWindow = AgeWindow(720);

    pub fn from_hours(hours: u32) -> Self {
        Self(hours)
    }

    pub fn hours(&self) -> u32 {
        self.0
    }
}

/// Post feed identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedId {
    Top,
    Announcements,
    Named(String),
}

impl FeedId {
    pub fn as_str(&self) -> &str {
        match self {
            FeedId::Top => "top",
            FeedId::Announcements => "announcements",
            FeedId::Named(name) => name,
        }
    }

    /// Age windows offered by the feed's selector, with their labels
    ///
    /// Announcements use a shorter "3D" window than the top feed.
    pub fn age_options(&self) -> &'static [(AgeWindow, &'static str)] {
        match self {
            FeedId::Top => &[
                (AgeWindow::DAYS_3, "3D"),
                (AgeWindow::DAYS_7, "7D"),
                (AgeWindow::DAYS_30, "1M"),
            ],
            FeedId::Announcements => &[
                (AgeWindow::HOURS_36, "3D"),
                (AgeWindow::DAYS_7, "7D"),
                (AgeWindow::DAYS_14, "14D"),
                (AgeWindow::DAYS_30, "1M"),
            ],
            FeedId::Named(_) => &[],
        }
    }

    /// Label for an age window of this feed, if the feed offers it
    pub fn age_label(&self, age: AgeWindow) -> Option<&'static str> {
        self.age_options()
            .iter()
            .find(|(window, _)| *window == age)
            .map(|(_, label)| *label)
    }
}

impl From<&str> for FeedId {
    fn from(s: &str) -> Self {
        match s {
            "top" => FeedId::Top,
            "announcements" => FeedId::Announcements,
            other => FeedId::Named(other.to_string()),
        }
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional filters attached to a load request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub age: Option<AgeWindow>,
    pub label: Option<String>,
}

impl Filters {
    pub fn age(mut self, age: AgeWindow) -> Self {
        self.age = Some(age);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Query string pairs for the filters that are set
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(age) = self.age {
            pairs.push(("age", age.hours().to_string()));
        }
        if let Some(label) = &self.label {
            pairs.push(("label", label.clone()));
        }
        pairs
    }
}

// ============================================
// Records
// ============================================

/// Account record, the primary entity of the account page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Whether the account is a representative
    #[serde(default)]
    pub representative: bool,
    #[serde(default)]
    pub account_meta: AccountMeta,
    /// Latest telemetry report (representatives only)
    #[serde(default)]
    pub telemetry: Option<Telemetry>,
    #[serde(default)]
    pub telemetry_history: Vec<Telemetry>,
}

impl Account {
    /// Placeholder for an address the backend has never seen
    pub fn unopened(id: &AccountId) -> Self {
        Self {
            account: id.to_string(),
            ..Self::default()
        }
    }

    pub fn is_opened(&self) -> bool {
        self.account_meta.block_count > 0
    }
}

/// Ledger metadata of an account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountMeta {
    /// Balance in raw, as a decimal string
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub block_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub confirmation_height: u64,
    #[serde(default)]
    pub weight: Option<String>,
    /// Representative this account delegates to
    #[serde(default)]
    pub representative: Option<String>,
}

/// Opening information of an account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountOpen {
    #[serde(default)]
    pub open_timestamp: Option<i64>,
    #[serde(default)]
    pub open_balance: Option<String>,
    #[serde(default)]
    pub open_representative: Option<String>,
    #[serde(default)]
    pub open_block: Option<String>,
}

/// Per-counterparty summary of one block category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlocksSummary {
    pub block_type: BlockType,
    pub entries: Vec<SummaryEntry>,
}

impl BlocksSummary {
    pub fn empty(block_type: BlockType) -> Self {
        Self {
            block_type,
            entries: Vec::new(),
        }
    }

    /// Total number of blocks across all counterparties
    pub fn block_count(&self) -> u64 {
        self.entries.iter().map(|e| e.block_count).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub destination_account: String,
    #[serde(default)]
    pub destination_alias: Option<String>,
    #[serde(default)]
    pub total_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub block_count: u64,
    #[serde(default)]
    pub first_timestamp: Option<i64>,
    #[serde(default)]
    pub last_timestamp: Option<i64>,
}

/// Node telemetry sample reported by a representative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cemented_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cemented_behind: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub block_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub block_behind: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub unchecked_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub peer_count: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub account_count: u64,
}

/// Entry of the representatives list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub account: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Voting weight in raw, as a decimal string
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_online: Option<i64>,
}

/// Post shown in a feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub score: i64,
    /// Creation time, seconds since epoch
    #[serde(default)]
    pub created_at: i64,
}

/// Accept counters encoded either as JSON numbers or numeric strings.
///
/// The node RPC reports most counters as strings; `null` reads as zero.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match Option::<NumOrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumOrString::Num(n)) => Ok(n),
        Some(NumOrString::Str(s)) if s.trim().is_empty() => Ok(0),
        Some(NumOrString::Str(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
