use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderId;

/// Loyalty accounts are keyed by the customer's email, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerKey(String);

impl CustomerKey {
    pub fn parse(email: &str) -> Option<Self> {
        let normalized = email.trim().to_lowercase();
        let (local, domain) = normalized.split_once('@')?;
        (!local.is_empty() && !domain.is_empty()).then_some(Self(normalized))
    }

    /// Key the loyalty store falls back to if it is ever asked to invent one.
    /// Accounts are always addressed by a customer's email instead.
    pub fn unassigned() -> Self {
        Self("unassigned@localhost".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CustomerKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid customer email '{value}'"))
    }
}

impl From<CustomerKey> for String {
    fn from(key: CustomerKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Accrual,
    Redemption,
}

/// One immutable balance movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub kind: LedgerEntryKind,
    pub points: u64,
    pub balance_before: u64,
    pub balance_after: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyAccount {
    pub customer: CustomerKey,
    pub balance: u64,
    pub entries: Vec<LedgerEntry>,
}

impl LoyaltyAccount {
    pub fn empty(customer: CustomerKey) -> Self {
        Self { customer, balance: 0, entries: Vec::new() }
    }

    pub fn total_earned(&self) -> u64 {
        self.total_of(LedgerEntryKind::Accrual)
    }

    pub fn total_redeemed(&self) -> u64 {
        self.total_of(LedgerEntryKind::Redemption)
    }

    /// The entry of `kind` already recorded for `order_id`, if any.
    pub fn entry_for_order(&self, kind: LedgerEntryKind, order_id: &OrderId) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind && entry.order_id.as_ref() == Some(order_id))
    }

    pub fn summary(&self) -> LoyaltySummary {
        LoyaltySummary {
            customer: self.customer.clone(),
            balance: self.balance,
            total_earned: self.total_earned(),
            total_redeemed: self.total_redeemed(),
            entries: self.entries.clone(),
        }
    }

    fn total_of(&self, kind: LedgerEntryKind) -> u64 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.points)
            .sum()
    }
}

/// Read model for the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltySummary {
    pub customer: CustomerKey,
    pub balance: u64,
    pub total_earned: u64,
    pub total_redeemed: u64,
    pub entries: Vec<LedgerEntry>,
}

/// Outcome of an accrue or redeem call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReceipt {
    pub balance: u64,
    /// Points moved by the entry this call refers to.
    pub points: u64,
    /// True when an entry for the same order already existed and nothing changed.
    pub replayed: bool,
}
