//! Transaction graph primitives
//!
//! A scenario graph is made of two kinds of records:
//! - [`TransactionNode`]: a synthetic actor (wallet, shell company, mixer pool)
//! - [`TransactionEdge`]: a single transfer between two actors
//!
//! CRITICAL: All money values are i64 minor units (cents, satoshis, gwei...).
//! Forwarded fractions are basis points (10_000 = 100%).
//!
//! A transfer debits the sender `amount + fee`; the receiver is credited
//! `amount`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::jurisdiction::Jurisdiction;

/// Basis points representing 100%
pub const FULL_BPS: u32 = 10_000;

/// Structural role of a node in the laundering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Origin of the funds
    Source,
    /// Any hop between origin and destination
    Intermediary,
    /// Final destination of the funds
    Sink,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Source => "source",
            NodeRole::Intermediary => "intermediary",
            NodeRole::Sink => "sink",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A synthetic actor in the transaction graph
///
/// # Example
/// ```
/// use scenario_forge_core_rs::models::{NodeRole, TransactionNode};
///
/// let node = TransactionNode::new("n0000", NodeRole::Source, "origin", "0xabc");
/// assert_eq!(node.role(), NodeRole::Source);
/// assert!(node.jurisdiction().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionNode {
    /// Unique node identifier (zero-padded, creation order)
    id: String,

    /// Structural role
    role: NodeRole,

    /// Name of the template slot that produced this node
    slot: String,

    /// Jurisdiction tag, assigned by the label attacher
    jurisdiction: Option<Jurisdiction>,

    /// Synthetic actor identifier (address-like)
    actor: String,
}

impl TransactionNode {
    pub fn new(id: &str, role: NodeRole, slot: &str, actor: &str) -> Self {
        Self {
            id: id.to_string(),
            role,
            slot: slot.to_string(),
            jurisdiction: None,
            actor: actor.to_string(),
        }
    }

    /// Builder-style jurisdiction assignment
    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    pub(crate) fn set_jurisdiction(&mut self, jurisdiction: Jurisdiction) {
        self.jurisdiction = Some(jurisdiction);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn jurisdiction(&self) -> Option<&Jurisdiction> {
        self.jurisdiction.as_ref()
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Shortened actor id for prose (`0x1234abcd…`)
    pub fn short_actor(&self) -> String {
        if self.actor.chars().count() > 10 {
            let head: String = self.actor.chars().take(10).collect();
            format!("{}…", head)
        } else {
            self.actor.clone()
        }
    }
}

/// A single transfer between two nodes
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use scenario_forge_core_rs::models::TransactionEdge;
///
/// let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let edge = TransactionEdge::new("tx0000", "n0000", "n0001", 50_000, "ETH", "ethereum", ts)
///     .with_forward_bps(9_200)
///     .with_fee(150);
/// assert_eq!(edge.amount(), 50_000);
/// assert_eq!(edge.debited(), 50_150);
/// assert_eq!(edge.forward_bps(), 9_200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEdge {
    /// Unique transfer identifier
    id: String,

    /// Paying node
    source_id: String,

    /// Receiving node
    dest_id: String,

    /// Amount credited to the receiver, in minor units (always positive)
    amount: i64,

    /// Fee paid by the sender on top of `amount`, in minor units
    #[serde(default)]
    fee: i64,

    /// Currency symbol (e.g. "ETH", "USDT")
    currency: String,

    /// Chain or rail the transfer settles on
    chain: String,

    /// When the transfer happened
    timestamp: DateTime<Utc>,

    /// Share of the sender's inflow forwarded by this hop, in basis points
    forward_bps: u32,
}

impl TransactionEdge {
    /// Create a new edge
    ///
    /// # Panics
    /// Panics if amount <= 0
    pub fn new(
        id: &str,
        source_id: &str,
        dest_id: &str,
        amount: i64,
        currency: &str,
        chain: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        assert!(amount > 0, "amount must be positive");

        Self {
            id: id.to_string(),
            source_id: source_id.to_string(),
            dest_id: dest_id.to_string(),
            amount,
            currency: currency.to_string(),
            chain: chain.to_string(),
            timestamp,
            forward_bps: FULL_BPS,
            fee: 0,
        }
    }

    /// Set the fee charged on this transfer
    ///
    /// # Panics
    /// Panics if fee < 0
    pub fn with_fee(mut self, fee: i64) -> Self {
        assert!(fee >= 0, "fee must not be negative");
        self.fee = fee;
        self
    }

    pub fn with_forward_bps(mut self, bps: u32) -> Self {
        self.forward_bps = bps;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn dest_id(&self) -> &str {
        &self.dest_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn fee(&self) -> i64 {
        self.fee
    }

    /// Total leaving the sender: amount plus fee
    pub fn debited(&self) -> i64 {
        self.amount.saturating_add(self.fee)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn forward_bps(&self) -> u32 {
        self.forward_bps
    }

    /// Sort key used for hashing: (source, destination, timestamp, id)
    pub fn canonical_key(&self) -> (&str, &str, DateTime<Utc>, &str) {
        (&self.source_id, &self.dest_id, self.timestamp, &self.id)
    }
}
