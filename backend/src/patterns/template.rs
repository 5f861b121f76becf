//! Scenario templates
//!
//! A template is plain configuration: an ordered list of role slots plus the
//! ranges the synthesizer draws from. Templates deserialize from JSON so new
//! topologies can be added without code.
//!
//! # Slot wiring
//!
//! Slots are wired in order. The frontier starts as the source slot's nodes.
//! - `serial`: every frontier node pays the slot's first node, then the
//!   slot's nodes form a chain; the last node becomes the frontier
//! - `parallel`: every frontier node splits its forwarded value across all
//!   of the slot's nodes; they all become the frontier
//!
//! Cyclic templates close the loop with back-edges from the final frontier
//! to the first source node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{IntentLabel, Jurisdiction, NodeRole, FULL_BPS};
use crate::orchestrator::ForgeError;

/// Upper bound on edges any template may request
pub const MAX_EDGES: u32 = 10_000;

/// Largest source amount a template may draw
///
/// No edge moves more than the source held, so with at most `MAX_EDGES`
/// edges every sum of amounts and fees stays within i64.
pub const MAX_AMOUNT: i64 = i64::MAX / (MAX_EDGES as i64 + 1);

/// Inclusive range of small counts (nodes, minutes, basis points)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn exact(value: u32) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.min as u64 && value <= self.max as u64
    }

    /// True if the two ranges share at least one value
    pub fn overlaps(&self, min: u64, max: u64) -> bool {
        (self.min as u64) <= max && min <= self.max as u64
    }
}

/// Inclusive range of money values in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: i64,
    pub max: i64,
}

impl AmountRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

/// How a slot's nodes are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Consecutive hops (layering, peel chains)
    Serial,
    /// Branches fed by the same frontier (smurfing, mixer pools)
    Parallel,
}

fn default_arrangement() -> Arrangement {
    Arrangement::Serial
}

fn default_delay() -> CountRange {
    CountRange::new(30, 360)
}

/// One stage of a template topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSlot {
    /// Slot kind, e.g. `layering_hop`; shows up on nodes and in narratives
    pub name: String,

    pub role: NodeRole,

    /// Number of nodes instantiated for this slot
    pub count: CountRange,

    #[serde(default = "default_arrangement")]
    pub arrangement: Arrangement,

    /// Delay before funds reach this slot, in minutes
    #[serde(default = "default_delay")]
    pub delay_minutes: CountRange,

    /// Chain override for transfers into this slot
    #[serde(default)]
    pub chain: Option<String>,

    /// Currency override for transfers into this slot
    #[serde(default)]
    pub currency: Option<String>,

    /// Forward-fraction override for hops paying into this slot (basis points)
    #[serde(default)]
    pub forward_bps: Option<CountRange>,

    /// Fee charged on hops paying into this slot, in basis points of the
    /// moved value (no fee when absent)
    #[serde(default)]
    pub fee_bps: Option<CountRange>,

    /// Jurisdiction code pinned for every node of this slot
    #[serde(default)]
    pub jurisdiction: Option<String>,
}

impl RoleSlot {
    pub fn new(name: &str, role: NodeRole, count: CountRange) -> Self {
        Self {
            name: name.to_string(),
            role,
            count,
            arrangement: default_arrangement(),
            delay_minutes: default_delay(),
            chain: None,
            currency: None,
            forward_bps: None,
            fee_bps: None,
            jurisdiction: None,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.arrangement = Arrangement::Parallel;
        self
    }

    pub fn delay(mut self, min_minutes: u32, max_minutes: u32) -> Self {
        self.delay_minutes = CountRange::new(min_minutes, max_minutes);
        self
    }

    pub fn on_chain(mut self, chain: &str) -> Self {
        self.chain = Some(chain.to_string());
        self
    }

    pub fn in_currency(mut self, currency: &str) -> Self {
        self.currency = Some(currency.to_string());
        self
    }

    pub fn forwarding(mut self, min_bps: u32, max_bps: u32) -> Self {
        self.forward_bps = Some(CountRange::new(min_bps, max_bps));
        self
    }

    /// Charge a fee of `min_bps..=max_bps` on hops into this slot
    pub fn charging(mut self, min_bps: u32, max_bps: u32) -> Self {
        self.fee_bps = Some(CountRange::new(min_bps, max_bps));
        self
    }

    pub fn pinned_to(mut self, code: &str) -> Self {
        self.jurisdiction = Some(code.to_string());
        self
    }
}

/// Parametrized laundering topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    /// Registry name, e.g. `cross_chain_laundering`
    pub id: String,

    pub version: String,

    #[serde(default)]
    pub description: String,

    pub intent: IntentLabel,

    /// Ordered role slots: source first, then intermediaries, sink last
    pub slots: Vec<RoleSlot>,

    /// Accepted range of total edges
    pub edge_count: CountRange,

    /// Pool drawn from when a node has no pinned jurisdiction
    pub jurisdictions: Vec<Jurisdiction>,

    /// Value held by the source(s) before the first hop
    pub amount: AmountRange,

    /// Default share forwarded per hop, in basis points
    pub forward_bps: CountRange,

    pub currency: String,

    pub chain: String,

    /// Timestamp of the first transfer's origin
    pub base_time: DateTime<Utc>,

    /// Round-tripping: funds return to the first source
    #[serde(default)]
    pub cyclic: bool,

    /// AML detection weaknesses this pattern exploits
    #[serde(default)]
    pub aml_weaknesses: Vec<String>,
}

impl ScenarioTemplate {
    fn invalid(&self, reason: String) -> ForgeError {
        ForgeError::ParameterRange {
            template: self.id.clone(),
            reason,
        }
    }

    /// Look up a pool jurisdiction by code
    pub fn jurisdiction(&self, code: &str) -> Option<&Jurisdiction> {
        self.jurisdictions.iter().find(|j| j.code == code)
    }

    /// Edge count produced by a given per-slot node count
    ///
    /// Monotonic in every slot count, so the all-min and all-max
    /// instantiations bound the feasible interval. Saturates at `u64::MAX`.
    pub fn edges_for_counts(&self, counts: &[u32]) -> u64 {
        let mut frontier = counts.first().copied().unwrap_or(0) as u64;
        let mut edges = 0u64;

        for (slot, &k) in self.slots.iter().zip(counts).skip(1) {
            let k = k as u64;
            match slot.arrangement {
                Arrangement::Serial => {
                    edges = edges
                        .saturating_add(frontier)
                        .saturating_add(k.saturating_sub(1));
                    frontier = 1;
                }
                Arrangement::Parallel => {
                    edges = edges.saturating_add(frontier.saturating_mul(k));
                    frontier = k;
                }
            }
        }

        if self.cyclic {
            edges = edges.saturating_add(frontier);
        }
        edges
    }

    /// Smallest and largest edge count any instantiation can produce
    pub fn feasible_edges(&self) -> (u64, u64) {
        let mins: Vec<u32> = self.slots.iter().map(|s| s.count.min).collect();
        let maxes: Vec<u32> = self.slots.iter().map(|s| s.count.max).collect();
        (self.edges_for_counts(&mins), self.edges_for_counts(&maxes))
    }

    /// Check that the template can be instantiated
    ///
    /// # Errors
    /// `ParameterRange` describing the first problem found
    pub fn validate(&self) -> Result<(), ForgeError> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("template id is empty".to_string()));
        }
        if self.slots.len() < 2 {
            return Err(self.invalid("at least two slots are required".to_string()));
        }
        if self.jurisdictions.is_empty() {
            return Err(self.invalid("jurisdiction pool is empty".to_string()));
        }
        if self.currency.is_empty() || self.chain.is_empty() {
            return Err(self.invalid("currency and chain must be set".to_string()));
        }
        if self.amount.min < 1 || self.amount.min > self.amount.max || self.amount.max > MAX_AMOUNT {
            return Err(self.invalid(format!(
                "amount range {}..={} is invalid (must lie in 1..={})",
                self.amount.min, self.amount.max, MAX_AMOUNT
            )));
        }
        self.check_bps("template", &self.forward_bps)?;
        if self.edge_count.min > self.edge_count.max || self.edge_count.max > MAX_EDGES {
            return Err(self.invalid(format!(
                "edge count range {}..={} is invalid (max {})",
                self.edge_count.min, self.edge_count.max, MAX_EDGES
            )));
        }

        let last = self.slots.len() - 1;
        for (i, slot) in self.slots.iter().enumerate() {
            let expected = match (i, self.cyclic) {
                (0, _) => NodeRole::Source,
                (i, false) if i == last => NodeRole::Sink,
                _ => NodeRole::Intermediary,
            };
            if slot.role != expected {
                return Err(self.invalid(format!(
                    "slot {} must have role {}, found {}",
                    slot.name, expected, slot.role
                )));
            }
            if slot.count.min < 1 || slot.count.min > slot.count.max || slot.count.max > MAX_EDGES {
                return Err(self.invalid(format!(
                    "slot {} count range {}..={} is invalid (must lie in 1..={})",
                    slot.name, slot.count.min, slot.count.max, MAX_EDGES
                )));
            }
            if slot.delay_minutes.min < 1 || slot.delay_minutes.min > slot.delay_minutes.max {
                return Err(self.invalid(format!(
                    "slot {} delay range must be at least one minute",
                    slot.name
                )));
            }
            if let Some(bps) = &slot.forward_bps {
                self.check_bps(&slot.name, bps)?;
            }
            if let Some(fee) = &slot.fee_bps {
                if fee.min > fee.max || fee.max >= FULL_BPS {
                    return Err(self.invalid(format!(
                        "slot {} fee {}..={} bps must lie below {}",
                        slot.name, fee.min, fee.max, FULL_BPS
                    )));
                }
            }
            if let Some(code) = &slot.jurisdiction {
                if self.jurisdiction(code).is_none() {
                    return Err(self.invalid(format!(
                        "slot {} pins jurisdiction {} which is not in the pool",
                        slot.name, code
                    )));
                }
            }
        }

        let (lo, hi) = self.feasible_edges();
        if !self.edge_count.overlaps(lo, hi) {
            return Err(self.invalid(format!(
                "edge count {}..={} is unreachable; topology yields {}..={}",
                self.edge_count.min, self.edge_count.max, lo, hi
            )));
        }

        Ok(())
    }

    fn check_bps(&self, owner: &str, bps: &CountRange) -> Result<(), ForgeError> {
        if bps.min < 1 || bps.min > bps.max || bps.max > FULL_BPS {
            return Err(self.invalid(format!(
                "{} forward fraction {}..={} bps must lie in 1..={}",
                owner, bps.min, bps.max, FULL_BPS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::builtin;

    fn layering() -> ScenarioTemplate {
        builtin::cross_chain_laundering()
    }

    #[test]
    fn test_edges_for_counts_serial_and_parallel() {
        let mut template = layering();
        // origin(1) -> bridge(2) -> peel(3) -> deposit(1)
        assert_eq!(template.edges_for_counts(&[1, 2, 3, 1]), 6);

        template.slots[1].arrangement = Arrangement::Parallel;
        // origin fans out to 2 bridges, both pay the first peel hop
        assert_eq!(template.edges_for_counts(&[1, 2, 3, 1]), 2 + 2 + 2 + 1);
    }

    #[test]
    fn test_cyclic_adds_back_edges() {
        let template = builtin::round_tripping();
        // origin -> 2 shells -> 2 parallel holdings -> back to origin
        assert_eq!(template.edges_for_counts(&[1, 2, 2]), 2 + 2 + 2);
    }

    #[test]
    fn test_unreachable_edge_range_rejected() {
        let mut template = layering();
        template.edge_count = CountRange::new(500, 600);
        let err = template.validate().unwrap_err();
        assert!(matches!(err, ForgeError::ParameterRange { .. }));
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_pinned_jurisdiction_must_be_in_pool() {
        let mut template = layering();
        template.slots[0].jurisdiction = Some("ZZ".to_string());
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_non_cyclic_template_needs_sink_last() {
        let mut template = layering();
        let last = template.slots.len() - 1;
        template.slots[last].role = NodeRole::Intermediary;
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_forward_fraction_above_one_rejected() {
        let mut template = layering();
        template.forward_bps = CountRange::new(9_000, 11_000);
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_amount_above_ceiling_rejected() {
        let mut template = layering();
        template.amount = AmountRange::new(1_000_000, i64::MAX);
        assert!(matches!(template.validate(), Err(ForgeError::ParameterRange { .. })));

        template.amount = AmountRange::new(MAX_AMOUNT, MAX_AMOUNT);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_huge_slot_counts_saturate_and_are_rejected() {
        let mut template = builtin::smurfing();
        for slot in &mut template.slots {
            slot.arrangement = Arrangement::Parallel;
            slot.count = CountRange::new(1, u32::MAX);
        }
        let maxes = vec![u32::MAX; template.slots.len()];
        assert_eq!(template.edges_for_counts(&maxes), u64::MAX);

        let err = template.validate().unwrap_err();
        assert!(err.to_string().contains("count range"));
    }

    #[test]
    fn test_fee_must_stay_below_full_value() {
        let mut template = layering();
        template.slots[1] = template.slots[1].clone().charging(0, FULL_BPS);
        assert!(template.validate().is_err());

        template.slots[1] = template.slots[1].clone().charging(0, 300);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_slot_defaults_apply_when_deserializing() {
        let json = r#"{"name": "hop", "role": "intermediary", "count": {"min": 1, "max": 2}}"#;
        let slot: RoleSlot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.arrangement, Arrangement::Serial);
        assert_eq!(slot.delay_minutes, CountRange::new(30, 360));
        assert!(slot.chain.is_none());
        assert!(slot.fee_bps.is_none());
    }
}
