//! Graph synthesis
//!
//! Instantiates a concrete [`TransactionGraph`] from a [`ScenarioTemplate`]
//! and a seed.
//!
//! # Determinism
//!
//! All draws come from one `RngManager` stream derived from the seed, in a
//! fixed order: slot counts, count repair, source amount, then nodes and
//! edges slot by slot. Same `(template, seed)` → same graph, byte for byte.
//!
//! # Atomicity
//!
//! The graph is built locally and only returned once every edge is in
//! place; any failure discards it.

pub mod amounts;

use crate::core::clock::SyntheticClock;
use crate::graph::TransactionGraph;
use crate::models::{TransactionEdge, TransactionNode};
use crate::orchestrator::ForgeError;
use crate::patterns::{AmountRange, Arrangement, CountRange, RoleSlot, ScenarioTemplate};
use crate::rng::{RngManager, SYNTHESIS_STREAM};

use amounts::{fee_amount, forward_amount, share_bps, split_amount};

/// Attempts allowed when steering slot counts into the edge range
const MAX_REPAIR_STEPS: usize = 256;

/// Per-call synthesis parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisParams {
    pub seed: u64,
    /// Overrides the template's edge-count range
    pub edge_count: Option<CountRange>,
    /// Overrides the template's source amount range
    pub amount: Option<AmountRange>,
}

impl SynthesisParams {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            edge_count: None,
            amount: None,
        }
    }

    pub fn with_edge_count(mut self, range: CountRange) -> Self {
        self.edge_count = Some(range);
        self
    }

    pub fn with_amount(mut self, range: AmountRange) -> Self {
        self.amount = Some(range);
        self
    }
}

/// A node whose received value has not been forwarded yet
#[derive(Debug, Clone)]
struct Holding {
    node_id: String,
    value: i64,
    clock: SyntheticClock,
}

/// Builds transaction graphs from templates
pub struct GraphSynthesizer;

impl GraphSynthesizer {
    /// Synthesize a graph with the template's own ranges
    ///
    /// # Example
    /// ```
    /// use scenario_forge_core_rs::{GraphSynthesizer, PatternLibrary};
    ///
    /// let template = PatternLibrary::builtin().lookup("cross_chain_laundering").unwrap();
    /// let a = GraphSynthesizer::synthesize(template, 42).unwrap();
    /// let b = GraphSynthesizer::synthesize(template, 42).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn synthesize(template: &ScenarioTemplate, seed: u64) -> Result<TransactionGraph, ForgeError> {
        Self::synthesize_with(template, &SynthesisParams::new(seed))
    }

    /// Synthesize a graph with per-call overrides
    ///
    /// # Errors
    /// `ParameterRange` if the template or overrides are infeasible
    pub fn synthesize_with(
        template: &ScenarioTemplate,
        params: &SynthesisParams,
    ) -> Result<TransactionGraph, ForgeError> {
        let mut effective = template.clone();
        if let Some(range) = params.edge_count {
            effective.edge_count = range;
        }
        if let Some(range) = params.amount {
            effective.amount = range;
        }
        effective.validate()?;

        let mut rng = RngManager::derive(params.seed, SYNTHESIS_STREAM);
        let counts = Self::instantiate_counts(&effective, &mut rng)?;
        let graph = Builder::new(&effective, &mut rng).build(&counts)?;

        graph.validate(effective.cyclic)?;
        tracing::debug!(
            pattern = %effective.id,
            seed = params.seed,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "synthesized graph"
        );
        Ok(graph)
    }

    /// Draw per-slot node counts and steer them into the edge range
    fn instantiate_counts(
        template: &ScenarioTemplate,
        rng: &mut RngManager,
    ) -> Result<Vec<u32>, ForgeError> {
        let mut counts: Vec<u32> = template
            .slots
            .iter()
            .map(|slot| rng.range_inclusive(slot.count.min as i64, slot.count.max as i64) as u32)
            .collect();

        let target = template.edge_count;
        for _ in 0..MAX_REPAIR_STEPS {
            let edges = template.edges_for_counts(&counts);
            if target.contains(edges) {
                return Ok(counts);
            }

            let grow = edges < target.min as u64;
            let candidates: Vec<usize> = template
                .slots
                .iter()
                .enumerate()
                .filter(|(i, slot)| {
                    if grow {
                        counts[*i] < slot.count.max
                    } else {
                        counts[*i] > slot.count.min
                    }
                })
                .map(|(i, _)| i)
                .collect();

            if candidates.is_empty() {
                break;
            }
            let slot = candidates[rng.pick_index(candidates.len())];
            if grow {
                counts[slot] += 1;
            } else {
                counts[slot] -= 1;
            }
        }

        tracing::warn!(pattern = %template.id, "slot counts could not reach the edge range");
        Err(ForgeError::ParameterRange {
            template: template.id.clone(),
            reason: format!(
                "no slot counts yield between {} and {} edges",
                target.min, target.max
            ),
        })
    }
}

/// Incremental graph construction state
struct Builder<'a> {
    template: &'a ScenarioTemplate,
    rng: &'a mut RngManager,
    graph: TransactionGraph,
}

impl<'a> Builder<'a> {
    fn new(template: &'a ScenarioTemplate, rng: &'a mut RngManager) -> Self {
        Self {
            template,
            rng,
            graph: TransactionGraph::new(),
        }
    }

    fn out_of_range(&self, reason: String) -> ForgeError {
        ForgeError::ParameterRange {
            template: self.template.id.clone(),
            reason,
        }
    }

    fn build(mut self, counts: &[u32]) -> Result<TransactionGraph, ForgeError> {
        let template = self.template;
        let source_slot = &template.slots[0];

        let total = self
            .rng
            .range_inclusive(template.amount.min, template.amount.max);
        let source_ids = self.add_nodes(source_slot, counts[0])?;
        let shares = split_amount(total, source_ids.len(), self.rng).ok_or_else(|| {
            self.out_of_range(format!(
                "amount {} cannot fund {} sources",
                total,
                source_ids.len()
            ))
        })?;

        let clock = SyntheticClock::new(template.base_time);
        let mut frontier: Vec<Holding> = source_ids
            .iter()
            .zip(shares)
            .map(|(id, value)| Holding {
                node_id: id.clone(),
                value,
                clock: clock.clone(),
            })
            .collect();

        for (slot, &count) in template.slots.iter().zip(counts).skip(1) {
            frontier = match slot.arrangement {
                Arrangement::Serial => self.wire_serial(slot, count, frontier)?,
                Arrangement::Parallel => self.wire_parallel(slot, count, frontier)?,
            };
        }

        if template.cyclic {
            if let Some(origin) = source_ids.first() {
                for holding in &frontier {
                    self.pay(holding, origin, source_slot, None)?;
                }
            }
        }

        Ok(self.graph)
    }

    /// Create `count` nodes for a slot, returning their ids
    fn add_nodes(&mut self, slot: &RoleSlot, count: u32) -> Result<Vec<String>, ForgeError> {
        let mut ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = format!("n{:04}", self.graph.node_count());
            let actor = format!("0x{}", self.rng.hex_string(40));
            self.graph
                .add_node(TransactionNode::new(&id, slot.role, &slot.name, &actor))?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Forward part of a holding to `dest`
    ///
    /// `gross` fixes the value leaving the holding (parallel splits);
    /// otherwise the forward fraction is drawn from the slot's range. A slot
    /// that charges a fee keeps it out of the gross, so the receiver is
    /// credited the returned net amount.
    fn pay(
        &mut self,
        from: &Holding,
        dest: &str,
        slot: &RoleSlot,
        gross: Option<i64>,
    ) -> Result<(i64, SyntheticClock), ForgeError> {
        let gross = match gross {
            Some(gross) => gross,
            None => {
                let bps = self.draw_bps(slot);
                forward_amount(from.value, bps).ok_or_else(|| {
                    self.out_of_range(format!(
                        "value {} at {} decays below one unit before slot {}",
                        from.value, from.node_id, slot.name
                    ))
                })?
            }
        };
        let fee = self.draw_fee(slot, gross);
        let amount = gross - fee;

        let delay = self.rng.range_inclusive(
            slot.delay_minutes.min as i64,
            slot.delay_minutes.max as i64,
        );
        let mut clock = from.clock.clone();
        clock.advance_minutes(delay);

        let id = format!("tx{:04}", self.graph.edge_count());
        let currency = slot.currency.as_deref().unwrap_or(&self.template.currency);
        let chain = slot.chain.as_deref().unwrap_or(&self.template.chain);
        let edge = TransactionEdge::new(
            &id,
            &from.node_id,
            dest,
            amount,
            currency,
            chain,
            clock.now(),
        )
        .with_fee(fee)
        .with_forward_bps(share_bps(gross, from.value));
        self.graph.add_edge(edge)?;

        Ok((amount, clock))
    }

    /// Fee withheld from `gross` by the receiving slot, zero when it charges none
    fn draw_fee(&mut self, slot: &RoleSlot, gross: i64) -> i64 {
        let Some(range) = slot.fee_bps else {
            return 0;
        };
        let bps = self.rng.range_inclusive(range.min as i64, range.max as i64);
        fee_amount(gross, bps as u32)
    }

    fn draw_bps(&mut self, slot: &RoleSlot) -> u32 {
        let range = slot.forward_bps.unwrap_or(self.template.forward_bps);
        self.rng.range_inclusive(range.min as i64, range.max as i64) as u32
    }

    /// Frontier → first node, then a chain through the slot
    fn wire_serial(
        &mut self,
        slot: &RoleSlot,
        count: u32,
        frontier: Vec<Holding>,
    ) -> Result<Vec<Holding>, ForgeError> {
        let ids = self.add_nodes(slot, count)?;
        let Some(first) = ids.first() else {
            return Ok(frontier);
        };

        let mut received = 0i64;
        let mut latest: Option<SyntheticClock> = None;
        for holding in &frontier {
            let (amount, clock) = self.pay(holding, first, slot, None)?;
            received += amount;
            if latest
                .as_ref()
                .map_or(true, |l| clock.elapsed_minutes() > l.elapsed_minutes())
            {
                latest = Some(clock);
            }
        }

        let mut current = Holding {
            node_id: first.clone(),
            value: received,
            clock: latest.unwrap_or_else(|| SyntheticClock::new(self.template.base_time)),
        };
        for next in ids.iter().skip(1) {
            let (amount, clock) = self.pay(&current, next, slot, None)?;
            current = Holding {
                node_id: next.clone(),
                value: amount,
                clock,
            };
        }

        Ok(vec![current])
    }

    /// Every frontier node splits its forwarded value across the slot
    fn wire_parallel(
        &mut self,
        slot: &RoleSlot,
        count: u32,
        frontier: Vec<Holding>,
    ) -> Result<Vec<Holding>, ForgeError> {
        let ids = self.add_nodes(slot, count)?;
        let mut received: Vec<Option<Holding>> = vec![None; ids.len()];

        for holding in &frontier {
            let bps = self.draw_bps(slot);
            let forwarded = forward_amount(holding.value, bps).unwrap_or(0);
            let shares = split_amount(forwarded, ids.len(), self.rng).ok_or_else(|| {
                self.out_of_range(format!(
                    "value {} at {} cannot be split across {} {} nodes",
                    holding.value,
                    holding.node_id,
                    ids.len(),
                    slot.name
                ))
            })?;

            for (i, (dest, share)) in ids.iter().zip(shares).enumerate() {
                let (amount, clock) = self.pay(holding, dest, slot, Some(share))?;
                if let Some(existing) = received[i].as_mut() {
                    existing.value += amount;
                    if clock.elapsed_minutes() > existing.clock.elapsed_minutes() {
                        existing.clock = clock;
                    }
                } else {
                    received[i] = Some(Holding {
                        node_id: dest.clone(),
                        value: amount,
                        clock,
                    });
                }
            }
        }

        Ok(received.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeRole;
    use crate::patterns::builtin;

    #[test]
    fn test_counts_respect_slot_ranges() {
        let template = builtin::smurfing();
        for seed in 0..50 {
            let mut rng = RngManager::derive(seed, SYNTHESIS_STREAM);
            let counts = GraphSynthesizer::instantiate_counts(&template, &mut rng).unwrap();
            for (slot, count) in template.slots.iter().zip(&counts) {
                assert!(slot.count.contains(*count as u64), "slot {} count {}", slot.name, count);
            }
            assert!(template.edge_count.contains(template.edges_for_counts(&counts)));
        }
    }

    #[test]
    fn test_repair_steers_into_narrow_edge_range() {
        let mut template = builtin::smurfing();
        // 2s + c == 20 only for s = 9 (c = 2) or s = 10 (c = 0, impossible)
        template.edge_count = CountRange::exact(20);
        for seed in 0..20 {
            let graph = GraphSynthesizer::synthesize(&template, seed).unwrap();
            assert_eq!(graph.edge_count(), 20);
        }
    }

    #[test]
    fn test_unreachable_parity_is_parameter_range_error() {
        let mut template = builtin::mixer_ransomware_liquidation();
        // 2m + 2 is always even
        template.edge_count = CountRange::exact(9);
        let err = GraphSynthesizer::synthesize(&template, 3).unwrap_err();
        assert!(matches!(err, ForgeError::ParameterRange { .. }));
    }

    #[test]
    fn test_tiny_amount_cannot_be_split() {
        let template = builtin::false_positive_payroll();
        let params = SynthesisParams::new(11).with_amount(AmountRange::new(3, 3));
        let err = GraphSynthesizer::synthesize_with(&template, &params).unwrap_err();
        assert!(err.to_string().contains("cannot be split"));
    }

    #[test]
    fn test_serial_chain_forwards_decaying_value() {
        let template = builtin::cross_chain_laundering();
        let graph = GraphSynthesizer::synthesize(&template, 5).unwrap();

        for node in graph.nodes_with_role(NodeRole::Intermediary) {
            let inflow = graph.inflow(node.id());
            let outflow: i64 = graph.out_edges(node.id()).map(|e| e.debited()).sum();
            assert!(outflow <= inflow, "node {} forwards more than it received", node.id());
            assert!(outflow > 0);
        }
    }

    #[test]
    fn test_parallel_slot_conserves_forwarded_value() {
        let template = builtin::false_positive_payroll();
        let graph = GraphSynthesizer::synthesize(&template, 8).unwrap();
        let employer = graph.nodes_with_role(NodeRole::Source).next().unwrap();
        let paid: i64 = graph.out_edges(employer.id()).map(|e| e.amount()).sum();
        let received: i64 = graph
            .nodes_with_role(NodeRole::Sink)
            .map(|n| graph.inflow(n.id()))
            .sum();
        assert_eq!(paid, received);
    }

    #[test]
    fn test_mixer_withholds_fee_from_each_deposit() {
        let template = builtin::mixer_ransomware_liquidation();
        let graph = GraphSynthesizer::synthesize(&template, 21).unwrap();
        let wallet = graph.nodes_with_role(NodeRole::Source).next().unwrap();

        let deposits: Vec<_> = graph.out_edges(wallet.id()).collect();
        assert!(!deposits.is_empty());
        for edge in &deposits {
            assert_eq!(edge.fee(), amounts::fee_amount(edge.debited(), 300));
            assert!(edge.fee() > 0);
            assert_eq!(edge.amount() + edge.fee(), edge.debited());
        }

        // Slots without a fee policy move value untouched
        for node in graph.nodes().iter().filter(|n| n.slot() == "mixer_exit") {
            assert!(graph.out_edges(node.id()).all(|e| e.fee() == 0));
        }
    }

    #[test]
    fn test_fee_slots_keep_value_conserved() {
        for name in [
            "cross_chain_laundering",
            "sanctions_evasion_jurisdiction_hopping",
            "nft_wash_trading",
        ] {
            let template = crate::patterns::PatternLibrary::builtin().lookup(name).unwrap();
            let graph = GraphSynthesizer::synthesize(template, 9).unwrap();
            assert!(graph.edges().iter().any(|e| e.fee() > 0), "{} charged no fees", name);
            for node in graph.nodes_with_role(NodeRole::Intermediary) {
                let outflow: i64 = graph.out_edges(node.id()).map(|e| e.debited()).sum();
                assert!(outflow <= graph.inflow(node.id()));
            }
        }
    }

    #[test]
    fn test_timestamps_increase_along_every_edge_chain() {
        let template = builtin::mixer_ransomware_liquidation();
        let graph = GraphSynthesizer::synthesize(&template, 77).unwrap();
        for edge in graph.edges() {
            for next in graph.out_edges(edge.dest_id()) {
                assert!(next.timestamp() > edge.timestamp());
            }
            assert!(edge.timestamp() > template.base_time);
        }
    }
}
