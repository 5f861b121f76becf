//! Narrative rendering
//!
//! Turns a sealed scenario into plain-English Markdown. The text depends only
//! on sealed content (no randomness, no wall-clock time), so two scenarios
//! with the same hash always render the same narrative.

use std::fmt::Write;

use crate::models::{IntentLabel, Scenario, TransactionEdge, ARTIFICIAL_DATA_WARNING};
use crate::orchestrator::ForgeError;

/// Slot-name keywords and the technique each one indicates
const TECHNIQUES: &[(&str, &str)] = &[
    ("bridge", "cross-chain bridging"),
    ("peel", "peel chains"),
    ("smurf", "structuring below reporting thresholds"),
    ("consolidation", "consolidation accounts"),
    ("shell", "shell companies"),
    ("offshore", "offshore holdings"),
    ("mixer", "mixing services"),
    ("cooling", "dormancy periods"),
    ("jurisdiction_hop", "jurisdiction hopping"),
    ("wash", "wash trades between related wallets"),
];

/// Renders scenario narratives
pub struct NarrativeGenerator;

impl NarrativeGenerator {
    /// Render the Markdown narrative of a sealed scenario
    ///
    /// # Errors
    /// `Serialization` if a section fails to format
    pub fn render(scenario: &Scenario) -> Result<String, ForgeError> {
        let mut out = String::new();
        Self::write_all(&mut out, scenario).map_err(|e| {
            ForgeError::Serialization(format!("narrative for {}: {}", scenario.scenario_id(), e))
        })?;
        Ok(out)
    }

    fn write_all(out: &mut String, scenario: &Scenario) -> std::fmt::Result {
        let summary = scenario.risk_summary();

        writeln!(out, "# Scenario Narrative")?;
        writeln!(out)?;
        writeln!(out, "**Pattern:** {}", scenario.template())?;
        writeln!(out, "**Intent:** {}", scenario.label())?;
        writeln!(out, "**Integrity hash:** `{}`", scenario.integrity_hash())?;
        writeln!(out)?;

        writeln!(out, "## Overview")?;
        writeln!(out)?;
        writeln!(out, "{}", Self::overview(scenario))?;
        writeln!(out)?;

        writeln!(out, "## Transaction Flow")?;
        writeln!(out)?;
        writeln!(out, "Amounts are in minor currency units.")?;
        writeln!(out)?;
        for (step, edge) in scenario.graph().chronological_edges().into_iter().enumerate() {
            writeln!(out, "{}. {}", step + 1, Self::hop_sentence(scenario, edge))?;
        }
        writeln!(out)?;

        writeln!(out, "## Why Rule-Based Monitoring Misses It")?;
        writeln!(out)?;
        if scenario.aml_weaknesses().is_empty() {
            writeln!(out, "- No specific weaknesses are recorded for this pattern.")?;
        }
        for weakness in scenario.aml_weaknesses() {
            writeln!(out, "- {}", weakness)?;
        }
        writeln!(out)?;

        writeln!(out, "## Signals To Detect")?;
        writeln!(out)?;
        for signal in Self::signals(scenario) {
            writeln!(out, "- {}", signal)?;
        }
        writeln!(out)?;

        writeln!(out, "## Summary")?;
        writeln!(out)?;
        writeln!(
            out,
            "{} transactions across {} entities over {} days move {} units in total \
             and are labeled `{}`.",
            summary.total_transactions,
            summary.entities_involved,
            summary.time_span_days,
            group_thousands(summary.total_amount),
            scenario.label()
        )?;
        if summary.total_fees > 0 {
            writeln!(out)?;
            writeln!(
                out,
                "Service fees withheld along the way total {} units.",
                group_thousands(summary.total_fees)
            )?;
        }
        writeln!(out)?;
        writeln!(out, "---")?;
        writeln!(out)?;
        write!(out, "*{}*", ARTIFICIAL_DATA_WARNING)
    }

    fn overview(scenario: &Scenario) -> String {
        let base = match scenario.label() {
            IntentLabel::Laundering => {
                "This scenario depicts money laundering: illicit funds are layered through \
                 intermediaries to obscure their origin."
            }
            IntentLabel::SanctionsEvasion => {
                "This scenario depicts sanctions evasion: funds from a sanctioned party hop \
                 across jurisdictions to reach an unrestricted account."
            }
            IntentLabel::RansomwareLiquidation => {
                "This scenario depicts ransomware liquidation: ransom proceeds are mixed and \
                 held before being cashed out."
            }
            IntentLabel::TaxEvasion => {
                "This scenario depicts tax evasion: funds leave the originator and return \
                 disguised as unrelated income."
            }
            IntentLabel::FalsePositiveTrap => {
                "This scenario depicts legitimate activity whose shape resembles a known \
                 typology and tends to trigger rule-based alerts."
            }
        };

        let mut techniques: Vec<&str> = Vec::new();
        for node in scenario.graph().nodes() {
            for &(keyword, technique) in TECHNIQUES {
                if node.slot().contains(keyword) && !techniques.contains(&technique) {
                    techniques.push(technique);
                }
            }
        }

        if techniques.is_empty() {
            base.to_string()
        } else {
            format!("{} It relies on {}.", base, join_words(&techniques))
        }
    }

    fn hop_sentence(scenario: &Scenario, edge: &TransactionEdge) -> String {
        let graph = scenario.graph();
        let describe = |id: &str| match graph.node(id) {
            Some(node) => {
                let place = node
                    .jurisdiction()
                    .map(|j| j.to_string())
                    .unwrap_or_else(|| "an unassigned jurisdiction".to_string());
                format!("{} `{}` ({}, {})", node.slot(), node.short_actor(), node.role(), place)
            }
            None => format!("unknown node {}", id),
        };

        let fee = if edge.fee() > 0 {
            format!(" after a fee of {}", group_thousands(edge.fee()))
        } else {
            String::new()
        };

        format!(
            "At {}, {} sends {} {} on {} to {}{}, forwarding {} of what it held.",
            edge.timestamp().format("%Y-%m-%d %H:%M UTC"),
            describe(edge.source_id()),
            group_thousands(edge.amount()),
            edge.currency(),
            edge.chain(),
            describe(edge.dest_id()),
            fee,
            format_bps(edge.forward_bps())
        )
    }

    fn signals(scenario: &Scenario) -> Vec<String> {
        let summary = scenario.risk_summary();
        let mut signals = Vec::new();

        if summary.total_transactions > 10 {
            signals.push(format!(
                "High velocity: {} transactions in {} days",
                summary.total_transactions, summary.time_span_days
            ));
        }
        if summary.chains.len() > 1 {
            signals.push(format!("Cross-chain movement across {}", summary.chains.join(", ")));
        }
        if summary.jurisdictions.len() > 2 {
            signals.push(format!(
                "Funds touch {} jurisdictions: {}",
                summary.jurisdictions.len(),
                summary.jurisdictions.join(", ")
            ));
        }
        if summary.time_span_days > 30.0 {
            signals.push("Activity spread over more than a month".to_string());
        }
        if summary.cyclic {
            signals.push("Circular flow returning funds to their origin".to_string());
        }
        match scenario.label() {
            IntentLabel::SanctionsEvasion => {
                signals.push("Counterparty in a sanctioned jurisdiction".to_string());
            }
            IntentLabel::RansomwareLiquidation => {
                signals.push("Fan-in after a mixer followed by a holding period".to_string());
            }
            IntentLabel::FalsePositiveTrap => {
                signals.push("Regular schedule and stable counterparties point to legitimate activity".to_string());
            }
            _ => {}
        }

        if signals.is_empty() {
            signals.push("No aggregate signal stands out; counterparty context is required".to_string());
        }
        signals
    }
}

/// "a", "a and b", "a, b and c"
fn join_words(words: &[&str]) -> String {
    match words {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn format_bps(bps: u32) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}
