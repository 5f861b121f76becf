//! Built-in pattern catalog
//!
//! Amounts are minor units of the template currency. All timelines start on
//! 2024-01-01T00:00:00Z.

use chrono::{DateTime, TimeZone, Utc};

use super::template::{AmountRange, CountRange, RoleSlot, ScenarioTemplate};
use crate::models::{IntentLabel, Jurisdiction, NodeRole, RegulatoryTier, FULL_BPS};

const TEMPLATE_VERSION: &str = "1.0.0";

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

fn base_time() -> DateTime<Utc> {
    // 2024-01-01T00:00:00Z
    Utc.timestamp_opt(1_704_067_200, 0)
        .single()
        .unwrap_or_default()
}

fn us() -> Jurisdiction {
    Jurisdiction::new("US", "United States", RegulatoryTier::Strict)
}

fn gb() -> Jurisdiction {
    Jurisdiction::new("GB", "United Kingdom", RegulatoryTier::Moderate)
}

fn sg() -> Jurisdiction {
    Jurisdiction::new("SG", "Singapore", RegulatoryTier::Moderate)
}

fn ae() -> Jurisdiction {
    Jurisdiction::new("AE", "United Arab Emirates", RegulatoryTier::Moderate)
}

fn ky() -> Jurisdiction {
    Jurisdiction::new("KY", "Cayman Islands", RegulatoryTier::Lenient)
}

fn vg() -> Jurisdiction {
    Jurisdiction::new("VG", "British Virgin Islands", RegulatoryTier::Lenient)
}

fn pa() -> Jurisdiction {
    Jurisdiction::new("PA", "Panama", RegulatoryTier::Lenient)
}

/// Fictional sanctioned jurisdiction; never a real country
fn xs() -> Jurisdiction {
    Jurisdiction::new("XS", "Sanctioned Territory (synthetic)", RegulatoryTier::Unregulated)
}

fn weaknesses(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Every built-in template
pub fn all() -> Vec<ScenarioTemplate> {
    vec![
        cross_chain_laundering(),
        smurfing(),
        round_tripping(),
        mixer_ransomware_liquidation(),
        sanctions_evasion_jurisdiction_hopping(),
        nft_wash_trading(),
        false_positive_payroll(),
    ]
}

/// Bridge hops across chains followed by a peel chain into an exchange
pub fn cross_chain_laundering() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "cross_chain_laundering".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "Funds bridged across chains, then peeled into an exchange deposit".to_string(),
        intent: IntentLabel::Laundering,
        slots: vec![
            RoleSlot::new("origin_wallet", NodeRole::Source, CountRange::exact(1))
                .pinned_to("US"),
            RoleSlot::new("bridge_hop", NodeRole::Intermediary, CountRange::new(1, 3))
                .delay(12 * MINUTES_PER_HOUR, 48 * MINUTES_PER_HOUR)
                .on_chain("polygon")
                .charging(10, 50),
            RoleSlot::new("peel_hop", NodeRole::Intermediary, CountRange::new(2, 4))
                .delay(MINUTES_PER_HOUR, 6 * MINUTES_PER_HOUR)
                .on_chain("arbitrum")
                .forwarding(8_500, 9_500)
                .charging(5, 20),
            RoleSlot::new("exchange_deposit", NodeRole::Sink, CountRange::exact(1))
                .delay(30, 4 * MINUTES_PER_HOUR)
                .on_chain("arbitrum")
                .pinned_to("SG"),
        ],
        edge_count: CountRange::new(4, 8),
        jurisdictions: vec![us(), sg(), ky()],
        amount: AmountRange::new(5_000_000, 50_000_000),
        forward_bps: CountRange::new(9_000, 9_800),
        currency: "USDC".to_string(),
        chain: "ethereum".to_string(),
        base_time: base_time(),
        cyclic: false,
        aml_weaknesses: weaknesses(&[
            "Cross-chain analysis gaps",
            "Bridge correlation weaknesses",
            "Multi-chain jurisdiction arbitrage",
            "Small amount thresholds bypass",
        ]),
    }
}

/// Structuring: one origin fans out to many small deposits that are later
/// consolidated
pub fn smurfing() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "smurfing".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "Large sum split across many smurfs below reporting thresholds".to_string(),
        intent: IntentLabel::Laundering,
        slots: vec![
            RoleSlot::new("origin_account", NodeRole::Source, CountRange::exact(1)),
            RoleSlot::new("smurf", NodeRole::Intermediary, CountRange::new(4, 12))
                .parallel()
                .delay(30, 10 * MINUTES_PER_HOUR)
                .forwarding(9_800, 10_000),
            RoleSlot::new("consolidation_account", NodeRole::Intermediary, CountRange::new(1, 2))
                .delay(MINUTES_PER_DAY, 3 * MINUTES_PER_DAY)
                .forwarding(9_500, 9_900),
            RoleSlot::new("beneficiary", NodeRole::Sink, CountRange::exact(1))
                .delay(MINUTES_PER_HOUR, MINUTES_PER_DAY)
                .pinned_to("PA"),
        ],
        edge_count: CountRange::new(9, 26),
        jurisdictions: vec![us(), gb(), pa()],
        amount: AmountRange::new(2_000_000, 9_000_000),
        forward_bps: CountRange::new(9_700, 9_950),
        currency: "USD".to_string(),
        chain: "ach".to_string(),
        base_time: base_time(),
        cyclic: false,
        aml_weaknesses: weaknesses(&[
            "Small amount thresholds bypass",
            "Transaction clustering gaps",
            "Aggregation window blind spots",
        ]),
    }
}

/// Funds leave through shell companies and come back as "foreign investment"
pub fn round_tripping() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "round_tripping".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "Funds cycle through shell companies back to the originator".to_string(),
        intent: IntentLabel::TaxEvasion,
        slots: vec![
            RoleSlot::new("originator", NodeRole::Source, CountRange::exact(1))
                .delay(MINUTES_PER_DAY, 7 * MINUTES_PER_DAY)
                .pinned_to("US"),
            RoleSlot::new("shell_company", NodeRole::Intermediary, CountRange::new(2, 4))
                .delay(MINUTES_PER_DAY, 5 * MINUTES_PER_DAY),
            RoleSlot::new("offshore_holding", NodeRole::Intermediary, CountRange::new(1, 2))
                .parallel()
                .delay(2 * MINUTES_PER_DAY, 10 * MINUTES_PER_DAY),
        ],
        edge_count: CountRange::new(4, 8),
        jurisdictions: vec![us(), gb(), ky(), vg(), pa()],
        amount: AmountRange::new(10_000_000, 100_000_000),
        forward_bps: CountRange::new(9_300, 9_900),
        currency: "USD".to_string(),
        chain: "swift".to_string(),
        base_time: base_time(),
        cyclic: true,
        aml_weaknesses: weaknesses(&[
            "Circular flow detection gaps",
            "Beneficial ownership opacity",
            "Cross-border correlation weaknesses",
        ]),
    }
}

/// Ransom proceeds pushed through a mixer pool, parked, then cashed out
pub fn mixer_ransomware_liquidation() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "mixer_ransomware_liquidation".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "Ransom payment mixed, cooled in a dormant wallet, then liquidated".to_string(),
        intent: IntentLabel::RansomwareLiquidation,
        slots: vec![
            RoleSlot::new("ransom_wallet", NodeRole::Source, CountRange::exact(1)),
            RoleSlot::new("mixer_pool", NodeRole::Intermediary, CountRange::new(3, 6))
                .parallel()
                .delay(MINUTES_PER_DAY, 3 * MINUTES_PER_DAY)
                .forwarding(FULL_BPS, FULL_BPS)
                .charging(300, 300),
            RoleSlot::new("mixer_exit", NodeRole::Intermediary, CountRange::exact(1))
                .delay(MINUTES_PER_HOUR, 6 * MINUTES_PER_HOUR),
            RoleSlot::new("cooling_wallet", NodeRole::Intermediary, CountRange::exact(1))
                .delay(30 * MINUTES_PER_DAY, 90 * MINUTES_PER_DAY),
            RoleSlot::new("cash_out", NodeRole::Sink, CountRange::exact(1))
                .delay(MINUTES_PER_HOUR, 12 * MINUTES_PER_HOUR)
                .pinned_to("KY"),
        ],
        edge_count: CountRange::new(8, 14),
        jurisdictions: vec![us(), ky(), xs()],
        amount: AmountRange::new(50_000_000, 500_000_000),
        forward_bps: CountRange::new(9_900, 9_990),
        currency: "BTC".to_string(),
        chain: "bitcoin".to_string(),
        base_time: base_time(),
        cyclic: false,
        aml_weaknesses: weaknesses(&[
            "Mixer exit correlation gaps",
            "Transaction graph fragmentation",
            "Temporal analysis gaps",
            "Dormancy pattern recognition",
        ]),
    }
}

/// A sanctioned entity hops jurisdictions and chains to reach an offshore account
pub fn sanctions_evasion_jurisdiction_hopping() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "sanctions_evasion_jurisdiction_hopping".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "Sanctioned funds routed through several jurisdictions and chains".to_string(),
        intent: IntentLabel::SanctionsEvasion,
        slots: vec![
            RoleSlot::new("sanctioned_entity", NodeRole::Source, CountRange::exact(1))
                .pinned_to("XS"),
            RoleSlot::new("jurisdiction_hop", NodeRole::Intermediary, CountRange::new(2, 5))
                .delay(MINUTES_PER_DAY, 3 * MINUTES_PER_DAY)
                .on_chain("polygon"),
            RoleSlot::new("bridge_hop", NodeRole::Intermediary, CountRange::new(1, 2))
                .delay(12 * MINUTES_PER_HOUR, 72 * MINUTES_PER_HOUR)
                .on_chain("arbitrum")
                .charging(10, 50),
            RoleSlot::new("offshore_account", NodeRole::Sink, CountRange::exact(1))
                .delay(MINUTES_PER_HOUR, 12 * MINUTES_PER_HOUR)
                .on_chain("arbitrum")
                .pinned_to("KY"),
        ],
        edge_count: CountRange::new(4, 8),
        jurisdictions: vec![xs(), ae(), sg(), gb(), ky()],
        amount: AmountRange::new(20_000_000, 200_000_000),
        forward_bps: CountRange::new(9_400, 9_900),
        currency: "USDT".to_string(),
        chain: "ethereum".to_string(),
        base_time: base_time(),
        cyclic: false,
        aml_weaknesses: weaknesses(&[
            "Jurisdiction hopping blind spots",
            "Cross-chain analysis gaps",
            "Sanctions list address rotation",
        ]),
    }
}

/// Circular NFT sales among colluding wallets
pub fn nft_wash_trading() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "nft_wash_trading".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "An NFT is traded around a ring of colluding wallets".to_string(),
        intent: IntentLabel::Laundering,
        slots: vec![
            RoleSlot::new("collector", NodeRole::Source, CountRange::exact(1))
                .delay(6 * MINUTES_PER_HOUR, MINUTES_PER_DAY),
            RoleSlot::new("wash_buyer", NodeRole::Intermediary, CountRange::new(3, 6))
                .delay(6 * MINUTES_PER_HOUR, MINUTES_PER_DAY)
                .charging(250, 250),
        ],
        edge_count: CountRange::new(4, 7),
        jurisdictions: vec![us(), sg(), vg()],
        amount: AmountRange::new(1_000_000, 20_000_000),
        forward_bps: CountRange::new(9_600, 9_900),
        currency: "ETH".to_string(),
        chain: "ethereum".to_string(),
        base_time: base_time(),
        cyclic: true,
        aml_weaknesses: weaknesses(&[
            "NFT price manipulation detection gaps",
            "Circular trading pattern recognition",
            "Marketplace correlation weaknesses",
        ]),
    }
}

/// Legitimate payroll fan-out that resembles smurfing
pub fn false_positive_payroll() -> ScenarioTemplate {
    ScenarioTemplate {
        id: "false_positive_payroll".to_string(),
        version: TEMPLATE_VERSION.to_string(),
        description: "Routine payroll run that looks like structuring to threshold rules".to_string(),
        intent: IntentLabel::FalsePositiveTrap,
        slots: vec![
            RoleSlot::new("employer", NodeRole::Source, CountRange::exact(1)),
            RoleSlot::new("employee", NodeRole::Sink, CountRange::new(8, 20))
                .parallel()
                .delay(1, 5),
        ],
        edge_count: CountRange::new(8, 20),
        jurisdictions: vec![us()],
        amount: AmountRange::new(4_000_000, 12_000_000),
        forward_bps: CountRange::new(9_990, 10_000),
        currency: "USD".to_string(),
        chain: "ach".to_string(),
        base_time: base_time(),
        cyclic: false,
        aml_weaknesses: weaknesses(&[
            "Pattern-based false positive triggers",
            "Legitimate activity misclassification",
            "Context-agnostic rule-based detection",
        ]),
    }
}
