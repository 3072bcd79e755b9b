//! Typed configuration for the contract board.
//!
//! Centralizes every tunable the lifecycle engine and its background
//! activities consult, so the rest of the code never touches raw config
//! values. Defaults mirror a small production deployment.

use crate::contract::domain::{Coins, ContractKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-kind policy: availability, reward bounds, taxation, and lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindPolicy {
    /// Whether contracts of this kind may be created.
    pub enabled: bool,
    /// Smallest net reward accepted at creation.
    pub min_reward: Coins,
    /// Largest net reward accepted at creation.
    pub max_reward: Coins,
    /// Tax rate in basis points (500 == 5%), consumed at creation.
    pub tax_rate_bps: u32,
    /// Hours until a contract of this kind expires.
    pub lifetime_hours: u32,
}

impl KindPolicy {
    /// Returns the contract lifetime as a chrono duration.
    #[must_use]
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.lifetime_hours))
    }
}

/// Board-wide configuration consumed by the lifecycle engine, the
/// expiration sweeper, and the liveness tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Policy for bounty-hunt contracts.
    pub bounty_hunt: KindPolicy,
    /// Policy for item-gathering contracts.
    pub item_gathering: KindPolicy,
    /// Policy for XP-service contracts.
    pub xp_service: KindPolicy,
    /// Maximum simultaneously active contracts per contractor.
    pub contract_limit: u32,
    /// Seconds between expiration sweeps.
    pub sweep_interval_secs: u64,
    /// Seconds between liveness probes for tracked contracts.
    pub probe_interval_secs: u64,
}

impl BoardConfig {
    /// Returns the policy governing the given contract kind.
    #[must_use]
    pub const fn policy(&self, kind: ContractKind) -> &KindPolicy {
        match kind {
            ContractKind::BountyHunt => &self.bounty_hunt,
            ContractKind::ItemGathering => &self.item_gathering,
            ContractKind::XpService => &self.xp_service,
        }
    }

    /// Returns the expiration sweep cadence.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Returns the liveness probe cadence.
    #[must_use]
    pub const fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            bounty_hunt: KindPolicy {
                enabled: true,
                min_reward: Coins::new(100),
                max_reward: Coins::new(1_000_000),
                tax_rate_bps: 500,
                lifetime_hours: 72,
            },
            item_gathering: KindPolicy {
                enabled: true,
                min_reward: Coins::new(10),
                max_reward: Coins::new(500_000),
                tax_rate_bps: 300,
                lifetime_hours: 48,
            },
            xp_service: KindPolicy {
                enabled: true,
                min_reward: Coins::new(10),
                max_reward: Coins::new(200_000),
                tax_rate_bps: 400,
                lifetime_hours: 24,
            },
            contract_limit: 5,
            sweep_interval_secs: 30,
            probe_interval_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BoardConfig;
    use crate::contract::domain::{Coins, ContractKind};

    #[test]
    fn default_policies_cover_all_kinds() {
        let config = BoardConfig::default();
        assert!(config.policy(ContractKind::BountyHunt).enabled);
        assert_eq!(config.policy(ContractKind::BountyHunt).tax_rate_bps, 500);
        assert_eq!(
            config.policy(ContractKind::ItemGathering).min_reward,
            Coins::new(10)
        );
        assert_eq!(config.policy(ContractKind::XpService).lifetime_hours, 24);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = BoardConfig::default();
        let json = serde_json::to_string(&config).expect("config should serialize");
        let parsed: BoardConfig = serde_json::from_str(&json).expect("config should deserialize");
        assert_eq!(parsed, config);
    }
}
