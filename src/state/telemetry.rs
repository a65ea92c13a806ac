//! Representative telemetry charts
//!
//! A representative's account page charts its node telemetry history, one
//! tab per statistic.

use std::fmt;

use crate::api::{Account, Telemetry};

/// Statistic shown by one chart tab, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryStat {
    CementedCount,
    CementedBehind,
    BlockCount,
    BlockBehind,
    UncheckedCount,
    PeerCount,
    AccountCount,
}

impl TelemetryStat {
    pub const ALL: [TelemetryStat; 7] = [
        TelemetryStat::CementedCount,
        TelemetryStat::CementedBehind,
        TelemetryStat::BlockCount,
        TelemetryStat::BlockBehind,
        TelemetryStat::UncheckedCount,
        TelemetryStat::PeerCount,
        TelemetryStat::AccountCount,
    ];

    /// Tab label
    pub fn label(&self) -> &'static str {
        match self {
            TelemetryStat::CementedCount => "Conf.",
            TelemetryStat::CementedBehind => "Conf. Diff",
            TelemetryStat::BlockCount => "Blocks",
            TelemetryStat::BlockBehind => "Blocks Diff",
            TelemetryStat::UncheckedCount => "Unchecked",
            TelemetryStat::PeerCount => "Peers",
            TelemetryStat::AccountCount => "Accounts",
        }
    }

    /// Field name in the telemetry record
    pub fn key(&self) -> &'static str {
        match self {
            TelemetryStat::CementedCount => "cemented_count",
            TelemetryStat::CementedBehind => "cemented_behind",
            TelemetryStat::BlockCount => "block_count",
            TelemetryStat::BlockBehind => "block_behind",
            TelemetryStat::UncheckedCount => "unchecked_count",
            TelemetryStat::PeerCount => "peer_count",
            TelemetryStat::AccountCount => "account_count",
        }
    }

    pub fn value(&self, telemetry: &Telemetry) -> u64 {
        match self {
            TelemetryStat::CementedCount => telemetry.cemented_count,
            TelemetryStat::CementedBehind => telemetry.cemented_behind,
            TelemetryStat::BlockCount => telemetry.block_count,
            TelemetryStat::BlockBehind => telemetry.block_behind,
            TelemetryStat::UncheckedCount => telemetry.unchecked_count,
            TelemetryStat::PeerCount => telemetry.peer_count,
            TelemetryStat::AccountCount => telemetry.account_count,
        }
    }
}

impl fmt::Display for TelemetryStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `(timestamp, value)` points of `stat`, oldest first
pub fn series(account: &Account, stat: TelemetryStat) -> Vec<(i64, u64)> {
    let mut points: Vec<(i64, u64)> = account
        .telemetry_history
        .iter()
        .map(|telemetry| (telemetry.timestamp, stat.value(telemetry)))
        .collect();
    points.sort_by_key(|(timestamp, _)| *timestamp);
    points
}
