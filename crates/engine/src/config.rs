use crate::Currency;

/// Tunables for the balance engine, passed explicitly at construction.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Currency every ledger amount is denominated in.
    pub currency: Currency,
    /// Transaction count above which a calculated balance is snapshotted.
    pub snapshot_threshold: u64,
    /// Page size used when replaying transactions; bounds memory use when
    /// a snapshot is very stale.
    pub replay_page_size: u64,
    /// Cache TTL for dates strictly before today. Historical balances are
    /// immutable, so they can live longer.
    pub historical_ttl_secs: u64,
    /// Cache TTL for today (and future dates): same-day writes keep
    /// changing this value.
    pub current_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            snapshot_threshold: 100,
            replay_page_size: 10_000,
            historical_ttl_secs: 86_400,
            current_ttl_secs: 3_600,
        }
    }
}
