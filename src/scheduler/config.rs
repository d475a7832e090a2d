//! Scheduler cadence configuration.
//!
//! Cron expressions use the six-field (seconds-first) syntax of
//! `tokio-cron-scheduler`. Cadences follow the reconciliation contract:
//! affiliations and token refresh every thirty minutes, role sync every
//! fifteen, plus housekeeping sweeps.

/// Affiliation reconciliation cadence.
pub mod affiliation {
    pub const CRON_EXPRESSION: &str = "0 0,30 * * * *";
}

/// Token refresh cadence, offset from the affiliation job to spread load.
pub mod token_refresh {
    pub const CRON_EXPRESSION: &str = "0 10,40 * * * *";

    /// Accounts refreshed per tick.
    pub const BATCH_SIZE: u64 = 50;
}

/// Role synchronization cadence.
pub mod role_sync {
    pub const CRON_EXPRESSION: &str = "0 5,20,35,50 * * * *";
}

/// Expired OAuth-state sweep cadence.
pub mod oauth_state_cleanup {
    pub const CRON_EXPRESSION: &str = "0 25 * * * *";
}

/// SyncRun retention trim cadence and bound.
pub mod sync_run_retention {
    pub const CRON_EXPRESSION: &str = "0 45 4 * * *";

    /// Runs kept per guild.
    pub const KEEP_PER_GUILD: u64 = 1000;
}
