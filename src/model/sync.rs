//! Reconciler and synchronizer report types.

/// Per-character outcome of an affiliation refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AffiliationOutcome {
    /// The character's affiliation tuple was written to the store.
    Updated,
    /// Upstream omitted the character from the batch response (deleted or
    /// unknown upstream); nothing was written.
    Skipped,
    /// The batch containing the character failed upstream.
    Failed,
}

/// Aggregate result of one affiliation reconciler run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AffiliationStats {
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Number of upstream batch calls dispatched.
    pub batches: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// Whether the run was cut short by cancellation.
    pub cancelled: bool,
}

impl AffiliationStats {
    /// Total characters accounted for in this run.
    pub fn total(&self) -> usize {
        self.updated + self.failed + self.skipped
    }
}

/// Result of converging one `(user, guild)` pair.
#[derive(Clone, Debug, Default)]
pub struct UserSyncReport {
    pub user_id: i32,
    pub discord_id: String,
    pub success: bool,
    /// Roles added (or, in a dry run, that would be added).
    pub roles_added: Vec<String>,
    /// Roles removed (or, in a dry run, that would be removed).
    pub roles_removed: Vec<String>,
    /// Whether the auto-join primitive added the user to the guild.
    pub joined: bool,
    /// Whether the nickname was rewritten after role changes.
    pub nickname_updated: bool,
    pub dry_run: bool,
    pub error: Option<String>,
}

/// Aggregate result of one guild sync.
#[derive(Clone, Debug, Default)]
pub struct GuildSyncReport {
    pub guild_id: String,
    pub users_processed: usize,
    pub users_succeeded: usize,
    pub users_failed: usize,
    pub roles_added: usize,
    pub roles_removed: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
    pub cancelled: bool,
    /// Identifier of the persisted SyncRun record, when one was written.
    pub sync_run_id: Option<i32>,
}

impl GuildSyncReport {
    /// Folds one user's report into the guild aggregate.
    pub fn absorb(&mut self, user: &UserSyncReport) {
        self.users_processed += 1;
        if user.success {
            self.users_succeeded += 1;
        } else {
            self.users_failed += 1;
            if let Some(error) = &user.error {
                self.errors
                    .push(format!("user {}: {}", user.user_id, error));
            }
        }
        self.roles_added += user.roles_added.len();
        self.roles_removed += user.roles_removed.len();
    }
}
