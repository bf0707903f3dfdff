use std::sync::Arc;

use bbm_core::progress::{LogLevel, ProgressPatch, ProgressRecord};
use bbm_engine::UnitObserver;

/// Forwards engine unit notifications into a job's [`ProgressRecord`].
pub struct ProgressRelay {
    record: Arc<ProgressRecord>,
}

impl ProgressRelay {
    pub fn new(record: Arc<ProgressRecord>) -> Self {
        Self { record }
    }
}

impl UnitObserver for ProgressRelay {
    fn on_total(&self, total: u64) {
        self.record.update(ProgressPatch::default().total(total));
    }

    fn on_unit_processed(&self, unit: &str) {
        self.record.record_unit(unit);
    }

    fn on_unit_failed(&self, unit: &str, reason: &str) {
        self.record.record_unit_failure();
        let preview: String = unit.chars().take(40).collect();
        self.record
            .append_log(format!("Failed to translate \"{preview}\": {reason}"), LogLevel::Warning);
    }

    fn on_tokens(&self, tokens: u64) {
        self.record.add_tokens(tokens);
    }
}
