//! Progress observation hook passed into engine runs.

/// Receives per-unit notifications from an engine.
///
/// Observers are purely observational: they cannot alter what the engine
/// returns or how it proceeds. Only [`on_unit_processed`] is required.
///
/// [`on_unit_processed`]: UnitObserver::on_unit_processed
pub trait UnitObserver: Send + Sync {
    /// The engine has counted the units it is about to process.
    fn on_total(&self, _total: u64) {}

    /// One unit finished; `unit` is its source text.
    fn on_unit_processed(&self, unit: &str);

    /// One unit failed but the run continues.
    fn on_unit_failed(&self, _unit: &str, _reason: &str) {}

    /// Provider usage reported for the most recent request.
    fn on_tokens(&self, _tokens: u64) {}
}
