// src/progress.rs
/// Lightweight progress reporting for the slow parts of a run (snapshot lookup, merge).
/// Frontends implement this to surface status to the operator; the library never prints.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one logical unit completes (e.g., a time slot was tried).
    fn item_done(&mut self, _label: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}
