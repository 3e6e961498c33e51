//! Status reporting port (interface).

/// Port for user-facing status output.
///
/// Formatting and destination belong to the implementation.
pub trait StatusReporter: Send + Sync {
    /// Print a line with no decoration.
    fn plain(&self, message: &str);

    /// Report progress or advice.
    fn info(&self, message: &str);

    /// Report a failure.
    fn failure(&self, message: &str);
}
