//! Process interrupt port (interface).

/// Port for observing a process interrupt (Ctrl+C).
pub trait InterruptSource: Send + Sync {
    /// Resolve when the process is interrupted.
    ///
    /// The returned future is independent of `self` so it can be moved into a
    /// background task.
    fn interrupted(&self) -> impl std::future::Future<Output = ()> + Send + 'static;
}
