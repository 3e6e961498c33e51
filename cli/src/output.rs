//! Console output for user-facing status lines.

use dashboard_core::ports::StatusReporter;

const INFO_PREFIX: &str = "ℹ️  ";
const FAILURE_PREFIX: &str = "❌  ";

/// Writes status lines to stdout.
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn plain(&self, message: &str) {
        println!("{}", message);
    }

    fn info(&self, message: &str) {
        println!("{}{}", INFO_PREFIX, message);
    }

    fn failure(&self, message: &str) {
        println!("{}{}", FAILURE_PREFIX, message);
    }
}
