use super::executor::{CommandSpec, Executor};

/// Probe a toolchain by running its detect command with output discarded.
///
/// Non-zero exit, a missing executable and any other spawn error all mean
/// "not available". Never cached: an install may change the answer.
pub fn is_available(executor: &dyn Executor, detect: &[String]) -> bool {
    if detect.is_empty() {
        return false;
    }
    executor.spawn(&CommandSpec::new(detect.to_vec()).quiet()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::executor::{MockExecutor, Sink};

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_available_when_probe_succeeds() {
        let mock = MockExecutor::new();
        assert!(is_available(&mock, &argv(&["go", "version"])));
        let spawned = mock.spawned();
        assert_eq!(spawned[0].argv, argv(&["go", "version"]));
        assert_eq!(spawned[0].stdout, Sink::Discard);
        assert_eq!(spawned[0].stderr, Sink::Discard);
    }

    #[test]
    fn test_unavailable_on_nonzero_exit_or_missing_binary() {
        let mock = MockExecutor::new().failing("tclsh").missing("zig");
        assert!(!is_available(&mock, &argv(&["tclsh"])));
        assert!(!is_available(&mock, &argv(&["zig", "version"])));
    }

    #[test]
    fn test_empty_detect_is_unavailable() {
        let mock = MockExecutor::new();
        assert!(!is_available(&mock, &[]));
        assert!(mock.calls().is_empty());
    }
}
