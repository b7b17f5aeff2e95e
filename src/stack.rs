//! Native stack growth for deeply recursive evaluation.

/// Minimum stack space to keep available before a nested call (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when the red zone is reached (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first moving onto a fresh stack segment when the current one is
/// nearly exhausted.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(test)]
mod stack_tests {
    use super::ensure_sufficient_stack;

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn count(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + count(n - 1) })
        }
        assert_eq!(count(100_000), 100_000);
    }
}
