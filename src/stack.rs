//! Stack growth for the recursive parser and evaluator.
//!
//! Nested expressions and recursive calls recurse on the host stack. Wrapping
//! each recursive step in [`ensure_sufficient_stack`] grows the stack on
//! demand, so deep programs hit the evaluator's call depth limit instead of
//! overflowing the thread.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
