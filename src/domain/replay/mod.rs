pub mod ordering;

pub use ordering::{ReplaySnapshot, compare_for_replay, plan_batch};
