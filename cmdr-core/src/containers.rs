//! Container alias used by per-invocation state and command tables.
//!
//! Keeping the choice in one place lets tables and argument maps switch hashers together.

use hashbrown::HashMap as HbMap;

/// Hash map used by argument maps and command tables.
pub type HotMap<K, V> = HbMap<K, V>;
