use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for control IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Interned identifier of a control on the designer canvas.
/// 4 bytes, `Copy`, O(1) equality and hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(Spur);

impl ControlId {
    /// Intern a string as a ControlId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ControlId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a type prefix (e.g. `button_3`).
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}_{n}");
            // Skip names a loaded document already uses.
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ControlId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ControlId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ControlId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ControlId::intern("start_button");
        let b = ControlId::intern("start_button");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "start_button");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = ControlId::with_prefix("label");
        let b = ControlId::with_prefix("label");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("label_"));
    }

    #[test]
    fn prefixed_ids_skip_taken_names() {
        let taken = ControlId::with_prefix("gauge");
        // Reserve the next few names so the generator has to step over them.
        let n: u64 = taken.as_str()["gauge_".len()..].parse().unwrap();
        for k in 1..4 {
            ControlId::intern(&format!("gauge_{}", n + k));
        }
        let fresh = ControlId::with_prefix("gauge");
        let m: u64 = fresh.as_str()["gauge_".len()..].parse().unwrap();
        assert!(m >= n + 4);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ControlId::intern("tank_level");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tank_level\"");
        let back: ControlId = serde_json::from_str("\"tank_level\"").unwrap();
        assert_eq!(back, id);
    }
}
