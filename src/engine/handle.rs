//! `EntityHandle`: an opaque, engine-issued reference to a volume or surface.
//!
//! The engine decides what the number means; this crate only stores,
//! compares and prints it. Zero is reserved so that "no entity" can be
//! expressed with `Option<EntityHandle>` at no extra cost.

use std::{fmt, num::NonZeroU64};

/// Opaque native handle for a geometry entity.
///
/// `repr(transparent)` over `NonZeroU64`, so `Option<EntityHandle>` is the
/// same size as a `u64`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct EntityHandle(NonZeroU64);

impl EntityHandle {
    /// Wraps a raw engine handle. Returns `None` for zero.
    #[inline]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(EntityHandle)
    }

    /// Raw engine value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityHandle").field(&self.get()).finish()
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(EntityHandle::new(0).is_none());
    }

    #[test]
    fn display_prints_raw_value() {
        let h = EntityHandle::new(42).unwrap();
        assert_eq!(h.to_string(), "42");
        assert_eq!(format!("{h:?}"), "EntityHandle(42)");
    }

    #[test]
    fn json_roundtrip() {
        let h = EntityHandle::new(7).unwrap();
        let s = serde_json::to_string(&h).unwrap();
        assert_eq!(s, "7");
        let back: EntityHandle = serde_json::from_str(&s).unwrap();
        assert_eq!(back, h);
    }
}
