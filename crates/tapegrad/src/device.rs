//! Device placement tags and the device memory-cache hook.
//!
//! Computation always happens on the host; [`Device`] records where a
//! tensor's buffer is meant to live so that callers backed by an accelerator
//! runtime can be told when its cached allocations may be released.

use parking_lot::{RwLock, const_rwlock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement of a tensor's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Device {
    /// Host memory.
    #[default]
    Cpu,
    /// Accelerator with device ordinal.
    Accelerator(usize),
}

impl Device {
    /// Whether this is host memory.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// Whether this is an accelerator.
    pub fn is_accelerator(&self) -> bool {
        matches!(self, Device::Accelerator(_))
    }

    /// Accelerator ordinal, if applicable.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Device::Accelerator(idx) => Some(*idx),
            Device::Cpu => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Accelerator(idx) => write!(f, "accel:{idx}"),
        }
    }
}

type CacheReleaseHook = Box<dyn Fn() + Send + Sync>;

static CACHE_RELEASE_HOOK: RwLock<Option<CacheReleaseHook>> = const_rwlock(None);

/// Install the callback that frees an accelerator runtime's cached memory.
///
/// Replaces any previously installed hook.
pub fn set_cache_release_hook<F>(hook: F)
where
    F: Fn() + Send + Sync + 'static,
{
    *CACHE_RELEASE_HOOK.write() = Some(Box::new(hook));
}

/// Remove the installed cache-release hook.
pub fn clear_cache_release_hook() {
    *CACHE_RELEASE_HOOK.write() = None;
}

/// Ask the accelerator runtime to drop cached allocations.
///
/// Best effort: returns `false` when no hook is installed.
pub fn release_device_cache() -> bool {
    match CACHE_RELEASE_HOOK.read().as_ref() {
        Some(hook) => {
            hook();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_properties() {
        assert!(Device::Cpu.is_cpu());
        assert!(!Device::Cpu.is_accelerator());
        assert!(Device::Accelerator(0).is_accelerator());
        assert_eq!(Device::Accelerator(1).ordinal(), Some(1));
        assert_eq!(Device::Cpu.ordinal(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Device::Cpu), "cpu");
        assert_eq!(format!("{}", Device::Accelerator(0)), "accel:0");
    }

    #[test]
    fn test_default() {
        assert_eq!(Device::default(), Device::Cpu);
    }
}
