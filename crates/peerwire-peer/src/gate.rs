use std::sync::atomic::{AtomicBool, Ordering};

/// Lets a warning through once, then stays shut.
///
/// Used for conditions that would otherwise repeat on every call, such as a
/// socket that refuses the flush option. There is no reset.
#[derive(Debug, Default)]
pub struct WarnOnce {
    fired: AtomicBool,
}

impl WarnOnce {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Run `emit` if this gate has never fired. Returns whether it ran.
    pub fn warn(&self, emit: impl FnOnce()) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        emit();
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Process-wide gate for "could not set the flush option" warnings.
pub static FLUSH_OPTION_WARNING: WarnOnce = WarnOnce::new();
