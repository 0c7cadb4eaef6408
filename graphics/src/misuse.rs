//! Warn-once reporting for programmer misuse.
//!
//! Misuse never fails an operation: the offending call is dropped and a
//! warning is logged the first time each kind occurs in a context.

use bitflags::bitflags;

bitflags! {
    /// Kinds of misuse reported through [`MisuseLog`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Misuse: u32 {
        /// `pop_matrix` or `pop_style` on an empty stack.
        const POP_EMPTY_STACK = 1 << 0;
        /// A scope or shape ended, or was added to, without being begun.
        const END_WITHOUT_BEGIN = 1 << 1;
        /// A mesh index points outside its vertex array.
        const INDEX_OUT_OF_RANGE = 1 << 2;
        /// A texture created on another device.
        const WRONG_DEVICE_TEXTURE = 1 << 3;
        /// `SetClear` recorded after other commands.
        const MISPLACED_CLEAR = 1 << 4;
        /// A draw command failed validation.
        const INVALID_COMMAND = 1 << 5;
        /// All light slots are in use.
        const NO_FREE_LIGHT = 1 << 6;
        /// A light slot that holds no light.
        const UNKNOWN_LIGHT = 1 << 7;
    }
}

/// Remembers which kinds of misuse were already reported.
#[derive(Debug, Clone, Default)]
pub struct MisuseLog {
    reported: Misuse,
}

impl MisuseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `message` if `kind` has not been reported yet. Returns `true` when
    /// a warning was emitted.
    pub fn report(&mut self, kind: Misuse, message: impl std::fmt::Display) -> bool {
        if self.reported.contains(kind) {
            log::trace!("{message}");
            return false;
        }
        self.reported.insert(kind);
        log::warn!("{message}");
        true
    }

    /// Kinds reported so far.
    pub fn reported(&self) -> Misuse {
        self.reported
    }

    pub fn has_reported(&self, kind: Misuse) -> bool {
        self.reported.contains(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warns_once_per_kind() {
        let mut log = MisuseLog::new();
        assert!(log.report(Misuse::POP_EMPTY_STACK, "pop on empty stack"));
        assert!(!log.report(Misuse::POP_EMPTY_STACK, "pop on empty stack"));
        assert!(log.report(Misuse::WRONG_DEVICE_TEXTURE, "foreign texture"));
        assert_eq!(
            log.reported(),
            Misuse::POP_EMPTY_STACK | Misuse::WRONG_DEVICE_TEXTURE
        );
        assert!(!log.has_reported(Misuse::MISPLACED_CLEAR));
    }
}
