//! Readiness masks and their translation to library wait codes.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

use crate::raw::types::{WaitStatus, wait};

/// Set of conditions over {Read, Write, Timeout}.
///
/// Used both for what a pending operation waits on and for what the event
/// loop observed when it resumes the operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ready(u8);

impl Ready {
    /// No condition
    pub const EMPTY: Ready = Ready(0);
    /// Socket readable
    pub const READ: Ready = Ready(0b001);
    /// Socket writable
    pub const WRITE: Ready = Ready(0b010);
    /// Timeout elapsed
    pub const TIMEOUT: Ready = Ready(0b100);
    /// Every condition
    pub const ALL: Ready = Ready(0b111);

    /// Returns true if no condition is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every condition in `other` is set in `self`.
    pub const fn contains(self, other: Ready) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_readable(self) -> bool {
        self.contains(Ready::READ)
    }

    pub const fn is_writable(self) -> bool {
        self.contains(Ready::WRITE)
    }

    pub const fn is_timeout(self) -> bool {
        self.contains(Ready::TIMEOUT)
    }

    /// The I/O part of the mask (Read and Write only).
    pub const fn io(self) -> Ready {
        Ready(self.0 & (Ready::READ.0 | Ready::WRITE.0))
    }

    /// Translate to the library wait code passed to a `*_cont` call.
    pub const fn to_wait_status(self) -> WaitStatus {
        let mut status = 0;
        if self.is_readable() {
            status |= wait::READ;
        }
        if self.is_writable() {
            status |= wait::WRITE;
        }
        if self.is_timeout() {
            status |= wait::TIMEOUT;
        }
        status
    }

    /// Translate a wait code reported by a `*_start` / `*_cont` call.
    ///
    /// `EXCEPT` is an input-side condition and is folded into Read.
    pub const fn from_wait_status(status: WaitStatus) -> Ready {
        let mut bits = 0;
        if status & (wait::READ | wait::EXCEPT) != 0 {
            bits |= Ready::READ.0;
        }
        if status & wait::WRITE != 0 {
            bits |= Ready::WRITE.0;
        }
        if status & wait::TIMEOUT != 0 {
            bits |= Ready::TIMEOUT.0;
        }
        Ready(bits)
    }
}

impl BitOr for Ready {
    type Output = Ready;

    fn bitor(self, rhs: Ready) -> Ready {
        Ready(self.0 | rhs.0)
    }
}

impl BitOrAssign for Ready {
    fn bitor_assign(&mut self, rhs: Ready) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Ready {
    type Output = Ready;

    fn bitand(self, rhs: Ready) -> Ready {
        Ready(self.0 & rhs.0)
    }
}

impl fmt::Debug for Ready {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Ready(EMPTY)");
        }
        let mut names = Vec::with_capacity(3);
        if self.is_readable() {
            names.push("READ");
        }
        if self.is_writable() {
            names.push("WRITE");
        }
        if self.is_timeout() {
            names.push("TIMEOUT");
        }
        write!(f, "Ready({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_masks() -> Vec<Ready> {
        (0..8u8).map(Ready).collect()
    }

    #[test]
    fn test_round_trip_every_subset() {
        for mask in all_masks() {
            assert_eq!(Ready::from_wait_status(mask.to_wait_status()), mask);
        }
    }

    #[test]
    fn test_library_codes() {
        assert_eq!(Ready::READ.to_wait_status(), wait::READ);
        assert_eq!(Ready::WRITE.to_wait_status(), wait::WRITE);
        assert_eq!(Ready::TIMEOUT.to_wait_status(), wait::TIMEOUT);
        assert_eq!(Ready::EMPTY.to_wait_status(), 0);
        assert_eq!(
            (Ready::READ | Ready::TIMEOUT).to_wait_status(),
            wait::READ | wait::TIMEOUT
        );
    }

    #[test]
    fn test_except_folds_into_read() {
        assert_eq!(Ready::from_wait_status(wait::EXCEPT), Ready::READ);
        assert_eq!(
            Ready::from_wait_status(wait::EXCEPT | wait::WRITE),
            Ready::READ | Ready::WRITE
        );
    }

    #[test]
    fn test_io_drops_timeout() {
        assert_eq!(Ready::ALL.io(), Ready::READ | Ready::WRITE);
        assert!(Ready::TIMEOUT.io().is_empty());
    }

    #[test]
    fn test_debug() {
        assert_eq!(
            format!("{:?}", Ready::READ | Ready::TIMEOUT),
            "Ready(READ | TIMEOUT)"
        );
        assert_eq!(format!("{:?}", Ready::EMPTY), "Ready(EMPTY)");
    }
}
