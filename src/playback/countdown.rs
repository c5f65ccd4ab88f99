//! The single-shot timer that advances spreads
//!
//! A countdown is plain data held by the controller. Arming replaces it with
//! a fresh generation; whoever waits on it must present that generation when
//! it elapses, so an expiry can never apply to a countdown that was since
//! disarmed or replaced.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    generation: u64,
    page: usize,
    seconds: u32,
}

impl Countdown {
    pub(crate) fn new(generation: u64, page: usize, seconds: u32) -> Self {
        Self {
            generation,
            page,
            seconds,
        }
    }

    /// Token identifying this arming
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Page whose interval this countdown runs for
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let countdown = Countdown::new(3, 1, 5);
        assert_eq!(countdown.duration(), Duration::from_secs(5));
        assert_eq!(countdown.generation(), 3);
        assert_eq!(countdown.page(), 1);
    }
}
