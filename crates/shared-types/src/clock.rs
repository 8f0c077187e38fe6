//! Source of "now" for everything that splits observed from projected years

use chrono::Datelike;

pub trait Clock {
    fn current_year(&self) -> i32;
}

/// Wall clock, backed by `chrono` (uses `Date.now()` in the browser)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        chrono::Utc::now().year()
    }
}

/// Clock pinned to one year, so transforms are reproducible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(2024).current_year(), 2024);
        assert!(SystemClock.current_year() >= 2024);
    }
}
