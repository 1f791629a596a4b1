//! Inter-request spacing between rows.
//!
//! A scheduling policy, not a correctness requirement: rows are spaced by a
//! randomized delay, and every Nth row takes a longer cooldown pause to keep
//! the aggregate request rate low. Fully configurable and disableable so test
//! runs finish instantly.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Pacing {
    /// Randomized delay bounds between consecutive rows, in milliseconds.
    pub between_ms: (u64, u64),
    /// Every Nth processed row takes the cooldown pause instead. 0 disables
    /// cooldowns entirely.
    pub cooldown_every: usize,
    pub cooldown_ms: (u64, u64),
    pub enabled: bool,
}

/// Which pause a given row gets. Split out so the selection logic is testable
/// without sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PauseKind {
    Between,
    Cooldown,
}

impl Pacing {
    /// A pacing policy that never sleeps, for tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            between_ms: (0, 0),
            cooldown_every: 0,
            cooldown_ms: (0, 0),
            enabled: false,
        }
    }

    pub(crate) fn pause_kind(&self, rows_processed: usize) -> PauseKind {
        if self.cooldown_every > 0 && rows_processed % self.cooldown_every == 0 {
            PauseKind::Cooldown
        } else {
            PauseKind::Between
        }
    }

    /// Sleep the appropriate randomized delay after processing the
    /// `rows_processed`-th row (1-based).
    pub async fn rest_after(&self, rows_processed: usize) {
        if !self.enabled {
            return;
        }
        let (lo, hi) = match self.pause_kind(rows_processed) {
            PauseKind::Between => self.between_ms,
            PauseKind::Cooldown => {
                tracing::debug!(rows_processed, "cooldown pause");
                self.cooldown_ms
            }
        };
        let delay_ms = if hi > lo {
            rand::rng().random_range(lo..=hi)
        } else {
            lo
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacing(cooldown_every: usize) -> Pacing {
        Pacing {
            between_ms: (4000, 8000),
            cooldown_every,
            cooldown_ms: (20000, 40000),
            enabled: true,
        }
    }

    #[test]
    fn every_fifth_row_cools_down() {
        let p = pacing(5);
        assert_eq!(p.pause_kind(1), PauseKind::Between);
        assert_eq!(p.pause_kind(4), PauseKind::Between);
        assert_eq!(p.pause_kind(5), PauseKind::Cooldown);
        assert_eq!(p.pause_kind(6), PauseKind::Between);
        assert_eq!(p.pause_kind(10), PauseKind::Cooldown);
    }

    #[test]
    fn zero_interval_never_cools_down() {
        let p = pacing(0);
        assert_eq!(p.pause_kind(5), PauseKind::Between);
        assert_eq!(p.pause_kind(100), PauseKind::Between);
    }

    #[tokio::test]
    async fn disabled_pacing_returns_immediately() {
        let p = Pacing::disabled();
        // Would sleep 20-40s on row 5 if the flag were ignored.
        tokio::time::timeout(Duration::from_millis(50), p.rest_after(5))
            .await
            .expect("disabled pacing must not sleep");
    }
}
