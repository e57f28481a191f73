//! Property tests for counting, debounce, idle reset and lockout monotonicity.

use proptest::prelude::*;
use scrollgate_core::{Clock, LimiterConfig, ManualClock, ScrollLimiter};

const T0: u64 = 1_700_000_000_000;

fn limiter(ceiling: u32) -> (ScrollLimiter<ManualClock>, ManualClock) {
    let clock = ManualClock::new(T0);
    let config = LimiterConfig {
        ceiling,
        ..LimiterConfig::default()
    };
    (ScrollLimiter::in_memory(config, clock.clone()), clock)
}

proptest! {
    #[test]
    fn spaced_scrolls_are_all_counted(gaps in prop::collection::vec(300u64..5_000, 0..200)) {
        let (mut limiter, clock) = limiter(1_000);
        for gap in &gaps {
            clock.advance(*gap);
            limiter.register_scroll();
        }
        prop_assert_eq!(limiter.activity_count() as usize, gaps.len());
    }

    #[test]
    fn debounce_counts_first_scroll_per_window(gaps in prop::collection::vec(0u64..600, 1..300)) {
        let (mut limiter, clock) = limiter(10_000);
        let mut expected = 0u32;
        let mut last_accepted: Option<u64> = None;
        for gap in &gaps {
            clock.advance(*gap);
            let now = clock.now_ms();
            if last_accepted.map_or(true, |last| now - last >= 300) {
                last_accepted = Some(now);
                expected += 1;
            }
            limiter.register_scroll();
        }
        prop_assert_eq!(limiter.activity_count(), expected);
    }

    #[test]
    fn idle_reset_clears_any_count(n in 1u32..120, idle_extra in 0u64..3_600_000) {
        let (mut limiter, clock) = limiter(1_000);
        for _ in 0..n {
            clock.advance(300);
            limiter.register_scroll();
        }
        clock.advance(10 * 60_000 + idle_extra);
        limiter.tick_idle_check();
        prop_assert_eq!(limiter.activity_count(), 0);
        prop_assert_eq!(limiter.first_activity_ms(), Some(clock.now_ms()));
    }

    #[test]
    fn lockout_is_monotonic(steps in prop::collection::vec(1u64..120_000, 1..60)) {
        let (mut limiter, clock) = limiter(1);
        clock.advance(300);
        limiter.register_scroll();
        clock.advance(300);
        limiter.register_scroll();
        let until = limiter.lockout_until();
        prop_assert!(until > clock.now_ms());

        for step in &steps {
            clock.advance(*step);
            let now = clock.now_ms();
            let observed = limiter.lockout_until();
            if now < until {
                prop_assert_eq!(observed, until);
            } else {
                prop_assert_eq!(observed, 0);
            }
            limiter.tick();
            prop_assert_eq!(limiter.lockout_until(), observed);
        }
    }
}
