// tests/gate/limiter_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use admission_gate::{LimiterConfig, SlidingWindowLimiter};

    fn limiter(
        max_requests: u32,
        window_ms: u64,
        clock: TestClock,
    ) -> SlidingWindowLimiter<String, TestClock> {
        SlidingWindowLimiter::with_config(LimiterConfig::new(max_requests, window_ms), clock)
            .unwrap()
    }

    #[test]
    fn three_per_minute_blocks_the_fourth() {
        let clock = TestClock::new(0);
        let limiter = limiter(3, 60_000, clock);

        for _ in 0..3 {
            assert!(limiter.check("key".to_string()).unwrap().allowed);
        }

        let decision = limiter.check("key".to_string()).unwrap();
        assert!(!decision.allowed);
        assert!(decision.retry_after_seconds.unwrap() > 0);
    }

    #[test]
    fn window_of_one_second_resets_at_1001() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1000, clock.clone());

        assert!(limiter.check("k".to_string()).unwrap().allowed);

        clock.set_ms(1001);
        assert!(limiter.check("k".to_string()).unwrap().allowed);
    }

    #[test]
    fn exhausting_one_key_never_blocks_another() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 60_000, clock);

        assert!(limiter.check("a".to_string()).unwrap().allowed);
        assert!(!limiter.check("a".to_string()).unwrap().allowed);
        assert!(limiter.check("b".to_string()).unwrap().allowed);
    }

    #[test]
    fn boundary_burst_admits_up_to_double_the_ceiling() {
        // Fixed-window trade-off: a burst straddling the boundary may admit
        // 2 * max_requests across it, and never more.
        let clock = TestClock::new(0);
        let limiter = limiter(2, 1000, clock.clone());

        clock.set_ms(900);
        assert!(limiter.check("k".to_string()).unwrap().allowed);
        assert!(limiter.check("k".to_string()).unwrap().allowed);
        assert!(!limiter.check("k".to_string()).unwrap().allowed);

        clock.set_ms(1901);
        assert!(limiter.check("k".to_string()).unwrap().allowed);
        assert!(limiter.check("k".to_string()).unwrap().allowed);
        assert!(!limiter.check("k".to_string()).unwrap().allowed);
    }

    #[test]
    fn retry_after_counts_whole_seconds_up() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 10_000, clock.clone());

        assert!(limiter.check("k".to_string()).unwrap().allowed);

        clock.set_ms(9_100);
        let decision = limiter.check("k".to_string()).unwrap();
        // 900ms remain, reported as 1 second
        assert_eq!(decision.retry_after_seconds, Some(1));
    }

    #[test]
    fn sweep_is_independent_of_checks() {
        let clock = TestClock::new(0);
        let limiter = limiter(5, 1000, clock.clone());

        for i in 0..10 {
            limiter.check(format!("key-{i}")).unwrap();
        }
        assert_eq!(limiter.tracked_keys(), 10);

        clock.set_ms(5_000);
        assert_eq!(limiter.sweep_expired().unwrap(), 10);
        assert_eq!(limiter.tracked_keys(), 0);

        // a swept key starts a fresh window
        assert!(limiter.check("key-0".to_string()).unwrap().allowed);
    }
}
