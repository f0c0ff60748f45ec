// tests/gate/error_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use admission_gate::{
        AdmissionConfig, AdmissionController, GateError, LimiterConfig, SlidingWindowLimiter,
    };

    #[test]
    fn clock_error_propagates_in_check() {
        let clock = TestClock::new(0);
        let limiter: SlidingWindowLimiter<String, _> =
            SlidingWindowLimiter::with_config(LimiterConfig::new(10, 60_000), clock.clone())
                .unwrap();

        clock.fail_next_call();
        let result = limiter.check("client1".to_string());
        match result.unwrap_err() {
            GateError::Clock(_) => {}
            other => panic!("Expected Clock error, got: {other:?}"),
        }

        // Clock works again automatically
        assert!(limiter.check("client1".to_string()).unwrap().allowed);
    }

    #[test]
    fn clock_error_propagates_in_sweep() {
        let clock = TestClock::new(0);
        let limiter: SlidingWindowLimiter<String, _> =
            SlidingWindowLimiter::with_config(LimiterConfig::new(10, 1000), clock.clone()).unwrap();

        limiter.check("client1".to_string()).unwrap();

        clock.fail_next_call();
        assert!(matches!(
            limiter.sweep_expired(),
            Err(GateError::Clock(_))
        ));

        // nothing was dropped by the failed sweep
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn clock_error_propagates_in_admission_calls() {
        let clock = TestClock::new(0);
        let gate =
            AdmissionController::with_config(AdmissionConfig::default(), clock.clone()).unwrap();

        clock.fail_next_call();
        assert!(matches!(gate.acquire_slot("a"), Err(GateError::Clock(_))));

        clock.fail_next_call();
        assert!(matches!(gate.capacity_status(), Err(GateError::Clock(_))));

        clock.fail_next_call();
        assert!(matches!(gate.check_availability(), Err(GateError::Clock(_))));

        clock.fail_next_call();
        assert!(matches!(
            gate.book_email_slot("a@b.com", "t1"),
            Err(GateError::Clock(_))
        ));

        // all calls succeed once the clock recovers
        assert!(gate.acquire_slot("a").unwrap().is_some());
        assert!(gate.capacity_status().is_ok());
    }

    #[test]
    fn booking_validation_is_flagged_for_a_400() {
        let clock = TestClock::new(0);
        let gate = AdmissionController::with_config(AdmissionConfig::default(), clock).unwrap();

        let email_err = gate.book_email_slot("not-an-email", "t1").unwrap_err();
        assert!(email_err.is_validation());

        let ticket_err = gate.book_email_slot("a@b.com", "").unwrap_err();
        assert!(ticket_err.is_validation());

        // a clock fault is not a client mistake
        assert!(!GateError::Clock(admission_gate::ClockError::SystemTimeError).is_validation());
    }

    #[test]
    fn error_display_identifies_the_field() {
        let clock = TestClock::new(0);
        let gate = AdmissionController::with_config(AdmissionConfig::default(), clock).unwrap();

        let message = gate.book_email_slot("nope", "t1").unwrap_err().to_string();
        assert!(message.to_lowercase().contains("email"));

        let message = gate.book_email_slot("a@b.com", "").unwrap_err().to_string();
        assert!(message.to_lowercase().contains("ticket"));
    }

    #[test]
    fn config_validation_errors_still_work() {
        let clock = TestClock::new(0);

        let result = AdmissionController::with_config(
            AdmissionConfig::default().max_concurrent(0),
            clock.clone(),
        );
        assert!(matches!(
            result.unwrap_err(),
            GateError::InvalidMaxConcurrent
        ));

        let result = SlidingWindowLimiter::<String, _>::with_config(
            LimiterConfig::new(0, 1000),
            clock,
        );
        assert!(matches!(result.unwrap_err(), GateError::InvalidMaxRequests));
    }
}
