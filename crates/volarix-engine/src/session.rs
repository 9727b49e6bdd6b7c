use chrono::Timelike;
use chrono_tz::America::New_York;
use volarix_core::BarWindow;

/// Gates the decision bar by its Eastern-time hour. The input time is
/// always UTC and is converted explicitly rather than assumed to already
/// be Eastern.
pub fn check(window: &BarWindow) -> Result<(), &'static str> {
    let hour = window.decision_bar().time.with_timezone(&New_York).hour();
    if (3..11).contains(&hour) || (8..22).contains(&hour) {
        Ok(())
    } else {
        Err("Outside trading session (London/NY only)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use volarix_core::{Bar, Timeframe};

    /// 200 hourly bars ending exactly at `last_utc`.
    fn window_ending_at(last_utc: chrono::DateTime<Utc>) -> BarWindow {
        let start = last_utc - Duration::hours(199);
        let bars: Vec<Bar> = (0..200)
            .map(|i| Bar {
                time: start + Duration::hours(i),
                open: dec!(1.1000),
                high: dec!(1.1010),
                low: dec!(1.0990),
                close: dec!(1.1000),
                volume: 100,
            })
            .collect();
        BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap()
    }

    #[test]
    fn accepts_london_hours() {
        // 2025-02-10 15:00Z is 10:00 ET (EST, UTC-5 in February) -- within London [3,11).
        let last = Utc.with_ymd_and_hms(2025, 2, 10, 15, 0, 0).unwrap();
        let window = window_ending_at(last);
        assert!(check(&window).is_ok());
    }

    #[test]
    fn rejects_outside_session() {
        // 2025-02-10 07:00Z is 02:00 ET -- outside both sessions.
        let last = Utc.with_ymd_and_hms(2025, 2, 10, 7, 0, 0).unwrap();
        let window = window_ending_at(last);
        assert_eq!(
            check(&window),
            Err("Outside trading session (London/NY only)")
        );
    }

    #[test]
    fn accepts_ny_afternoon_hours() {
        // 2025-02-10 20:00Z is 15:00 ET -- within NY [8,22).
        let last = Utc.with_ymd_and_hms(2025, 2, 10, 20, 0, 0).unwrap();
        let window = window_ending_at(last);
        assert!(check(&window).is_ok());
    }
}
