use std::time::Duration;
use time::macros::time;
use time::{PrimitiveDateTime, Time, Weekday};

/// Working hours: passes only run when new documents can plausibly appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: Time,
    end: Time,
    weekdays_only: bool,
}
impl Default for Window {
    fn default() -> Self {
        Self::new(time!(6:00), time!(18:00), true)
    }
}
impl Window {
    /// `start..=end`, local time. An `end` before `start` makes an empty window.
    pub fn new(start: Time, end: Time, weekdays_only: bool) -> Self {
        Self { start, end, weekdays_only }
    }

    pub fn contains(&self, at: PrimitiveDateTime) -> bool {
        if self.weekdays_only && matches!(at.weekday(), Weekday::Saturday | Weekday::Sunday) {
            return false;
        }
        (self.start..=self.end).contains(&at.time())
    }
}

/// How often `watch` wakes up, and when it is allowed to do anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub period: Duration,
    pub window: Window,
}
impl Default for Schedule {
    fn default() -> Self {
        Self::every_hours(3, Window::default())
    }
}
impl Schedule {
    pub fn every_hours(hours: u64, window: Window) -> Self {
        Self {
            period: Duration::from_secs(hours.max(1).saturating_mul(3600)),
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    // 2024-03-04 is a Monday.
    #[case(datetime!(2024-03-04 06:00), true)]
    #[case(datetime!(2024-03-04 12:30), true)]
    #[case(datetime!(2024-03-04 18:00), true)]
    #[case(datetime!(2024-03-04 18:00:01), false)]
    #[case(datetime!(2024-03-04 05:59:59), false)]
    #[case(datetime!(2024-03-08 09:00), true)]
    #[case(datetime!(2024-03-09 09:00), false)]
    #[case(datetime!(2024-03-10 09:00), false)]
    fn test_default_window(#[case] at: PrimitiveDateTime, #[case] expected: bool) {
        assert_eq!(Window::default().contains(at), expected);
    }

    #[test]
    fn test_weekends_allowed() {
        let window = Window::new(time!(0:00), time!(23:59:59), false);
        assert!(window.contains(datetime!(2024-03-09 03:00)));
    }

    #[test]
    fn test_backwards_window_is_empty() {
        let window = Window::new(time!(18:00), time!(6:00), false);
        assert!(!window.contains(datetime!(2024-03-04 12:00)));
        assert!(!window.contains(datetime!(2024-03-04 20:00)));
    }

    #[test]
    fn test_schedule_period() {
        assert_eq!(Schedule::default().period, Duration::from_secs(3 * 3600));
        assert_eq!(Schedule::every_hours(0, Window::default()).period, Duration::from_secs(3600));
    }
}
