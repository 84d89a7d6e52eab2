use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Prochaine date tombant un `weekday`, aujourd'hui compris.
pub fn next_draw_date(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let delta = (7 + weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        % 7;
    today + Duration::days(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day() {
        // 2024-01-03 est un mercredi
        assert_eq!(next_draw_date(date(2024, 1, 3), Weekday::Wed), date(2024, 1, 3));
    }

    #[test]
    fn test_later_in_week() {
        assert_eq!(next_draw_date(date(2024, 1, 3), Weekday::Sat), date(2024, 1, 6));
    }

    #[test]
    fn test_wraps_to_next_week() {
        assert_eq!(next_draw_date(date(2024, 1, 3), Weekday::Mon), date(2024, 1, 8));
        assert_eq!(next_draw_date(date(2024, 1, 7), Weekday::Sat), date(2024, 1, 13));
    }
}
