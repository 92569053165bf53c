use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};

const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Western Indonesian Time (Asia/Jakarta). No daylight saving, so a fixed
/// offset is exact.
pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn now_wib() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&wib())
}

/// `scraped_at` representation, e.g. `2026-02-27T17:32:37+07:00`.
pub fn format_scraped_at(at: &DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scraped_at_carries_the_wib_offset() {
        let at = wib().with_ymd_and_hms(2026, 2, 27, 17, 32, 37).unwrap();
        assert_eq!(format_scraped_at(&at), "2026-02-27T17:32:37+07:00");
    }

    #[test]
    fn now_is_in_wib() {
        assert_eq!(now_wib().offset().local_minus_utc(), WIB_OFFSET_SECS);
    }
}
