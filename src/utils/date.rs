use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::utils::error::{AppError, AppResult};

/// Tidszon som teamet arbetar i om inget annat är konfigurerat
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Kalenderberäkningar i en fast tidszon, oberoende av värdens tidszon.
///
/// Alla metoder är rena funktioner av (instant, tidszon).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateService {
    tz: Tz,
}

impl Default for DateService {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Chicago,
        }
    }
}

impl DateService {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Skapa från ett IANA-namn, t.ex. "Europe/Stockholm"
    pub fn from_name(name: &str) -> AppResult<Self> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| AppError::validation(format!("Okänd tidszon: {}", name)))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn timezone_name(&self) -> &'static str {
        self.tz.name()
    }

    /// Aktuellt ögonblick
    pub fn today(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Kalenderdag för ögonblicket i konfigurerad tidszon
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Dagens kalenderdag i konfigurerad tidszon
    pub fn today_local(&self) -> NaiveDate {
        self.local_date(self.today())
    }

    pub fn to_iso_date(&self, instant: DateTime<Utc>) -> String {
        format_date(self.local_date(instant))
    }

    pub fn is_weekend(&self, instant: DateTime<Utc>) -> bool {
        matches!(self.local_date(instant).weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Lokal midnatt för föregående kalenderdag
    pub fn yesterday(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        let today = self.local_date(instant);
        let previous = today.pred_opt().unwrap_or(today);
        self.start_of_day(previous)
    }

    /// Första giltiga lokala tidpunkten för dagen. Midnatt kan saknas
    /// i zoner som byter sommartid vid 00:00.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Tz> {
        (0..=3)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .find_map(|time| self.tz.from_local_datetime(&date.and_time(time)).earliest())
            .unwrap_or_else(|| self.tz.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    pub fn iso_week_number(&self, instant: DateTime<Utc>) -> u32 {
        iso_week_of(self.local_date(instant))
    }

    /// Veckonummer för statusraden: lördag och söndag räknas till
    /// nästkommande måndags vecka.
    pub fn status_week_number(&self, instant: DateTime<Utc>) -> u32 {
        let date = self.local_date(instant);
        let shifted = match date.weekday() {
            Weekday::Sat => date + TimeDelta::days(2),
            Weekday::Sun => date + TimeDelta::days(1),
            _ => date,
        };
        iso_week_of(shifted)
    }

    /// Visningsetikett, t.ex. "Tue, Jan 02 2024"
    pub fn format_display(&self, instant: DateTime<Utc>) -> String {
        self.local_date(instant).format("%a, %b %d %Y").to_string()
    }

    /// "Local time: 14:05 CST | Week 3"
    pub fn status_line(&self, instant: DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.tz);
        format!(
            "Local time: {} | Week {}",
            local.format("%H:%M %Z"),
            self.status_week_number(instant)
        )
    }
}

/// ISO-8601-vecka: hitta torsdagen i datumets vecka och räkna hela
/// veckor från början av torsdagens år.
pub fn iso_week_of(date: NaiveDate) -> u32 {
    let offset = 3 - i64::from(date.weekday().num_days_from_monday());
    let thursday = date + TimeDelta::days(offset);
    thursday.ordinal0() / 7 + 1
}

/// Parse ett datum från en sträng (flexibelt format)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%m/%d/%Y", // 01/15/2024
        "%Y%m%d",   // 20240115
    ];

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Formatera ett datum som YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_iso_date_uses_configured_timezone() {
        let dates = DateService::default();
        // 03:00 UTC är 21:00 kvällen innan i Chicago
        let at = instant(2024, 1, 2, 3);
        assert_eq!(dates.to_iso_date(at), "2024-01-01");

        let utc = DateService::new(chrono_tz::UTC);
        assert_eq!(utc.to_iso_date(at), "2024-01-02");
    }

    #[test]
    fn test_iso_week_year_boundaries() {
        // Fredag 1 jan 2021 -> vecka 53 av 2020
        assert_eq!(iso_week_of(date(2021, 1, 1)), 53);
        // Lördag 1 jan 2022 -> vecka 52 av 2021
        assert_eq!(iso_week_of(date(2022, 1, 1)), 52);
        // Söndag 1 jan 2023 -> vecka 52 av 2022
        assert_eq!(iso_week_of(date(2023, 1, 1)), 52);
        // Torsdag 1 jan 2015 -> vecka 1
        assert_eq!(iso_week_of(date(2015, 1, 1)), 1);
        // Måndag 29 dec 2014 hör till vecka 1 av 2015
        assert_eq!(iso_week_of(date(2014, 12, 29)), 1);
    }

    #[test]
    fn test_iso_week_matches_chrono() {
        let mut day = date(2019, 12, 1);
        let end = date(2027, 2, 1);
        while day < end {
            assert_eq!(iso_week_of(day), day.iso_week().week(), "{}", day);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_is_weekend() {
        let dates = DateService::default();
        // Lördag 6 jan 2024, 18:00 UTC = 12:00 i Chicago
        assert!(dates.is_weekend(instant(2024, 1, 6, 18)));
        // Måndag 8 jan 02:00 UTC är fortfarande söndag i Chicago
        assert!(dates.is_weekend(instant(2024, 1, 8, 2)));
        assert!(!dates.is_weekend(instant(2024, 1, 8, 18)));
    }

    #[test]
    fn test_yesterday_is_local_midnight() {
        let dates = DateService::default();
        let y = dates.yesterday(instant(2024, 3, 15, 18));
        assert_eq!(y.date_naive(), date(2024, 3, 14));
        assert_eq!(y.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_start_of_day_in_dst_gap() {
        // Santiago byter till sommartid vid midnatt
        let dates = DateService::new(chrono_tz::America::Santiago);
        let start = dates.start_of_day(date(2023, 9, 3));
        assert_eq!(start.date_naive(), date(2023, 9, 3));
    }

    #[test]
    fn test_status_week_rolls_weekend_forward() {
        let dates = DateService::default();
        // Lördag 30 dec 2023 (vecka 52) visas som vecka 1
        let saturday = instant(2023, 12, 30, 18);
        assert_eq!(dates.iso_week_number(saturday), 52);
        assert_eq!(dates.status_week_number(saturday), 1);

        let wednesday = instant(2024, 1, 10, 18);
        assert_eq!(dates.status_week_number(wednesday), 2);
    }

    #[test]
    fn test_format_display_and_status_line() {
        let dates = DateService::default();
        let at = instant(2024, 1, 2, 20);
        assert_eq!(dates.format_display(at), "Tue, Jan 02 2024");
        assert_eq!(dates.status_line(at), "Local time: 14:00 CST | Week 1");
    }

    #[test]
    fn test_from_name() {
        assert!(DateService::from_name("Europe/Stockholm").is_ok());
        assert!(matches!(
            DateService::from_name("Mars/Olympus"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("invalid"), None);
    }
}
