use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Archetype, BuildingRequest, HourlyLoad, LoadProfile, SynthesisMethod, Vintage, WeatherMatch,
};

/// Calendar month shown in the month, week and day windows.
pub const PRESENTED_MONTH: u32 = 3;

const HOURS_PER_DAY: usize = 24;
const HOURS_PER_WEEK: usize = 7 * HOURS_PER_DAY;

const TIMESTAMP_KEY_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Year,
    Month,
    Week,
    Day,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Year,
        TimeWindow::Month,
        TimeWindow::Week,
        TimeWindow::Day,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::Year => "year",
            TimeWindow::Month => "month",
            TimeWindow::Week => "week",
            TimeWindow::Day => "day",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TimeWindow::Year => "Yearly Load Profile",
            TimeWindow::Month => "Monthly Load Profile",
            TimeWindow::Week => "Weekly Load Profile",
            TimeWindow::Day => "Daily Load Profile",
        }
    }
}

/// Rows of `hours` that fall in `window`.
///
/// Month is the contiguous run of rows in [`PRESENTED_MONTH`]; week and day
/// are the leading 168 and 24 rows of that run.
pub fn slice(hours: &[HourlyLoad], window: TimeWindow) -> &[HourlyLoad] {
    if window == TimeWindow::Year {
        return hours;
    }

    let start = hours
        .iter()
        .position(|hour| hour.timestamp.month() == PRESENTED_MONTH)
        .unwrap_or(hours.len());
    let month_len = hours[start..]
        .iter()
        .take_while(|hour| hour.timestamp.month() == PRESENTED_MONTH)
        .count();
    let month = &hours[start..start + month_len];

    match window {
        TimeWindow::Year => hours,
        TimeWindow::Month => month,
        TimeWindow::Week => &month[..month.len().min(HOURS_PER_WEEK)],
        TimeWindow::Day => &month[..month.len().min(HOURS_PER_DAY)],
    }
}

pub fn timestamp_key(hour: &HourlyLoad) -> String {
    hour.timestamp.format(TIMESTAMP_KEY_FORMAT).to_string()
}

fn electricity_series(hours: &[HourlyLoad]) -> BTreeMap<String, f64> {
    hours
        .iter()
        .map(|hour| (timestamp_key(hour), hour.electricity_kw))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ArchetypeSummary {
    pub name: &'static str,
    pub reference_area_sqft: f64,
    pub floors: u32,
}

impl From<Archetype> for ArchetypeSummary {
    fn from(archetype: Archetype) -> Self {
        Self {
            name: archetype.name(),
            reference_area_sqft: archetype.reference_area(),
            floors: archetype.floors(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileSummary<'a> {
    pub profile_id: Uuid,
    pub method: SynthesisMethod,
    pub generated_at: DateTime<Utc>,
    pub source: &'a str,
    pub archetype: Option<ArchetypeSummary>,
    pub vintage: Vintage,
    pub request: &'a BuildingRequest,
    pub weather: &'a WeatherMatch,
    pub yearly: BTreeMap<String, f64>,
    pub monthly: BTreeMap<String, f64>,
    pub weekly: BTreeMap<String, f64>,
    pub daily: BTreeMap<String, f64>,
}

/// Nested yearly/monthly/weekly/daily electricity series for non-interactive use.
pub fn summarize<'a>(
    profile: &'a LoadProfile,
    request: &'a BuildingRequest,
    weather: &'a WeatherMatch,
    vintage: Vintage,
) -> ProfileSummary<'a> {
    ProfileSummary {
        profile_id: Uuid::new_v4(),
        method: profile.method,
        generated_at: Utc::now(),
        source: &profile.source,
        archetype: profile.archetype.map(ArchetypeSummary::from),
        vintage,
        request,
        weather,
        yearly: electricity_series(slice(&profile.hours, TimeWindow::Year)),
        monthly: electricity_series(slice(&profile.hours, TimeWindow::Month)),
        weekly: electricity_series(slice(&profile.hours, TimeWindow::Week)),
        daily: electricity_series(slice(&profile.hours, TimeWindow::Day)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::REFERENCE_YEAR;
    use chrono::{Duration, NaiveDate, Timelike};

    fn year_of_hours() -> Vec<HourlyLoad> {
        let start = NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..8760)
            .map(|i| HourlyLoad {
                timestamp: start + Duration::hours(i),
                electricity_kw: i as f64,
                natural_gas_kw: Some(1.0),
                conditioning: None,
            })
            .collect()
    }

    #[test]
    fn year_window_is_identity() {
        let hours = year_of_hours();
        assert_eq!(slice(&hours, TimeWindow::Year), hours.as_slice());
    }

    #[test]
    fn month_window_covers_march() {
        let hours = year_of_hours();
        let month = slice(&hours, TimeWindow::Month);
        assert_eq!(month.len(), 31 * 24);
        assert!(month.iter().all(|h| h.timestamp.month() == 3));
    }

    #[test]
    fn week_and_day_start_at_month_start() {
        let hours = year_of_hours();
        let week = slice(&hours, TimeWindow::Week);
        let day = slice(&hours, TimeWindow::Day);
        assert_eq!(week.len(), 168);
        assert_eq!(day.len(), 24);
        assert_eq!(day[0], week[0]);
        assert_eq!(day[0].timestamp.hour(), 0);
        assert_eq!(day[0].timestamp.day(), 1);
        assert_eq!(day[0].timestamp.month(), 3);
    }

    #[test]
    fn short_series_yield_empty_windows() {
        let hours: Vec<HourlyLoad> = year_of_hours().into_iter().take(48).collect();
        assert!(slice(&hours, TimeWindow::Month).is_empty());
        assert!(slice(&hours, TimeWindow::Day).is_empty());
        assert_eq!(slice(&hours, TimeWindow::Year).len(), 48);
    }

    #[test]
    fn summary_keys_are_chronological() {
        let profile = LoadProfile {
            method: SynthesisMethod::Doe,
            source: "Primary School".to_string(),
            archetype: Some(Archetype::PrimarySchool),
            hours: year_of_hours(),
        };
        let request = BuildingRequest::new("61", 80016, 2000, 20_000.0).unwrap();
        let weather = WeatherMatch {
            station_id: "725650".to_string(),
            climate_zone: "5B".to_string(),
            representative_weather_file: "5B_USA_CO_BOULDER".to_string(),
        };

        let summary = summarize(&profile, &request, &weather, Vintage::New2004);
        assert_eq!(summary.yearly.len(), 8760);
        assert_eq!(summary.daily.len(), 24);
        assert_eq!(summary.daily.keys().next().unwrap(), "2019-03-01 00:00");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["method"], "DOE");
        assert_eq!(json["vintage"], "New2004");
        assert_eq!(json["archetype"]["floors"], 1);
        assert_eq!(json["archetype"]["reference_area_sqft"], 73_960.0);
        assert_eq!(json["request"]["naics_code"], "61");
        assert_eq!(json["weekly"].as_object().unwrap().len(), 168);
    }
}
