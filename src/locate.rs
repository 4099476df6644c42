use crate::error::ProfileError;
use crate::models::WeatherMatch;
use crate::reference::ReferenceTables;

/// Representative weather file (without extension) for each US climate zone.
const WEATHER_FILES: [(&str, &str); 15] = [
    ("1A", "1A_USA_FL_MIAMI"),
    ("2A", "2A_USA_TX_HOUSTON"),
    ("2B", "2B_USA_AZ_PHOENIX"),
    ("3A", "3A_USA_GA_ATLANTA"),
    ("3B", "3B_USA_NV_LAS_VEGAS"),
    ("3C", "3C_USA_CA_SAN_FRANCISCO"),
    ("4A", "4A_USA_MD_BALTIMORE"),
    ("4B", "4B_USA_NM_ALBUQUERQUE"),
    ("4C", "4C_USA_WA_SEATTLE"),
    ("5A", "5A_USA_IL_CHICAGO-OHARE"),
    ("5B", "5B_USA_CO_BOULDER"),
    ("6A", "6A_USA_MN_MINNEAPOLIS"),
    ("6B", "6B_USA_MT_HELENA"),
    ("7A", "7A_USA_MN_DULUTH"),
    ("8A", "8A_USA_AK_FAIRBANKS"),
];

pub fn representative_weather_file(climate_zone: &str) -> Option<&'static str> {
    WEATHER_FILES
        .iter()
        .find(|(zone, _)| *zone == climate_zone)
        .map(|(_, file)| *file)
}

/// Maps a zip code to its weather station and representative climate-zone weather file.
pub fn locate(zip: u32, tables: &ReferenceTables) -> Result<WeatherMatch, ProfileError> {
    let station_id = tables
        .zip_stations
        .get(&zip)
        .ok_or(ProfileError::UnknownZip {
            zip,
            table: "zip-to-station table",
        })?;
    let climate_zone = tables
        .zip_climate_zones
        .get(&zip)
        .ok_or(ProfileError::UnknownZip {
            zip,
            table: "zip-to-climate-zone table",
        })?
        .to_string();
    let weather_file = representative_weather_file(&climate_zone)
        .ok_or_else(|| ProfileError::UnknownClimateZone(climate_zone.clone()))?;

    tracing::debug!(zip, station = %station_id, %climate_zone, weather_file, "zip located");

    Ok(WeatherMatch {
        station_id: station_id.clone(),
        climate_zone,
        representative_weather_file: weather_file.to_string(),
    })
}
