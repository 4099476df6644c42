use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::ProfileError;
use crate::models::{Archetype, ClimateZone, HourlyLoad, Vintage};

/// Non-leap calendar year the hourly reference profiles are pinned to.
pub const REFERENCE_YEAR: i32 = 2019;

const NAICS_TO_EIA_FILE: &str = "naics_to_eia_type_map.csv";
const MANUAL_MAP_FILE: &str = "naics_manual_map.csv";
const ZIP_TO_STATION_FILE: &str = "Zip to Weather Station by Triangulation.csv";
const ZIP_TO_CLIMATE_ZONE_FILE: &str = "zip_to_climate_zone.csv";
const MECS_FILE: &str = "mecs_lookup.csv";
const PROCESS_SHAPE_FILE: &str = "base_manu_profile.csv";
const MEASURED_DIR: &str = "mendeley";

/// Broad building category for a two-digit NAICS prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct NaicsCategory {
    pub eia: String,
    pub split_by_area: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSource {
    Doe,
    Mendeley,
}

/// Hand-curated mapping for an exact NAICS code.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualOverride {
    pub source: OverrideSource,
    pub type_name: String,
}

impl ManualOverride {
    pub const NOT_APPLICABLE: &'static str = "N/A";

    pub fn is_applicable(&self) -> bool {
        let name = self.type_name.trim();
        !name.is_empty() && !name.eq_ignore_ascii_case(Self::NOT_APPLICABLE)
    }
}

/// Industry-wide MECS totals for a NAICS prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryIntensity {
    pub mio_kwh: f64,
    pub mio_sqft: f64,
}

/// Static lookup tables, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub naics_categories: HashMap<String, NaicsCategory>,
    pub manual_overrides: HashMap<String, ManualOverride>,
    pub zip_stations: HashMap<u32, String>,
    pub zip_climate_zones: HashMap<u32, ClimateZone>,
    pub industry_intensity: HashMap<String, IndustryIntensity>,
}

impl ReferenceTables {
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let naics_categories = read_naics_categories(open(&data_dir.join(NAICS_TO_EIA_FILE))?)
            .with_context(|| format!("failed to parse {NAICS_TO_EIA_FILE}"))?;

        let manual_path = data_dir.join(MANUAL_MAP_FILE);
        let manual_overrides = if manual_path.exists() {
            read_manual_overrides(open(&manual_path)?)
                .with_context(|| format!("failed to parse {MANUAL_MAP_FILE}"))?
        } else {
            tracing::debug!(path = %manual_path.display(), "no manual NAICS map; skipping overrides");
            HashMap::new()
        };

        let zip_stations = read_zip_stations(open(&data_dir.join(ZIP_TO_STATION_FILE))?)
            .with_context(|| format!("failed to parse {ZIP_TO_STATION_FILE}"))?;
        let zip_climate_zones =
            read_zip_climate_zones(open(&data_dir.join(ZIP_TO_CLIMATE_ZONE_FILE))?)
                .with_context(|| format!("failed to parse {ZIP_TO_CLIMATE_ZONE_FILE}"))?;
        let industry_intensity = read_industry_intensity(open(&data_dir.join(MECS_FILE))?)
            .with_context(|| format!("failed to parse {MECS_FILE}"))?;

        tracing::info!(
            categories = naics_categories.len(),
            overrides = manual_overrides.len(),
            zips = zip_stations.len(),
            industries = industry_intensity.len(),
            "reference tables loaded from {}",
            data_dir.display()
        );

        Ok(Self {
            naics_categories,
            manual_overrides,
            zip_stations,
            zip_climate_zones,
            industry_intensity,
        })
    }
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag '{other}'"))),
    }
}

pub fn read_naics_categories<R: Read>(reader: R) -> anyhow::Result<HashMap<String, NaicsCategory>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "NAICS")]
        naics: String,
        #[serde(rename = "EIA")]
        eia: String,
        #[serde(rename = "Post-process with SQFT", deserialize_with = "de_flag")]
        split_by_area: bool,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut table = HashMap::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        table.insert(
            row.naics.trim().to_string(),
            NaicsCategory {
                eia: row.eia.trim().to_string(),
                split_by_area: row.split_by_area,
            },
        );
    }

    Ok(table)
}

pub fn read_manual_overrides<R: Read>(
    reader: R,
) -> anyhow::Result<HashMap<String, ManualOverride>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "NAICS")]
        naics: String,
        #[serde(rename = "Source")]
        source: String,
        #[serde(rename = "Type")]
        type_name: String,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut table = HashMap::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source = match row.source.trim().to_ascii_lowercase().as_str() {
            "doe" => OverrideSource::Doe,
            "mendeley" => OverrideSource::Mendeley,
            other => anyhow::bail!("unknown override source '{other}' for NAICS {}", row.naics),
        };
        table.insert(
            row.naics.trim().to_string(),
            ManualOverride {
                source,
                type_name: row.type_name.trim().to_string(),
            },
        );
    }

    Ok(table)
}

pub fn read_zip_stations<R: Read>(reader: R) -> anyhow::Result<HashMap<u32, String>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Zip")]
        zip: u32,
        #[serde(rename = "Station")]
        station: String,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut table = HashMap::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        table.insert(row.zip, row.station.trim().to_string());
    }

    Ok(table)
}

pub fn read_zip_climate_zones<R: Read>(reader: R) -> anyhow::Result<HashMap<u32, ClimateZone>> {
    #[derive(Deserialize)]
    struct CsvRow {
        zip: u32,
        number: u8,
        letter: String,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut table = HashMap::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let letter = row
            .letter
            .trim()
            .chars()
            .next()
            .with_context(|| format!("zip {} has an empty climate zone letter", row.zip))?;
        table.insert(
            row.zip,
            ClimateZone {
                number: row.number,
                letter: letter.to_ascii_uppercase(),
            },
        );
    }

    Ok(table)
}

pub fn read_industry_intensity<R: Read>(
    reader: R,
) -> anyhow::Result<HashMap<String, IndustryIntensity>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "NAICS")]
        naics: String,
        #[serde(rename = "USA (Mio kWh)")]
        mio_kwh: f64,
        #[serde(rename = "USA (Mio SQFT)")]
        mio_sqft: f64,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut table = HashMap::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        table.insert(
            row.naics.trim().to_string(),
            IndustryIntensity {
                mio_kwh: row.mio_kwh,
                mio_sqft: row.mio_sqft,
            },
        );
    }

    Ok(table)
}

/// One hour of a DOE prototype simulation, unscaled.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeHour {
    pub timestamp: NaiveDateTime,
    pub electricity_kw: f64,
    pub gas_kw: f64,
    pub electric_heating_kw: f64,
    pub gas_heating_kw: f64,
    pub cooling_kw: f64,
}

pub fn read_prototype_profile<R: Read>(reader: R) -> anyhow::Result<Vec<PrototypeHour>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Date/Time")]
        date_time: String,
        #[serde(rename = "Electricity:Facility [kW](Hourly)")]
        electricity_kw: f64,
        #[serde(rename = "Gas:Facility [kW](Hourly)")]
        gas_kw: f64,
        #[serde(rename = "Heating:Electricity [kW](Hourly)", default)]
        electric_heating_kw: Option<f64>,
        #[serde(rename = "Heating:Gas [kW](Hourly)", default)]
        gas_heating_kw: Option<f64>,
        #[serde(rename = "Cooling:Electricity [kW](Hourly)", default)]
        cooling_kw: Option<f64>,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut hours = Vec::with_capacity(8760);

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        hours.push(PrototypeHour {
            timestamp: parse_timestamp(&row.date_time)?,
            electricity_kw: row.electricity_kw,
            gas_kw: row.gas_kw,
            electric_heating_kw: row.electric_heating_kw.unwrap_or(0.0),
            gas_heating_kw: row.gas_heating_kw.unwrap_or(0.0),
            cooling_kw: row.cooling_kw.unwrap_or(0.0),
        });
    }

    Ok(hours)
}

pub fn read_measured_profile<R: Read>(reader: R) -> anyhow::Result<Vec<HourlyLoad>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Date/Time")]
        date_time: String,
        #[serde(rename = "Electricity kW")]
        electricity_kw: f64,
        #[serde(rename = "Natural Gas kW", default)]
        natural_gas_kw: Option<f64>,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut hours: Vec<HourlyLoad> = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let timestamp = parse_timestamp(&row.date_time)?;
        if let Some(previous) = hours.last().map(|hour| hour.timestamp) {
            if timestamp <= previous {
                return Err(ProfileError::NonIncreasingTimestamp {
                    previous: previous.to_string(),
                    current: timestamp.to_string(),
                }
                .into());
            }
        }
        hours.push(HourlyLoad {
            timestamp,
            electricity_kw: row.electricity_kw,
            natural_gas_kw: row.natural_gas_kw,
            conditioning: None,
        });
    }

    Ok(hours)
}

pub fn read_process_shape<R: Read>(reader: R) -> anyhow::Result<Vec<f64>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Electricity kW")]
        electricity_kw: f64,
    }

    let mut reader = csv::Reader::from_reader(reader);
    let mut shape = Vec::with_capacity(24);

    for result in reader.deserialize::<CsvRow>() {
        shape.push(result?.electricity_kw);
    }

    Ok(shape)
}

/// Parses a profile timestamp into an hour-beginning `NaiveDateTime`.
///
/// Accepts ISO-like `YYYY-MM-DD HH:MM[:SS]` and the EnergyPlus
/// ` MM/DD  HH:MM:SS` form, whose hours run 1..=24 and mark the end of the
/// interval.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ProfileError> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    let malformed = || ProfileError::MalformedTimestamp(raw.to_string());
    let mut parts = trimmed.split_whitespace();
    let (date, time) = match (parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(time), None) => (date, time),
        _ => return Err(malformed()),
    };

    let (month, day) = date.split_once('/').ok_or_else(malformed)?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    let day: u32 = day.parse().map_err(|_| malformed())?;
    let hour: i64 = time
        .split(':')
        .next()
        .and_then(|h| h.parse().ok())
        .ok_or_else(malformed)?;
    if !(1..=24).contains(&hour) {
        return Err(malformed());
    }

    let midnight = NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(malformed)?;

    Ok(midnight + Duration::hours(hour - 1))
}

pub fn prototype_file_name(archetype: Archetype, vintage: Vintage, weather_file: &str) -> String {
    format!(
        "RefBldg{}{}_v1.3_7.1_{}.csv",
        archetype.file_token(),
        vintage,
        weather_file
    )
}

/// Source of hourly reference profiles.
pub trait ProfileLibrary {
    fn prototype(
        &self,
        station: &str,
        archetype: Archetype,
        vintage: Vintage,
        weather_file: &str,
    ) -> anyhow::Result<Vec<PrototypeHour>>;

    fn measured(&self, custom_type: &str) -> anyhow::Result<Vec<HourlyLoad>>;

    /// Base daily process electricity shape for manufacturing.
    fn process_shape(&self) -> anyhow::Result<Vec<f64>>;
}

/// Profiles read from CSV files on disk.
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    pub profile_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(profile_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile_dir: profile_dir.into(),
            data_dir: data_dir.into(),
        }
    }
}

impl ProfileLibrary for DirectoryLibrary {
    fn prototype(
        &self,
        station: &str,
        archetype: Archetype,
        vintage: Vintage,
        weather_file: &str,
    ) -> anyhow::Result<Vec<PrototypeHour>> {
        let path = self
            .profile_dir
            .join(station)
            .join(prototype_file_name(archetype, vintage, weather_file));
        tracing::debug!(path = %path.display(), "reading prototype profile");
        read_prototype_profile(open(&path)?)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn measured(&self, custom_type: &str) -> anyhow::Result<Vec<HourlyLoad>> {
        let path = self
            .data_dir
            .join(MEASURED_DIR)
            .join(format!("{custom_type}.csv"));
        tracing::debug!(path = %path.display(), "reading measured profile");
        read_measured_profile(open(&path)?)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    fn process_shape(&self) -> anyhow::Result<Vec<f64>> {
        let path = self.data_dir.join(PROCESS_SHAPE_FILE);
        read_process_shape(open(&path)?)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};

    #[test]
    fn energyplus_timestamps_become_hour_beginning() {
        let first = parse_timestamp(" 01/01  01:00:00").unwrap();
        assert_eq!((first.month(), first.day(), first.hour()), (1, 1, 0));

        let last = parse_timestamp(" 12/31  24:00:00").unwrap();
        assert_eq!((last.year(), last.month(), last.day(), last.hour()), (2019, 12, 31, 23));
    }

    #[test]
    fn iso_timestamps_are_accepted() {
        let parsed = parse_timestamp("2019-03-01 05:00:00").unwrap();
        assert_eq!((parsed.month(), parsed.hour()), (3, 5));
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        assert_matches!(parse_timestamp("03/01"), Err(ProfileError::MalformedTimestamp(_)));
        assert_matches!(
            parse_timestamp(" 02/30  01:00:00"),
            Err(ProfileError::MalformedTimestamp(_))
        );
        assert_matches!(
            parse_timestamp(" 02/01  25:00:00"),
            Err(ProfileError::MalformedTimestamp(_))
        );
    }

    #[test]
    fn naics_categories_parse_python_style_flags() {
        let csv = "NAICS,EIA,Post-process with SQFT\n61,Education,True\n42,Warehouse,False\n";
        let table = read_naics_categories(csv.as_bytes()).unwrap();
        assert_eq!(
            table["61"],
            NaicsCategory {
                eia: "Education".to_string(),
                split_by_area: true
            }
        );
        assert!(!table["42"].split_by_area);
    }

    #[test]
    fn manual_overrides_reject_unknown_sources() {
        let csv = "NAICS,Source,Type\n722513,DOE,Quick Service Restaurant\n518210,Cloud,Data Center\n";
        assert!(read_manual_overrides(csv.as_bytes()).is_err());
    }

    #[test]
    fn manual_override_sentinel_is_not_applicable() {
        let csv = "NAICS,Source,Type\n722513,DOE,Quick Service Restaurant\n445110,DOE,N/A\n";
        let table = read_manual_overrides(csv.as_bytes()).unwrap();
        assert!(table["722513"].is_applicable());
        assert!(!table["445110"].is_applicable());
    }

    #[test]
    fn climate_zones_combine_number_and_letter() {
        let csv = "zip,number,letter\n80016,5,b\n";
        let table = read_zip_climate_zones(csv.as_bytes()).unwrap();
        assert_eq!(table[&80016].to_string(), "5B");
    }

    #[test]
    fn prototype_profile_reads_all_columns() {
        let csv = "Date/Time,Electricity:Facility [kW](Hourly),Gas:Facility [kW](Hourly),\
Heating:Electricity [kW](Hourly),Heating:Gas [kW](Hourly),Cooling:Electricity [kW](Hourly)\n\
 01/01  01:00:00,10.5,4.0,1.0,2.0,0.5\n\
 01/01  02:00:00,11.0,3.5,1.5,2.5,0.0\n";
        let hours = read_prototype_profile(csv.as_bytes()).unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[1].electricity_kw, 11.0);
        assert_eq!(hours[1].gas_heating_kw, 2.5);
        assert_eq!(hours[1].timestamp.hour(), 1);
    }

    #[test]
    fn measured_profile_rejects_repeated_hours() {
        let csv = "Date/Time,Electricity kW\n\
2019-11-03 01:00,10.0\n\
2019-11-03 01:00,11.0\n\
2019-11-03 02:00,12.0\n";
        let err = read_measured_profile(csv.as_bytes()).unwrap_err();
        assert_matches!(
            err.downcast_ref::<ProfileError>(),
            Some(ProfileError::NonIncreasingTimestamp { .. })
        );

        let backwards = "Date/Time,Electricity kW\n2019-11-03 02:00,1.0\n2019-11-03 01:00,2.0\n";
        assert!(read_measured_profile(backwards.as_bytes()).is_err());
    }

    #[test]
    fn measured_profile_keeps_every_increasing_row() {
        let csv = "Date/Time,Electricity kW\n\
2019-11-03 00:00,10.0\n\
2019-11-03 01:00,11.0\n\
2019-11-03 02:00,12.0\n";
        let hours = read_measured_profile(csv.as_bytes()).unwrap();
        let keys: std::collections::BTreeSet<_> =
            hours.iter().map(crate::present::timestamp_key).collect();
        assert_eq!(keys.len(), hours.len());
    }

    #[test]
    fn prototype_file_name_matches_library_layout() {
        assert_eq!(
            prototype_file_name(Archetype::PrimarySchool, Vintage::New2004, "5B_USA_CO_BOULDER"),
            "RefBldgPrimarySchoolNew2004_v1.3_7.1_5B_USA_CO_BOULDER.csv"
        );
    }

    #[test]
    fn directory_library_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(data_dir.join(MEASURED_DIR)).unwrap();
        std::fs::write(
            data_dir.join(PROCESS_SHAPE_FILE),
            "Electricity kW\n0.5\n0.75\n1.0\n",
        )
        .unwrap();
        std::fs::write(
            data_dir.join(MEASURED_DIR).join("Data Center.csv"),
            "Date/Time,Electricity kW\n2019-01-01 00:00,42.0\n",
        )
        .unwrap();

        let library = DirectoryLibrary::new(dir.path().join("profiles"), &data_dir);
        assert_eq!(library.process_shape().unwrap(), vec![0.5, 0.75, 1.0]);

        let measured = library.measured("Data Center").unwrap();
        assert_eq!(measured.len(), 1);
        assert_eq!(measured[0].natural_gas_kw, None);

        let missing = library.prototype(
            "725650",
            Archetype::Warehouse,
            Vintage::New2004,
            "5B_USA_CO_BOULDER",
        );
        assert!(missing.is_err());
    }

    #[test]
    fn tables_load_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();
        write(NAICS_TO_EIA_FILE, "NAICS,EIA,Post-process with SQFT\n61,Education,True\n");
        write(ZIP_TO_STATION_FILE, "Zip,Station\n80016,725650\n");
        write(ZIP_TO_CLIMATE_ZONE_FILE, "zip,number,letter\n80016,5,B\n");
        write(MECS_FILE, "NAICS,USA (Mio kWh),USA (Mio SQFT)\n311,72000,1200\n");

        let tables = ReferenceTables::load(dir.path()).unwrap();
        assert_eq!(tables.zip_stations[&80016], "725650");
        assert!(tables.manual_overrides.is_empty());
        assert_eq!(tables.industry_intensity["311"].mio_sqft, 1200.0);
    }
}
