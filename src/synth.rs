use chrono::NaiveDateTime;

use crate::error::ProfileError;
use crate::models::{
    Archetype, BuildingRequest, Classification, Conditioning, HourlyLoad, LoadProfile,
    SynthesisMethod, Vintage, WeatherMatch,
};
use crate::reference::{IndustryIntensity, ProfileLibrary, ReferenceTables};

/// Hourly multipliers for a manufacturing weekday (ORNL pub45942).
pub const WEEKDAY_SHAPE: [f64; 24] = [
    0.5, 0.5, 0.5, 0.5, 0.53, 0.6, 0.65, 0.75, 0.85, 0.98, 1.0, 0.97, 0.9, 0.94, 0.97, 1.0, 1.0,
    0.85, 0.73, 0.6, 0.55, 0.5, 0.5, 0.5,
];
pub const WEEKEND_SHAPE: [f64; 24] = [0.5; 24];

const WEEKDAYS_PER_YEAR: f64 = (52 * 5 + 1) as f64;
const WEEKEND_DAYS_PER_YEAR: f64 = (52 * 2) as f64;

/// Archetype whose conditioning loads stand in for a manufacturing plant.
pub const PROCESS_PROXY: Archetype = Archetype::Warehouse;

pub const HOURS_PER_YEAR: usize = 8760;

const MIN_INTENSITY_PREFIX: usize = 3;
const MAX_INTENSITY_PREFIX: usize = 6;

pub fn synthesize(
    request: &BuildingRequest,
    classification: &Classification,
    vintage: Vintage,
    weather: &WeatherMatch,
    tables: &ReferenceTables,
    library: &dyn ProfileLibrary,
) -> anyhow::Result<LoadProfile> {
    match classification {
        Classification::Prototype(archetype) => {
            prototype_profile(library, weather, *archetype, vintage, request.floor_area_sqft)
        }
        Classification::Measured(custom_type) => measured_profile(library, custom_type),
        Classification::ProcessDominated => {
            process_dominated_profile(library, tables, weather, vintage, request)
        }
    }
}

/// Linear factor from an archetype's reference model to the target floor area.
pub fn scaling_factor(floor_area: f64, archetype: Archetype) -> Result<f64, ProfileError> {
    scale_to(floor_area, archetype.reference_area(), archetype.name())
}

/// `floor_area / reference_area`; a non-positive reference area is a configuration error.
pub fn scale_to(floor_area: f64, reference_area: f64, label: &str) -> Result<f64, ProfileError> {
    if reference_area <= 0.0 || !reference_area.is_finite() {
        return Err(ProfileError::InvalidReferenceArea {
            archetype: label.to_string(),
            area: reference_area,
        });
    }
    Ok(floor_area / reference_area)
}

fn ensure_full_year(rows: usize, archetype: Archetype) -> Result<(), ProfileError> {
    if rows != HOURS_PER_YEAR {
        return Err(ProfileError::IncompleteProfile {
            profile: archetype.to_string(),
            rows,
            expected: HOURS_PER_YEAR,
        });
    }
    Ok(())
}

/// DOE path: the prototype profile scaled by floor area.
pub fn prototype_profile(
    library: &dyn ProfileLibrary,
    weather: &WeatherMatch,
    archetype: Archetype,
    vintage: Vintage,
    floor_area: f64,
) -> anyhow::Result<LoadProfile> {
    let factor = scaling_factor(floor_area, archetype)?;
    let reference = library.prototype(
        &weather.station_id,
        archetype,
        vintage,
        &weather.representative_weather_file,
    )?;
    ensure_full_year(reference.len(), archetype)?;

    tracing::info!(%archetype, %vintage, factor, hours = reference.len(), "scaling DOE prototype");

    let hours = reference
        .iter()
        .map(|hour| HourlyLoad {
            timestamp: hour.timestamp,
            electricity_kw: hour.electricity_kw * factor,
            natural_gas_kw: Some(hour.gas_kw * factor),
            conditioning: None,
        })
        .collect();

    Ok(LoadProfile {
        method: SynthesisMethod::Doe,
        source: archetype.to_string(),
        archetype: Some(archetype),
        hours,
    })
}

/// Heating and cooling breakdown of a prototype, scaled by floor area.
pub fn conditioning_profile(
    library: &dyn ProfileLibrary,
    weather: &WeatherMatch,
    archetype: Archetype,
    vintage: Vintage,
    floor_area: f64,
) -> anyhow::Result<Vec<(NaiveDateTime, Conditioning)>> {
    let factor = scaling_factor(floor_area, archetype)?;
    let reference = library.prototype(
        &weather.station_id,
        archetype,
        vintage,
        &weather.representative_weather_file,
    )?;
    ensure_full_year(reference.len(), archetype)?;

    Ok(reference
        .iter()
        .map(|hour| {
            (
                hour.timestamp,
                Conditioning {
                    electric_heating_kw: hour.electric_heating_kw * factor,
                    gas_heating_kw: hour.gas_heating_kw * factor,
                    cooling_kw: hour.cooling_kw * factor,
                },
            )
        })
        .collect())
}

/// Mendeley path: measured profiles pass through unscaled.
pub fn measured_profile(
    library: &dyn ProfileLibrary,
    custom_type: &str,
) -> anyhow::Result<LoadProfile> {
    let hours = library.measured(custom_type)?;
    tracing::info!(custom_type, hours = hours.len(), "using measured profile");

    Ok(LoadProfile {
        method: SynthesisMethod::Mendeley,
        source: custom_type.to_string(),
        archetype: None,
        hours,
    })
}

/// Longest NAICS prefix present in the industry intensity table.
pub fn match_industry_intensity<'a>(
    naics_code: &str,
    tables: &'a ReferenceTables,
) -> Result<(&'a str, &'a IndustryIntensity), ProfileError> {
    let longest = naics_code.len().min(MAX_INTENSITY_PREFIX);
    let shortest = MIN_INTENSITY_PREFIX.min(longest);

    let (prefix, intensity) = (shortest..=longest)
        .rev()
        .find_map(|len| tables.industry_intensity.get_key_value(&naics_code[..len]))
        .ok_or_else(|| ProfileError::InsufficientReferenceData {
            naics: naics_code.to_string(),
            reason: "no industry intensity entry for any prefix".to_string(),
        })?;

    if intensity.mio_kwh <= 0.0 || intensity.mio_sqft <= 0.0 {
        return Err(ProfileError::InsufficientReferenceData {
            naics: naics_code.to_string(),
            reason: format!(
                "prefix {prefix} has unusable totals ({} Mio kWh, {} Mio sqft)",
                intensity.mio_kwh, intensity.mio_sqft
            ),
        });
    }

    Ok((prefix.as_str(), intensity))
}

/// Equivalent full-load hours per year of the manufacturing day shapes.
pub fn hours_at_peak_if_flat() -> f64 {
    WEEKDAY_SHAPE.iter().sum::<f64>() * WEEKDAYS_PER_YEAR
        + WEEKEND_SHAPE.iter().sum::<f64>() * WEEKEND_DAYS_PER_YEAR
}

pub fn process_peak_kw(
    naics_code: &str,
    floor_area: f64,
    tables: &ReferenceTables,
) -> Result<f64, ProfileError> {
    let (prefix, intensity) = match_industry_intensity(naics_code, tables)?;
    let kwh_per_sqft = intensity.mio_kwh / intensity.mio_sqft;
    let peak_kw = kwh_per_sqft / hours_at_peak_if_flat() * floor_area;
    tracing::info!(naics_code, prefix, kwh_per_sqft, peak_kw, "process load sized from MECS");
    Ok(peak_kw)
}

/// MECS path: process electricity on top of the proxy's heating and cooling.
pub fn process_dominated_profile(
    library: &dyn ProfileLibrary,
    tables: &ReferenceTables,
    weather: &WeatherMatch,
    vintage: Vintage,
    request: &BuildingRequest,
) -> anyhow::Result<LoadProfile> {
    let conditioning = conditioning_profile(
        library,
        weather,
        PROCESS_PROXY,
        vintage,
        request.floor_area_sqft,
    )?;
    let peak_kw = process_peak_kw(&request.naics_code, request.floor_area_sqft, tables)?;

    let shape = library.process_shape()?;
    if shape.len() != 24 && shape.len() != conditioning.len() {
        anyhow::bail!(
            "base process shape has {} rows; expected 24 or {}",
            shape.len(),
            conditioning.len()
        );
    }

    let hours = conditioning
        .into_iter()
        .zip(shape.iter().cycle())
        .map(|((timestamp, conditioning), multiplier)| HourlyLoad {
            timestamp,
            electricity_kw: multiplier * peak_kw,
            natural_gas_kw: None,
            conditioning: Some(conditioning),
        })
        .collect();

    Ok(LoadProfile {
        method: SynthesisMethod::Mecs,
        source: format!("NAICS {}", request.naics_code),
        archetype: Some(PROCESS_PROXY),
        hours,
    })
}
