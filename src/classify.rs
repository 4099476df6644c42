use crate::error::ProfileError;
use crate::models::{Archetype, Classification};
use crate::reference::{NaicsCategory, OverrideSource, ReferenceTables};

/// Half-open floor-area bracket `[min, max)` in square feet.
#[derive(Debug, Clone, Copy)]
pub struct AreaBracket {
    pub min: f64,
    pub max: f64,
    pub archetype: Archetype,
}

impl AreaBracket {
    const fn new(min: f64, max: f64, archetype: Archetype) -> Self {
        Self { min, max, archetype }
    }

    pub fn contains(&self, floor_area: f64) -> bool {
        floor_area >= self.min && floor_area < self.max
    }
}

static OFFICE: [AreaBracket; 3] = [
    AreaBracket::new(0.0, 10_000.0, Archetype::SmallOffice),
    AreaBracket::new(10_000.0, 100_000.0, Archetype::MediumOffice),
    AreaBracket::new(100_000.0, f64::INFINITY, Archetype::LargeOffice),
];

static EDUCATION: [AreaBracket; 2] = [
    AreaBracket::new(0.0, 100_000.0, Archetype::PrimarySchool),
    AreaBracket::new(100_000.0, f64::INFINITY, Archetype::SecondarySchool),
];

static HEALTH_CARE: [AreaBracket; 2] = [
    AreaBracket::new(0.0, 100_000.0, Archetype::OutpatientHealthCare),
    AreaBracket::new(100_000.0, f64::INFINITY, Archetype::Hospital),
];

static RESTAURANT_ACCOMMODATION: [AreaBracket; 4] = [
    AreaBracket::new(0.0, 3_500.0, Archetype::QuickServiceRestaurant),
    AreaBracket::new(3_500.0, 20_000.0, Archetype::FullServiceRestaurant),
    AreaBracket::new(20_000.0, 80_000.0, Archetype::SmallHotel),
    AreaBracket::new(80_000.0, f64::INFINITY, Archetype::LargeHotel),
];

/// Area brackets for categories that need splitting by floor area.
pub fn area_brackets(category: &str) -> Option<&'static [AreaBracket]> {
    match category.trim().to_ascii_lowercase().as_str() {
        "office" => Some(&OFFICE),
        "education" => Some(&EDUCATION),
        "health care" => Some(&HEALTH_CARE),
        // the reference table spells it "Accomodation"
        "restaurant+accommodation" | "restaurant+accomodation" => Some(&RESTAURANT_ACCOMMODATION),
        _ => None,
    }
}

/// Resolves a NAICS code and floor area to the profile source to synthesize from.
///
/// Exact-code manual overrides win, then the two-digit category table. Codes
/// starting with `3` that match neither are treated as process-dominated
/// manufacturing.
pub fn classify(
    naics_code: &str,
    floor_area: f64,
    tables: &ReferenceTables,
) -> Result<Classification, ProfileError> {
    let naics_code = naics_code.trim();

    if let Some(entry) = tables
        .manual_overrides
        .get(naics_code)
        .filter(|entry| entry.is_applicable())
    {
        tracing::debug!(naics_code, type_name = %entry.type_name, "manual override matched");
        return match entry.source {
            OverrideSource::Doe => Ok(Classification::Prototype(entry.type_name.parse()?)),
            OverrideSource::Mendeley => Ok(Classification::Measured(entry.type_name.clone())),
        };
    }

    let prefix: String = naics_code.chars().take(2).collect();
    if let Some(category) = tables.naics_categories.get(&prefix) {
        let archetype = refine_category(category, floor_area)?;
        tracing::debug!(naics_code, category = %category.eia, %archetype, "category matched");
        return Ok(Classification::Prototype(archetype));
    }

    if naics_code.starts_with('3') {
        tracing::debug!(naics_code, "no DOE match; treating as process-dominated manufacturing");
        return Ok(Classification::ProcessDominated);
    }

    Err(ProfileError::UnsupportedNaicsCode(naics_code.to_string()))
}

fn refine_category(category: &NaicsCategory, floor_area: f64) -> Result<Archetype, ProfileError> {
    if !category.split_by_area {
        return category.eia.parse();
    }

    let brackets = area_brackets(&category.eia)
        .ok_or_else(|| ProfileError::UnknownArchetype(category.eia.clone()))?;

    brackets
        .iter()
        .find(|bracket| bracket.contains(floor_area))
        .map(|bracket| bracket.archetype)
        .ok_or_else(|| {
            ProfileError::InvalidRequest(format!(
                "floor area {floor_area} falls outside the {} brackets",
                category.eia
            ))
        })
}
