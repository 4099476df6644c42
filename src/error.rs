#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("NAICS code {0} is not supported yet")]
    UnsupportedNaicsCode(String),

    #[error("Zip code {zip} not found in {table}")]
    UnknownZip { zip: u32, table: &'static str },

    #[error("Climate zone {0} has no representative weather file")]
    UnknownClimateZone(String),

    #[error("Insufficient reference data for NAICS code {naics}: {reason}")]
    InsufficientReferenceData { naics: String, reason: String },

    #[error("Reference table names unknown building archetype '{0}'")]
    UnknownArchetype(String),

    #[error("Archetype {archetype} has non-positive reference area {area}")]
    InvalidReferenceArea { archetype: String, area: f64 },

    #[error("Malformed timestamp '{0}'")]
    MalformedTimestamp(String),

    #[error("Timestamp {current} does not follow {previous}")]
    NonIncreasingTimestamp { previous: String, current: String },

    #[error("Reference profile for {profile} has {rows} rows; expected {expected}")]
    IncompleteProfile {
        profile: String,
        rows: usize,
        expected: usize,
    },
}
