//! Enumerated domains for every categorical alert field.
//!
//! The tables are plain `static` slices: read-only, built at compile time and
//! safe to share between any number of callers.

/// A categorical domain that supplied values are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Product,
    Certainty,
    Severity,
    Status,
    Urgency,
    MessageType,
    MarineRegion,
    LandArea,
    RegionType,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Product => "product",
            Domain::Certainty => "certainty",
            Domain::Severity => "severity",
            Domain::Status => "status",
            Domain::Urgency => "urgency",
            Domain::MessageType => "message type",
            Domain::MarineRegion => "marine region",
            Domain::LandArea => "land area",
            Domain::RegionType => "region type",
        }
    }
}

/// The full set of validation tables.
#[derive(Debug)]
pub struct ValidationTable {
    pub products: &'static [&'static str],
    pub certainties: &'static [&'static str],
    pub severities: &'static [&'static str],
    pub statuses: &'static [&'static str],
    pub urgencies: &'static [&'static str],
    pub message_types: &'static [&'static str],
    pub marine_regions: &'static [&'static str],
    pub land_areas: &'static [&'static str],
    pub region_types: &'static [&'static str],
}

/// Process-wide validation table.
pub static VALIDATION_TABLE: ValidationTable = ValidationTable {
    products: PRODUCTS,
    certainties: &["Observed", "Likely", "Possible", "Unlikely", "Unknown"],
    severities: &["Extreme", "Severe", "Moderate", "Minor", "Unknown"],
    statuses: &["Actual", "Exercise", "System", "Test", "Draft"],
    urgencies: &["Immediate", "Expected", "Future", "Past", "Unknown"],
    // The API expects these lowercase.
    message_types: &["alert", "update", "cancel"],
    marine_regions: &["AL", "AT", "GM", "GL", "PA", "PI"],
    land_areas: LAND_AREAS,
    region_types: &["land", "marine"],
};

impl ValidationTable {
    pub fn domain(&self, domain: Domain) -> &'static [&'static str] {
        match domain {
            Domain::Product => self.products,
            Domain::Certainty => self.certainties,
            Domain::Severity => self.severities,
            Domain::Status => self.statuses,
            Domain::Urgency => self.urgencies,
            Domain::MessageType => self.message_types,
            Domain::MarineRegion => self.marine_regions,
            Domain::LandArea => self.land_areas,
            Domain::RegionType => self.region_types,
        }
    }

    /// Canonical spelling of `value` in `domain`, compared case-insensitively.
    ///
    /// Land areas additionally accept a full state or territory name
    /// (`"new york"` resolves to `"NY"`).
    pub fn canonical(&self, domain: Domain, value: &str) -> Option<&'static str> {
        let value = value.trim();
        let found = self
            .domain(domain)
            .iter()
            .copied()
            .find(|entry| entry.eq_ignore_ascii_case(value));

        match (found, domain) {
            (Some(entry), _) => Some(entry),
            (None, Domain::LandArea) => state_abbreviation(value),
            (None, _) => None,
        }
    }

    pub fn contains(&self, domain: Domain, value: &str) -> bool {
        self.canonical(domain, value).is_some()
    }
}

/// Two-letter abbreviation for a full state or territory name.
pub fn state_abbreviation(name: &str) -> Option<&'static str> {
    let name = name.trim();
    STATE_NAMES
        .iter()
        .find(|(_, full)| full.eq_ignore_ascii_case(name))
        .map(|(abbr, _)| *abbr)
}

/// Zone-id prefixes (marine area codes) that make up each marine region.
pub fn marine_region_prefixes(region: &str) -> &'static [&'static str] {
    match region.to_ascii_uppercase().as_str() {
        "AL" => &["PK"],
        "AT" => &["AN", "AM"],
        "GM" => &["GM"],
        "GL" => &["LS", "LM", "LH", "LC", "LE", "LO", "SL"],
        "PA" => &["PZ"],
        "PI" => &["PH", "PS", "PM"],
        _ => &[],
    }
}

/// Whether a zone id (e.g. `"GMZ455"`) belongs to a marine forecast zone.
pub fn is_marine_zone(zone: &str) -> bool {
    let Some(prefix) = zone.get(..2) else {
        return false;
    };
    VALIDATION_TABLE
        .marine_regions
        .iter()
        .any(|region| marine_region_prefixes(region).iter().any(|p| p.eq_ignore_ascii_case(prefix)))
}

static LAND_AREAS: &[&str] = &[
    "AL", "AK", "AS", "AR", "AZ", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "GU", "HI", "ID", "IL",
    "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "PR", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VI", "VA", "WA", "WV", "WI", "WY", "PZ", "PK", "PH", "PS", "PM", "AN", "AM", "GM", "LS",
    "LM", "LH", "LC", "LE", "LO",
];

static STATE_NAMES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AS", "American Samoa"),
    ("AR", "Arkansas"),
    ("AZ", "Arizona"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("GU", "Guam"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VI", "Virgin Islands"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

static PRODUCTS: &[&str] = &[
    "911 Telephone Outage Emergency",
    "Administrative Message",
    "Air Quality Alert",
    "Air Stagnation Advisory",
    "Arroyo And Small Stream Flood Advisory",
    "Ashfall Advisory",
    "Ashfall Warning",
    "Avalanche Advisory",
    "Avalanche Warning",
    "Avalanche Watch",
    "Beach Hazards Statement",
    "Blizzard Warning",
    "Blizzard Watch",
    "Blowing Dust Advisory",
    "Blowing Dust Warning",
    "Blue Alert",
    "Brisk Wind Advisory",
    "Child Abduction Emergency",
    "Civil Danger Warning",
    "Civil Emergency Message",
    "Coastal Flood Advisory",
    "Coastal Flood Statement",
    "Coastal Flood Warning",
    "Coastal Flood Watch",
    "Cold Weather Advisory",
    "Dense Fog Advisory",
    "Dense Smoke Advisory",
    "Dust Advisory",
    "Dust Storm Warning",
    "Earthquake Warning",
    "Evacuation - Immediate",
    "Excessive Heat Warning",
    "Excessive Heat Watch",
    "Extreme Cold Warning",
    "Extreme Cold Watch",
    "Extreme Fire Danger",
    "Extreme Heat Warning",
    "Extreme Heat Watch",
    "Extreme Wind Warning",
    "Fire Warning",
    "Fire Weather Watch",
    "Flash Flood Statement",
    "Flash Flood Warning",
    "Flash Flood Watch",
    "Flood Advisory",
    "Flood Statement",
    "Flood Warning",
    "Flood Watch",
    "Freeze Warning",
    "Freeze Watch",
    "Freezing Fog Advisory",
    "Freezing Rain Advisory",
    "Freezing Spray Advisory",
    "Frost Advisory",
    "Gale Warning",
    "Gale Watch",
    "Hard Freeze Warning",
    "Hard Freeze Watch",
    "Hazardous Materials Warning",
    "Hazardous Seas Warning",
    "Hazardous Seas Watch",
    "Hazardous Weather Outlook",
    "Heat Advisory",
    "Heavy Freezing Spray Warning",
    "Heavy Freezing Spray Watch",
    "High Surf Advisory",
    "High Surf Warning",
    "High Wind Warning",
    "High Wind Watch",
    "Hurricane Force Wind Warning",
    "Hurricane Force Wind Watch",
    "Hurricane Local Statement",
    "Hurricane Warning",
    "Hurricane Watch",
    "Hydrologic Advisory",
    "Hydrologic Outlook",
    "Ice Storm Warning",
    "Lake Effect Snow Advisory",
    "Lake Effect Snow Warning",
    "Lake Effect Snow Watch",
    "Lake Wind Advisory",
    "Lakeshore Flood Advisory",
    "Lakeshore Flood Statement",
    "Lakeshore Flood Warning",
    "Lakeshore Flood Watch",
    "Law Enforcement Warning",
    "Local Area Emergency",
    "Low Water Advisory",
    "Marine Weather Statement",
    "Nuclear Power Plant Warning",
    "Radiological Hazard Warning",
    "Red Flag Warning",
    "Rip Current Statement",
    "Severe Thunderstorm Warning",
    "Severe Thunderstorm Watch",
    "Severe Weather Statement",
    "Shelter In Place Warning",
    "Short Term Forecast",
    "Small Craft Advisory",
    "Small Craft Advisory For Hazardous Seas",
    "Small Craft Advisory For Rough Bar",
    "Small Craft Advisory For Winds",
    "Small Stream Flood Advisory",
    "Snow Squall Warning",
    "Special Marine Warning",
    "Special Weather Statement",
    "Storm Surge Warning",
    "Storm Surge Watch",
    "Storm Warning",
    "Storm Watch",
    "Test",
    "Tornado Warning",
    "Tornado Watch",
    "Tropical Depression Local Statement",
    "Tropical Storm Local Statement",
    "Tropical Storm Warning",
    "Tropical Storm Watch",
    "Tsunami Advisory",
    "Tsunami Warning",
    "Tsunami Watch",
    "Typhoon Local Statement",
    "Typhoon Warning",
    "Typhoon Watch",
    "Urban And Small Stream Flood Advisory",
    "Volcano Warning",
    "Wind Advisory",
    "Wind Chill Advisory",
    "Wind Chill Warning",
    "Wind Chill Watch",
    "Winter Storm Warning",
    "Winter Storm Watch",
    "Winter Weather Advisory",
];
