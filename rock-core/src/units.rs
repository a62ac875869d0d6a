use serde::{Deserialize, Serialize};

/// Unit systems as understood by Dark-Sky-style APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres per second.
    Si,
    /// Celsius, kilometres per hour.
    Ca,
    /// Celsius, miles per hour.
    Uk2,
    /// Fahrenheit, miles per hour.
    #[default]
    Us,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Si => "si",
            Units::Ca => "ca",
            Units::Uk2 => "uk2",
            Units::Us => "us",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Si, Units::Ca, Units::Uk2, Units::Us]
    }

    pub fn is_fahrenheit(&self) -> bool {
        matches!(self, Units::Us)
    }

    pub fn temperature_letter(&self) -> char {
        if self.is_fahrenheit() { 'F' } else { 'C' }
    }

    pub fn wind_speed_unit(&self) -> WindSpeedUnit {
        match self {
            Units::Si => WindSpeedUnit::MetersPerSecond,
            Units::Ca => WindSpeedUnit::KilometersPerHour,
            Units::Uk2 | Units::Us => WindSpeedUnit::MilesPerHour,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "si" => Ok(Units::Si),
            "ca" => Ok(Units::Ca),
            "uk2" => Ok(Units::Uk2),
            "us" => Ok(Units::Us),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: si, ca, uk2, us."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

impl WindSpeedUnit {
    /// Initials of the spelled-out unit, e.g. "Miles per hour" -> "mph".
    pub fn abbreviation(&self) -> &'static str {
        match self {
            WindSpeedUnit::MetersPerSecond => "mps",
            WindSpeedUnit::KilometersPerHour => "kph",
            WindSpeedUnit::MilesPerHour => "mph",
        }
    }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Nearest 16-point compass direction for a bearing in degrees.
pub fn deg_to_compass(degrees: f64) -> &'static str {
    let idx = ((degrees / 22.5) + 0.5).floor() as i64;
    COMPASS_POINTS[idx.rem_euclid(16) as usize]
}
