use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Some repairs fall back to country-specific defaults (traffic sign values,
/// traffic light cycles). This picks the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Country {
    Germany,
    Spain,
    UnitedStates,
}

impl Country {
    pub fn code(self) -> &'static str {
        match self {
            Country::Germany => "DEU",
            Country::Spain => "ESP",
            Country::UnitedStates => "USA",
        }
    }

    pub fn parse(code: &str) -> Result<Country> {
        match code {
            "DEU" => Ok(Country::Germany),
            "ESP" => Ok(Country::Spain),
            "USA" => Ok(Country::UnitedStates),
            _ => bail!("unknown country code {}", code),
        }
    }
}

/// The identity of one scenario's map, like "DEU_Muc-4".
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MapName {
    pub country: Country,
    pub map: String,
}

impl MapName {
    pub fn new(country: Country, map: &str) -> MapName {
        MapName {
            country,
            map: map.to_string(),
        }
    }

    /// Parses "{country code}_{map name}".
    pub fn parse(name: &str) -> Result<MapName> {
        let (code, map) = name
            .split_once('_')
            .ok_or_else(|| anyhow!("map name {} isn't country_map", name))?;
        if map.is_empty() {
            bail!("map name {} is missing the map part", name);
        }
        Ok(MapName::new(Country::parse(code)?, map))
    }
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}", self.country.code(), self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        let name = MapName::parse("DEU_Muc-4").unwrap();
        assert_eq!(name.country, Country::Germany);
        assert_eq!(name.to_string(), "DEU_Muc-4");

        assert!(MapName::parse("DEU").is_err());
        assert!(MapName::parse("XYZ_Somewhere").is_err());
        assert!(MapName::parse("DEU_").is_err());
    }
}
