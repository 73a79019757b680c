//! Thermal pressure level mapping.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::ThermalSource;

/// Coarse OS-reported thermal throttling severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThermalLevel {
    Nominal,
    Moderate,
    Heavy,
    Trapping,
    Sleeping,
    #[default]
    Unknown,
}

impl ThermalLevel {
    /// Map the opaque pressure code; anything outside 0..=4 is Unknown.
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => ThermalLevel::Nominal,
            1 => ThermalLevel::Moderate,
            2 => ThermalLevel::Heavy,
            3 => ThermalLevel::Trapping,
            4 => ThermalLevel::Sleeping,
            _ => ThermalLevel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThermalLevel::Nominal => "Nominal",
            ThermalLevel::Moderate => "Moderate",
            ThermalLevel::Heavy => "Heavy",
            ThermalLevel::Trapping => "Trapping",
            ThermalLevel::Sleeping => "Sleeping",
            ThermalLevel::Unknown => "Unknown",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ThermalLevel::Nominal => "System is cool and operating normally",
            ThermalLevel::Moderate => "System is warm, minor performance adjustments",
            ThermalLevel::Heavy => "System is hot, performance may be throttled",
            ThermalLevel::Trapping => "Severe thermal throttling applied",
            ThermalLevel::Sleeping => "Critical, near thermal shutdown",
            ThermalLevel::Unknown => "Thermal state unknown",
        }
    }

    /// Gauge position for the level (Unknown reads as 0)
    pub fn pressure_percent(&self) -> f64 {
        match self {
            ThermalLevel::Nominal => 0.0,
            ThermalLevel::Moderate => 33.0,
            ThermalLevel::Heavy => 66.0,
            ThermalLevel::Trapping => 85.0,
            ThermalLevel::Sleeping => 100.0,
            ThermalLevel::Unknown => 0.0,
        }
    }

    /// Ordering of the known levels; Unknown has none
    pub fn severity(&self) -> Option<u8> {
        match self {
            ThermalLevel::Nominal => Some(0),
            ThermalLevel::Moderate => Some(1),
            ThermalLevel::Heavy => Some(2),
            ThermalLevel::Trapping => Some(3),
            ThermalLevel::Sleeping => Some(4),
            ThermalLevel::Unknown => None,
        }
    }
}

impl std::fmt::Display for ThermalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThermalLevel {
    type Err = crate::error::PulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nominal" => Ok(ThermalLevel::Nominal),
            "moderate" => Ok(ThermalLevel::Moderate),
            "heavy" => Ok(ThermalLevel::Heavy),
            "trapping" => Ok(ThermalLevel::Trapping),
            "sleeping" => Ok(ThermalLevel::Sleeping),
            "unknown" => Ok(ThermalLevel::Unknown),
            other => Err(crate::error::PulseError::config(format!(
                "unknown thermal level '{}'",
                other
            ))),
        }
    }
}

/// Holds the last known thermal level.
///
/// Each successful read replaces the level unconditionally. If the source
/// could not be registered the mapper stays unavailable for the rest of the
/// process and always reports Unknown; registration is never retried.
pub struct ThermalMapper {
    source: Option<Box<dyn ThermalSource>>,
    level: ThermalLevel,
    raw_code: Option<u64>,
}

impl ThermalMapper {
    pub fn new(source: Result<Box<dyn ThermalSource>>) -> Self {
        let source = match source {
            Ok(source) => Some(source),
            Err(e) => {
                log::warn!("Thermal notifications unavailable: {}", e);
                None
            }
        };
        Self {
            source,
            level: ThermalLevel::Unknown,
            raw_code: None,
        }
    }

    pub fn read(&mut self) -> ThermalLevel {
        let Some(source) = self.source.as_mut() else {
            return ThermalLevel::Unknown;
        };
        match source.read_code() {
            Ok(code) => {
                self.raw_code = Some(code);
                self.level = ThermalLevel::from_code(code);
            }
            Err(e) => log::debug!("Thermal state read failed, keeping {}: {}", self.level, e),
        }
        self.level
    }

    pub fn level(&self) -> ThermalLevel {
        self.level
    }

    pub fn raw_code(&self) -> Option<u64> {
        self.raw_code
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseError;
    use std::collections::VecDeque;

    struct ScriptedThermal(VecDeque<Result<u64>>);

    impl ThermalSource for ScriptedThermal {
        fn read_code(&mut self) -> Result<u64> {
            self.0
                .pop_front()
                .unwrap_or_else(|| Err(PulseError::syscall("script exhausted")))
        }
    }

    fn mapper(reads: Vec<Result<u64>>) -> ThermalMapper {
        ThermalMapper::new(Ok(Box::new(ScriptedThermal(reads.into()))))
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(ThermalLevel::from_code(0), ThermalLevel::Nominal);
        assert_eq!(ThermalLevel::from_code(2), ThermalLevel::Heavy);
        assert_eq!(ThermalLevel::from_code(4), ThermalLevel::Sleeping);
        assert_eq!(ThermalLevel::from_code(99), ThermalLevel::Unknown);
    }

    #[test]
    fn test_unknown_until_first_read() {
        let mut mapper = mapper(vec![Ok(1)]);
        assert_eq!(mapper.level(), ThermalLevel::Unknown);
        assert_eq!(mapper.read(), ThermalLevel::Moderate);
        assert_eq!(mapper.raw_code(), Some(1));
    }

    #[test]
    fn test_any_transition_allowed() {
        let mut mapper = mapper(vec![Ok(4), Ok(0), Ok(3), Ok(7)]);
        assert_eq!(mapper.read(), ThermalLevel::Sleeping);
        assert_eq!(mapper.read(), ThermalLevel::Nominal);
        assert_eq!(mapper.read(), ThermalLevel::Trapping);
        assert_eq!(mapper.read(), ThermalLevel::Unknown);
    }

    #[test]
    fn test_failed_read_keeps_last_level() {
        let mut mapper = mapper(vec![Ok(2), Err(PulseError::syscall("notify_get_state"))]);
        assert_eq!(mapper.read(), ThermalLevel::Heavy);
        assert_eq!(mapper.read(), ThermalLevel::Heavy);
    }

    #[test]
    fn test_failed_registration_is_permanent() {
        let mut mapper = ThermalMapper::new(Err(PulseError::unavailable("notify_register_check")));
        assert!(!mapper.is_available());
        for _ in 0..3 {
            assert_eq!(mapper.read(), ThermalLevel::Unknown);
        }
    }

    #[test]
    fn test_level_strings_round_trip() {
        for level in [
            ThermalLevel::Nominal,
            ThermalLevel::Moderate,
            ThermalLevel::Heavy,
            ThermalLevel::Trapping,
            ThermalLevel::Sleeping,
            ThermalLevel::Unknown,
        ] {
            assert_eq!(level.as_str().parse::<ThermalLevel>().unwrap(), level);
        }
        assert!("lukewarm".parse::<ThermalLevel>().is_err());
    }

    #[test]
    fn test_pressure_percent() {
        assert_eq!(ThermalLevel::Heavy.pressure_percent(), 66.0);
        assert_eq!(ThermalLevel::Unknown.pressure_percent(), 0.0);
    }
}
