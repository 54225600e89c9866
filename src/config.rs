use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{invalid_config_error, Error};

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct JourneyConfig {
    /// Wall-clock period between two ticks.
    pub tick_interval: Duration,
    /// Nominal time for a full journey at 1x speed.
    pub journey_duration: Duration,
    /// Point count routes are densified to.
    pub densify_points: usize,
    /// Point count of a synthesized fallback route.
    pub fallback_points: usize,
    pub addr: SocketAddr,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            journey_duration: Duration::from_secs(60),
            densify_points: 100,
            fallback_points: 50,
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl JourneyConfig {
    /// Reads `WAYPOINT_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_millis = parse_var(&lookup, "WAYPOINT_TICK_MILLIS", 1000u64)?;
        let journey_secs = parse_var(&lookup, "WAYPOINT_JOURNEY_SECS", 60u64)?;

        if tick_millis == 0 {
            return Err(invalid_config_error("WAYPOINT_TICK_MILLIS"));
        }
        if journey_secs == 0 {
            return Err(invalid_config_error("WAYPOINT_JOURNEY_SECS"));
        }

        Ok(Self {
            tick_interval: Duration::from_millis(tick_millis),
            journey_duration: Duration::from_secs(journey_secs),
            densify_points: parse_var(&lookup, "WAYPOINT_DENSIFY_POINTS", defaults.densify_points)?,
            fallback_points: parse_var(
                &lookup,
                "WAYPOINT_FALLBACK_POINTS",
                defaults.fallback_points,
            )?,
            addr: parse_var(&lookup, "WAYPOINT_ADDR", defaults.addr)?,
        })
    }

    /// Progress gained per tick at 1x speed, in percent.
    pub fn base_increment(&self) -> f64 {
        self.tick_interval.as_secs_f64() / self.journey_duration.as_secs_f64() * 100.0
    }
}

pub fn clamp_speed(multiplier: f64) -> f64 {
    if multiplier.is_nan() {
        return MIN_SPEED;
    }

    multiplier.clamp(MIN_SPEED, MAX_SPEED)
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid_config_error(name)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn unset_variables_use_defaults() {
        let config = JourneyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, JourneyConfig::default());
        assert!((config.base_increment() - 100.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn variables_override_defaults() {
        let config = JourneyConfig::from_lookup(lookup(&[
            ("WAYPOINT_TICK_MILLIS", "500"),
            ("WAYPOINT_JOURNEY_SECS", "10"),
            ("WAYPOINT_DENSIFY_POINTS", " 200 "),
            ("WAYPOINT_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.tick_interval, Duration::from_millis(500));
        assert_eq!(config.densify_points, 200);
        assert_eq!(config.addr.port(), 8080);
        assert!((config.base_increment() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = JourneyConfig::from_lookup(lookup(&[("WAYPOINT_JOURNEY_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(err, invalid_config_error("WAYPOINT_JOURNEY_SECS"));

        let err = JourneyConfig::from_lookup(lookup(&[("WAYPOINT_TICK_MILLIS", "0")]))
            .unwrap_err();
        assert!(err.message.contains("WAYPOINT_TICK_MILLIS"));
    }

    #[test]
    fn speed_is_clamped() {
        assert_eq!(clamp_speed(50.0), 10.0);
        assert_eq!(clamp_speed(0.0), 0.1);
        assert_eq!(clamp_speed(-3.0), 0.1);
        assert_eq!(clamp_speed(2.5), 2.5);
        assert_eq!(clamp_speed(f64::NAN), 0.1);
        assert_eq!(clamp_speed(f64::INFINITY), 10.0);
    }
}
