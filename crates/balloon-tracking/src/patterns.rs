//! Fleet-wide flight pattern statistics

use crate::path::Balloon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Speeds below this are "low"
    pub low_speed_kmph: f64,
    /// Speeds at or above this are "high"
    pub high_speed_kmph: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            low_speed_kmph: 50.0,
            high_speed_kmph: 150.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Counts relative to the fleet's mean current position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicSpread {
    pub north: usize,
    pub south: usize,
    pub east: usize,
    pub west: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightInsights {
    pub total_balloons: usize,
    pub active_balloons: usize,
    pub avg_speed: f64,
    pub speed_distribution: SpeedDistribution,
    pub geographic_spread: GeographicSpread,
    /// Share of possible balloon pairs that are linked, 0-1
    pub constellation_density: f64,
}

#[derive(Default)]
pub struct FlightPatternAnalyzer {
    config: PatternConfig,
}

impl FlightPatternAnalyzer {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// Summarize the fleet; `link_count` is the number of proximity links
    pub fn analyze(&self, balloons: &[Balloon], link_count: usize) -> FlightInsights {
        let mut insights = FlightInsights {
            total_balloons: balloons.len(),
            ..FlightInsights::default()
        };

        let mut total_speed = 0.0;
        let mut latitudes = Vec::new();
        let mut longitudes = Vec::new();

        for balloon in balloons {
            let Some(current) = balloon.current_position() else {
                continue;
            };
            insights.active_balloons += 1;

            if let Some(velocity) = balloon.current_velocity() {
                let speed = velocity.speed_kmph;
                total_speed += speed;

                let buckets = &mut insights.speed_distribution;
                if speed < self.config.low_speed_kmph {
                    buckets.low += 1;
                } else if speed < self.config.high_speed_kmph {
                    buckets.medium += 1;
                } else {
                    buckets.high += 1;
                }
            }

            latitudes.push(current.latitude);
            longitudes.push(current.longitude);
        }

        let active = insights.active_balloons;
        if active == 0 {
            return insights;
        }

        insights.avg_speed = total_speed / active as f64;

        let mean_lat = latitudes.iter().sum::<f64>() / latitudes.len() as f64;
        let mean_lon = longitudes.iter().sum::<f64>() / longitudes.len() as f64;

        let spread = &mut insights.geographic_spread;
        for lat in &latitudes {
            if *lat > mean_lat {
                spread.north += 1;
            } else {
                spread.south += 1;
            }
        }
        for lon in &longitudes {
            if *lon > mean_lon {
                spread.east += 1;
            } else {
                spread.west += 1;
            }
        }

        if active > 1 {
            let possible_pairs = (active * (active - 1) / 2) as f64;
            insights.constellation_density = link_count as f64 / possible_pairs;
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Position, Velocity};

    fn balloon(id: usize, lat: f64, lon: f64, speed: f64) -> Balloon {
        Balloon {
            id,
            path: vec![Position::new(lat, lon)],
            velocities: vec![Velocity::from([speed, 90.0])],
        }
    }

    #[test]
    fn test_empty_fleet() {
        let insights = FlightPatternAnalyzer::default().analyze(&[], 0);
        assert_eq!(insights, FlightInsights::default());
    }

    #[test]
    fn test_speed_buckets() {
        let balloons = vec![
            balloon(0, 0.0, 0.0, 10.0),
            balloon(1, 0.0, 0.0, 50.0),
            balloon(2, 0.0, 0.0, 149.9),
            balloon(3, 0.0, 0.0, 150.0),
        ];
        let insights = FlightPatternAnalyzer::default().analyze(&balloons, 0);

        assert_eq!(insights.active_balloons, 4);
        assert_eq!(
            insights.speed_distribution,
            SpeedDistribution {
                low: 1,
                medium: 2,
                high: 1
            }
        );
        assert!((insights.avg_speed - (10.0 + 50.0 + 149.9 + 150.0) / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_geographic_spread_around_mean() {
        let balloons = vec![
            balloon(0, 10.0, 10.0, 0.0),
            balloon(1, -10.0, -10.0, 0.0),
            balloon(2, 0.0, 0.0, 0.0),
        ];
        let spread = FlightPatternAnalyzer::default()
            .analyze(&balloons, 0)
            .geographic_spread;

        // The balloon exactly at the mean counts south and west
        assert_eq!(
            spread,
            GeographicSpread {
                north: 1,
                south: 2,
                east: 1,
                west: 2
            }
        );
    }

    #[test]
    fn test_inactive_balloons_are_counted_but_not_analyzed() {
        let mut balloons = vec![balloon(0, 0.0, 0.0, 80.0)];
        balloons.push(Balloon {
            id: 1,
            path: vec![],
            velocities: vec![],
        });
        let insights = FlightPatternAnalyzer::default().analyze(&balloons, 0);

        assert_eq!(insights.total_balloons, 2);
        assert_eq!(insights.active_balloons, 1);
        assert_eq!(insights.avg_speed, 80.0);
    }

    #[test]
    fn test_constellation_density() {
        let balloons = vec![
            balloon(0, 0.0, 0.0, 0.0),
            balloon(1, 0.0, 1.0, 0.0),
            balloon(2, 0.0, 2.0, 0.0),
        ];
        let insights = FlightPatternAnalyzer::default().analyze(&balloons, 2);
        assert!((insights.constellation_density - 2.0 / 3.0).abs() < 1e-9);
    }
}
