use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Avoid {
    Highways,
    Tolls,
    Ferries,
    Indoor,
}

impl Avoid {
    pub fn as_str(&self) -> &'static str {
        match self {
            Avoid::Highways => "highways",
            Avoid::Tolls => "tolls",
            Avoid::Ferries => "ferries",
            Avoid::Indoor => "indoor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeparturePolicy {
    Now,
    DepartAt(DateTime<Utc>),
    ArriveBy(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransitVehicle {
    #[default]
    Any,
    Bus,
    Rail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransitRoutingPreference {
    #[default]
    Best,
    LessWalking,
    FewerTransfers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitOptions {
    pub departure: DeparturePolicy,
    pub vehicle: TransitVehicle,
    pub routing: TransitRoutingPreference,
}

/// One validated trip search, built fresh for each submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub mode: TravelMode,
    pub waypoints: Vec<String>,
    pub optimize_waypoints: bool,
    pub avoid: BTreeSet<Avoid>,
    pub transit: Option<TransitOptions>,
}

impl TripRequest {
    /// Query parameters for the directions endpoint, excluding the API key.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("origin", self.origin.clone()),
            ("destination", self.destination.clone()),
            ("mode", self.mode.as_str().to_string()),
            ("alternatives", "true".to_string()),
            ("language", "en".to_string()),
            ("region", "us".to_string()),
            ("units", "imperial".to_string()),
        ];
        if !self.waypoints.is_empty() {
            let joined = self.waypoints.join("|");
            params.push((
                "waypoints",
                if self.optimize_waypoints {
                    format!("optimize:true|{}", joined)
                } else {
                    joined
                },
            ));
        }
        if !self.avoid.is_empty() {
            let avoid: Vec<&str> = self.avoid.iter().map(Avoid::as_str).collect();
            params.push(("avoid", avoid.join("|")));
        }
        if let Some(transit) = &self.transit {
            // "now" is the endpoint's default, so it is left implicit.
            match transit.departure {
                DeparturePolicy::Now => {}
                DeparturePolicy::DepartAt(at) => {
                    params.push(("departure_time", at.timestamp().to_string()))
                }
                DeparturePolicy::ArriveBy(by) => {
                    params.push(("arrival_time", by.timestamp().to_string()))
                }
            }
            match transit.vehicle {
                TransitVehicle::Any => {}
                TransitVehicle::Bus => params.push(("transit_mode", "bus".to_string())),
                TransitVehicle::Rail => params.push(("transit_mode", "rail".to_string())),
            }
            match transit.routing {
                TransitRoutingPreference::Best => {}
                TransitRoutingPreference::LessWalking => {
                    params.push(("transit_routing_preference", "less_walking".to_string()))
                }
                TransitRoutingPreference::FewerTransfers => {
                    params.push(("transit_routing_preference", "fewer_transfers".to_string()))
                }
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(mode: TravelMode) -> TripRequest {
        TripRequest {
            origin: "Boston, MA".to_string(),
            destination: "Concord, MA".to_string(),
            mode,
            waypoints: vec![],
            optimize_waypoints: false,
            avoid: BTreeSet::new(),
            transit: None,
        }
    }

    fn value<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn base_params_always_present() {
        let params = request(TravelMode::Walking).query_params();
        assert_eq!(value(&params, "mode"), Some("walking"));
        assert_eq!(value(&params, "alternatives"), Some("true"));
        assert_eq!(value(&params, "units"), Some("imperial"));
        assert_eq!(value(&params, "waypoints"), None);
        assert_eq!(value(&params, "avoid"), None);
        assert_eq!(value(&params, "departure_time"), None);
    }

    #[test]
    fn optimized_waypoints_and_avoid_flags() {
        let mut req = request(TravelMode::Driving);
        req.waypoints = vec!["Lexington, MA".to_string(), "".to_string()];
        req.optimize_waypoints = true;
        req.avoid = [Avoid::Tolls, Avoid::Highways].into_iter().collect();
        let params = req.query_params();
        assert_eq!(
            value(&params, "waypoints"),
            Some("optimize:true|Lexington, MA|")
        );
        assert_eq!(value(&params, "avoid"), Some("highways|tolls"));
    }

    #[test]
    fn transit_arrival_and_preferences() {
        let mut req = request(TravelMode::Transit);
        let by = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        req.transit = Some(TransitOptions {
            departure: DeparturePolicy::ArriveBy(by),
            vehicle: TransitVehicle::Rail,
            routing: TransitRoutingPreference::FewerTransfers,
        });
        let params = req.query_params();
        assert_eq!(value(&params, "arrival_time"), Some("1792414800"));
        assert_eq!(value(&params, "departure_time"), None);
        assert_eq!(value(&params, "transit_mode"), Some("rail"));
        assert_eq!(
            value(&params, "transit_routing_preference"),
            Some("fewer_transfers")
        );
    }

    #[test]
    fn transit_defaults_add_nothing() {
        let mut req = request(TravelMode::Transit);
        req.transit = Some(TransitOptions {
            departure: DeparturePolicy::Now,
            vehicle: TransitVehicle::Any,
            routing: TransitRoutingPreference::Best,
        });
        let params = req.query_params();
        assert_eq!(params.len(), 7);
    }
}
