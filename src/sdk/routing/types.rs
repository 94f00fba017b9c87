use super::error::RoutingError;
use serde::Deserialize;
use serde_json::Value;

// --- Data Structures for parsing directions responses ---

/// A `{ "text": ..., "value": ... }` pair. Only the display text is kept.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TextValue {
    pub text: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Vehicle {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Line {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TransitDetails {
    #[serde(default)]
    pub line: Option<Line>,
    #[serde(default)]
    pub headsign: Option<String>,
    #[serde(default)]
    pub departure_stop: Option<Stop>,
    #[serde(default)]
    pub arrival_stop: Option<Stop>,
    #[serde(default)]
    pub departure_time: Option<TextValue>,
    #[serde(default)]
    pub arrival_time: Option<TextValue>,
    #[serde(default)]
    pub num_stops: Option<u32>,
}

/// A maneuver nested under a mixed-mode step. Sub-steps never nest further.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SubStep {
    #[serde(default)]
    pub html_instructions: Option<String>,
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Step {
    pub travel_mode: String,
    #[serde(default)]
    pub html_instructions: Option<String>,
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub transit_details: Option<TransitDetails>,
    #[serde(default)]
    pub steps: Vec<SubStep>,
}

impl Step {
    pub fn is_transit(&self) -> bool {
        self.travel_mode == "TRANSIT"
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Leg {
    pub start_address: String,
    pub end_address: String,
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub departure_time: Option<TextValue>,
    #[serde(default)]
    pub arrival_time: Option<TextValue>,
    pub steps: Vec<Step>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub legs: Vec<Leg>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// An alternative that could not be read. Holds its position in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRoute {
    pub index: usize,
    pub reason: String,
}

pub type RouteAlternative = Result<Route, MalformedRoute>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteResponse {
    pub routes: Vec<RouteAlternative>,
}

// Top-level body. Routes are kept raw so one bad alternative cannot sink the rest.
#[derive(Deserialize)]
struct DirectionsEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Option<Vec<Value>>,
}

impl RouteResponse {
    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self {
            routes: routes.into_iter().map(Ok).collect(),
        }
    }

    /// Parses a directions body, mapping non-OK statuses onto `RoutingError::Api`.
    pub fn from_json(text: &str) -> Result<Self, RoutingError> {
        let envelope: DirectionsEnvelope = serde_json::from_str(text)?;
        match envelope.status.as_str() {
            "OK" => {
                let raw = envelope
                    .routes
                    .ok_or_else(|| RoutingError::MissingField("routes".to_string()))?;
                let routes = raw
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| {
                        serde_json::from_value::<Route>(value).map_err(|e| {
                            log::warn!("Route {} is malformed: {}", index + 1, e);
                            MalformedRoute {
                                index,
                                reason: e.to_string(),
                            }
                        })
                    })
                    .collect();
                Ok(Self { routes })
            }
            "ZERO_RESULTS" => Ok(Self::default()),
            status => Err(RoutingError::Api {
                status: status.to_string(),
                message: envelope
                    .error_message
                    .unwrap_or_else(|| status.to_string()),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_parses_nested_structure() {
        let body = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{
                    "start_address": "A",
                    "end_address": "B",
                    "distance": {"text": "5 mi", "value": 8047},
                    "steps": [{
                        "travel_mode": "TRANSIT",
                        "transit_details": {
                            "line": {"short_name": "5", "vehicle": {"name": "Bus"}},
                            "num_stops": 3
                        },
                        "steps": [{"html_instructions": "Walk"}]
                    }]
                }],
                "warnings": ["Walking directions are in beta."]
            }]
        }"#;
        let response = RouteResponse::from_json(body).unwrap();
        assert_eq!(response.len(), 1);
        let route = response.routes[0].as_ref().unwrap();
        let leg = &route.legs[0];
        assert_eq!(leg.distance.as_ref().unwrap().text, "5 mi");
        assert!(leg.duration.is_none());
        let step = &leg.steps[0];
        assert!(step.is_transit());
        assert_eq!(step.transit_details.as_ref().unwrap().num_stops, Some(3));
        assert_eq!(step.steps.len(), 1);
        assert_eq!(route.warnings.len(), 1);
    }

    #[test]
    fn zero_results_is_an_empty_response() {
        let response =
            RouteResponse::from_json(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn error_status_carries_provider_message() {
        let err = RouteResponse::from_json(
            r#"{"status": "REQUEST_DENIED", "error_message": "Bad key", "routes": []}"#,
        )
        .unwrap_err();
        match err {
            RoutingError::Api { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "Bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ok_without_routes_is_a_missing_field() {
        let err = RouteResponse::from_json(r#"{"status": "OK"}"#).unwrap_err();
        assert!(matches!(err, RoutingError::MissingField(ref f) if f == "routes"));
    }

    #[test]
    fn route_without_legs_is_isolated() {
        let body = r#"{
            "status": "OK",
            "routes": [
                {"summary": "broken"},
                {"legs": [{"start_address": "A", "end_address": "B", "steps": []}]}
            ]
        }"#;
        let response = RouteResponse::from_json(body).unwrap();
        assert_eq!(response.len(), 2);
        let bad = response.routes[0].as_ref().unwrap_err();
        assert_eq!(bad.index, 0);
        assert!(bad.reason.contains("legs"));
        assert!(response.routes[1].is_ok());
    }
}
