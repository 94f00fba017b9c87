//! Flattens a directions response into one text block per alternative route.
//!
//! Legs, steps and sub-steps are emitted in the order the provider returned
//! them. A clause is written only when its source field is present.

use super::types::{Leg, Route, RouteResponse, Step, SubStep, TextValue};
use scraper::Html;

const BULLET: &str = "* ";

/// Drops the literal `<b>`/`</b>` tags, then returns every text node of the
/// remaining markup in document order.
pub fn strip_instructions(html: &str) -> Vec<String> {
    let unbolded = html.replace("<b>", "").replace("</b>", "");
    let fragment = Html::parse_fragment(&unbolded);
    fragment
        .root_element()
        .text()
        .map(str::to_string)
        .collect()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Accumulates space-separated clauses for a single output line.
#[derive(Default)]
struct LineBuilder {
    text: String,
}

impl LineBuilder {
    fn clause(&mut self, clause: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push(' ');
        }
        self.text.push_str(clause);
    }

    fn break_line(&mut self) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn flush_into(&mut self, lines: &mut Vec<String>, capitalized: bool) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        lines.push(if capitalized { capitalize(&text) } else { text });
    }
}

fn travel_clauses(
    line: &mut LineBuilder,
    distance: Option<&TextValue>,
    duration: Option<&TextValue>,
) {
    if let Some(distance) = distance {
        line.clause(&format!("Travel {}", distance.text));
    }
    if let Some(duration) = duration {
        line.clause(&format!("(about {})", duration.text));
    }
}

pub fn format_leg(leg: &Leg) -> Vec<String> {
    let mut lines = vec![format!(
        "From: {}\nTo: {}",
        leg.start_address, leg.end_address
    )];
    let mut totals = LineBuilder::default();
    if let Some(distance) = &leg.distance {
        totals.clause(&format!("Total Distance: {}", distance.text));
    }
    if let Some(duration) = &leg.duration {
        totals.clause(&format!("({})", duration.text));
    }
    totals.flush_into(&mut lines, false);
    if let Some(departure) = &leg.departure_time {
        lines.push(format!("Departing: {}", departure.text));
    }
    if let Some(arrival) = &leg.arrival_time {
        lines.push(format!("Arriving: {}", arrival.text));
    }
    lines
}

pub fn format_step(step: &Step) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = LineBuilder::default();
    let details = step.transit_details.as_ref();
    // Boarding text reads as a sentence fragment ("board 5 Bus ..."); keep its case.
    let mut boarding = false;

    if let Some(details) = details {
        if let Some(departure) = &details.departure_time {
            line.clause(&format!("At {},", departure.text));
        }
        if let Some(transit_line) = &details.line {
            let names: Vec<&str> = [&transit_line.short_name, &transit_line.name]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            if !names.is_empty() {
                line.clause(&format!("board {}", names.join(" ")));
                boarding = true;
            }
            if let Some(vehicle) = transit_line.vehicle.as_ref().and_then(|v| v.name.as_ref()) {
                line.clause(vehicle);
            }
        }
        if let Some(headsign) = &details.headsign {
            line.clause(&format!("to {}", headsign));
        }
        if let Some(stop) = &details.departure_stop {
            line.clause(&format!("from {}", stop.name));
        }
        if let Some(num_stops) = details.num_stops {
            line.break_line();
            line.clause(&format!("Travel {} stops,", num_stops));
        }
    }
    if !step.is_transit() {
        if let Some(html) = &step.html_instructions {
            line.clause(&strip_instructions(html).join("\n"));
            line.flush_into(&mut lines, !boarding);
        }
    }

    travel_clauses(&mut line, step.distance.as_ref(), step.duration.as_ref());
    line.flush_into(&mut lines, !boarding);

    if let Some(details) = details {
        if let Some(arrival) = &details.arrival_time {
            line.clause(&format!("At {}", arrival.text));
        }
        if let Some(stop) = &details.arrival_stop {
            line.clause(&format!("disembark at {}", stop.name));
        }
        line.flush_into(&mut lines, true);
    }
    lines
}

pub fn format_sub_step(sub_step: &SubStep) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(html) = &sub_step.html_instructions {
        let separator = format!("\n{}", BULLET);
        let joined = strip_instructions(html).join(separator.as_str());
        lines.push(format!("{}{}", BULLET, capitalize(&joined)));
    }
    let mut line = LineBuilder::default();
    travel_clauses(&mut line, sub_step.distance.as_ref(), sub_step.duration.as_ref());
    if !line.is_empty() {
        lines.push(format!("{}{}", BULLET, capitalize(&line.text)));
    }
    lines
}

/// Renders one alternative as a single trimmed block.
pub fn format_route(route: &Route) -> String {
    let mut details = Vec::new();
    for leg in &route.legs {
        details.extend(format_leg(leg));
        for step in &leg.steps {
            details.extend(format_step(step));
            for sub_step in &step.steps {
                details.extend(format_sub_step(sub_step));
            }
        }
    }
    if !route.warnings.is_empty() {
        details.push(String::new());
        details.push(route.warnings.join("\n"));
    }
    details.join("\n").trim().to_string()
}

/// "{N} Route found." for exactly one route, "{N} Routes found." otherwise.
pub fn spoken_summary(count: usize) -> String {
    format!("{} Route{} found.", count, if count == 1 { "" } else { "s" })
}

/// Labels and text blocks for every alternative of one search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripResults {
    pub labels: Vec<String>,
    pub blocks: Vec<String>,
}

impl TripResults {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(String::as_str)
    }

    pub fn spoken_summary(&self) -> String {
        spoken_summary(self.len())
    }
}

pub fn format_response(response: &RouteResponse) -> TripResults {
    let mut results = TripResults::default();
    for (index, alternative) in response.routes.iter().enumerate() {
        results.labels.push(format!("Route {}", index + 1));
        let block = match alternative {
            Ok(route) => format_route(route),
            Err(malformed) => format!(
                "Route {} could not be displayed: {}",
                malformed.index + 1,
                malformed.reason
            ),
        };
        results.blocks.push(block);
    }
    results
}
