use super::datetime::{days_in_month, DateTimeSelection, Meridiem};
use super::request::{
    Avoid, DeparturePolicy, TransitOptions, TransitRoutingPreference, TransitVehicle, TravelMode,
    TripRequest,
};
use super::FormError;
use chrono::{NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeSet;

const MISSING_ENDPOINTS: &str = "You must supply a starting location and a destination.";

/// Which selector a date/time edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Month,
    Day,
    Hour,
    Minute,
    Meridiem,
}

/// Enabled state of every field whose availability depends on other selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledFields {
    pub waypoints: bool,
    pub optimize_waypoints: bool,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub avoid_ferries: bool,
    pub avoid_indoor: bool,
    pub departure: bool,
    pub date_time: bool,
    pub transit_preferences: bool,
}

impl EnabledFields {
    fn for_mode(mode: TravelMode) -> Self {
        let routed = mode != TravelMode::Transit;
        Self {
            waypoints: routed,
            optimize_waypoints: routed,
            avoid_highways: routed,
            avoid_tolls: routed,
            avoid_ferries: routed,
            avoid_indoor: true,
            departure: !routed,
            date_time: false,
            transit_preferences: !routed,
        }
    }

    pub fn avoid(&self, flag: Avoid) -> bool {
        match flag {
            Avoid::Highways => self.avoid_highways,
            Avoid::Tolls => self.avoid_tolls,
            Avoid::Ferries => self.avoid_ferries,
            Avoid::Indoor => self.avoid_indoor,
        }
    }
}

/// Trip form contents plus the rules that keep its fields consistent.
///
/// Every event handler is a plain state transition; wall-clock time is passed
/// in by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub origin: String,
    pub destination: String,
    mode: TravelMode,
    waypoints: String,
    optimize_waypoints: bool,
    avoid: BTreeSet<Avoid>,
    departure_selection: usize,
    vehicle: TransitVehicle,
    routing: TransitRoutingPreference,
    date_time: DateTimeSelection,
    day_count: u32,
    enabled: EnabledFields,
}

impl FormState {
    pub fn new(now: NaiveDateTime) -> Self {
        let date_time = DateTimeSelection::seeded(now);
        Self {
            origin: String::new(),
            destination: String::new(),
            mode: TravelMode::Driving,
            waypoints: String::new(),
            optimize_waypoints: false,
            avoid: BTreeSet::new(),
            departure_selection: 0,
            vehicle: TransitVehicle::Any,
            routing: TransitRoutingPreference::Best,
            day_count: days_in_month(date_time.year, date_time.month()),
            date_time,
            enabled: EnabledFields::for_mode(TravelMode::Driving),
        }
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn enabled(&self) -> EnabledFields {
        self.enabled
    }

    pub fn departure_selection(&self) -> usize {
        self.departure_selection
    }

    pub fn date_time(&self) -> DateTimeSelection {
        self.date_time
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    /// Items of the day selector: "01" through the last day of the month.
    pub fn day_labels(&self) -> Vec<String> {
        (1..=self.day_count).map(|d| format!("{:02}", d)).collect()
    }

    pub fn on_mode_changed(&mut self, mode: TravelMode) {
        self.mode = mode;
        self.enabled = EnabledFields::for_mode(mode);
        if mode == TravelMode::Transit {
            self.departure_selection = 0;
            self.vehicle = TransitVehicle::Any;
            self.routing = TransitRoutingPreference::Best;
        }
    }

    /// 0 is "depart now", 1 "depart after", 2 "arrive by".
    pub fn on_departure_policy_changed(
        &mut self,
        selection: usize,
        now: NaiveDateTime,
    ) -> Result<(), FormError> {
        if !self.enabled.departure {
            return Err(FormError::FieldDisabled("departure type"));
        }
        match selection {
            0 => {
                self.enabled.date_time = false;
            }
            1 | 2 => {
                self.date_time = DateTimeSelection::seeded(now);
                self.day_count = days_in_month(self.date_time.year, self.date_time.month());
                self.enabled.date_time = true;
            }
            index => {
                return Err(FormError::InvalidSelection {
                    field: "departure type",
                    index,
                })
            }
        }
        self.departure_selection = selection;
        Ok(())
    }

    /// Re-derives the year after a date/time edit. A month edit also rebuilds
    /// the day list and clamps the previous day into it.
    pub fn on_month_or_day_changed(&mut self, source: DateField, now: NaiveDateTime) {
        let previous_day = self.date_time.day_index;
        if source == DateField::Month {
            // Day 1 exists in every month, so the year can be derived safely.
            self.date_time.day_index = 0;
        }
        self.date_time.year = self.date_time.infer_year(now);
        if source != DateField::Month {
            return;
        }
        self.rebuild_days(previous_day);
        let settled = self.date_time.infer_year(now);
        if settled != self.date_time.year {
            self.date_time.year = settled;
            self.rebuild_days(self.date_time.day_index);
        }
    }

    fn rebuild_days(&mut self, day_index: u32) {
        self.day_count = days_in_month(self.date_time.year, self.date_time.month());
        self.date_time.day_index = day_index.min(self.day_count.saturating_sub(1));
    }

    fn require_date_time(&self) -> Result<(), FormError> {
        if self.enabled.date_time {
            Ok(())
        } else {
            Err(FormError::FieldDisabled("date/time"))
        }
    }

    /// `index` is 0 for January.
    pub fn set_month(&mut self, index: usize, now: NaiveDateTime) -> Result<(), FormError> {
        self.require_date_time()?;
        if index >= 12 {
            return Err(FormError::InvalidSelection {
                field: "month",
                index,
            });
        }
        self.date_time.month_index = index as u32;
        self.on_month_or_day_changed(DateField::Month, now);
        Ok(())
    }

    /// `index` is 0 for the first of the month.
    pub fn set_day(&mut self, index: usize, now: NaiveDateTime) -> Result<(), FormError> {
        self.require_date_time()?;
        if index >= self.day_count as usize {
            return Err(FormError::InvalidSelection { field: "day", index });
        }
        self.date_time.day_index = index as u32;
        self.on_month_or_day_changed(DateField::Day, now);
        Ok(())
    }

    /// `hour` is on the 1-12 clock face.
    pub fn set_hour(&mut self, hour: u32, now: NaiveDateTime) -> Result<(), FormError> {
        self.require_date_time()?;
        if !(1..=12).contains(&hour) {
            return Err(FormError::InvalidSelection {
                field: "hour",
                index: hour as usize,
            });
        }
        self.date_time.hour_index = hour - 1;
        self.on_month_or_day_changed(DateField::Hour, now);
        Ok(())
    }

    pub fn set_minute(&mut self, minute: u32, now: NaiveDateTime) -> Result<(), FormError> {
        self.require_date_time()?;
        if minute >= 60 {
            return Err(FormError::InvalidSelection {
                field: "minute",
                index: minute as usize,
            });
        }
        self.date_time.minute = minute;
        self.on_month_or_day_changed(DateField::Minute, now);
        Ok(())
    }

    pub fn set_meridiem(&mut self, meridiem: Meridiem, now: NaiveDateTime) -> Result<(), FormError> {
        self.require_date_time()?;
        self.date_time.meridiem = meridiem;
        self.on_month_or_day_changed(DateField::Meridiem, now);
        Ok(())
    }

    pub fn set_waypoints(&mut self, waypoints: &str) -> Result<(), FormError> {
        if !self.enabled.waypoints {
            return Err(FormError::FieldDisabled("waypoints"));
        }
        self.waypoints = waypoints.to_string();
        Ok(())
    }

    pub fn set_optimize_waypoints(&mut self, optimize: bool) -> Result<(), FormError> {
        if !self.enabled.optimize_waypoints {
            return Err(FormError::FieldDisabled("optimize waypoints"));
        }
        self.optimize_waypoints = optimize;
        Ok(())
    }

    pub fn set_avoid(&mut self, flag: Avoid, checked: bool) -> Result<(), FormError> {
        if !self.enabled.avoid(flag) {
            return Err(FormError::FieldDisabled(flag.as_str()));
        }
        if checked {
            self.avoid.insert(flag);
        } else {
            self.avoid.remove(&flag);
        }
        Ok(())
    }

    pub fn set_transit_vehicle(&mut self, vehicle: TransitVehicle) -> Result<(), FormError> {
        if !self.enabled.transit_preferences {
            return Err(FormError::FieldDisabled("transit mode"));
        }
        self.vehicle = vehicle;
        Ok(())
    }

    pub fn set_routing_preference(
        &mut self,
        routing: TransitRoutingPreference,
    ) -> Result<(), FormError> {
        if !self.enabled.transit_preferences {
            return Err(FormError::FieldDisabled("routing preference"));
        }
        self.routing = routing;
        Ok(())
    }

    /// Resolves the selected wall-clock time in `tz` and converts it to UTC.
    pub fn selected_utc<Tz: TimeZone>(&self, tz: &Tz) -> Result<chrono::DateTime<Utc>, FormError> {
        let naive = self.date_time.to_naive().ok_or_else(|| {
            FormError::InvalidDateTime(format!(
                "{}/{}/{} is not a calendar date",
                self.date_time.month(),
                self.date_time.day(),
                self.date_time.year
            ))
        })?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                FormError::InvalidDateTime(format!("{} does not exist in the local time zone", naive))
            })
    }

    pub fn build_request<Tz: TimeZone>(&self, tz: &Tz) -> Result<TripRequest, FormError> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(FormError::Validation(MISSING_ENDPOINTS.to_string()));
        }

        let transit = if self.mode == TravelMode::Transit {
            let departure = match self.departure_selection {
                1 => DeparturePolicy::DepartAt(self.selected_utc(tz)?),
                2 => DeparturePolicy::ArriveBy(self.selected_utc(tz)?),
                _ => DeparturePolicy::Now,
            };
            Some(TransitOptions {
                departure,
                vehicle: self.vehicle,
                routing: self.routing,
            })
        } else {
            None
        };

        // Entries left empty by "a||b" are passed through as-is.
        let waypoints: Vec<String> = if self.enabled.waypoints && !self.waypoints.trim().is_empty()
        {
            self.waypoints
                .split('|')
                .map(|point| point.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };
        let optimize_waypoints = self.optimize_waypoints && !waypoints.is_empty();
        // Transit searches never carry avoidances, even a checked indoor flag.
        let avoid = if transit.is_some() {
            BTreeSet::new()
        } else {
            self.avoid
                .iter()
                .copied()
                .filter(|flag| self.enabled.avoid(*flag))
                .collect()
        };

        Ok(TripRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
            mode: self.mode,
            waypoints,
            optimize_waypoints,
            avoid,
            transit,
        })
    }

    /// Clears the inputs consumed by a submission and drops back to driving.
    pub fn reset_after_submit(&mut self) {
        self.origin.clear();
        self.destination.clear();
        self.waypoints.clear();
        self.optimize_waypoints = false;
        self.avoid.clear();
        self.on_mode_changed(TravelMode::Driving);
    }
}
