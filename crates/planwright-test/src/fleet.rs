//! List fixture: vehicles own ordered stop lists. Stops carry the list
//! inverse `vehicle`, the list index `index` and a custom `arrival`
//! derived from the index.

use planwright_core::domain::{
    EntityDescriptor, PlanningSolution, SolutionDescriptor, SourceRef, VariableDescriptor,
    VariableId,
};
use planwright_core::score::SimpleScore;

pub const VEHICLE: usize = 0;
pub const STOP: usize = 1;

/// Minutes between consecutive stops.
pub const LEG_MINUTES: i64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vehicle {
    pub id: usize,
    pub stops: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stop {
    pub id: usize,
    pub deadline: i64,
    pub vehicle: Option<usize>,
    pub index: Option<usize>,
    pub arrival: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct Fleet {
    pub vehicles: Vec<Vehicle>,
    pub stops: Vec<Stop>,
    pub score: Option<SimpleScore>,
}

impl Fleet {
    /// `deadlines[s]` is the deadline of stop `s`; `routes[v]` lists the
    /// stops of vehicle `v` in visiting order.
    pub fn new(deadlines: &[i64], routes: Vec<Vec<usize>>) -> Self {
        Self {
            vehicles: routes
                .into_iter()
                .enumerate()
                .map(|(id, stops)| Vehicle { id, stops })
                .collect(),
            stops: deadlines
                .iter()
                .enumerate()
                .map(|(id, deadline)| Stop {
                    id,
                    deadline: *deadline,
                    vehicle: None,
                    index: None,
                    arrival: None,
                })
                .collect(),
            score: None,
        }
    }
}

impl PlanningSolution for Fleet {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// The `Vehicle.stops` list variable.
pub fn stops_variable() -> VariableId {
    VariableId::new(VEHICLE, 0)
}

pub fn vehicles(s: &Fleet) -> &[Vehicle] {
    &s.vehicles
}

pub fn stops(s: &Fleet) -> &[Stop] {
    &s.stops
}

fn vehicle_count(s: &Fleet) -> usize {
    s.vehicles.len()
}

fn stop_count(s: &Fleet) -> usize {
    s.stops.len()
}

fn get_stops(s: &Fleet, i: usize) -> &[usize] {
    &s.vehicles[i].stops
}

fn get_stops_mut(s: &mut Fleet, i: usize) -> &mut Vec<usize> {
    &mut s.vehicles[i].stops
}

fn get_vehicle(s: &Fleet, i: usize) -> Option<usize> {
    s.stops[i].vehicle
}

fn set_vehicle(s: &mut Fleet, i: usize, v: Option<usize>) {
    s.stops[i].vehicle = v;
}

fn get_index(s: &Fleet, i: usize) -> Option<usize> {
    s.stops[i].index
}

fn set_index(s: &mut Fleet, i: usize, v: Option<usize>) {
    s.stops[i].index = v;
}

fn update_arrival(s: &mut Fleet, i: usize) {
    s.stops[i].arrival = s.stops[i].index.map(|idx| (idx as i64 + 1) * LEG_MINUTES);
}

pub fn fleet_descriptor() -> SolutionDescriptor<Fleet> {
    let source = SourceRef::new("Vehicle", "stops");
    SolutionDescriptor::new("Fleet")
        .with_entity(
            EntityDescriptor::new::<Vehicle>("Vehicle", "vehicles", vehicle_count).with_variable(
                VariableDescriptor::list("stops", "Stop", get_stops, get_stops_mut),
            ),
        )
        .with_entity(
            EntityDescriptor::new::<Stop>("Stop", "stops", stop_count)
                .with_variable(VariableDescriptor::list_inverse(
                    "vehicle",
                    source,
                    get_vehicle,
                    set_vehicle,
                ))
                .with_variable(VariableDescriptor::list_index(
                    "index",
                    source,
                    get_index,
                    set_index,
                ))
                .with_variable(VariableDescriptor::custom(
                    "arrival",
                    vec![SourceRef::new("Stop", "index")],
                    update_arrival,
                )),
        )
        .build()
        .expect("fleet descriptor is valid")
}
