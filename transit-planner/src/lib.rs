//! Journey planner over a time-expanded transport graph.
//!
//! Answers "how do I get from here to there, leaving at this time?" for a
//! tram, bus and train network. Timetables are laid out as a graph of
//! stations, route-stations, and service, hour and minute nodes; a
//! best-first search walks that graph, judging each step with heuristics
//! and recording why every rejected path was rejected.

pub mod diagnostics;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod repository;

#[cfg(test)]
mod testing;
