//! Shared test fixture: a small tram, bus and train network.
//!
//! ```text
//! ALT - NAV - TIM - CRN - DEA - SPS - PIC        Altrincham tram, every 12 min
//!                         |     |      \
//! BUR - VIC ------------- SPS - DEA - ECC        Bury tram, every 12 min
//!                                        \
//!                                    PGB - ASH   bus, every 15 min (PIC-PGB walk 6 min)
//!
//! OXR - STO                                      train, Sundays only
//! ```
//!
//! Weekday services run Monday to Friday through June 2024.

use chrono::{NaiveDate, Weekday};

use crate::domain::{
    AreaId, Route, Service, ServiceCalendar, Station, StationGroup, StationId, StopCall, TramTime,
    TransportMode, Trip,
};
use crate::graph::{GraphBuilder, MemoryGraph};
use crate::repository::{
    ClosedStationsRepository, NetworkFile, Repositories, TransportDataContainer, WalkEntry,
};

pub const ALTY_ROUTE: &str = "TRAM_ALTY";
pub const BURY_ROUTE: &str = "TRAM_BURY";
pub const BUS_ROUTE: &str = "BUS_ASH";
pub const TRAIN_ROUTE: &str = "TRAIN_STO";
pub const PICCADILLY_AREA: &str = "PICAREA";

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
}

pub fn t(s: &str) -> TramTime {
    TramTime::parse_hhmm(s).unwrap()
}

fn weekdays() -> ServiceCalendar {
    ServiceCalendar::new(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
    )
    .unwrap()
}

fn sundays() -> ServiceCalendar {
    ServiceCalendar::new(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        vec![Weekday::Sun],
    )
    .unwrap()
}

/// Trips every `headway` minutes from `first` to `last` inclusive, calling at
/// `(station, minutes after first stop)`.
fn trips(
    prefix: &str,
    service: &str,
    route: &str,
    first: &str,
    last: &str,
    headway: i64,
    stops: &[(&str, i64)],
) -> Vec<Trip> {
    let mut result = Vec::new();
    let mut start = t(first);
    let last = t(last);
    while start <= last {
        let calls = stops
            .iter()
            .enumerate()
            .map(|(index, (station, offset))| {
                let call = StopCall::at(*station, start + chrono::Duration::minutes(*offset));
                if index == 0 { call.on_platform("1") } else { call }
            })
            .collect();
        let id = format!("{prefix}_{}", start.to_string().replace(':', ""));
        result.push(Trip::new(id.as_str(), service, route, calls).unwrap());
        start = start + chrono::Duration::minutes(headway);
    }
    result
}

pub fn network() -> NetworkFile {
    let tram = |id: &str, name: &str| Station::new(id, name, TransportMode::Tram);
    let stations = vec![
        tram("ALT", "Altrincham"),
        tram("NAV", "Navigation Road"),
        tram("TIM", "Timperley"),
        tram("CRN", "Cornbrook"),
        tram("DEA", "Deansgate-Castlefield"),
        tram("SPS", "St Peter's Square"),
        tram("PIC", "Piccadilly").in_area(PICCADILLY_AREA),
        tram("BUR", "Bury"),
        tram("VIC", "Victoria"),
        tram("ECC", "Eccles"),
        Station::new("PGB", "Piccadilly Gardens", TransportMode::Bus).in_area(PICCADILLY_AREA),
        Station::new("ASH", "Ashton Bus Station", TransportMode::Bus),
        Station::new("OXR", "Oxford Road", TransportMode::Train),
        Station::new("STO", "Stockport", TransportMode::Train),
    ];

    let routes = vec![
        Route::new(ALTY_ROUTE, "Altrincham - Piccadilly", TransportMode::Tram),
        Route::new(BURY_ROUTE, "Bury - Eccles", TransportMode::Tram),
        Route::new(BUS_ROUTE, "Piccadilly Gardens - Ashton", TransportMode::Bus),
        Route::new(TRAIN_ROUTE, "Oxford Road - Stockport", TransportMode::Train),
    ];

    let services = vec![
        Service {
            id: "WKD_ALTY".into(),
            route: ALTY_ROUTE.into(),
            calendar: weekdays(),
        },
        Service {
            id: "WKD_BURY".into(),
            route: BURY_ROUTE.into(),
            calendar: weekdays(),
        },
        Service {
            id: "WKD_BUS".into(),
            route: BUS_ROUTE.into(),
            calendar: weekdays(),
        },
        Service {
            id: "SUN_TRAIN".into(),
            route: TRAIN_ROUTE.into(),
            calendar: sundays(),
        },
    ];

    let mut all_trips = trips(
        "ALTY",
        "WKD_ALTY",
        ALTY_ROUTE,
        "07:00",
        "11:00",
        12,
        &[
            ("ALT", 0),
            ("NAV", 3),
            ("TIM", 6),
            ("CRN", 10),
            ("DEA", 13),
            ("SPS", 15),
            ("PIC", 18),
        ],
    );
    all_trips.extend(trips(
        "BURY",
        "WKD_BURY",
        BURY_ROUTE,
        "07:06",
        "11:06",
        12,
        &[("BUR", 0), ("VIC", 5), ("SPS", 9), ("DEA", 11), ("ECC", 16)],
    ));
    all_trips.extend(trips(
        "BUS",
        "WKD_BUS",
        BUS_ROUTE,
        "07:05",
        "11:05",
        15,
        &[("PGB", 0), ("ASH", 15)],
    ));
    all_trips.extend(trips(
        "TRAIN",
        "SUN_TRAIN",
        TRAIN_ROUTE,
        "07:30",
        "11:30",
        60,
        &[("OXR", 0), ("STO", 10)],
    ));

    NetworkFile {
        stations,
        groups: vec![StationGroup {
            id: AreaId::new(PICCADILLY_AREA),
            name: "Piccadilly".to_string(),
            stations: vec![StationId::new("PIC"), StationId::new("PGB")],
        }],
        routes,
        services,
        trips: all_trips,
        walks: vec![WalkEntry {
            from: StationId::new("PIC"),
            to: StationId::new("PGB"),
            minutes: 6,
        }],
        closures: Vec::new(),
    }
}

pub fn transport_data() -> TransportDataContainer {
    TransportDataContainer::new(network()).unwrap()
}

pub fn graph(data: &TransportDataContainer) -> MemoryGraph {
    GraphBuilder::new(data).build().unwrap()
}

/// Graph plus repositories over the fixture network.
pub fn fixture() -> (MemoryGraph, Repositories) {
    fixture_with_closures(ClosedStationsRepository::new())
}

pub fn fixture_with_closures(closed: ClosedStationsRepository) -> (MemoryGraph, Repositories) {
    let data = transport_data();
    let graph = graph(&data);
    (graph, Repositories::new(data, closed))
}
