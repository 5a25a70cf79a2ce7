/// Organizes the flat loaded table into per-city series.

use std::collections::BTreeMap;

use crate::ingest::csv_table::TemperatureTable;
use crate::model::{CitySeries, Reading};

/// All readings for `city`, sorted ascending by timestamp.
///
/// The sort is stable: readings sharing a timestamp keep their file order.
/// An unknown city gives an empty series, not an error.
pub fn city_slice(table: &TemperatureTable, city: &str) -> CitySeries {
    let readings: Vec<Reading> = table
        .readings
        .iter()
        .filter(|r| r.city == city)
        .cloned()
        .collect();
    into_series(city, readings)
}

/// Every city in the table, keyed by name. Each series is sorted by time.
pub fn group_by_city(table: &TemperatureTable) -> BTreeMap<String, CitySeries> {
    let mut grouped: BTreeMap<String, Vec<Reading>> = BTreeMap::new();
    for reading in &table.readings {
        grouped
            .entry(reading.city.clone())
            .or_default()
            .push(reading.clone());
    }
    grouped
        .into_iter()
        .map(|(city, readings)| {
            let series = into_series(&city, readings);
            (city, series)
        })
        .collect()
}

fn into_series(city: &str, mut readings: Vec<Reading>) -> CitySeries {
    readings.sort_by_key(|r| r.timestamp);
    CitySeries {
        city: city.to_string(),
        readings,
    }
}
