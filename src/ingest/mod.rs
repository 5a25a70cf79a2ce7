/// Data ingestion: the historical temperature CSV and the live
/// current-weather endpoint.
pub mod csv_table;
pub mod openweather;

#[cfg(test)]
pub(crate) mod fixtures;
