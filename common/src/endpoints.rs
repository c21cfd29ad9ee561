pub const PATH_SENSORS: &str = "/sensors";
pub const PATH_COMMAND_QUEUE: &str = "/rest/v1/controller_commands";
pub const PATH_SENSOR_READINGS: &str = "/rest/v1/sensor_readings";

pub const HEADER_API_KEY: &str = "apikey";
pub const HEADER_PREFER: &str = "Prefer";
pub const PREFER_RETURN_MINIMAL: &str = "return=minimal";

pub const FILTER_STATUS_PENDING: &str = "eq.pending";
pub const ORDER_CREATED_ASC: &str = "created_at.asc";

pub fn filter_eq(value: &str) -> String {
    format!("eq.{value}")
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
