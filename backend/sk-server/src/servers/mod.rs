pub mod http_server;
pub mod in_flight;
