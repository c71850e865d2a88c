pub mod common;

mod single_flight;
