mod common;
mod unit_config;
