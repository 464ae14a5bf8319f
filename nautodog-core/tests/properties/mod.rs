//! Property test modules

mod config_tests;
mod predicate_tests;
mod shell_tests;
mod snmp_tests;
