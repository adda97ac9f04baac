pub(crate) mod console_sink;
pub(crate) mod sigint_checker;
pub(crate) mod stub_ports;

pub(crate) use console_sink::ConsoleSink;
pub(crate) use sigint_checker::{NoopInterruptChecker, SigintChecker};
