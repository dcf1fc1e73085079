pub mod controller;
pub mod negotiator;
pub mod render_loop;
pub(crate) mod status;
pub mod wire_api;
