mod app_cfg;
mod app_fns;
mod arg_parse;
mod errors;
mod sinks;
mod sources;
mod stop;

pub(crate) use app_cfg::*;
pub(crate) use errors::*;

pub use app_fns::run_app;
