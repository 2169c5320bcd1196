pub mod logging;
pub mod outcome;
