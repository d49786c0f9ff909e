//! Date windows for incremental sync
//!
//! An incremental stream is read one day at a time. The planner decides
//! where to start from the stream's bookmark and the attribution window:
//! recent records may have their `lastModified` set late, so the trailing
//! attribution window is always read again. The API keeps about 89 days of
//! history, which bounds how far back a sync may start.

mod planner;

pub use planner::{
    midnight, Window, WindowPlanner, Windows, FILTER_START_SUFFIX, MAX_LOOKBACK_DAYS,
    RETENTION_DAYS,
};
