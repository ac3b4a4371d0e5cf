//! Core module - platform-independent polling logic

pub mod constants;
pub mod freshness;
pub mod record;
pub mod session;
pub mod traits;
pub mod transform;
pub mod types;

pub use freshness::{check_freshness, Freshness};
pub use record::{parse_record, parse_snapshot, MalformedReason, RecordError, RecordGrammar};
pub use session::{
    Availability, Fetch, FetchError, PositionalSession, SessionConfig, UnavailableReason,
};
pub use traits::{Clock, HostLog, RecordSource};
pub use transform::transform;
pub use types::{FileSnapshot, FileStat, Observer, ParsedRecord, SpatialFrame};
