pub mod schema;
pub mod snapshot;
pub mod timeline;

pub use schema::LandmarkIndex;
pub use snapshot::{Keypoint, LandmarkSnapshot, Point2};
pub use timeline::{RecordedTimeline, TimelineEntry};
