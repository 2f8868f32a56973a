//! Domain models for the data room service.

pub mod access_event;
pub mod access_link;
pub mod data_room;
pub mod room_file;

pub use access_event::{AccessEvent, AccessOutcome, DenialReason, NewAccessEvent};
pub use access_link::{AccessLink, LinkStatus};
pub use data_room::DataRoom;
pub use room_file::RoomFile;
