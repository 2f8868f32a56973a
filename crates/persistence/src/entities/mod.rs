//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod access_event;
pub mod access_link;
pub mod data_room;
pub mod room_file;

pub use access_event::AccessEventEntity;
pub use access_link::AccessLinkEntity;
pub use data_room::DataRoomEntity;
pub use room_file::RoomFileEntity;
