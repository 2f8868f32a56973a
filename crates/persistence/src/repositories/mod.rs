//! Repository implementations for database operations.

pub mod access_event;
pub mod access_link;
pub mod data_room;
pub mod room_file;

pub use access_event::AccessEventRepository;
pub use access_link::AccessLinkRepository;
pub use data_room::DataRoomRepository;
pub use room_file::RoomFileRepository;
