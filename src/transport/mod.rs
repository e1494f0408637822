//! smart-HTTP transport: pkt-line framing, ref discovery, packfile
//! fetching and decoding

pub mod clone;
pub mod delta;
pub mod http;
pub mod pack;
pub mod pkt;

pub use clone::clone;
pub use delta::apply_delta;
pub use pack::{parse_pack, PackIndex};
