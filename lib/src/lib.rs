pub mod chromosome;
pub mod context;
pub mod error;
pub mod gaf;
pub mod interval_index;
pub mod location;
pub mod mapper;
pub mod normalize;
pub mod selection;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{Error, Result};
pub use types::{Bp, Id, IdCategory, IdType, Strand};
