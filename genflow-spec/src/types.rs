//! Core Data Type Definitions
//!
//! ## Module Organization
//!
//! - **`media`** - Encoded media payloads (`EncodedMedia`) and the encoder
//! - **`part`** - Tagged content parts (`Part::Text` / `Part::Media`)
//! - **`message`** - Role-tagged messages and background documents
//! - **`config`** - Opaque generation configuration bag
//! - **`capabilities`** - Declared model capabilities
//! - **`request`** - `GenerateRequest`
//! - **`response`** - `GenerateResponse`, finish reasons, usage
//!
//! Everything is re-exported at this module root:
//!
//! ```rust
//! use genflow_spec::types::{GenerateRequest, Message, Part};
//! ```

pub mod capabilities;
pub mod config;
pub mod media;
pub mod message;
pub mod part;
pub mod request;
pub mod response;

pub use capabilities::*;
pub use config::*;
pub use media::*;
pub use message::*;
pub use part::*;
pub use request::*;
pub use response::*;
