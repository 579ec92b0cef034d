//! # ofs-client
//!
//! Blocking client for a Swift-style object storage service (token auth via
//! an Identity v2.0 endpoint, containers and objects over plain HTTP), plus a
//! one-call Slack webhook notifier.
//!
//! # Quick Start
//!
//! ```no_run
//! use ofs_client::{Client, Credentials, Download, Listing};
//!
//! fn main() -> Result<(), ofs_client::OfsError> {
//!     let client = Client::new(Credentials::new(
//!         "gncu12345678",
//!         "password",
//!         "0123456789abcdef",
//!         "https://identity.example.com/v2.0/tokens",
//!         "https://object-storage.example.com/v1/AUTH_0123456789abcdef",
//!     ))?;
//!
//!     client.create_container("test")?;
//!     client.put_object("local/a.txt", "test")?;
//!
//!     if let Listing::Objects(objects) = client.list_objects("test", "")? {
//!         for object in objects {
//!             println!("{}", object.name);
//!         }
//!     }
//!
//!     if let Download::Saved { path, .. } = client.get_object("test/a.txt", "/tmp/out", false)? {
//!         println!("saved to {}", path.display());
//!     }
//!     client.delete_object("test/a.txt")?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
mod error;
pub mod notify;
mod response;
mod uri;

pub use client::Client;
pub use config::Credentials;
pub use error::{OfsError, Result};
pub use notify::Notifier;
pub use response::{Download, Listing, ObjectInfo, Response};
