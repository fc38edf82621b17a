//! Error module.
//!

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Status {
    #[error("You must specify a database, either with -d or $TACVIEW_DB")]
    NoDatabase,
    #[error("File does not exist at location: {0}")]
    NoSuchFile(String),
}
