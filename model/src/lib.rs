pub mod error;
pub mod github;
pub mod record;

pub use error::ParseError;
pub use github::RawRepository;
pub use record::RepositoryRecord;
