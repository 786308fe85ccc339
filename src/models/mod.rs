pub mod data_object;
pub mod guard;
pub mod ingest;
pub mod profile;
pub mod report;

pub use data_object::*;
pub use guard::*;
pub use ingest::*;
pub use profile::*;
pub use report::*;
