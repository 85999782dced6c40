pub mod lookup;
pub mod matcher;

pub use crate::domain::model::{AddressQuery, Diagnostics, LookupOutcome, LookupReport};
pub use crate::domain::ports::{ConfigProvider, Presenter, RecordFetcher};
pub use crate::utils::error::Result;
