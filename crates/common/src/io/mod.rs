mod dataset;
mod literal;

pub use dataset::parse_instance;
pub use dataset::read_dataset;
pub use dataset::write_dataset;
pub use dataset::write_instance;
pub use dataset::ParseInstanceError;
pub use dataset::ReadDatasetError;
