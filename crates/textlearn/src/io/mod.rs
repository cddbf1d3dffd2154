//! IO utilities for loading labeled text datasets.

pub mod dataset_reader;

pub use dataset_reader::{
    read_dataset, read_delimited, read_delimited_with_config, read_json, DatasetReaderConfig,
};
