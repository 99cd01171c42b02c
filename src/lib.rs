pub mod aggregate;
pub mod audio;
pub mod bank;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod note;
pub mod pipeline;
pub mod resolver;
pub mod storyboard;
pub mod timing;

pub use config::Config;
pub use error::Error;
pub use pipeline::{Converter, RunOutcome, RunReport};
