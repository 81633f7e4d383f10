pub mod import;
pub mod settings;
pub mod lessons;
pub mod events;
pub mod dashboard;

pub use import::*;
pub use settings::*;
pub use lessons::*;
pub use events::*;
pub use dashboard::*;
