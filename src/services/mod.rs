pub mod export;
pub mod remote;
pub mod schema;
pub mod stats;
pub mod store;
pub mod view;

pub use export::*;
pub use remote::*;
pub use stats::*;
pub use store::*;
pub use view::*;
