pub mod assertions;
pub mod element;
pub mod requests;
pub mod target;
pub mod trace;

pub use assertions::*;
pub use element::*;
pub use requests::*;
pub use target::*;
pub use trace::*;
