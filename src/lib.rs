pub mod clock;
pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod gate;
pub mod geometry;
pub mod participants;
pub mod presenter;
pub mod roulette;
pub mod session;

pub use driver::{AdGate, Presenter, SpinDriver, SpinTiming};
pub use error::WheelError;
pub use session::{Admission, Frame, SpinReport, SpinState, WheelSession};
