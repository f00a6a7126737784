pub mod capture;
pub mod classifier;
pub mod config;
pub mod demux;
pub mod dissect;
pub mod error;
pub mod extract;
pub mod frame;
pub mod record;
pub mod sniffer;
pub mod utils;

mod signal;

pub use classifier::{DecodeReject, RtpFilter};
pub use error::Error;
pub use frame::CapturedFrame;
pub use sniffer::{Outcome, Sniffer, Stats};
