pub mod candle;
pub mod detection;
pub mod signal;

pub use candle::*;
pub use detection::*;
pub use signal::*;
