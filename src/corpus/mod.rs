pub mod newsela;
pub mod onestop;

pub use newsela::NewselaExtractor;
pub use onestop::OneStopExtractor;
