mod socket;

pub use socket::*;
