#[cfg(feature = "armstrong")]
pub mod armstrong;
#[cfg(feature = "armstrong")]
pub use armstrong::Armstrong;

#[cfg(feature = "dummy")]
pub mod dummy;
#[cfg(feature = "dummy")]
pub use dummy::Dummy;
