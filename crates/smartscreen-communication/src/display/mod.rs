//! Drawing entry points: the [`LcdDisplay`] facade and the theme-aware
//! [`DisplayManager`].

pub mod facade;
pub mod manager;

pub use facade::{clamp_brightness, BitmapSource, LcdDisplay};
pub use manager::DisplayManager;
