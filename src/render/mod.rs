pub mod canvas;
pub mod skeleton;
#[cfg(feature = "desktop")]
pub mod window;

pub use canvas::Canvas;
pub use skeleton::HAND_CONNECTIONS;
#[cfg(feature = "desktop")]
pub use minifb::Key;
#[cfg(feature = "desktop")]
pub use window::MinifbRenderer;
