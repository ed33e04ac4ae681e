pub mod landmark;

pub use landmark::{HandLandmark, Landmark, RawLandmarks};
