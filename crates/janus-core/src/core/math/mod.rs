pub mod quaternion;
pub mod vector;

pub use quaternion::Quaternion;
pub use vector::Vector3;
