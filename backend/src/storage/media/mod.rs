//! Image storage backends behind the `MediaStore` capability.

pub mod hosted;
pub mod local;

pub use hosted::HostedMediaStore;
pub use local::LocalDiskMediaStore;
