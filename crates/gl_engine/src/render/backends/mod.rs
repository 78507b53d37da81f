//! Concrete graphics backends

#[cfg(feature = "opengl")]
pub mod opengl;

#[cfg(feature = "opengl")]
pub use opengl::GlowApi;
