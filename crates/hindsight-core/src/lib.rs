pub mod locale;
pub mod reconciler;
pub mod render;
pub mod transport;
mod warnings;
