pub mod env;
pub mod html;
pub mod logging;
#[cfg(test)]
pub mod mock;
