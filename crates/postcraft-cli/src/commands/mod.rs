pub mod context;
pub mod form;
pub mod formats;
pub mod generate;
pub mod render;
