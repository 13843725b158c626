pub mod actions;
pub mod html;
