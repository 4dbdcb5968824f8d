//! Widgets over system control classes

pub mod button;
pub mod text_input;

pub use button::Button;
pub use text_input::TextInput;
