pub mod code;
pub mod highlight;
pub mod layout;
