pub mod clipboard;
pub mod config;
pub mod cursor;
pub mod document;
pub mod mode;
pub mod search;
pub mod selection;
pub mod viewport;
