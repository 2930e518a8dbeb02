pub mod filename;
pub mod size;
pub mod url;
