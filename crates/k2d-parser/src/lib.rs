pub mod xml;

pub use xml::parse_script_source;
