mod convert;
mod locator;
mod value_utils;

pub use convert::convert_script;
pub use locator::locate_element;
pub use value_utils::{as_sequence, sanitize};
