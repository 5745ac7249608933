//!
//! Built-in atomic rules
//! Rules are grouped by family and registered under their grammar names.
pub mod checksum;
pub mod custom;
pub mod date;
pub mod dimension;
pub mod file;
pub mod format;
pub mod numeric;
pub mod presence;
pub mod string;

pub use checksum::{Barcode, Ean, Isbn10, Upca};
pub use custom::FnRule;
pub use date::{Date, DateAll, DateTime, ShouldOld, TillDate, parse_date};
pub use dimension::{Dimension, read_dimensions};
pub use file::{FileExt, FileSize, FileType, Image};
pub use format::{Email, Ipv4, Ipv6, Json, Url, ZipCode};
pub use numeric::{MaxNumb, MinNumb, Numb, NumbSpace, Range};
pub use presence::{Accept, Required};
pub use string::{
    Alpha, AlphaNumeric, DetectMultipleSpaces, HasDigit, HasLowerCase, HasSpecial, HasUpperCase,
    InList, LowerCase, Matches, Max, Min, NoSpace, NoSpecial, NotMatches, Password, Same, Space,
    UpperCase,
};

use crate::registry::RuleRegistry;

/// Registers every built-in rule.
pub fn register_builtins(registry: &mut RuleRegistry) {
    register_presence_rules(registry);
    register_string_rules(registry);
    register_format_rules(registry);
    register_numeric_rules(registry);
    register_checksum_rules(registry);
    register_date_rules(registry);
    register_file_rules(registry);
}

// Registration functions for each family

fn register_presence_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("required", Required);
    registry.insert_builtin("accept", Accept);
}

fn register_string_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("alpha", Alpha);
    registry.insert_builtin("alphaNumeric", AlphaNumeric);
    registry.insert_builtin("lowerCase", LowerCase);
    registry.insert_builtin("upperCase", UpperCase);
    registry.insert_builtin("hasLowerCase", HasLowerCase);
    registry.insert_builtin("hasUpperCase", HasUpperCase);
    registry.insert_builtin("hasDigit", HasDigit);
    registry.insert_builtin("hasSpecial", HasSpecial);
    registry.insert_builtin("noSpecial", NoSpecial);
    registry.insert_builtin("noSpace", NoSpace);
    registry.insert_builtin("space", Space);
    registry.insert_builtin("detectMultipleSpaces", DetectMultipleSpaces);
    registry.insert_builtin("min", Min);
    registry.insert_builtin("max", Max);
    registry.insert_builtin("password", Password);
    registry.insert_builtin("same", Same);
    registry.insert_builtin("inList", InList);
    registry.insert_builtin("regex", Matches);
    registry.insert_builtin("notRegex", NotMatches);
}

fn register_format_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("email", Email);
    registry.insert_builtin("url", Url);
    registry.insert_builtin("zipCode", ZipCode);
    registry.insert_builtin("json", Json);
    registry.insert_builtin("ipv4", Ipv4);
    registry.insert_builtin("ipv6", Ipv6);
}

fn register_numeric_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("numb", Numb);
    registry.insert_builtin("numb_space", NumbSpace);
    registry.insert_builtin("minnumb", MinNumb);
    registry.insert_builtin("maxnumb", MaxNumb);
    registry.insert_builtin("range", Range);
}

fn register_checksum_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("isbn10", Isbn10);
    registry.insert_builtin("upca", Upca);
    registry.insert_builtin("ean", Ean);
    registry.insert_builtin("barcode", Barcode);
}

fn register_date_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("date", Date);
    registry.insert_builtin("dateAll", DateAll);
    registry.insert_builtin("dateTime", DateTime);
    registry.insert_builtin("tillDate", TillDate);
    registry.insert_builtin("shouldOld", ShouldOld);
}

fn register_file_rules(registry: &mut RuleRegistry) {
    registry.insert_builtin("fileSize", FileSize);
    registry.insert_builtin("fileType", FileType);
    registry.insert_builtin("fileExt", FileExt);
    registry.insert_builtin("image", Image);
    registry.insert_builtin("dimension", Dimension);
}
