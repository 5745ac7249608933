//! Default English message templates.

use std::borrow::Cow;
use std::collections::HashMap;

/// Built-in templates keyed by rule (or rule sub-check) name.
pub const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("alpha", "This field may only contain alphabetic characters."),
    ("alpha_s", "This field may only contain alphabetic characters and spaces."),
    ("alphaNumeric", "This field may only contain alphanumeric characters."),
    ("alphaNumeric_s", "This field may only contain alphanumeric characters and spaces."),
    ("barcode", "Please enter a valid barcode (UPC-E, UPC-A, EAN, EAN-14, SSCC)."),
    ("date", "Please enter a valid date in the format YYYY-DD-MM."),
    ("dateAll", "Please enter a valid date."),
    ("dateTime", "Please enter a valid date and time in the format YYYY-DD-MM HH:MM:SS."),
    ("required", "This field is required."),
    ("email", "Please provide a valid email address."),
    ("min", "The field should contain a minimum of {min} characters."),
    ("max", "The field should contain a maximum of {max} characters."),
    ("noSpecial", "This field should not contain any special characters like $, #, &, @, or >."),
    ("space", "This field must contain at least one space."),
    ("noSpace", "This field should not contain any spaces."),
    ("lowerCase", "This field should contain lowercase letters."),
    ("upperCase", "This field should contain uppercase letters."),
    ("numb", "This field needs to be a valid number without any space."),
    ("numb_space", "This field needs to be a valid number."),
    ("numb_space_double", "This field contains more spaces than it should."),
    ("minnumb", "The value should be at least {minnumb}."),
    ("maxnumb", "The value should not exceed {maxnumb}."),
    ("range", "The entered number must be between {num1} to {num2}."),
    ("makeInvalidEmpty", "Please make this field empty."),
    ("matchNone", "Please fill in one of these fields."),
    ("matchMultiple", "Only one of these fields may be filled in."),
    ("any_of", "At least one of the related fields needs a valid value."),
    ("any_of_rules", "This field does not match any of the accepted formats."),
    ("notRule", "This field matches a value it should not match."),
    ("tillDate", "The date of this field should be selected on or before {tillDate}."),
    ("shouldOld", "Age Requirement: You must be at least {shouldOld} years old to access this feature/content."),
    ("fileSize", "The maximum allowed file size is {fileSize} and your file size is {fileSize2}."),
    ("fileType", "The allowed file types are {fileType}."),
    ("image", "The uploaded file is not a valid image. Allowed image types are {image}."),
    ("fileExt", "The file is not of a valid type. Allowed file types are {fileExt}."),
    ("dimension_equal", "The uploaded image has a width of {givenWidth}px and height of {givenHeight}px, while the required dimensions are {expectedWidth}x{expectedHeight} pixels."),
    ("dimension_smallest", "The smallest accepted width and height are {expectedWidth}x{expectedHeight} pixels, but your image is smaller than that, {givenWidth}x{givenHeight}."),
    ("dimension_highest", "The largest accepted width and height are {expectedWidth}x{expectedHeight} pixels, but your image is larger than that, {givenWidth}x{givenHeight}."),
    ("dimension_width", "The expected width for this image is {width}px."),
    ("dimension_height", "The expected height for this image is {height}px."),
    ("dimension_square", "This image needs to be a square, meaning it should have the same height and width, like 500x500 pixels."),
    ("dimension_square_size", "This image needs to be square with a width and height of {expectedWidth}x{expectedHeight} pixels."),
    ("dimension_aspectRatio", "The image must have an aspect ratio of {aspectRatio}."),
    ("dimension", "The uploaded image does not have the required dimensions."),
    ("detectMultipleSpaces", "This field has multiple consecutive spaces."),
    ("accept", "Please check this checkbox."),
    ("password", "This field needs lowercase, uppercase, digit and special characters and a length of at least {password} characters."),
    ("hasLowerCase", "The field needs to have a lowercase character."),
    ("hasUpperCase", "The field needs to have an uppercase character."),
    ("hasSpecial", "The field needs to have a special character like $, #, @, & etc."),
    ("hasDigit", "The field needs to have a numeric digit [0-9]."),
    ("same", "This field must match with the {same}."),
    ("inList", "The field must be any of these: {inList}."),
    ("url", "Please enter a valid HTTP or HTTPS URL."),
    ("url_ftp", "Please enter a valid HTTP, HTTPS or FTP URL."),
    ("zipCode", "Please enter a valid ZIP/Postal code."),
    ("json", "The provided JSON structure is not valid."),
    ("ipv4", "Please enter a valid IPv4 address."),
    ("ipv6", "Please enter a valid IPv6 address."),
    ("isbn10", "Please enter a valid ISBN-10."),
    ("upca", "Please enter a valid UPC-A (Universal Product Code)."),
    ("ean", "Please enter a valid EAN-8 or EAN-13 (European Article Number)."),
    ("regex", "This field has an invalid format."),
    ("notRegex", "This field has an invalid format."),
];

/// Default message templates, extended by rules registered at runtime.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    messages: HashMap<Cow<'static, str>, Cow<'static, str>>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(key, message)| (Cow::Borrowed(*key), Cow::Borrowed(*message)))
                .collect(),
        }
    }
}

impl MessageCatalog {
    /// A catalog with no templates at all.
    pub fn empty() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(AsRef::as_ref)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages
            .insert(Cow::Owned(key.into()), Cow::Owned(message.into()));
    }
}
