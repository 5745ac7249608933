//! Check-digit codes: ISBN-10, UPC-A, EAN and GS1 barcodes.

/// Digit values of an all-ASCII-digit string.
fn digits(text: &str) -> Option<Vec<u32>> {
    text.chars().map(|c| c.to_digit(10)).collect()
}

/// ISBN-10: nine digits and a check character that may be `X` (ten).
pub(crate) fn is_isbn10(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || !bytes[..9].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let check = match bytes[9] {
        b'X' => 10,
        byte if byte.is_ascii_digit() => u32::from(byte - b'0'),
        _ => return false,
    };
    let sum: u32 = bytes[..9]
        .iter()
        .zip((2..=10).rev())
        .map(|(byte, weight)| u32::from(byte - b'0') * weight)
        .sum();
    (11 - sum % 11) % 11 == check
}

/// UPC-A: twelve digits, odd positions weighted by three.
pub(crate) fn is_upca(text: &str) -> bool {
    let Some(digits) = digits(text).filter(|digits| digits.len() == 12) else {
        return false;
    };
    let odd: u32 = digits[..11].iter().step_by(2).sum();
    let even: u32 = digits[1..11].iter().step_by(2).sum();
    (odd * 3 + even + digits[11]) % 10 == 0
}

/// EAN-8 or EAN-13.
pub(crate) fn is_ean(text: &str) -> bool {
    let Some(digits) = digits(text).filter(|digits| matches!(digits.len(), 8 | 13)) else {
        return false;
    };
    let (body, check) = digits.split_at(digits.len() - 1);
    let weights: [u32; 2] = if body.len() == 7 { [3, 1] } else { [1, 3] };
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(index, digit)| digit * weights[index % 2])
        .sum();
    (10 - sum % 10) % 10 == check[0]
}

/// GS1 family: EAN-8, UPC-A, EAN-13, GTIN-14 and SSCC-18.
pub(crate) fn is_barcode(text: &str) -> bool {
    let Some(digits) = digits(text).filter(|digits| matches!(digits.len(), 8 | 12 | 13 | 14 | 18))
    else {
        return false;
    };
    let (body, check) = digits.split_at(digits.len() - 1);
    let total: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(index, digit)| if index % 2 == 0 { digit * 3 } else { *digit })
        .sum();
    (10 - total % 10) % 10 == check[0]
}

crate::text_rule! {
    pub Isbn10;
    arg: None;
    rule(text, arg) { is_isbn10(text) }
}

crate::text_rule! {
    pub Upca;
    arg: None;
    rule(text, arg) { is_upca(text) }
}

crate::text_rule! {
    pub Ean;
    arg: None;
    rule(text, arg) { is_ean(text) }
}

crate::text_rule! {
    pub Barcode;
    arg: None;
    rule(text, arg) { is_barcode(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0306406152", true)]
    #[case("080442957X", true)]
    #[case("0306406153", false)]
    #[case("030640615", false)]
    #[case("03064061X2", false)]
    fn test_isbn10(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_isbn10(text), valid);
    }

    #[rstest]
    #[case("036000291452", true)]
    #[case("036000291453", false)]
    #[case("03600029145", false)]
    fn test_upca(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_upca(text), valid);
    }

    #[rstest]
    #[case("4006381333931", true)]
    #[case("96385074", true)]
    #[case("4006381333932", false)]
    #[case("400638133393", false)]
    fn test_ean(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_ean(text), valid);
    }

    #[rstest]
    #[case("96385074", true)]
    #[case("036000291452", true)]
    #[case("4006381333931", true)]
    #[case("10012345678902", true)]
    #[case("10012345678903", false)]
    #[case("12345", false)]
    #[case("4006381333a31", false)]
    fn test_barcode(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_barcode(text), valid);
    }
}
