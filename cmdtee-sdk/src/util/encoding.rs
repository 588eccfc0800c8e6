use encoding_rs::Encoding;

use crate::types::{Error, Result};

/// Look up an encoding by its WHATWG label (`shift_jis`, `euc-jp`, `utf-16le`, ...).
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(encoding_for_label("shift_jis").unwrap(), encoding_rs::SHIFT_JIS);
        assert_eq!(encoding_for_label("SJIS").unwrap(), encoding_rs::SHIFT_JIS);
        assert_eq!(encoding_for_label(" euc-jp ").unwrap(), encoding_rs::EUC_JP);
    }

    #[test]
    fn test_unknown_label() {
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(Error::UnknownEncoding(label)) if label == "klingon"
        ));
    }
}
