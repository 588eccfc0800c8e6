//! Incremental byte-to-line conversion with optional transcoding.

use encoding_rs::{CoderResult, Decoder, Encoding};

/// Splits a byte stream into lines, decoding it first when an encoding is set.
///
/// Lines end at `\n`; one trailing `\r` is dropped. Bytes are decoded before
/// splitting so that multi-byte encodings (UTF-16 and friends) split at real
/// newlines rather than at stray `0x0A` bytes.
///
/// Pending bytes before `scanned` are known to hold no newline, so each chunk
/// is searched once no matter how long the unterminated line grows.
pub(crate) struct LineDecoder {
    decoder: Option<Decoder>,
    raw: Vec<u8>,
    text: String,
    scanned: usize,
}

impl LineDecoder {
    pub(crate) fn new(encoding: Option<&'static Encoding>) -> Self {
        Self {
            decoder: encoding.map(Encoding::new_decoder_with_bom_removal),
            raw: Vec::new(),
            text: String::new(),
            scanned: 0,
        }
    }

    /// Feed a chunk read from the pipe and return every line it completed.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        match self.decoder {
            Some(_) => {
                self.decode(chunk, false);
                self.split_text()
            }
            None => {
                self.raw.extend_from_slice(chunk);
                self.split_raw()
            }
        }
    }

    /// Flush decoder state at end of stream and return the remaining lines,
    /// including a final unterminated one.
    pub(crate) fn finish(&mut self) -> Vec<String> {
        let mut lines = match self.decoder {
            Some(_) => {
                self.decode(&[], true);
                self.split_text()
            }
            None => Vec::new(),
        };

        let rest = match self.decoder {
            Some(_) => std::mem::take(&mut self.text),
            None => String::from_utf8_lossy(&std::mem::take(&mut self.raw)).into_owned(),
        };
        self.scanned = 0;
        if !rest.is_empty() {
            lines.push(trim_cr(rest));
        }
        lines
    }

    fn decode(&mut self, mut src: &[u8], last: bool) {
        let Some(decoder) = self.decoder.as_mut() else {
            return;
        };

        loop {
            let needed = decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 16);
            self.text.reserve(needed);

            let (result, read, _replaced) = decoder.decode_to_string(src, &mut self.text, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    fn split_text(&mut self) -> Vec<String> {
        let Some(offset) = self.text[self.scanned..].rfind('\n') else {
            self.scanned = self.text.len();
            return Vec::new();
        };

        let last_newline = self.scanned + offset;
        let rest = self.text.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.text, rest);
        self.scanned = self.text.len();
        complete
            .split_terminator('\n')
            .map(|line| trim_cr(line.to_string()))
            .collect()
    }

    fn split_raw(&mut self) -> Vec<String> {
        let Some(offset) = self.raw[self.scanned..].iter().rposition(|&b| b == b'\n') else {
            self.scanned = self.raw.len();
            return Vec::new();
        };

        let last_newline = self.scanned + offset;
        let rest = self.raw.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.raw, rest);
        self.scanned = self.raw.len();
        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| trim_cr(String::from_utf8_lossy(line).into_owned()))
            .collect()
    }
}

fn trim_cr(mut line: String) -> String {
    if line.ends_with('\r') {
        line.pop();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(decoder: &mut LineDecoder, chunks: &[&[u8]]) -> Vec<String> {
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(decoder.feed(chunk));
        }
        lines.extend(decoder.finish());
        lines
    }

    #[test]
    fn test_raw_lines_across_chunks() {
        let mut decoder = LineDecoder::new(None);
        let lines = collect(&mut decoder, &[&b"hel"[..], &b"lo\nwor"[..], &b"ld\r\n\nlast"[..]]);
        assert_eq!(lines, vec!["hello", "world", "", "last"]);
    }

    #[test]
    fn test_raw_no_trailing_empty_line() {
        let mut decoder = LineDecoder::new(None);
        assert_eq!(collect(&mut decoder, &[&b"one\ntwo\n"[..]]), vec!["one", "two"]);

        let mut decoder = LineDecoder::new(None);
        assert!(collect(&mut decoder, &[]).is_empty());
    }

    #[test]
    fn test_raw_utf8_split_inside_character() {
        let bytes = "日本\n".as_bytes();
        let mut decoder = LineDecoder::new(None);
        let lines = collect(&mut decoder, &[&bytes[..2], &bytes[2..]]);
        assert_eq!(lines, vec!["日本"]);
    }

    #[test]
    fn test_raw_invalid_utf8_is_replaced() {
        let mut decoder = LineDecoder::new(None);
        let lines = collect(&mut decoder, &[&b"ok\xff\n"[..]]);
        assert_eq!(lines, vec!["ok\u{FFFD}"]);
    }

    #[test]
    fn test_long_line_is_scanned_once() {
        let mut decoder = LineDecoder::new(None);
        let chunk = vec![b'x'; 8 * 1024];
        for _ in 0..64 {
            assert!(decoder.feed(&chunk).is_empty());
            assert_eq!(decoder.scanned, decoder.raw.len());
        }

        let lines = decoder.feed(b"y\nnext");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 64 * 8 * 1024 + 1);
        assert!(lines[0].ends_with('y'));
        assert_eq!(decoder.finish(), vec!["next"]);
    }

    #[test]
    fn test_long_decoded_line_is_scanned_once() {
        let mut decoder = LineDecoder::new(Some(encoding_rs::SHIFT_JIS));
        let text = "日".repeat(4 * 1024);
        let (chunk, _, _) = encoding_rs::SHIFT_JIS.encode(&text);
        for _ in 0..16 {
            assert!(decoder.feed(&chunk).is_empty());
            assert_eq!(decoder.scanned, decoder.text.len());
        }

        let lines = decoder.feed(b"\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].chars().count(), 16 * 4 * 1024);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_shift_jis_split_inside_character() {
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("日付\n終わり");
        let mut decoder = LineDecoder::new(Some(encoding_rs::SHIFT_JIS));
        let lines = collect(&mut decoder, &[&bytes[..1], &bytes[1..5], &bytes[5..]]);
        assert_eq!(lines, vec!["日付", "終わり"]);
    }

    #[test]
    fn test_utf16_splits_on_decoded_newlines() {
        let text = "a\nb\n";
        let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let mut decoder = LineDecoder::new(Some(encoding_rs::UTF_16LE));
        assert_eq!(collect(&mut decoder, &[bytes.as_slice()]), vec!["a", "b"]);
    }
}
