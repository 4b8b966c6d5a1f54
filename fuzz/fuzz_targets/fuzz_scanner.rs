#![no_main]

use jscarve_core::scanner::{Scanner, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the scanner on arbitrary UTF-8: it must never panic, the
    // cursor must advance monotonically for every non-Eof token, and Eof
    // must be idempotent once reached.

    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };

    let mut scanner = Scanner::new(src);
    let mut last_end = 0usize;
    loop {
        match scanner.next_token() {
            Err(_) => break,
            Ok(tok) => {
                if tok.kind == TokenKind::Eof {
                    // Eof must keep being returned at the same position.
                    for _ in 0..3 {
                        let again = scanner.next_token().expect("Eof must stay Ok");
                        assert_eq!(again.kind, TokenKind::Eof);
                        assert_eq!(again.span.start.offset, tok.span.start.offset);
                    }
                    break;
                }
                assert!(
                    tok.span.end.offset > tok.span.start.offset,
                    "non-Eof token must cover at least one byte"
                );
                assert!(
                    tok.span.start.offset >= last_end,
                    "tokens must not overlap or move backwards"
                );
                assert!(src.is_char_boundary(tok.span.start.offset));
                assert!(src.is_char_boundary(tok.span.end.offset));
                last_end = tok.span.end.offset;
            }
        }
    }
});
