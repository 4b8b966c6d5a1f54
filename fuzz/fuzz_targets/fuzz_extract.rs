#![no_main]

use jscarve_core::extract::match_to_closing_brace;
use jscarve_core::scanner::Scanner;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First line is the anchor, the rest is the source.  Extraction must
    // never panic, and any successful extraction must itself re-lex as a
    // balanced expression.

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Some((anchor, source)) = input.split_once('\n') else {
        return;
    };
    if anchor.is_empty() {
        return;
    }

    if let Ok(carved) = match_to_closing_brace(source, anchor) {
        assert!(!carved.is_empty());
        assert!(
            Scanner::new(carved).is_balanced(),
            "extracted slice must be balanced: {carved:?}"
        );
    }
});
