#![no_main]
use libfuzzer_sys::fuzz_target;
use texlens_match::{MatchConfig, recompute};
use texlens_syntax::{TextBuffer, TextSize, classify};

fuzz_target!(|data: &[u8]| {
    // The first two bytes pick the caret and the scan bound, the rest is the document.
    let (caret, bound, text) = match data {
        [caret, bound, rest @ ..] => (*caret, *bound, rest),
        _ => return,
    };
    let s = String::from_utf8_lossy(text);
    let _ = classify(&s);

    let Ok(buffer) = TextBuffer::new(&*s) else {
        return;
    };
    let snapshot = buffer.current();
    let config = MatchConfig {
        forward_max_lines: Some(u32::from(bound % 8)),
        backward_max_lines: Some(u32::from(bound / 32)),
        inner: bound % 2 == 0,
    };
    let caret = u32::from(caret) % u32::from(snapshot.len()).saturating_add(2);
    let _ = recompute(&snapshot, TextSize::from(caret), &config);
});
