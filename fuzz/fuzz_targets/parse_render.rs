#![no_main]

use libfuzzer_sys::fuzz_target;
use markup_rewriter::parser::parse_bytes;

fuzz_target!(|data: &[u8]| {
    let Ok(tree) = parse_bytes(data, None) else {
        return;
    };
    let first = tree.render_sync().expect("parsed trees never suspend");

    // Rendering is a fixed point after one pass
    let again = markup_rewriter::parse(&first);
    let _ = again.render_sync().expect("parsed trees never suspend");
});
