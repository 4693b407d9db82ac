#![no_main]

use libfuzzer_sys::fuzz_target;
use markup_rewriter::transform::apply_sync;
use markup_rewriter::transformers::{SanitizeOptions, sanitize};

fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };
    let options = SanitizeOptions {
        block_elements: vec!["div".to_string(), "span".to_string()],
        ..SanitizeOptions::default()
    };
    let tree = apply_sync(html, &[sanitize(options)]).expect("sanitize is synchronous");

    for id in tree.descendants(tree.root()) {
        let name = tree.element(id).and_then(|e| e.tag_name());
        assert!(!matches!(name, Some("script" | "div" | "span")), "{:?} survived", name);
    }
    let _ = tree.render_sync().expect("no render functions installed");
});
