#![no_main]

use libfuzzer_sys::fuzz_target;
use markup_rewriter::selector::Selector;

const DOCUMENT: &str = "<main id=\"a\"><p class=\"x y\">t</p><ul><li>1</li><li lang=\"en\">2</li></ul></main>";

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(selector) = Selector::parse(source) else {
        return;
    };
    let tree = markup_rewriter::parse(DOCUMENT);
    for node in selector.select_all(&tree, tree.root()) {
        assert!(selector.matches(&tree, node));
    }
});
