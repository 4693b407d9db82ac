//! Basic transform example: parse, sanitize, swap and render

use markup_rewriter::html::Template;
use markup_rewriter::parser::parse;
use markup_rewriter::render::RenderOutput;
use markup_rewriter::selector::query_selector_all;
use markup_rewriter::transform::transform_sync;
use markup_rewriter::transformers::{Replacement, SanitizeOptions, SwapComponents, sanitize, swap};

fn main() {
    println!("=== Markup Rewriter - Basic Examples ===\n");

    // Example 1: Round trip
    example_1();

    // Example 2: Selector queries
    example_2();

    // Example 3: Sanitizing untrusted markup
    example_3();

    // Example 4: Swapping elements for components
    example_4();
}

fn example_1() {
    println!("Example 1: Round trip");
    let html = "<!DOCTYPE html><html lang=\"en\"><body><h1>Welcome</h1><br><svg><path d=\"M0 0\" /></svg></body></html>";
    println!("Input:  {}", html);

    let tree = parse(html);
    let output = tree.render_sync().expect("Render failed");

    println!("Output: {}", output);
    println!("---\n");
}

fn example_2() {
    println!("Example 2: Selector queries");
    let html = "<ul><li class=\"done\">write</li><li>test</li><li class=\"done\">ship</li></ul>";
    println!("Input:  {}", html);

    let tree = parse(html);
    let done = query_selector_all(&tree, tree.root(), "li.done").expect("Invalid selector");
    for node in done {
        let text = tree.children(node).first().and_then(|&t| tree.literal_value(t));
        println!("  matched <li>: {:?}", text);
    }
    println!("---\n");
}

fn example_3() {
    println!("Example 3: Sanitizing untrusted markup");
    let html = "<div><p onclick=\"steal()\">Hello</p><script>alert('xss')</script><my-widget>w</my-widget></div>";
    println!("Input:  {}", html);

    let mut options = SanitizeOptions {
        block_elements: vec!["div".to_string()],
        ..SanitizeOptions::default()
    };
    options
        .drop_attributes
        .insert("onclick".to_string(), vec!["*".to_string()]);

    let output = transform_sync(html, &[sanitize(options)]).expect("Transform failed");
    println!("Output: {}", output);
    println!("---\n");
}

fn example_4() {
    println!("Example 4: Swapping elements for components");
    let html = "<h1 id=\"top\">Hello world!</h1><p>Body</p>";
    println!("Input:  {}", html);

    let components = SwapComponents::new()
        .with("h1", "Title")
        .with(
            "Title",
            Replacement::render(|props, children| {
                let html = Template::new()
                    .text("<h1 class=\"ultra\" ...")
                    .value(props)
                    .text(">")
                    .value(children)
                    .text("</h1>")
                    .render()?;
                Ok(RenderOutput::from(html))
            }),
        )
        .with("p", "section");

    let output = transform_sync(html, &[swap(components)]).expect("Transform failed");
    println!("Output: {}", output);
    println!("---\n");
}
