//! Component swapping with tag and render replacements

use futures::executor::block_on;
use markup_rewriter::html::Template;
use markup_rewriter::render::{Children, Markup, RenderFn, RenderOutput};
use markup_rewriter::transform::{transform, transform_sync};
use markup_rewriter::transformers::{Replacement, SwapComponents, swap};
use markup_rewriter::{Attributes, RewriteError};

/// `<span>{children}</span>`
fn span() -> Replacement {
    Replacement::render(|_, children| {
        let html = Template::new().text("<span>").value(children).text("</span>").render()?;
        Ok(RenderOutput::from(html))
    })
}

/// `<h1 class="ultra" ...{props}>{children}</h1>`
fn ultra_title<'a>(props: &'a Attributes, children: Children<'a>) -> Result<RenderOutput<'a>, RewriteError> {
    let html = Template::new()
        .text("<h1 class=\"ultra\" ...")
        .value(props)
        .text(">")
        .value(children)
        .text("</h1>")
        .render()?;
    Ok(html.into())
}

fn run(input: &str, components: SwapComponents) -> String {
    block_on(transform(input, &[swap(components)])).expect("transform succeeds")
}

#[test]
fn test_function_for_element() {
    let out = run("<h1>Hello world!</h1>", SwapComponents::new().with("h1", span()));
    assert_eq!(out, "<span>Hello world!</span>");
}

#[test]
fn test_function_for_component() {
    let components = SwapComponents::new().with(
        "Title",
        Replacement::render(|_, children| {
            let html = Template::new().text("<h1>").value(children).text("</h1>").render()?;
            Ok(html.into())
        }),
    );
    assert_eq!(run("<Title>Hello world!</Title>", components), "<h1>Hello world!</h1>");
}

#[test]
fn test_string_for_element_then_component() {
    let components = SwapComponents::new().with("h1", "Title").with("Title", span());
    assert_eq!(run("<h1>Hello world!</h1>", components), "<span>Hello world!</span>");
}

#[test]
fn test_tag_swap_keeps_attributes() {
    let components = SwapComponents::new().with("h1", "h2");
    assert_eq!(
        run("<h1 class=\"test\">Hello world!</h1>", components),
        "<h2 class=\"test\">Hello world!</h2>"
    );
}

#[test]
fn test_async_component() {
    let components = SwapComponents::new().with(
        "Title",
        Replacement::render(|_, children| {
            Ok(RenderOutput::pending(async move {
                let inner = children.render().await?;
                let html = Template::new().text("<span>").text(inner).text("</span>").render()?;
                Ok::<_, RewriteError>(Markup::from(html))
            }))
        }),
    );
    let input = "<Title>Hello world!</Title>";

    assert_eq!(run(input, components.clone()), "<span>Hello world!</span>");

    let err = transform_sync(input, &[swap(components)]).unwrap_err();
    assert!(matches!(err, RewriteError::BlockingSuspension(_)));
}

#[test]
fn test_readme_example() {
    let components = SwapComponents::new().with("h1", RenderFn::new(ultra_title));
    assert_eq!(run("<h1>Hello world!</h1>", components), "<h1 class=\"ultra\">Hello world!</h1>");
}

#[test]
fn test_readme_example_spreads_props() {
    let components = SwapComponents::new().with("h1", RenderFn::new(ultra_title));
    assert_eq!(
        run("<h1 id=\"top\">Hello world!</h1>", components),
        "<h1 class=\"ultra\" id=\"top\">Hello world!</h1>"
    );
}

#[test]
fn test_custom_element() {
    let components = SwapComponents::new().with(
        "custom-element",
        Replacement::render(|props, children| {
            let html = Template::new()
                .text("<custom-element class=\"ultra\" ...")
                .value(props)
                .text(">")
                .value(children)
                .text("</custom-element>")
                .render()?;
            Ok(html.into())
        }),
    );
    assert_eq!(
        run("<custom-element>Hello world!</custom-element>", components),
        "<custom-element class=\"ultra\">Hello world!</custom-element>"
    );
}

#[test]
fn test_plain_text_output_is_escaped() {
    let components = SwapComponents::new().with(
        "code",
        Replacement::render(|_, children| Ok(RenderOutput::from(format!("<{}>", children.len())))),
    );
    assert_eq!(run("<code>a</code>", components), "&lt;1&gt;");
}

#[test]
fn test_sync_and_async_agree_for_sync_components() {
    let components = SwapComponents::new().with("h1", "Title").with("Title", span());
    let input = "<section><h1>A</h1><p>b</p><h1>C</h1></section>";
    let sync = transform_sync(input, &[swap(components.clone())]).unwrap();
    assert_eq!(sync, run(input, components));
    assert_eq!(sync, "<section><span>A</span><p>b</p><span>C</span></section>");
}

#[test]
fn test_structural_selector_keys() {
    let components = SwapComponents::new()
        .with("li:nth-child(2)", "p")
        .with("ul:has(> p) > li:first-child", "b");
    assert_eq!(
        run("<ul><li>a</li><li>b</li><li>c</li></ul>", components),
        "<ul><b>a</b><p>b</p><li>c</li></ul>"
    );
}
