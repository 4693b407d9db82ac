//! Asynchronous components and transformers
//!
//! Render functions may return a pending result; the async renderer awaits
//! them while the strict renderer refuses. Driven here with the `futures`
//! single-threaded executor.

use futures::executor::block_on;
use markup_rewriter::RewriteError;
use markup_rewriter::node::Tree;
use markup_rewriter::render::{Markup, RenderOutput, SafeHtml};
use markup_rewriter::transform::{Transformer, transform, transform_sync};
use markup_rewriter::transformers::{Replacement, SwapComponents, swap};
use markup_rewriter::walk::walk;

/// Stand-in for an I/O bound lookup
async fn fetch_user(id: &str) -> Result<String, RewriteError> {
    futures::future::ready(()).await;
    match id {
        "1" => Ok("Ada".to_string()),
        "2" => Ok("Grace".to_string()),
        other => Err(RewriteError::custom(format!("unknown user {}", other))),
    }
}

fn user_badge() -> Replacement {
    Replacement::render(|props, children| {
        Ok(RenderOutput::pending(async move {
            let id = props.get("data-id").map(String::as_str).unwrap_or("");
            let name = fetch_user(id).await?;
            let inner = children.render().await?;
            Ok::<_, RewriteError>(Markup::from(SafeHtml::new(format!(
                "<span class=\"badge\">{}: {}</span>",
                name, inner
            ))))
        }))
    })
}

fn count_elements() -> Transformer {
    Transformer::from_async(|tree: Tree| async move {
        let count = std::cell::Cell::new(0usize);
        let count_ref = &count;
        walk(&tree, tree.root(), move |tree, visit| async move {
            if tree.element(visit.node).is_some() {
                count_ref.set(count_ref.get() + 1);
            }
        })
        .await;
        println!("  elements before rendering: {}", count.get());
        Ok::<_, RewriteError>(tree)
    })
}

fn main() {
    println!("=== Markup Rewriter - Async Components ===\n");

    let html = "<p><user data-id=\"1\">author</user> and <user data-id=\"2\">reviewer</user></p>";
    println!("Input:  {}", html);

    let components = SwapComponents::new().with("user", user_badge());
    let pipeline = [swap(components.clone()), count_elements()];

    match block_on(transform(html, &pipeline)) {
        Ok(output) => println!("Output: {}", output),
        Err(e) => println!("Error: {}", e),
    }

    match transform_sync(html, &[swap(components)]) {
        Ok(output) => println!("Strict output: {}", output),
        Err(e) => println!("Strict render refused (code {}): {}", e.code(), e),
    }
}
