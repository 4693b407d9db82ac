//! Depth-first tree walker
//!
//! [`walk_sync`] visits nodes in pre-order and holds a shared borrow of the
//! tree for the whole walk, so visitors record what they want to change and
//! apply it afterwards. [`walk`] is the asynchronous variant: each node's
//! visitor future completes before its children are visited, and the children
//! of a node are walked concurrently.

use futures::future::{FutureExt, LocalBoxFuture, join_all};

use crate::node::{NodeId, Tree};

/// A single visitor callback argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Node being visited
    pub node: NodeId,
    /// Its parent, `None` for the Document
    pub parent: Option<NodeId>,
    /// Its position among the parent's children, `None` for the Document
    pub index: Option<usize>,
}

impl Visit {
    fn start(tree: &Tree, node: NodeId) -> Self {
        Self {
            node,
            parent: tree.parent(node),
            index: tree.index_in_parent(node),
        }
    }
}

/// Visit `node` and its descendants in depth-first pre-order
///
/// # Examples
///
/// ```rust
/// use markup_rewriter::parser::parse;
/// use markup_rewriter::walk::walk_sync;
///
/// let tree = parse("<ul><li>a</li><li>b</li></ul>");
/// let mut count = 0;
/// walk_sync(&tree, tree.root(), |_, _| count += 1);
/// assert_eq!(count, 6);
/// ```
pub fn walk_sync<F>(tree: &Tree, node: NodeId, mut visitor: F)
where
    F: FnMut(&Tree, Visit),
{
    let mut stack = vec![Visit::start(tree, node)];
    while let Some(visit) = stack.pop() {
        visitor(tree, visit);
        let children = tree.children(visit.node);
        for (index, &child) in children.iter().enumerate().rev() {
            stack.push(Visit {
                node: child,
                parent: Some(visit.node),
                index: Some(index),
            });
        }
    }
}

fn walk_visit<'a, 'v, F, Fut>(tree: &'a Tree, visit: Visit, visitor: &'v F) -> LocalBoxFuture<'v, ()>
where
    'a: 'v,
    F: Fn(&'a Tree, Visit) -> Fut,
    Fut: Future<Output = ()> + 'v,
{
    async move {
        visitor(tree, visit).await;
        let children = tree.children(visit.node);
        let walks = children.iter().enumerate().map(|(index, &child)| {
            walk_visit(
                tree,
                Visit {
                    node: child,
                    parent: Some(visit.node),
                    index: Some(index),
                },
                visitor,
            )
        });
        join_all(walks).await;
    }
    .boxed_local()
}

/// Visit `node` and its descendants, awaiting each visitor future
///
/// A node's future completes before any of its children is visited. Sibling
/// subtrees run concurrently; no ordering holds between their suspension
/// points.
pub async fn walk<'a, F, Fut>(tree: &'a Tree, node: NodeId, visitor: F)
where
    F: Fn(&'a Tree, Visit) -> Fut,
    Fut: Future<Output = ()>,
{
    walk_visit(tree, Visit::start(tree, node), &visitor).await;
}
