use std::fmt::Write;

use crate::ast::{GraphNode, Node};

/// Renders an AST in the Graphviz DOT language.
///
/// Every vertex is named after the path from the root: the root is `head`
/// and the `i`-th child of a vertex `v` is `vni`. Labels and shapes come
/// from [`GraphNode::label`] and [`GraphNode::shape`].
///
/// # Example
/// ```
/// use tealang::{
///     graph::to_graphviz,
///     interpreter::{lexer::lex, parser::core::parse},
/// };
///
/// let ast = parse(&lex("1 + 2;")).unwrap();
/// let dot = to_graphviz(&ast);
///
/// assert!(dot.starts_with("digraph G {"));
/// assert!(dot.contains("head -> headn0"));
/// assert!(dot.contains("headn0 [label=\"Operation + (2)\" shape=oval]"));
/// ```
#[must_use]
pub fn to_graphviz(root: &Node) -> String {
    let mut dot = String::from("digraph G {\n");
    write_vertex(&mut dot, GraphNode::Node(root), "head");
    dot.push_str("}\n");
    dot
}

fn write_vertex(dot: &mut String, vertex: GraphNode, uid: &str) {
    let label = vertex.label().replace('\\', "\\\\").replace('"', "\\\"");
    writeln!(dot, "    {uid} [label=\"{label}\" shape={}]", vertex.shape()).ok();

    for (index, child) in vertex.children().into_iter().enumerate() {
        let child_uid = format!("{uid}n{index}");
        writeln!(dot, "    {uid} -> {child_uid}").ok();
        write_vertex(dot, child, &child_uid);
    }
}
