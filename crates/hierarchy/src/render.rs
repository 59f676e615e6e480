use crate::types::{Category, Hierarchy, Node, ROOT_TYPE};
use petgraph::graph::NodeIndex;

fn marker(node: &Node) -> &'static str {
    if node.node_type == ROOT_TYPE {
        return "🌐";
    }
    match node.category() {
        Some(Category::Location) => "📍",
        Some(Category::Application) => "💧",
        Some(Category::Module) => "⚙️",
        Some(Category::Instrumentation) => "📟",
        Some(Category::Asset) => "📦",
        None => "❓",
    }
}

impl Hierarchy {
    /// Preorder walk in the same order categorization uses. Nodes reachable
    /// through several attachment edges appear once per path, matching the
    /// counts in the summaries; a node that is its own ancestor is skipped
    /// the same way categorization skips it.
    fn walk(&self, mut visit: impl FnMut(NodeIndex, usize)) {
        let mut stack = vec![(self.root, 0usize)];
        let mut path: Vec<NodeIndex> = Vec::new();
        while let Some((idx, depth)) = stack.pop() {
            path.truncate(depth);
            if path.contains(&idx) {
                continue;
            }
            visit(idx, depth);
            path.push(idx);
            let mut children = self.child_indices(idx);
            children.reverse();
            for child in children {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Plain-text tree dump, two-space indent per level.
    pub fn pprint(&self, show_summary: bool) -> String {
        let mut out = String::from("NW Hierarchy Pretty Print\n=========================\n");
        self.walk(|idx, depth| {
            let node = &self.graph[idx];
            out.push_str(&"  ".repeat(depth));
            out.push_str(marker(node));
            out.push(' ');
            out.push_str(&node.to_string());
            out.push('\n');
        });
        if show_summary {
            out.push('\n');
            out.push_str(&self.print_summary());
        }
        out
    }

    /// Markdown tree dump as nested bullets.
    pub fn pprint_md(&self, show_summary: bool) -> String {
        let mut out = String::from("# 🏗️ NW Hierarchy Structure\n\n");
        self.walk(|idx, depth| {
            let node = &self.graph[idx];
            out.push_str(&"  ".repeat(depth));
            out.push_str("- ");
            out.push_str(marker(node));
            out.push_str(&format!(
                " **{}** (`{}`, id {})\n",
                node.name, node.node_type, node.id
            ));
        });
        if show_summary {
            out.push('\n');
            out.push_str(&self.print_md_summary());
        }
        out
    }

    /// Fixed-width count block.
    pub fn print_summary(&self) -> String {
        let counts = self.node_counts();
        let mut out = String::new();
        out.push_str("==============================\n");
        out.push_str("    NW HIERARCHY SUMMARY\n");
        out.push_str("==============================\n");
        out.push_str(&format!("Locations:        {}\n", counts.locations));
        out.push_str(&format!("Applications:     {}\n", counts.applications));
        out.push_str(&format!("Modules:          {}\n", counts.modules));
        out.push_str(&format!("Instrumentations: {}\n", counts.instrumentations));
        out.push_str(&format!("Assets:           {}\n", counts.assets));
        out.push_str("------------------------------\n");
        out.push_str(&format!("Total nodes:      {}\n", counts.total));
        out
    }

    /// Markdown count table.
    pub fn print_md_summary(&self) -> String {
        let counts = self.node_counts();
        let mut out = String::from("# 📊 NW Hierarchy Summary\n\n");
        out.push_str("| Component Type | Count |\n");
        out.push_str("|----------------|-------|\n");
        out.push_str(&format!("| Locations | {} |\n", counts.locations));
        out.push_str(&format!("| Applications | {} |\n", counts.applications));
        out.push_str(&format!("| Modules | {} |\n", counts.modules));
        out.push_str(&format!("| Instrumentations | {} |\n", counts.instrumentations));
        out.push_str(&format!("| Assets | {} |\n", counts.assets));
        out.push_str(&format!("| **Total** | **{}** |\n", counts.total));
        out
    }
}
