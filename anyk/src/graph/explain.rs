use std::borrow::Cow;
use std::fmt::Display;
use std::io::{BufWriter, Write};

use prettytable::Table;
use ptree::print_config::UTF_CHARS;
use ptree::{write_tree_with, PrintConfig, Style, TreeItem};

use crate::graph::{DpGraph, NodeId, StageTree};

impl<P: Display> DpGraph<P> {
    fn label(&self, node: NodeId) -> String {
        match self.payload(node) {
            Some(p) => p.to_string(),
            None if node == self.start() => "start".to_string(),
            None => node.to_string(),
        }
    }

    /// One row per reachable decision, starting from the nodes closest to the start.
    pub fn explain_edges(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["from", "branch", "to", "cost", "achievable", "best"]);

        for node in self.postorder().into_iter().rev() {
            for (branch, set) in self[node].branches().iter().enumerate() {
                let best = self[*set].best_decision();
                for d in self[*set].decisions() {
                    let from = self.label(node);
                    let to = self.label(self[*d].target());
                    let cost = self[*d].cost();
                    let achievable = self.achievable_cost(*d);
                    let mark = if best == Some(*d) { "*" } else { "" };
                    table.add_row(row![from, branch, to, cost, achievable, mark]);
                }
            }
        }
        table
    }
}

#[derive(Clone)]
struct StageItem<'a> {
    tree: &'a StageTree,
    stage: usize,
}

impl<'a> TreeItem for StageItem<'a> {
    type Child = Self;

    fn write_self<W: Write>(&self, f: &mut W, style: &Style) -> std::io::Result<()> {
        let label = if self.stage == 0 {
            "start".to_string()
        } else {
            format!(
                "stage {} (branch {})",
                self.stage,
                self.tree.branch_index(self.stage)
            )
        };
        write!(f, "{}", style.paint(label))
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::from(
            self.tree
                .children(self.stage)
                .iter()
                .map(|stage| StageItem {
                    tree: self.tree,
                    stage: *stage,
                })
                .collect::<Vec<_>>(),
        )
    }
}

pub fn explain_stages<W: Write>(tree: &StageTree, output: &mut W) -> std::io::Result<()> {
    let config = PrintConfig {
        indent: 3,
        characters: UTF_CHARS.into(),
        ..Default::default()
    };
    write_tree_with(&StageItem { tree, stage: 0 }, output, &config)
}

pub fn explain_stages_to_string(tree: &StageTree) -> std::io::Result<String> {
    let mut buf = BufWriter::new(Vec::new());
    explain_stages(tree, &mut buf)?;
    let bytes = buf.into_inner()?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
