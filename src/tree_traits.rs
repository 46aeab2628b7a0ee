//! Text rendering of fortnum subtrees.

use termtree::Tree;
use tracing::instrument;

use crate::domain::Fortnum;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Fortnum<'_> {
    #[instrument(level = "debug", skip(self), fields(name = %self.name()))]
    fn to_tree_string(&self) -> Tree<String> {
        // Borrowed members are marked so shared nodes stay recognisable
        let leaves: Vec<_> = self
            .members()
            .map(|member| {
                if member.parent().map_or(false, |p| p == *self) {
                    member.to_tree_string()
                } else {
                    Tree::new(format!("{} (borrowed)", member.name()))
                }
            })
            .collect();

        Tree::new(self.name().to_string()).with_leaves(leaves)
    }
}
