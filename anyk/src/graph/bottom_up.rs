use log::info;

use crate::cost::{Cost, INF, ZERO};
use crate::error::{AnyKResult, GraphError};
use crate::graph::{DecisionSetId, DpGraph};

impl<P> DpGraph<P> {
    /// Computes the optimal cost of every reachable node and the best decision of every reachable
    /// decision set. Returns the optimal cost of the instance, `INF` if it has no solution.
    ///
    /// Any previous result is discarded first, so the pass can be rerun after costs change.
    pub fn bottom_up(&mut self) -> Cost {
        for node in self.nodes.iter_mut() {
            node.opt_cost = INF;
        }
        for set in self.sets.iter_mut() {
            set.best = None;
            set.solved = false;
        }

        for node in self.postorder() {
            let cost = if self.nodes[node.0].terminal {
                ZERO
            } else {
                let mut total = ZERO;
                for branch in 0..self.nodes[node.0].branches.len() {
                    let set = self.nodes[node.0].branches[branch];
                    total += self.solve_set(set);
                }
                total
            };
            self.nodes[node.0].opt_cost = cost;
        }
        self.solved = true;

        let opt = self.opt_cost();
        info!(
            "Bottom-up pass done, {} nodes, {} decisions, optimal cost {}",
            self.node_count(),
            self.decision_count(),
            opt
        );
        opt
    }

    fn solve_set(&mut self, set: DecisionSetId) -> Cost {
        if !self.sets[set.0].solved {
            let best = self.sets[set.0]
                .decisions
                .iter()
                .copied()
                .min_by(|a, b| self.cmp_decisions(*a, *b));
            self.sets[set.0].best = best;
            self.sets[set.0].solved = true;
        }
        self.sets[set.0]
            .best
            .map_or(INF, |d| self.achievable_cost(d))
    }

    /// Number of distinct solutions reachable from the start node.
    pub fn count_solutions(&self) -> AnyKResult<u128> {
        let mut counts = vec![0u128; self.node_count()];
        for node in self.postorder() {
            let n = &self[node];
            if n.terminal {
                counts[node.0] = 1;
                continue;
            }
            let mut product: u128 = 1;
            for set in n.branches.iter() {
                let mut sum: u128 = 0;
                for d in self[*set].decisions.iter() {
                    sum = sum
                        .checked_add(counts[self[*d].target.0])
                        .ok_or(GraphError::CountOverflow)?;
                }
                product = product
                    .checked_mul(sum)
                    .ok_or(GraphError::CountOverflow)?;
            }
            counts[node.0] = product;
        }
        Ok(counts[self.start.0])
    }

    /// Reachable nodes plus the decisions leaving them.
    pub fn graph_size(&self) -> usize {
        self.postorder()
            .into_iter()
            .map(|node| {
                1 + self[node]
                    .branches
                    .iter()
                    .map(|set| self[*set].len())
                    .sum::<usize>()
            })
            .sum()
    }
}
