// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Louvain community detection with a resolution parameter.
//
// Each level moves nodes one at a time, in node order, to the neighboring community giving the
// largest gain
//     w(i,C) - γ Σtot(C) k_i / 2m,
// where w(i,C) is the weight from i to C, Σtot(C) the total degree of C with i removed, k_i the
// degree of i and m the total edge weight.  Candidate communities are scanned in increasing
// order, and a node only moves if the gain strictly exceeds that of staying.  Passes repeat
// until nothing moves.  Then communities are collapsed into nodes (self loops carry the internal
// weight) and the next level runs on the reduced graph.  We stop at the first level in which
// no node moves.

use std::collections::BTreeMap;

const EPS: f64 = 1.0e-12;

#[derive(Clone, Debug, Default)]
pub struct WeightedGraph {
    adj: Vec<Vec<(usize, f64)>>, // neighbors other than the node itself
    loops: Vec<f64>,
    degree: Vec<f64>, // self loops counted twice
    m: f64,
}

impl WeightedGraph {
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> WeightedGraph {
        let mut g = WeightedGraph {
            adj: vec![Vec::new(); n],
            loops: vec![0.0; n],
            degree: vec![0.0; n],
            m: 0.0,
        };
        for &(a, b, w) in edges.iter() {
            if a == b {
                g.loops[a] += w;
                g.degree[a] += 2.0 * w;
            } else {
                g.adj[a].push((b, w));
                g.adj[b].push((a, w));
                g.degree[a] += w;
                g.degree[b] += w;
            }
            g.m += w;
        }
        g
    }

    pub fn n(&self) -> usize {
        self.adj.len()
    }

    pub fn total_weight(&self) -> f64 {
        self.m
    }

    // Collapse communities (numbered 0..nc) into nodes.

    fn aggregate(&self, com: &[usize], nc: usize) -> WeightedGraph {
        let mut w = BTreeMap::<(usize, usize), f64>::new();
        for a in 0..self.n() {
            if self.loops[a] > 0.0 {
                *w.entry((com[a], com[a])).or_insert(0.0) += self.loops[a];
            }
            for &(b, x) in self.adj[a].iter() {
                if a < b {
                    let (c, d) = (com[a].min(com[b]), com[a].max(com[b]));
                    *w.entry((c, d)).or_insert(0.0) += x;
                }
            }
        }
        let edges = w.iter().map(|(&(c, d), &x)| (c, d, x)).collect::<Vec<_>>();
        WeightedGraph::from_edges(nc, &edges)
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// One level of local moves.  Returns the community of each node and whether anything moved.

fn local_move(g: &WeightedGraph, gamma: f64) -> (Vec<usize>, bool) {
    let n = g.n();
    let mut com = (0..n).collect::<Vec<usize>>();
    let mut tot = g.degree.clone();
    let two_m = 2.0 * g.m;
    let mut moved = false;
    let mut neigh = Vec::<(usize, f64)>::new();
    loop {
        let mut moved_in_pass = false;
        for i in 0..n {
            let ci = com[i];
            let ki = g.degree[i];

            // Weight from i to each neighboring community, communities in increasing order.

            neigh.clear();
            for &(j, w) in g.adj[i].iter() {
                neigh.push((com[j], w));
            }
            neigh.sort_by_key(|x| x.0);
            let mut merged = Vec::<(usize, f64)>::new();
            for &(c, w) in neigh.iter() {
                match merged.last_mut() {
                    Some(last) if last.0 == c => last.1 += w,
                    _ => merged.push((c, w)),
                }
            }

            tot[ci] -= ki;
            let w_ci = merged.iter().find(|x| x.0 == ci).map(|x| x.1).unwrap_or(0.0);
            let mut best = ci;
            let mut best_gain = w_ci - gamma * tot[ci] * ki / two_m;
            for &(c, w) in merged.iter() {
                if c == ci {
                    continue;
                }
                let gain = w - gamma * tot[c] * ki / two_m;
                if gain > best_gain + EPS {
                    best = c;
                    best_gain = gain;
                }
            }
            tot[best] += ki;
            com[i] = best;
            if best != ci {
                moved_in_pass = true;
                moved = true;
            }
        }
        if !moved_in_pass {
            break;
        }
    }
    (com, moved)
}

// Renumber communities 0, 1, ... in order of first appearance.

pub fn renumber(com: &[usize]) -> (Vec<usize>, usize) {
    let mut to = vec![usize::MAX; com.iter().map(|c| c + 1).max().unwrap_or(0)];
    let mut nc = 0;
    let mut out = Vec::<usize>::with_capacity(com.len());
    for &c in com.iter() {
        if to[c] == usize::MAX {
            to[c] = nc;
            nc += 1;
        }
        out.push(to[c]);
    }
    (out, nc)
}

// Modularity of a partition at resolution γ: Σ_C [ in(C)/m - γ (tot(C)/2m)² ].

pub fn modularity(g: &WeightedGraph, com: &[usize], gamma: f64) -> f64 {
    if g.m == 0.0 {
        return 0.0;
    }
    let nc = com.iter().map(|c| c + 1).max().unwrap_or(0);
    let mut inside = vec![0.0; nc];
    let mut tot = vec![0.0; nc];
    for a in 0..g.n() {
        inside[com[a]] += g.loops[a];
        tot[com[a]] += g.degree[a];
        for &(b, w) in g.adj[a].iter() {
            if a < b && com[a] == com[b] {
                inside[com[a]] += w;
            }
        }
    }
    let mut q = 0.0;
    for c in 0..nc {
        let t = tot[c] / (2.0 * g.m);
        q += inside[c] / g.m - gamma * t * t;
    }
    q
}

#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub community: Vec<usize>, // per node, numbered by first appearance
    pub levels: usize,
    pub modularity: f64,
}

pub fn louvain(g: &WeightedGraph, gamma: f64) -> Partition {
    let mut membership = (0..g.n()).collect::<Vec<usize>>();
    let mut cur = g.clone();
    let mut levels = 0;
    while cur.m > 0.0 {
        let (com, moved) = local_move(&cur, gamma);
        if !moved {
            break;
        }
        let (com, nc) = renumber(&com);
        for x in membership.iter_mut() {
            *x = com[*x];
        }
        cur = cur.aggregate(&com, nc);
        levels += 1;
    }
    let (community, _) = renumber(&membership);
    let q = modularity(g, &community, gamma);
    Partition {
        community,
        levels,
        modularity: q,
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
