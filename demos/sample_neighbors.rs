//! Uniform vs weighted neighbor sampling over a small CSC graph.
//!
//! The graph is the 10-node example from the crate docs; each query node
//! gets up to 2 sampled neighbors, with edge ids co-emitted so the sampled
//! edges can be traced back to the original edge list.

use kinjo::{CscGraph, NeighborSampler, SampleSize};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Edges (src, dst): (3,0), (7,0), (0,1), (9,1), (1,2), (4,3), (2,4),
    // (9,5), (3,5), (9,6), (1,6), (9,8), (7,8), stored CSC by destination.
    let row: Vec<i64> = vec![3, 7, 0, 9, 1, 4, 2, 9, 3, 9, 1, 9, 7];
    let colptr: Vec<i64> = vec![0, 2, 4, 5, 6, 7, 9, 11, 11, 13, 13];
    let eids: Vec<i64> = (0..row.len() as i64).collect();
    let weights: Vec<f32> = vec![
        0.1, 0.5, 0.2, 0.5, 0.9, 1.9, 2.0, 2.1, 0.01, 0.9, 0.12, 0.59, 0.67,
    ];

    let graph = CscGraph::new(&row, &colptr)?
        .with_edge_ids(&eids)?
        .with_edge_weights(&weights)?;

    let nodes: Vec<i64> = vec![0, 7, 1, 2, 8];
    let sampler = NeighborSampler::new(SampleSize::from(2))
        .with_seed(7)
        .return_edge_ids(true);

    let uniform = sampler.sample(&graph, &nodes)?;
    println!("uniform  counts:    {:?}", uniform.counts);
    println!("uniform  neighbors: {:?}", uniform.neighbors);
    println!("uniform  edge ids:  {:?}", uniform.edge_ids);

    let weighted = sampler.weighted_sample(&graph, &nodes)?;
    println!("weighted counts:    {:?}", weighted.counts);
    println!("weighted neighbors: {:?}", weighted.neighbors);
    println!("weighted edge ids:  {:?}", weighted.edge_ids);

    // Same seed, any worker count: the parallel driver agrees exactly.
    let parallel = sampler.par_sample(&graph, &nodes)?;
    assert_eq!(parallel, uniform);
    println!("par_sample matches sample under seed 7");

    Ok(())
}
