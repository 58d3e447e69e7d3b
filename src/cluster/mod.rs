//! Agglomerative hierarchical clustering (Ward linkage) over one-hot
//! feature matrices, with a text dendrogram renderer.
//!
//! Merges follow the scipy linkage convention: observations are numbered
//! `0..n`, each merge creates a new cluster numbered `n`, `n+1`, ...

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::encode::OneHotMatrix;

/// One agglomeration step.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// Index of the first merged cluster (lower index first).
    pub left: usize,
    /// Index of the second merged cluster.
    pub right: usize,
    /// Ward distance at which the clusters merged.
    pub distance: f64,
    /// Number of observations in the new cluster.
    pub size: usize,
}

/// Compute the Ward linkage of the matrix rows.
///
/// Returns `n - 1` merges for `n` observations. Fewer than two rows is an
/// error: there is nothing to cluster.
pub fn ward_linkage(matrix: &OneHotMatrix) -> Result<Vec<Merge>> {
    let n = matrix.rows.len();
    if n < 2 {
        bail!("Clustering needs at least two rows, got {}", n);
    }

    // Active clusters: id -> size. Squared Euclidean distances between
    // active clusters, keyed by ordered id pair.
    let mut sizes: HashMap<usize, usize> = (0..n).map(|i| (i, 1)).collect();
    let mut dist2: HashMap<(usize, usize), f64> = HashMap::new();
    for i in 0..n {
        for j in (i + 1)..n {
            dist2.insert((i, j), sq_euclidean(&matrix.rows[i], &matrix.rows[j]));
        }
    }

    let mut merges = Vec::with_capacity(n - 1);
    let mut next_id = n;

    while sizes.len() > 1 {
        // Closest active pair; ties broken by the ordered pair itself so the
        // output is deterministic.
        let (&(a, b), &d2) = dist2
            .iter()
            .min_by(|(ka, va), (kb, vb)| {
                va.partial_cmp(vb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| ka.cmp(kb))
            })
            .expect("at least one active pair");

        let size_a = sizes[&a];
        let size_b = sizes[&b];
        let merged_size = size_a + size_b;

        merges.push(Merge {
            left: a,
            right: b,
            distance: d2.max(0.0).sqrt(),
            size: merged_size,
        });

        // Lance-Williams update for Ward linkage on squared distances.
        let others: Vec<usize> = sizes.keys().copied().filter(|&k| k != a && k != b).collect();
        sizes.remove(&a);
        sizes.remove(&b);

        for &k in &others {
            let dak = dist2[&key(a, k)];
            let dbk = dist2[&key(b, k)];
            let nk = sizes[&k] as f64;
            let na = size_a as f64;
            let nb = size_b as f64;
            let total = na + nb + nk;

            let updated = ((na + nk) * dak + (nb + nk) * dbk - nk * d2) / total;
            dist2.insert(key(next_id, k), updated);
        }

        dist2.retain(|&(i, j), _| i != a && j != a && i != b && j != b);
        sizes.insert(next_id, merged_size);
        next_id += 1;
    }

    Ok(merges)
}

fn key(i: usize, j: usize) -> (usize, usize) {
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}

fn sq_euclidean(a: &[u32], b: &[u32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum()
}

/// Print the merge table in linkage order.
pub fn print_merge_table(merges: &[Merge], labels: &[String]) {
    let name = |idx: usize| -> String {
        if idx < labels.len() {
            labels[idx].clone()
        } else {
            format!("#{}", idx)
        }
    };

    println!("step  left              right             distance  size");
    for (step, merge) in merges.iter().enumerate() {
        println!(
            "{:<5} {:<17} {:<17} {:>8.3}  {:>4}",
            step,
            name(merge.left),
            name(merge.right),
            merge.distance,
            merge.size
        );
    }
}

/// Render the merges as a text dendrogram.
pub fn render_dendrogram(merges: &[Merge], labels: &[String]) -> String {
    let n = labels.len();
    let root = n + merges.len() - 1;

    let mut out = String::new();
    render_node(root, merges, labels, n, "", true, &mut out);
    out
}

fn render_node(
    idx: usize,
    merges: &[Merge],
    labels: &[String],
    n: usize,
    prefix: &str,
    last: bool,
    out: &mut String,
) {
    let branch = if last { "└─ " } else { "├─ " };

    if idx < n {
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&labels[idx]);
        out.push('\n');
        return;
    }

    let merge = &merges[idx - n];
    out.push_str(prefix);
    out.push_str(branch);
    out.push_str(&format!("d={:.3}\n", merge.distance));

    let child_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
    render_node(merge.left, merges, labels, n, &child_prefix, false, out);
    render_node(merge.right, merges, labels, n, &child_prefix, true, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(labels: &[&str], rows: Vec<Vec<u32>>) -> OneHotMatrix {
        OneHotMatrix {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            terms: (0..rows[0].len()).map(|i| format!("term_{}", i)).collect(),
            rows,
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        let single = matrix(&["a"], vec![vec![1, 0]]);
        assert!(ward_linkage(&single).is_err());
    }

    #[test]
    fn merges_identical_rows_first() {
        let m = matrix(
            &["a", "b", "c"],
            vec![vec![1, 0, 0], vec![1, 0, 0], vec![0, 1, 1]],
        );
        let merges = ward_linkage(&m).unwrap();
        assert_eq!(merges.len(), 2);

        // a and b are identical, so they merge at distance zero.
        assert_eq!((merges[0].left, merges[0].right), (0, 1));
        assert_eq!(merges[0].distance, 0.0);
        assert_eq!(merges[0].size, 2);

        // The final merge absorbs c into the new cluster (id 3).
        assert_eq!((merges[1].left, merges[1].right), (2, 3));
        assert_eq!(merges[1].size, 3);
        assert!(merges[1].distance > 0.0);
    }

    #[test]
    fn two_points_merge_at_euclidean_distance() {
        let m = matrix(&["a", "b"], vec![vec![0, 0], vec![3, 4]]);
        let merges = ward_linkage(&m).unwrap();
        assert_eq!(merges.len(), 1);
        assert!((merges[0].distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn ward_prefers_compact_merges() {
        // Two tight pairs far apart: each pair merges before the pairs join.
        let m = matrix(
            &["a", "b", "c", "d"],
            vec![
                vec![0, 0, 0, 0],
                vec![1, 0, 0, 0],
                vec![10, 10, 10, 10],
                vec![10, 10, 10, 11],
            ],
        );
        let merges = ward_linkage(&m).unwrap();
        assert_eq!((merges[0].left, merges[0].right), (0, 1));
        assert_eq!((merges[1].left, merges[1].right), (2, 3));
        assert_eq!((merges[2].left, merges[2].right), (4, 5));
        assert_eq!(merges[2].size, 4);
    }

    #[test]
    fn dendrogram_lists_every_label() {
        let m = matrix(
            &["comet", "maxquant", "peakfinder"],
            vec![vec![1, 0], vec![1, 0], vec![0, 1]],
        );
        let merges = ward_linkage(&m).unwrap();
        let rendered = render_dendrogram(&merges, &m.labels);
        for label in &m.labels {
            assert!(rendered.contains(label.as_str()), "missing {}", label);
        }
    }
}
