// THEORY:
// Connected-component labeling turns the binary "bright" mask into discrete regions
// so that the detector can reason about patches instead of pixels.
//
// Algorithm: classic two-pass labeling with a union-find equivalence table.
// 1.  **First pass**: scan in raster order. Each foreground pixel looks at its four
//     already-visited 8-neighbours (up-left, up, up-right, left). With no labelled
//     neighbour it opens a new provisional label; otherwise it takes the smallest
//     neighbouring label and records that all neighbouring labels are equivalent.
// 2.  **Resolution**: every provisional label is flattened to its root, and roots are
//     renumbered consecutively in the order they were first opened.
// 3.  **Second pass**: provisional labels are rewritten to their final numbers.
//
// Because roots are always the smallest label of their set and renumbering follows
// creation order, final labels are ordered by the raster position of each
// component's first pixel. Label 0 is background.

use ndarray::{Array2, ArrayView2};

/// A label map plus the number of components it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub map: Array2<usize>,
    pub count: usize,
}

/// Offsets (row, col) of the 8-neighbours visited before the current pixel.
const PRIOR_NEIGHBOURS: [(isize, isize); 4] = [(-1, -1), (-1, 0), (-1, 1), (0, -1)];

fn find_root(parents: &mut [usize], label: usize) -> usize {
    let mut current = label;
    while current != parents[current] {
        // Path halving.
        parents[current] = parents[parents[current]];
        current = parents[current];
    }
    current
}

fn union_labels(parents: &mut [usize], a: usize, b: usize) {
    let root_a = find_root(parents, a);
    let root_b = find_root(parents, b);
    if root_a < root_b {
        parents[root_b] = root_a;
    } else if root_b < root_a {
        parents[root_a] = root_b;
    }
}

/// Labels the 8-connected components of `mask`.
pub fn connected_components(mask: &ArrayView2<bool>) -> Labels {
    let (height, width) = mask.dim();
    let mut map = Array2::zeros((height, width));
    // parents[0] is the background slot and is never used as a component.
    let mut parents = vec![0usize];

    for row in 0..height {
        for col in 0..width {
            if !mask[[row, col]] {
                continue;
            }

            let mut neighbours = [0usize; 4];
            let mut found = 0;
            for &(dr, dc) in &PRIOR_NEIGHBOURS {
                let r = row as isize + dr;
                let c = col as isize + dc;
                if r < 0 || c < 0 || c >= width as isize {
                    continue;
                }
                let label = map[[r as usize, c as usize]];
                if label > 0 {
                    neighbours[found] = label;
                    found += 1;
                }
            }

            if found == 0 {
                let label = parents.len();
                parents.push(label);
                map[[row, col]] = label;
                continue;
            }

            let neighbours = &neighbours[..found];
            let smallest = neighbours.iter().copied().fold(usize::MAX, usize::min);
            map[[row, col]] = smallest;
            for &label in neighbours {
                if label != smallest {
                    union_labels(&mut parents, smallest, label);
                }
            }
        }
    }

    let mut final_labels = vec![0usize; parents.len()];
    let mut count = 0;
    for label in 1..parents.len() {
        let root = find_root(&mut parents, label);
        if root == label {
            count += 1;
            final_labels[label] = count;
        } else {
            // Roots are always smaller than their members, so already numbered.
            final_labels[label] = final_labels[root];
        }
    }

    map.mapv_inplace(|label| final_labels[label]);

    Labels { map, count }
}

/// Pixel count of every label; index 0 holds the background count.
pub fn component_areas(labels: &Labels) -> Vec<usize> {
    let mut areas = vec![0usize; labels.count + 1];
    for &label in labels.map.iter() {
        areas[label] += 1;
    }
    areas
}

/// The label with the largest area, ignoring background. Ties go to the lowest
/// label, i.e. the component whose first pixel comes first in raster order.
pub fn largest_component(areas: &[usize]) -> Option<(usize, usize)> {
    areas
        .iter()
        .enumerate()
        .skip(1)
        .fold(None, |best: Option<(usize, usize)>, (label, &area)| match best {
            Some((_, best_area)) if best_area >= area => best,
            _ => Some((label, area)),
        })
}
