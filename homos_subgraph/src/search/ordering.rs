use homos_common::VertexOrder;

use crate::{Digraph, PartialMap};

/// The fixed visiting order for `order`, or `None` when the order is chosen
/// during the search.
pub(super) fn fixed_order(
    domain: &Digraph,
    order: VertexOrder,
    image: Option<&PartialMap>,
) -> Option<Vec<usize>> {
    match order {
        VertexOrder::Index => Some((0..domain.vertex_count()).collect()),
        VertexOrder::DegreeGuided => Some(degree_guided(domain, image)),
        VertexOrder::FewestCandidates => None,
    }
}

/// Greedy order: hinted vertices first, then repeatedly the vertex with the
/// most edges to vertices already placed.
///
/// Ties go to the larger total degree, then to the smaller index.
fn degree_guided(domain: &Digraph, image: Option<&PartialMap>) -> Vec<usize> {
    let n = domain.vertex_count();
    let mut placed = vec![false; n];
    let mut links = vec![0usize; n];
    let mut order = Vec::with_capacity(n);

    let degree = |v: usize| domain.out_degree(v) + domain.in_degree(v);
    let mut place = |v: usize, placed: &mut Vec<bool>, links: &mut Vec<usize>| {
        placed[v] = true;
        order.push(v);
        for &w in domain.out_neighbours(v).iter().chain(domain.in_neighbours(v)) {
            links[w] += 1;
        }
    };

    if let Some(image) = image {
        for (v, _) in image.fixed() {
            place(v, &mut placed, &mut links);
        }
    }

    loop {
        let next = (0..n).filter(|&v| !placed[v]).min_by(|&a, &b| {
            // Primary: most links to placed vertices
            links[b]
                .cmp(&links[a])
                // Secondary: largest degree, then lowest index
                .then_with(|| degree(b).cmp(&degree(a)))
                .then_with(|| a.cmp(&b))
        });
        let Some(next) = next else {
            break;
        };
        place(next, &mut placed, &mut links);
    }

    order
}
