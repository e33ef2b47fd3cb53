use cogkit_core::Point;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dot {
    /// 1-based label, also the connection order.
    pub id: usize,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRules {
    pub dot_radius: f64,
    /// Margin kept free along every canvas edge.
    pub padding: f64,
    pub min_separation: f64,
    /// Random candidates tried per dot before giving up on random placement.
    pub attempts: usize,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            dot_radius: 20.0,
            padding: 30.0,
            min_separation: 60.0,
            attempts: 50,
        }
    }
}

impl PlacementRules {
    /// Smallest square canvas the rules can lay dots out on.
    pub fn min_canvas(&self) -> f64 {
        2.0 * (self.padding + self.dot_radius)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DotSet {
    pub dots: Vec<Dot>,
    /// Random sampling ran out of attempts and the grid layout was used.
    pub grid_fallback: bool,
}

impl DotSet {
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Dot> {
        id.checked_sub(1).and_then(|i| self.dots.get(i))
    }

    pub fn min_pairwise_distance(&self) -> Option<f64> {
        let mut best: Option<f64> = None;
        for (i, a) in self.dots.iter().enumerate() {
            for b in &self.dots[i + 1..] {
                let d = a.position.distance(b.position);
                best = Some(best.map_or(d, |m| m.min(d)));
            }
        }
        best
    }
}

/// Row-major layout on `ceil(sqrt(n))` columns, each dot centred in its cell.
pub fn grid_layout(dot_count: usize, canvas_size: f64, padding: f64) -> Vec<Dot> {
    if dot_count == 0 {
        return Vec::new();
    }
    let cols = (dot_count as f64).sqrt().ceil() as usize;
    let rows = dot_count.div_ceil(cols);
    let span = canvas_size - 2.0 * padding;
    let cell_w = span / cols as f64;
    let cell_h = span / rows as f64;
    (0..dot_count)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            Dot {
                id: i + 1,
                position: Point::new(
                    padding + (col as f64 + 0.5) * cell_w,
                    padding + (row as f64 + 0.5) * cell_h,
                ),
            }
        })
        .collect()
}

/// Rejection-sample each dot inside the padded canvas; if any dot exhausts
/// its attempts the whole set falls back to [`grid_layout`].
pub fn generate_with<R: Rng>(
    dot_count: usize,
    canvas_size: f64,
    rules: &PlacementRules,
    rng: &mut R,
) -> DotSet {
    let lo = rules.padding;
    let hi = canvas_size - rules.padding;
    let mut dots: Vec<Dot> = Vec::with_capacity(dot_count);

    if hi > lo {
        'dots: for id in 1..=dot_count {
            for _ in 0..rules.attempts {
                let candidate = Point::new(rng.random_range(lo..hi), rng.random_range(lo..hi));
                if dots
                    .iter()
                    .all(|d| d.position.distance(candidate) >= rules.min_separation)
                {
                    dots.push(Dot {
                        id,
                        position: candidate,
                    });
                    continue 'dots;
                }
            }
            break;
        }
    }

    if dots.len() == dot_count {
        debug!(dot_count, canvas_size, "dots placed by sampling");
        return DotSet {
            dots,
            grid_fallback: false,
        };
    }

    warn!(
        dot_count,
        placed = dots.len(),
        canvas_size,
        "dot sampling exhausted, using grid layout"
    );
    DotSet {
        dots: grid_layout(dot_count, canvas_size, rules.padding),
        grid_fallback: true,
    }
}

pub fn generate<R: Rng>(dot_count: usize, canvas_size: f64, rng: &mut R) -> DotSet {
    generate_with(dot_count, canvas_size, &PlacementRules::default(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn grid_layout_is_centred_in_cells() {
        let dots = grid_layout(4, 200.0, 0.0);
        let positions: Vec<_> = dots.iter().map(|d| (d.position.x, d.position.y)).collect();
        assert_eq!(
            positions,
            vec![(50.0, 50.0), (150.0, 50.0), (50.0, 150.0), (150.0, 150.0)]
        );
        assert_eq!(dots.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn grid_layout_handles_partial_last_row() {
        let dots = grid_layout(5, 300.0, 30.0);
        assert_eq!(dots.len(), 5);
        // 3 columns, 2 rows
        assert_eq!(dots[3].position.y, dots[4].position.y);
        assert!(dots[3].position.y > dots[0].position.y);
    }

    #[test]
    fn sampling_keeps_separation() {
        let mut rng = StdRng::seed_from_u64(3);
        let set = generate(10, 400.0, &mut rng);
        assert!(!set.grid_fallback);
        assert_eq!(set.len(), 10);
        assert!(set.min_pairwise_distance().unwrap() >= 60.0);
    }

    #[test]
    fn crowded_canvas_falls_back_to_grid() {
        let mut rng = StdRng::seed_from_u64(3);
        let set = generate(60, 400.0, &mut rng);
        assert!(set.grid_fallback);
        assert_eq!(set.len(), 60);
        assert_eq!(set.dots, grid_layout(60, 400.0, 30.0));
    }

    #[test]
    fn lookup_by_label() {
        let set = DotSet {
            dots: grid_layout(3, 200.0, 10.0),
            grid_fallback: true,
        };
        assert_eq!(set.get(1).map(|d| d.id), Some(1));
        assert_eq!(set.get(3).map(|d| d.id), Some(3));
        assert!(set.get(0).is_none());
        assert!(set.get(4).is_none());
    }
}
