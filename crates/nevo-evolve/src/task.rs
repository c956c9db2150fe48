//! The task oracle: random wavy surfaces and labelled questions
//!
//! A task is a 2-D surface over [−1, 1]² built from five sine terms; the
//! sign of the surface is the class label. Surfaces are rejection-sampled
//! until the two classes cover roughly equal area, so a constant-answer
//! brain cannot score much above chance.

use rand::Rng;

use crate::error::{EvolveError, Result};

/// Number of sine terms per surface
pub const SURFACE_TERMS: usize = 5;

/// Side length of the balance-census grid
pub const CENSUS_GRID: usize = 40;

/// Maximum class imbalance, as a fraction of grid cells
pub const BALANCE_TOLERANCE: f64 = 0.05;

/// Rejection-sampling budget for surface generation
const MAX_GENERATE_ATTEMPTS: usize = 10_000;

/// One classification task surface
///
/// Terms 0 and 2 run along x, terms 1 and 3 along y, term 4 along the
/// polar radius.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSurface {
    /// (frequency, phase) per sine term
    pub terms: [(f32, f32); SURFACE_TERMS],
}

impl TaskSurface {
    /// Create a surface from explicit terms
    pub fn new(terms: [(f32, f32); SURFACE_TERMS]) -> Self {
        Self { terms }
    }

    /// Sample random surfaces until one passes the balance census
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let mut terms = [(0.0f32, 0.0f32); SURFACE_TERMS];
            for term in terms.iter_mut() {
                *term = (
                    rng.gen_range(1.0..8.0),
                    rng.gen_range(0.0..std::f32::consts::TAU),
                );
            }
            let surface = Self::new(terms);
            if surface.is_balanced() {
                return Ok(surface);
            }
        }
        Err(EvolveError::TaskGeneration {
            attempts: MAX_GENERATE_ATTEMPTS,
        })
    }

    /// Surface value at a point; the sign is the class label
    pub fn value(&self, x: f32, y: f32) -> f32 {
        let r = (x * x + y * y).sqrt();
        let [(f0, p0), (f1, p1), (f2, p2), (f3, p3), (f4, p4)] = self.terms;
        (f0 * x + p0).sin()
            + (f1 * y + p1).sin()
            + (f2 * x + p2).sin()
            + (f3 * y + p3).sin()
            + (f4 * r + p4).sin()
    }

    /// Class label at a point
    pub fn label(&self, x: f32, y: f32) -> bool {
        self.value(x, y) >= 0.0
    }

    /// Count positive and negative cells over the census grid
    pub fn census(&self) -> (usize, usize) {
        let mut pos = 0;
        let mut neg = 0;
        for i in 0..CENSUS_GRID {
            for j in 0..CENSUS_GRID {
                let x = -1.0 + (i as f32 + 0.5) * 2.0 / CENSUS_GRID as f32;
                let y = -1.0 + (j as f32 + 0.5) * 2.0 / CENSUS_GRID as f32;
                if self.label(x, y) {
                    pos += 1;
                } else {
                    neg += 1;
                }
            }
        }
        (pos, neg)
    }

    /// Whether the class areas are within tolerance of each other
    pub fn is_balanced(&self) -> bool {
        let (pos, neg) = self.census();
        let cells = CENSUS_GRID * CENSUS_GRID;
        let limit = (cells as f64 * BALANCE_TOLERANCE) as usize;
        pos.abs_diff(neg) < limit
    }

    /// Draw one labelled question
    ///
    /// Points are drawn uniformly until one of each class has appeared; the
    /// query point is drawn independently afterwards. Balance guarantees
    /// both classes are common, so the loop terminates quickly.
    pub fn question<R: Rng + ?Sized>(&self, rng: &mut R) -> Question {
        let mut pos = None;
        let mut neg = None;
        let (pos, neg) = loop {
            let p = (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            if self.label(p.0, p.1) {
                pos.get_or_insert(p);
            } else {
                neg.get_or_insert(p);
            }
            if let (Some(pos), Some(neg)) = (pos, neg) {
                break (pos, neg);
            }
        };
        let query = (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        Question {
            pos,
            neg,
            query,
            target: self.label(query.0, query.1),
        }
    }

    /// Pre-generate the question stream every brain replays for this task
    pub fn question_stream<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Question> {
        (0..count).map(|_| self.question(rng)).collect()
    }
}

/// One labelled question: an example of each class, a query, and its label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Question {
    /// A point with a positive label
    pub pos: (f32, f32),
    /// A point with a negative label
    pub neg: (f32, f32),
    /// The point to classify
    pub query: (f32, f32),
    /// Whether the query's surface value is non-negative
    pub target: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_surfaces_are_balanced() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let surface = TaskSurface::generate(&mut rng).unwrap();
            let (pos, neg) = surface.census();
            assert_eq!(pos + neg, CENSUS_GRID * CENSUS_GRID);
            assert!(pos.abs_diff(neg) < 80, "imbalance {} vs {}", pos, neg);
        }
    }

    #[test]
    fn test_questions_are_consistent_with_surface() {
        let mut rng = StdRng::seed_from_u64(7);
        let surface = TaskSurface::generate(&mut rng).unwrap();
        for _ in 0..100 {
            let q = surface.question(&mut rng);
            assert!(surface.label(q.pos.0, q.pos.1));
            assert!(!surface.label(q.neg.0, q.neg.1));
            assert_eq!(q.target, surface.label(q.query.0, q.query.1));
        }
    }

    #[test]
    fn test_question_stream_is_replayable() {
        let mut rng = StdRng::seed_from_u64(9);
        let surface = TaskSurface::generate(&mut rng).unwrap();
        let a = surface.question_stream(&mut StdRng::seed_from_u64(1), 50);
        let b = surface.question_stream(&mut StdRng::seed_from_u64(1), 50);
        assert_eq!(a, b);
    }

    #[test]
    fn test_value_is_sum_of_terms() {
        let surface = TaskSurface::new([(1.0, 0.0); SURFACE_TERMS]);
        // At the origin r = 0 and every term is sin(0) = 0.
        assert!(surface.value(0.0, 0.0).abs() < 1e-6);
    }
}
