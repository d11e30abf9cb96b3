//! Nearest-neighbor matching between two point sets.
//!
//! Every source point is paired with the closest candidate by haversine distance. The search
//! strategy sits behind [`NearestNeighbor`]; [`ExhaustiveSearch`] scans every candidate, which
//! is O(|A|·|B|) overall.

use crate::{haversine_distance, Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of matching a single source point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The point being matched
    pub source: Coordinate,
    /// Closest candidate from the target set
    pub matched: Coordinate,
    /// Position of `matched` in the target set
    pub matched_index: usize,
    /// Great-circle distance in kilometers
    pub distance_km: f64,
}

/// A candidate returned by a nearest-neighbor search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the candidate in the target set
    pub index: usize,
    /// The candidate itself
    pub coordinate: Coordinate,
    /// Distance from the query in kilometers
    pub distance_km: f64,
}

/// Finds the closest candidate to a query point.
///
/// Implementations must be read-only so queries can run concurrently.
pub trait NearestNeighbor: Sync {
    /// Returns the closest candidate, or `None` when there are no candidates.
    ///
    /// On exact distance ties the candidate with the lowest index wins.
    fn nearest(&self, query: &Coordinate) -> Option<Neighbor>;

    /// Number of candidates.
    fn len(&self) -> usize;

    /// Returns true if there are no candidates.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Linear scan over every candidate.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSearch<'a> {
    candidates: &'a [Coordinate],
}

impl<'a> ExhaustiveSearch<'a> {
    /// Wraps a target set.
    pub fn new(candidates: &'a [Coordinate]) -> Self {
        Self { candidates }
    }
}

impl NearestNeighbor for ExhaustiveSearch<'_> {
    fn nearest(&self, query: &Coordinate) -> Option<Neighbor> {
        let mut best: Option<Neighbor> = None;

        for (index, candidate) in self.candidates.iter().enumerate() {
            let distance_km = haversine_distance(query, candidate);
            // Strict comparison: a later candidate at the same distance never replaces the best.
            if best.map_or(true, |b| distance_km < b.distance_km) {
                best = Some(Neighbor {
                    index,
                    coordinate: *candidate,
                    distance_km,
                });
            }
        }

        best
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Matches each point of `set_a` to its closest point in `set_b`.
///
/// Returns one result per source point in the order of `set_a`. Runs in parallel across
/// `set_a` when the `parallel` feature is enabled.
///
/// # Errors
/// [`GeoError::EmptyTargetSet`] if `set_b` is empty.
///
/// # Example
/// ```
/// use geomatch_geo::{match_closest_points, Coordinate};
///
/// let nyc = Coordinate::new(40.7128, -74.0060);
/// let la = Coordinate::new(34.0522, -118.2437);
/// let london = Coordinate::new(51.5074, -0.1278);
///
/// let results = match_closest_points(&[nyc], &[la, london]).unwrap();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].matched, la);
/// ```
pub fn match_closest_points(set_a: &[Coordinate], set_b: &[Coordinate]) -> Result<Vec<MatchResult>> {
    match_with_index(set_a, &ExhaustiveSearch::new(set_b))
}

/// Single-threaded variant of [`match_closest_points`].
pub fn match_closest_points_sequential(
    set_a: &[Coordinate],
    set_b: &[Coordinate],
) -> Result<Vec<MatchResult>> {
    match_with_index_sequential(set_a, &ExhaustiveSearch::new(set_b))
}

/// Matches `set_a` against any [`NearestNeighbor`] implementation.
pub fn match_with_index<I>(set_a: &[Coordinate], index: &I) -> Result<Vec<MatchResult>>
where
    I: NearestNeighbor + ?Sized,
{
    if index.is_empty() {
        return Err(GeoError::EmptyTargetSet);
    }

    #[cfg(feature = "parallel")]
    let results: Result<Vec<MatchResult>> = {
        use rayon::prelude::*;
        set_a
            .par_iter()
            .map(|source| match_single(source, index))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<MatchResult>> = set_a
        .iter()
        .map(|source| match_single(source, index))
        .collect();

    let results = results?;
    tracing::debug!(
        sources = set_a.len(),
        candidates = index.len(),
        "Matched point sets"
    );
    Ok(results)
}

/// Sequential matching against any [`NearestNeighbor`] implementation.
pub fn match_with_index_sequential<I>(set_a: &[Coordinate], index: &I) -> Result<Vec<MatchResult>>
where
    I: NearestNeighbor + ?Sized,
{
    let never = AtomicBool::new(false);
    match_with_index_cancellable(set_a, index, &never)
}

/// Sequential matching that stops between source points once `cancel` is set.
///
/// # Errors
/// [`GeoError::EmptyTargetSet`] if the index is empty, [`GeoError::Cancelled`] if `cancel`
/// was observed before every source point was matched.
pub fn match_with_index_cancellable<I>(
    set_a: &[Coordinate],
    index: &I,
    cancel: &AtomicBool,
) -> Result<Vec<MatchResult>>
where
    I: NearestNeighbor + ?Sized,
{
    if index.is_empty() {
        return Err(GeoError::EmptyTargetSet);
    }

    let mut results = Vec::with_capacity(set_a.len());
    for source in set_a {
        if cancel.load(Ordering::Relaxed) {
            return Err(GeoError::Cancelled {
                completed: results.len(),
                total: set_a.len(),
            });
        }
        results.push(match_single(source, index)?);
    }

    tracing::debug!(
        sources = set_a.len(),
        candidates = index.len(),
        "Matched point sets sequentially"
    );
    Ok(results)
}

#[inline]
fn match_single<I>(source: &Coordinate, index: &I) -> Result<MatchResult>
where
    I: NearestNeighbor + ?Sized,
{
    let neighbor = index.nearest(source).ok_or(GeoError::EmptyTargetSet)?;
    Ok(MatchResult {
        source: *source,
        matched: neighbor.coordinate,
        matched_index: neighbor.index,
        distance_km: neighbor.distance_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance_km;
    use proptest::prelude::*;

    const NYC: Coordinate = Coordinate { latitude: 40.7128, longitude: -74.0060 };
    const LA: Coordinate = Coordinate { latitude: 34.0522, longitude: -118.2437 };
    const LONDON: Coordinate = Coordinate { latitude: 51.5074, longitude: -0.1278 };
    const PARIS: Coordinate = Coordinate { latitude: 48.8566, longitude: 2.3522 };
    const MADRID: Coordinate = Coordinate { latitude: 40.4168, longitude: -3.7038 };

    #[test]
    fn test_nyc_matches_la() {
        let results = match_closest_points(&[NYC], &[LA, LONDON]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, NYC);
        assert_eq!(results[0].matched, LA);
        assert_eq!(results[0].matched_index, 0);
        assert_eq!(
            results[0].distance_km,
            distance_km(NYC.latitude, NYC.longitude, LA.latitude, LA.longitude)
        );
    }

    #[test]
    fn test_preserves_source_order() {
        let sources = [LONDON, LA, MADRID, NYC];
        let results = match_closest_points(&sources, &[PARIS, NYC]).unwrap();

        let order: Vec<Coordinate> = results.iter().map(|r| r.source).collect();
        assert_eq!(order, sources);
        assert_eq!(results[0].matched, PARIS);
        assert_eq!(results[1].matched, NYC);
        assert_eq!(results[2].matched, PARIS);
        assert_eq!(results[3].matched, NYC);
        assert_eq!(results[3].distance_km, 0.0);
    }

    #[test]
    fn test_first_seen_wins_on_ties() {
        // Two candidates exactly one degree of longitude either side of the source
        let source = Coordinate::new(0.0, 0.0);
        let east = Coordinate::new(0.0, 1.0);
        let west = Coordinate::new(0.0, -1.0);

        let results = match_closest_points(&[source], &[east, west, east]).unwrap();
        assert_eq!(results[0].matched, east);
        assert_eq!(results[0].matched_index, 0);

        let results = match_closest_points(&[source], &[west, east]).unwrap();
        assert_eq!(results[0].matched, west);
        assert_eq!(results[0].matched_index, 0);
    }

    #[test]
    fn test_duplicate_candidates_keep_first_index() {
        let results = match_closest_points(&[NYC], &[LONDON, LA, LA]).unwrap();
        assert_eq!(results[0].matched_index, 1);
    }

    #[test]
    fn test_empty_target_set_is_an_error() {
        assert!(matches!(
            match_closest_points(&[NYC], &[]),
            Err(GeoError::EmptyTargetSet)
        ));
        assert!(matches!(
            match_closest_points(&[], &[]),
            Err(GeoError::EmptyTargetSet)
        ));
        assert!(matches!(
            match_closest_points_sequential(&[NYC], &[]),
            Err(GeoError::EmptyTargetSet)
        ));
    }

    #[test]
    fn test_empty_source_set_yields_no_results() {
        let results = match_closest_points(&[], &[LA]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let sources = [NYC, LA, LONDON, PARIS, MADRID];
        let targets = [MADRID, LA, PARIS];
        assert_eq!(
            match_closest_points(&sources, &targets).unwrap(),
            match_closest_points_sequential(&sources, &targets).unwrap()
        );
    }

    #[test]
    fn test_cancellation() {
        let cancel = AtomicBool::new(true);
        let result = match_with_index_cancellable(&[NYC, LA], &ExhaustiveSearch::new(&[LONDON]), &cancel);
        assert!(matches!(
            result,
            Err(GeoError::Cancelled { completed: 0, total: 2 })
        ));
    }

    /// Index that always reports the last candidate, to show the trait seam is honored.
    struct LastCandidate(Vec<Coordinate>);

    impl NearestNeighbor for LastCandidate {
        fn nearest(&self, query: &Coordinate) -> Option<Neighbor> {
            let index = self.0.len().checked_sub(1)?;
            let coordinate = self.0[index];
            Some(Neighbor {
                index,
                coordinate,
                distance_km: haversine_distance(query, &coordinate),
            })
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn test_custom_index() {
        let index = LastCandidate(vec![LA, LONDON]);
        let results = match_with_index(&[NYC], &index).unwrap();
        assert_eq!(results[0].matched, LONDON);
        assert_eq!(results[0].matched_index, 1);

        assert!(matches!(
            match_with_index(&[NYC], &LastCandidate(vec![])),
            Err(GeoError::EmptyTargetSet)
        ));
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(Coordinate::from)
    }

    proptest! {
        #[test]
        fn prop_one_result_per_source_at_minimum_distance(
            set_a in prop::collection::vec(coordinate(), 0..20),
            set_b in prop::collection::vec(coordinate(), 1..20),
        ) {
            let results = match_closest_points(&set_a, &set_b).unwrap();
            prop_assert_eq!(results.len(), set_a.len());

            for (result, source) in results.iter().zip(&set_a) {
                prop_assert_eq!(result.source, *source);
                prop_assert_eq!(set_b[result.matched_index], result.matched);

                let min = set_b
                    .iter()
                    .map(|c| haversine_distance(source, c))
                    .fold(f64::INFINITY, f64::min);
                prop_assert_eq!(result.distance_km, min);
            }
        }
    }
}
