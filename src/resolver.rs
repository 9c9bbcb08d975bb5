//! Progressive right-truncation of addresses until the geocoder finds a match.
//!
//! An address such as `Moscow, Central District, Main St 1, Apt 99999` is
//! tried as-is first, then with its last comma-separated segment dropped,
//! and so on down to the first segment alone. `ZERO_RESULTS` moves on to the
//! next shorter candidate; any other non-OK status stops at once.

use crate::error::Result;
use crate::geocoder::Geocoder;
use crate::types::{Coordinates, GeocodeStatus};

/// Strip surrounding whitespace and one pair of surrounding quotes.
pub fn normalize(address: &str) -> &str {
    let trimmed = address.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim()
}

/// Lazy sequence of candidates, most specific first.
///
/// # Example
///
/// ```rust
/// use geotrim::resolver::candidates;
///
/// let all: Vec<String> = candidates(" Moscow ,, Tverskaya 1, Apt 5 ").collect();
/// assert_eq!(all, ["Moscow, Tverskaya 1, Apt 5", "Moscow, Tverskaya 1", "Moscow"]);
/// ```
pub fn candidates(address: &str) -> Candidates {
    let segments = normalize(address)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    let remaining = segments.len();
    Candidates {
        segments,
        remaining,
    }
}

/// Iterator returned by [`candidates`].
#[derive(Debug, Clone)]
pub struct Candidates {
    segments: Vec<String>,
    remaining: usize,
}

impl Candidates {
    /// Number of segments in the full address.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        let candidate = self.segments[..self.remaining].join(", ");
        self.remaining -= 1;
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Candidates {}

/// How a resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// A candidate matched
    Matched,
    /// Every candidate returned no results
    Exhausted,
    /// A terminal status stopped truncation
    Aborted(GeocodeStatus),
    /// Nothing left to query after normalization
    Empty,
}

/// Result of resolving one address.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Location of the match, if any
    pub coordinates: Option<Coordinates>,
    /// Candidate that produced the match
    pub matched_candidate: Option<String>,
    /// Number of geocoding queries issued
    pub attempts: usize,
    /// Why resolution stopped
    pub outcome: ResolutionOutcome,
    original: String,
}

impl Resolution {
    fn unresolved(original: &str, attempts: usize, outcome: ResolutionOutcome) -> Self {
        Self {
            coordinates: None,
            matched_candidate: None,
            attempts,
            outcome,
            original: original.to_string(),
        }
    }

    /// Whether coordinates were found.
    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Whether the match came from a shortened candidate.
    pub fn is_fallback(&self) -> bool {
        self.matched_candidate
            .as_deref()
            .is_some_and(|candidate| candidate != self.original)
    }
}

/// Resolves addresses against a [`Geocoder`] by progressive truncation.
#[derive(Debug, Clone)]
pub struct AddressResolver<G> {
    geocoder: G,
}

impl<G: Geocoder> AddressResolver<G> {
    /// Create a resolver around a geocoder.
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Borrow the underlying geocoder.
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Resolve one address.
    ///
    /// # Errors
    ///
    /// Errors from the geocoder (network faults, undecodable responses)
    /// are returned unchanged; statuses never are.
    pub async fn resolve(&self, address: &str) -> Result<Resolution> {
        let original = normalize(address);
        let mut attempts = 0;

        for candidate in candidates(address) {
            let result = self.geocoder.geocode(&candidate).await?;
            attempts += 1;

            if let (GeocodeStatus::Ok, Some(coordinates)) = (&result.status, result.coordinates) {
                if candidate != original {
                    tracing::info!(%candidate, "[fallback] matched shortened address");
                }
                return Ok(Resolution {
                    coordinates: Some(coordinates),
                    matched_candidate: Some(candidate),
                    attempts,
                    outcome: ResolutionOutcome::Matched,
                    original: original.to_string(),
                });
            }

            if result.status.is_terminal() {
                tracing::warn!(%candidate, status = %result.status, "[try] stopping truncation");
                return Ok(Resolution::unresolved(
                    original,
                    attempts,
                    ResolutionOutcome::Aborted(result.status),
                ));
            }

            tracing::debug!(%candidate, status = %result.status, "[try] no match");
        }

        if attempts == 0 {
            return Ok(Resolution::unresolved(original, 0, ResolutionOutcome::Empty));
        }

        tracing::info!(address = %original, "[not found] no candidate matched");
        Ok(Resolution::unresolved(
            original,
            attempts,
            ResolutionOutcome::Exhausted,
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGeocoder;
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;

    const FULL: &str = "Moscow, Central District, Main St 1, Apt 99999";

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  \"Moscow, Main St\"  "), "Moscow, Main St");
        assert_eq!(normalize("\" padded \""), "padded");
        assert_eq!(normalize("\"half"), "\"half");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_candidates_are_strictly_shrinking() {
        let all = candidates(FULL).collect::<Vec<_>>();
        assert_eq!(
            all,
            [
                "Moscow, Central District, Main St 1, Apt 99999",
                "Moscow, Central District, Main St 1",
                "Moscow, Central District",
                "Moscow",
            ]
        );

        let counts = all
            .iter()
            .map(|c| c.split(", ").count())
            .collect::<Vec<_>>();
        assert!(counts.windows(2).all(|w| w[0] > w[1]));
        assert!(counts[0] <= FULL.split(',').count());
    }

    #[test]
    fn test_candidates_of_blank_address() {
        assert_eq!(candidates("").count(), 0);
        assert_eq!(candidates(" , ,, ").count(), 0);
        assert_eq!(candidates("\"\"").segment_count(), 0);
    }

    #[test]
    fn test_candidates_exact_size() {
        let mut iter = candidates("a, b, c");
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.segment_count(), 3);
    }

    #[tokio::test]
    async fn test_full_match_stops_immediately() {
        let geocoder = ScriptedGeocoder::new().found(FULL, 55.75, 37.61);
        let resolver = AddressResolver::new(geocoder);

        let resolution = resolver.resolve(FULL).await.unwrap();

        assert_eq!(resolution.outcome, ResolutionOutcome::Matched);
        assert_eq!(resolution.coordinates, Some(Coordinates::new(55.75, 37.61)));
        assert_eq!(resolution.attempts, 1);
        assert!(!resolution.is_fallback());
        assert_eq!(resolver.geocoder().calls(), [FULL]);
    }

    #[tokio::test]
    async fn test_falls_back_to_shorter_candidate() {
        let geocoder = ScriptedGeocoder::new().found("Moscow, Central District, Main St 1", 55.7, 37.6);
        let resolver = AddressResolver::new(geocoder);

        let resolution = resolver.resolve(FULL).await.unwrap();

        assert!(resolution.is_resolved());
        assert!(resolution.is_fallback());
        assert_eq!(
            resolution.matched_candidate.as_deref(),
            Some("Moscow, Central District, Main St 1")
        );
        assert_eq!(resolution.attempts, 2);
    }

    #[tokio::test]
    async fn test_respaced_input_counts_as_fallback() {
        let geocoder = ScriptedGeocoder::new().found("Moscow, Main St 1", 1.0, 2.0);
        let resolver = AddressResolver::new(geocoder);

        let resolution = resolver.resolve("  \"Moscow,Main St 1\" ").await.unwrap();

        assert!(resolution.is_resolved());
        // Segment rejoining changes spacing, so the candidate differs from the original.
        assert!(resolution.is_fallback());
        assert_eq!(resolver.geocoder().calls(), ["Moscow, Main St 1"]);
    }

    #[tokio::test]
    async fn test_all_zero_results_exhausts() {
        let resolver = AddressResolver::new(ScriptedGeocoder::new());

        let resolution = resolver.resolve(FULL).await.unwrap();

        assert_eq!(resolution.outcome, ResolutionOutcome::Exhausted);
        assert_eq!(resolution.attempts, 4);
        assert!(!resolution.is_resolved());
        assert_eq!(resolver.geocoder().calls().len(), 4);
    }

    #[tokio::test]
    async fn test_terminal_status_halts_truncation() {
        let geocoder = ScriptedGeocoder::new()
            .status("Moscow, Central District, Main St 1", GeocodeStatus::OverQueryLimit)
            .found("Moscow", 55.0, 37.0);
        let resolver = AddressResolver::new(geocoder);

        let resolution = resolver.resolve(FULL).await.unwrap();

        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::Aborted(GeocodeStatus::OverQueryLimit)
        );
        assert_eq!(resolution.attempts, 2);
        assert_eq!(resolver.geocoder().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_ok_without_location_keeps_truncating() {
        let geocoder = ScriptedGeocoder::new()
            .status(FULL, GeocodeStatus::Ok)
            .found("Moscow", 55.0, 37.0);
        let resolver = AddressResolver::new(geocoder);

        let resolution = resolver.resolve(FULL).await.unwrap();

        assert_eq!(resolution.matched_candidate.as_deref(), Some("Moscow"));
        assert_eq!(resolution.attempts, 4);
    }

    #[tokio::test]
    async fn test_empty_address_makes_no_calls() {
        let resolver = AddressResolver::new(ScriptedGeocoder::new());

        let resolution = resolver.resolve(" \"\" ").await.unwrap();

        assert_eq!(resolution.outcome, ResolutionOutcome::Empty);
        assert!(resolver.geocoder().calls().is_empty());
    }

    #[tokio::test]
    async fn test_geocoder_fault_propagates() {
        let geocoder = ScriptedGeocoder::new().fault("Some Address");
        let resolver = AddressResolver::new(geocoder);

        let err = resolver.resolve("Some Address").await.unwrap_err();
        assert_matches!(err, Error::HttpError { .. });
    }
}
