//! Proximity ranking
//!
//! Filters a seller set by live criteria and orders it by great-circle
//! distance from the user. Sorting is stable: sellers at exactly the same
//! distance keep their catalog order.

use crate::coord::distance::haversine_km;
use crate::coord::Coordinate;
use crate::location::LocationState;
use crate::sellers::{FilterCriteria, Seller};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// A seller with its distance from the ranking origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSeller {
    #[serde(flatten)]
    pub seller: Seller,
    pub distance_km: f64,
}

/// Rank sellers by distance from `origin`
///
/// # Arguments
/// * `origin` - User coordinate; `None` yields an empty ranking
/// * `sellers` - Candidate sellers, in catalog order
/// * `criteria` - Filter applied before ranking
///
/// # Returns
/// Matching sellers in non-decreasing distance order
pub fn rank(
    origin: Option<Coordinate>,
    sellers: &[Seller],
    criteria: &FilterCriteria,
) -> Vec<RankedSeller> {
    let Some(origin) = origin else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedSeller> = sellers
        .iter()
        .filter(|seller| criteria.matches(seller))
        .map(|seller| RankedSeller {
            seller: seller.clone(),
            distance_km: haversine_km(origin, seller.coordinate),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

/// Last inputs and output of a ranking call
#[derive(Debug, Clone)]
struct Memo {
    origin: Option<Coordinate>,
    criteria: FilterCriteria,
    fingerprint: u64,
    ranked: Vec<RankedSeller>,
}

/// Ranker that memoizes the last call
///
/// Repeated calls with the same origin, criteria and seller set reuse the
/// previous result instead of recomputing distances.
#[derive(Debug, Default)]
pub struct ProximityRanker {
    memo: Option<Memo>,
}

impl ProximityRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank sellers, reusing the previous result when inputs are unchanged
    pub fn rank(
        &mut self,
        origin: Option<Coordinate>,
        sellers: &[Seller],
        criteria: &FilterCriteria,
    ) -> Vec<RankedSeller> {
        let fingerprint = fingerprint(sellers);

        if let Some(memo) = &self.memo {
            if memo.origin == origin && memo.fingerprint == fingerprint && &memo.criteria == criteria
            {
                debug!("Reusing memoized ranking of {} sellers", memo.ranked.len());
                return memo.ranked.clone();
            }
        }

        let ranked = rank(origin, sellers, criteria);
        self.memo = Some(Memo {
            origin,
            criteria: criteria.clone(),
            fingerprint,
            ranked: ranked.clone(),
        });
        ranked
    }

    /// Forget the memoized result
    pub fn reset(&mut self) {
        self.memo = None;
    }
}

/// Identity of a seller set for memoization purposes
fn fingerprint(sellers: &[Seller]) -> u64 {
    let mut hasher = DefaultHasher::new();
    sellers.len().hash(&mut hasher);
    for seller in sellers {
        seller.id.hash(&mut hasher);
        seller.brand.hash(&mut hasher);
        seller.size_class.hash(&mut hasher);
        seller.coordinate.lat.to_bits().hash(&mut hasher);
        seller.coordinate.lng.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// A ranking together with the location it was computed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyReport {
    pub location: LocationState,
    pub criteria: FilterCriteria,
    pub sellers: Vec<RankedSeller>,
}

impl NearbyReport {
    /// Nearest matching seller
    pub fn nearest(&self) -> Option<&RankedSeller> {
        self.sellers.first()
    }
}
