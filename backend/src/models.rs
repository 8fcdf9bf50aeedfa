use shared::{GeoPoint, MatchEntry, RouteDoc, Schedule};

use crate::coord::{self, CoordError};

/// A named, ordered polyline plus a recurrence schedule, owned by a user.
///
/// The path is the decoded travel order; reordering it invalidates the
/// route. `(owner, name)` is unique in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub owner: String,
    pub name: String,
    pub start_address: String,
    pub end_address: String,
    pub path: Vec<GeoPoint>,
    pub schedule: Schedule,
    pub comment: Option<String>,
}

impl Route {
    /// Decode a wire document into a route. Any malformed path element is an
    /// error for the whole document.
    pub fn from_doc(doc: RouteDoc) -> Result<Self, CoordError> {
        let path = coord::decode_path(&doc.route)?;
        Ok(Self {
            owner: doc.owner,
            name: doc.name,
            start_address: doc.start_address,
            end_address: doc.end_address,
            path,
            schedule: doc.planning,
            comment: doc.comment,
        })
    }

    pub fn to_doc(&self) -> RouteDoc {
        RouteDoc {
            owner: self.owner.clone(),
            name: self.name.clone(),
            start_address: self.start_address.clone(),
            end_address: self.end_address.clone(),
            route: coord::encode_path(&self.path),
            planning: self.schedule.clone(),
            comment: self.comment.clone(),
        }
    }
}

/// A scored candidate: the full candidate route, its similarity against the
/// requester's path, and the common subsequence used for path highlighting.
/// Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub route: Route,
    pub similarity: f64,
    pub lcs: Vec<GeoPoint>,
}

impl MatchResult {
    pub fn into_entry(self) -> MatchEntry {
        MatchEntry {
            lcs: coord::encode_path(&self.lcs),
            route: self.route.to_doc(),
            similarity: self.similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> RouteDoc {
        RouteDoc {
            owner: "alice".to_string(),
            name: "home-work".to_string(),
            start_address: "12 rue de la Paix".to_string(),
            end_address: "Part-Dieu".to_string(),
            route: vec!["[4.83,45.76]".to_string(), "[4.85,45.77]".to_string()],
            planning: Schedule::default(),
            comment: Some("prefer the river side".to_string()),
        }
    }

    #[test]
    fn doc_round_trips_through_domain_route() {
        let original = doc();
        let route = Route::from_doc(original.clone()).unwrap();
        assert_eq!(route.path.len(), 2);
        assert_eq!(route.path[0], GeoPoint { lat: 45.76, lng: 4.83 });
        assert_eq!(route.to_doc(), original);
    }

    #[test]
    fn malformed_path_element_rejects_the_document() {
        let mut broken = doc();
        broken.route[1] = "not-a-coordinate".to_string();
        assert!(Route::from_doc(broken).is_err());
    }
}
