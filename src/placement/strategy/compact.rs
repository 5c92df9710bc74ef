use crate::math::polygon_2d::polygon_centroid;

use super::super::candidates::{CandidateSet, Priority};
use super::super::classify::ProcessedRoom;

/// Compact rooms get exactly one candidate: the polygon centroid, at
/// critical priority so nothing placed nearby can displace it.
pub fn place(room: &ProcessedRoom, set: &mut CandidateSet) {
    if let Some(centroid) = polygon_centroid(&room.polygon) {
        set.add(centroid, Priority::Critical, None);
    }
}
