mod compact;
mod extended;
mod large;

use crate::services::GeometryServices;

use super::candidates::CandidateSet;
use super::classify::{ProcessedRoom, RoomCategory};
use super::context::PlacementContext;
use super::junction;

/// Runs the category strategy for one room, writing into the shared set.
pub fn generate<S: GeometryServices>(
    services: &S,
    room: &ProcessedRoom,
    ctx: &PlacementContext<'_>,
    set: &mut CandidateSet,
) {
    match room.category {
        RoomCategory::Compact => compact::place(room, set),
        RoomCategory::Extended => {
            let report = junction::detect(&room.raw_skeleton, &room.graph, ctx);
            extended::place(&report, ctx, set);
        }
        RoomCategory::Large => large::place(services, room, ctx, set),
    }
}
