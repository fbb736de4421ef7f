//! Entry resolution
//!
//! Several sources can ask for a version of the same dependency. The winner
//! is chosen by a fixed priority list of source names:
//! 1. The first priority name that matches any request
//! 2. Otherwise the first remaining request in input order
//!
//! Launch/build flags are merged across every request with logical OR.

use super::entry::{VersionRequest, ANY_VERSION};

/// Outcome of a resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The request whose constraint will be installed
    pub winner: VersionRequest,

    /// All requests ordered for display: priority matches first, then the rest
    pub display_order: Vec<VersionRequest>,
}

/// Pick the winning request and produce the display ordering.
///
/// An empty request list resolves to a wildcard request with no source.
/// The winner's constraint is normalised to `*` when empty.
pub fn resolve(requests: &[VersionRequest], priorities: &[&str]) -> Resolution {
    let mut display_order = Vec::with_capacity(requests.len());
    let mut matched = vec![false; requests.len()];

    for priority in priorities {
        for (i, request) in requests.iter().enumerate() {
            if !matched[i] && request.source.as_deref() == Some(*priority) {
                matched[i] = true;
                display_order.push(request.clone());
            }
        }
    }

    display_order.extend(
        requests
            .iter()
            .zip(&matched)
            .filter(|(_, seen)| !**seen)
            .map(|(request, _)| request.clone()),
    );

    let mut winner = match display_order.first() {
        Some(first) => first.clone(),
        None => VersionRequest::default(),
    };
    if winner.constraint() == ANY_VERSION {
        winner.version = Some(ANY_VERSION.to_string());
    }

    Resolution {
        winner,
        display_order,
    }
}

/// OR together the launch and build flags of every request
pub fn merge_launch_build_flags(requests: &[VersionRequest]) -> (bool, bool) {
    requests.iter().fold((false, false), |(launch, build), r| {
        (launch || r.launch, build || r.build)
    })
}
