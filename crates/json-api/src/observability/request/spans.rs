//! HTTP route helpers for spans and metric labels.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestRoute {
    /// Path with every UUID segment replaced by `{uuid}`.
    pub(super) template: String,

    /// Owner of the cart addressed by a `/cart/{user_id}/...` path.
    pub(super) user_id: Option<Uuid>,
}

pub(super) fn route_for_path(path: &str) -> RequestRoute {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let user_id = match segments.as_slice() {
        ["cart", user, ..] => Uuid::parse_str(user).ok(),
        _ => None,
    };

    let template = if path == "/" {
        "/".to_owned()
    } else {
        let normalised: Vec<&str> = segments
            .iter()
            .map(|segment| {
                if Uuid::parse_str(segment).is_ok() {
                    "{uuid}"
                } else {
                    segment
                }
            })
            .collect();

        format!("/{}", normalised.join("/"))
    };

    RequestRoute { template, user_id }
}
