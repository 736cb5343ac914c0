//! Ordered route registration list.

use rustc_hash::FxHashMap;

use super::{RouteDescriptor, RouteError};

/// Routes of one build, in registration order.
///
/// Sorted by (priority, depth). The sort is stable, so equal keys keep the
/// order in which the descriptors were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RouteTable {
    entries: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Order `descriptors` and drop routes that would be registered twice.
    ///
    /// The first descriptor in table order wins a route name or handler
    /// identifier; each later one is returned as an error.
    pub fn build(mut descriptors: Vec<RouteDescriptor>) -> (Self, Vec<RouteError>) {
        descriptors.sort_by_key(|d| (d.priority, d.depth));

        let mut routes: FxHashMap<String, String> = FxHashMap::default();
        let mut handlers: FxHashMap<String, String> = FxHashMap::default();
        let mut entries = Vec::with_capacity(descriptors.len());
        let mut errors = Vec::new();

        for descriptor in descriptors {
            if let Some(existing) = routes.get(&descriptor.route_name) {
                errors.push(RouteError::DuplicateRoute {
                    path: descriptor.relative_path.clone(),
                    route: descriptor.route_name.clone(),
                    existing: existing.clone(),
                });
                continue;
            }
            if let Some(existing) = handlers.get(&descriptor.handler) {
                errors.push(RouteError::DuplicateHandler {
                    path: descriptor.relative_path.clone(),
                    handler: descriptor.handler.clone(),
                    existing: existing.clone(),
                });
                continue;
            }
            routes.insert(descriptor.route_name.clone(), descriptor.relative_path.clone());
            handlers.insert(descriptor.handler.clone(), descriptor.relative_path.clone());
            entries.push(descriptor);
        }

        (Self { entries }, errors)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.entries.iter()
    }
}
