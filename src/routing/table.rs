//! Route table.
//!
//! # Responsibilities
//! - Store routes under named groups
//! - Preserve registration order across and within groups
//! - List groups for diagnostics
//!
//! # Design Decisions
//! - Append-only: no removal, no replacement
//! - Registering an existing group appends to it
//! - Duplicate method+path pairs are accepted; the earlier one wins at
//!   match time, the later one is unreachable

use super::route::Route;

#[derive(Debug, Clone)]
struct Group {
    name: String,
    members: Vec<usize>,
}

/// Ordered routes, grouped by label.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
    groups: Vec<Group>,
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Append `routes` under `group`, keeping their order.
    pub fn register(&mut self, group: &str, routes: impl IntoIterator<Item = Route<H>>) {
        let index = match self.groups.iter().position(|g| g.name == group) {
            Some(index) => index,
            None => {
                self.groups.push(Group {
                    name: group.to_string(),
                    members: Vec::new(),
                });
                self.groups.len() - 1
            }
        };

        for route in routes {
            tracing::debug!(
                group = %group,
                method = %route.method,
                path = %route.pattern,
                "Registering route"
            );
            self.groups[index].members.push(self.routes.len());
            self.routes.push(route);
        }
    }

    /// Every route in registration order. This is the order the matcher
    /// evaluates them in.
    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Routes of one group, in registration order.
    pub fn group(&self, name: &str) -> Option<impl Iterator<Item = &Route<H>>> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.members.iter().map(|&i| &self.routes[i]))
    }

    /// Group names in first-registration order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// `(group, routes)` pairs in first-registration order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, Vec<&Route<H>>)> {
        self.groups.iter().map(|g| {
            (
                g.name.as_str(),
                g.members.iter().map(|&i| &self.routes[i]).collect(),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
