use strum::{Display, EnumIter, EnumString};

/// The fixed roles every OpenMetadata service instance hands out default access to.
///
/// Roles are only referenced by the default policies, membership is managed outside of
/// this service definition.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[strum(serialize_all = "kebab-case")]
pub enum RoleKind {
    DataConsumer,
    DataSteward,
    Bot,
    Admin,
}

impl RoleKind {
    /// Returns the name of this role scoped to the given service, e.g. `om1-data-steward`
    pub fn role_name(&self, service_name: &str) -> String {
        role_name(service_name, *self)
    }
}

pub fn role_name(service_name: &str, role: RoleKind) -> String {
    format!("{service_name}-{role}")
}
