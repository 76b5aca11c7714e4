//! Contract violation errors shared by every Nucleus crate.
//!
//! A [`ContractError`] is raised whenever a caller breaks a precondition of
//! the kernel or of a data manager. Errors are never swallowed. They come in
//! two tiers (see [`ContractErrorKind::is_fatal`]):
//!
//! - **Recoverable**: a single mutation with bad arguments. The call fails
//!   and no state has been changed.
//! - **Fatal**: malformed plugin graphs, missing initial values, and
//!   ordering violations. The run cannot continue.

use core::fmt;

/// The category of a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractErrorKind {
    /// A required identifier or value was absent.
    NullId,
    /// A person id does not refer to an existing person.
    UnknownPersonId,
    /// A region id does not refer to an existing region.
    UnknownRegionId,
    /// A property id does not refer to a defined property.
    UnknownPropertyId,
    /// A person id was added twice.
    DuplicatePersonId,
    /// A region id was added twice.
    DuplicateRegionId,
    /// A property was defined twice.
    DuplicatePropertyDefinition,
    /// A value does not match the property's value type.
    IncompatibleValue,
    /// A write targeted an immutable property.
    ImmutableValue,
    /// A property without a default lacks a value for some owner.
    InsufficientDefaultCoverage,
    /// Integer arithmetic over- or underflowed at the requested width.
    ArithmeticOverflow,
    /// An integer was read through a narrower accessor than its storage width.
    NarrowingAccess,
    /// An index lies beyond the owner-supplied index limit.
    IndexOutOfBounds,
    /// A value is not a member of the enumeration.
    NotAMember,
    /// An enumeration domain has no members.
    NotAnEnumeration,
    /// A second handler was registered for a mutation type.
    DuplicateMutationHandler,
    /// A mutation was released with no handler registered for its type.
    UnknownMutationHandler,
    /// A labeler id was registered twice for the same event type.
    DuplicateLabeler,
    /// A filter referenced a labeler that is not registered.
    UnknownLabeler,
    /// Two plugins share an id.
    DuplicatePluginId,
    /// A plugin depends on an unregistered plugin id.
    UnknownPluginDependency,
    /// The plugin dependency graph contains a cycle.
    CircularPluginDependency,
    /// A data manager was requested before it finished initializing.
    DataManagerNotInitialized,
    /// A data manager was requested from a plugin that does not depend on its owner.
    DataManagerAccessViolation,
    /// No data manager of the requested type exists.
    UnknownDataManager,
    /// A data manager of the same type was added twice.
    DuplicateDataManager,
    /// A plan was scheduled before the current simulation time.
    PastPlanningTime,
    /// The operation is not allowed in the current lifecycle phase.
    InvalidLifecyclePhase,
    /// Required auxiliary construction data was not supplied.
    MissingConstructionData,
}

impl ContractErrorKind {
    /// Human-readable description of the kind.
    pub const fn description(self) -> &'static str {
        match self {
            Self::NullId => "null identifier",
            Self::UnknownPersonId => "unknown person id",
            Self::UnknownRegionId => "unknown region id",
            Self::UnknownPropertyId => "unknown property id",
            Self::DuplicatePersonId => "duplicate person id",
            Self::DuplicateRegionId => "duplicate region id",
            Self::DuplicatePropertyDefinition => "duplicate property definition",
            Self::IncompatibleValue => "incompatible value",
            Self::ImmutableValue => "immutable value",
            Self::InsufficientDefaultCoverage => "insufficient default value coverage",
            Self::ArithmeticOverflow => "arithmetic overflow",
            Self::NarrowingAccess => "narrowing integer access",
            Self::IndexOutOfBounds => "index out of bounds",
            Self::NotAMember => "not a member of the enumeration",
            Self::NotAnEnumeration => "not an enumeration",
            Self::DuplicateMutationHandler => "duplicate mutation handler",
            Self::UnknownMutationHandler => "no handler for mutation",
            Self::DuplicateLabeler => "duplicate event labeler",
            Self::UnknownLabeler => "unknown event labeler",
            Self::DuplicatePluginId => "duplicate plugin id",
            Self::UnknownPluginDependency => "unknown plugin dependency",
            Self::CircularPluginDependency => "circular plugin dependency",
            Self::DataManagerNotInitialized => "data manager not initialized",
            Self::DataManagerAccessViolation => "data manager access violation",
            Self::UnknownDataManager => "unknown data manager",
            Self::DuplicateDataManager => "duplicate data manager",
            Self::PastPlanningTime => "plan scheduled in the past",
            Self::InvalidLifecyclePhase => "invalid lifecycle phase",
            Self::MissingConstructionData => "missing construction data",
        }
    }

    /// Whether errors of this kind abort the run.
    ///
    /// Structural problems (plugin graph, initialization coverage, ordering,
    /// duplicate registrations) are fatal. Everything else is local to the
    /// failing call.
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::InsufficientDefaultCoverage
                | Self::DuplicateMutationHandler
                | Self::DuplicateLabeler
                | Self::DuplicatePluginId
                | Self::UnknownPluginDependency
                | Self::CircularPluginDependency
                | Self::DataManagerNotInitialized
                | Self::DataManagerAccessViolation
                | Self::DuplicateDataManager
        )
    }
}

impl fmt::Display for ContractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A contract violation: a [`ContractErrorKind`] plus optional details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}", render_details(.details))]
pub struct ContractError {
    /// The category of violation.
    pub kind: ContractErrorKind,
    /// Optional description of the offending values.
    pub details: Option<String>,
}

#[allow(clippy::ref_option)]
fn render_details(details: &Option<String>) -> String {
    details
        .as_deref()
        .map_or_else(String::new, |d| format!(": {d}"))
}

impl ContractError {
    /// Create an error without details.
    pub const fn new(kind: ContractErrorKind) -> Self {
        Self {
            kind,
            details: None,
        }
    }

    /// Create an error carrying a description of the offending values.
    pub fn with_details(kind: ContractErrorKind, details: impl fmt::Display) -> Self {
        Self {
            kind,
            details: Some(details.to_string()),
        }
    }

    /// The category of violation.
    pub const fn kind(&self) -> ContractErrorKind {
        self.kind
    }

    /// The details, if any.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Whether this error aborts the run.
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl From<ContractErrorKind> for ContractError {
    fn from(kind: ContractErrorKind) -> Self {
        Self::new(kind)
    }
}
