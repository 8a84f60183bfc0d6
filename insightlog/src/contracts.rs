//! Telemetry contracts of the two supported client SDK major versions.
//!
//! Both versions accept the same kinds of items but disagree on how severity
//! is represented: V2 takes a number from 0 to 4, V3 takes a level name. A
//! [`Contract`] fixes that representation at the type level so V2 and V3
//! items can never be mixed.

use serde::{Deserialize, Serialize};

use crate::severity::SeverityLevel;
use crate::value::{ErrorValue, PropertyBag};

/// SDK major version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SdkVersion {
    V2,
    V3,
}

impl SdkVersion {
    pub fn as_number(self) -> u8 {
        match self {
            SdkVersion::V2 => 2,
            SdkVersion::V3 => 3,
        }
    }
}

impl TryFrom<u8> for SdkVersion {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            2 => Ok(SdkVersion::V2),
            3 => Ok(SdkVersion::V3),
            other => Err(format!("unsupported SDK version {other}, expected 2 or 3")),
        }
    }
}

impl From<SdkVersion> for u8 {
    fn from(v: SdkVersion) -> Self {
        v.as_number()
    }
}

impl std::fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.as_number())
    }
}

/// Wire conventions of one SDK major version.
pub trait Contract:
    Copy + std::fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// Severity as the SDK expects it.
    type Severity: Copy + std::fmt::Debug + PartialEq + Serialize + Send + Sync;

    const VERSION: SdkVersion;

    fn severity(level: SeverityLevel) -> Self::Severity;
}

/// SDK 2.x: numeric severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2;

/// SDK 3.x: named severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V3;

impl Contract for V2 {
    type Severity = u8;

    const VERSION: SdkVersion = SdkVersion::V2;

    fn severity(level: SeverityLevel) -> u8 {
        level.as_number()
    }
}

impl Contract for V3 {
    type Severity = KnownSeverityLevel;

    const VERSION: SdkVersion = SdkVersion::V3;

    fn severity(level: SeverityLevel) -> KnownSeverityLevel {
        match level {
            SeverityLevel::Verbose => KnownSeverityLevel::Verbose,
            SeverityLevel::Information => KnownSeverityLevel::Information,
            SeverityLevel::Warning => KnownSeverityLevel::Warning,
            SeverityLevel::Error => KnownSeverityLevel::Error,
            SeverityLevel::Critical => KnownSeverityLevel::Critical,
        }
    }
}

/// Severity names used by SDK 3.x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownSeverityLevel {
    Verbose,
    Information,
    Warning,
    Error,
    Critical,
}

/// A log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct TraceTelemetry<C: Contract> {
    pub message: String,
    pub severity: C::Severity,
    pub properties: PropertyBag,
}

/// A captured error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct ExceptionTelemetry<C: Contract> {
    pub exception: ErrorValue,
    pub properties: PropertyBag,
    #[serde(skip)]
    _contract: std::marker::PhantomData<fn() -> C>,
}

impl<C: Contract> ExceptionTelemetry<C> {
    pub fn new(exception: ErrorValue, properties: PropertyBag) -> Self {
        Self {
            exception,
            properties,
            _contract: std::marker::PhantomData,
        }
    }
}

/// Client half of an SDK: the two calls the emitter makes.
///
/// Delivery, batching and retries are the client's business.
pub trait TelemetryClient<C: Contract>: Send + Sync {
    fn track_trace(&self, telemetry: TraceTelemetry<C>);

    fn track_exception(&self, telemetry: ExceptionTelemetry<C>);
}
