//! Resource graph types.
//!
//! The graph is the sole artifact crossing the boundary to the external
//! provisioning layer: a collection of typed resource specifications plus
//! validated cross-references and policy attachments. Every reference is
//! checked against the registered specs on insertion, so a fully
//! assembled graph never contains a dangling logical name.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::config::ConfigHasher;
use crate::error::{AssemblyError, ValidationError};

/// Closed set of resource kinds in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Storage table.
    Table,
    /// Compute function.
    Function,
    /// Event-driven API shell.
    EventApi,
    /// One route of an event API.
    Route,
    /// Static site bucket.
    Site,
}

impl ResourceKind {
    /// Label used in registries and error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Function => "function",
            Self::EventApi => "api",
            Self::Route => "route",
            Self::Site => "site",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Storage key attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    /// String-typed key attribute.
    String,
    /// Number-typed key attribute.
    Number,
    /// Binary-typed key attribute.
    Binary,
}

/// One key attribute of a table or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
}

/// Table capacity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    /// Provisioned capacity. Read/write units are honored only in this
    /// mode.
    Provisioned {
        /// Read capacity units.
        rcu: Option<u64>,
        /// Write capacity units.
        wcu: Option<u64>,
    },
    /// On-demand capacity.
    PayPerRequest,
}

/// Stream view emitted by a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamView {
    /// New item image only.
    NewImage,
    /// Old item image only.
    OldImage,
    /// Both images.
    NewAndOldImages,
    /// Key attributes only.
    KeysOnly,
}

/// Secondary-index projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Projection {
    /// Project every attribute.
    All,
    /// Project key attributes only.
    KeysOnly,
    /// Project a named attribute subset.
    Include,
}

/// One global secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryIndex {
    /// Index name.
    pub index_name: String,
    /// Partition key of the index.
    pub partition_key: KeyAttribute,
    /// Optional sort key of the index.
    pub sort_key: Option<KeyAttribute>,
    /// Projection type.
    pub projection: Projection,
    /// Read capacity units (provisioned tables only).
    pub rcu: Option<u64>,
    /// Write capacity units (provisioned tables only).
    pub wcu: Option<u64>,
}

/// Fully-resolved storage table specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    /// Physical table name, placeholders already expanded.
    pub table_name: String,
    /// Partition key.
    pub partition_key: KeyAttribute,
    /// Optional sort key.
    pub sort_key: Option<KeyAttribute>,
    /// Capacity mode.
    pub billing: BillingMode,
    /// Point-in-time recovery flag.
    pub pitr: bool,
    /// Encryption key alias.
    pub kms_alias: String,
    /// Optional time-to-live attribute name.
    pub ttl_attribute: Option<String>,
    /// Optional stream mode.
    pub stream: Option<StreamView>,
    /// Global secondary indexes.
    pub global_secondary_indexes: Vec<SecondaryIndex>,
    /// Resource tags.
    pub tags: BTreeMap<String, String>,
}

/// Supported compute runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Runtime {
    /// Python 3.12.
    #[serde(rename = "python3.12")]
    Python312,
    /// Python 3.11.
    #[serde(rename = "python3.11")]
    Python311,
    /// Python 3.10.
    #[serde(rename = "python3.10")]
    Python310,
    /// Node.js 18.
    #[serde(rename = "nodejs18.x")]
    Nodejs18,
    /// Node.js 20.
    #[serde(rename = "nodejs20.x")]
    Nodejs20,
}

impl Runtime {
    /// Every supported runtime identifier, lower-case.
    pub const IDENTIFIERS: &'static [&'static str] = &[
        "python3.12",
        "python3.11",
        "python3.10",
        "nodejs18.x",
        "nodejs20.x",
    ];

    /// Parses a lower-cased runtime identifier.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "python3.12" => Some(Self::Python312),
            "python3.11" => Some(Self::Python311),
            "python3.10" => Some(Self::Python310),
            "nodejs18.x" => Some(Self::Nodejs18),
            "nodejs20.x" => Some(Self::Nodejs20),
            _ => None,
        }
    }

    /// The runtime identifier string.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Python312 => "python3.12",
            Self::Python311 => "python3.11",
            Self::Python310 => "python3.10",
            Self::Nodejs18 => "nodejs18.x",
            Self::Nodejs20 => "nodejs20.x",
        }
    }
}

/// Access level of one table grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Read-only access.
    Read,
    /// Write-only access.
    Write,
    /// Read and write access.
    ReadWrite,
}

impl AccessLevel {
    /// Every supported access level, lower-case.
    pub const IDENTIFIERS: &'static [&'static str] = &["read", "write", "readwrite"];

    /// Parses a lower-cased access level.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "readwrite" => Some(Self::ReadWrite),
            _ => None,
        }
    }
}

/// One declared table grant on a compute function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableAccess {
    /// Logical name of the granted table.
    pub table: String,
    /// Access level.
    pub level: AccessLevel,
}

/// One named inline policy with its statement documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinePolicy {
    /// Policy name.
    pub name: String,
    /// Raw statement documents. The statement schema is open, so the
    /// values stay as validated JSON.
    pub statements: Vec<Value>,
}

/// A validated access-policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    /// Managed-policy identifiers (names or full ARNs).
    pub managed: Vec<String>,
    /// Inline policies, in declaration order.
    pub inline: Vec<InlinePolicy>,
}

/// Fully-resolved compute function specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSpec {
    /// Optional physical function name.
    pub function_name: Option<String>,
    /// Runtime identifier.
    pub runtime: Runtime,
    /// Entry point.
    pub handler: String,
    /// Memory in megabytes.
    pub memory: u64,
    /// Timeout in seconds.
    pub timeout_secs: u64,
    /// Optional description.
    pub description: Option<String>,
    /// Environment variables, values coerced to strings.
    pub env: BTreeMap<String, String>,
    /// Resource tags.
    pub tags: BTreeMap<String, String>,
    /// Embedded policy document, when the function declares one.
    pub policy: Option<PolicyDocument>,
    /// Declared table grants.
    pub table_access: Vec<TableAccess>,
}

/// API stage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSpec {
    /// Stage name.
    pub name: String,
    /// Deploy automatically on change.
    pub auto_deploy: bool,
}

/// Fully-resolved event-API shell specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventApiSpec {
    /// API display name.
    pub api_name: String,
    /// Route selection expression.
    pub route_selection_expression: String,
    /// Stage settings.
    pub stage: StageSpec,
    /// Functions granted connection-management permissions at the API
    /// level.
    pub manage_connections_for: Vec<String>,
}

/// Supported route integration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    /// Compute-function integration.
    Lambda,
}

impl IntegrationKind {
    /// Every supported integration kind, lower-case.
    pub const IDENTIFIERS: &'static [&'static str] = &["lambda"];
}

/// A route's integration target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Integration {
    /// Integration kind.
    pub kind: IntegrationKind,
    /// Logical name of the target function.
    pub function: String,
}

/// Fully-resolved route specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSpec {
    /// Logical name of the owning API.
    pub api: String,
    /// Route key.
    pub route_key: String,
    /// Integration target.
    pub integration: Integration,
}

/// Fully-resolved static-site specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSpec {
    /// Bucket name, placeholders already expanded.
    pub bucket_name: String,
    /// Index document.
    pub index_document: String,
    /// Whether objects are publicly readable.
    pub public_read_access: bool,
}

/// Per-kind typed resource properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceProperties {
    /// Storage table.
    Table(TableSpec),
    /// Compute function.
    Function(FunctionSpec),
    /// Event-API shell.
    EventApi(EventApiSpec),
    /// Event-API route.
    Route(RouteSpec),
    /// Static site.
    Site(SiteSpec),
}

impl ResourceProperties {
    /// The kind of resource these properties describe.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Table(_) => ResourceKind::Table,
            Self::Function(_) => ResourceKind::Function,
            Self::EventApi(_) => ResourceKind::EventApi,
            Self::Route(_) => ResourceKind::Route,
            Self::Site(_) => ResourceKind::Site,
        }
    }
}

/// One fully-resolved resource description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSpec {
    /// Stable identifier used for cross-references.
    pub logical_name: String,
    /// Lifecycle policy: retain the resource on deletion.
    pub retain_on_delete: bool,
    /// Fragment file or folder this spec was built from.
    pub source: PathBuf,
    /// Typed per-kind properties.
    pub properties: ResourceProperties,
}

impl ResourceSpec {
    /// The resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.properties.kind()
    }
}

/// What a cross-reference grants or wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "grant", rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A function needs table access at a given level.
    TableAccess {
        /// Access level of the grant.
        level: AccessLevel,
    },
    /// A route integrates with a function.
    RouteIntegration,
    /// A function needs connection-management access on an API.
    ConnectionsGrant,
}

impl ReferenceKind {
    /// The registry the target of this reference must live in.
    #[must_use]
    pub const fn target_kind(self) -> ResourceKind {
        match self {
            Self::TableAccess { .. } => ResourceKind::Table,
            Self::RouteIntegration | Self::ConnectionsGrant => ResourceKind::Function,
        }
    }
}

/// A recorded dependency from one resource to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    /// Logical name of the depending resource.
    pub from: String,
    /// Logical name of the depended-on resource.
    pub target: String,
    /// What the reference grants or wires.
    pub kind: ReferenceKind,
}

/// A policy document attached to a function outside its own fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyAttachment {
    /// Logical name of the function receiving the attachment.
    pub function: String,
    /// The attached policy document.
    pub document: PolicyDocument,
}

/// The assembled resource graph.
#[derive(Debug, Serialize)]
pub struct ResourceGraph {
    /// Environment this graph was assembled for.
    pub environment: String,
    /// When assembly completed.
    pub assembled_at: DateTime<Utc>,
    /// Every resource specification, in build order.
    pub specs: Vec<ResourceSpec>,
    /// Every resolved cross-reference.
    pub references: Vec<CrossReference>,
    /// Policy attachments applied at assembly level.
    pub attachments: Vec<PolicyAttachment>,
}

impl ResourceGraph {
    /// Creates an empty graph for an environment.
    #[must_use]
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            assembled_at: Utc::now(),
            specs: Vec::new(),
            references: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Registers a resource spec. Logical names are unique per kind.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::DuplicateLogicalName`] on collision.
    pub fn insert(&mut self, spec: ResourceSpec) -> Result<(), AssemblyError> {
        if self.contains(spec.kind(), &spec.logical_name) {
            return Err(AssemblyError::DuplicateLogicalName {
                kind: spec.kind().label().to_string(),
                name: spec.logical_name,
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    /// Whether a logical name is registered under a kind.
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.specs
            .iter()
            .any(|s| s.kind() == kind && s.logical_name == name)
    }

    /// Registered logical names of one kind, ordered.
    #[must_use]
    pub fn names(&self, kind: ResourceKind) -> BTreeSet<String> {
        self.specs
            .iter()
            .filter(|s| s.kind() == kind)
            .map(|s| s.logical_name.clone())
            .collect()
    }

    /// Number of registered specs of one kind.
    #[must_use]
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.specs.iter().filter(|s| s.kind() == kind).count()
    }

    /// Records a cross-reference after checking its target is registered
    /// under the kind the reference requires.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnresolvedReference`] for a dangling
    /// target.
    pub fn link(&mut self, reference: CrossReference) -> Result<(), ValidationError> {
        let target_kind = reference.kind.target_kind();
        if !self.contains(target_kind, &reference.target) {
            return Err(ValidationError::unresolved(
                format!("Cross-reference from '{}'", reference.from),
                target_kind.label(),
                reference.target,
            ));
        }
        self.references.push(reference);
        Ok(())
    }

    /// Records a policy attachment after checking the function exists.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnresolvedReference`] when the named
    /// function is not registered.
    pub fn attach(&mut self, attachment: PolicyAttachment) -> Result<(), ValidationError> {
        if !self.contains(ResourceKind::Function, &attachment.function) {
            return Err(ValidationError::unresolved(
                "Policy attachment",
                ResourceKind::Function.label(),
                attachment.function,
            ));
        }
        self.attachments.push(attachment);
        Ok(())
    }

    /// Deterministic fingerprint over specs, references, and
    /// attachments. The assembly timestamp is excluded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let hasher = ConfigHasher::new();
        let parts = self
            .specs
            .iter()
            .map(|s| serde_json::to_string(s).unwrap_or_default())
            .chain(
                self.references
                    .iter()
                    .map(|r| serde_json::to_string(r).unwrap_or_default()),
            )
            .chain(
                self.attachments
                    .iter()
                    .map(|a| serde_json::to_string(a).unwrap_or_default()),
            );
        hasher.fingerprint_parts(parts)
    }
}
