//! Resource-graph assembly.
//!
//! [`graph`] holds the typed resource model and the validated graph;
//! [`orchestrator`] runs the staged build that populates it.

mod graph;
mod orchestrator;

pub use graph::{
    AccessLevel, AttributeType, BillingMode, CrossReference, EventApiSpec, FunctionSpec,
    InlinePolicy, Integration, IntegrationKind, KeyAttribute, PolicyAttachment, PolicyDocument,
    Projection, ReferenceKind, ResourceGraph, ResourceKind, ResourceProperties, ResourceSpec,
    RouteSpec, Runtime, SecondaryIndex, SiteSpec, StageSpec, StreamView, TableAccess, TableSpec,
};
pub use orchestrator::AssemblyEngine;
