//! Variables module for REST Client
//!
//! Gathers what a document defines (file variables, named requests,
//! environment values), finds what it references (`{{...}}` tokens) and
//! resolves request variables against captured responses.

pub mod cache;
pub mod definitions;
pub mod file;
pub mod references;
pub mod request;

pub use cache::{
    InMemoryRequestCache, RequestVariableCache, RequestVariableCacheKey,
    RequestVariableCacheValue,
};
pub use definitions::{collect_definitions, VariableDefinitions, VariableKind};
pub use file::{collect_file_variables, FileVariableCollector};
pub use references::{scan_references, VariableReference, VariableReferences};
pub use request::{RequestVariableResolver, ResolveResult, ResolveState, ResponsePathResolver};
