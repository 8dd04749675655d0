#![deny(missing_docs)]

//! # Type Resolver
//!
//! Pass 2 of catalog construction: attaches a type handle to every property.
//!
//! Runs once over a catalog whose named schemas are all declared. Resolution only looks up
//! existing handles, so forward references and cycles (`Node.next -> Node`) need no special
//! treatment.

use crate::model::catalog::{TypeCatalog, TypeHandle};
use tracing::debug;

/// Resolves every unresolved property of `catalog`.
///
/// Returns how many properties fell back to the unknown sentinel.
pub fn resolve_properties(catalog: &mut TypeCatalog) -> usize {
    let mut unresolved = 0;
    let handles: Vec<TypeHandle> = catalog.declared().map(|(handle, _)| handle).collect();

    for handle in handles {
        for idx in 0..catalog.property_count(handle) {
            let Some(prop) = catalog.property(handle, idx) else {
                continue;
            };
            if prop.is_resolved() {
                continue;
            }

            let ty = catalog.resolve_schema(prop.schema());
            if ty.is_unknown() {
                unresolved += 1;
                debug!(
                    owner = catalog.get(handle).id(),
                    property = prop.name(),
                    reference = ?prop.schema().reference,
                    primitive = ?prop.schema().primitive,
                    "Property type not found, using the unknown type"
                );
            }
            catalog.set_property_type(handle, idx, ty);
        }
    }

    unresolved
}
