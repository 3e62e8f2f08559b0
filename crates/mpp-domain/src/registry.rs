//! Per-rank storage of defined domains and nests behind typed handles.

use log::debug;
use mpp_arena::{Arena, Handle};
use mpp_comm::MppContext;
use mpp_core::{DomainError, DomainResult};

use crate::domain::{define_domain, Domain};
use crate::nest::{NestDomain, NestSpec};
use crate::spec::DomainSpec;

/// Handle to a registered [`Domain`].
pub type DomainId = Handle<Domain>;

/// Handle to a registered [`NestDomain`].
pub type NestId = Handle<NestDomain>;

/// Domains and nests defined on one rank.
///
/// Each rank owns its own registry; handles are only meaningful to the
/// registry that issued them. A destroyed handle stays stale forever and
/// resolves to [`DomainError::UninitializedDomain`].
#[derive(Debug, Default)]
pub struct DomainRegistry {
    domains: Arena<Domain>,
    nests: Arena<NestDomain>,
}

impl DomainRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a domain and keep it.
    pub fn define_domain(&mut self, ctx: &MppContext, spec: &DomainSpec) -> DomainResult<DomainId> {
        let domain = define_domain(ctx, spec)?;
        let id = self.domains.insert(domain);
        debug!("registered domain '{}' as {id}", spec.name);
        Ok(id)
    }

    /// Keep an already defined domain.
    pub fn insert_domain(&mut self, domain: Domain) -> DomainId {
        self.domains.insert(domain)
    }

    /// Look up a domain.
    pub fn domain(&self, id: DomainId) -> DomainResult<&Domain> {
        self.domains.get(id).ok_or_else(|| uninit(id))
    }

    /// Look up a domain for an override.
    pub fn domain_mut(&mut self, id: DomainId) -> DomainResult<&mut Domain> {
        self.domains.get_mut(id).ok_or_else(|| uninit(id))
    }

    /// Drop a domain. Nests that name it keep their recorded geometry.
    pub fn destroy_domain(&mut self, id: DomainId) -> DomainResult<Domain> {
        self.domains.remove(id).ok_or_else(|| uninit(id))
    }

    /// Number of live domains.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Link two registered domains.
    pub fn define_nest_domain(&mut self, spec: NestSpec) -> DomainResult<NestId> {
        let fine = self.domain(spec.fine)?;
        let coarse = self.domain(spec.coarse)?;
        let nest = NestDomain::new(fine, coarse, spec)?;
        Ok(self.nests.insert(nest))
    }

    /// Look up a nest.
    pub fn nest_domain(&self, id: NestId) -> DomainResult<&NestDomain> {
        self.nests.get(id).ok_or_else(|| uninit(id))
    }

    /// Drop a nest.
    pub fn destroy_nest_domain(&mut self, id: NestId) -> DomainResult<NestDomain> {
        self.nests.remove(id).ok_or_else(|| uninit(id))
    }

    /// Number of live nests.
    pub fn nest_count(&self) -> usize {
        self.nests.len()
    }
}

fn uninit<T>(id: Handle<T>) -> DomainError {
    DomainError::UninitializedDomain {
        handle: id.to_raw(),
    }
}
