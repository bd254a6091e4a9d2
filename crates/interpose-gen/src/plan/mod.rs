//! Member collection: turns a capability surface into an ordered,
//! deduplicated member plan with dispatch ids.
//!
//! Order is: the three universal members (`equals`, `hashCode`, `toString`),
//! then surface members in contract order. The first occurrence of a member
//! key wins; later duplicates are dropped.

mod dispatch_id;


use std::collections::{HashMap, HashSet};

use interpose_core::{CapabilitySurface, Contract, JType, MemberSig, MethodDecl, Visibility};

use crate::context::GenerationContext;
use crate::error::{GenerationError, Result};

pub use dispatch_id::dispatch_id;

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Where a planned member came from; decides how `dispatch` reaches the real
/// implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberOrigin {
    /// `equals`/`hashCode`/`toString`, dispatched as a super call.
    Universal,
    /// Base class member, dispatched as a super call.
    Base,
    /// Interface member, dispatched through a lazily bound call target.
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedMember {
    pub sig: MemberSig,
    /// Binary name of the declaring type, used for load-time resolution.
    pub declaring: String,
    pub origin: MemberOrigin,
    pub visibility: Visibility,
    /// Declared checked exceptions, by binary name.
    pub exceptions: Vec<String>,
    pub dispatch_id: i32,
    /// Position in the plan; names the member's generated fields and helpers.
    pub slot: u16,
}

impl PlannedMember {
    pub fn key(&self) -> String {
        self.sig.key()
    }

    /// Static field holding the resolved member descriptor.
    pub fn descriptor_field(&self) -> String {
        format!("m{}", self.slot)
    }

    /// Instance field caching the bound call target (interface members only).
    pub fn target_field(&self) -> Option<String> {
        (self.origin == MemberOrigin::Interface).then(|| format!("h{}", self.slot))
    }

    /// Private helper that binds and invokes the call target.
    pub fn target_method(&self) -> Option<String> {
        (self.origin == MemberOrigin::Interface).then(|| format!("invokeTarget{}", self.slot))
    }
}

/// Output of member collection.
#[derive(Clone, Debug)]
pub struct DispatchPlan<'s> {
    pub members: Vec<PlannedMember>,
    pub base: Option<&'s Contract>,
}

impl DispatchPlan<'_> {
    pub fn interface_members(&self) -> impl Iterator<Item = &PlannedMember> {
        self.members
            .iter()
            .filter(|m| m.origin == MemberOrigin::Interface)
    }

    pub fn find(&self, key: &str) -> Option<&PlannedMember> {
        self.members.iter().find(|m| m.key() == key)
    }
}

fn universal_members() -> [MemberSig; 3] {
    [
        MemberSig::new("equals", vec![JType::java_object()], JType::Boolean),
        MemberSig::new("hashCode", vec![], JType::Int),
        MemberSig::new("toString", vec![], JType::object("java.lang.String")),
    ]
}

struct Candidate<'a> {
    decl: Option<&'a MethodDecl>,
    sig: MemberSig,
    declaring: String,
    origin: MemberOrigin,
}

/// Collect the ordered member plan for a surface.
///
/// Fails with [`GenerationError::InvalidSurface`] when more than one base
/// contract is present and with [`GenerationError::DispatchIdCollision`]
/// when two kept members hash to the same id.
pub fn collect_dispatch_plan<'s>(
    surface: &'s CapabilitySurface,
    ctx: &GenerationContext,
) -> Result<DispatchPlan<'s>> {
    let mut bases = surface.bases();
    let base = bases.next();
    if let Some(extra) = bases.next() {
        return Err(GenerationError::InvalidSurface(format!(
            "more than one base contract ('{}' and '{}')",
            base.map_or("", |b| b.name.as_str()),
            extra.name
        )));
    }

    let mut candidates: Vec<Candidate<'s>> = Vec::new();

    for sig in universal_members() {
        let key = sig.key();
        let overridden = base.and_then(|b| b.methods.iter().find(|m| m.key() == key));
        match overridden {
            // A final override cannot be replaced by a forwarding method.
            Some(m) if m.is_final => continue,
            Some(m) if !m.is_static => candidates.push(Candidate {
                decl: Some(m),
                sig,
                declaring: declaring_type(m, base.map_or(JAVA_LANG_OBJECT, |b| b.name.as_str())),
                origin: MemberOrigin::Universal,
            }),
            _ => candidates.push(Candidate {
                decl: None,
                sig,
                declaring: JAVA_LANG_OBJECT.to_owned(),
                origin: MemberOrigin::Universal,
            }),
        }
    }

    for contract in surface.contracts() {
        for method in &contract.methods {
            let origin = if contract.is_interface() {
                if method.is_static || method.visibility != Visibility::Public {
                    continue;
                }
                MemberOrigin::Interface
            } else {
                if !is_interceptable_base_member(method) {
                    continue;
                }
                MemberOrigin::Base
            };
            candidates.push(Candidate {
                decl: Some(method),
                sig: method.sig.clone(),
                declaring: declaring_type(method, &contract.name),
                origin,
            });
        }
    }

    // Final base members keep their inherited implementation, which also
    // satisfies any interface redeclaring them.
    let mut seen: HashSet<String> = base
        .into_iter()
        .flat_map(|b| &b.methods)
        .filter(|m| is_sealed_base_member(m))
        .map(MethodDecl::key)
        .collect();
    let mut ids: HashMap<i32, String> = HashMap::new();
    let mut members = Vec::new();

    for candidate in candidates {
        let key = candidate.sig.key();
        if !seen.insert(key.clone()) {
            tracing::trace!(%key, declaring = %candidate.declaring, "duplicate member dropped");
            continue;
        }

        let id = (ctx.hasher)(&key);
        if let Some(first) = ids.get(&id) {
            tracing::error!(first = %first, second = %key, id, "dispatch id collision");
            return Err(GenerationError::DispatchIdCollision {
                first: first.clone(),
                second: key,
                id,
            });
        }
        ids.insert(id, key.clone());

        let slot = members.len();
        if slot > u16::MAX as usize {
            return Err(GenerationError::TooMany {
                what: "members",
                count: slot + 1,
            });
        }
        tracing::trace!(%key, slot, id, origin = ?candidate.origin, "member planned");
        members.push(PlannedMember {
            sig: candidate.sig,
            declaring: candidate.declaring,
            origin: candidate.origin,
            visibility: candidate.decl.map_or(Visibility::Public, |d| d.visibility),
            exceptions: candidate
                .decl
                .map(|d| d.exceptions.clone())
                .unwrap_or_default(),
            dispatch_id: id,
            slot: slot as u16,
        });
    }

    tracing::debug!(
        members = members.len(),
        base = base.map(|b| b.name.as_str()),
        "dispatch plan collected"
    );
    Ok(DispatchPlan { members, base })
}

fn declaring_type(method: &MethodDecl, listed_in: &str) -> String {
    method
        .declared_in
        .clone()
        .unwrap_or_else(|| listed_in.to_owned())
}

/// Base members a subclass inherits but may not override.
fn is_sealed_base_member(method: &MethodDecl) -> bool {
    method.is_final && !method.is_static && method.visibility != Visibility::Private
}

/// Base members that a subclass may override.
fn is_interceptable_base_member(method: &MethodDecl) -> bool {
    !method.is_final
        && !method.is_static
        && matches!(method.visibility, Visibility::Public | Visibility::Protected)
}
