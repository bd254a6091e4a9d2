//! Request validation and artifact placement.

use std::collections::HashSet;

use interpose_classfile::access;
use interpose_core::{CapabilitySurface, Contract, JType, Visibility};

use crate::error::{ProxyError, Result};

const MAX_CONTRACTS: usize = 65535;

/// Package and class access flags an artifact must have.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Package forced by a non-public contract, if any.
    pub package: Option<String>,
    pub access: u16,
}

/// Check a request before any generation work.
///
/// Non-public contracts are only reachable from their own package, so they
/// pin the artifact there and all of them must agree.
pub fn validate(surface: &CapabilitySurface, ctor_args: &[JType]) -> Result<Placement> {
    if surface.is_empty() {
        return Err(ProxyError::EmptySurface);
    }
    if surface.len() > MAX_CONTRACTS {
        return Err(ProxyError::TooManyContracts(surface.len()));
    }

    let mut seen = HashSet::new();
    for name in surface.names() {
        if !seen.insert(name) {
            return Err(ProxyError::DuplicateContract(name.to_owned()));
        }
    }

    let mut bases = surface.bases();
    let base = bases.next();
    if let (Some(first), Some(second)) = (base, bases.next()) {
        return Err(ProxyError::MultipleBaseContracts {
            first: first.name.clone(),
            second: second.name.clone(),
        });
    }

    match base {
        Some(base) => check_base(base, ctor_args)?,
        None if !ctor_args.is_empty() => return Err(ProxyError::UnexpectedConstructorArgs),
        None => {}
    }

    let mut pinned: Option<&Contract> = None;
    for contract in surface.contracts().iter().filter(|c| !c.is_public()) {
        match pinned {
            Some(first) if first.package() != contract.package() => {
                return Err(ProxyError::MixedPackages {
                    first: first.name.clone(),
                    second: contract.name.clone(),
                });
            }
            Some(_) => {}
            None => pinned = Some(contract),
        }
    }

    Ok(match pinned {
        Some(contract) => Placement {
            package: Some(contract.package().to_owned()),
            access: access::FINAL,
        },
        None => Placement {
            package: None,
            access: access::PUBLIC | access::FINAL,
        },
    })
}

fn check_base(base: &Contract, ctor_args: &[JType]) -> Result<()> {
    if base.is_final || base.visibility == Visibility::Private {
        return Err(ProxyError::BaseNotExtensible(base.name.clone()));
    }
    if base.is_abstract {
        return Err(ProxyError::AbstractBase(base.name.clone()));
    }
    if base.find_constructor(ctor_args).is_none() {
        return Err(ProxyError::NoMatchingConstructor {
            base: base.name.clone(),
            args: ctor_args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(())
}
